//! State machine module - Transition graph of a definition, for inspection

use crate::Result;
use crate::definition::{Definition, StateSet};

pub mod analyzer;
pub mod graph;
pub mod state;
pub mod transition;

// Re-export key types
pub use graph::{GraphStats, TransitionGraph};
pub use state::{StateClass, StateNode};
pub use transition::EventEdge;

/// Build the transition graph of a definition
pub fn build_transition_graph(definition: &Definition) -> Result<TransitionGraph> {
    let states = StateSet::derive(definition)?;
    TransitionGraph::from_definition(definition, &states)
}
