//! Transition table pattern analyzer
//!
//! Describes the overall shape of a table: a straight pipeline, a branching
//! workflow, or a machine that can revisit states.

use super::TransitionGraph;
use petgraph::Direction;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MachinePattern {
    /// A -> B -> C -> D
    Linear,

    /// A -> B
    ///   -> C
    Tree,

    /// A -> B -> A
    Cyclic,

    /// No states
    Unknown,
}

impl MachinePattern {
    pub fn display_name(&self) -> &'static str {
        match self {
            MachinePattern::Linear => "Linear",
            MachinePattern::Tree => "Branching",
            MachinePattern::Cyclic => "Cyclic",
            MachinePattern::Unknown => "Complex/Unknown",
        }
    }
}

/// Analysis report containing pattern and metrics
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub pattern: MachinePattern,
    pub branching_factor: f64,
    pub max_out_degree: usize,
    pub has_cycles: bool,
}

/// Detect the pattern of a transition graph
pub fn detect_pattern(graph: &TransitionGraph) -> AnalysisReport {
    let node_count = graph.graph.node_count();

    if node_count == 0 {
        return AnalysisReport {
            pattern: MachinePattern::Unknown,
            branching_factor: 0.0,
            max_out_degree: 0,
            has_cycles: false,
        };
    }

    // Self-loops count as cycles.
    let has_cycles = petgraph::algo::is_cyclic_directed(&graph.graph);

    let out_degrees: Vec<usize> = graph
        .graph
        .node_indices()
        .map(|idx| graph.graph.edges_directed(idx, Direction::Outgoing).count())
        .collect();

    let branching_factor = out_degrees.iter().sum::<usize>() as f64 / node_count as f64;
    let max_out_degree = out_degrees.iter().copied().max().unwrap_or(0);

    let pattern = if has_cycles {
        MachinePattern::Cyclic
    } else if max_out_degree <= 1 {
        MachinePattern::Linear
    } else {
        MachinePattern::Tree
    };

    AnalysisReport {
        pattern,
        branching_factor,
        max_out_degree,
        has_cycles,
    }
}
