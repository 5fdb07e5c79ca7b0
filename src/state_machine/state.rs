//! State node representation

use serde::{Deserialize, Serialize};

/// A derived state, as a node of the transition graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateNode {
    pub name: String,
    pub ordinal: usize,
    pub symbol: String,
    pub classification: StateClass,
}

/// Position of a state in the transition graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StateClass {
    /// Ordinal 0, where every generated machine starts
    Initial,
    /// Has incoming and outgoing transitions
    #[default]
    Active,
    /// Never the destination of any event
    EntryOnly,
    /// No outgoing transitions
    Absorbing,
}

impl StateClass {
    pub fn color(&self) -> &'static str {
        match self {
            StateClass::Initial => "lightblue",
            StateClass::Active => "lightgreen",
            StateClass::EntryOnly => "yellow",
            StateClass::Absorbing => "gray",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StateClass::Initial => "Initial",
            StateClass::Active => "Active",
            StateClass::EntryOnly => "Entry-only",
            StateClass::Absorbing => "Absorbing",
        }
    }
}

impl StateNode {
    pub fn new(name: impl Into<String>, ordinal: usize, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordinal,
            symbol: symbol.into(),
            classification: StateClass::default(),
        }
    }

    pub fn with_class(mut self, class: StateClass) -> Self {
        self.classification = class;
        self
    }

    /// Get a short display string
    pub fn display_short(&self) -> String {
        format!("{} ({})", self.name, self.ordinal)
    }
}
