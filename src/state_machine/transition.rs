//! Transition edge representation

use serde::{Deserialize, Serialize};

/// One (source, event) pair of the transition table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEdge {
    pub event: String,
    pub ordinal: usize,
    pub params: Vec<String>,
}

impl EventEdge {
    pub fn new(event: impl Into<String>, ordinal: usize, params: Vec<String>) -> Self {
        Self {
            event: event.into(),
            ordinal,
            params,
        }
    }

    /// Get display label for the edge
    pub fn display_label(&self) -> String {
        if self.params.is_empty() {
            self.event.clone()
        } else {
            format!("{}({})", self.event, self.params.join(", "))
        }
    }
}
