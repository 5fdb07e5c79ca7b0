use crate::Result;
use crate::definition::{Definition, StateSet};
use crate::state_machine::{EventEdge, StateClass, StateNode};
use petgraph::Direction;
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use serde::Serialize;
use std::collections::BTreeMap;

/// A directed graph of the transition table.
///
/// Nodes are the derived states; there is one edge per `(source, event)` pair,
/// so an event declared from three states contributes three edges.
pub struct TransitionGraph {
    /// The underlying graph structure.
    pub graph: StableGraph<StateNode, EventEdge>,

    /// State name to node index. Ordered, so renderings follow state ordinals.
    pub state_index: BTreeMap<String, NodeIndex>,

    /// Name of the machine the table belongs to.
    pub machine: String,
}

impl TransitionGraph {
    pub fn new(machine: String) -> Self {
        Self {
            graph: StableGraph::new(),
            state_index: BTreeMap::new(),
            machine,
        }
    }

    /// Adds a state to the graph and updates the state index.
    pub fn add_state(&mut self, state: StateNode) -> NodeIndex {
        let name = state.name.clone();
        let node_index = self.graph.add_node(state);
        self.state_index.insert(name, node_index);
        node_index
    }

    /// Adds an edge between two existing states.
    pub fn add_transition(&mut self, from: &str, to: &str, edge: EventEdge) -> Option<EdgeIndex> {
        if let (Some(&from_idx), Some(&to_idx)) =
            (self.state_index.get(from), self.state_index.get(to))
        {
            Some(self.graph.add_edge(from_idx, to_idx, edge))
        } else {
            None
        }
    }

    pub fn from_definition(definition: &Definition, states: &StateSet) -> Result<Self> {
        let mut graph = Self::new(definition.name.clone());

        for (ordinal, name) in states.iter() {
            graph.add_state(StateNode::new(name, ordinal, states.symbol(name)?));
        }

        for (ordinal, name, event) in definition.indexed_events() {
            let params: Vec<String> = event.params.iter().map(|p| p.name.clone()).collect();
            let mut seen = Vec::new();
            for source in &event.sources {
                if seen.contains(&source) {
                    continue;
                }
                seen.push(source);
                graph.add_transition(
                    source,
                    &event.destination,
                    EventEdge::new(name, ordinal, params.clone()),
                );
            }
        }

        graph.classify_states();
        Ok(graph)
    }

    /// Classify states based on their position in the graph
    fn classify_states(&mut self) {
        let classifications: Vec<(NodeIndex, StateClass)> = self
            .graph
            .node_indices()
            .map(|node_idx| {
                let is_initial = self
                    .graph
                    .node_weight(node_idx)
                    .is_some_and(|s| s.ordinal == 0);
                let has_incoming = self
                    .graph
                    .edges_directed(node_idx, Direction::Incoming)
                    .count()
                    > 0;
                let has_outgoing = self
                    .graph
                    .edges_directed(node_idx, Direction::Outgoing)
                    .count()
                    > 0;
                let classification = match (is_initial, has_incoming, has_outgoing) {
                    (true, _, _) => StateClass::Initial,
                    (false, _, false) => StateClass::Absorbing,
                    (false, false, true) => StateClass::EntryOnly,
                    (false, true, true) => StateClass::Active,
                };
                (node_idx, classification)
            })
            .collect();

        for (node_idx, classification) in classifications {
            if let Some(state) = self.graph.node_weight_mut(node_idx) {
                state.classification = classification;
            }
        }
    }

    /// States with no outgoing edges
    pub fn find_absorbing_states(&self) -> Vec<&StateNode> {
        self.states_where(|idx| {
            self.graph
                .edges_directed(idx, Direction::Outgoing)
                .next()
                .is_none()
        })
    }

    /// States that no event leads to
    pub fn find_entry_only_states(&self) -> Vec<&StateNode> {
        self.states_where(|idx| {
            self.graph
                .edges_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
    }

    fn states_where(&self, keep: impl Fn(NodeIndex) -> bool) -> Vec<&StateNode> {
        self.state_index
            .values()
            .copied()
            .filter(|&idx| keep(idx))
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Export to DOT format for Graphviz
    pub fn to_dot(&self) -> String {
        let mut dot = format!("digraph {} {{\n", self.machine);
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=filled];\n\n");

        for (name, &node_idx) in &self.state_index {
            if let Some(state) = self.graph.node_weight(node_idx) {
                dot.push_str(&format!(
                    "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                    name,
                    state.display_short(),
                    state.classification.color()
                ));
            }
        }

        dot.push('\n');

        // Event order, then source ordinal.
        let mut edges: Vec<(usize, usize, &str, &str, &EventEdge)> = self
            .graph
            .edge_indices()
            .filter_map(|edge_idx| {
                let (from_idx, to_idx) = self.graph.edge_endpoints(edge_idx)?;
                let from = self.graph.node_weight(from_idx)?;
                let to = self.graph.node_weight(to_idx)?;
                let edge = self.graph.edge_weight(edge_idx)?;
                Some((edge.ordinal, from.ordinal, from.name.as_str(), to.name.as_str(), edge))
            })
            .collect();
        edges.sort_by_key(|&(event, from, ..)| (event, from));

        for (_, _, from, to, edge) in edges {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                from,
                to,
                edge.display_label()
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Get a state by its name
    pub fn get_state(&self, name: &str) -> Option<&StateNode> {
        self.state_index
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// All states in ordinal order
    pub fn all_states(&self) -> Vec<&StateNode> {
        self.state_index
            .values()
            .filter_map(|&idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Get outgoing edges from a state
    pub fn outgoing_transitions(&self, name: &str) -> Vec<&EventEdge> {
        if let Some(&node_idx) = self.state_index.get(name) {
            self.graph
                .edges_directed(node_idx, Direction::Outgoing)
                .filter_map(|edge| self.graph.edge_weight(edge.id()))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Get incoming edges to a state
    pub fn incoming_transitions(&self, name: &str) -> Vec<&EventEdge> {
        if let Some(&node_idx) = self.state_index.get(name) {
            self.graph
                .edges_directed(node_idx, Direction::Incoming)
                .filter_map(|edge| self.graph.edge_weight(edge.id()))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        let mut events: Vec<usize> = self
            .graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx).map(|e| e.ordinal))
            .collect();
        events.sort_unstable();
        events.dedup();

        let names = |states: Vec<&StateNode>| -> Vec<String> {
            states.into_iter().map(|s| s.name.clone()).collect()
        };

        GraphStats {
            total_states: self.graph.node_count(),
            total_events: events.len(),
            total_edges: self.graph.edge_count(),
            initial_state: self
                .all_states()
                .first()
                .map(|s| s.name.clone())
                .unwrap_or_default(),
            absorbing_states: names(self.find_absorbing_states()),
            entry_only_states: names(self.find_entry_only_states()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub total_states: usize,
    pub total_events: usize,
    pub total_edges: usize,
    pub initial_state: String,
    pub absorbing_states: Vec<String>,
    pub entry_only_states: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::EventDefinition;

    fn build(def: &Definition) -> TransitionGraph {
        let states = StateSet::derive(def).unwrap();
        TransitionGraph::from_definition(def, &states).unwrap()
    }

    fn order_flow() -> Definition {
        Definition::new("Order", "orders")
            .with_event("pay", EventDefinition::new(["created"], "paid"))
            .with_event("ship", EventDefinition::new(["paid"], "shipped"))
            .with_event("cancel", EventDefinition::new(["created", "paid", "paid"], "cancelled"))
    }

    #[test]
    fn test_empty_graph() {
        let graph = TransitionGraph::new("M".to_string());
        assert_eq!(graph.graph.node_count(), 0);
        assert_eq!(graph.stats().initial_state, "");
    }

    #[test]
    fn test_build_on_off() {
        let graph = build(&crate::definition::tests::on_off());
        assert_eq!(graph.graph.node_count(), 2);
        assert_eq!(graph.graph.edge_count(), 2);
        assert_eq!(graph.outgoing_transitions("idle")[0].event, "start");
        assert_eq!(graph.incoming_transitions("idle")[0].event, "stop");
        assert!(graph.outgoing_transitions("nowhere").is_empty());
    }

    #[test]
    fn test_duplicate_sources_are_one_edge() {
        let graph = build(&order_flow());
        assert_eq!(graph.outgoing_transitions("paid").len(), 2);
        assert_eq!(graph.graph.edge_count(), 4);
    }

    #[test]
    fn test_state_classification() {
        let graph = build(&order_flow());
        // "cancelled" sorts first, so it is the initial state even though
        // nothing leaves it.
        assert_eq!(
            graph.get_state("cancelled").unwrap().classification,
            StateClass::Initial
        );
        assert_eq!(
            graph.get_state("created").unwrap().classification,
            StateClass::EntryOnly
        );
        assert_eq!(graph.get_state("paid").unwrap().classification, StateClass::Active);
        assert_eq!(
            graph.get_state("shipped").unwrap().classification,
            StateClass::Absorbing
        );
    }

    #[test]
    fn test_to_dot_output() {
        let graph = build(&crate::definition::tests::on_off());
        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph Switch {"));
        assert!(dot.contains("\"idle\" [label=\"idle (0)\", fillcolor=\"lightblue\"]"));
        assert!(dot.contains("\"idle\" -> \"running\" [label=\"start\"]"));
        assert_eq!(dot, graph.to_dot());
    }

    #[test]
    fn test_graph_stats() {
        let stats = build(&order_flow()).stats();
        assert_eq!(stats.total_states, 4);
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.total_edges, 4);
        assert_eq!(stats.initial_state, "cancelled");
        assert_eq!(stats.absorbing_states, vec!["cancelled", "shipped"]);
        assert_eq!(stats.entry_only_states, vec!["created"]);
    }
}
