//! State derivation
//!
//! States are the union of every source and destination referenced by the
//! events, sorted by name. The position in that order is the state's ordinal,
//! and ordinal 0 is the initial state of the generated machine.

use crate::definition::{Definition, state_symbol};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Sorted, de-duplicated state names of a definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSet {
    names: Vec<String>,
}

impl StateSet {
    /// Derive the state set. Fails only when there are no events.
    pub fn derive(definition: &Definition) -> Result<Self> {
        if definition.events.is_empty() {
            return Err(Error::EmptyStateSet);
        }

        let names: BTreeSet<&str> = definition
            .events
            .values()
            .flat_map(|event| {
                event
                    .sources
                    .iter()
                    .chain(std::iter::once(&event.destination))
            })
            .map(String::as_str)
            .collect();

        Ok(Self {
            names: names.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ordinal(name).is_some()
    }

    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.names
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .ok()
    }

    /// The state a fresh machine starts in
    pub fn initial(&self) -> &str {
        &self.names[0]
    }

    /// Mangled symbol of a member state
    pub fn symbol(&self, name: &str) -> Result<String> {
        if self.contains(name) {
            Ok(state_symbol(name))
        } else {
            Err(Error::synthesis(format!(
                "state '{}' is not part of the derived state set",
                name
            )))
        }
    }

    /// `(ordinal, name)` pairs in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::EventDefinition;

    #[test]
    fn test_derive_on_off() {
        let states = StateSet::derive(&crate::definition::tests::on_off()).unwrap();
        assert_eq!(states.names(), &["idle".to_string(), "running".to_string()]);
        assert_eq!(states.ordinal("idle"), Some(0));
        assert_eq!(states.ordinal("running"), Some(1));
        assert_eq!(states.initial(), "idle");
    }

    #[test]
    fn test_derive_is_exact_union() {
        let def = Definition::new("M", "p")
            .with_event("a", EventDefinition::new(["s3", "s1", "s3"], "s2"))
            .with_event("b", EventDefinition::new(["s2"], "sink"));
        let states = StateSet::derive(&def).unwrap();
        assert_eq!(states.names(), &["s1", "s2", "s3", "sink"]);
        assert!(!states.contains("s4"));
        assert_eq!(states.ordinal("s4"), None);
    }

    #[test]
    fn test_destination_only_state_is_legal() {
        let def = Definition::new("M", "p").with_event("end", EventDefinition::new(["b"], "a"));
        let states = StateSet::derive(&def).unwrap();
        assert_eq!(states.initial(), "a");
        assert_eq!(states.len(), 2);
    }

    #[test]
    fn test_derive_empty_fails() {
        let def = Definition::new("M", "p");
        assert!(matches!(StateSet::derive(&def), Err(Error::EmptyStateSet)));
    }

    #[test]
    fn test_symbol_of_unknown_state() {
        let states = StateSet::derive(&crate::definition::tests::on_off()).unwrap();
        assert_eq!(states.symbol("idle").unwrap(), "STATE_IDLE");
        assert!(matches!(states.symbol("gone"), Err(Error::Synthesis(_))));
    }
}
