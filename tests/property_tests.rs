//! Property-based tests for state derivation, width selection and synthesis.
//!
//! Definitions are generated over small pools of state and event names so
//! that sources and destinations overlap often.

use fsmgen::definition::{Definition, EventDefinition, StateSet, UintWidth};
use fsmgen::emit::Target;
use fsmgen::synth::{Pipeline, synthesize};
use proptest::prelude::*;
use std::collections::BTreeSet;

prop_compose! {
    fn arbitrary_event()(
        sources in prop::collection::vec(0..24u8, 1..5),
        destination in 0..24u8,
    ) -> EventDefinition {
        EventDefinition::new(sources.iter().map(|s| format!("s{}", s)), format!("s{}", destination))
    }
}

prop_compose! {
    fn arbitrary_definition()(
        events in prop::collection::btree_map(0..32u8, arbitrary_event(), 1..8),
        use_logging in any::<bool>(),
    ) -> Definition {
        events.into_iter().fold(
            Definition::new("Machine", "machines").with_logging(use_logging),
            |def, (n, event)| def.with_event(format!("ev{}", n), event),
        )
    }
}

fn declared_states(def: &Definition) -> BTreeSet<String> {
    def.events
        .values()
        .flat_map(|e| e.sources.iter().chain(std::iter::once(&e.destination)))
        .cloned()
        .collect()
}

proptest! {
    #[test]
    fn width_is_smallest_that_fits(count in 1usize..200_000) {
        let width = UintWidth::for_count(count);
        prop_assert!((count - 1) as u64 <= width.max_value());

        let smaller = UintWidth::LADDER.iter().filter(|w| **w < width);
        for w in smaller {
            prop_assert!(((count - 1) as u64) > w.max_value());
        }
    }

    #[test]
    fn state_set_is_union_of_sources_and_destinations(def in arbitrary_definition()) {
        let states = StateSet::derive(&def).unwrap();
        let expected: Vec<String> = declared_states(&def).into_iter().collect();
        prop_assert_eq!(states.names(), expected.as_slice());
        prop_assert_eq!(states.initial(), expected[0].as_str());
    }

    #[test]
    fn state_ordinals_follow_sorted_names(def in arbitrary_definition()) {
        let module = synthesize(&def).unwrap();
        for (i, constant) in module.states.constants.iter().enumerate() {
            prop_assert_eq!(constant.ordinal, i as u64);
        }
        for pair in module.lookup.entries.windows(2) {
            prop_assert!(pair[0].1 < pair[1].1);
        }
    }

    #[test]
    fn event_ordinals_follow_sorted_names(def in arbitrary_definition()) {
        let module = synthesize(&def).unwrap();
        let names: Vec<&str> = module.transitions.iter().map(|t| t.event.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(&names, &sorted);
        for (i, t) in module.transitions.iter().enumerate() {
            prop_assert_eq!(t.ordinal, i as u64);
        }
    }

    #[test]
    fn guard_accepts_exactly_declared_sources(def in arbitrary_definition()) {
        let module = synthesize(&def).unwrap();
        for t in &module.transitions {
            let event = &def.events[&t.event];
            let expected: BTreeSet<String> = event
                .sources
                .iter()
                .map(|s| format!("STATE_{}", s.to_uppercase()))
                .collect();
            let guard: BTreeSet<String> = t.guard.iter().cloned().collect();
            prop_assert_eq!(guard.len(), t.guard.len());
            prop_assert_eq!(guard, expected);
            prop_assert_eq!(&t.destination, &event.destination);
        }
    }

    #[test]
    fn widths_match_counts(def in arbitrary_definition()) {
        let module = synthesize(&def).unwrap();
        let state_count = declared_states(&def).len();
        prop_assert_eq!(module.states.width, UintWidth::for_count(state_count));
        prop_assert_eq!(module.machine.event_width, UintWidth::for_count(def.events.len()));
    }

    #[test]
    fn generation_is_deterministic(def in arbitrary_definition(), rust in any::<bool>()) {
        let target = if rust { Target::Rust } else { Target::Go };
        let pipeline = Pipeline::new(target);
        let first = pipeline.run(&def).unwrap();
        let second = pipeline.run(&def.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_state_symbol_is_emitted(def in arbitrary_definition()) {
        let code = Pipeline::new(Target::Go).run(&def).unwrap();
        for state in declared_states(&def) {
            let symbol = format!("STATE_{}", state.to_uppercase());
            prop_assert!(code.contains(&symbol));
        }
    }
}
