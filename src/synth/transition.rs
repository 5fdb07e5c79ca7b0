//! Per-event transition generation

use crate::Result;
use crate::definition::{EventDefinition, StateSet, UintWidth, event_symbol};
use crate::synth::ir::{LogCall, TransitionFn};

/// Everything shared by all events of one machine
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub machine: &'a str,
    pub states: &'a StateSet,
    pub event_width: UintWidth,
    pub use_logging: bool,
}

/// Build the guarded transition for `name`, which holds position `ordinal` in
/// the sorted event order.
pub fn generate_transition(
    ctx: &TransitionContext<'_>,
    ordinal: usize,
    name: &str,
    event: &EventDefinition,
) -> Result<TransitionFn> {
    // Sources are a set: order by ordinal, drop repeats.
    let mut accepted = event
        .sources
        .iter()
        .map(|source| {
            let symbol = ctx.states.symbol(source)?;
            Ok((ctx.states.ordinal(source).unwrap_or_default(), symbol))
        })
        .collect::<Result<Vec<_>>>()?;
    accepted.sort();
    accepted.dedup();

    let destination_symbol = ctx.states.symbol(&event.destination)?;

    let log = ctx.use_logging.then(|| LogCall {
        fields: event.params.iter().map(|p| p.name.clone()).collect(),
        message: format!("transitioned to {}", event.destination),
    });

    tracing::debug!(
        "Event {} (ordinal {}): {} source(s) -> {}",
        name,
        ordinal,
        accepted.len(),
        destination_symbol
    );

    Ok(TransitionFn {
        machine: ctx.machine.to_string(),
        event: name.to_string(),
        event_symbol: event_symbol(name),
        ordinal: ordinal as u64,
        event_width: ctx.event_width,
        params: event.params.clone(),
        guard: accepted.into_iter().map(|(_, symbol)| symbol).collect(),
        destination_symbol,
        destination: event.destination.clone(),
        log,
    })
}
