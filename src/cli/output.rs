//! Output formatting module
//!
//! This module renders inspection results for the different output formats.

use crate::{
    Error, Result,
    definition::{Definition, UintWidth},
    state_machine::{TransitionGraph, analyzer::AnalysisReport},
};
use serde_json::json;

/// Output the transition table summary as JSON
pub fn output_json(
    w: &mut impl std::io::Write,
    definition: &Definition,
    graph: &TransitionGraph,
    report: &AnalysisReport,
) -> Result<()> {
    let stats = graph.stats();
    let output = json!({
        "machine": definition.name,
        "package": definition.package_name,
        "logging": definition.use_logging,
        "state_width": UintWidth::for_count(stats.total_states).to_string(),
        "event_width": UintWidth::for_count(definition.events.len()).to_string(),
        "summary": stats,
        "analysis": report,
        "states": graph.all_states().iter().map(|s| {
            json!({
                "ordinal": s.ordinal,
                "name": s.name,
                "symbol": s.symbol,
                "class": s.classification.name(),
            })
        }).collect::<Vec<_>>(),
        "events": definition.indexed_events().map(|(ordinal, name, event)| {
            json!({
                "ordinal": ordinal,
                "name": name,
                "sources": event.sources,
                "destination": event.destination,
                "params": event.params.iter().map(|p| json!({"name": p.name, "type": p.param_type})).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>(),
    });

    serde_json::to_writer_pretty(&mut *w, &output)
        .map_err(|e| Error::custom(format!("JSON output error: {}", e)))?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Output the transition table summary as a text table
pub fn output_table(
    w: &mut impl std::io::Write,
    definition: &Definition,
    graph: &TransitionGraph,
    report: &AnalysisReport,
) -> Result<()> {
    let stats = graph.stats();

    writeln!(w, "State Machine {} (package {})", definition.name, definition.package_name)?;
    writeln!(w, "{}", "=".repeat(80))?;
    writeln!(w)?;

    writeln!(w, "Summary:")?;
    writeln!(
        w,
        "  States:  {:<6} ({})",
        stats.total_states,
        UintWidth::for_count(stats.total_states)
    )?;
    writeln!(
        w,
        "  Events:  {:<6} ({})",
        stats.total_events,
        UintWidth::for_count(definition.events.len())
    )?;
    writeln!(w, "  Edges:   {}", stats.total_edges)?;
    writeln!(w, "  Initial: {}", stats.initial_state)?;
    writeln!(w, "  Pattern: {}", report.pattern.display_name())?;
    writeln!(w)?;

    writeln!(w, "States:")?;
    writeln!(w, "{:-<80}", "")?;
    writeln!(w, "{:>4} {:<24} {:<32} {:<12}", "#", "Name", "Symbol", "Class")?;
    writeln!(w, "{:-<80}", "")?;
    for state in graph.all_states() {
        writeln!(
            w,
            "{:>4} {:<24} {:<32} {:<12}",
            state.ordinal,
            state.name,
            state.symbol,
            state.classification.name()
        )?;
    }
    writeln!(w)?;

    writeln!(w, "Events:")?;
    writeln!(w, "{:-<80}", "")?;
    writeln!(w, "{:>4} {:<20} {:<30} {:<20}", "#", "Name", "From", "To")?;
    writeln!(w, "{:-<80}", "")?;
    for (ordinal, name, event) in definition.indexed_events() {
        writeln!(
            w,
            "{:>4} {:<20} {:<30} {:<20}",
            ordinal,
            name,
            event.sources.join(", "),
            event.destination
        )?;
    }
    writeln!(w)?;

    Ok(())
}
