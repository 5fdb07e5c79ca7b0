//! Code synthesis pipeline
//!
//! validate → derive states → build [`MachineModule`] → emit → format.
//! Nothing is returned unless every stage succeeds.

use crate::definition::{Definition, StateSet, UintWidth};
use crate::emit::Target;
use crate::format::{Formatter, Passthrough};
use crate::synth::ir::*;
use crate::synth::transition::{TransitionContext, generate_transition};
use crate::{Error, Result};
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Build the intermediate representation of `definition`
pub fn synthesize(definition: &Definition) -> Result<MachineModule> {
    definition.validate()?;
    let states = StateSet::derive(definition)?;

    let state_width = UintWidth::for_count(states.len());
    let event_width = UintWidth::for_count(definition.events.len());
    tracing::debug!(
        "{} states as {}, {} events as {}",
        states.len(),
        state_width,
        definition.events.len(),
        event_width
    );

    let header = header(definition);

    let state_enum = StateEnum {
        width: state_width,
        constants: states
            .iter()
            .map(|(ordinal, name)| {
                Ok(StateConst {
                    symbol: states.symbol(name)?,
                    ordinal: ordinal as u64,
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    let constructor = Constructor {
        machine: definition.name.clone(),
        initial_state: states.symbol(states.initial())?,
        event_width,
    };

    let machine = MachineType {
        name: definition.name.clone(),
        state_width,
        event_width,
    };

    let lookup = LookupTable {
        machine: definition.name.clone(),
        key_width: state_width,
        entries: states
            .iter()
            .map(|(ordinal, name)| (ordinal as u64, name.to_string()))
            .collect(),
    };

    let ctx = TransitionContext {
        machine: &definition.name,
        states: &states,
        event_width,
        use_logging: definition.use_logging,
    };
    let transitions = definition
        .indexed_events()
        .map(|(ordinal, name, event)| generate_transition(&ctx, ordinal, name, event))
        .collect::<Result<Vec<_>>>()?;

    Ok(MachineModule {
        header,
        states: state_enum,
        constructor,
        machine,
        lookup,
        transitions,
    })
}

fn header(definition: &Definition) -> Header {
    let mut imports = Vec::new();
    if definition.use_logging {
        imports.push(Import::Logging);
    }
    for import in &definition.imports {
        let import = Import::Module(import.trim().to_string());
        if !imports.contains(&import) {
            imports.push(import);
        }
    }

    Header {
        package: definition.package_name.clone(),
        imports,
        source_digest: None,
    }
}

/// Runs a definition through synthesis, emission and formatting
pub struct Pipeline {
    target: Target,
    formatter: Box<dyn Formatter>,
    source_digest: Option<String>,
}

impl Pipeline {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            formatter: Box::new(Passthrough),
            source_digest: None,
        }
    }

    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_source_digest(mut self, digest: impl Into<String>) -> Self {
        self.source_digest = Some(digest.into());
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Produce the final document for `definition`
    pub fn run(&self, definition: &Definition) -> Result<String> {
        let mut module = synthesize(definition)?;
        module.header.source_digest = self.source_digest.clone();

        let text = self.target.emitter().emit(&module)?;
        tracing::debug!("Emitted {} bytes of {} source", text.len(), self.target);

        let formatted = self.formatter.format(&text)?;
        tracing::info!(
            "Generated {} with {} states and {} transitions",
            definition.name,
            module.states.constants.len(),
            module.transitions.len()
        );
        Ok(formatted)
    }
}

/// Write `contents` to `path` in one step: a sibling temp file is renamed over
/// the destination, so a failed write never leaves a truncated file behind.
/// The temp file is created exclusively and removed on any failure.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("Destination {:?} is not a file path", path)))?;

    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp = path.with_file_name(tmp_name);

    let mut file = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
    let written = file.write_all(contents.as_bytes());
    drop(file);

    if let Err(e) = written.and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
