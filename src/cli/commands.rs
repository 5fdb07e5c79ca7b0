//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::definition::SourceDocument;
use crate::{Config, Result, cli::Cli};
use std::path::{Path, PathBuf};

/// Load a definition and check it before anything is derived from it
fn load_validated(path: &Path) -> Result<SourceDocument> {
    tracing::info!("Loading definition from {:?}", path);
    let doc = SourceDocument::load(path)?;
    doc.definition.validate()?;
    Ok(doc)
}

/// Generate command implementation
pub mod generate {
    use super::*;
    use crate::cli::Commands;
    use crate::format::{Formatter, Passthrough};
    use crate::synth::{Pipeline, write_atomically};

    /// Execute the generate command
    pub fn execute(args: Cli, config: Config) -> Result<()> {
        let (target_file, dest_file, lang, no_format, stdout) = match args.command {
            Commands::Generate {
                target_file,
                dest_file,
                lang,
                no_format,
                stdout,
            } => (target_file, dest_file, lang, no_format, stdout),
            _ => unreachable!("generate::execute called with wrong command"),
        };

        let target = lang.unwrap_or(config.generate.target);
        let target_file = target_file.unwrap_or_else(|| config.generate.target_file.clone());
        let dest_file = dest_file.unwrap_or_else(|| config.dest_file(target));
        tracing::debug!("Target language: {}", target);

        let doc = load_validated(&target_file)?;

        let formatter: Box<dyn Formatter> = if no_format {
            Box::new(Passthrough)
        } else {
            config.formatter(target)?
        };

        let mut pipeline = Pipeline::new(target).with_formatter(formatter);
        if config.generate.digest {
            pipeline = pipeline.with_source_digest(doc.digest.clone());
        }

        let code = pipeline.run(&doc.definition)?;

        if stdout {
            print!("{}", code);
        } else {
            write_atomically(&dest_file, &code)?;
            tracing::info!("Wrote {:?}", dest_file);
        }

        Ok(())
    }
}

/// Inspect command implementation
pub mod inspect {
    use super::*;
    use crate::cli::{Commands, OutputFormat};
    use crate::state_machine::{analyzer, build_transition_graph};

    /// Execute the inspect command
    pub fn execute(args: Cli, config: Config) -> Result<()> {
        let (target_file, output_format) = match args.command {
            Commands::Inspect {
                target_file,
                output,
            } => (target_file, output),
            _ => unreachable!("inspect::execute called with wrong command"),
        };

        let target_file = target_file.unwrap_or_else(|| config.generate.target_file.clone());
        let doc = load_validated(&target_file)?;

        tracing::info!("Building transition graph...");
        let graph = build_transition_graph(&doc.definition)?;
        let report = analyzer::detect_pattern(&graph);

        match output_format {
            OutputFormat::Json => crate::cli::output::output_json(
                &mut std::io::stdout(),
                &doc.definition,
                &graph,
                &report,
            )?,
            OutputFormat::Table => crate::cli::output::output_table(
                &mut std::io::stdout(),
                &doc.definition,
                &graph,
                &report,
            )?,
            OutputFormat::Dot => print!("{}", graph.to_dot()),
        }

        Ok(())
    }
}

/// Validate command implementation
pub mod validate {
    use super::*;
    use crate::definition::{StateSet, UintWidth};
    use crate::state_machine::build_transition_graph;

    /// Execute the validate command
    pub fn execute(file: PathBuf) -> Result<()> {
        tracing::info!("Validating definition: {:?}", file);

        let doc = match SourceDocument::load(&file) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("❌ Failed to load definition: {}", e);
                return Err(e);
            }
        };
        let def = &doc.definition;

        println!("📋 Definition Validation Report");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("File: {:?}", file);
        println!("Digest: {}", doc.digest);
        println!();
        println!("Machine:");
        println!("  Name: {}", def.name);
        println!("  Package: {}", def.package_name);
        println!("  Logging: {}", if def.use_logging { "yes" } else { "no" });
        println!("  Imports: {}", def.imports.len());
        for import in &def.imports {
            println!("    - {}", import);
        }
        println!();

        if let Err(e) = def.validate() {
            println!("❌ Errors:");
            println!("   {}", e);
            println!();
            crate::bail!("Definition validation failed: {}", e);
        }

        let states = StateSet::derive(def)?;
        println!(
            "States: {} ({})",
            states.len(),
            UintWidth::for_count(states.len())
        );
        for (ordinal, name) in states.iter() {
            println!("    {:>3} {}", ordinal, name);
        }
        println!();
        println!(
            "Events: {} ({})",
            def.events.len(),
            UintWidth::for_count(def.events.len())
        );
        for (ordinal, name, event) in def.indexed_events() {
            println!(
                "    {:>3} {} [{}] -> {}",
                ordinal,
                name,
                event.sources.join(", "),
                event.destination
            );
        }
        println!();

        let graph = build_transition_graph(def)?;
        let warnings: Vec<String> = graph
            .find_entry_only_states()
            .into_iter()
            .filter(|s| s.ordinal != 0)
            .map(|s| format!("State '{}' is never a destination", s.name))
            .collect();

        if !warnings.is_empty() {
            println!("⚠️  Warnings:");
            for warning in &warnings {
                println!("   {}", warning);
            }
            println!();
        }

        println!("✅ Definition is valid!");
        Ok(())
    }
}
