//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::emit::Target;
use crate::{Config, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// Finite state machine code generator
#[derive(Parser, Debug)]
#[command(name = "fsmgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a state machine from a definition file
    Generate {
        /// FSM definition to generate from
        #[arg(long)]
        target_file: Option<PathBuf>,

        /// File to write generated code to
        #[arg(long)]
        dest_file: Option<PathBuf>,

        /// Destination language
        #[arg(short, long, value_enum)]
        lang: Option<Target>,

        /// Skip the external formatter
        #[arg(long)]
        no_format: bool,

        /// Print the generated code instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Describe the states and transitions of a definition
    Inspect {
        /// FSM definition to inspect
        #[arg(long)]
        target_file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Validate a definition file
    Validate {
        /// Path to definition file
        file: PathBuf,
    },
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// DOT format (Graphviz)
    Dot,
    /// Plain text table
    Table,
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Generate { .. } => commands::generate::execute(args, config),
        Commands::Inspect { .. } => commands::inspect::execute(args, config),
        Commands::Validate { file } => commands::validate::execute(file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "fsmgen",
            "generate",
            "--target-file",
            "door.toml",
            "--lang",
            "rust",
            "--stdout",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                target_file,
                lang,
                stdout,
                no_format,
                ..
            } => {
                assert_eq!(target_file, Some(PathBuf::from("door.toml")));
                assert_eq!(lang, Some(Target::Rust));
                assert!(stdout);
                assert!(!no_format);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_inspect_defaults_to_table() {
        let cli = Cli::try_parse_from(["fsmgen", "inspect"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Inspect {
                output: OutputFormat::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["fsmgen", "validate", "fsm.toml", "-v", "-c", "x.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_unknown_lang_rejected() {
        assert!(Cli::try_parse_from(["fsmgen", "generate", "--lang", "cobol"]).is_err());
    }
}
