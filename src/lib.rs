//! Finite State Machine Generator
//!
//! Reads a declarative transition table and emits source code for a guarded,
//! type-safe state machine.
//!
//! This library provides functionality for:
//! - Decoding and validating transition tables (TOML or JSON)
//! - Deriving the state set and ordinal encodings
//! - Synthesizing a language-neutral representation of the machine
//! - Emitting it as Go or Rust, optionally through the language's formatter
//! - Inspecting the transition graph (table, JSON, Graphviz DOT)

pub mod cli;
pub mod config;
pub mod definition;
pub mod emit;
pub mod error;
pub mod format;
pub mod state_machine;
pub mod synth;

pub use config::Config;
pub use definition::{Definition, EventDefinition, Param, SourceDocument};
pub use emit::Target;
pub use error::{Error, Result};
pub use synth::Pipeline;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level. Logs go to stderr so that
/// generated code printed on stdout stays clean.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
