//! Emitters - print a [`MachineModule`] as destination-language source
//!
//! Each emitter first checks that every name it will embed verbatim is legal
//! in its language, then renders the blocks in module order. Emitters are
//! pure: same module in, same text out.

use crate::synth::MachineModule;
use crate::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod go;
pub mod rust;

/// Renders a synthesized module
pub trait Emitter {
    fn emit(&self, module: &MachineModule) -> Result<String>;
}

/// Destination languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Go source (the default)
    #[default]
    Go,
    /// Rust source
    Rust,
}

impl Target {
    pub fn emitter(self) -> Box<dyn Emitter> {
        match self {
            Target::Go => Box::new(go::GoEmitter),
            Target::Rust => Box::new(rust::RustEmitter),
        }
    }

    /// Destination used when none is configured
    pub fn default_dest_file(self) -> &'static str {
        match self {
            Target::Go => "fsm_GEN.go",
            Target::Rust => "fsm_gen.rs",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::Go => "go",
            Target::Rust => "rust",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First line of every generated document
pub(crate) const GENERATED_BANNER: &str = "// Code generated by fsmgen. DO NOT EDIT.";

/// Reject `name` if it appears in `reserved`
pub(crate) fn ensure_not_reserved(
    target: Target,
    role: &str,
    name: &str,
    reserved: &[&str],
) -> Result<()> {
    if reserved.contains(&name) {
        return Err(Error::synthesis(format!(
            "{} '{}' is reserved in {} output",
            role, name, target
        )));
    }
    Ok(())
}

/// Reject two generated items sharing one name. Items are `(symbol, declared name)`.
pub(crate) fn ensure_distinct<'a>(
    items: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<()> {
    let mut seen: Vec<(&str, &str)> = Vec::new();
    for (symbol, origin) in items {
        if let Some((_, first)) = seen.iter().find(|(s, _)| *s == symbol) {
            return Err(Error::SymbolCollision {
                symbol: symbol.to_string(),
                first: first.to_string(),
                second: origin.to_string(),
            });
        }
        seen.push((symbol, origin));
    }
    Ok(())
}

/// Double-quoted literal with `\` and `"` escaped; valid in both Go and Rust
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults() {
        assert_eq!(Target::default(), Target::Go);
        assert_eq!(Target::Go.default_dest_file(), "fsm_GEN.go");
        assert_eq!(Target::Rust.default_dest_file(), "fsm_gen.rs");
        assert_eq!(Target::Rust.to_string(), "rust");
    }

    #[test]
    fn test_target_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            target: Target,
        }
        let w: Wrapper = toml::from_str("target = \"rust\"").unwrap();
        assert_eq!(w.target, Target::Rust);
    }

    #[test]
    fn test_quoted() {
        assert_eq!(quoted("idle"), "\"idle\"");
        assert_eq!(quoted("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_reserved() {
        let err = ensure_not_reserved(Target::Go, "event", "func", &["func"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Synthesis error: event 'func' is reserved in go output"
        );
        assert!(ensure_not_reserved(Target::Go, "event", "start", &["func"]).is_ok());
    }

    #[test]
    fn test_distinct() {
        assert!(ensure_distinct([("STATE_A", "a"), ("EVENT_A", "a")]).is_ok());

        let err = ensure_distinct([("STATE_A", "a"), ("X", "x"), ("STATE_A", "A")]).unwrap_err();
        match err {
            Error::SymbolCollision {
                symbol,
                first,
                second,
            } => {
                assert_eq!(symbol, "STATE_A");
                assert_eq!(first, "a");
                assert_eq!(second, "A");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
