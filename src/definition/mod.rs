//! Definition model - the declarative transition table
//!
//! A [`Definition`] is decoded once from a TOML (or JSON) document, validated,
//! and then only read. States are never declared; see [`states`].

use crate::{Error, Result};
use blake2::{Blake2s256, Digest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub mod states;
pub mod width;

pub use states::StateSet;
pub use width::UintWidth;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Root of the transition table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Imports", default)]
    pub imports: Vec<String>,

    #[serde(rename = "PackageName")]
    pub package_name: String,

    #[serde(rename = "UseSLog", alias = "useLogging", default)]
    pub use_logging: bool,

    /// Keyed by event name. Ordered so that every traversal is by sorted name.
    #[serde(rename = "Events", default)]
    pub events: BTreeMap<String, EventDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// States the event may fire from. Duplicates are tolerated and ignored.
    #[serde(rename = "Source", default)]
    pub sources: Vec<String>,

    #[serde(rename = "Destination")]
    pub destination: String,

    /// Call signature, in declaration order
    #[serde(rename = "Params", default)]
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Type")]
    pub param_type: String,
}

impl Param {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
        }
    }
}

impl EventDefinition {
    pub fn new<S: Into<String>>(
        sources: impl IntoIterator<Item = S>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            destination: destination.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
}

/// Whether `name` can be embedded verbatim as an identifier
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Generated symbol for a state name
pub fn state_symbol(name: &str) -> String {
    format!("STATE_{}", name.to_uppercase())
}

/// Generated symbol for an event ordinal constant
pub fn event_symbol(name: &str) -> String {
    format!("EVENT_{}", name.to_uppercase())
}

/// Digest of the raw input document, embedded in generated headers
pub fn source_digest(bytes: &[u8]) -> String {
    format!("blake2s-256:{}", hex::encode(Blake2s256::digest(bytes)))
}

impl Definition {
    pub fn new(name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            package_name: package_name.into(),
            use_logging: false,
            events: BTreeMap::new(),
        }
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.use_logging = enabled;
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    pub fn with_event(mut self, name: impl Into<String>, event: EventDefinition) -> Self {
        self.events.insert(name.into(), event);
        self
    }

    /// Decode a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Decode a JSON document
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Events with their ordinal, in sorted-name order
    pub fn indexed_events(&self) -> impl Iterator<Item = (usize, &String, &EventDefinition)> {
        self.events
            .iter()
            .enumerate()
            .map(|(ordinal, (name, event))| (ordinal, name, event))
    }

    /// Check every model rule, reporting the first violation
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.name) {
            return Err(Error::invalid_definition(format!(
                "machine name '{}' is not a valid identifier",
                self.name
            )));
        }
        if !is_identifier(&self.package_name) {
            return Err(Error::invalid_definition(format!(
                "package name '{}' is not a valid identifier",
                self.package_name
            )));
        }
        if let Some(import) = self.imports.iter().find(|i| i.trim().is_empty()) {
            return Err(Error::invalid_definition(format!(
                "import entry '{}' is empty",
                import
            )));
        }
        if self.events.is_empty() {
            return Err(Error::EmptyStateSet);
        }

        for (name, event) in &self.events {
            if !is_identifier(name) {
                return Err(Error::invalid_definition(format!(
                    "event name '{}' is not a valid identifier",
                    name
                )));
            }
            if event.sources.is_empty() {
                return Err(Error::invalid_definition(format!(
                    "event '{}' has no source states",
                    name
                )));
            }
            for state in event.sources.iter().chain(Some(&event.destination)) {
                if !is_identifier(state) {
                    return Err(Error::invalid_definition(format!(
                        "state '{}' referenced by event '{}' is not a valid identifier",
                        state, name
                    )));
                }
            }

            let mut seen = HashSet::new();
            for param in &event.params {
                if !is_identifier(&param.name) {
                    return Err(Error::invalid_definition(format!(
                        "parameter '{}' of event '{}' is not a valid identifier",
                        param.name, name
                    )));
                }
                if param.param_type.trim().is_empty() {
                    return Err(Error::invalid_definition(format!(
                        "parameter '{}' of event '{}' has no type",
                        param.name, name
                    )));
                }
                if !seen.insert(param.name.as_str()) {
                    return Err(Error::invalid_definition(format!(
                        "parameter '{}' is declared twice on event '{}'",
                        param.name, name
                    )));
                }
            }
        }

        check_collisions(self.events.keys().map(String::as_str), event_symbol)?;
        let states = StateSet::derive(self)?;
        check_collisions(states.names().iter().map(String::as_str), state_symbol)?;
        Ok(())
    }
}

/// Reject two distinct names that mangle to one symbol
fn check_collisions<'a>(
    names: impl Iterator<Item = &'a str>,
    mangle: fn(&str) -> String,
) -> Result<()> {
    let mut symbols: HashMap<String, &str> = HashMap::new();
    for name in names {
        let symbol = mangle(name);
        if let Some(first) = symbols.get(&symbol) {
            return Err(Error::SymbolCollision {
                symbol,
                first: first.to_string(),
                second: name.to_string(),
            });
        }
        symbols.insert(symbol, name);
    }
    Ok(())
}

/// A definition together with where it came from
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub definition: Definition,
    pub digest: String,
}

impl SourceDocument {
    /// Read and decode a definition file; `.json` files use JSON, anything else TOML
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)?;
        let definition = Self::decode(&path, &contents)?;

        tracing::debug!(
            "Decoded {:?}: {} events, logging {}",
            path,
            definition.events.len(),
            definition.use_logging
        );

        Ok(Self {
            digest: source_digest(contents.as_bytes()),
            path,
            definition,
        })
    }

    fn decode(path: &Path, contents: &str) -> Result<Definition> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let decoded = if is_json {
            Definition::from_json_str(contents)
        } else {
            Definition::from_toml_str(contents)
        };

        decoded.map_err(|e| match e {
            Error::DefinitionParse { message, .. } => Error::DefinitionParse {
                file: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }
}
