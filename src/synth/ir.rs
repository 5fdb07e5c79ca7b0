//! Intermediate representation of a generated machine
//!
//! The synthesis pipeline decides *what* is generated and records it here as
//! plain declarations. Emitters in [`crate::emit`] decide how each declaration
//! prints in a destination language. Every list is already in emission order.

use crate::definition::{Param, UintWidth};
use serde::{Deserialize, Serialize};

/// A complete generated document, block by block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineModule {
    pub header: Header,
    pub states: StateEnum,
    pub constructor: Constructor,
    pub machine: MachineType,
    pub lookup: LookupTable,
    pub transitions: Vec<TransitionFn>,
}

/// Package declaration and imports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub package: String,
    /// De-duplicated; the logging facility, when present, comes first
    pub imports: Vec<Import>,
    pub source_digest: Option<String>,
}

impl Header {
    pub fn uses_logging(&self) -> bool {
        self.imports.contains(&Import::Logging)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Import {
    /// The destination language's structured-logging facility
    Logging,
    /// A user-supplied reference, emitted verbatim
    Module(String),
}

/// One named constant per state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEnum {
    pub width: UintWidth,
    /// The first entry is the start of the enumeration (ordinal 0)
    pub constants: Vec<StateConst>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConst {
    pub symbol: String,
    pub ordinal: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    pub machine: String,
    /// Symbol of the state a new machine starts in
    pub initial_state: String,
    /// Width of the event ordinal passed to the transition hook
    pub event_width: UintWidth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineType {
    pub name: String,
    pub state_width: UintWidth,
    pub event_width: UintWidth,
}

/// Ordinal to original state name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    pub machine: String,
    pub key_width: UintWidth,
    pub entries: Vec<(u64, String)>,
}

/// A guarded transition method for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionFn {
    pub machine: String,
    pub event: String,
    pub event_symbol: String,
    pub ordinal: u64,
    pub event_width: UintWidth,
    /// Signature, in declaration order
    pub params: Vec<Param>,
    /// Symbols of the accepted current states, in ordinal order
    pub guard: Vec<String>,
    pub destination_symbol: String,
    pub destination: String,
    pub log: Option<LogCall>,
}

/// Structured log entry emitted on a successful transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogCall {
    /// Parameter names attached as fields, after the starting state
    pub fields: Vec<String>,
    pub message: String,
}
