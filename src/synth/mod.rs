//! Synthesis module - turn a definition into a generated machine

pub mod ir;
pub mod pipeline;
pub mod transition;

pub use ir::MachineModule;
pub use pipeline::{Pipeline, synthesize, write_atomically};
