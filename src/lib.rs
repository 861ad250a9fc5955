//! This crate provides the core logic of a single-tape Turing machine simulator whose
//! machines carry one extra memory register.
//! It includes modules for loading machine definitions, validating and analyzing them,
//! and executing them step by step into a full trace and an accept/reject verdict.

pub mod analyzer;
pub mod definition;
pub mod engine;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
/// Re-exports the `Definition` struct from the definition module.
pub use definition::Definition;
/// Re-exports the `Engine` struct and `Step` enum from the engine module.
pub use engine::{Engine, Step};
/// Re-exports the `DefinitionLoader` struct and `Format` enum from the loader module.
pub use loader::{DefinitionLoader, Format};
/// Re-exports the `Machine` definition and its builder from the machine module.
pub use machine::{Machine, MachineBuilder};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
pub use table::TransitionTable;
pub use tape::Tape;
/// Re-exports the data types shared across the simulator from the types module.
pub use types::{
    Direction, HaltReason, HeadMove, SimulationResult, Snapshot, Symbol, TransitionKey,
    TransitionResult, TuringMachineError, DEFAULT_MAX_STEPS,
};
