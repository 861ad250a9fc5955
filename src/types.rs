//! This module defines the core data structures and types used throughout the simulator,
//! including tape symbols, transition keys and results, run outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The number of steps a run is allowed before it is cut off.
pub const DEFAULT_MAX_STEPS: usize = 1000;
/// The character used to render a blank cell or a blank memory register.
pub const BLANK_PLACEHOLDER: char = '_';
/// The token that denotes the blank symbol in `.tm` definitions unless overridden.
pub const DEFAULT_BLANK_TOKEN: &str = "_";
/// The maximum allowed size for a machine definition in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB

/// A value stored on the tape or in the memory register.
///
/// `Blank` is a first-class value and is never represented by a literal string,
/// so a definition may use `"_"` or `"B"` as ordinary symbols.
/// Serializes as `null` for blank and as a string otherwise.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Symbol {
    #[default]
    Blank,
    Literal(String),
}

impl Symbol {
    /// Creates a literal symbol.
    pub fn literal(value: impl Into<String>) -> Self {
        Symbol::Literal(value.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Symbol::Blank)
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol::Literal(c.to_string())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::Literal(s.to_string())
    }
}

impl From<Option<String>> for Symbol {
    fn from(value: Option<String>) -> Self {
        value.map_or(Symbol::Blank, Symbol::Literal)
    }
}

impl From<Symbol> for Option<String> {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Blank => None,
            Symbol::Literal(s) => Some(s),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Blank => write!(f, "{BLANK_PLACEHOLDER}"),
            Symbol::Literal(s) => f.write_str(s),
        }
    }
}

/// Represents the possible directions the tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Returns the short token used in definition files.
    pub fn token(&self) -> &'static str {
        match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "S",
        }
    }
}

impl FromStr for Direction {
    type Err = TuringMachineError;

    /// Accepts `L`/`R`/`S`, the full names, and the arrow forms `<`, `>`, `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "Left" | "<" => Ok(Direction::Left),
            "R" | "Right" | ">" => Ok(Direction::Right),
            "S" | "Stay" | "-" => Ok(Direction::Stay),
            other => Err(TuringMachineError::InvalidMove(other.to_string())),
        }
    }
}

/// The head movement of a transition as it was written in the definition.
///
/// Definitions come from loosely validated external data, so the raw token is
/// kept and only resolved into a [`Direction`] when the transition fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadMove(String);

impl HeadMove {
    pub fn new(token: impl Into<String>) -> Self {
        HeadMove(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolves the token, failing with `InvalidMove` for anything but Left, Right or Stay.
    pub fn direction(&self) -> Result<Direction, TuringMachineError> {
        self.0.parse()
    }
}

impl Default for HeadMove {
    fn default() -> Self {
        Direction::Stay.into()
    }
}

impl From<&str> for HeadMove {
    fn from(token: &str) -> Self {
        HeadMove(token.to_string())
    }
}

impl From<Direction> for HeadMove {
    fn from(direction: Direction) -> Self {
        HeadMove(direction.token().to_string())
    }
}

/// Lookup key of a transition: (state, memory value, symbol under the head).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionKey {
    pub state: String,
    pub memory: Symbol,
    pub symbol: Symbol,
}

impl TransitionKey {
    pub fn new(state: impl Into<String>, memory: Symbol, symbol: Symbol) -> Self {
        Self {
            state: state.into(),
            memory,
            symbol,
        }
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.state, self.memory, self.symbol)
    }
}

/// What a transition does once its key matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    /// The state the machine moves to.
    pub next_state: String,
    /// The value stored in the memory register afterwards.
    pub memory: Symbol,
    /// The symbol written under the head before it moves.
    pub write: Symbol,
    /// The head movement applied after writing.
    pub head_move: HeadMove,
}

impl TransitionResult {
    pub fn new(
        next_state: impl Into<String>,
        memory: Symbol,
        write: Symbol,
        head_move: impl Into<HeadMove>,
    ) -> Self {
        Self {
            next_state: next_state.into(),
            memory,
            write,
            head_move: head_move.into(),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// No transition was defined for the current configuration.
    NoTransition,
    /// The step budget ran out before the machine halted on its own.
    MaxSteps,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::NoTransition => f.write_str("no_transition"),
            HaltReason::MaxSteps => f.write_str("max_steps"),
        }
    }
}

/// An instantaneous description of the machine at one step of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: usize,
    pub state: String,
    pub memory: Symbol,
    /// The used part of the tape, with the head cell in brackets.
    pub tape: String,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step {:03} | q={} | mem={} | tape: {}",
            self.step, self.state, self.memory, self.tape
        )
    }
}

/// The outcome of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Whether the final state belongs to the final-state set.
    pub accepted: bool,
    pub final_state: String,
    /// The used part of the tape, without the head marker.
    pub final_tape: String,
    /// One snapshot per executed step, plus the initial one.
    pub history: Vec<Snapshot>,
    pub halted_by: HaltReason,
}

impl SimulationResult {
    /// Returns the number of transitions that were applied.
    pub fn steps(&self) -> usize {
        self.history.len().saturating_sub(1)
    }
}

/// Represents the errors that can occur while building, loading or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The declared states are inconsistent with the initial or final states.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// A transition requested a head movement other than Left, Right or Stay.
    #[error("Invalid head movement: {0:?}")]
    InvalidMove(String),
    /// Indicates an error during the parsing of a `.tm` definition.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a structurally invalid definition document.
    #[error("Invalid definition: {0}")]
    DefinitionError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}
