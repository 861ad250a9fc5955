//! This module defines `Definition`, a loaded machine together with its metadata, and the
//! JSON document format it can be read from.
//!
//! The JSON layout:
//!
//! ```json
//! {
//!   "q_states": { "q_list": ["q0", "qf"], "initial": "q0", "final": "qf" },
//!   "alphabet": ["1"],
//!   "tape_alphabet": ["1", null],
//!   "delta": [
//!     {
//!       "params": { "initial_state": "q0", "tape_input": "1" },
//!       "output": { "final_state": "q0", "tape_output": "1", "tape_displacement": "R" }
//!     }
//!   ],
//!   "simulation_strings": ["11"]
//! }
//! ```
//!
//! Absent or `null` memory and tape values denote blank. Numbers and booleans are read as
//! their textual form. An absent or `null` `tape_displacement` means Stay; it is not read as
//! the text `"None"`, which would be an invalid move.

use crate::machine::Machine;
use crate::types::{HeadMove, Symbol, TransitionKey, TransitionResult, TuringMachineError};
use serde::Deserialize;
use serde_json::Value;

/// A machine loaded from a definition file, with its name and configured inputs.
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: Option<String>,
    pub machine: Machine,
    /// Inputs to simulate when the caller does not supply its own.
    pub simulation_strings: Vec<String>,
}

/// The raw JSON document, before normalization.
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    q_states: StateSection,
    #[serde(default)]
    alphabet: Vec<Value>,
    #[serde(default)]
    tape_alphabet: Vec<Value>,
    /// A literal token that also denotes blank, for documents that cannot use `null`.
    #[serde(default)]
    blank: Option<String>,
    #[serde(default)]
    delta: Vec<Delta>,
    #[serde(default)]
    simulation_strings: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct StateSection {
    #[serde(default)]
    q_list: Vec<Value>,
    #[serde(default)]
    initial: Option<Value>,
    #[serde(default, rename = "final")]
    finals: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

#[derive(Debug, Deserialize)]
struct Delta {
    params: Params,
    output: Output,
}

#[derive(Debug, Deserialize)]
struct Params {
    initial_state: Value,
    #[serde(default)]
    mem_cache_value: Value,
    #[serde(default)]
    tape_input: Value,
}

#[derive(Debug, Deserialize)]
struct Output {
    final_state: Value,
    #[serde(default)]
    mem_cache_value: Value,
    #[serde(default)]
    tape_output: Value,
    #[serde(default)]
    tape_displacement: Option<Value>,
}

impl Definition {
    /// Reads a definition from a JSON document.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the document is well formed and the machine builds.
    /// * `Err(TuringMachineError::DefinitionError)` if the JSON is malformed.
    /// * `Err(TuringMachineError::ConfigError)` if the states are inconsistent.
    pub fn from_json(content: &str) -> Result<Self, TuringMachineError> {
        let document: Document = serde_json::from_str(content)
            .map_err(|e| TuringMachineError::DefinitionError(format!("Malformed JSON: {e}")))?;

        document.into_definition()
    }
}

impl Document {
    fn into_definition(self) -> Result<Definition, TuringMachineError> {
        let blank = self.blank.as_deref();
        let symbol = |value: &Value| normalize_symbol(value, blank);

        let finals: Vec<String> = match &self.q_states.finals {
            Some(OneOrMany::Many(values)) => values.iter().map(stringify).collect(),
            Some(OneOrMany::One(Value::Null)) | None => Vec::new(),
            Some(OneOrMany::One(value)) => vec![stringify(value)],
        };

        let transitions: Vec<(TransitionKey, TransitionResult)> = self
            .delta
            .iter()
            .map(|delta| {
                let key = TransitionKey::new(
                    stringify(&delta.params.initial_state),
                    symbol(&delta.params.mem_cache_value),
                    symbol(&delta.params.tape_input),
                );
                let result = TransitionResult {
                    next_state: stringify(&delta.output.final_state),
                    memory: symbol(&delta.output.mem_cache_value),
                    write: symbol(&delta.output.tape_output),
                    head_move: delta
                        .output
                        .tape_displacement
                        .as_ref()
                        .map(|value| HeadMove::new(stringify(value)))
                        .unwrap_or_default(),
                };
                (key, result)
            })
            .collect();

        let mut builder = Machine::builder()
            .states(self.q_states.q_list.iter().map(stringify))
            .finals(finals)
            .alphabet(self.alphabet.iter().map(stringify))
            .tape_alphabet(self.tape_alphabet.iter().map(symbol))
            .transitions(transitions);

        if let Some(initial) = &self.q_states.initial {
            builder = builder.initial(stringify(initial));
        }

        Ok(Definition {
            name: self.name,
            machine: builder.build()?,
            simulation_strings: self.simulation_strings.iter().map(stringify).collect(),
        })
    }
}

/// Converts a document value to a symbol: `null` and the optional blank token become blank.
fn normalize_symbol(value: &Value, blank: Option<&str>) -> Symbol {
    match value {
        Value::Null => Symbol::Blank,
        Value::String(s) if Some(s.as_str()) == blank => Symbol::Blank,
        other => Symbol::Literal(stringify(other)),
    }
}

/// Returns the textual form of a scalar value, without JSON quoting for strings.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
