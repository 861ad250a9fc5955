//! This module defines the `Engine`, which executes a `Machine` on one input.
//! It owns the tape, the current state and the memory register for the duration
//! of a single run, and produces the trace and verdict of that run.

use crate::machine::Machine;
use crate::tape::Tape;
use crate::types::{HaltReason, SimulationResult, Snapshot, Symbol, TuringMachineError};
use tracing::{debug, trace};

/// Represents the outcome of a single engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied and execution can continue.
    Continue,
    /// No transition is defined for the current configuration. Nothing was changed.
    Halt,
}

/// A single run of a `Machine`.
///
/// Every run gets its own tape and registers; the machine itself is only read.
pub struct Engine<'m> {
    machine: &'m Machine,
    state: String,
    memory: Symbol,
    tape: Tape,
    step_count: usize,
}

impl<'m> Engine<'m> {
    /// Creates an engine in the initial configuration: initial state, blank memory,
    /// and `input` written from position 0 with the head on its first character.
    pub fn new(machine: &'m Machine, input: &str) -> Self {
        Self {
            machine,
            state: machine.initial_state().to_string(),
            memory: Symbol::Blank,
            tape: Tape::from_input(input, machine.blank().clone()),
            step_count: 0,
        }
    }

    /// Executes a single transition.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if a transition was found and applied.
    /// * `Ok(Step::Halt)` if no transition exists. The configuration is left untouched.
    /// * `Err(TuringMachineError::InvalidMove)` if the transition names an unknown head movement.
    pub fn step(&mut self) -> Result<Step, TuringMachineError> {
        let machine = self.machine;
        let Some(transition) = machine
            .table()
            .lookup(&self.state, &self.memory, self.tape.read())
        else {
            return Ok(Step::Halt);
        };

        // Resolve the movement first so a bad transition leaves the configuration intact.
        let direction = transition.head_move.direction()?;

        self.state = transition.next_state.clone();
        self.memory = transition.memory.clone();
        self.tape.write(transition.write.clone());
        self.tape.shift(direction);
        self.step_count += 1;

        trace!(
            step = self.step_count,
            state = %self.state,
            memory = %self.memory,
            head = self.tape.head(),
            "applied transition"
        );

        Ok(Step::Continue)
    }

    /// Runs until no transition applies or `max_steps` transitions have been executed.
    pub fn run(mut self, max_steps: usize) -> Result<SimulationResult, TuringMachineError> {
        debug!(
            initial_state = %self.state,
            stored_cells = self.tape.stored(),
            max_steps,
            "starting run"
        );

        let mut history = vec![self.snapshot()];
        let mut halted_by = HaltReason::MaxSteps;

        for _ in 0..max_steps {
            match self.step()? {
                Step::Continue => history.push(self.snapshot()),
                Step::Halt => {
                    halted_by = HaltReason::NoTransition;
                    break;
                }
            }
        }

        let accepted = self.machine.is_final(&self.state);
        debug!(
            steps = self.step_count,
            final_state = %self.state,
            accepted,
            %halted_by,
            "run finished"
        );

        Ok(SimulationResult {
            accepted,
            final_tape: self.tape.render(),
            final_state: self.state,
            history,
            halted_by,
        })
    }

    /// Captures the current configuration.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            state: self.state.clone(),
            memory: self.memory.clone(),
            tape: self.tape.render_with_head(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the current value of the memory register.
    pub fn memory(&self) -> &Symbol {
        &self.memory
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the number of transitions executed so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

impl Machine {
    /// Runs the machine on `input` with a budget of `max_steps` transitions.
    pub fn run(&self, input: &str, max_steps: usize) -> Result<SimulationResult, TuringMachineError> {
        Engine::new(self, input).run(max_steps)
    }

    /// Runs the machine on each input independently, in order.
    pub fn run_batch<I, S>(
        &self,
        inputs: I,
        max_steps: usize,
    ) -> Vec<Result<SimulationResult, TuringMachineError>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        inputs
            .into_iter()
            .map(|input| self.run(input.as_ref(), max_steps))
            .collect()
    }
}
