//! This module defines the `TuringMachine` execution engine, which runs a decoded
//! `Machine` over a growable tape.
//!
//! Every execution is a discovery pass that finds out how far the head travels, followed,
//! when a trace is wanted, by a replay pass over a tape sized exactly to those bounds. The
//! machine is deterministic, so both passes walk through identical configurations.

use crate::config::{Limits, Verbosity};
use crate::tape::{Bounds, Tape};
use crate::trace::TraceLine;
use crate::types::{parse_bits, Bit, Direction, Input, Machine, PenroseError};
use std::io::Write;
use tracing::debug;

/// The mutable part of a running machine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    /// The state whose transition runs next.
    pub state: usize,
    /// Head offset from the starting cell.
    pub head: isize,
    /// Number of steps executed so far.
    pub step: u64,
}

/// What happened during a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// The state that executed the step.
    pub state: usize,
    /// Where the head was while reading and writing.
    pub position: isize,
    pub read: Option<Bit>,
    pub written: Bit,
    pub direction: Direction,
}

impl Step {
    /// Whether the step changed the cell, including a blank becoming a digit.
    pub fn changed(&self) -> bool {
        self.read != Some(self.written)
    }

    pub fn halted(&self) -> bool {
        self.direction == Direction::Halt
    }
}

/// Result of the discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Steps executed, the halting step included.
    pub steps: u64,
    /// Head excursion, widened to cover the initial content.
    pub bounds: Bounds,
    /// Final head offset.
    pub head: isize,
    /// The run of non-blank cells ending at the final head position.
    pub answer: String,
    /// Allocated tape length when the machine halted.
    pub tape_len: usize,
    /// Growth events the tape went through.
    pub growths: usize,
}

/// Result of the replay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub steps: u64,
    /// Trace lines emitted, the initial one included.
    pub lines: usize,
    /// Range of head positions the replay went through.
    pub visited: Bounds,
    /// Growth events of the replay tape. Always zero for a correct discovery.
    pub growths: usize,
}

/// Runs a decoded machine. The machine table is borrowed and never modified.
pub struct TuringMachine<'m> {
    machine: &'m Machine,
    limits: Limits,
}

impl<'m> TuringMachine<'m> {
    pub fn new(machine: &'m Machine, limits: Limits) -> Self {
        Self { machine, limits }
    }

    /// Executes a single step: read, write, and unless halting, move and switch state.
    ///
    /// The tape is grown right after a move so that the new head position is always
    /// backed by a cell.
    pub fn step(&self, config: &mut Configuration, tape: &mut Tape) -> Step {
        let position = config.head;
        let read = tape.read(position);

        // Blank cells read as '0'.
        let transition = self
            .machine
            .state(config.state)
            .transition(read.unwrap_or(Bit::Zero));
        tape.write(position, transition.write);
        config.step += 1;

        let step = Step {
            state: config.state,
            position,
            read,
            written: transition.write,
            direction: transition.direction,
        };

        if let Some(offset) = transition.direction.offset() {
            config.head += offset;
            tape.reserve(config.head);
            config.state = transition.next_state;
        }

        step
    }

    /// Runs the machine to halting while tracking only the head excursion.
    ///
    /// # Returns
    ///
    /// * `Ok(Discovery)` once the machine halts.
    /// * `Err(PenroseError::StepLimitExceeded)` if a step would exceed the step limit.
    /// * `Err(PenroseError::TapeLimitExceeded)` if the tape grew beyond the length limit.
    pub fn discover(&self, initial: &[Bit]) -> Result<Discovery, PenroseError> {
        let mut tape = Tape::new(initial);
        let mut config = Configuration::default();
        let mut bounds = Bounds::spanning(initial.len());

        loop {
            if config.step == self.limits.max_steps() {
                return Err(PenroseError::StepLimitExceeded(self.limits.max_steps()));
            }
            if tape.len() > self.limits.max_tape_len() {
                return Err(PenroseError::TapeLimitExceeded(self.limits.max_tape_len()));
            }

            if self.step(&mut config, &mut tape).halted() {
                break;
            }
            bounds.include(config.head);
        }

        debug!(
            steps = config.step,
            min = bounds.min,
            max = bounds.max,
            growths = tape.growths(),
            "discovery pass halted"
        );

        Ok(Discovery {
            steps: config.step,
            bounds,
            head: config.head,
            answer: tape.answer(config.head),
            tape_len: tape.len(),
            growths: tape.growths(),
        })
    }

    /// Re-runs a machine that is known to halt and emits its trace.
    ///
    /// The initial configuration is always emitted. After that, `Verbosity::Changes` emits
    /// only steps that changed their cell and `Verbosity::Steps` emits every step. Limits are
    /// not checked since `discovery` already proved the run halts within them.
    pub fn replay<F>(
        &self,
        initial: &[Bit],
        discovery: &Discovery,
        verbosity: Verbosity,
        mut emit: F,
    ) -> Result<Replay, PenroseError>
    where
        F: FnMut(TraceLine<'_>) -> Result<(), PenroseError>,
    {
        let mut tape = Tape::with_bounds(initial, discovery.bounds);
        let mut config = Configuration::default();
        let mut visited = Bounds::origin();

        emit(TraceLine {
            step: Some(config.step),
            state: Some(config.state),
            cells: tape.cells(),
            head: tape.index(config.head),
        })?;
        let mut lines = 1;

        loop {
            let step = self.step(&mut config, &mut tape);

            let shown = match verbosity {
                Verbosity::Answer => false,
                Verbosity::Changes => step.changed(),
                Verbosity::Steps => true,
            };
            if shown {
                emit(TraceLine {
                    step: Some(config.step),
                    state: Some(step.state),
                    cells: tape.cells(),
                    head: tape.index(step.position),
                })?;
                lines += 1;
            }

            if step.halted() {
                break;
            }
            visited.include(config.head);
        }

        debug!(steps = config.step, lines, "replay pass halted");

        Ok(Replay {
            steps: config.step,
            lines,
            visited,
            growths: tape.growths(),
        })
    }

    /// Runs the machine on `tape` and writes the answer or the trace to `out`.
    ///
    /// Nothing is written unless the discovery pass halts, so a failing run never leaves
    /// partial output behind.
    pub fn run<W: Write>(
        &self,
        tape: &str,
        verbosity: Verbosity,
        out: &mut W,
    ) -> Result<Discovery, PenroseError> {
        let initial = parse_bits(tape, Input::Tape)?;
        let discovery = self.discover(&initial)?;

        if verbosity.traces() {
            self.replay(&initial, &discovery, verbosity, |line| {
                Ok(writeln!(out, "{line}")?)
            })?;
        } else {
            writeln!(out, "{}", discovery.answer)?;
        }

        Ok(discovery)
    }

    /// Collects the trace of a run on `tape` as strings.
    pub fn trace(&self, tape: &str, verbosity: Verbosity) -> Result<Vec<String>, PenroseError> {
        let initial = parse_bits(tape, Input::Tape)?;
        let discovery = self.discover(&initial)?;

        let mut lines = Vec::new();
        self.replay(&initial, &discovery, verbosity, |line| {
            lines.push(line.to_string());
            Ok(())
        })?;

        Ok(lines)
    }
}
