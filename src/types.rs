//! This module defines the core data structures used throughout the simulator: bits and
//! tape cells, transitions, states, the immutable machine table, and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The character used to render a blank tape cell.
pub const BLANK_SYMBOL: char = ' ';

/// A single binary symbol, either read from or written to the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    /// Parses a `'0'` or `'1'` character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }

    /// Numeric value of the bit, used when assembling state indices.
    pub fn value(self) -> usize {
        match self {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Renders a tape cell, where `None` is the blank.
pub fn cell_char(cell: Option<Bit>) -> char {
    cell.map_or(BLANK_SYMBOL, Bit::as_char)
}

/// Identifies which user input a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Specification,
    Tape,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Specification => f.write_str("Turing machine specification"),
            Input::Tape => f.write_str("tape"),
        }
    }
}

/// Validates that `text` consists of `'0'`s and `'1'`s only and converts it to bits.
///
/// # Returns
///
/// * `Ok(Vec<Bit>)` with one bit per character.
/// * `Err(PenroseError::InvalidSymbol)` naming the character index of the first offender.
pub fn parse_bits(text: &str, input: Input) -> Result<Vec<Bit>, PenroseError> {
    text.chars()
        .enumerate()
        .map(|(index, c)| Bit::from_char(c).ok_or(PenroseError::InvalidSymbol { input, index }))
        .collect()
}

/// Represents the possible directions a head can move after writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head where it is and stop the machine.
    Halt,
}

impl Direction {
    /// The head offset for this direction, or `None` when the machine halts.
    pub fn offset(self) -> Option<isize> {
        match self {
            Direction::Left => Some(-1),
            Direction::Right => Some(1),
            Direction::Halt => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => f.write_str("L"),
            Direction::Right => f.write_str("R"),
            Direction::Halt => f.write_str("STOP"),
        }
    }
}

/// The action taken by a state after reading one particular symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The bit written over the cell under the head.
    pub write: Bit,
    /// Where the head goes afterwards.
    pub direction: Direction,
    /// Index of the state to switch to. Ignored when `direction` is `Halt`.
    pub next_state: usize,
}

impl Transition {
    pub fn new(write: Bit, direction: Direction, next_state: usize) -> Self {
        Self {
            write,
            direction,
            next_state,
        }
    }
}

/// A machine state with one transition per readable symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: usize,
    pub on_read_0: Transition,
    pub on_read_1: Transition,
}

impl State {
    pub fn new(id: usize, on_read_0: Transition, on_read_1: Transition) -> Self {
        Self {
            id,
            on_read_0,
            on_read_1,
        }
    }

    /// Selects the transition for the symbol under the head.
    pub fn transition(&self, read: Bit) -> &Transition {
        match read {
            Bit::Zero => &self.on_read_0,
            Bit::One => &self.on_read_1,
        }
    }

    /// Both transitions paired with the symbol that triggers them, in table order.
    pub fn transitions(&self) -> [(Bit, &Transition); 2] {
        [(Bit::Zero, &self.on_read_0), (Bit::One, &self.on_read_1)]
    }
}

/// The immutable table of states of a decoded machine. State 0 is the start state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Machine {
    states: Vec<State>,
}

impl Machine {
    /// Builds a machine from its states, checking that ids match their position and that
    /// every transition points at an existing state.
    pub fn new(states: Vec<State>) -> Result<Self, PenroseError> {
        if states.is_empty() {
            return Err(PenroseError::ValidationError(
                "A machine needs at least one state".to_string(),
            ));
        }

        for (index, state) in states.iter().enumerate() {
            if state.id != index {
                return Err(PenroseError::ValidationError(format!(
                    "State at position {index:X} has id {:X}",
                    state.id
                )));
            }

            for (_, transition) in state.transitions() {
                if transition.next_state >= states.len() {
                    return Err(PenroseError::UnknownState {
                        state: state.id,
                        target: transition.next_state,
                    });
                }
            }
        }

        Ok(Self { states })
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the state with the given id. Ids are validated at construction.
    pub fn state(&self, id: usize) -> &State {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Represents the errors that can occur while loading, decoding or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PenroseError {
    /// An input contains a character other than `0` or `1`.
    #[error("Invalid {input} at index {index}; must consist of 0s and 1s only")]
    InvalidSymbol { input: Input, index: usize },
    /// The specification contains a run of five or more `1`s.
    #[error(
        "Invalid Turing machine specification at index {index}; specification contains more than four consecutive '1's"
    )]
    MalformedToken { index: usize },
    /// The specification encodes an odd number of transitions.
    #[error(
        "Invalid Turing machine specification; every state must define what to do after reading either a '0' or a '1' (found {transitions} transitions)"
    )]
    IncompleteState { transitions: usize },
    /// A transition points past the end of the states table.
    #[error(
        "Invalid Turing machine specification; state {state:X} has a transition to non-existent state {target:X}"
    )]
    UnknownState { state: usize, target: usize },
    /// The machine did not halt within the configured number of steps.
    #[error("Exceeded maximum number of steps ({0})")]
    StepLimitExceeded(u64),
    /// The working tape grew beyond the configured length.
    #[error("Exceeded maximum length of working tape ({0})")]
    TapeLimitExceeded(usize),
    /// A configuration value is missing or out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Indicates a syntax error in a specification listing.
    #[error("Listing parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a structurally incomplete specification listing.
    #[error("Listing validation error: {0}")]
    ValidationError(String),
    /// The machine has no representation in the compact encoding.
    #[error("Machine cannot be encoded: {0}")]
    NotEncodable(String),
    /// Indicates an error reading inputs or writing output.
    #[error("File error: {0}")]
    FileError(String),
}

impl From<std::io::Error> for PenroseError {
    fn from(error: std::io::Error) -> Self {
        PenroseError::FileError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halt() -> Transition {
        Transition::new(Bit::One, Direction::Halt, 0)
    }

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let halt_json = serde_json::to_string(&Direction::Halt).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(halt_json, "\"Halt\"");

        let halt: Direction = serde_json::from_str(&halt_json).unwrap();
        assert_eq!(halt, Direction::Halt);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Left.to_string(), "L");
        assert_eq!(Direction::Right.to_string(), "R");
        assert_eq!(Direction::Halt.to_string(), "STOP");
    }

    #[test]
    fn test_parse_bits() {
        assert_eq!(
            parse_bits("011", Input::Tape).unwrap(),
            vec![Bit::Zero, Bit::One, Bit::One]
        );
        assert_eq!(parse_bits("", Input::Tape).unwrap(), vec![]);
    }

    #[test]
    fn test_parse_bits_reports_index() {
        let error = parse_bits("0102", Input::Specification).unwrap_err();
        assert_eq!(
            error,
            PenroseError::InvalidSymbol {
                input: Input::Specification,
                index: 3
            }
        );
        assert_eq!(
            error.to_string(),
            "Invalid Turing machine specification at index 3; must consist of 0s and 1s only"
        );
    }

    #[test]
    fn test_state_selects_transition() {
        let on_zero = Transition::new(Bit::Zero, Direction::Right, 0);
        let state = State::new(0, on_zero, halt());

        assert_eq!(state.transition(Bit::Zero), &on_zero);
        assert_eq!(state.transition(Bit::One), &halt());
    }

    #[test]
    fn test_machine_rejects_unknown_target() {
        let state = State::new(0, Transition::new(Bit::Zero, Direction::Left, 2), halt());
        let error = Machine::new(vec![state]).unwrap_err();

        assert_eq!(error, PenroseError::UnknownState { state: 0, target: 2 });
        assert!(error.to_string().contains("non-existent state 2"));
    }

    #[test]
    fn test_machine_rejects_misnumbered_state() {
        let state = State::new(1, halt(), halt());
        assert!(matches!(
            Machine::new(vec![state]),
            Err(PenroseError::ValidationError(_))
        ));
    }

    #[test]
    fn test_machine_rejects_empty_table() {
        assert!(Machine::new(Vec::new()).is_err());
    }

    #[test]
    fn test_error_display() {
        let error = PenroseError::UnknownState {
            state: 10,
            target: 255,
        };
        assert!(error.to_string().contains("state A has a transition"));
        assert!(error.to_string().contains("non-existent state FF"));
        assert_eq!(
            PenroseError::StepLimitExceeded(5).to_string(),
            "Exceeded maximum number of steps (5)"
        );
    }
}
