//! Run configuration: resource limits and trace verbosity.
//!
//! The parsers here double as `clap` value parsers, so bad values are reported before any
//! decoding or execution starts.

use crate::types::PenroseError;

/// Default cap on the number of allocated tape cells (2^20).
pub const DEFAULT_MAX_TAPE_LEN: usize = 1 << 20;
/// Default cap on the number of executed steps (2^20).
pub const DEFAULT_MAX_STEPS: u64 = 1 << 20;

/// Safety valves against machines that never halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    max_tape_len: usize,
    max_steps: u64,
}

impl Limits {
    /// Creates limits, rejecting zero for either value.
    pub fn new(max_tape_len: usize, max_steps: u64) -> Result<Self, PenroseError> {
        if max_tape_len == 0 {
            return Err(invalid_limit("Maximum tape length", max_tape_len));
        }
        if max_steps == 0 {
            return Err(invalid_limit("Maximum number of steps", max_steps));
        }

        Ok(Self {
            max_tape_len,
            max_steps,
        })
    }

    pub fn max_tape_len(&self) -> usize {
        self.max_tape_len
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tape_len: DEFAULT_MAX_TAPE_LEN,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

fn invalid_limit(name: &str, value: impl std::fmt::Display) -> PenroseError {
    PenroseError::InvalidConfig(format!("{name} must be a positive integer; was {value}"))
}

fn parse_positive(name: &str, value: &str) -> Result<u64, PenroseError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid_limit(name, value)),
    }
}

/// Parses a `--max-tape-length` value.
pub fn parse_max_tape_len(value: &str) -> Result<usize, PenroseError> {
    let n = parse_positive("Maximum tape length", value)?;
    usize::try_from(n).map_err(|_| invalid_limit("Maximum tape length", value))
}

/// Parses a `--max-steps` value.
pub fn parse_max_steps(value: &str) -> Result<u64, PenroseError> {
    parse_positive("Maximum number of steps", value)
}

/// How much of an execution is printed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Only the machine's answer.
    #[default]
    Answer,
    /// A trace line whenever a step changes the tape.
    Changes,
    /// A trace line for every step.
    Steps,
}

impl Verbosity {
    /// Whether the replay pass runs at all.
    pub fn traces(self) -> bool {
        self > Verbosity::Answer
    }
}

impl TryFrom<u8> for Verbosity {
    type Error = PenroseError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Verbosity::Answer),
            1 => Ok(Verbosity::Changes),
            2 => Ok(Verbosity::Steps),
            _ => Err(PenroseError::InvalidConfig(format!(
                "Verbosity must be between 0 and 2; was {level}"
            ))),
        }
    }
}

/// Parses a `-v`/`--verbosity` value. Besides a level, accepts the extra `v`s of a
/// clustered `-vv`.
pub fn parse_verbosity(value: &str) -> Result<Verbosity, PenroseError> {
    let value = value.trim();
    let level = if !value.is_empty() && value.chars().all(|c| c == 'v') {
        value.len().saturating_add(1)
    } else {
        value.parse::<usize>().map_err(|_| {
            PenroseError::InvalidConfig(format!("Verbosity must be between 0 and 2; was {value}"))
        })?
    };

    Verbosity::try_from(u8::try_from(level).unwrap_or(u8::MAX))
}
