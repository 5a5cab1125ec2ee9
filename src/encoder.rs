//! This module converts between Penrose's compact binary encoding and a `Machine`.
//!
//! The encoding is a unary prefix code. Every token is a run of `1`s closed by a `0`:
//!
//! | token | bits    |
//! | ----- | ------- |
//! | ZERO  | `0`     |
//! | ONE   | `10`    |
//! | RIGHT | `110`   |
//! | LEFT  | `1110`  |
//! | STOP  | `11110` |
//!
//! A specification is implicitly wrapped in `110` on both sides before it is tokenized.

use crate::types::{parse_bits, Bit, Direction, Input, Machine, PenroseError, State, Transition};
use tracing::debug;

/// The implicit `110` placed before and after every specification.
const SENTINEL: [Bit; 3] = [Bit::One, Bit::One, Bit::Zero];

/// Longest run of `1`s a token may contain.
const MAX_RUN: usize = 4;

/// One lexical unit of the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Zero,
    One,
    Right,
    Left,
    Stop,
}

impl Token {
    /// Maps the length of a run of `1`s to its token. Runs longer than four are rejected
    /// by the lexer before this is called.
    fn from_run(run: usize) -> Self {
        match run {
            0 => Token::Zero,
            1 => Token::One,
            2 => Token::Right,
            3 => Token::Left,
            _ => Token::Stop,
        }
    }

    /// The bit pattern of this token.
    pub fn bits(self) -> &'static str {
        match self {
            Token::Zero => "0",
            Token::One => "10",
            Token::Right => "110",
            Token::Left => "1110",
            Token::Stop => "11110",
        }
    }

    /// The direction a boundary token closes a transition with.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Token::Zero | Token::One => None,
            Token::Right => Some(Direction::Right),
            Token::Left => Some(Direction::Left),
            Token::Stop => Some(Direction::Halt),
        }
    }

    fn from_bit(bit: Bit) -> Self {
        match bit {
            Bit::Zero => Token::Zero,
            Bit::One => Token::One,
        }
    }

    fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Right => Token::Right,
            Direction::Left => Token::Left,
            Direction::Halt => Token::Stop,
        }
    }
}

/// Splits a specification into tokens.
///
/// # Returns
///
/// * `Ok(Vec<Token>)` including the tokens contributed by the two sentinels.
/// * `Err(PenroseError::InvalidSymbol)` if the specification contains anything but `0`/`1`.
/// * `Err(PenroseError::MalformedToken)` at the index of the fifth consecutive `1`.
pub fn tokenize(spec: &str) -> Result<Vec<Token>, PenroseError> {
    let bits = parse_bits(spec, Input::Specification)?;
    let wrapped = SENTINEL.iter().chain(bits.iter()).chain(SENTINEL.iter());

    let mut tokens = Vec::new();
    let mut run = 0;
    for (i, bit) in wrapped.enumerate() {
        match bit {
            Bit::One => {
                run += 1;
                if run > MAX_RUN {
                    // Runs cannot start inside the leading sentinel.
                    return Err(PenroseError::MalformedToken {
                        index: i - SENTINEL.len(),
                    });
                }
            }
            Bit::Zero => {
                tokens.push(Token::from_run(run));
                run = 0;
            }
        }
    }

    Ok(tokens)
}

/// Decodes a specification into a `Machine`.
///
/// Boundary tokens (RIGHT, LEFT, STOP) close transitions alternately as the `0` and `1`
/// actions of consecutive states. The data tokens (ZERO, ONE) in front of a boundary carry
/// the bit to write (the last one) and the destination state in binary (the rest, most
/// significant first).
///
/// # Returns
///
/// * `Ok(Machine)` with state 0 as the start state.
/// * `Err(PenroseError)` for invalid symbols, malformed tokens, an odd number of
///   transitions, or a transition to a state that does not exist.
pub fn decode(spec: &str) -> Result<Machine, PenroseError> {
    let tokens = tokenize(spec)?;

    let transitions_len = tokens.iter().filter(|t| t.direction().is_some()).count();
    if transitions_len % 2 != 0 {
        return Err(PenroseError::IncompleteState {
            transitions: transitions_len,
        });
    }
    let states_len = transitions_len / 2;

    let mut transitions = Vec::with_capacity(transitions_len);
    let mut data = Vec::new();
    for token in &tokens {
        let direction = match token {
            Token::Zero => {
                data.push(Bit::Zero);
                continue;
            }
            Token::One => {
                data.push(Bit::One);
                continue;
            }
            Token::Right => Direction::Right,
            Token::Left => Direction::Left,
            Token::Stop => Direction::Halt,
        };

        let source = transitions.len() / 2;
        transitions.push(decode_transition(source, &data, direction, states_len)?);
        data.clear();
    }

    let states = transitions
        .chunks_exact(2)
        .enumerate()
        .map(|(id, pair)| State::new(id, pair[0], pair[1]))
        .collect();

    debug!(
        tokens = tokens.len(),
        states = states_len,
        "decoded Turing machine specification"
    );

    Machine::new(states)
}

/// Builds one transition from the data tokens in front of its boundary token.
fn decode_transition(
    source: usize,
    data: &[Bit],
    direction: Direction,
    states_len: usize,
) -> Result<Transition, PenroseError> {
    let Some((&write, target)) = data.split_last() else {
        return Ok(Transition::new(Bit::Zero, direction, 0));
    };

    // Most significant bit first; saturate so an absurdly long index still reports.
    let next_state = target
        .iter()
        .try_fold(0usize, |acc, bit| acc.checked_mul(2)?.checked_add(bit.value()))
        .unwrap_or(usize::MAX);

    if next_state >= states_len {
        return Err(PenroseError::UnknownState {
            state: source,
            target: next_state,
        });
    }

    Ok(Transition::new(write, direction, next_state))
}

/// Encodes a `Machine` as the shortest specification that decodes back to it.
///
/// The first transition must be `0 R` to state 0 and the last one must move right, since
/// those are supplied by the implicit sentinels and dropped from the output.
///
/// # Returns
///
/// * `Ok(String)` of `0`s and `1`s.
/// * `Err(PenroseError::NotEncodable)` if the machine breaks either sentinel constraint.
pub fn encode(machine: &Machine) -> Result<String, PenroseError> {
    let start = machine.state(0).on_read_0;
    if start != Transition::new(Bit::Zero, Direction::Right, 0) {
        return Err(PenroseError::NotEncodable(
            "state 0 must write 0, move right and stay in state 0 after reading '0'".to_string(),
        ));
    }

    let last = machine.state(machine.len() - 1);
    if last.on_read_1.direction != Direction::Right {
        return Err(PenroseError::NotEncodable(format!(
            "state {:X} must move right after reading '1'",
            last.id
        )));
    }

    let encoded: String = machine
        .states()
        .iter()
        .flat_map(|state| [state.on_read_0, state.on_read_1])
        .flat_map(|transition| encode_transition(&transition))
        .map(Token::bits)
        .collect();

    let sentinel = Token::Right.bits();
    let body = encoded
        .strip_prefix(sentinel)
        .and_then(|rest| rest.strip_suffix(sentinel))
        .unwrap_or_default();

    Ok(body.to_string())
}

/// The canonical token sequence for one transition, boundary token included.
fn encode_transition(transition: &Transition) -> Vec<Token> {
    let mut tokens = Vec::new();

    if transition.next_state > 0 {
        let width = usize::BITS - transition.next_state.leading_zeros();
        tokens.extend((0..width).rev().map(|shift| {
            if (transition.next_state >> shift) & 1 == 1 {
                Token::One
            } else {
                Token::Zero
            }
        }));
        tokens.push(Token::from_bit(transition.write));
    } else if transition.write == Bit::One {
        tokens.push(Token::One);
    }

    tokens.push(Token::from_direction(transition.direction));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Penrose's machine for adding one to a unary number.
    const UN_PLUS_1: &str = "101011010111101010";

    fn t(write: u8, direction: Direction, next_state: usize) -> Transition {
        let write = if write == 0 { Bit::Zero } else { Bit::One };
        Transition::new(write, direction, next_state)
    }

    /// Concatenates the bit patterns of `tokens`.
    fn spell(tokens: &[Token]) -> String {
        tokens.iter().map(|token| token.bits()).collect()
    }

    #[test]
    fn test_tokenize_includes_sentinels() {
        let tokens = tokenize("010").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Right, Token::Zero, Token::One, Token::Right]
        );
    }

    #[test]
    fn test_tokenize_all_kinds() {
        let tokens = tokenize("0101101110111100").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Right,
                Token::Zero,
                Token::One,
                Token::Right,
                Token::Left,
                Token::Stop,
                Token::Zero,
                Token::Right,
            ]
        );
    }

    #[test]
    fn test_tokenize_rejects_invalid_symbol() {
        assert_eq!(
            tokenize("0120").unwrap_err(),
            PenroseError::InvalidSymbol {
                input: Input::Specification,
                index: 2
            }
        );
    }

    #[test]
    fn test_tokenize_rejects_five_ones() {
        // The fifth '1' of the run starting at index 1 sits at index 5.
        assert_eq!(
            tokenize("0111110").unwrap_err(),
            PenroseError::MalformedToken { index: 5 }
        );
    }

    #[test]
    fn test_tokenize_run_completed_by_sentinel() {
        // "111" plus the trailing "110" makes five ones; the fifth is the sentinel's second.
        assert_eq!(
            tokenize("0111").unwrap_err(),
            PenroseError::MalformedToken { index: 5 }
        );
    }

    #[test]
    fn test_decode_empty_specification() {
        let machine = decode("").unwrap();

        assert_eq!(machine.len(), 1);
        assert_eq!(machine.state(0).on_read_0, t(0, Direction::Right, 0));
        assert_eq!(machine.state(0).on_read_1, t(0, Direction::Right, 0));
    }

    #[test]
    fn test_decode_un_plus_1() {
        let machine = decode(UN_PLUS_1).unwrap();

        assert_eq!(machine.len(), 2);
        assert_eq!(machine.state(0).on_read_0, t(0, Direction::Right, 0));
        assert_eq!(machine.state(0).on_read_1, t(1, Direction::Right, 1));
        assert_eq!(machine.state(1).on_read_0, t(1, Direction::Halt, 0));
        assert_eq!(machine.state(1).on_read_1, t(1, Direction::Right, 1));
    }

    #[test]
    fn test_decode_single_stop() {
        let machine = decode("1011110110").unwrap();

        assert_eq!(machine.len(), 2);
        assert_eq!(machine.state(0).on_read_1, t(1, Direction::Halt, 0));
        assert_eq!(machine.state(1).on_read_0, t(0, Direction::Right, 0));
        assert_eq!(machine.state(1).on_read_1, t(0, Direction::Right, 0));
    }

    #[test]
    fn test_decode_state_index_is_little_endian_from_boundary() {
        // Data tokens 1 0 0 before LEFT: write 0, target "10" = 2.
        let spec = spell(&[
            Token::One,
            Token::Zero,
            Token::Zero,
            Token::Left,
            Token::Right,
            Token::Right,
            Token::Right,
        ]);
        let machine = decode(&spec).unwrap();

        assert_eq!(machine.len(), 3);
        assert_eq!(machine.state(0).on_read_1, t(0, Direction::Left, 2));
    }

    #[test]
    fn test_decode_allows_leading_zero_tokens() {
        let spec = spell(&[
            Token::Zero,
            Token::Zero,
            Token::One,
            Token::One,
            Token::Left,
            Token::Right,
        ]);
        let machine = decode(&spec).unwrap();

        assert_eq!(machine.state(0).on_read_1, t(1, Direction::Left, 1));
    }

    #[test]
    fn test_decode_odd_transitions() {
        assert_eq!(
            decode("1011110").unwrap_err(),
            PenroseError::IncompleteState { transitions: 3 }
        );
    }

    #[test]
    fn test_decode_unknown_state() {
        // State 0 reading '1' goes to state 3 of a two-state machine.
        let spec = spell(&[Token::One, Token::One, Token::One, Token::Right, Token::Right]);
        assert_eq!(
            decode(&spec).unwrap_err(),
            PenroseError::UnknownState {
                state: 0,
                target: 3
            }
        );
    }

    #[test]
    fn test_decode_unknown_state_overflow_saturates() {
        let spec = format!("{}0110110", "10".repeat(200));
        assert_eq!(
            decode(&spec).unwrap_err(),
            PenroseError::UnknownState {
                state: 0,
                target: usize::MAX
            }
        );
    }

    #[test]
    fn test_encode_un_plus_1() {
        let machine = decode(UN_PLUS_1).unwrap();
        assert_eq!(encode(&machine).unwrap(), UN_PLUS_1);
    }

    #[test]
    fn test_encode_empty_machine() {
        let machine = decode("").unwrap();
        assert_eq!(encode(&machine).unwrap(), "");
    }

    #[test]
    fn test_encode_rejects_unencodable_start() {
        let state = State::new(0, t(1, Direction::Right, 0), t(0, Direction::Right, 0));
        let machine = Machine::new(vec![state]).unwrap();

        assert!(matches!(
            encode(&machine),
            Err(PenroseError::NotEncodable(_))
        ));
    }

    #[test]
    fn test_encode_rejects_unencodable_end() {
        let state = State::new(0, t(0, Direction::Right, 0), t(0, Direction::Halt, 0));
        let machine = Machine::new(vec![state]).unwrap();

        let error = encode(&machine).unwrap_err();
        assert!(error.to_string().contains("state 0 must move right"));
    }

    fn arb_token() -> impl Strategy<Value = Token> {
        prop_oneof![
            Just(Token::Zero),
            Just(Token::One),
            Just(Token::Right),
            Just(Token::Left),
            Just(Token::Stop),
        ]
    }

    fn arb_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Left),
            Just(Direction::Right),
            Just(Direction::Halt),
        ]
    }

    /// Machines that satisfy both sentinel constraints.
    fn arb_encodable_machine() -> impl Strategy<Value = Machine> {
        (1usize..8)
            .prop_flat_map(|n| {
                prop::collection::vec(
                    (any::<bool>(), arb_direction(), 0..n),
                    2 * n,
                )
            })
            .prop_map(|raw| {
                let mut transitions: Vec<Transition> = raw
                    .into_iter()
                    .map(|(one, direction, next)| {
                        t(u8::from(one), direction, next)
                    })
                    .collect();
                transitions[0] = t(0, Direction::Right, 0);
                if let Some(last) = transitions.last_mut() {
                    last.direction = Direction::Right;
                }
                let states = transitions
                    .chunks_exact(2)
                    .enumerate()
                    .map(|(id, pair)| State::new(id, pair[0], pair[1]))
                    .collect();
                Machine::new(states).unwrap()
            })
    }

    proptest! {
        #[test]
        fn odd_boundary_count_is_incomplete(tokens in prop::collection::vec(arb_token(), 0..40)) {
            let spec = spell(&tokens);
            let boundaries = tokens.iter().filter(|t| t.direction().is_some()).count() + 2;
            let result = decode(&spec);
            if boundaries % 2 == 1 {
                prop_assert_eq!(result, Err(PenroseError::IncompleteState { transitions: boundaries }));
            } else {
                let incomplete = matches!(result, Err(PenroseError::IncompleteState { .. }));
                prop_assert!(!incomplete);
            }
        }

        #[test]
        fn five_ones_are_malformed(
            prefix in prop::collection::vec(arb_token(), 0..20),
            suffix in "[01]{0,20}",
        ) {
            let prefix = spell(&prefix);
            let spec = format!("{prefix}11111{suffix}");
            prop_assert_eq!(
                tokenize(&spec),
                Err(PenroseError::MalformedToken { index: prefix.len() + 4 })
            );
        }

        #[test]
        fn encode_then_decode_is_identity(machine in arb_encodable_machine()) {
            let spec = encode(&machine).unwrap();
            prop_assert_eq!(decode(&spec).unwrap(), machine);
        }

        #[test]
        fn decoded_specifications_reencode(tokens in prop::collection::vec(arb_token(), 0..40)) {
            if let Ok(machine) = decode(&spell(&tokens)) {
                let spec = encode(&machine).unwrap();
                prop_assert_eq!(decode(&spec).unwrap(), machine);
            }
        }
    }
}
