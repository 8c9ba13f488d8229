//! Input normalization and IUPAC validation.
//!
//! Raw input (typed text or a FASTA record body) goes through three steps
//! before analysis:
//!
//! 1. [`normalize`]: strip every whitespace character, upper-case the rest
//! 2. [`prepare_input`]: reject empty or too-short input
//! 3. [`validate`]: locate every character outside the IUPAC alphabet
//!
//! Normalization and validation never fail; only the input check does.

use thiserror::Error;

use crate::iupac;
use crate::model::{InvalidChar, Sequence, ValidationResult};

/// Minimum sequence length accepted for analysis unless overridden.
pub const DEFAULT_MIN_LENGTH: usize = 10;

/// Errors detected on raw input, before the engine runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please enter a sequence (input is empty or whitespace only)")]
    Empty,

    #[error("Sequence must be at least {minimum} characters long (got {length})")]
    TooShort { length: usize, minimum: usize },
}

/// Result type for input checks.
pub type InputResult<T> = Result<T, InputError>;

/// Removes all whitespace anywhere in `raw` and upper-cases every letter.
///
/// Total: empty or blank input yields an empty sequence.
pub fn normalize(raw: &str) -> Sequence {
    let data: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    Sequence::from_normalized(data)
}

/// Scans `sequence` left to right and records every non-IUPAC character.
///
/// Does not stop at the first failure.
pub fn validate(sequence: &Sequence) -> ValidationResult {
    let invalid_positions = sequence
        .chars()
        .enumerate()
        .filter(|(_, c)| !iupac::is_iupac(*c))
        .map(|(pos, c)| InvalidChar::new(c, pos))
        .collect();
    ValidationResult::new(invalid_positions)
}

/// Normalizes `raw` and enforces the caller-side length rules.
///
/// # Examples
///
/// ```
/// use seqanalyzer::normalize::{prepare_input, InputError};
///
/// let seq = prepare_input("acgt acgt\nac", 10).unwrap();
/// assert_eq!(seq.as_str(), "ACGTACGTAC");
///
/// assert_eq!(
///     prepare_input("ACGT", 10),
///     Err(InputError::TooShort { length: 4, minimum: 10 })
/// );
/// ```
pub fn prepare_input(raw: &str, min_length: usize) -> InputResult<Sequence> {
    let sequence = normalize(raw);
    if sequence.is_empty() {
        return Err(InputError::Empty);
    }

    let length = sequence.len();
    if length < min_length {
        return Err(InputError::TooShort {
            length,
            minimum: min_length,
        });
    }

    Ok(sequence)
}
