//! Meeting code generation and parsing.
//!
//! A meeting code is the public identifier for a room: ten lowercase
//! ASCII letters grouped `xxx-xxxx-xxx`, twelve characters including
//! the two dashes. The dashed form is the only canonical form; it is
//! what clients type, what URLs carry, and what the media backend uses
//! as the room name.
//!
//! # Security
//!
//! - Letters are drawn from the system CSPRNG ([`ring::rand::SystemRandom`])
//! - Rejection sampling keeps the per-letter distribution exactly uniform
//! - Ten letters give ~47 bits of entropy, enough that codes are not
//!   guessable within a meeting's lifetime

use std::fmt;
use std::str::FromStr;

use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Number of random letters in a meeting code (dashes excluded).
pub const CODE_LETTERS: usize = 10;

/// Canonical length of a meeting code including the two dashes.
pub const CODE_LENGTH: usize = 12;

/// Letter indexes before which a dash is inserted (3-4-3 grouping).
const DASH_BEFORE: [usize; 2] = [3, 7];

/// The meeting code alphabet.
const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Largest multiple of the alphabet size that fits in a byte (26 * 9).
/// Random bytes at or above this value are discarded so the modulo
/// below stays unbiased.
const REJECTION_LIMIT: u8 = 234;

// =============================================================================
// Errors
// =============================================================================

/// Failure to generate a meeting code.
#[derive(Debug, Error)]
pub enum CodeGenerationError {
    /// The system CSPRNG refused to produce bytes.
    #[error("random generator failure")]
    Rng,
}

/// A string did not match the canonical `xxx-xxxx-xxx` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid meeting code")]
pub struct InvalidMeetingCode;

// =============================================================================
// Types
// =============================================================================

/// A validated meeting code in canonical dashed form.
///
/// The inner string is guaranteed to be twelve characters: lowercase
/// ASCII letters with dashes at positions 3 and 8.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MeetingCode(String);

impl MeetingCode {
    /// Generate a fresh random meeting code.
    ///
    /// Each letter is drawn independently and uniformly from the 26
    /// lowercase ASCII letters using the system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGenerationError::Rng`] if the CSPRNG fails, which
    /// on supported platforms indicates a broken environment rather
    /// than a transient condition.
    pub fn generate() -> Result<Self, CodeGenerationError> {
        let rng = SystemRandom::new();
        let mut buf = [0u8; 32];
        let mut code = String::with_capacity(CODE_LENGTH);
        let mut produced = 0;

        while produced < CODE_LETTERS {
            rng.fill(&mut buf).map_err(|_| {
                tracing::error!(
                    target: "common.code",
                    "Failed to draw random bytes for meeting code"
                );
                CodeGenerationError::Rng
            })?;

            for &b in &buf {
                if produced == CODE_LETTERS {
                    break;
                }
                if b >= REJECTION_LIMIT {
                    continue;
                }
                let idx = usize::from(b % 26);
                // idx < 26 by construction; the lookup cannot fail.
                let Some(&letter) = ALPHABET.get(idx) else {
                    return Err(CodeGenerationError::Rng);
                };
                if DASH_BEFORE.contains(&produced) {
                    code.push('-');
                }
                code.push(char::from(letter));
                produced += 1;
            }
        }

        Ok(Self(code))
    }

    /// Parse a string that must already be in canonical form.
    ///
    /// Accepts exactly `xxx-xxxx-xxx` with lowercase ASCII letters.
    /// No normalization is applied; uppercase input, missing dashes,
    /// or a bare ten-letter string are all rejected.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMeetingCode`] for any non-canonical input.
    pub fn parse(input: &str) -> Result<Self, InvalidMeetingCode> {
        if input.len() != CODE_LENGTH {
            return Err(InvalidMeetingCode);
        }

        for (i, b) in input.bytes().enumerate() {
            let expect_dash = i == 3 || i == 8;
            if expect_dash {
                if b != b'-' {
                    return Err(InvalidMeetingCode);
                }
            } else if !b.is_ascii_lowercase() {
                return Err(InvalidMeetingCode);
            }
        }

        Ok(Self(input.to_string()))
    }

    /// Format ten bare letters into canonical dashed form.
    ///
    /// Entry fields let users paste either `abcdefghij` or
    /// `abc-defg-hij`; this normalizes the bare form. Canonical input
    /// passes through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMeetingCode`] when the input is neither ten
    /// lowercase letters nor already canonical.
    pub fn from_letters(input: &str) -> Result<Self, InvalidMeetingCode> {
        if input.len() == CODE_LENGTH {
            return Self::parse(input);
        }
        if input.len() != CODE_LETTERS || !input.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(InvalidMeetingCode);
        }

        let mut code = String::with_capacity(CODE_LENGTH);
        for (i, c) in input.chars().enumerate() {
            if DASH_BEFORE.contains(&i) {
                code.push('-');
            }
            code.push(c);
        }
        Ok(Self(code))
    }

    /// The canonical dashed form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code, returning the canonical string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MeetingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MeetingCode {
    type Err = InvalidMeetingCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for MeetingCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
