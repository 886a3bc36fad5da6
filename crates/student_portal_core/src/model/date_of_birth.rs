//! Unsigned 256-bit scalar used for `Student::date_of_birth`.
//!
//! # Invariants
//! - Stored as 32 big-endian bytes; every value in `0..=2^256-1` is accepted.
//! - Decimal text is the only human-facing representation.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Width of the persisted big-endian representation.
pub const DATE_OF_BIRTH_BYTES: usize = 32;

/// Date of birth as an unsigned 256-bit integer.
///
/// Usually a unix timestamp, but no calendar range is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateOfBirth([u8; DATE_OF_BIRTH_BYTES]);

impl DateOfBirth {
    pub const ZERO: Self = Self([0; DATE_OF_BIRTH_BYTES]);
    pub const MAX: Self = Self([u8::MAX; DATE_OF_BIRTH_BYTES]);

    pub fn from_be_bytes(bytes: [u8; DATE_OF_BIRTH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn to_be_bytes(self) -> [u8; DATE_OF_BIRTH_BYTES] {
        self.0
    }

    /// Builds a value from a big-endian slice of exactly 32 bytes.
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self, DateOfBirthError> {
        let array: [u8; DATE_OF_BIRTH_BYTES] = bytes
            .try_into()
            .map_err(|_| DateOfBirthError::InvalidWidth(bytes.len()))?;
        Ok(Self(array))
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0; DATE_OF_BIRTH_BYTES];
        bytes[DATE_OF_BIRTH_BYTES - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    /// Returns `self * 10 + digit`, or `None` on overflow past 256 bits.
    fn mul10_add(self, digit: u8) -> Option<Self> {
        let mut bytes = self.0;
        let mut carry = u16::from(digit);
        for byte in bytes.iter_mut().rev() {
            let value = u16::from(*byte) * 10 + carry;
            *byte = (value & 0xff) as u8;
            carry = value >> 8;
        }
        if carry != 0 {
            return None;
        }
        Some(Self(bytes))
    }

    /// Returns `(self / 10, self % 10)`.
    fn divmod10(self) -> (Self, u8) {
        let mut bytes = self.0;
        let mut remainder = 0u16;
        for byte in bytes.iter_mut() {
            let value = (remainder << 8) | u16::from(*byte);
            *byte = (value / 10) as u8;
            remainder = value % 10;
        }
        (Self(bytes), remainder as u8)
    }
}

impl From<u64> for DateOfBirth {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl FromStr for DateOfBirth {
    type Err = DateOfBirthError;

    /// Parses base-10 digits. Surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.trim();
        if digits.is_empty() {
            return Err(DateOfBirthError::Empty);
        }

        let mut parsed = Self::ZERO;
        for ch in digits.chars() {
            let digit = ch
                .to_digit(10)
                .ok_or(DateOfBirthError::InvalidDigit(ch))? as u8;
            parsed = parsed
                .mul10_add(digit)
                .ok_or(DateOfBirthError::Overflow)?;
        }
        Ok(parsed)
    }
}

impl Display for DateOfBirth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let mut digits = Vec::with_capacity(78);
        let mut rest = *self;
        while !rest.is_zero() {
            let (quotient, digit) = rest.divmod10();
            digits.push(b'0' + digit);
            rest = quotient;
        }
        digits.reverse();
        // Only ASCII digits were pushed.
        f.write_str(std::str::from_utf8(&digits).map_err(|_| std::fmt::Error)?)
    }
}

impl Serialize for DateOfBirth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateOfBirth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DateOfBirthVisitor)
    }
}

struct DateOfBirthVisitor;

impl<'de> Visitor<'de> for DateOfBirthVisitor {
    type Value = DateOfBirth;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("an unsigned 256-bit integer as a decimal string or u64")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(DateOfBirth::from_u64(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}

/// Parse and decode failures for `DateOfBirth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOfBirthError {
    Empty,
    InvalidDigit(char),
    Overflow,
    InvalidWidth(usize),
}

impl Display for DateOfBirthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "date of birth must not be empty"),
            Self::InvalidDigit(ch) => write!(f, "date of birth has non-decimal character `{ch}`"),
            Self::Overflow => write!(f, "date of birth exceeds 256 bits"),
            Self::InvalidWidth(len) => write!(
                f,
                "date of birth must be {DATE_OF_BIRTH_BYTES} bytes, got {len}"
            ),
        }
    }
}

impl Error for DateOfBirthError {}
