//! Caller identity used by the owner gate.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Upper bound for principal identifiers, in characters.
pub const PRINCIPAL_MAX_CHARS: usize = 128;

/// Opaque identity of a caller (an account address, operator name, ...).
///
/// Equality is exact; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Parses one principal from raw input.
    ///
    /// # Errors
    /// - `Empty` when the trimmed value is empty.
    /// - `ContainsWhitespace` when inner whitespace remains after trimming.
    /// - `TooLong` when the value exceeds `PRINCIPAL_MAX_CHARS`.
    pub fn parse(value: &str) -> Result<Self, PrincipalError> {
        let normalized = value.trim();
        if normalized.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(PrincipalError::ContainsWhitespace(normalized.to_string()));
        }
        let len = normalized.chars().count();
        if len > PRINCIPAL_MAX_CHARS {
            return Err(PrincipalError::TooLong(len));
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Principal parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    Empty,
    ContainsWhitespace(String),
    TooLong(usize),
}

impl Display for PrincipalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "principal must not be empty"),
            Self::ContainsWhitespace(value) => {
                write!(f, "principal must not contain whitespace: `{value}`")
            }
            Self::TooLong(len) => write!(
                f,
                "principal is {len} characters; at most {PRINCIPAL_MAX_CHARS} allowed"
            ),
        }
    }
}

impl Error for PrincipalError {}
