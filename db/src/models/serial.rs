use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerialError {
    #[error("The serial number must be provided")]
    Empty,

    #[error("Invalid character {0:?} in serial number")]
    InvalidCharacter(char),

    #[error("Serial number contains an empty group")]
    EmptyGroup,
}

/// A certificate serial number in canonical form: lowercase hex octets
/// separated by colons.
///
/// Other tools print serials hyphen-separated, uppercase or without
/// separators at all, so every serial is normalized on the way in. Two inputs
/// that differ only in those respects produce equal `Serial`s and therefore
/// the same storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Serial(String);

impl Serial {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Serial {
    type Err = SerialError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SerialError::Empty);
        }

        if let Some(c) = input
            .chars()
            .find(|c| !(c.is_ascii_hexdigit() || *c == ':' || *c == '-'))
        {
            return Err(SerialError::InvalidCharacter(c));
        }

        let lower = input.to_ascii_lowercase();

        if lower.contains([':', '-']) {
            let groups: Vec<&str> = lower.split([':', '-']).collect();
            if groups.iter().any(|g| g.is_empty()) {
                return Err(SerialError::EmptyGroup);
            }
            return Ok(Self(groups.join(":")));
        }

        // Bare hex, as the CA reports it. Split into octets.
        let digits = if lower.len() % 2 == 1 {
            format!("0{lower}")
        } else {
            lower
        };

        let octets: Vec<&str> = (0..digits.len())
            .step_by(2)
            .map(|i| &digits[i..i + 2])
            .collect();

        Ok(Self(octets.join(":")))
    }
}

impl TryFrom<String> for Serial {
    type Error = SerialError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Serial> for String {
    fn from(value: Serial) -> Self {
        value.0
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
