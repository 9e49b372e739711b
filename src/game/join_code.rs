use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const JOIN_CODE_LEN: usize = 5;
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid join code '{0}': expected 5 characters from A-Z and 0-9")]
pub struct InvalidJoinCode(pub String);

/// Five character code identifying a game, drawn from `A-Z` and `0-9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JoinCode(String);

impl JoinCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JoinCode {
    type Err = InvalidJoinCode;

    /// Parses a code, accepting lowercase input since players type these by hand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        let valid = code.len() == JOIN_CODE_LEN
            && code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b));
        if valid {
            Ok(Self(code))
        } else {
            Err(InvalidJoinCode(s.to_string()))
        }
    }
}

impl TryFrom<String> for JoinCode {
    type Error = InvalidJoinCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JoinCode> for String {
    fn from(code: JoinCode) -> Self {
        code.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JoinCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trait for generating candidate join codes
pub trait JoinCodeGenerator: Send + Sync {
    fn generate(&self) -> JoinCode;
}

/// Uniform random codes from the thread-local RNG
pub struct RandomJoinCodeGenerator;

impl RandomJoinCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomJoinCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinCodeGenerator for RandomJoinCodeGenerator {
    fn generate(&self) -> JoinCode {
        let mut rng = rand::rng();
        let code = (0..JOIN_CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..JOIN_CODE_ALPHABET.len());
                JOIN_CODE_ALPHABET[idx] as char
            })
            .collect();
        JoinCode(code)
    }
}
