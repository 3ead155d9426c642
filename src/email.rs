//! Email validation shared by the signup handler and the form controller.
//!
//! The accepted shape is deliberately loose: `something@something.something`
//! with no whitespace anywhere. Deliverability is not checked.

use lazy_regex::regex_is_match;
use serde_json::Value;
use strum_macros::AsRefStr;

// ###################################
// ->   STRUCTS
// ###################################
/// A validated, lowercased email address.
/// Only obtainable through `ValidEmail::parse` or `ValidEmail::parse_str`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    /// Validates an untyped `email` field as it arrives in a request body.
    /// Anything that is not a JSON string counts as missing.
    pub fn parse(input: Option<&Value>) -> Result<Self, ValidationError> {
        match input {
            Some(Value::String(value)) => Self::parse_str(value),
            _ => Err(ValidationError::EmptyOrWrongType),
        }
    }

    pub fn parse_str<S>(value: S) -> Result<Self, ValidationError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.trim().is_empty() {
            return Err(ValidationError::EmptyOrWrongType);
        }

        if !Self::is_plausible(value) {
            return Err(ValidationError::BadFormat);
        }

        Ok(ValidEmail(value.to_lowercase()))
    }

    /// The bare pattern check, without case folding.
    pub fn is_plausible(value: &str) -> bool {
        regex_is_match!(r"^\S+@\S+\.\S+$", value)
    }
}

// ###################################
// ->   ERROR
// ###################################
/// The `Display` output of each variant is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, thiserror::Error)]
pub enum ValidationError {
    #[error("Email is required and must be a non-empty string")]
    EmptyOrWrongType,
    #[error("Invalid email format")]
    BadFormat,
}
