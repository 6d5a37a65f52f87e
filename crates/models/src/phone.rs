use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::errors::ModelError;

// Country code plus subscriber number, 8..=15 digits, no leading zero.
static E164: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{7,14}$").expect("Failed to compile phone regex"));

/// International phone number in canonical `+<digits>` form.
///
/// Spaces, dashes, dots and parentheses are accepted as separators on input
/// and dropped, so `+7 (916) 123-45-67` and `+79161234567` are the same number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let compact: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if !E164.is_match(&compact) {
            return Err(ModelError::InvalidPhone(raw.to_string()));
        }
        let digits = compact.trim_start_matches('+');
        Ok(Self(format!("+{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PhoneNumber {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
