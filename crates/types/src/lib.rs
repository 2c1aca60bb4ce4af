//! Validated primitive types shared by the hospital management crates.
//!
//! Application names, authority names and route names must never be blank, so they
//! are carried as [`NonEmptyText`] once they cross a crate boundary.

use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// A trimmed string guaranteed to contain at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, trimming leading and trailing whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if nothing is left after trimming.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_input() {
        let text = NonEmptyText::new("  ROLE_ADMIN \n").unwrap();
        assert_eq!(text.as_str(), "ROLE_ADMIN");
    }

    #[test]
    fn test_new_rejects_whitespace_only() {
        assert_eq!(NonEmptyText::new("   ").unwrap_err(), TextError::Empty);
        assert_eq!("".parse::<NonEmptyText>().unwrap_err(), TextError::Empty);
    }

    #[test]
    fn test_serde_rejects_blank_strings() {
        let ok: NonEmptyText = serde_json::from_str("\"hospitalManagementApp\"").unwrap();
        assert_eq!(ok.to_string(), "hospitalManagementApp");

        let err = serde_json::from_str::<NonEmptyText>("\" \"");
        assert!(err.is_err(), "blank text should not deserialize");
    }
}
