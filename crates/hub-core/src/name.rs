//! Validated display names.

use crate::error::NameError;
use std::fmt;

/// A peer's unique display name.
///
/// Names are case-sensitive and validated at construction: they must be
/// non-empty and must not contain whitespace, commas, or control
/// characters. The restriction comes from the wire format itself - a
/// name with a comma or space could not appear in a `USERLIST` snapshot
/// or be addressed in a `PRIVATE` recipient list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerName(String);

impl PeerName {
    /// Parses and validates a candidate name.
    ///
    /// Leading and trailing whitespace is trimmed before validation, so
    /// a client sending `"alice "` registers as `alice`.
    ///
    /// # Errors
    ///
    /// - `NameError::Empty` if the trimmed candidate is empty
    /// - `NameError::InvalidCharacter` if it contains whitespace,
    ///   a comma, or a control character
    pub fn parse(candidate: &str) -> Result<Self, NameError> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        if let Some(bad) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || *c == ',' || c.is_control())
        {
            return Err(NameError::InvalidCharacter {
                name: trimmed.to_string(),
                character: bad,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the underlying string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PeerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
