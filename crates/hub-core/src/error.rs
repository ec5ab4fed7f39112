//! Domain-specific error types following panic-free policy.

use thiserror::Error;

/// Errors from peer name validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Candidate name was empty after trimming
    #[error("name is empty")]
    Empty,

    /// Candidate name contains a character the wire format cannot carry
    #[error("name {name:?} contains invalid character {character:?}")]
    InvalidCharacter { name: String, character: char },
}
