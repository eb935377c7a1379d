//! Error types for feedcheck core.

use std::fmt;

use thiserror::Error;

use crate::types::MsgKey;

/// Errors raised by the leaf primitives (hashing, key decoding, signatures).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,
}

/// The reason a message failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("the first message of a feed must have seq of 1, got {got}")]
    FirstMessageMustHaveSeqOne { got: u64 },

    #[error("sequence out of order: expected {expected}, got {got}")]
    SequenceOutOfOrder { expected: u64, got: u64 },

    #[error("previous hash mismatch: expected {expected}, got {got:?}")]
    PreviousHashMismatch {
        expected: MsgKey,
        got: Option<String>,
    },

    #[error("the first message of a feed must not have a previous, got {0}")]
    UnexpectedPrevious(String),

    #[error("invalid hash: key {claimed} does not match computed {computed}")]
    InvalidHash { claimed: MsgKey, computed: MsgKey },

    #[error("signature was invalid")]
    InvalidSignature,

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("author mismatch: previous message is by {expected}, got {got}")]
    AuthorMismatch { expected: String, got: String },
}

impl ValidationError {
    /// The kind of violation, without its details.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::MalformedMessage(_) => ErrorKind::MalformedMessage,
            ValidationError::FirstMessageMustHaveSeqOne { .. } => {
                ErrorKind::FirstMessageMustHaveSeqOne
            }
            ValidationError::SequenceOutOfOrder { .. } => ErrorKind::SequenceOutOfOrder,
            ValidationError::PreviousHashMismatch { .. } => ErrorKind::PreviousHashMismatch,
            ValidationError::UnexpectedPrevious(_) => ErrorKind::UnexpectedPrevious,
            ValidationError::InvalidHash { .. } => ErrorKind::InvalidHash,
            ValidationError::InvalidSignature => ErrorKind::InvalidSignature,
            ValidationError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            ValidationError::AuthorMismatch { .. } => ErrorKind::AuthorMismatch,
        }
    }
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::UnsupportedAlgorithm(tag) => ValidationError::UnsupportedAlgorithm(tag),
            CoreError::InvalidEncoding(msg) => ValidationError::MalformedMessage(msg),
            CoreError::InvalidPublicKey | CoreError::InvalidSignature => {
                ValidationError::InvalidSignature
            }
        }
    }
}

/// Discriminant of [`ValidationError`], convenient for matching and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedMessage,
    FirstMessageMustHaveSeqOne,
    SequenceOutOfOrder,
    PreviousHashMismatch,
    UnexpectedPrevious,
    InvalidHash,
    InvalidSignature,
    UnsupportedAlgorithm,
    AuthorMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A validation failure tied to the message that caused it.
///
/// `index` is the message's position in the slice handed to the validator
/// (always 0 for single-message validation).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("message {key} at index {index} rejected: {error}")]
pub struct Rejection {
    /// The key the message claims (not necessarily a valid key).
    pub key: String,
    pub index: usize,
    #[source]
    pub error: ValidationError,
}

impl Rejection {
    pub fn new(key: impl Into<String>, index: usize, error: ValidationError) -> Self {
        Self {
            key: key.into(),
            index,
            error,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_conversion() {
        let e: ValidationError = CoreError::UnsupportedAlgorithm("blake2b".into()).into();
        assert_eq!(e.kind(), ErrorKind::UnsupportedAlgorithm);

        let e: ValidationError = CoreError::InvalidEncoding("bad base64".into()).into();
        assert_eq!(e.kind(), ErrorKind::MalformedMessage);

        let e: ValidationError = CoreError::InvalidPublicKey.into();
        assert_eq!(e, ValidationError::InvalidSignature);
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection::new("%abc.sha256", 3, ValidationError::InvalidSignature);
        let text = rejection.to_string();
        assert!(text.contains("%abc.sha256"));
        assert!(text.contains("index 3"));
        assert!(text.contains("signature was invalid"));
        assert_eq!(rejection.kind(), ErrorKind::InvalidSignature);
    }

    #[test]
    fn test_first_message_text() {
        let e = ValidationError::FirstMessageMustHaveSeqOne { got: 4 };
        assert!(e
            .to_string()
            .contains("the first message of a feed must have seq of 1"));
    }
}
