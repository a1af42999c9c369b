//! Error types for ferro-hla
//!
//! All reduction failures are recoverable and typed. A bad input token never
//! crashes the engine; it surfaces as one of the three taxonomy errors with
//! the offending token preserved, so callers can report the exact culprit
//! even when it was buried deep inside a GL String.

use thiserror::Error;

/// Main error type for ferro-hla operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HlaError {
    /// A token failed final validation against the reference tables
    #[error("{allele} is not a valid allele")]
    InvalidAllele { allele: String },

    /// A MAC is unknown, or no code encodes a given allele set
    #[error("invalid MAC {mac}: {reason}")]
    InvalidMac { mac: String, reason: String },

    /// Malformed delimiter/field syntax, or an unparseable token shape
    #[error("invalid typing {text:?}: {reason}")]
    InvalidTyping { text: String, reason: String },

    /// Reference data could not be loaded for the requested version
    #[error("reference data not available for version {version}")]
    ReferenceNotFound { version: String },

    /// IO error while loading reference data
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON error while loading reference data
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl HlaError {
    /// Create an `InvalidAllele` error
    pub fn invalid_allele(allele: impl Into<String>) -> Self {
        HlaError::InvalidAllele {
            allele: allele.into(),
        }
    }

    /// Create an `InvalidMac` error
    pub fn invalid_mac(mac: impl Into<String>, reason: impl Into<String>) -> Self {
        HlaError::InvalidMac {
            mac: mac.into(),
            reason: reason.into(),
        }
    }

    /// Create an `InvalidTyping` error
    pub fn invalid_typing(text: impl Into<String>, reason: impl Into<String>) -> Self {
        HlaError::InvalidTyping {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// The input text that triggered this error, if any
    pub fn offending_input(&self) -> Option<&str> {
        match self {
            HlaError::InvalidAllele { allele } => Some(allele),
            HlaError::InvalidMac { mac, .. } => Some(mac),
            HlaError::InvalidTyping { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HlaError {
    fn from(err: std::io::Error) -> Self {
        HlaError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for HlaError {
    fn from(err: serde_json::Error) -> Self {
        HlaError::Json {
            msg: err.to_string(),
        }
    }
}
