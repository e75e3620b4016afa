// src/error.rs
use thiserror::Error;

/// The one way key validation fails.
///
/// Every parser-level failure (bad markers, bad base64, corrupt DER, encrypted key
/// without a password, unsupported key type) collapses into this error; only the
/// message tells them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid EC Private Key: {reason}")]
pub struct InvalidKeyError {
    reason: String,
}

impl InvalidKeyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Text reported by the underlying parser.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
