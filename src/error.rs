//! Error types for the leaf components of the wallet core.
//!
//! Orchestration in [`crate::service`] works with `anyhow::Result` and wraps
//! these where a caller may want to match on the cause.

use thiserror::Error;

/// Errors raised by the symmetric encryption helper.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CryptoError {
    /// The key is not 32 bytes long.
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The payload is not of the form `hex(iv):hex(ciphertext)`.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A hex segment could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Decryption failed, usually because the key is wrong.
    #[error("unable to decrypt payload")]
    Decrypt,

    /// The decrypted bytes are not valid UTF-8.
    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors raised when an external schema payload is missing a field required
/// by the internal credential shape.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A required field is absent. Holds the dotted path of the field.
    #[error("missing field {0}")]
    MissingField(String),
}

/// Errors raised by a [`crate::keychain::Keychain`] implementation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KeychainError {
    /// No value is stored under the key.
    #[error("no keychain entry for {0}")]
    NotFound(String),

    /// The stored value could not be (de)serialized.
    #[error("keychain serialization failed: {0}")]
    Serialization(String),

    /// The keychain backend failed.
    #[error("keychain backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for KeychainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised while loading configuration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A URL setting could not be parsed.
    #[error("invalid url for {name}: {message}")]
    InvalidUrl {
        /// Setting name.
        name: String,
        /// Parser message.
        message: String,
    },

    /// A numeric setting could not be parsed.
    #[error("invalid number for {name}: {value}")]
    InvalidNumber {
        /// Setting name.
        name: String,
        /// Offending value.
        value: String,
    },
}
