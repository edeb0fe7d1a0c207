//! # Error Types — Shared Error Hierarchy
//!
//! Defines the error types shared across the badge protocol crates. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! Protocol-level errors (authorization, lifecycle, collision) live next to
//! the components that raise them in `badges-registry`; this module only
//! carries the foundational error classes.

use thiserror::Error;

/// Top-level error type for the foundational crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An identifier failed validation at construction.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A timestamp failed validation at construction.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Numeric fields must be strings or integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest computation or decoding failed.
    #[error("digest error: {0}")]
    DigestError(String),
}
