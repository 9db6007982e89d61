//! Error handling and error types for the point masking engine.
//!
//! Ordinary degenerate input (empty populations, oversized requests, bad
//! strides) is clamped rather than reported. The variants here cover the
//! remaining cases: malformed point sets, unreadable configuration and
//! failures of the collective transport, which are surfaced as-is.

use std::io;
use thiserror::Error;

/// Main error type for the masking library.
#[derive(Error, Debug)]
pub enum MaskPointsError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Attribute arrays that are not index-aligned with the positions
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Collective communication failures
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// TOML serialization errors
    #[error("TOML error: {message}")]
    Toml { message: String },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Type alias for Results using MaskPointsError
pub type Result<T> = std::result::Result<T, MaskPointsError>;

impl MaskPointsError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        MaskPointsError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        MaskPointsError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        MaskPointsError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        MaskPointsError::Transport {
            message: message.into(),
        }
    }

    /// Create a TOML error
    pub fn toml<S: Into<String>>(message: S) -> Self {
        MaskPointsError::Toml {
            message: message.into(),
        }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        MaskPointsError::Internal {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            MaskPointsError::Config { .. } => "config",
            MaskPointsError::InvalidParameter { .. } => "invalid_parameter",
            MaskPointsError::DimensionMismatch { .. } => "dimension_mismatch",
            MaskPointsError::Transport { .. } => "transport",
            MaskPointsError::IO { .. } => "io",
            MaskPointsError::Json { .. } => "json",
            MaskPointsError::Toml { .. } => "toml",
            MaskPointsError::Internal { .. } => "internal",
        }
    }
}

impl From<toml::de::Error> for MaskPointsError {
    fn from(err: toml::de::Error) -> Self {
        MaskPointsError::toml(err.to_string())
    }
}

impl From<toml::ser::Error> for MaskPointsError {
    fn from(err: toml::ser::Error) -> Self {
        MaskPointsError::toml(err.to_string())
    }
}
