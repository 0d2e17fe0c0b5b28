//! # Error Types
//!
//! Structured error types for quote_core. Hard failures of the pricing engine
//! (`MissingMachine`, `InvalidDuration`) are represented here so callers that
//! want to know *why* a quote could not be priced can ask for it; the plain
//! [`crate::pricing::calculate`] entry point collapses them to `None`.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::errors::{QuoteError, QuoteResult};
//!
//! fn validate_hours(print_hours: f64) -> QuoteResult<()> {
//!     if !(print_hours > 0.0) {
//!         return Err(QuoteError::invalid_duration(print_hours));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_hours(0.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for quote_core operations
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Structured error type for pricing and loading operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum QuoteError {
    /// The job references a machine that is not in the catalog snapshot
    #[error("Machine not found: '{machine_id}'")]
    MissingMachine { machine_id: String },

    /// Total print time is zero, negative or not a number
    #[error("Invalid print duration: {print_hours} h - print time must be positive")]
    InvalidDuration { print_hours: f64 },

    /// An input value is invalid (wrong shape, out of range, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Snapshot schema version mismatch
    #[error("Version mismatch: snapshot version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl QuoteError {
    /// Create a MissingMachine error
    pub fn missing_machine(machine_id: impl Into<String>) -> Self {
        QuoteError::MissingMachine {
            machine_id: machine_id.into(),
        }
    }

    /// Create an InvalidDuration error
    pub fn invalid_duration(print_hours: f64) -> Self {
        QuoteError::InvalidDuration { print_hours }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        QuoteError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError from anything displayable
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        QuoteError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Whether the failure means "not enough information yet" rather than
    /// malformed data. The editing surface shows a pending state for these.
    pub fn is_incomplete_quote(&self) -> bool {
        matches!(
            self,
            QuoteError::MissingMachine { .. } | QuoteError::InvalidDuration { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            QuoteError::MissingMachine { .. } => "MISSING_MACHINE",
            QuoteError::InvalidDuration { .. } => "INVALID_DURATION",
            QuoteError::InvalidInput { .. } => "INVALID_INPUT",
            QuoteError::SerializationError { .. } => "SERIALIZATION_ERROR",
            QuoteError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::serialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = QuoteError::missing_machine("ender3_default");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"MissingMachine\""));
        let roundtrip: QuoteError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(QuoteError::missing_machine("m").error_code(), "MISSING_MACHINE");
        assert_eq!(QuoteError::invalid_duration(0.0).error_code(), "INVALID_DURATION");
        assert_eq!(QuoteError::invalid_input("a", "b", "c").error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_incomplete_quote_classification() {
        assert!(QuoteError::missing_machine("m").is_incomplete_quote());
        assert!(QuoteError::invalid_duration(-1.0).is_incomplete_quote());
        assert!(!QuoteError::serialization("bad json").is_incomplete_quote());
    }

    #[test]
    fn test_display_messages() {
        let msg = QuoteError::invalid_duration(0.0).to_string();
        assert!(msg.contains("print time must be positive"));
        let msg = QuoteError::missing_machine("prusa_mk3").to_string();
        assert_eq!(msg, "Machine not found: 'prusa_mk3'");
    }
}
