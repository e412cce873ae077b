//! Contract error types for the site settings subsystem
//!
//! Validation failures are not errors: they come back inside an
//! `UpdateOutcome`. These variants cover everything that stops an
//! operation before or after validation.

/// Site settings errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Path does not address an existing key
    InvalidPath {
        /// Dot-delimited setting path
        path: String,
    },
    /// Value cannot be represented in the schema at this path
    TypeMismatch {
        /// Dot-delimited setting path
        path: String,
        /// Deserializer message
        details: String,
    },
    /// Import payload is not well-formed JSON
    Parse {
        /// Parser message
        details: String,
    },
    /// Request rejected before validation (e.g. oversized payload)
    Validation {
        /// Validation error message
        message: String,
    },
    /// Persisted revision moved since the settings were read
    Conflict {
        /// Revision the write was based on
        expected: u64,
        /// Revision currently persisted
        actual: u64,
    },
    /// Backing store could not be read or written
    Persistence {
        /// Backend message
        message: String,
    },
    /// Category name not part of the schema
    UnknownCategory {
        /// Offending name
        name: String,
    },
    /// Internal error
    Internal,
}

impl SettingsError {
    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Persistence { .. })
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath { path } => {
                write!(f, "Invalid setting path: {}", path)
            }
            Self::TypeMismatch { path, details } => {
                write!(f, "Invalid value for '{}': {}", path, details)
            }
            Self::Parse { details } => {
                write!(f, "Malformed settings JSON: {}", details)
            }
            Self::Validation { message } => {
                write!(f, "Validation error: {}", message)
            }
            Self::Conflict { expected, actual } => {
                write!(
                    f,
                    "Settings were modified concurrently (expected revision {}, found {})",
                    expected, actual
                )
            }
            Self::Persistence { message } => {
                write!(f, "Settings storage failure: {}", message)
            }
            Self::UnknownCategory { name } => {
                write!(f, "Unknown settings category: {}", name)
            }
            Self::Internal => {
                write!(f, "Internal error")
            }
        }
    }
}

impl std::error::Error for SettingsError {}
