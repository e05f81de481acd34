//! Error types for fleetwatch.
//!
//! This module defines all error types used throughout the fleetwatch crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::vessel::ScheduleField;

/// The main error type for fleetwatch operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Domain Errors ===
    /// No vessel with the given id exists.
    #[error("vessel {id} not found")]
    VesselNotFound {
        /// The requested vessel id.
        id: i64,
    },

    /// An override value could not be interpreted as a date.
    #[error("invalid {field} value '{value}': expected a date such as 2024-01-31")]
    InvalidOverrideValue {
        /// The field being edited.
        field: ScheduleField,
        /// The rejected input.
        value: String,
    },

    /// An override edit was rejected because it produces an invalid schedule.
    #[error("override rejected for vessel {id}: {message}")]
    OverrideRejected {
        /// The vessel being edited.
        id: i64,
        /// The validation message.
        message: String,
    },

    /// A value did not name a known variant (flag color, field, sort key).
    #[error("unknown {kind} '{value}'")]
    UnknownValue {
        /// What kind of value was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// No user id is available for a per-user operation.
    #[error("no user id configured; pass --user or set session.user_id")]
    MissingUser,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for fleetwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an unknown-value error.
    #[must_use]
    pub fn unknown_value(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            kind,
            value: value.into(),
        }
    }

    /// Check if this error means the requested vessel does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::VesselNotFound { .. })
    }

    /// Check if this error is a rejected user edit rather than a system failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOverrideValue { .. }
                | Self::OverrideRejected { .. }
                | Self::UnknownValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::VesselNotFound { id: 42 };
        assert_eq!(err.to_string(), "vessel 42 not found");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::VesselNotFound { id: 1 }.is_not_found());
        assert!(!Error::MissingUser.is_not_found());
    }

    #[test]
    fn test_is_validation_error() {
        let err = Error::InvalidOverrideValue {
            field: ScheduleField::Eta,
            value: "soon".to_string(),
        };
        assert!(err.is_validation_error());
        assert!(Error::unknown_value("flag color", "purple").is_validation_error());
        assert!(!Error::MissingUser.is_validation_error());
        assert!(!Error::internal("x").is_validation_error());
    }

    #[test]
    fn test_invalid_override_display() {
        let err = Error::InvalidOverrideValue {
            field: ScheduleField::Etb,
            value: "tomorrow-ish".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("etb"));
        assert!(msg.contains("tomorrow-ish"));
    }

    #[test]
    fn test_override_rejected_display() {
        let err = Error::OverrideRejected {
            id: 7,
            message: "ETB is before ETA".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("vessel 7"));
        assert!(msg.contains("ETB is before ETA"));
    }

    #[test]
    fn test_unknown_value_display() {
        let err = Error::unknown_value("flag color", "purple");
        assert_eq!(err.to_string(), "unknown flag color 'purple'");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "page_size must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
