//! Unified error type for the portal.
//!
//! Every operation returns [`Result`]; the variants keep backend failures,
//! missing data and bad input apart so callers can react to each differently.

use thiserror::Error;

/// All errors produced by the portal.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The workbook backend failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No tab with this title exists in the workbook
    #[error("Sheet '{title}' not found")]
    SheetNotFound {
        /// Tab title that was looked up
        title: String,
    },

    /// A tab with this title already exists
    #[error("Sheet '{title}' already exists")]
    SheetExists {
        /// Tab title that was requested
        title: String,
    },

    /// No row in the table has this key
    #[error("No record with code '{code}' in '{table}'")]
    RecordNotFound {
        /// Tab that was searched
        table: String,
        /// Key that was looked up
        code: String,
    },

    /// A cell address lies outside the worksheet grid
    #[error("Cell ({row}, {col}) is outside the grid")]
    OutOfRange {
        /// 1-based row
        row: usize,
        /// 1-based column
        col: usize,
    },

    /// Input failed validation
    #[error("Invalid input: {message}")]
    Validation {
        /// Which rule was broken
        message: String,
    },

    /// Code/password pair did not match any account
    #[error("Invalid code or password")]
    InvalidCredentials,

    /// The caller has no session or the wrong role
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why access was refused
        message: String,
    },

    /// Code generation kept colliding with existing codes
    #[error("Could not generate a unique code after {attempts} attempts")]
    CodeSpaceExhausted {
        /// Attempts made before giving up
        attempts: usize,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the request surface.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Database(_) | Self::Io(_) => "backend",
            Self::SheetNotFound { .. } | Self::RecordNotFound { .. } => "not_found",
            Self::SheetExists { .. } => "conflict",
            Self::OutOfRange { .. } | Self::Validation { .. } => "validation",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthorized { .. } => "unauthorized",
            Self::CodeSpaceExhausted { .. } => "code_space_exhausted",
            Self::Json(_) => "bad_params",
            Self::EnvVar(_) => "environment",
        }
    }

    /// True for failures of the backend itself, where retrying may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_separate_failure_kinds() {
        let not_found = Error::RecordNotFound {
            table: "Students".to_string(),
            code: "A12345".to_string(),
        };
        assert_eq!(not_found.code(), "not_found");
        assert!(!not_found.is_transient());

        let invalid = Error::validation("year must be between 1 and 4");
        assert_eq!(invalid.code(), "validation");
        assert_eq!(
            invalid.to_string(),
            "Invalid input: year must be between 1 and 4"
        );

        let backend = Error::Database(sea_orm::DbErr::Custom("gone".to_string()));
        assert_eq!(backend.code(), "backend");
        assert!(backend.is_transient());
    }
}
