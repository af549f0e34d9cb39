//! # CLI Error Type
//!
//! One error type for every command, wrapping the library errors.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  ValidationError ──┐                                                   │
//! │  CoreError ────────┤                                                   │
//! │  DbError ──────────┼──► AppError ──► main: log, print, exit code       │
//! │  ReportError ──────┤                                                   │
//! │  io / toml ────────┘                                                   │
//! │                                                                         │
//! │  exit 2: the input was wrong (validation, unknown id, bad reference)   │
//! │  exit 1: everything else                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use thiserror::Error;

use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;
use stockroom_report::ReportError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be parsed.
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Record named on the command line does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::NotFound { .. }
            | AppError::Validation(_)
            | AppError::Core(_)
            | AppError::InvalidConfig(_)
            | AppError::ConfigParse { .. } => 2,
            AppError::Database(DbError::ForeignKeyViolation { .. })
            | AppError::Database(DbError::UniqueViolation { .. })
            | AppError::Database(DbError::ConstraintViolation { .. })
            | AppError::Database(DbError::NotFound { .. }) => 2,
            _ => 1,
        }
    }
}

/// Result type for CLI commands.
pub type AppResult<T> = Result<T, AppError>;
