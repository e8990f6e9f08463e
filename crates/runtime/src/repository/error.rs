//! Error types raised by repository implementations.

use battle_core::{BattleError, ErrorSeverity};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl BattleError for RepositoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io(_) | Self::Unavailable(_) => ErrorSeverity::Recoverable,
            Self::Json(_) | Self::CorruptedData(_) => ErrorSeverity::Validation,
            Self::LockPoisoned => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LockPoisoned => "REPOSITORY_LOCK_POISONED",
            Self::Io(_) => "REPOSITORY_IO",
            Self::Json(_) => "REPOSITORY_JSON",
            Self::CorruptedData(_) => "REPOSITORY_CORRUPTED_DATA",
            Self::Unavailable(_) => "REPOSITORY_UNAVAILABLE",
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
