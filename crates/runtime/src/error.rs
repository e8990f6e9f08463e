//! Runtime-level error type.

use battle_core::{BattleError, CodecError, EngineError, ErrorSeverity};

use crate::repository::RepositoryError;

/// Errors surfaced by sessions and the auto-battle driver.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("auto battle task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Engine(e) => e.severity(),
            Self::Codec(e) => e.severity(),
            Self::Repository(e) => e.severity(),
            Self::Io(_) => ErrorSeverity::Recoverable,
            Self::Join(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.error_code(),
            Self::Codec(e) => e.error_code(),
            Self::Repository(e) => e.error_code(),
            Self::Io(_) => "RUNTIME_IO",
            Self::Join(_) => "RUNTIME_JOIN",
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
