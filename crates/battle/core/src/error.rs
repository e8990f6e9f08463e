//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`CombatantError`, `EngineError`, `CodecError`) are
//! defined next to the operations that raise them. This module only holds the
//! classification shared by all of them.
//!
//! Illegal phase transitions are not errors: calling `execute_attack` outside
//! the `fighting` phase is a silent no-op, so UI polling loops never have to
//! handle a failure for a stale click.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// Invalid input that should be rejected without retry.
    ///
    /// Examples: malformed serialized state, zero max HP, overlapping arena
    /// positions.
    Validation,

    /// The caller may try again, possibly with different input.
    Recoverable,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all battle-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for metrics and for asserting on the exact failure in tests.
    fn error_code(&self) -> &'static str;
}
