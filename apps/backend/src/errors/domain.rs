//! Domain-level error type used across the core.
//!
//! This error type is HTTP-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::errors::ErrorCode;

/// Infra error kinds: programmer errors and operational failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    /// Idempotency or event-log bookkeeping against a session never saved.
    SessionNotInitialized,
    /// Snapshot could not be serialized for hashing.
    Serialization,
    Other(String),
}

/// Domain-level not found entities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Session,
    Player,
    Other(String),
}

/// Domain-level conflict kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// Command was built against a stale snapshot version.
    StateVersionMismatch,
    /// Wrong player acting, or nothing is awaiting action.
    TurnNotAvailable,
    GameAlreadyCompleted,
    SessionExists,
    PlayerAlreadyJoined,
    Other(String),
}

/// Domain-level validation kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    ChipInsufficient,
    PhaseMismatch,
    InvalidPlayerCount,
    InvalidCommand,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn session_not_found(session_id: &str) -> Self {
        Self::not_found(NotFoundKind::Session, format!("Session {session_id} not found"))
    }

    pub fn session_not_initialized(session_id: &str) -> Self {
        Self::infra(
            InfraErrorKind::SessionNotInitialized,
            format!("Session {session_id} has not been initialized in the store"),
        )
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::ChipInsufficient => ErrorCode::ChipInsufficient,
                ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
                ValidationKind::InvalidPlayerCount => ErrorCode::InvalidPlayerCount,
                ValidationKind::InvalidCommand => ErrorCode::InvalidCommand,
                ValidationKind::Other(_) => ErrorCode::ValidationError,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::StateVersionMismatch => ErrorCode::StateVersionMismatch,
                ConflictKind::TurnNotAvailable => ErrorCode::TurnNotAvailable,
                ConflictKind::GameAlreadyCompleted => ErrorCode::GameAlreadyCompleted,
                ConflictKind::SessionExists => ErrorCode::SessionExists,
                ConflictKind::PlayerAlreadyJoined => ErrorCode::PlayerAlreadyJoined,
                ConflictKind::Other(_) => ErrorCode::Conflict,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Session => ErrorCode::SessionNotFound,
                NotFoundKind::Player => ErrorCode::PlayerNotFound,
                NotFoundKind::Other(_) => ErrorCode::NotFound,
            },
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::SessionNotInitialized => ErrorCode::SessionNotInitialized,
                InfraErrorKind::Serialization => ErrorCode::Serialization,
                InfraErrorKind::Other(_) => ErrorCode::InternalError,
            },
        }
    }
}
