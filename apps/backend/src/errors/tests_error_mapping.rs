// Unit tests for error mapping - pure domain errors to HTTP status classes
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_chip_insufficient_to_422() {
    let de = DomainError::validation(ValidationKind::ChipInsufficient, "no chips left");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::ChipInsufficient);
    assert_eq!(app.status().as_u16(), 422);
}

#[test]
fn maps_conflicts_to_409() {
    for (kind, code) in [
        (
            ConflictKind::StateVersionMismatch,
            ErrorCode::StateVersionMismatch,
        ),
        (ConflictKind::TurnNotAvailable, ErrorCode::TurnNotAvailable),
        (
            ConflictKind::GameAlreadyCompleted,
            ErrorCode::GameAlreadyCompleted,
        ),
        (ConflictKind::Other("x".into()), ErrorCode::Conflict),
    ] {
        let app: AppError = DomainError::conflict(kind, "conflict").into();
        assert_eq!(app.code(), code);
        assert_eq!(app.status().as_u16(), 409);
    }
}

#[test]
fn maps_not_found_to_404() {
    let app: AppError = DomainError::session_not_found("s-1").into();
    assert_eq!(app.code().as_str(), "SESSION_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);

    let app: AppError = DomainError::not_found(NotFoundKind::Player, "ghost").into();
    assert_eq!(app.code().as_str(), "PLAYER_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);
}

#[test]
fn maps_infra_to_500() {
    let app: AppError = DomainError::session_not_initialized("s-1").into();
    assert_eq!(app.code(), ErrorCode::SessionNotInitialized);
    assert_eq!(app.status().as_u16(), 500);

    let app: AppError = DomainError::infra(InfraErrorKind::Serialization, "bad json").into();
    assert_eq!(app.code(), ErrorCode::Serialization);
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn humanized_title_uses_code_words() {
    assert_eq!(
        AppError::humanize_code("STATE_VERSION_MISMATCH"),
        "State Version Mismatch"
    );
}
