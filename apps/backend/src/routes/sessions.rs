//! Session HTTP routes: a thin adapter over the lobby and the turn engine.

use actix_web::http::header::{ETAG, IF_MATCH, IF_NONE_MATCH};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::Deserialize;

use crate::domain::PlayerAction;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::ErrorCode;
use crate::http::etag::{if_none_match_hits, parse_version_from_etag, session_etag};
use crate::services::Command;
use crate::state::app_state::AppState;
use crate::store::VersionedSnapshot;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    session_id: Option<String>,
    rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinSessionRequest {
    player_id: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandRequest {
    command_id: String,
    /// Falls back to `If-Match` when absent.
    expected_version: Option<String>,
    player_id: String,
    action: PlayerAction,
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    after: Option<String>,
}

fn versioned_response(status: StatusCode, body: VersionedSnapshot) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((ETAG, session_etag(&body.version)))
        .json(body)
}

/// POST /api/sessions
async fn create_session(
    body: Option<web::Json<CreateSessionRequest>>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let session_id = request
        .session_id
        .unwrap_or_else(|| format!("{:016x}", rand::random::<u64>()));

    let created = app_state
        .lobby
        .create_session(&session_id, request.rng_seed)
        .await?;
    Ok(versioned_response(StatusCode::CREATED, created))
}

/// POST /api/sessions/{session_id}/players
async fn join_session(
    path: web::Path<String>,
    body: web::Json<JoinSessionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let body = body.into_inner();
    let joined = app_state
        .lobby
        .join_session(&session_id, &body.player_id, body.display_name)
        .await?;
    Ok(versioned_response(StatusCode::OK, joined))
}

/// POST /api/sessions/{session_id}/start
async fn start_session(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let started = app_state.lobby.start_session(&path.into_inner()).await?;
    Ok(versioned_response(StatusCode::OK, started))
}

/// GET /api/sessions
async fn list_sessions(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(app_state.store.list_sessions()))
}

/// GET /api/sessions/{session_id}
///
/// Supports `If-None-Match`: a matching ETag yields `304 Not Modified`.
async fn get_session(
    http_req: HttpRequest,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let envelope = app_state
        .store
        .get_envelope(&session_id)
        .ok_or_else(|| DomainError::session_not_found(&session_id))?;
    let current = envelope.versioned();
    let etag_value = session_etag(&current.version);

    if let Some(if_none_match) = http_req.headers().get(IF_NONE_MATCH) {
        if let Ok(client_etag) = if_none_match.to_str() {
            if if_none_match_hits(client_etag, &etag_value) {
                return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
                    .insert_header((ETAG, etag_value))
                    .finish());
            }
        }
    }

    Ok(versioned_response(StatusCode::OK, current))
}

fn expected_version(
    http_req: &HttpRequest,
    from_body: Option<String>,
) -> Result<String, AppError> {
    if let Some(version) = from_body {
        return Ok(version);
    }
    match http_req.headers().get(IF_MATCH) {
        Some(value) => {
            let raw = value.to_str().map_err(|_| {
                AppError::bad_request(
                    ErrorCode::InvalidHeader,
                    "If-Match header is not valid ASCII".to_string(),
                )
            })?;
            parse_version_from_etag(raw)
        }
        None => Err(AppError::invalid(
            ErrorCode::InvalidCommand,
            "expectedVersion or an If-Match header is required".to_string(),
        )),
    }
}

/// POST /api/sessions/{session_id}/commands
async fn apply_command(
    http_req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<CommandRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let command = Command {
        session_id: path.into_inner(),
        command_id: body.command_id,
        expected_version: expected_version(&http_req, body.expected_version)?,
        player_id: body.player_id,
        action: body.action,
    };

    let applied = app_state.engine.apply_command(command).await?;
    Ok(versioned_response(StatusCode::OK, applied))
}

/// GET /api/sessions/{session_id}/log?after={entryId}
async fn event_log(
    path: web::Path<String>,
    query: web::Query<LogQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    if app_state.store.get_envelope(&session_id).is_none() {
        return Err(DomainError::session_not_found(&session_id).into());
    }
    let entries = app_state
        .store
        .list_event_log_after(&session_id, query.after.as_deref())?;
    Ok(HttpResponse::Ok().json(entries))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::post().to(create_session))
            .route(web::get().to(list_sessions)),
    );
    cfg.service(web::resource("/{session_id}").route(web::get().to(get_session)));
    cfg.service(web::resource("/{session_id}/players").route(web::post().to(join_session)));
    cfg.service(web::resource("/{session_id}/start").route(web::post().to(start_session)));
    cfg.service(web::resource("/{session_id}/commands").route(web::post().to(apply_command)));
    cfg.service(web::resource("/{session_id}/log").route(web::get().to(event_log)));
}
