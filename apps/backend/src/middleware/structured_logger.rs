use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::ETAG;
use actix_web::http::StatusCode;
use actix_web::Error as ActixError;
use futures::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// One structured `request_completed` event per request, levelled by status.
///
/// Session routes also report the session id, the version the response
/// carries and, for failures, the error code.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// What a finished request did to a session.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionOutcome {
    pub session_id: Option<String>,
    pub version: Option<String>,
    pub error_code: Option<ErrorCode>,
}

impl SessionOutcome {
    /// Path params are only resolved once routing ran, so this reads the
    /// request attached to the response.
    pub(crate) fn of<B>(res: &ServiceResponse<B>) -> Self {
        let session_id = res.request().match_info().get("session_id").map(str::to_string);
        let version = res
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_matches('"').to_string());
        let error_code = res
            .response()
            .error()
            .and_then(|e| e.as_error::<AppError>())
            .map(AppError::code);
        Self {
            session_id,
            version,
            error_code,
        }
    }
}

fn emit(method: &str, path: &str, status: StatusCode, duration_us: u64, outcome: &SessionOutcome) {
    let status_code = status.as_u16();
    let session_id = outcome.session_id.as_deref();
    let version = outcome.version.as_deref();
    let error_code = outcome.error_code.map(|c| c.to_string());
    let error_code = error_code.as_deref();

    if status.is_server_error() {
        error!(http.method = method, url.path = path, http.status_code = status_code, duration_us, session_id, version, error_code, "request_completed");
    } else if status.is_client_error() {
        warn!(http.method = method, url.path = path, http.status_code = status_code, duration_us, session_id, version, error_code, "request_completed");
    } else {
        info!(http.method = method, url.path = path, http.status_code = status_code, duration_us, session_id, version, "request_completed");
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let duration_us = start.elapsed().as_micros() as u64;
            match &result {
                Ok(res) => emit(&method, &path, res.status(), duration_us, &SessionOutcome::of(res)),
                Err(err) => {
                    let outcome = SessionOutcome {
                        error_code: err.as_error::<AppError>().map(AppError::code),
                        ..SessionOutcome::default()
                    };
                    emit(&method, &path, err.as_response_error().status_code(), duration_us, &outcome);
                }
            }
            result
        })
    }
}
