use actix_web::{error, web};

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod health;
pub mod sessions;

/// Configure application routes for tests and non-HttpServer contexts.
///
/// `main.rs` adds the logging middleware on top; tests register the same
/// paths directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    cfg.route("/", web::get().to(health::root));

    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Session routes: /api/sessions/**
    cfg.service(web::scope("/api/sessions").configure(sessions::configure_routes));
}

/// Malformed JSON bodies render as problem details like every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        error::Error::from(AppError::bad_request(ErrorCode::InvalidCommand, detail))
    })
}
