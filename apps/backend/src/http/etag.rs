//! ETag helpers for optimistic concurrency control.
//!
//! A session's ETag is its content version in quotes, so `If-Match` can carry
//! the `expectedVersion` of a command.

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Generate an ETag for a session version.
///
/// # Example
/// ```
/// # use backend::http::etag::session_etag;
/// assert_eq!(session_etag("ab12"), r#""ab12""#);
/// ```
pub fn session_etag(version: &str) -> String {
    format!(r#""{version}""#)
}

/// Extract the version from an ETag value (quotes and `W/` are optional).
///
/// # Errors
/// `AppError::bad_request` with `ErrorCode::InvalidHeader` when the value is
/// empty or not a hex digest.
pub fn parse_version_from_etag(s: &str) -> Result<String, AppError> {
    let s = s.trim();
    let s = s.strip_prefix("W/").unwrap_or(s).trim_matches('"');

    if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag format: expected a quoted hex version, got: \"{s}\""),
        ));
    }
    Ok(s.to_ascii_lowercase())
}

/// Whether an `If-None-Match` value matches `etag` (`*` matches anything).
pub fn if_none_match_hits(header: &str, etag: &str) -> bool {
    header.trim() == "*" || header.split(',').map(str::trim).any(|tag| tag == etag)
}
