//! Redirect and cookie helpers shared by handlers and middleware

use axum::{
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

use secweb_security::cookie::find_cookie;

use crate::error::ApiError;

/// `302 Found` to `location`.
pub fn found(location: &str) -> Result<Response, ApiError> {
    let location = HeaderValue::from_str(location)
        .map_err(|e| ApiError::InternalError(format!("invalid redirect target: {}", e)))?;
    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}

pub fn append_cookie(response: &mut Response, set_cookie: &str) -> Result<(), ApiError> {
    let value = HeaderValue::from_str(set_cookie)
        .map_err(|e| ApiError::InternalError(format!("invalid Set-Cookie value: {}", e)))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(())
}

pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    find_cookie(
        headers.get_all(COOKIE).iter().filter_map(|v| v.to_str().ok()),
        name,
    )
    .map(str::to_owned)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_sessions: usize,
}
