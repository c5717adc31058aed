// ============================================================================
// Secweb API - Auth Handlers
// File: crates/secweb-api/src/handlers/auth.rs
// ============================================================================
//! Login form, login submission and logout

use std::fmt;

use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{debug, info};

use secweb_core::AuthError;
use secweb_security::cookie::decode_saved_request;
use secweb_shared::constants::SAVED_REQUEST_COOKIE;
use secweb_shared::utils::fingerprint;

use crate::error::ApiError;
use crate::middleware::csrf::{self, form_token};
use crate::response::{append_cookie, cookie_value, found};
use crate::state::AppState;

/// `?error` and `?logout` flags; only presence matters.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub logout: Option<String>,
}

/// Login form submission
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "_csrf", default)]
    pub csrf: Option<String>,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: Option<String>,
}

/// Login page handler - GET /login
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let csrf = form_token(&state, &headers);
    let body = state.pages.login(
        &state.security.login_path,
        query.error.is_some(),
        query.logout.is_some(),
        csrf.token.as_deref(),
    )?;

    let mut response = Html(body).into_response();
    if let Some(cookie) = csrf.set_cookie {
        append_cookie(&mut response, &cookie)?;
    }
    Ok(response)
}

/// Login handler - POST /login
///
/// Success establishes a fresh session and redirects to the saved request
/// or the default success URL. Failure redirects to the failure URL and
/// leaves any existing session untouched.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    csrf::verify(&state, &headers, form.csrf.as_deref())?;
    let security = &state.security;

    let principal = match state.auth.verify(&form.username, &form.password).await {
        Ok(principal) => principal,
        Err(AuthError::InvalidCredentials) => return found(&security.failure_url),
        Err(e) => return Err(e.into()),
    };

    // Redirect first: a failure past this point must not orphan a session.
    let saved = cookie_value(&headers, SAVED_REQUEST_COOKIE);
    let target = saved
        .as_deref()
        .and_then(decode_saved_request)
        .unwrap_or_else(|| security.default_success_url.clone());
    let mut response = found(&target)?;
    if saved.is_some() {
        append_cookie(&mut response, &security.cookies.expire(SAVED_REQUEST_COOKIE, true))?;
    }

    let authorities = principal.authorities();
    let previous = cookie_value(&headers, &security.session_cookie);
    let session_id = state.sessions.establish(principal, previous.as_deref());
    let session_cookie = security
        .cookies
        .set(&security.session_cookie, &session_id, true);
    if let Err(e) = append_cookie(&mut response, &session_cookie) {
        state.sessions.invalidate(Some(session_id.as_str()));
        return Err(e);
    }

    info!(
        "Session {} established for {} with authorities {:?}",
        fingerprint(&session_id),
        form.username,
        authorities
    );
    Ok(response)
}

/// Logout handler - POST /logout
///
/// Idempotent: logging out without a session still redirects to the
/// logout success URL.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<LogoutForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let submitted = form.ok().and_then(|Form(f)| f.csrf);
    csrf::verify(&state, &headers, submitted.as_deref())?;
    let security = &state.security;

    let session_id = cookie_value(&headers, &security.session_cookie);
    if state.sessions.invalidate(session_id.as_deref()) {
        info!(
            "Session {} invalidated",
            session_id.as_deref().map(fingerprint).unwrap_or_default()
        );
    } else if session_id.is_some() {
        debug!("Logout presented an unknown or already invalidated session");
    }

    let mut response = found(&security.logout_success_url)?;
    append_cookie(
        &mut response,
        &security.cookies.expire(&security.session_cookie, true),
    )?;
    Ok(response)
}
