// ============================================================================
// Secweb API - Access Guard
// File: crates/secweb-api/src/middleware/access_guard.rs
// ============================================================================
//! Runs before every handler. Public requests pass straight through.
//! Protected requests need a live session; the resolved [`Principal`] is
//! attached to the request extensions for handlers. Anything else is
//! redirected to the login page.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use secweb_core::{AuthError, Principal, RequestClass};
use secweb_security::cookie::encode_saved_request;
use secweb_shared::constants::SAVED_REQUEST_COOKIE;
use secweb_shared::utils::fingerprint;

use crate::error::ApiError;
use crate::response::{append_cookie, cookie_value, found};
use crate::state::AppState;

pub async fn access_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.routes.classify(request.uri().path()) == RequestClass::Public {
        return Ok(next.run(request).await);
    }

    let session_id = cookie_value(request.headers(), &state.security.session_cookie);
    match state.sessions.resolve(session_id.as_deref()) {
        Ok(principal) => {
            request.extensions_mut().insert::<Principal>(principal);
            Ok(next.run(request).await)
        }
        Err(reason) => {
            debug!(
                "Unauthenticated {} {} ({}), redirecting to login",
                request.method(),
                request.uri().path(),
                reason
            );
            redirect_to_login(&state, &request, session_id.as_deref(), &reason)
        }
    }
}

fn redirect_to_login(
    state: &AppState,
    request: &Request,
    stale_session: Option<&str>,
    reason: &AuthError,
) -> Result<Response, ApiError> {
    let security = &state.security;
    let mut response = found(&security.login_path)?;

    // Only safe requests can be replayed after login.
    if request.method() == Method::GET {
        let target = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let saved = security
            .cookies
            .set(SAVED_REQUEST_COOKIE, &encode_saved_request(target), true);
        append_cookie(&mut response, &saved)?;
    }

    if let Some(stale) = stale_session {
        debug!("Clearing stale session {} ({})", fingerprint(stale), reason);
        let expired = security.cookies.expire(&security.session_cookie, true);
        append_cookie(&mut response, &expired)?;
    }

    Ok(response)
}
