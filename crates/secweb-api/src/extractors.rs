//! Request extractors

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tracing::warn;

use secweb_core::Principal;

use crate::response::found;
use crate::state::AppState;

/// The principal the access guard attached to this request.
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Authenticated(principal.clone()));
        }
        warn!(
            "No principal on {}; route is not covered by an authenticated rule",
            parts.uri.path()
        );
        Err(match found(&state.security.login_path) {
            Ok(redirect) => redirect,
            Err(e) => e.into_response(),
        })
    }
}
