//! Public and protected page handlers

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::error::ApiError;
use crate::extractors::Authenticated;
use crate::middleware::csrf::form_token;
use crate::response::append_cookie;
use crate::state::AppState;

/// GET / and GET /home
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.pages.home()?))
}

/// GET /hello
pub async fn hello(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let csrf = form_token(&state, &headers);
    let body = state.pages.hello(
        &principal.username,
        &state.security.logout_path,
        csrf.token.as_deref(),
    )?;

    let mut response = Html(body).into_response();
    if let Some(cookie) = csrf.set_cookie {
        append_cookie(&mut response, &cookie)?;
    }
    Ok(response)
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
