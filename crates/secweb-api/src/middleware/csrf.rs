//! CSRF checks for state-changing form posts

use axum::http::HeaderMap;

use secweb_shared::constants::CSRF_COOKIE;

use crate::error::ApiError;
use crate::response::cookie_value;
use crate::state::AppState;

/// Token to embed in a rendered form, plus the `Set-Cookie` value when the
/// client does not hold a valid token yet.
#[derive(Debug, Default)]
pub struct FormToken {
    pub token: Option<String>,
    pub set_cookie: Option<String>,
}

pub fn form_token(state: &AppState, headers: &HeaderMap) -> FormToken {
    let Some(tokens) = &state.csrf else {
        return FormToken::default();
    };

    if let Some(existing) = cookie_value(headers, CSRF_COOKIE) {
        if tokens.is_valid(&existing) {
            return FormToken {
                token: Some(existing),
                set_cookie: None,
            };
        }
    }

    let token = tokens.issue();
    // Readable by page scripts so they can echo it in a header or field.
    let set_cookie = state.security.cookies.set(CSRF_COOKIE, &token, false);
    FormToken {
        token: Some(token),
        set_cookie: Some(set_cookie),
    }
}

/// Passes when protection is disabled or both token copies match.
pub fn verify(state: &AppState, headers: &HeaderMap, submitted: Option<&str>) -> Result<(), ApiError> {
    let Some(tokens) = &state.csrf else {
        return Ok(());
    };
    let cookie = cookie_value(headers, CSRF_COOKIE);
    tokens
        .verify(cookie.as_deref(), submitted)
        .map_err(|e| ApiError::Forbidden(e.to_string()))
}
