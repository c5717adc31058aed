//! Router assembly

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::handlers::{auth, health, pages};
use crate::middleware::access_guard;
use crate::state::AppState;

/// Every request, including the fallback, passes through the access guard.
pub fn build_router(state: AppState) -> Router {
    let security = state.security.clone();

    Router::new()
        .route("/", get(pages::home))
        .route("/home", get(pages::home))
        .route("/hello", get(pages::hello))
        .route("/health", get(health::health_check))
        .route(&security.login_path, get(auth::login_page).post(auth::login))
        .route(&security.logout_path, post(auth::logout))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    security.request_timeout,
                )),
        )
}
