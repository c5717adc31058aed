//! # Secweb API
//!
//! HTTP surface: access guard middleware, login/logout handlers, pages,
//! and the router that wires them together.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
