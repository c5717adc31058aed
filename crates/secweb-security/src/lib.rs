//! # Secweb Security
//!
//! Security primitives: password encoding, session storage, CSRF tokens,
//! and cookie formatting.

pub mod password;
pub mod session;
pub mod csrf;
pub mod cookie;

pub use csrf::CsrfTokens;
pub use password::PasswordService;
pub use session::SessionStore;
