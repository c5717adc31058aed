//! Request middleware

pub mod access_guard;
pub mod csrf;

pub use access_guard::access_guard;
