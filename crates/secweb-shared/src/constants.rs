//! Application-wide constants

pub const SESSION_COOKIE: &str = "SESSION";
pub const CSRF_COOKIE: &str = "XSRF-TOKEN";
pub const CSRF_FIELD: &str = "_csrf";
pub const SAVED_REQUEST_COOKIE: &str = "SAVED_REQUEST";

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/logout";
pub const DEFAULT_SUCCESS_URL: &str = "/";
pub const DEFAULT_FAILURE_URL: &str = "/login?error";
pub const DEFAULT_LOGOUT_SUCCESS_URL: &str = "/login?logout";

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_REAP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ROLE_PREFIX: &str = "ROLE_";
pub const DEFAULT_ROLE: &str = "USER";
