//! Configuration management
//!
//! Settings are layered: built-in defaults, `config/default.toml`,
//! `config/{APP_ENV}.toml`, then `SECWEB_`-prefixed environment variables
//! using `__` as the nesting separator (`SECWEB_SECURITY__COOKIE__SECURE=false`).

use std::fmt;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use validator::Validate;

use crate::constants::*;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub log: LogSettings,
    pub security: SecuritySettings,
    pub session: SessionSettings,
    pub users: Vec<UserSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings::default(),
            log: LogSettings::default(),
            security: SecuritySettings::default(),
            session: SessionSettings::default(),
            users: default_users(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub request_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            env: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            name: "secweb-server".to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
    /// Daily-rolling file output when set, stdout otherwise.
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
            directory: None,
            file_prefix: "secweb.log".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SecuritySettings {
    pub login_path: String,
    pub logout_path: String,
    pub default_success_url: String,
    pub failure_url: String,
    pub logout_success_url: String,
    /// Ordered, first match wins.
    pub routes: Vec<RouteSettings>,
    pub cookie: CookieSettings,
    pub csrf: CsrfSettings,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            default_success_url: DEFAULT_SUCCESS_URL.to_string(),
            failure_url: DEFAULT_FAILURE_URL.to_string(),
            logout_success_url: DEFAULT_LOGOUT_SUCCESS_URL.to_string(),
            routes: default_routes(),
            cookie: CookieSettings::default(),
            csrf: CsrfSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RouteSettings {
    pub pattern: String,
    /// `permit_all` or `authenticated`
    pub access: String,
}

impl RouteSettings {
    pub fn new(pattern: &str, access: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            access: access.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    /// `strict`, `lax` or `none`
    pub same_site: String,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            secure: true,
            same_site: "lax".to_string(),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct CsrfSettings {
    pub enabled: bool,
    /// Signing key; a random per-process key is used when empty.
    pub secret: String,
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: String::new(),
        }
    }
}

impl fmt::Debug for CsrfSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfSettings")
            .field("enabled", &self.enabled)
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionSettings {
    pub idle_timeout_secs: u64,
    pub reap_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            reap_interval_secs: DEFAULT_REAP_INTERVAL_SECS,
        }
    }
}

/// Seeded account. Exactly one of `password` / `password_hash` must be set.
#[derive(Deserialize, Clone, Validate)]
pub struct UserSeed {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default = "default_roles")]
    #[validate(length(min = 1))]
    pub roles: Vec<String>,
}

impl UserSeed {
    pub fn with_password(username: &str, password: &str, roles: &[&str]) -> Self {
        Self {
            username: username.to_string(),
            password: Some(password.to_string()),
            password_hash: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn with_hash(username: &str, password_hash: &str, roles: &[&str]) -> Self {
        Self {
            username: username.to_string(),
            password: None,
            password_hash: Some(password_hash.to_string()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl fmt::Debug for UserSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSeed")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("password_hash", &self.password_hash.as_ref().map(|_| "[redacted]"))
            .field("roles", &self.roles)
            .finish()
    }
}

fn default_routes() -> Vec<RouteSettings> {
    vec![
        RouteSettings::new("/", "permit_all"),
        RouteSettings::new("/home", "permit_all"),
        RouteSettings::new("/health", "permit_all"),
        RouteSettings::new("/**", "authenticated"),
    ]
}

fn default_roles() -> Vec<String> {
    vec![DEFAULT_ROLE.to_string()]
}

fn default_users() -> Vec<UserSeed> {
    vec![UserSeed::with_password("user", "user", &[DEFAULT_ROLE])]
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", env.as_str())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("SECWEB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Builds settings from an inline TOML document on top of the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Shape checks that do not need domain knowledge.
    pub fn validate(&self) -> Result<(), AppError> {
        for seed in &self.users {
            seed.validate().map_err(|e| AppError::InvalidSetting {
                key: format!("users.{}", seed.username),
                reason: e.to_string(),
            })?;
        }
        if self.session.idle_timeout_secs == 0 {
            return Err(AppError::InvalidSetting {
                key: "session.idle_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.session.reap_interval_secs == 0 {
            return Err(AppError::InvalidSetting {
                key: "session.reap_interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_seed_single_user() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].username, "user");
        assert_eq!(config.users[0].roles, vec!["USER".to_string()]);
        assert_eq!(config.security.login_path, "/login");
        assert_eq!(config.security.routes.last().unwrap().pattern, "/**");
        assert!(config.security.csrf.enabled);
        assert!(config.security.cookie.secure);
    }

    #[test]
    fn test_overrides_from_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [app]
            port = 9090

            [security]
            login_path = "/signin"

            [[security.routes]]
            pattern = "/public/**"
            access = "permit_all"

            [[security.routes]]
            pattern = "/**"
            access = "authenticated"

            [[users]]
            username = "admin"
            password = "secret"
            roles = ["ADMIN", "USER"]
            "#,
        )
        .unwrap();

        assert_eq!(config.app.port, 9090);
        assert_eq!(config.app.host, "127.0.0.1");
        assert_eq!(config.security.login_path, "/signin");
        assert_eq!(config.security.logout_path, "/logout");
        assert_eq!(config.security.routes.len(), 2);
        assert_eq!(config.users[0].username, "admin");
        assert_eq!(config.users[0].roles.len(), 2);
    }

    #[test]
    fn test_empty_username_rejected() {
        let result = AppConfig::from_toml_str(
            r#"
            [[users]]
            username = ""
            password = "x"
            "#,
        );
        assert!(matches!(result, Err(AppError::InvalidSetting { .. })));
    }

    #[test]
    fn test_zero_idle_timeout_rejected() {
        let result = AppConfig::from_toml_str("[session]\nidle_timeout_secs = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_user_seed_debug_redacts_secrets() {
        let seed = UserSeed::with_password("user", "hunter2", &["USER"]);
        let printed = format!("{:?}", seed);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("[redacted]"));
    }
}
