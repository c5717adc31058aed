//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use secweb_core::error::ConfigurationError;
use secweb_core::repositories::CredentialRepository;
use secweb_core::services::{AuthService, SessionService};
use secweb_core::RouteTable;
use secweb_security::cookie::CookieOptions;
use secweb_security::{CsrfTokens, SessionStore};
use secweb_shared::config::AppConfig;
use secweb_shared::utils::is_local_path;

use crate::pages::Pages;

/// Paths served by fixed routes; the login and logout endpoints may not
/// shadow them.
const RESERVED_PATHS: [&str; 4] = ["/", "/home", "/hello", "/health"];

/// Resolved security settings.
#[derive(Debug, Clone)]
pub struct SecurityOptions {
    pub login_path: String,
    pub logout_path: String,
    pub default_success_url: String,
    pub failure_url: String,
    pub logout_success_url: String,
    pub session_cookie: String,
    pub cookies: CookieOptions,
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub sessions: Arc<SessionService>,
    pub routes: Arc<RouteTable>,
    /// `None` when CSRF protection is disabled.
    pub csrf: Option<Arc<CsrfTokens>>,
    pub pages: Arc<Pages>,
    pub security: Arc<SecurityOptions>,
}

impl AppState {
    /// Validates the security configuration and wires the services.
    pub fn build(
        config: &AppConfig,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Result<Self, ConfigurationError> {
        let security = &config.security;

        for (key, path) in [
            ("security.login_path", &security.login_path),
            ("security.logout_path", &security.logout_path),
        ] {
            if !is_local_path(path) || path.contains('?') {
                return Err(invalid(key, "must be an absolute path without a query"));
            }
            if RESERVED_PATHS.contains(&path.as_str()) {
                return Err(invalid(key, "collides with an application route"));
            }
        }
        if security.login_path == security.logout_path {
            return Err(invalid(
                "security.logout_path",
                "must differ from security.login_path",
            ));
        }
        for (key, url) in [
            ("security.default_success_url", &security.default_success_url),
            ("security.failure_url", &security.failure_url),
            ("security.logout_success_url", &security.logout_success_url),
        ] {
            if !is_local_path(url) {
                return Err(invalid(key, "must be a same-origin path"));
            }
        }
        if !is_cookie_name(&security.cookie.name) {
            return Err(invalid("security.cookie.name", "not a valid cookie name"));
        }

        let cookies = CookieOptions::new(security.cookie.secure, &security.cookie.same_site)
            .map_err(|e| invalid("security.cookie.same_site", &e.to_string()))?;

        let routes = RouteTable::from_settings(
            &security.routes,
            &[security.login_path.as_str(), security.logout_path.as_str()],
        )?;
        for rule in routes.rules() {
            tracing::debug!("Access rule {} -> {:?}", rule.pattern, rule.policy);
        }

        let csrf = if security.csrf.enabled {
            let tokens = CsrfTokens::new(&security.csrf.secret)
                .map_err(|e| invalid("security.csrf.secret", &e.to_string()))?;
            Some(Arc::new(tokens))
        } else {
            tracing::warn!("CSRF protection is disabled");
            None
        };

        let pages = Pages::new().map_err(|e| invalid("templates", &e.to_string()))?;

        let store = Arc::new(SessionStore::new(Duration::from_secs(
            config.session.idle_timeout_secs,
        )));

        Ok(Self {
            auth: Arc::new(AuthService::new(credentials)),
            sessions: Arc::new(SessionService::new(store)),
            routes: Arc::new(routes),
            csrf,
            pages: Arc::new(pages),
            security: Arc::new(SecurityOptions {
                login_path: security.login_path.clone(),
                logout_path: security.logout_path.clone(),
                default_success_url: security.default_success_url.clone(),
                failure_url: security.failure_url.clone(),
                logout_success_url: security.logout_success_url.clone(),
                session_cookie: security.cookie.name.clone(),
                cookies,
                request_timeout: Duration::from_secs(config.app.request_timeout_secs),
            }),
        })
    }
}

fn invalid(key: &str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// RFC 6265 token characters.
fn is_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secweb_infrastructure::memory::InMemoryCredentialRepository;
    use secweb_shared::config::{RouteSettings, UserSeed};

    fn build(config: &AppConfig) -> Result<AppState, ConfigurationError> {
        let repo = InMemoryCredentialRepository::from_seeds(&[UserSeed::with_hash(
            "user",
            "{bcrypt}$2a$10$iJAaEIeg9PGshTJhFAQb5efHOJ3/lhroe/Ndq8DkYhUfcObb19nIO",
            &["USER"],
        )])?;
        AppState::build(config, Arc::new(repo))
    }

    fn setting_key(result: Result<AppState, ConfigurationError>) -> String {
        match result {
            Err(ConfigurationError::InvalidSetting { key, .. }) => key,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("configuration accepted"),
        }
    }

    #[test]
    fn test_default_configuration_builds() {
        let state = build(&AppConfig::default()).unwrap();
        assert!(state.csrf.is_some());
        assert_eq!(state.security.session_cookie, "SESSION");
        assert!(state.security.cookies.secure);
    }

    #[test]
    fn test_login_path_collision_rejected() {
        let mut config = AppConfig::default();
        config.security.login_path = "/hello".to_string();
        assert_eq!(setting_key(build(&config)), "security.login_path");

        let mut config = AppConfig::default();
        config.security.logout_path = "/login".to_string();
        assert_eq!(setting_key(build(&config)), "security.logout_path");
    }

    #[test]
    fn test_external_redirect_target_rejected() {
        let mut config = AppConfig::default();
        config.security.default_success_url = "https://elsewhere.example/".to_string();
        assert_eq!(setting_key(build(&config)), "security.default_success_url");
    }

    #[test]
    fn test_bad_cookie_settings_rejected() {
        let mut config = AppConfig::default();
        config.security.cookie.name = "SES SION".to_string();
        assert_eq!(setting_key(build(&config)), "security.cookie.name");

        let mut config = AppConfig::default();
        config.security.cookie.secure = false;
        config.security.cookie.same_site = "none".to_string();
        assert_eq!(setting_key(build(&config)), "security.cookie.same_site");
    }

    #[test]
    fn test_malformed_route_table_is_fatal() {
        let mut config = AppConfig::default();
        config.security.routes = vec![RouteSettings::new("/", "sometimes")];
        assert!(matches!(
            build(&config),
            Err(ConfigurationError::UnknownAccessPolicy { .. })
        ));
    }

    #[test]
    fn test_csrf_can_be_disabled() {
        let mut config = AppConfig::default();
        config.security.csrf.enabled = false;
        assert!(build(&config).unwrap().csrf.is_none());
    }
}
