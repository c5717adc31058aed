#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request, Response, StatusCode,
    },
    Router,
};
use tower::ServiceExt;

use secweb_api::{build_router, AppState};
use secweb_infrastructure::memory::InMemoryCredentialRepository;
use secweb_shared::config::AppConfig;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let repo = InMemoryCredentialRepository::from_seeds(&config.users).unwrap();
        let state = AppState::build(&config, Arc::new(repo)).unwrap();
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookies: &[(&str, &str)]) -> Response<Body> {
        self.send(request(Method::GET, uri, cookies, None)).await
    }

    pub async fn post_form(&self, uri: &str, cookies: &[(&str, &str)], body: &str) -> Response<Body> {
        self.send(request(Method::POST, uri, cookies, Some(body))).await
    }

    /// Fetches the login page and returns the CSRF token it issued.
    pub async fn csrf_token(&self) -> String {
        let response = self.get("/login", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        set_cookie(&response, "XSRF-TOKEN").expect("login page issues a CSRF cookie")
    }

    /// Submits the login form with a valid CSRF token.
    pub async fn login(&self, username: &str, password: &str, extra: &[(&str, &str)]) -> Response<Body> {
        let token = self.csrf_token().await;
        let mut cookies = vec![("XSRF-TOKEN", token.as_str())];
        cookies.extend_from_slice(extra);
        let body = format!("username={}&password={}&_csrf={}", username, password, token);
        self.post_form("/login", &cookies, &body).await
    }

    /// Logs in as `user`/`user` and returns the session id.
    pub async fn session(&self) -> String {
        let response = self.login("user", "user", &[]).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        set_cookie(&response, "SESSION").expect("login sets a session cookie")
    }

    pub async fn logout(&self, session: Option<&str>) -> Response<Body> {
        let token = self.csrf_token().await;
        let mut cookies = vec![("XSRF-TOKEN", token.as_str())];
        if let Some(session) = session {
            cookies.push(("SESSION", session));
        }
        self.post_form("/logout", &cookies, &format!("_csrf={}", token)).await
    }
}

pub fn request(method: Method, uri: &str, cookies: &[(&str, &str)], body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if !cookies.is_empty() {
        let header = cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        builder = builder.header(COOKIE, header);
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn location<B>(response: &Response<B>) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

/// Full `Set-Cookie` line for `name`, if any.
pub fn set_cookie_header<B>(response: &Response<B>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_owned)
}

/// Value of cookie `name` from the response, if one was set.
pub fn set_cookie<B>(response: &Response<B>, name: &str) -> Option<String> {
    let header = set_cookie_header(response, name)?;
    let value = header[name.len() + 1..].split(';').next().unwrap_or_default();
    (!value.is_empty()).then(|| value.to_string())
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
