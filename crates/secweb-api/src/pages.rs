//! Server-rendered pages

use handlebars::{Handlebars, TemplateError};
use serde::Serialize;

use secweb_shared::constants::CSRF_FIELD;

use crate::error::ApiError;

const HOME: &str = "home";
const HELLO: &str = "hello";
const LOGIN: &str = "login";

#[derive(Serialize)]
struct HomeView<'a> {
    hello_path: &'a str,
}

#[derive(Serialize)]
struct HelloView<'a> {
    username: &'a str,
    logout_action: &'a str,
    csrf_field: &'a str,
    csrf_token: Option<&'a str>,
}

#[derive(Serialize)]
struct LoginView<'a> {
    error: bool,
    logged_out: bool,
    login_action: &'a str,
    csrf_field: &'a str,
    csrf_token: Option<&'a str>,
}

/// Compiled templates, built once at startup.
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(HOME, include_str!("../templates/home.hbs"))?;
        registry.register_template_string(HELLO, include_str!("../templates/hello.hbs"))?;
        registry.register_template_string(LOGIN, include_str!("../templates/login.hbs"))?;
        Ok(Self { registry })
    }

    pub fn home(&self) -> Result<String, ApiError> {
        self.render(HOME, &HomeView { hello_path: "/hello" })
    }

    pub fn hello(
        &self,
        username: &str,
        logout_action: &str,
        csrf_token: Option<&str>,
    ) -> Result<String, ApiError> {
        self.render(
            HELLO,
            &HelloView {
                username,
                logout_action,
                csrf_field: CSRF_FIELD,
                csrf_token,
            },
        )
    }

    pub fn login(
        &self,
        login_action: &str,
        error: bool,
        logged_out: bool,
        csrf_token: Option<&str>,
    ) -> Result<String, ApiError> {
        self.render(
            LOGIN,
            &LoginView {
                error,
                logged_out,
                login_action,
                csrf_field: CSRF_FIELD,
                csrf_token,
            },
        )
    }

    fn render<T: Serialize>(&self, name: &str, view: &T) -> Result<String, ApiError> {
        self.registry
            .render(name, view)
            .map_err(|e| ApiError::RenderError(e.to_string()))
    }
}
