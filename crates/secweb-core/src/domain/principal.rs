//! Authenticated identity

use std::collections::BTreeSet;

use secweb_shared::constants::ROLE_PREFIX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Roles in `ROLE_<NAME>` authority form.
    pub fn authorities(&self) -> Vec<String> {
        self.roles
            .iter()
            .map(|r| format!("{}{}", ROLE_PREFIX, r))
            .collect()
    }
}
