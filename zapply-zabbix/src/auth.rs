//! Credential settings and the advisory warning type.

use std::fmt;

use tracing::warn;

use crate::error::{Error, Result};

/// Advisory notice produced while assembling configuration. A warning
/// never aborts the operation that produced it; the caller decides how to
/// present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub title: String,
    pub detail: String,
}

/// Authentication strategy, fixed for the lifetime of a client.
#[derive(Clone)]
pub enum Credential {
    /// Pre-issued API token, attached to every authenticated call as-is.
    Token(String),
    /// Username and password, exchanged for a session token on first use.
    Password { username: String, password: String },
}

// Secrets stay out of debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(_) => f.write_str("Token(***)"),
            Credential::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

impl Credential {
    /// Assembles a credential from the optional settings a caller
    /// supplies. A non-empty token always wins; if a username or password
    /// was supplied alongside it, the returned warning says so. Without a
    /// token, both username and password are required.
    pub fn from_settings(
        token: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(Self, Option<Warning>)> {
        let token = token.unwrap_or_default();
        let username = username.unwrap_or_default();
        let password = password.unwrap_or_default();

        if !token.is_empty() {
            let warning = if !username.is_empty() || !password.is_empty() {
                warn!("both an api token and username/password were supplied; using the token");
                Some(Warning {
                    title: "mixed authentication settings".to_string(),
                    detail: "both an api token and username/password were supplied; \
                             the token takes precedence"
                        .to_string(),
                })
            } else {
                None
            };
            return Ok((Credential::Token(token.to_string()), warning));
        }

        if username.is_empty() || password.is_empty() {
            return Err(Error::Config(
                "either an api token or both username and password must be set".to_string(),
            ));
        }

        Ok((
            Credential::Password {
                username: username.to_string(),
                password: password.to_string(),
            },
            None,
        ))
    }
}
