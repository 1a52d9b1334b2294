//! Hosting credentials sourced from the environment

use std::fmt;

use crate::config::CredentialsConfig;

/// Username and secret (app password or token) for the hosting service.
///
/// Values are taken verbatim from the environment. Absent variables yield
/// empty strings; the hosting API is the one to reject them.
#[derive(Clone, Default)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    /// Build credentials from explicit values
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Read the configured environment variables
    pub fn from_env(config: &CredentialsConfig) -> Self {
        Self {
            username: std::env::var(&config.username_env).unwrap_or_default(),
            secret: std::env::var(&config.secret_env).unwrap_or_default(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether both values are present
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
