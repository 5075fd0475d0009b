//! Client configuration loaded from environment variables.

use friendtracker_shared::constants::DEFAULT_HTTP_PORT;

#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the contact service.
    /// Env: `FRIENDTRACKER_SERVER_URL`
    /// Default: `http://127.0.0.1:8080`
    pub server_url: String,

    /// Bearer token sent with every contact request.
    /// Env: `FRIENDTRACKER_ACCESS_TOKEN`
    pub access_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: format!("http://127.0.0.1:{DEFAULT_HTTP_PORT}"),
            access_token: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("FRIENDTRACKER_SERVER_URL") {
            if !url.trim().is_empty() {
                config.server_url = url.trim().to_string();
            }
        }

        if let Some(token) = lookup("FRIENDTRACKER_ACCESS_TOKEN") {
            if !token.is_empty() {
                config.access_token = Some(token);
            }
        }

        config
    }

    /// Command-line values take precedence over the environment.
    pub fn with_overrides(mut self, server_url: Option<String>, access_token: Option<String>) -> Self {
        if let Some(url) = server_url {
            self.server_url = url;
        }
        if let Some(token) = access_token {
            self.access_token = Some(token);
        }
        self
    }
}
