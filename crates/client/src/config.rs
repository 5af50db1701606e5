use std::fmt;

use crate::error::{ClientError, ClientResult};

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_url: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Bearer token for an already authenticated user, if any.
    pub token: Option<String>,
    /// Login email used to obtain a token when none is configured.
    pub email: Option<String>,
    /// Password for `email`.
    pub password: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                          |
    /// |---------------------------------|----------------------------------|
    /// | `EDULEARN_API_URL`              | `http://localhost:8000/api/v1`   |
    /// | `EDULEARN_REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `EDULEARN_TOKEN`                | unset (anonymous)                |
    /// | `EDULEARN_EMAIL`                | unset                            |
    /// | `EDULEARN_PASSWORD`             | unset                            |
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("EDULEARN_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "EDULEARN_API_URL must be an http(s) URL, got '{api_url}'"
            )));
        }

        let request_timeout_secs = match lookup("EDULEARN_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!(
                    "EDULEARN_REQUEST_TIMEOUT_SECS must be a valid u64, got '{raw}'"
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let token = lookup("EDULEARN_TOKEN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let email = lookup("EDULEARN_EMAIL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let password = lookup("EDULEARN_PASSWORD").filter(|v| !v.is_empty());
        if email.is_some() != password.is_some() {
            return Err(ClientError::Config(
                "EDULEARN_EMAIL and EDULEARN_PASSWORD must be set together".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            request_timeout_secs,
            token,
            email,
            password,
        })
    }

    /// Email and password, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
