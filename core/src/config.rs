//! Credentials and environment-driven configuration.

use std::fmt;

use base64::prelude::*;

use crate::error::{ApiError, Result};

/// Default Imagga API origin. Endpoint paths are appended to it.
pub const DEFAULT_BASE_URL: &str = "http://api.imagga.com/v1/";

pub const ENV_API_KEY: &str = "IMAGGA_API_KEY";
pub const ENV_API_SECRET: &str = "IMAGGA_API_SECRET";
pub const ENV_API_URL: &str = "IMAGGA_API_URL";

/// API key and secret sent with every request as HTTP basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Value of the `authorization` header: `Basic base64(key:secret)`.
    pub fn authorization(&self) -> String {
        let pair = format!("{}:{}", self.api_key, self.api_secret);
        format!("Basic {}", BASE64_STANDARD.encode(pair))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Settings read from `IMAGGA_API_KEY`, `IMAGGA_API_SECRET` and the optional
/// `IMAGGA_API_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub credentials: Credentials,
    pub base_url: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::validation(format!("{name} is not set")))
        };
        let credentials = Credentials::new(required(ENV_API_KEY)?, required(ENV_API_SECRET)?);
        let base_url = lookup(ENV_API_URL).filter(|value| !value.is_empty());
        Ok(Self {
            credentials,
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn authorization_is_basic_key_colon_secret() {
        let credentials = Credentials::new("K", "S");
        // base64("K:S")
        assert_eq!(credentials.authorization(), "Basic SzpT");
    }

    #[test]
    fn debug_output_hides_secret() {
        let credentials = Credentials::new("acc_123", "hunter2");
        let printed = format!("{credentials:?}");
        assert!(printed.contains("acc_123"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn env_config_reads_credentials_and_optional_url() {
        let config = EnvConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "key"),
            (ENV_API_SECRET, "secret"),
            (ENV_API_URL, "http://localhost:3000/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.credentials, Credentials::new("key", "secret"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000/v1/"));

        let config =
            EnvConfig::from_lookup(lookup(&[(ENV_API_KEY, "key"), (ENV_API_SECRET, "secret")]))
                .unwrap();
        assert!(config.base_url.is_none());
    }

    #[test]
    fn env_config_requires_key_and_secret() {
        let err = EnvConfig::from_lookup(lookup(&[(ENV_API_KEY, "key")])).unwrap_err();
        assert_eq!(err.to_string(), "IMAGGA_API_SECRET is not set");

        let err = EnvConfig::from_lookup(lookup(&[(ENV_API_KEY, ""), (ENV_API_SECRET, "s")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "IMAGGA_API_KEY is not set");
    }
}
