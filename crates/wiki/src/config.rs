//! Client configuration: where the wiki's API lives.

use crate::errors::ConfigError;

/// Path of the API script below the wiki's base address.
pub const DEFAULT_API_PATH: &str = "/api.php";

/// Environment variable holding the wiki base address.
pub const ENV_BASE_URL: &str = "WIKI_BASE_URL";

/// Environment variable overriding [`DEFAULT_API_PATH`].
pub const ENV_API_PATH: &str = "WIKI_API_PATH";

/// Location of the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiConfig {
    base_url: String,
    api_path: String,
}

impl WikiConfig {
    /// Creates a configuration for the wiki at `base_url`
    /// (e.g. `"http://192.168.56.101"`), using [`DEFAULT_API_PATH`].
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim_end_matches('/');
        let has_host = ["http://", "https://"]
            .iter()
            .any(|scheme| trimmed.len() > scheme.len() && trimmed.starts_with(scheme));
        if !has_host {
            return Err(ConfigError::InvalidBaseUrl { url: base_url });
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
        })
    }

    /// Reads [`ENV_BASE_URL`] (required) and [`ENV_API_PATH`] (optional).
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(ENV_BASE_URL).map_err(|_| ConfigError::Missing {
            key: ENV_BASE_URL,
        })?;
        let config = Self::new(base_url)?;
        match std::env::var(ENV_API_PATH) {
            Ok(path) if !path.is_empty() => Ok(config.with_api_path(path)),
            _ => Ok(config),
        }
    }

    /// Overrides the API script path. A missing leading `/` is added.
    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        let path = api_path.into();
        self.api_path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    /// Full URL every request is sent to.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.api_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_the_api_path() {
        let config = WikiConfig::new("http://192.168.56.101/").unwrap();
        assert_eq!(config.endpoint(), "http://192.168.56.101/api.php");

        let config = WikiConfig::new("https://wiki.example.org")
            .unwrap()
            .with_api_path("w/api.php");
        assert_eq!(config.endpoint(), "https://wiki.example.org/w/api.php");
    }

    #[test]
    fn base_url_must_be_http() {
        assert_eq!(
            WikiConfig::new("ftp://wiki"),
            Err(ConfigError::InvalidBaseUrl {
                url: "ftp://wiki".into()
            })
        );
        assert!(WikiConfig::new("http://").is_err());
        assert!(WikiConfig::new("").is_err());
    }

    #[test]
    fn from_env_reads_base_url_and_api_path() {
        std::env::remove_var(ENV_BASE_URL);
        std::env::remove_var(ENV_API_PATH);
        assert_eq!(
            WikiConfig::from_env(),
            Err(ConfigError::Missing { key: ENV_BASE_URL })
        );

        std::env::set_var(ENV_BASE_URL, "http://wiki.local");
        assert_eq!(
            WikiConfig::from_env().unwrap().endpoint(),
            "http://wiki.local/api.php"
        );

        std::env::set_var(ENV_API_PATH, "/w/api.php");
        assert_eq!(
            WikiConfig::from_env().unwrap().endpoint(),
            "http://wiki.local/w/api.php"
        );

        std::env::remove_var(ENV_BASE_URL);
        std::env::remove_var(ENV_API_PATH);
    }
}
