//! Client configuration

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://agents.karmapay.xyz";

/// Environment variable overriding the API endpoint
pub const BASE_URL_ENV: &str = "KARMA_API_URL";

/// SDK configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API endpoint, without a trailing slash
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl Config {
    /// Point at a specific endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Production endpoint unless `KARMA_API_URL` is set and non-empty
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(url.trim()),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        assert_eq!(Config::default().base_url, "https://agents.karmapay.xyz");
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = Config::with_base_url("http://127.0.0.1:9000//");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
    }
}
