#[cfg(feature = "cli")]
pub mod args;
pub mod token_store;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_path_prefix, validate_positive_number,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use toml_config::FileConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_FILE: &str = "./.dash-client/storage.json";
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// 命令列可以覆蓋的設定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_prefix: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub token_file: Option<String>,
    pub token_key: Option<String>,
}

/// 合併後的最終設定：預設值 <- 設定檔 <- 命令列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub timeout_seconds: Option<u64>,
    pub token_file: String,
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: String::new(),
            timeout_seconds: None,
            token_file: DEFAULT_TOKEN_FILE.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn layered(file: Option<&FileConfig>, overrides: &ConfigOverrides) -> Self {
        let mut config = Self::default();

        if let Some(file) = file {
            if let Some(api) = &file.api {
                if let Some(base_url) = &api.base_url {
                    config.base_url = base_url.clone();
                }
                if let Some(prefix) = &api.prefix {
                    config.api_prefix = prefix.clone();
                }
                if api.timeout_seconds.is_some() {
                    config.timeout_seconds = api.timeout_seconds;
                }
            }
            if let Some(auth) = &file.auth {
                if let Some(token_file) = &auth.token_file {
                    config.token_file = token_file.clone();
                }
                if let Some(token_key) = &auth.token_key {
                    config.token_key = token_key.clone();
                }
            }
        }

        if let Some(base_url) = &overrides.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(prefix) = &overrides.api_prefix {
            config.api_prefix = prefix.clone();
        }
        if overrides.timeout_seconds.is_some() {
            config.timeout_seconds = overrides.timeout_seconds;
        }
        if let Some(token_file) = &overrides.token_file {
            config.token_file = token_file.clone();
        }
        if let Some(token_key) = &overrides.token_key {
            config.token_key = token_key.clone();
        }

        config
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    fn token_file(&self) -> &str {
        &self.token_file
    }

    fn token_key(&self) -> &str {
        &self.token_key
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.base_url)?;
        validate_path_prefix("api.prefix", &self.api_prefix)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }
        validate_path("auth.token_file", &self.token_file)?;
        validate_non_empty_string("auth.token_key", &self.token_key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.api_prefix(), "");
        assert_eq!(config.token_key(), "token");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_win_over_file() {
        let file = FileConfig::from_toml_str(
            r#"
[api]
base_url = "http://file-host:8000"
prefix = "/api"
timeout_seconds = 10
"#,
        )
        .unwrap();
        let overrides = ConfigOverrides {
            base_url: Some("http://cli-host:9000".to_string()),
            ..Default::default()
        };

        let config = ClientConfig::layered(Some(&file), &overrides);
        assert_eq!(config.base_url, "http://cli-host:9000");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.timeout_seconds, Some(10));
        assert_eq!(config.token_file, DEFAULT_TOKEN_FILE);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = ClientConfig {
            timeout_seconds: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            base_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            token_key: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
