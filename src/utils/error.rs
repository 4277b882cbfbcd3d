use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status} for {path}: {body}")]
    ApiStatusError {
        status: u16,
        path: String,
        body: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Authentication error: {message}")]
    AuthError { message: String },
}

pub type Result<T> = std::result::Result<T, DashError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Storage,
    Data,
    Configuration,
    Input,
    Authentication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::HttpError(_) => ErrorCategory::Network,
            DashError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Authentication
            }
            DashError::ApiStatusError { .. } => ErrorCategory::Backend,
            DashError::IoError(_) => ErrorCategory::Storage,
            DashError::SerializationError(_) => ErrorCategory::Data,
            DashError::TomlError(_)
            | DashError::ConfigError { .. }
            | DashError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DashError::ValidationError { .. } => ErrorCategory::Input,
            DashError::AuthError { .. } => ErrorCategory::Authentication,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路與後端錯誤通常重試即可
            ErrorCategory::Network | ErrorCategory::Backend => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Authentication | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// 用戶友好的錯誤訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            DashError::HttpError(e) if e.is_timeout() => {
                "The backend did not answer in time".to_string()
            }
            DashError::HttpError(e) if e.is_connect() => {
                "Could not connect to the backend".to_string()
            }
            DashError::HttpError(_) => "Request to the backend failed".to_string(),
            DashError::ApiStatusError { status, path, .. } => match status {
                401 | 403 => format!("Not authorized to access {}", path),
                404 => format!("Endpoint {} was not found", path),
                422 => format!("The backend rejected the request to {}", path),
                _ => format!("The backend failed on {} (HTTP {})", path, status),
            },
            DashError::IoError(_) => "Could not read or write local files".to_string(),
            DashError::SerializationError(_) => {
                "The backend response could not be decoded".to_string()
            }
            DashError::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            DashError::ConfigError { message } => format!("Configuration problem: {}", message),
            DashError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            DashError::ValidationError { message } => format!("Invalid input: {}", message),
            DashError::AuthError { message } => format!("Authentication failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend is running and the base URL is correct",
            ErrorCategory::Backend => "Retry later or inspect the backend logs",
            ErrorCategory::Storage => "Check permissions of the token file directory",
            ErrorCategory::Data => "Check that the client and backend versions match",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Input => "Correct the command arguments and try again",
            ErrorCategory::Authentication => "Run `dash-client login` to obtain a fresh token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> DashError {
        DashError::ApiStatusError {
            status: code,
            path: "/orders".to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_unauthorized_status_is_auth_category() {
        assert_eq!(status(401).category(), ErrorCategory::Authentication);
        assert_eq!(status(403).category(), ErrorCategory::Authentication);
        assert_eq!(status(500).category(), ErrorCategory::Backend);
        assert_eq!(status(500).severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = DashError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: String::new(),
            reason: "must not be empty".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("api.base_url"));
    }

    #[test]
    fn test_status_message_mentions_path() {
        assert!(status(404).user_friendly_message().contains("/orders"));
        assert!(status(502).user_friendly_message().contains("502"));
    }
}
