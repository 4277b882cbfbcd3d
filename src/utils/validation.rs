use crate::utils::error::{DashError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DashError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DashError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DashError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 路徑前綴只能是空字串或像 `/api` 這樣的片段
pub fn validate_path_prefix(field_name: &str, prefix: &str) -> Result<()> {
    if prefix.contains('?') || prefix.contains('#') || prefix.contains("://") {
        return Err(DashError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: prefix.to_string(),
            reason: "Prefix must be a plain path segment such as /api".to_string(),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DashError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DashError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(DashError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DashError::ValidationError {
            message: format!("'{}' cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

pub fn validate_strictly_positive(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DashError::ValidationError {
            message: format!("'{}' must be greater than 0 (got {})", field_name, value),
        });
    }
    Ok(())
}

pub fn validate_record_id(field_name: &str, id: i64) -> Result<()> {
    if id <= 0 {
        return Err(DashError::ValidationError {
            message: format!("'{}' must be a positive id (got {})", field_name, id),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:8000").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_path_prefix() {
        assert!(validate_path_prefix("api.prefix", "").is_ok());
        assert!(validate_path_prefix("api.prefix", "/api").is_ok());
        assert!(validate_path_prefix("api.prefix", "api/v1").is_ok());
        assert!(validate_path_prefix("api.prefix", "http://x/api").is_err());
        assert!(validate_path_prefix("api.prefix", "/api?x=1").is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_positive_number("api.timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("api.timeout_seconds", 0, 1).is_err());
        assert!(validate_strictly_positive("budget", 0.5).is_ok());
        assert!(validate_strictly_positive("budget", 0.0).is_err());
        assert!(validate_strictly_positive("budget", f64::NAN).is_err());
        assert!(validate_record_id("runner_id", 1).is_ok());
        assert!(validate_record_id("runner_id", 0).is_err());
    }

    #[test]
    fn test_validate_strings() {
        assert!(validate_non_empty_string("name", "momentum").is_ok());
        assert!(validate_non_empty_string("name", "   ").is_err());
        assert!(validate_path("auth.token_file", "").is_err());
    }
}
