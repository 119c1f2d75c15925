use crate::utils::error::{CmisError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CmisError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CmisError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CmisError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CmisError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CmisError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// `-1` means "server default"; anything else must be a positive page size.
pub fn validate_max_items(field_name: &str, value: i64) -> Result<()> {
    if value == -1 || value > 0 {
        return Ok(());
    }
    Err(CmisError::InvalidConfigValue {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: "Value must be -1 or greater than 0".to_string(),
    })
}

pub fn validate_not_blank(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CmisError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be blank".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("url", "https://cmis.example.com/service").is_ok());
        assert!(validate_url("url", "http://localhost:8080/cmis").is_ok());
        assert!(validate_url("url", "").is_err());
        assert!(validate_url("url", "ftp://example.com").is_err());
        assert!(validate_url("url", "not a url").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("path", "./cache").is_ok());
        assert!(validate_path("path", "").is_err());
        assert!(validate_path("path", "a\0b").is_err());
    }

    #[test]
    fn test_validate_max_items() {
        assert!(validate_max_items("max_items", -1).is_ok());
        assert!(validate_max_items("max_items", 25).is_ok());
        assert!(validate_max_items("max_items", 0).is_err());
        assert!(validate_max_items("max_items", -5).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("search", "contract").is_ok());
        assert!(validate_not_blank("search", "   ").is_err());
    }
}
