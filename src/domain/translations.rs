//! Translation records and the validation rules applied before they are stored.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{error::DomainError, locale::Locale};

/// One persisted translation string. `(key, locale)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRecord {
    pub id: Uuid,
    pub key: String,
    pub locale: Locale,
    pub value: String,
    pub namespace: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validate and normalise a translation key.
///
/// Keys are trimmed and must be non-empty dot paths without empty segments.
pub fn normalize_key(raw: &str) -> Result<String, DomainError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(DomainError::validation("key is required"));
    }
    if key.split('.').any(|segment| segment.trim().is_empty()) {
        return Err(DomainError::validation(format!(
            "key `{key}` contains an empty segment"
        )));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(format!(
            "key `{key}` must not contain whitespace"
        )));
    }
    Ok(key.to_string())
}

pub fn normalize_value(raw: &str) -> Result<String, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::validation("value is required"));
    }
    Ok(raw.to_string())
}

/// Trim a namespace; blank input means "none supplied".
pub fn normalize_namespace(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// The first segment of a dotted key.
pub fn default_namespace(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_trimmed() {
        assert_eq!(normalize_key("  nav.home ").unwrap(), "nav.home");
    }

    #[test]
    fn key_rejects_empty_and_malformed_paths() {
        for bad in ["", "   ", "nav..home", ".nav", "nav.", "nav. home"] {
            assert!(normalize_key(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn value_must_not_be_empty() {
        assert!(normalize_value("").is_err());
        assert_eq!(normalize_value(" x ").unwrap(), " x ");
    }

    #[test]
    fn namespace_defaults_to_first_segment() {
        assert_eq!(default_namespace("nav.aboutUs"), "nav");
        assert_eq!(default_namespace("title"), "title");
    }

    #[test]
    fn blank_namespace_counts_as_absent() {
        assert_eq!(normalize_namespace(Some("  ")), None);
        assert_eq!(normalize_namespace(Some(" nav ")), Some("nav".to_string()));
        assert_eq!(normalize_namespace(None), None);
    }
}
