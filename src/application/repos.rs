//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    locale::Locale, message_tree::MessageTree, translations::TranslationRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranslationQueryFilter {
    pub locale: Option<Locale>,
    pub namespace: Option<String>,
    /// Case-insensitive substring matched against key and value.
    pub search: Option<String>,
}

impl TranslationQueryFilter {
    pub fn for_locale(locale: Locale) -> Self {
        Self {
            locale: Some(locale),
            ..Self::default()
        }
    }

    /// In-memory equivalent of the SQL predicate, used by fakes and tooling.
    pub fn matches(&self, record: &TranslationRecord) -> bool {
        if self.locale.is_some_and(|locale| locale != record.locale) {
            return false;
        }
        if self
            .namespace
            .as_deref()
            .is_some_and(|namespace| record.namespace.as_deref() != Some(namespace))
        {
            return false;
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            return record.key.to_lowercase().contains(&needle)
                || record.value.to_lowercase().contains(&needle);
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct UpsertTranslationParams {
    pub key: String,
    pub locale: Locale,
    pub value: String,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateTranslationParams {
    pub id: Uuid,
    pub key: String,
    pub locale: Locale,
    pub value: String,
    pub namespace: Option<String>,
}

#[async_trait]
pub trait TranslationsRepo: Send + Sync {
    /// All records stored for one locale, in no particular order.
    async fn list_by_locale(&self, locale: Locale) -> Result<Vec<TranslationRecord>, RepoError>;

    /// Records matching `filter`, sorted by `(locale, key)`.
    async fn list_translations(
        &self,
        filter: &TranslationQueryFilter,
    ) -> Result<Vec<TranslationRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TranslationRecord>, RepoError>;

    async fn ping(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait TranslationsWriteRepo: Send + Sync {
    /// Insert or replace the record identified by `(key, locale)`.
    async fn upsert_translation(
        &self,
        params: UpsertTranslationParams,
    ) -> Result<TranslationRecord, RepoError>;

    async fn update_translation(
        &self,
        params: UpdateTranslationParams,
    ) -> Result<TranslationRecord, RepoError>;

    async fn delete_translation(&self, id: Uuid) -> Result<TranslationRecord, RepoError>;
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read bundle `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bundle `{path}` is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bundle `{path}` must contain a JSON object")]
    NotAnObject { path: String },
}

/// Static per-locale message documents shipped with the application.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// `Ok(None)` when no bundle exists for `locale`.
    async fn load(&self, locale: Locale) -> Result<Option<MessageTree>, BundleError>;
}
