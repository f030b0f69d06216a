use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::{
    repos::{
        RepoError, TranslationQueryFilter, TranslationsRepo, TranslationsWriteRepo,
        UpdateTranslationParams, UpsertTranslationParams,
    },
    translations::TranslationResolver,
};
use crate::domain::{
    error::DomainError,
    locale::Locale,
    message_tree::MessageTree,
    translations::{
        TranslationRecord, default_namespace, normalize_key, normalize_namespace, normalize_value,
    },
};

#[derive(Debug, Error)]
pub enum AdminTranslationError {
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("translation not found")]
    NotFound,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<DomainError> for AdminTranslationError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => Self::NotFound,
            DomainError::Validation { message } => Self::ConstraintViolation(message),
        }
    }
}

impl From<RepoError> for AdminTranslationError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound,
            RepoError::Duplicate { constraint } => Self::ConstraintViolation(format!(
                "a translation with this key and locale already exists ({constraint})"
            )),
            RepoError::InvalidInput { message } => Self::ConstraintViolation(message),
            other => Self::Repo(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertTranslationCommand {
    pub key: String,
    pub locale: String,
    pub value: String,
    pub namespace: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTranslationCommand {
    pub key: Option<String>,
    pub locale: Option<String>,
    pub value: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Clone)]
pub struct AdminTranslationService {
    reader: Arc<dyn TranslationsRepo>,
    writer: Arc<dyn TranslationsWriteRepo>,
    resolver: Option<TranslationResolver>,
}

impl AdminTranslationService {
    pub fn new(reader: Arc<dyn TranslationsRepo>, writer: Arc<dyn TranslationsWriteRepo>) -> Self {
        Self {
            reader,
            writer,
            resolver: None,
        }
    }

    /// Invalidate cached trees through `resolver` after every write.
    pub fn with_resolver(mut self, resolver: TranslationResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub async fn list(
        &self,
        filter: &TranslationQueryFilter,
    ) -> Result<Vec<TranslationRecord>, AdminTranslationError> {
        self.reader
            .list_translations(filter)
            .await
            .map_err(AdminTranslationError::from)
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<TranslationRecord>, AdminTranslationError> {
        self.reader
            .find_by_id(id)
            .await
            .map_err(AdminTranslationError::from)
    }

    pub async fn upsert(
        &self,
        actor: &str,
        command: UpsertTranslationCommand,
    ) -> Result<TranslationRecord, AdminTranslationError> {
        let params = validate_upsert(command)?;
        let record = self.writer.upsert_translation(params).await?;

        info!(
            target = "application::admin::translations::upsert",
            actor,
            key = %record.key,
            locale = %record.locale,
            "Translation saved"
        );
        self.invalidate(Some(record.locale));
        Ok(record)
    }

    /// Validate every item before writing any of them.
    pub async fn bulk_upsert(
        &self,
        actor: &str,
        commands: Vec<UpsertTranslationCommand>,
    ) -> Result<Vec<TranslationRecord>, AdminTranslationError> {
        let params = commands
            .into_iter()
            .enumerate()
            .map(|(index, command)| {
                validate_upsert(command).map_err(|err| match err {
                    AdminTranslationError::ConstraintViolation(message) => {
                        AdminTranslationError::ConstraintViolation(format!(
                            "item {index}: {message}"
                        ))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(params.len());
        let mut touched = BTreeSet::new();
        let mut failure = None;
        for params in params {
            match self.writer.upsert_translation(params).await {
                Ok(record) => {
                    touched.insert(record.locale);
                    records.push(record);
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        // Rows written before a failure are already visible in the store.
        self.invalidate_touched(&touched);

        if let Some(err) = failure {
            warn!(
                target = "application::admin::translations::bulk_upsert",
                actor,
                saved = records.len(),
                error = %err,
                "Bulk upsert stopped after a store error"
            );
            return Err(err.into());
        }

        info!(
            target = "application::admin::translations::bulk_upsert",
            actor,
            count = records.len(),
            locales = touched.len(),
            "Translations saved"
        );
        Ok(records)
    }

    /// Store every leaf of a nested message document under `locale`.
    pub async fn import_document(
        &self,
        actor: &str,
        locale: &str,
        namespace: Option<&str>,
        document: &MessageTree,
    ) -> Result<Vec<TranslationRecord>, AdminTranslationError> {
        let locale = locale.parse::<Locale>()?;
        let namespace = normalize_namespace(namespace);
        if !matches!(document, MessageTree::Map(_)) {
            return Err(AdminTranslationError::ConstraintViolation(
                "document must be a JSON object of messages".to_string(),
            ));
        }

        let commands = document
            .flatten()
            .into_iter()
            .map(|(key, value)| UpsertTranslationCommand {
                key,
                locale: locale.code().to_string(),
                value,
                namespace: namespace.clone(),
            })
            .collect();

        self.bulk_upsert(actor, commands).await
    }

    pub async fn update(
        &self,
        actor: &str,
        id: Uuid,
        command: UpdateTranslationCommand,
    ) -> Result<TranslationRecord, AdminTranslationError> {
        let existing = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(AdminTranslationError::NotFound)?;

        let key = match command.key.as_deref() {
            Some(raw) => normalize_key(raw)?,
            None => existing.key.clone(),
        };
        let locale = match command.locale.as_deref() {
            Some(raw) => raw.parse::<Locale>()?,
            None => existing.locale,
        };
        let value = match command.value.as_deref() {
            Some(raw) => normalize_value(raw)?,
            None => existing.value.clone(),
        };
        let namespace = match command.namespace.as_deref() {
            Some(raw) => Some(
                normalize_namespace(Some(raw))
                    .unwrap_or_else(|| default_namespace(&key).to_string()),
            ),
            None => existing.namespace.clone(),
        };

        let record = self
            .writer
            .update_translation(UpdateTranslationParams {
                id,
                key,
                locale,
                value,
                namespace,
            })
            .await?;

        info!(
            target = "application::admin::translations::update",
            actor,
            id = %record.id,
            key = %record.key,
            locale = %record.locale,
            "Translation updated"
        );
        self.invalidate(Some(existing.locale));
        if existing.locale != record.locale {
            self.invalidate(Some(record.locale));
        }
        Ok(record)
    }

    pub async fn delete(&self, actor: &str, id: Uuid) -> Result<(), AdminTranslationError> {
        let record = self.writer.delete_translation(id).await?;

        info!(
            target = "application::admin::translations::delete",
            actor,
            id = %record.id,
            key = %record.key,
            locale = %record.locale,
            "Translation deleted"
        );
        self.invalidate(Some(record.locale));
        Ok(())
    }

    /// One locale is dropped on its own; several clear the whole cache.
    fn invalidate_touched(&self, touched: &BTreeSet<Locale>) {
        match touched.len() {
            0 => {}
            1 => self.invalidate(touched.first().copied()),
            _ => self.invalidate(None),
        }
    }

    fn invalidate(&self, locale: Option<Locale>) {
        if let Some(resolver) = &self.resolver {
            resolver.invalidate(locale);
        }
    }
}

fn validate_upsert(
    command: UpsertTranslationCommand,
) -> Result<UpsertTranslationParams, AdminTranslationError> {
    let key = normalize_key(&command.key)?;
    let locale = command.locale.parse::<Locale>()?;
    let value = normalize_value(&command.value)?;
    let namespace = normalize_namespace(command.namespace.as_deref())
        .unwrap_or_else(|| default_namespace(&key).to_string());

    Ok(UpsertTranslationParams {
        key,
        locale,
        value,
        namespace: Some(namespace),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::application::repos::{BundleError, BundleSource};
    use crate::cache::{CacheConfig, MessageCache};

    #[derive(Default)]
    struct MemoryRepo {
        records: Mutex<Vec<TranslationRecord>>,
    }

    #[async_trait]
    impl TranslationsRepo for MemoryRepo {
        async fn list_by_locale(
            &self,
            locale: Locale,
        ) -> Result<Vec<TranslationRecord>, RepoError> {
            self.list_translations(&TranslationQueryFilter::for_locale(locale))
                .await
        }

        async fn list_translations(
            &self,
            filter: &TranslationQueryFilter,
        ) -> Result<Vec<TranslationRecord>, RepoError> {
            let mut found: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect();
            found.sort_by(|a, b| (a.locale, &a.key).cmp(&(b.locale, &b.key)));
            Ok(found)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<TranslationRecord>, RepoError> {
            let records = self.records.lock().unwrap();
            Ok(records.iter().find(|record| record.id == id).cloned())
        }

        async fn ping(&self) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl TranslationsWriteRepo for MemoryRepo {
        async fn upsert_translation(
            &self,
            params: UpsertTranslationParams,
        ) -> Result<TranslationRecord, RepoError> {
            let mut records = self.records.lock().unwrap();
            let now = OffsetDateTime::now_utc();
            if let Some(existing) = records
                .iter_mut()
                .find(|record| record.key == params.key && record.locale == params.locale)
            {
                existing.value = params.value;
                existing.namespace = params.namespace;
                existing.updated_at = now;
                return Ok(existing.clone());
            }
            let record = TranslationRecord {
                id: Uuid::new_v4(),
                key: params.key,
                locale: params.locale,
                value: params.value,
                namespace: params.namespace,
                created_at: now,
                updated_at: now,
            };
            records.push(record.clone());
            Ok(record)
        }

        async fn update_translation(
            &self,
            params: UpdateTranslationParams,
        ) -> Result<TranslationRecord, RepoError> {
            let mut records = self.records.lock().unwrap();
            if records.iter().any(|record| {
                record.id != params.id && record.key == params.key && record.locale == params.locale
            }) {
                return Err(RepoError::Duplicate {
                    constraint: "translations_key_locale_key".into(),
                });
            }
            let record = records
                .iter_mut()
                .find(|record| record.id == params.id)
                .ok_or(RepoError::NotFound)?;
            record.key = params.key;
            record.locale = params.locale;
            record.value = params.value;
            record.namespace = params.namespace;
            record.updated_at = OffsetDateTime::now_utc();
            Ok(record.clone())
        }

        async fn delete_translation(&self, id: Uuid) -> Result<TranslationRecord, RepoError> {
            let mut records = self.records.lock().unwrap();
            let index = records
                .iter()
                .position(|record| record.id == id)
                .ok_or(RepoError::NotFound)?;
            Ok(records.remove(index))
        }
    }

    /// Delegates to `inner` but fails the `fail_at`-th write (1-based).
    struct FailingWriter {
        inner: Arc<MemoryRepo>,
        calls: AtomicUsize,
        fail_at: usize,
    }

    #[async_trait]
    impl TranslationsWriteRepo for FailingWriter {
        async fn upsert_translation(
            &self,
            params: UpsertTranslationParams,
        ) -> Result<TranslationRecord, RepoError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
                return Err(RepoError::Timeout);
            }
            self.inner.upsert_translation(params).await
        }

        async fn update_translation(
            &self,
            params: UpdateTranslationParams,
        ) -> Result<TranslationRecord, RepoError> {
            self.inner.update_translation(params).await
        }

        async fn delete_translation(&self, id: Uuid) -> Result<TranslationRecord, RepoError> {
            self.inner.delete_translation(id).await
        }
    }

    struct NoBundles;

    #[async_trait]
    impl BundleSource for NoBundles {
        async fn load(&self, _locale: Locale) -> Result<Option<MessageTree>, BundleError> {
            Ok(None)
        }
    }

    fn service() -> (AdminTranslationService, TranslationResolver) {
        let repo = Arc::new(MemoryRepo::default());
        let resolver = TranslationResolver::new(
            Arc::new(MessageCache::new(CacheConfig::default())),
            repo.clone(),
            Arc::new(NoBundles),
        );
        let service = AdminTranslationService::new(repo.clone(), repo)
            .with_resolver(resolver.clone());
        (service, resolver)
    }

    fn command(key: &str, locale: &str, value: &str) -> UpsertTranslationCommand {
        UpsertTranslationCommand {
            key: key.into(),
            locale: locale.into(),
            value: value.into(),
            namespace: None,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_key_and_locale() {
        let (service, _) = service();
        let first = service
            .upsert("admin", command(" nav.home ", "fr", "Accueil"))
            .await
            .expect("created");
        let second = service
            .upsert("admin", command("nav.home", "fr", "Bienvenue"))
            .await
            .expect("updated");

        assert_eq!(first.id, second.id);
        assert_eq!(second.value, "Bienvenue");
        assert_eq!(second.namespace.as_deref(), Some("nav"));
        let all = service
            .list(&TranslationQueryFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_invalid_input() {
        let (service, _) = service();
        for bad in [
            command("", "fr", "x"),
            command("nav..home", "fr", "x"),
            command("nav.home", "xx", "x"),
            command("nav.home", "fr", ""),
        ] {
            let err = service.upsert("admin", bad).await.unwrap_err();
            assert!(
                matches!(err, AdminTranslationError::ConstraintViolation(_)),
                "unexpected error: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn upsert_makes_edit_visible_to_next_resolve() {
        let (service, resolver) = service();
        service
            .upsert("admin", command("nav.home", "fr", "Accueil"))
            .await
            .unwrap();
        assert_eq!(resolver.resolve("fr").await.get("nav.home"), Some("Accueil"));

        service
            .upsert("admin", command("nav.home", "fr", "Bienvenue"))
            .await
            .unwrap();
        assert!(resolver.cache().get(Locale::Fr).is_none());
        assert_eq!(
            resolver.resolve("fr").await.get("nav.home"),
            Some("Bienvenue")
        );
    }

    #[tokio::test]
    async fn update_moving_locale_invalidates_both() {
        let (service, resolver) = service();
        let record = service
            .upsert("admin", command("nav.home", "fr", "Accueil"))
            .await
            .unwrap();
        resolver.resolve("fr").await;
        resolver.resolve("de").await;

        let updated = service
            .update(
                "admin",
                record.id,
                UpdateTranslationCommand {
                    locale: Some("de".into()),
                    value: Some("Startseite".into()),
                    ..UpdateTranslationCommand::default()
                },
            )
            .await
            .expect("updated");

        assert_eq!(updated.locale, Locale::De);
        assert_eq!(updated.key, "nav.home");
        assert!(resolver.cache().get(Locale::Fr).is_none());
        assert!(resolver.cache().get(Locale::De).is_none());
        assert_eq!(resolver.resolve("fr").await.get("nav.home"), None);
        assert_eq!(
            resolver.resolve("de").await.get("nav.home"),
            Some("Startseite")
        );
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let (service, _) = service();
        let err = service
            .update("admin", Uuid::new_v4(), UpdateTranslationCommand::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminTranslationError::NotFound));
    }

    #[tokio::test]
    async fn update_into_existing_pair_is_a_constraint_violation() {
        let (service, _) = service();
        service
            .upsert("admin", command("nav.home", "fr", "Accueil"))
            .await
            .unwrap();
        let other = service
            .upsert("admin", command("nav.about", "fr", "À propos"))
            .await
            .unwrap();

        let err = service
            .update(
                "admin",
                other.id,
                UpdateTranslationCommand {
                    key: Some("nav.home".into()),
                    ..UpdateTranslationCommand::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdminTranslationError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn delete_invalidates_locale() {
        let (service, resolver) = service();
        let record = service
            .upsert("admin", command("footer.copyright", "de", "© Firma"))
            .await
            .unwrap();
        assert_eq!(
            resolver.resolve("de").await.get("footer.copyright"),
            Some("© Firma")
        );

        service.delete("admin", record.id).await.expect("deleted");

        assert!(resolver.resolve("de").await.is_empty());
        let err = service.delete("admin", record.id).await.unwrap_err();
        assert!(matches!(err, AdminTranslationError::NotFound));
    }

    #[tokio::test]
    async fn bulk_upsert_across_locales_clears_everything() {
        let (service, resolver) = service();
        resolver.resolve("ja").await;

        let saved = service
            .bulk_upsert(
                "admin",
                vec![
                    command("nav.home", "fr", "Accueil"),
                    command("nav.home", "de", "Startseite"),
                ],
            )
            .await
            .expect("saved");

        assert_eq!(saved.len(), 2);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn import_document_flattens_nested_keys() {
        let (service, resolver) = service();
        let document = MessageTree::from_json(&serde_json::json!({
            "nav": {"home": "Accueil", "about": "À propos"},
            "footer": {"legal": {"terms": "Conditions"}}
        }))
        .expect("object");

        let saved = service
            .import_document("cli", " fr ", Some("site"), &document)
            .await
            .expect("imported");

        assert_eq!(saved.len(), 3);
        assert!(saved.iter().all(|record| record.locale == Locale::Fr));
        assert!(
            saved
                .iter()
                .all(|record| record.namespace.as_deref() == Some("site"))
        );
        assert_eq!(
            resolver.resolve("fr").await.get("footer.legal.terms"),
            Some("Conditions")
        );
    }

    #[tokio::test]
    async fn import_document_rejects_unknown_locale() {
        let (service, _) = service();
        let err = service
            .import_document("cli", "xx", None, &MessageTree::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminTranslationError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn import_document_rejects_bare_string_document() {
        let (service, resolver) = service();
        let document = MessageTree::from_json(&serde_json::json!("hello")).expect("leaf");

        let err = service
            .import_document("cli", "fr", None, &document)
            .await
            .unwrap_err();

        match err {
            AdminTranslationError::ConstraintViolation(message) => {
                assert_eq!(message, "document must be a JSON object of messages")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let stored = resolver.store_tree(Locale::Fr).await.expect("store");
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn bulk_upsert_validates_before_writing() {
        let (service, _) = service();
        let err = service
            .bulk_upsert(
                "admin",
                vec![
                    command("nav.home", "fr", "Accueil"),
                    command("nav.home", "klingon", "nuqneH"),
                ],
            )
            .await
            .unwrap_err();

        match err {
            AdminTranslationError::ConstraintViolation(message) => {
                assert!(message.starts_with("item 1:"), "{message}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let all = service
            .list(&TranslationQueryFilter::default())
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn bulk_upsert_failure_still_invalidates_written_locales() {
        let repo = Arc::new(MemoryRepo::default());
        let resolver = TranslationResolver::new(
            Arc::new(MessageCache::new(CacheConfig::default())),
            repo.clone(),
            Arc::new(NoBundles),
        );
        let writer = Arc::new(FailingWriter {
            inner: repo.clone(),
            calls: AtomicUsize::new(0),
            fail_at: 2,
        });
        let service = AdminTranslationService::new(repo.clone(), writer)
            .with_resolver(resolver.clone());

        assert!(resolver.resolve("fr").await.is_empty());

        let err = service
            .bulk_upsert(
                "admin",
                vec![
                    command("nav.home", "fr", "Accueil"),
                    command("nav.about", "fr", "À propos"),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdminTranslationError::Repo(RepoError::Timeout)));

        let stored = repo
            .list_translations(&TranslationQueryFilter::for_locale(Locale::Fr))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert!(resolver.cache().get(Locale::Fr).is_none());
        assert_eq!(resolver.resolve("fr").await.get("nav.home"), Some("Accueil"));
    }

    #[tokio::test]
    async fn list_filters_and_sorts() {
        let (service, _) = service();
        service
            .bulk_upsert(
                "admin",
                vec![
                    command("nav.home", "fr", "Accueil"),
                    command("footer.copyright", "fr", "© Société"),
                    command("nav.home", "de", "Startseite"),
                ],
            )
            .await
            .unwrap();

        let french = service
            .list(&TranslationQueryFilter::for_locale(Locale::Fr))
            .await
            .unwrap();
        let keys: Vec<_> = french.iter().map(|record| record.key.as_str()).collect();
        assert_eq!(keys, ["footer.copyright", "nav.home"]);

        let search = service
            .list(&TranslationQueryFilter {
                search: Some("START".into()),
                ..TranslationQueryFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].locale, Locale::De);

        let nav = service
            .list(&TranslationQueryFilter {
                namespace: Some("nav".into()),
                ..TranslationQueryFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(nav.len(), 2);
    }
}
