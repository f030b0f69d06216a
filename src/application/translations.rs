//! Request-time resolution of per-locale message trees.
//!
//! A resolution consults the cache first. On a miss it reads the locale's
//! records from the translation store, loads the static bundle (falling back
//! to the default locale's bundle, then to an empty tree), merges the store
//! tree over the bundle and caches the result.

use std::{sync::Arc, time::Instant};

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::application::repos::{BundleSource, RepoError, TranslationsRepo};
use crate::cache::MessageCache;
use crate::domain::{
    locale::Locale,
    message_tree::{MessageTree, merge_over},
    translations::TranslationRecord,
};

const SOURCE: &str = "application::translations";

#[derive(Clone)]
pub struct TranslationResolver {
    cache: Arc<MessageCache>,
    store: Arc<dyn TranslationsRepo>,
    bundles: Arc<dyn BundleSource>,
}

impl TranslationResolver {
    pub fn new(
        cache: Arc<MessageCache>,
        store: Arc<dyn TranslationsRepo>,
        bundles: Arc<dyn BundleSource>,
    ) -> Self {
        Self {
            cache,
            store,
            bundles,
        }
    }

    pub fn cache(&self) -> &Arc<MessageCache> {
        &self.cache
    }

    /// Resolve the message tree for a raw locale code.
    ///
    /// Unsupported codes resolve as the default locale. Never fails: store
    /// and bundle problems degrade to whatever source is still available.
    pub async fn resolve(&self, requested: &str) -> Arc<MessageTree> {
        let locale = Locale::normalize(requested);
        if locale.code() != requested.trim() {
            debug!(
                target = SOURCE,
                requested,
                resolved = %locale,
                "Substituted default locale"
            );
        }
        self.resolve_locale(locale).await
    }

    pub async fn resolve_locale(&self, locale: Locale) -> Arc<MessageTree> {
        if let Some(tree) = self.cache.get(locale) {
            return tree;
        }

        let started_at = Instant::now();
        let (tree, cacheable) = self.build(locale).await;
        let tree = Arc::new(tree);

        if cacheable {
            self.cache.set(locale, tree.clone());
        }

        histogram!("lingora_translation_resolve_ms")
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        debug!(
            target = SOURCE,
            locale = %locale,
            leaves = tree.leaf_count(),
            cached = cacheable,
            "Resolved message tree"
        );
        tree
    }

    /// Look up one message for rendering helpers.
    pub async fn lookup(&self, requested: &str, key: &str) -> Option<String> {
        self.resolve(requested).await.get(key).map(str::to_string)
    }

    /// Drop one locale's cached tree, or all of them.
    pub fn invalidate(&self, locale: Option<Locale>) {
        self.cache.invalidate(locale);
        info!(
            target = SOURCE,
            locale = locale.map(Locale::code).unwrap_or("*"),
            "Invalidated message cache"
        );
    }

    /// Invalidate and synchronously rebuild one locale.
    pub async fn force_refresh(&self, requested: &str) -> Arc<MessageTree> {
        let locale = Locale::normalize(requested);
        self.invalidate(Some(locale));
        self.resolve_locale(locale).await
    }

    /// Tree built from store records only, without bundles or caching.
    pub async fn store_tree(&self, locale: Locale) -> Result<MessageTree, RepoError> {
        let records = self.store.list_by_locale(locale).await?;
        Ok(tree_from_records(&records))
    }

    async fn build(&self, locale: Locale) -> (MessageTree, bool) {
        let bundle = self.load_bundle(locale).await;

        match self.store_tree(locale).await {
            Ok(store) => (merge_over(&bundle, &store), true),
            Err(err) => {
                counter!("lingora_translation_store_error_total").increment(1);
                warn!(
                    target = SOURCE,
                    locale = %locale,
                    error = %err,
                    "Translation store unavailable; serving bundle messages"
                );
                (bundle, false)
            }
        }
    }

    async fn load_bundle(&self, locale: Locale) -> MessageTree {
        if let Some(tree) = self.try_bundle(locale).await {
            return tree;
        }

        if !locale.is_default() {
            counter!("lingora_translation_bundle_fallback_total").increment(1);
            debug!(
                target = SOURCE,
                locale = %locale,
                fallback = %Locale::DEFAULT,
                "No bundle for locale; using default bundle"
            );
            if let Some(tree) = self.try_bundle(Locale::DEFAULT).await {
                return tree;
            }
        }

        warn!(
            target = SOURCE,
            locale = %locale,
            "No message bundle available; starting from an empty tree"
        );
        MessageTree::empty()
    }

    async fn try_bundle(&self, locale: Locale) -> Option<MessageTree> {
        match self.bundles.load(locale).await {
            Ok(found) => found,
            Err(err) => {
                warn!(
                    target = SOURCE,
                    locale = %locale,
                    error = %err,
                    "Failed to load message bundle"
                );
                None
            }
        }
    }
}

pub fn tree_from_records(records: &[TranslationRecord]) -> MessageTree {
    MessageTree::from_entries(
        records
            .iter()
            .map(|record| (record.key.as_str(), record.value.as_str())),
    )
}
