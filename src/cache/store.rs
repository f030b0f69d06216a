//! Per-locale message cache.
//!
//! Holds the resolved [`MessageTree`] for each locale together with the time
//! it was inserted. Expiry is checked lazily on read; nothing sweeps the map
//! in the background.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use metrics::counter;
use tracing::debug;

use crate::domain::{locale::Locale, message_tree::MessageTree};

use super::config::CacheConfig;

#[derive(Debug, Clone)]
struct CacheEntry {
    tree: Arc<MessageTree>,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// Process-wide cache of resolved message trees, keyed by locale.
///
/// Entries for different locales are independent; the underlying `DashMap`
/// keeps concurrent reads and writes from corrupting the mapping.
#[derive(Debug)]
pub struct MessageCache {
    config: CacheConfig,
    entries: DashMap<Locale, CacheEntry>,
}

impl MessageCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    /// Return the cached tree when present and younger than the TTL.
    pub fn get(&self, locale: Locale) -> Option<Arc<MessageTree>> {
        self.get_at(locale, Instant::now())
    }

    fn get_at(&self, locale: Locale, now: Instant) -> Option<Arc<MessageTree>> {
        if !self.config.enabled {
            return None;
        }

        let hit = self
            .entries
            .get(&locale)
            .filter(|entry| entry.is_fresh(self.config.ttl, now))
            .map(|entry| entry.tree.clone());

        match hit {
            Some(_) => counter!("lingora_translation_cache_hit_total").increment(1),
            None => counter!("lingora_translation_cache_miss_total").increment(1),
        }
        hit
    }

    /// Replace the entry for `locale`, timestamped now.
    pub fn set(&self, locale: Locale, tree: Arc<MessageTree>) {
        if !self.config.enabled {
            return;
        }
        self.entries.insert(
            locale,
            CacheEntry {
                tree,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for one locale, or every entry when `locale` is `None`.
    pub fn invalidate(&self, locale: Option<Locale>) {
        match locale {
            Some(locale) => {
                let removed = self.entries.remove(&locale).is_some();
                debug!(locale = %locale, removed, "Invalidated cached messages");
            }
            None => {
                let count = self.entries.len();
                self.entries.clear();
                debug!(count, "Invalidated all cached messages");
            }
        }
        counter!("lingora_translation_cache_invalidate_total").increment(1);
    }

    /// Number of stored entries, including ones past their TTL.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
