//! Sport event cache
//!
//! Arena of match items keyed by identifier. Items live as long as the cache;
//! there is no eviction at this level.

use crate::config::CacheConfig;
use crate::dto::Payload;
use crate::error::{CacheError, CacheResult};
use crate::loader::Loader;
use crate::locale::Locale;
use crate::match_item::{ItemContext, MatchCacheItem};
use crate::snapshot::{CacheSnapshot, MatchSnapshot};
use crate::urn::Urn;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Recent fixture changes per match
///
/// While a change is younger than the window, fixture requests ask the
/// loader to bypass whatever caching it does itself. Entries expire from the
/// log one window after they were recorded, and stale entries are dropped as
/// soon as they are looked at.
#[derive(Debug)]
pub struct FixtureChanges {
    window: Duration,
    changes: moka::sync::Cache<Urn, DateTime<Utc>>,
}

impl FixtureChanges {
    /// Empty log with the given window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            changes: moka::sync::Cache::builder().time_to_live(window).build(),
        }
    }

    /// Record a fixture change of `id` at `at`, keeping the latest one
    ///
    /// A change already older than the window is not kept.
    pub fn record(&self, id: Urn, at: DateTime<Utc>) {
        if !self.is_within_window(at) {
            trace!(id = %id, at = %at, "Ignoring expired fixture change");
            return;
        }

        self.changes.entry(id).and_upsert_with(|existing| {
            existing.map_or(at, |entry| entry.into_value().max(at))
        });
    }

    /// Time of the last recorded change of `id` still inside the window
    pub fn last_change(&self, id: &Urn) -> Option<DateTime<Utc>> {
        let at = self.changes.get(id)?;
        if self.is_within_window(at) {
            Some(at)
        } else {
            self.changes.invalidate(id);
            None
        }
    }

    /// True while the last change of `id` is younger than the window
    pub fn is_recently_changed(&self, id: &Urn) -> bool {
        self.last_change(id).is_some()
    }

    /// Number of changes still held, after dropping expired ones
    pub fn len(&self) -> u64 {
        self.changes.run_pending_tasks();
        self.changes.entry_count()
    }

    /// True when no change is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_within_window(&self, at: DateTime<Utc>) -> bool {
        // A change stamped in the future counts as recent
        match Utc::now().signed_duration_since(at).to_std() {
            Ok(age) => age < self.window,
            Err(_) => true,
        }
    }
}

/// Cache of match items keyed by identifier
#[derive(Debug)]
pub struct SportEventCache {
    items: DashMap<Urn, Arc<MatchCacheItem>>,
    context: ItemContext,
}

impl SportEventCache {
    /// Create an empty cache
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfiguration`] if `config` does not
    /// validate.
    pub fn new(loader: Arc<dyn Loader>, config: CacheConfig) -> CacheResult<Self> {
        config
            .validate()
            .map_err(CacheError::InvalidConfiguration)?;

        Ok(Self {
            items: DashMap::new(),
            context: ItemContext::new(loader, config),
        })
    }

    /// Configuration shared by all items
    pub fn config(&self) -> &CacheConfig {
        &self.context.config
    }

    /// Item for `id`, created as an empty shell if unknown
    pub fn get_or_create(&self, id: &Urn) -> Arc<MatchCacheItem> {
        if let Some(item) = self.items.get(id) {
            return Arc::clone(item.value());
        }

        let entry = self.items.entry(id.clone()).or_insert_with(|| {
            debug!(id = %id, "Creating empty cache item");
            Arc::new(MatchCacheItem::new(id.clone(), self.context.clone()))
        });
        Arc::clone(entry.value())
    }

    /// Merge a discovery payload, creating the item on first sight
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Malformed`] if the payload is not about `id` or
    /// fails validation; no item is created in that case.
    pub fn add_payload(
        &self,
        id: &Urn,
        payload: Payload,
        locale: &Locale,
    ) -> CacheResult<Arc<MatchCacheItem>> {
        payload.validate(id)?;

        let item = self.get_or_create(id);
        item.merge(payload, locale)?;
        Ok(item)
    }

    /// Item for `id` if cached
    pub fn get(&self, id: &Urn) -> Option<Arc<MatchCacheItem>> {
        self.items.get(id).map(|item| Arc::clone(item.value()))
    }

    /// Number of cached items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no item is cached
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifiers of all cached items, sorted
    pub fn ids(&self) -> Vec<Urn> {
        let mut ids: Vec<Urn> = self.items.iter().map(|item| item.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Record a fixture change reported for `id`
    pub fn on_fixture_change(&self, id: Urn, at: DateTime<Utc>) {
        debug!(id = %id, at = %at, "Fixture change recorded");
        self.context.fixture_changes.record(id, at);
    }

    /// True while a recorded fixture change of `id` is within the window
    pub fn is_fixture_recently_changed(&self, id: &Urn) -> bool {
        self.context.fixture_changes.is_recently_changed(id)
    }

    /// Snapshots of every item, sorted by identifier
    pub fn export_all(&self) -> Vec<MatchSnapshot> {
        let items: Vec<Arc<MatchCacheItem>> = self
            .items
            .iter()
            .map(|item| Arc::clone(item.value()))
            .collect();

        let mut snapshots: Vec<MatchSnapshot> = items.iter().map(|item| item.export()).collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    /// Rebuild items from snapshots, replacing items with the same identifier
    ///
    /// Returns the number of imported items. The loader is not contacted.
    pub fn import_all(&self, snapshots: Vec<MatchSnapshot>) -> usize {
        let count = snapshots.len();
        for snapshot in snapshots {
            let id = snapshot.id.clone();
            let item = MatchCacheItem::from_snapshot(snapshot, self.context.clone());
            self.items.insert(id, Arc::new(item));
        }
        count
    }

    /// Persist every item to a JSON document at `path`
    pub fn save_to(&self, path: &Path) -> CacheResult<usize> {
        let document = CacheSnapshot::new(self.export_all());
        let count = document.items.len();
        document.write_to(path)?;

        info!(path = %path.display(), items = count, "Saved sport event cache");
        Ok(count)
    }

    /// Import every item from a document written by [`SportEventCache::save_to`]
    pub fn load_from(&self, path: &Path) -> CacheResult<usize> {
        let document = CacheSnapshot::read_from(path)?;
        let count = self.import_all(document.items);

        info!(path = %path.display(), items = count, "Loaded sport event cache");
        Ok(count)
    }
}
