//! Match cache item
//!
//! A [`MatchCacheItem`] is the long-lived, demand-populated view of one match.
//! Accessors answer from current state when the requested locales are already
//! loaded and otherwise ask the [`Loader`] for the missing ones through the
//! item's [`FetchCoordinator`]. The loader pushes payloads back through
//! [`MatchCacheItem::merge`].
//!
//! State sits behind a single `RwLock` that is only ever held for a read or a
//! merge, never across a loader call, so readers see each payload either fully
//! applied or not at all.

#![allow(missing_docs)]

use crate::cache::FixtureChanges;
use crate::ci::{
    BookingStatus, CompetitorRoster, ConditionsCi, CoverageInfoCi, DelayedInfoCi, FixtureCi,
    RoundCi, SeasonCi, TimelineCi, Translated, VenueCi,
};
use crate::config::{CacheConfig, ExceptionHandlingStrategy};
use crate::coordinator::{FetchCoordinator, FetchOutcome};
use crate::dto::{Payload, SportEventType, StageType};
use crate::error::{CacheError, CacheResult};
use crate::loader::{DataReceiver, Loader};
use crate::locale::{Locale, locale_list_to_string};
use crate::merge::{self, MatchState};
use crate::snapshot::MatchSnapshot;
use crate::stats::{FetchStats, FetchStatsSnapshot};
use crate::tracker::{LoadedLocales, RequestClass};
use crate::urn::Urn;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Collaborators shared by every item of a cache
#[derive(Clone)]
pub struct ItemContext {
    pub loader: Arc<dyn Loader>,
    pub config: Arc<CacheConfig>,
    pub fixture_changes: Arc<FixtureChanges>,
}

impl ItemContext {
    /// Context with an empty fixture change log
    pub fn new(loader: Arc<dyn Loader>, config: CacheConfig) -> Self {
        let fixture_changes = Arc::new(FixtureChanges::new(config.fixture_change_window));
        Self {
            loader,
            config: Arc::new(config),
            fixture_changes,
        }
    }
}

impl fmt::Debug for ItemContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Cached match, populated per locale and request class on demand
pub struct MatchCacheItem {
    id: Urn,
    default_locale: Locale,
    context: ItemContext,
    state: RwLock<MatchState>,
    loaded: LoadedLocales,
    coordinator: FetchCoordinator,
    stats: FetchStats,
}

impl fmt::Debug for MatchCacheItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchCacheItem")
            .field("id", &self.id)
            .field("default_locale", &self.default_locale)
            .field("loaded", &self.loaded.export())
            .finish_non_exhaustive()
    }
}

impl MatchCacheItem {
    /// Empty shell, populated on first access
    pub fn new(id: Urn, context: ItemContext) -> Self {
        let default_locale = context.config.default_locale.clone();
        Self::with_state(id, default_locale, context, MatchState::default(), LoadedLocales::new())
    }

    /// Item created from the payload that announced the match
    pub fn from_payload(payload: Payload, locale: &Locale, context: ItemContext) -> CacheResult<Self> {
        let item = Self::new(payload.entity_id().clone(), context);
        item.merge(payload, locale)?;
        Ok(item)
    }

    /// Rebuild an item from a snapshot without contacting the loader
    pub fn from_snapshot(snapshot: MatchSnapshot, context: ItemContext) -> Self {
        let loaded = LoadedLocales::import(&snapshot.loaded_locales);
        let id = snapshot.id.clone();
        let default_locale = snapshot.default_locale.clone();
        Self::with_state(id, default_locale, context, snapshot.into_state(), loaded)
    }

    fn with_state(
        id: Urn,
        default_locale: Locale,
        context: ItemContext,
        state: MatchState,
        loaded: LoadedLocales,
    ) -> Self {
        Self {
            coordinator: FetchCoordinator::new(id.clone()),
            id,
            default_locale,
            context,
            state: RwLock::new(state),
            loaded,
            stats: FetchStats::new(),
        }
    }

    /// Point-in-time copy of the whole item
    pub fn export(&self) -> MatchSnapshot {
        let state = self.state.read();
        MatchSnapshot::from_state(
            &self.id,
            &self.default_locale,
            &state,
            self.loaded.export(),
        )
    }

    pub fn id(&self) -> &Urn {
        &self.id
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Locales loaded for `class`, in load order
    pub fn loaded_locales(&self, class: RequestClass) -> Vec<Locale> {
        self.loaded.tracker(class).locales()
    }

    pub fn fetch_stats(&self) -> FetchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Fold `payload`, fetched for `locale`, into the item
    ///
    /// The payload is validated first; a payload for another item or one that
    /// fails validation is rejected with [`CacheError::Malformed`] and leaves
    /// the item untouched. Trackers are marked only after the state has been
    /// updated.
    pub fn merge(&self, payload: Payload, locale: &Locale) -> CacheResult<()> {
        payload.validate(&self.id)?;

        let class = payload.request_class();
        if let Some(class) = class
            && self.loaded.tracker(class).contains(locale)
        {
            info!(
                id = %self.id,
                class = %class,
                locale = %locale,
                "Merging data for a locale that is already loaded"
            );
        }

        let effects = {
            let mut state = self.state.write();
            merge::apply(&mut state, &payload, locale)
        };

        if let Some(class) = class {
            self.loaded.mark_loaded(class, locale);
        }
        if effects.competitors_replaced {
            self.loaded.mark_loaded(RequestClass::Competitors, locale);
        }

        Ok(())
    }

    /// Record that this client booked the match for live odds
    pub fn on_event_booked(&self) {
        self.state.write().booking_status = Some(BookingStatus::Booked);
    }

    /// Re-fetch the summary in the default locale, bypassing the trackers
    pub fn fetch_sport_event_status(&self) -> CacheResult<()> {
        let locales = [self.default_locale.clone()];
        self.request(RequestClass::Summary, &locales, true)
    }

    /// True when both fixture and summary data are loaded for every locale
    pub fn has_translations_loaded_for(&self, locales: &[Locale]) -> bool {
        self.loaded.is_complete(RequestClass::Fixture, locales)
            && self.loaded.is_complete(RequestClass::Summary, locales)
    }

    /// Names in the requested locales
    ///
    /// A locale that was fetched without a name maps to `""`; a locale that
    /// could not be fetched is absent.
    pub fn names(&self, locales: &[Locale]) -> CacheResult<HashMap<Locale, String>> {
        let has_names = self.read(|state| locales.iter().all(|l| state.names.contains_key(l)));
        if has_names || self.loaded.is_complete(RequestClass::Summary, locales) {
            self.stats.record_fast_path();
        } else {
            self.request(RequestClass::Summary, locales, false)?;
        }

        Ok(self.read(|state| {
            state
                .names
                .iter()
                .filter(|(locale, _)| locales.contains(locale))
                .map(|(locale, name)| (locale.clone(), name.clone()))
                .collect()
        }))
    }

    /// `Some("")` when the locale was fetched without a name, `None` when it
    /// was never fetched
    pub fn name(&self, locale: &Locale) -> CacheResult<Option<String>> {
        let mut names = self.names(std::slice::from_ref(locale))?;
        Ok(names.remove(locale))
    }

    pub fn tournament_id(&self) -> CacheResult<Option<Urn>> {
        self.summary_scalar(|state| state.tournament_id.clone())
    }

    pub fn scheduled(&self) -> CacheResult<Option<DateTime<Utc>>> {
        self.summary_scalar(|state| state.scheduled)
    }

    pub fn scheduled_end(&self) -> CacheResult<Option<DateTime<Utc>>> {
        self.summary_scalar(|state| state.scheduled_end)
    }

    pub fn start_time_tbd(&self) -> CacheResult<Option<bool>> {
        self.summary_scalar(|state| state.start_time_tbd)
    }

    pub fn replaced_by(&self) -> CacheResult<Option<Urn>> {
        self.summary_scalar(|state| state.replaced_by.clone())
    }

    pub fn stage_type(&self) -> CacheResult<Option<StageType>> {
        self.summary_scalar(|state| state.stage_type)
    }

    /// Scheduled start without any fetching
    pub fn scheduled_raw(&self) -> Option<DateTime<Utc>> {
        self.read(|state| state.scheduled)
    }

    /// Scheduled end without any fetching
    pub fn scheduled_end_raw(&self) -> Option<DateTime<Utc>> {
        self.read(|state| state.scheduled_end)
    }

    pub fn tournament_round(&self, locales: &[Locale]) -> CacheResult<Option<RoundCi>> {
        self.translated(RequestClass::Summary, locales, |state| {
            state.tournament_round.as_ref()
        })
    }

    pub fn season(&self, locales: &[Locale]) -> CacheResult<Option<SeasonCi>> {
        self.translated(RequestClass::Summary, locales, |state| state.season.as_ref())
    }

    pub fn venue(&self, locales: &[Locale]) -> CacheResult<Option<VenueCi>> {
        self.translated(RequestClass::Summary, locales, |state| state.venue.as_ref())
    }

    pub fn conditions(&self, locales: &[Locale]) -> CacheResult<Option<ConditionsCi>> {
        self.translated(RequestClass::Summary, locales, |state| state.conditions.as_ref())
    }

    pub fn delayed_info(&self, locales: &[Locale]) -> CacheResult<Option<DelayedInfoCi>> {
        self.translated(RequestClass::Fixture, locales, |state| state.delayed_info.as_ref())
    }

    pub fn fixture(&self, locales: &[Locale]) -> CacheResult<Option<FixtureCi>> {
        if self.loaded.is_complete(RequestClass::Fixture, locales) {
            self.stats.record_fast_path();
        } else {
            self.request(RequestClass::Fixture, locales, false)?;
        }
        Ok(self.read(|state| state.fixture.clone()))
    }

    pub fn booking_status(&self) -> CacheResult<Option<BookingStatus>> {
        self.scalar(RequestClass::Fixture, |state| state.booking_status)
    }

    /// Coverage info, fetched with the summary unless a summary or fixture
    /// payload has already been absorbed in any locale
    pub fn coverage_info(&self) -> CacheResult<Option<CoverageInfoCi>> {
        let current = self.read(|state| state.coverage_info.clone());
        if current.is_some()
            || !self.loaded.tracker(RequestClass::Summary).is_empty()
            || !self.loaded.tracker(RequestClass::Fixture).is_empty()
        {
            self.stats.record_fast_path();
            return Ok(current);
        }

        let locales = [self.default_locale.clone()];
        self.request(RequestClass::Summary, &locales, false)?;
        Ok(self.read(|state| state.coverage_info.clone()))
    }

    /// Competitor ids, home first
    pub fn competitor_ids(&self, locales: &[Locale]) -> CacheResult<Option<Vec<Urn>>> {
        if self.loaded.is_complete(RequestClass::Competitors, locales) {
            self.stats.record_fast_path();
        } else {
            self.request(RequestClass::Summary, locales, false)?;
        }
        Ok(self.read(|state| {
            state
                .competitors
                .as_ref()
                .map(|roster| roster.ids().to_vec())
        }))
    }

    pub fn competitors_qualifiers(&self) -> CacheResult<HashMap<Urn, String>> {
        self.roster_field(RequestClass::Summary, |roster| {
            (!roster.qualifiers().is_empty()).then(|| roster.qualifiers().clone())
        })
    }

    pub fn competitors_divisions(&self) -> CacheResult<HashMap<Urn, i32>> {
        self.roster_field(RequestClass::Summary, |roster| {
            (!roster.divisions().is_empty()).then(|| roster.divisions().clone())
        })
    }

    pub fn competitors_virtual(&self) -> CacheResult<Vec<Urn>> {
        self.roster_field(RequestClass::Summary, |roster| {
            (!roster.virtual_ids().is_empty()).then(|| roster.virtual_ids().to_vec())
        })
    }

    pub fn competitors_references(&self) -> CacheResult<HashMap<Urn, HashMap<String, String>>> {
        self.roster_field(RequestClass::Fixture, |roster| {
            (!roster.references().is_empty()).then(|| roster.references().clone())
        })
    }

    pub fn live_odds(&self, locales: &[Locale]) -> CacheResult<Option<String>> {
        self.summary_value(locales, |state| state.live_odds.clone())
    }

    pub fn sport_event_type(&self, locales: &[Locale]) -> CacheResult<Option<SportEventType>> {
        self.summary_value(locales, |state| state.event_type)
    }

    /// Timeline in `locale`
    ///
    /// Without `make_api_call` the stored timeline is returned as is. With it,
    /// a finalized timeline is still served from the cache; anything else is
    /// dropped and fetched again.
    pub fn event_timeline(
        &self,
        locale: &Locale,
        make_api_call: bool,
    ) -> CacheResult<Option<TimelineCi>> {
        let current = self.read(|state| state.timelines.get(locale).cloned());
        if !make_api_call || current.as_ref().is_some_and(TimelineCi::is_finalized) {
            self.stats.record_fast_path();
            return Ok(current);
        }

        let outcome = {
            let _guard = self.coordinator.lock(RequestClass::Timeline);

            let finalized = self.read(|state| {
                state
                    .timelines
                    .get(locale)
                    .is_some_and(TimelineCi::is_finalized)
            });

            if finalized {
                FetchOutcome::default()
            } else {
                self.state.write().timelines.remove(locale);
                let result = self.call_loader(RequestClass::Timeline, locale, true);

                let mut outcome = FetchOutcome {
                    attempted: true,
                    ..FetchOutcome::default()
                };
                match result {
                    Ok(()) => outcome.fetched.push(locale.clone()),
                    Err(e) => outcome.failures.push((locale.clone(), e)),
                }
                outcome
            }
        };

        self.surface(RequestClass::Timeline, outcome)?;
        Ok(self.read(|state| state.timelines.get(locale).cloned()))
    }

    fn read<R>(&self, f: impl FnOnce(&MatchState) -> R) -> R {
        f(&self.state.read())
    }

    /// Ask the loader for the `locales` of `class` not loaded yet, or for all
    /// of them when `force` is set
    fn request(&self, class: RequestClass, locales: &[Locale], force: bool) -> CacheResult<()> {
        let force_refresh = force
            || (class == RequestClass::Fixture
                && self.context.fixture_changes.is_recently_changed(&self.id));

        let outcome = self.coordinator.ensure_loaded(
            self.loaded.tracker(class),
            class,
            locales,
            force,
            |locale| self.call_loader(class, locale, force_refresh),
        );

        if !outcome.attempted {
            self.stats.record_fast_path();
        }

        self.surface(class, outcome)
    }

    /// One loader call for `locale`
    ///
    /// A call that returns `Ok` without a payload for `locale` having been
    /// merged is a [`CacheError::NotFound`], so the locale stays unloaded and
    /// is asked for again next time.
    fn call_loader(&self, class: RequestClass, locale: &Locale, force_refresh: bool) -> CacheResult<()> {
        let delivery = Delivery::new(self, locale);
        let result = self
            .context
            .loader
            .request(class, locale, &self.id, force_refresh, &delivery)
            .and_then(|()| {
                if delivery.is_merged() {
                    Ok(())
                } else {
                    Err(CacheError::NotFound(format!(
                        "no {class} data delivered for {} in {locale}",
                        self.id
                    )))
                }
            });
        self.stats.record_fetch(result.is_ok());
        result
    }

    /// Apply the configured strategy to the failures of a fetch pass
    fn surface(&self, class: RequestClass, outcome: FetchOutcome) -> CacheResult<()> {
        let failed = locale_list_to_string(&outcome.failed_locales());
        let Some((_, first)) = outcome.failures.into_iter().next() else {
            return Ok(());
        };

        let request = format!("{class} request for {} [{failed}]", self.id);
        self.stats.record_failure(format!("{request}: {first}"));

        match self.context.config.exception_handling_strategy {
            ExceptionHandlingStrategy::Throw => Err(CacheError::ItemNotAvailable {
                request,
                source: Box::new(first),
            }),
            ExceptionHandlingStrategy::Catch => {
                warn!(
                    id = %self.id,
                    class = %class,
                    locales = %failed,
                    error = %first,
                    "Fetch failed, returning cached data"
                );
                self.stats.record_swallowed();
                Ok(())
            }
        }
    }

    /// Value if set; otherwise fetch `class` in the default locale, unless
    /// some locale of that class was already loaded without providing it
    fn scalar<T>(
        &self,
        class: RequestClass,
        get: impl Fn(&MatchState) -> Option<T>,
    ) -> CacheResult<Option<T>> {
        if let Some(value) = self.read(&get) {
            self.stats.record_fast_path();
            return Ok(Some(value));
        }
        if !self.loaded.tracker(class).is_empty() {
            self.stats.record_fast_path();
            return Ok(None);
        }

        let locales = [self.default_locale.clone()];
        self.request(class, &locales, false)?;
        Ok(self.read(get))
    }

    fn summary_scalar<T>(&self, get: impl Fn(&MatchState) -> Option<T>) -> CacheResult<Option<T>> {
        self.scalar(RequestClass::Summary, get)
    }

    /// Value if set; otherwise fetch the summary for the missing `locales`
    fn summary_value<T>(
        &self,
        locales: &[Locale],
        get: impl Fn(&MatchState) -> Option<T>,
    ) -> CacheResult<Option<T>> {
        if let Some(value) = self.read(&get) {
            self.stats.record_fast_path();
            return Ok(Some(value));
        }

        self.request(RequestClass::Summary, locales, false)?;
        Ok(self.read(get))
    }

    /// Nested item if it already holds `locales`; otherwise fetch `class`
    /// unless its tracker already holds them
    fn translated<T, F>(&self, class: RequestClass, locales: &[Locale], get: F) -> CacheResult<Option<T>>
    where
        T: Translated + Clone,
        F: Fn(&MatchState) -> Option<&T>,
    {
        let complete = self.read(|state| get(state).is_some_and(|item| item.is_translated_for(locales)));
        if complete || self.loaded.is_complete(class, locales) {
            self.stats.record_fast_path();
        } else {
            self.request(class, locales, false)?;
        }
        Ok(self.read(|state| get(state).cloned()))
    }

    /// Roster field if non-empty; otherwise fetch `class` in the default
    /// locale unless a roster was already absorbed
    fn roster_field<T, F>(&self, class: RequestClass, get: F) -> CacheResult<T>
    where
        T: Default,
        F: Fn(&CompetitorRoster) -> Option<T>,
    {
        let current = |state: &MatchState| state.competitors.as_ref().and_then(&get);

        if let Some(value) = self.read(current) {
            self.stats.record_fast_path();
            return Ok(value);
        }

        if self.loaded.tracker(RequestClass::Competitors).is_empty() {
            let locales = [self.default_locale.clone()];
            self.request(class, &locales, false)?;
        }

        Ok(self.read(current).unwrap_or_default())
    }
}

impl DataReceiver for MatchCacheItem {
    fn merge(&self, payload: Payload, locale: &Locale) -> CacheResult<()> {
        Self::merge(self, payload, locale)
    }
}

/// Receiver handed to the loader for a single locale
///
/// Forwards to the item and notes whether a payload in the requested locale
/// was actually merged.
struct Delivery<'a> {
    item: &'a MatchCacheItem,
    locale: &'a Locale,
    merged: AtomicBool,
}

impl<'a> Delivery<'a> {
    fn new(item: &'a MatchCacheItem, locale: &'a Locale) -> Self {
        Self {
            item,
            locale,
            merged: AtomicBool::new(false),
        }
    }

    fn is_merged(&self) -> bool {
        self.merged.load(Ordering::Relaxed)
    }
}

impl DataReceiver for Delivery<'_> {
    fn merge(&self, payload: Payload, locale: &Locale) -> CacheResult<()> {
        self.item.merge(payload, locale)?;
        if locale == self.locale {
            self.merged.store(true, Ordering::Relaxed);
        }
        Ok(())
    }
}
