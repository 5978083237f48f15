//! Loaded-locale tracking per request class
//!
//! Each cache item records, for every [`RequestClass`], the locales whose
//! payload it has already absorbed. The sets only ever grow: once a locale is
//! marked loaded it stays loaded for the lifetime of the item (and of any
//! snapshot taken from it).

use crate::locale::{Locale, find_missing_locales};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of remote endpoint a payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    /// Fixture endpoint: booking status, fixture view, delay info
    Fixture,
    /// Summary endpoint: basic facts, conditions, coverage
    Summary,
    /// Timeline endpoint: play-by-play events
    Timeline,
    /// Competitor roster, carried inside the other payloads
    Competitors,
}

impl RequestClass {
    /// Every class, in tracker order
    pub const ALL: [Self; 4] = [
        Self::Fixture,
        Self::Summary,
        Self::Timeline,
        Self::Competitors,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixture => "fixture",
            Self::Summary => "summary",
            Self::Timeline => "timeline",
            Self::Competitors => "competitors",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Fixture => 0,
            Self::Summary => 1,
            Self::Timeline => 2,
            Self::Competitors => 3,
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only, thread-safe, insertion-ordered set of loaded locales
///
/// Readers take a shared lock and therefore see the set either before or
/// after a concurrent `mark_loaded`, never half way.
#[derive(Debug, Default)]
pub struct LocaleTracker {
    loaded: RwLock<Vec<Locale>>,
}

impl LocaleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from a previously exported locale sequence
    pub fn from_locales<I: IntoIterator<Item = Locale>>(locales: I) -> Self {
        let tracker = Self::new();
        for locale in locales {
            tracker.mark_loaded(&locale);
        }
        tracker
    }

    /// Returns true if the locale was not loaded before
    pub fn mark_loaded(&self, locale: &Locale) -> bool {
        if self.loaded.read().contains(locale) {
            return false;
        }

        let mut loaded = self.loaded.write();
        if loaded.contains(locale) {
            return false;
        }
        loaded.push(locale.clone());
        true
    }

    pub fn contains(&self, locale: &Locale) -> bool {
        self.loaded.read().contains(locale)
    }

    /// True iff every required locale is loaded; an empty requirement is
    /// always complete
    pub fn is_complete(&self, required: &[Locale]) -> bool {
        let loaded = self.loaded.read();
        required.iter().all(|locale| loaded.contains(locale))
    }

    /// Required locales not loaded yet, in request order
    pub fn missing(&self, required: &[Locale]) -> Vec<Locale> {
        find_missing_locales(&self.loaded.read(), required)
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.loaded.read().len()
    }

    /// Point-in-time copy in insertion order
    pub fn locales(&self) -> Vec<Locale> {
        self.loaded.read().clone()
    }
}

/// One tracker per request class
#[derive(Debug, Default)]
pub struct LoadedLocales {
    trackers: [LocaleTracker; 4],
}

impl LoadedLocales {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self, class: RequestClass) -> &LocaleTracker {
        &self.trackers[class.index()]
    }

    pub fn mark_loaded(&self, class: RequestClass, locale: &Locale) -> bool {
        self.tracker(class).mark_loaded(locale)
    }

    pub fn is_complete(&self, class: RequestClass, required: &[Locale]) -> bool {
        self.tracker(class).is_complete(required)
    }

    pub fn missing(&self, class: RequestClass, required: &[Locale]) -> Vec<Locale> {
        self.tracker(class).missing(required)
    }

    /// Export every class, including empty ones
    pub fn export(&self) -> BTreeMap<RequestClass, Vec<Locale>> {
        RequestClass::ALL
            .into_iter()
            .map(|class| (class, self.tracker(class).locales()))
            .collect()
    }

    /// Rebuild from an exported map; classes absent from the map start empty
    pub fn import(exported: &BTreeMap<RequestClass, Vec<Locale>>) -> Self {
        let loaded = Self::new();
        for (class, locales) in exported {
            for locale in locales {
                loaded.mark_loaded(*class, locale);
            }
        }
        loaded
    }
}
