//! Nested cache items owned by a match item
//!
//! Every nested item is a plain value: it is created from the first payload
//! that carries it, merged in place by later payloads (carrying the locale
//! along), and exported by cloning. Items with translated fields track their
//! own locales, so `has_translations_for` can answer without consulting the
//! parent's request-class trackers.

#![allow(missing_docs)]

mod conditions;
mod coverage;
mod delayed_info;
mod fixture;
mod roster;
mod round;
mod season;
mod timeline;
mod venue;

pub use conditions::{ConditionsCi, RefereeCi, WeatherInfoCi};
pub use coverage::CoverageInfoCi;
pub use delayed_info::DelayedInfoCi;
pub use fixture::{FixtureCi, ProducerInfoCi, ProducerLinkCi, StreamingChannelCi, TvChannelCi};
pub use roster::CompetitorRoster;
pub use round::RoundCi;
pub use season::SeasonCi;
pub use timeline::{TimelineCi, TimelineEventCi};
pub use venue::VenueCi;

use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Booking state of a match with respect to live odds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Live odds may be booked
    Bookable,
    /// Live odds are offered through a partner
    Buyable,
    /// Booked by this client
    Booked,
    /// No live odds will be offered
    NotAvailable,
}

impl BookingStatus {
    /// Derive the status from the `liveodds` attribute of a sport event
    pub fn from_live_odds(live_odds: Option<&str>) -> Self {
        match live_odds.map(str::to_ascii_lowercase).as_deref() {
            Some("bookable") => Self::Bookable,
            Some("buyable") => Self::Buyable,
            Some("booked") => Self::Booked,
            _ => Self::NotAvailable,
        }
    }
}

/// Store a translated value for `locale`; an absent value stores the
/// empty-string sentinel so "fetched without a value" stays distinct from
/// "never fetched"
pub(crate) fn put_translation(
    map: &mut HashMap<Locale, String>,
    locale: &Locale,
    value: Option<&String>,
) {
    map.insert(locale.clone(), value.cloned().unwrap_or_default());
}

/// Record `locale` in an item's locale list
pub(crate) fn push_locale(locales: &mut Vec<Locale>, locale: &Locale) {
    if !locales.contains(locale) {
        locales.push(locale.clone());
    }
}

pub(crate) fn contains_all(locales: &[Locale], required: &[Locale]) -> bool {
    required.iter().all(|locale| locales.contains(locale))
}

/// Nested items that know which locales they hold
pub(crate) trait Translated {
    fn is_translated_for(&self, locales: &[Locale]) -> bool;
}

macro_rules! impl_translated {
    ($($item:ty),+ $(,)?) => {
        $(
            impl Translated for $item {
                fn is_translated_for(&self, locales: &[Locale]) -> bool {
                    self.has_translations_for(locales)
                }
            }
        )+
    };
}

impl_translated!(RoundCi, SeasonCi, VenueCi, ConditionsCi, DelayedInfoCi);
