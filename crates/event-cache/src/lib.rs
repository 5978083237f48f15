//! Locale-aware, demand-driven cache of sport event data
//!
//! The remote source publishes every match in many languages, one locale per
//! request, and spreads each match over several endpoints (summary, fixture,
//! timeline). This crate keeps one long-lived [`MatchCacheItem`] per match and
//! fills it on demand: accessors name the locales they need, the item fetches
//! only the ones it has not absorbed yet and merges each payload into what it
//! already holds.
//!
//! # Features
//!
//! - **Per-class locale tracking**: every request class records the locales it
//!   has loaded; a fully loaded request never takes a lock or touches I/O
//! - **Fetch coalescing**: concurrent callers wanting the same missing locale
//!   share a single loader call
//! - **Partial progress**: locales are fetched one by one, so one failure does
//!   not discard what the others delivered
//! - **Failure strategies**: failures are either returned as
//!   [`CacheError::ItemNotAvailable`] or logged and counted
//! - **Snapshots**: items export to plain serde values and import back without
//!   contacting the remote source
//!
//! # Architecture
//!
//! ```text
//! caller ──► MatchCacheItem accessor
//!                │ locales already loaded? ──► return current state
//!                ▼
//!            FetchCoordinator (lock per request class, recheck)
//!                │ one call per missing locale
//!                ▼
//!            Loader ──► DataReceiver::merge ──► merge engine ──► trackers
//! ```
//!
//! # Usage
//!
//! ```rust
//! use event_cache::prelude::*;
//! use std::sync::Arc;
//!
//! struct SummaryLoader;
//!
//! impl Loader for SummaryLoader {
//!     fn request(
//!         &self,
//!         _class: RequestClass,
//!         locale: &Locale,
//!         id: &Urn,
//!         _force_refresh: bool,
//!         receiver: &dyn DataReceiver,
//!     ) -> CacheResult<()> {
//!         let event = SportEventData {
//!             name: Some(format!("Home vs. Away ({locale})")),
//!             ..SportEventData::new(id.clone())
//!         };
//!         receiver.merge(Payload::Summary(SummaryData::new(event)), locale)
//!     }
//! }
//!
//! # fn main() -> CacheResult<()> {
//! let cache = SportEventCache::new(Arc::new(SummaryLoader), CacheConfig::default())?;
//! let item = cache.get_or_create(&Urn::parse("sr:match:1")?);
//!
//! let de = Locale::parse("de")?;
//! assert_eq!(item.name(&de)?.as_deref(), Some("Home vs. Away (de)"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::doc_markdown)] // Domain terms don't need backticks

pub mod cache;
pub mod ci;
pub mod config;
pub mod coordinator;
pub mod dto;
pub mod error;
pub mod loader;
pub mod locale;
pub mod match_item;
mod merge;
pub mod snapshot;
pub mod stats;
pub mod tracker;
pub mod urn;

pub use cache::{FixtureChanges, SportEventCache};
pub use config::{CacheConfig, ExceptionHandlingStrategy};
pub use coordinator::{FetchCoordinator, FetchOutcome};
pub use dto::Payload;
pub use error::{CacheError, CacheResult};
pub use loader::{DataReceiver, Loader};
pub use locale::Locale;
pub use match_item::{ItemContext, MatchCacheItem};
pub use snapshot::{CacheSnapshot, MatchSnapshot};
pub use stats::{FetchStats, FetchStatsSnapshot};
pub use tracker::{LoadedLocales, LocaleTracker, RequestClass};
pub use urn::Urn;

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits

    pub use crate::{
        // Cache and items
        MatchCacheItem,
        SportEventCache,
        // Configuration
        CacheConfig,
        ExceptionHandlingStrategy,
        // Errors
        CacheError,
        CacheResult,
        // Loader seam
        DataReceiver,
        Loader,
        // Keys
        Locale,
        RequestClass,
        Urn,
        // Snapshots
        MatchSnapshot,
        dto::{
            ChildEventData, FixtureData, Payload, SportEventData, SummaryData, TimelineData,
        },
    };
}
