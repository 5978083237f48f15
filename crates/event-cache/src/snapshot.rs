//! Snapshot export and import
//!
//! A [`MatchSnapshot`] is a plain serde value holding everything a match item
//! knows, including the loaded locales of every request class. Importing it
//! gives an item that answers every accessor exactly as the exported one did
//! and does not fetch locales that were already loaded.
//!
//! [`CacheSnapshot`] bundles the snapshots of a whole cache into one JSON
//! document on disk.

use crate::ci::{
    BookingStatus, CompetitorRoster, ConditionsCi, CoverageInfoCi, DelayedInfoCi, FixtureCi,
    RoundCi, SeasonCi, TimelineCi, VenueCi,
};
use crate::dto::{SportEventType, StageType};
use crate::error::{CacheError, CacheResult};
use crate::locale::Locale;
use crate::merge::MatchState;
use crate::tracker::RequestClass;
use crate::urn::Urn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Exported state of one match item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub id: Urn,
    pub default_locale: Locale,
    #[serde(default)]
    pub names: BTreeMap<Locale, String>,
    pub scheduled: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub start_time_tbd: Option<bool>,
    pub replaced_by: Option<Urn>,
    pub tournament_id: Option<Urn>,
    pub tournament_round: Option<RoundCi>,
    pub season: Option<SeasonCi>,
    pub venue: Option<VenueCi>,
    pub conditions: Option<ConditionsCi>,
    pub competitors: Option<CompetitorRoster>,
    pub booking_status: Option<BookingStatus>,
    pub live_odds: Option<String>,
    pub stage_type: Option<StageType>,
    pub event_type: Option<SportEventType>,
    pub fixture: Option<FixtureCi>,
    pub delayed_info: Option<DelayedInfoCi>,
    pub coverage_info: Option<CoverageInfoCi>,
    #[serde(default)]
    pub timelines: BTreeMap<Locale, TimelineCi>,
    /// Loaded locales of every request class, in load order
    #[serde(default)]
    pub loaded_locales: BTreeMap<RequestClass, Vec<Locale>>,
}

impl MatchSnapshot {
    pub(crate) fn from_state(
        id: &Urn,
        default_locale: &Locale,
        state: &MatchState,
        loaded_locales: BTreeMap<RequestClass, Vec<Locale>>,
    ) -> Self {
        Self {
            id: id.clone(),
            default_locale: default_locale.clone(),
            names: state
                .names
                .iter()
                .map(|(locale, name)| (locale.clone(), name.clone()))
                .collect(),
            scheduled: state.scheduled,
            scheduled_end: state.scheduled_end,
            start_time_tbd: state.start_time_tbd,
            replaced_by: state.replaced_by.clone(),
            tournament_id: state.tournament_id.clone(),
            tournament_round: state.tournament_round.clone(),
            season: state.season.clone(),
            venue: state.venue.clone(),
            conditions: state.conditions.clone(),
            competitors: state.competitors.clone(),
            booking_status: state.booking_status,
            live_odds: state.live_odds.clone(),
            stage_type: state.stage_type,
            event_type: state.event_type,
            fixture: state.fixture.clone(),
            delayed_info: state.delayed_info.clone(),
            coverage_info: state.coverage_info.clone(),
            timelines: state
                .timelines
                .iter()
                .map(|(locale, timeline)| (locale.clone(), timeline.clone()))
                .collect(),
            loaded_locales,
        }
    }

    pub(crate) fn into_state(self) -> MatchState {
        MatchState {
            names: self.names.into_iter().collect(),
            scheduled: self.scheduled,
            scheduled_end: self.scheduled_end,
            start_time_tbd: self.start_time_tbd,
            replaced_by: self.replaced_by,
            tournament_id: self.tournament_id,
            tournament_round: self.tournament_round,
            season: self.season,
            venue: self.venue,
            conditions: self.conditions,
            competitors: self.competitors,
            booking_status: self.booking_status,
            live_odds: self.live_odds,
            stage_type: self.stage_type,
            event_type: self.event_type,
            fixture: self.fixture,
            delayed_info: self.delayed_info,
            coverage_info: self.coverage_info,
            timelines: self.timelines.into_iter().collect(),
        }
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> CacheResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> CacheResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// On-disk document holding the snapshots of every item of a cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Format version, see [`CacheSnapshot::VERSION`]
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub items: Vec<MatchSnapshot>,
}

impl CacheSnapshot {
    /// Current document format version
    pub const VERSION: u32 = 1;

    /// Document for `items`, stamped with the current time
    pub fn new(items: Vec<MatchSnapshot>) -> Self {
        Self {
            version: Self::VERSION,
            created_at: Utc::now(),
            items,
        }
    }

    /// Write the document to `path`
    ///
    /// The document is written next to `path` first and renamed into place,
    /// so a crash never leaves a truncated file behind.
    pub fn write_to(&self, path: &Path) -> CacheResult<()> {
        let temp_path = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&temp_path)?);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;

        debug!(path = %path.display(), items = self.items.len(), "Wrote cache snapshot");
        Ok(())
    }

    /// Read a document written by [`CacheSnapshot::write_to`]
    pub fn read_from(path: &Path) -> CacheResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: Self = serde_json::from_reader(reader)?;

        if snapshot.version != Self::VERSION {
            return Err(CacheError::Malformed(format!(
                "unsupported snapshot version {} in {}",
                snapshot.version,
                path.display()
            )));
        }

        debug!(path = %path.display(), items = snapshot.items.len(), "Read cache snapshot");
        Ok(snapshot)
    }
}
