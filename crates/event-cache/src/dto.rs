//! Payload data pushed into cache items by the loader
//!
//! Parsing raw endpoint responses happens upstream; by the time data reaches
//! this crate it is one of the closed set of [`Payload`] variants. Each
//! variant has exactly one merge handler in [`crate::merge`].
//!
//! Identifiers are already typed. What the type system cannot express is
//! checked by [`Payload::validate`], which the merge engine runs before it
//! touches any state.

#![allow(missing_docs)]

use crate::error::{CacheError, CacheResult};
use crate::tracker::RequestClass;
use crate::urn::Urn;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Stage type of a sport event as reported by the remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    Parent,
    Child,
    Event,
    Season,
    Round,
    CompetitionGroup,
    Discipline,
    Race,
    Stage,
    Practice,
    Qualifying,
    QualifyingPart,
    Lap,
    Run,
    #[serde(other)]
    Unknown,
}

/// Position of a sport event in a parent/child hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportEventType {
    Parent,
    Child,
    #[serde(other)]
    Unknown,
}

/// Match status carried by timeline payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    NotStarted,
    Live,
    Suspended,
    Ended,
    Closed,
    Cancelled,
    Delayed,
    Interrupted,
    Postponed,
    Abandoned,
    #[serde(other)]
    Unknown,
}

impl EventStatus {
    /// No further timeline events can appear once the event reached this status
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Ended | Self::Closed)
    }
}

/// Basic facts about a sport event, shared by most endpoint responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportEventData {
    pub id: Urn,
    pub name: Option<String>,
    pub scheduled: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub start_time_tbd: Option<bool>,
    pub replaced_by: Option<Urn>,
    pub tournament_id: Option<Urn>,
    pub tournament_round: Option<RoundData>,
    pub season: Option<SeasonData>,
    pub venue: Option<VenueData>,
    /// `None` means the payload carried no roster at all; an empty list is a
    /// roster with no competitors
    pub competitors: Option<Vec<CompetitorData>>,
    pub live_odds: Option<String>,
    pub stage_type: Option<StageType>,
    pub event_type: Option<SportEventType>,
}

impl SportEventData {
    /// Payload carrying nothing but the identifier
    pub fn new(id: Urn) -> Self {
        Self {
            id,
            name: None,
            scheduled: None,
            scheduled_end: None,
            start_time_tbd: None,
            replaced_by: None,
            tournament_id: None,
            tournament_round: None,
            season: None,
            venue: None,
            competitors: None,
            live_odds: None,
            stage_type: None,
            event_type: None,
        }
    }

    fn validate(&self) -> CacheResult<()> {
        if let (Some(start), Some(end)) = (self.scheduled, self.scheduled_end)
            && end < start
        {
            return Err(CacheError::Malformed(format!(
                "{}: scheduled end {end} precedes scheduled start {start}",
                self.id
            )));
        }

        if let Some(competitors) = &self.competitors {
            let mut seen = HashSet::with_capacity(competitors.len());
            for competitor in competitors {
                if !seen.insert(&competitor.id) {
                    return Err(CacheError::Malformed(format!(
                        "{}: competitor {} listed twice",
                        self.id, competitor.id
                    )));
                }
            }
        }

        if let Some(round) = &self.tournament_round
            && let (Some(number), Some(matches)) =
                (round.cup_round_match_number, round.cup_round_matches)
            && number > matches
        {
            return Err(CacheError::Malformed(format!(
                "{}: cup round match {number} of {matches}",
                self.id
            )));
        }

        Ok(())
    }
}

/// Tournament round the event belongs to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundData {
    pub name: Option<String>,
    pub group_long_name: Option<String>,
    #[serde(rename = "type")]
    pub round_type: Option<String>,
    pub group: Option<String>,
    pub group_id: Option<Urn>,
    pub other_match_id: Option<String>,
    pub number: Option<i32>,
    pub cup_round_matches: Option<i32>,
    pub cup_round_match_number: Option<i32>,
    pub betradar_id: Option<i32>,
    pub phase: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonData {
    pub id: Urn,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub year: Option<String>,
    pub tournament_id: Option<Urn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueData {
    pub id: Urn,
    pub name: Option<String>,
    pub city_name: Option<String>,
    pub country_name: Option<String>,
    pub capacity: Option<u32>,
    pub country_code: Option<String>,
    pub map_coordinates: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorData {
    pub id: Urn,
    pub name: Option<String>,
    /// `home` / `away` for matches
    pub qualifier: Option<String>,
    pub division: Option<i32>,
    pub is_virtual: Option<bool>,
    #[serde(default)]
    pub references: HashMap<String, String>,
}

impl CompetitorData {
    pub fn new(id: Urn) -> Self {
        Self {
            id,
            name: None,
            qualifier: None,
            division: None,
            is_virtual: None,
            references: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedInfoData {
    pub id: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoverageInfoData {
    pub level: String,
    pub live_coverage: bool,
    #[serde(default)]
    pub includes: Vec<String>,
    pub covered_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeData {
    pub id: Urn,
    pub name: Option<String>,
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeatherInfoData {
    pub pitch: Option<String>,
    pub temperature_celsius: Option<i32>,
    pub weather_conditions: Option<String>,
    pub wind: Option<String>,
    pub wind_advantage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionsData {
    pub attendance: Option<String>,
    pub event_mode: Option<String>,
    pub referee: Option<RefereeData>,
    pub weather_info: Option<WeatherInfoData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvChannelData {
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub stream_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerLinkData {
    pub name: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingChannelData {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProducerInfoData {
    pub is_auto_traded: bool,
    pub is_in_hosted_statistics: bool,
    pub is_in_live_center_soccer: bool,
    pub is_in_live_score: bool,
    #[serde(default)]
    pub links: Vec<ProducerLinkData>,
    #[serde(default)]
    pub streaming_channels: Vec<StreamingChannelData>,
}

/// Fixture endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureData {
    pub sport_event: SportEventData,
    pub start_time: Option<DateTime<Utc>>,
    pub start_time_confirmed: Option<bool>,
    pub next_live_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extra_info: HashMap<String, String>,
    #[serde(default)]
    pub tv_channels: Vec<TvChannelData>,
    #[serde(default)]
    pub references: HashMap<String, String>,
    pub producer_info: Option<ProducerInfoData>,
    pub delayed_info: Option<DelayedInfoData>,
    pub coverage_info: Option<CoverageInfoData>,
}

impl FixtureData {
    pub fn new(sport_event: SportEventData) -> Self {
        Self {
            sport_event,
            start_time: None,
            start_time_confirmed: None,
            next_live_time: None,
            extra_info: HashMap::new(),
            tv_channels: Vec::new(),
            references: HashMap::new(),
            producer_info: None,
            delayed_info: None,
            coverage_info: None,
        }
    }
}

/// Summary endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    pub sport_event: SportEventData,
    pub conditions: Option<ConditionsData>,
    pub coverage_info: Option<CoverageInfoData>,
}

impl SummaryData {
    pub fn new(sport_event: SportEventData) -> Self {
        Self {
            sport_event,
            conditions: None,
            coverage_info: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEventData {
    pub id: i64,
    pub event_type: String,
    pub time: Option<DateTime<Utc>>,
    pub match_time: Option<i32>,
    pub match_clock: Option<String>,
    pub period_name: Option<String>,
    pub team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub value: Option<String>,
}

/// Timeline endpoint response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    pub sport_event: SportEventData,
    pub conditions: Option<ConditionsData>,
    pub coverage_info: Option<CoverageInfoData>,
    pub status: Option<EventStatus>,
    /// `None` when the response carried no timeline element
    pub events: Option<Vec<TimelineEventData>>,
}

impl TimelineData {
    pub fn new(sport_event: SportEventData) -> Self {
        Self {
            sport_event,
            conditions: None,
            coverage_info: None,
            status: None,
            events: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status.is_some_and(EventStatus::is_final)
    }
}

/// Entry of a parent event's child listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEventData {
    pub id: Urn,
    pub name: Option<String>,
    pub scheduled: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub start_time_tbd: Option<bool>,
    pub replaced_by: Option<Urn>,
    pub stage_type: Option<StageType>,
    pub event_type: Option<SportEventType>,
}

/// Closed set of payload variants a cache item can absorb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Identity / basic facts from a schedule or listing
    SportEvent(SportEventData),
    Fixture(FixtureData),
    Summary(SummaryData),
    Timeline(TimelineData),
    /// Summary entry from a parent's child listing
    ChildSummary(ChildEventData),
}

impl Payload {
    /// Identifier of the entity the payload describes
    pub fn entity_id(&self) -> &Urn {
        match self {
            Self::SportEvent(data) => &data.id,
            Self::Fixture(data) => &data.sport_event.id,
            Self::Summary(data) => &data.sport_event.id,
            Self::Timeline(data) => &data.sport_event.id,
            Self::ChildSummary(data) => &data.id,
        }
    }

    /// Request class whose tracker this payload completes, if any
    pub fn request_class(&self) -> Option<RequestClass> {
        match self {
            Self::Fixture(_) => Some(RequestClass::Fixture),
            Self::Summary(_) => Some(RequestClass::Summary),
            Self::Timeline(_) => Some(RequestClass::Timeline),
            Self::SportEvent(_) | Self::ChildSummary(_) => None,
        }
    }

    /// Structural checks run before merging into the item identified by
    /// `target`
    pub fn validate(&self, target: &Urn) -> CacheResult<()> {
        let id = self.entity_id();
        if id != target {
            return Err(CacheError::Malformed(format!(
                "payload for {id} offered to {target}"
            )));
        }

        match self {
            Self::SportEvent(data) => data.validate(),
            Self::Fixture(data) => data.sport_event.validate(),
            Self::Summary(data) => data.sport_event.validate(),
            Self::Timeline(data) => {
                data.sport_event.validate()?;
                if let Some(events) = &data.events {
                    let mut seen = HashSet::with_capacity(events.len());
                    for event in events {
                        if !seen.insert(event.id) {
                            return Err(CacheError::Malformed(format!(
                                "{id}: timeline event {} listed twice",
                                event.id
                            )));
                        }
                    }
                }
                Ok(())
            }
            Self::ChildSummary(data) => {
                if let (Some(start), Some(end)) = (data.scheduled, data.scheduled_end)
                    && end < start
                {
                    return Err(CacheError::Malformed(format!(
                        "{id}: scheduled end {end} precedes scheduled start {start}"
                    )));
                }
                Ok(())
            }
        }
    }
}
