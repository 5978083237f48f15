//! Match timeline
//!
//! Timelines are kept per locale and replaced by every timeline payload. A
//! finalized timeline (event ended) never changes again, so accessors may
//! serve it without asking the remote source.

use crate::dto::{TimelineData, TimelineEventData};
use crate::locale::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEventCi {
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

impl From<&TimelineEventData> for TimelineEventCi {
    fn from(data: &TimelineEventData) -> Self {
        Self {
            id: data.id,
            event_type: data.event_type.clone(),
            time: data.time,
            match_time: data.match_time,
            match_clock: data.match_clock.clone(),
            period_name: data.period_name.clone(),
            team: data.team.clone(),
            home_score: data.home_score,
            away_score: data.away_score,
            value: data.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineCi {
    locale: Locale,
    events: Vec<TimelineEventCi>,
    finalized: bool,
}

impl TimelineCi {
    /// `None` when the payload carried no timeline element
    pub fn from_data(data: &TimelineData, locale: &Locale) -> Option<Self> {
        let events = data.events.as_ref()?;
        Some(Self {
            locale: locale.clone(),
            events: events.iter().map(TimelineEventCi::from).collect(),
            finalized: data.is_finalized(),
        })
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Events ordered as delivered
    pub fn events(&self) -> &[TimelineEventCi] {
        &self.events
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
