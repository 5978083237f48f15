//! Fixture view
//!
//! A fixture is the arranged time and place of a match. The view is rebuilt
//! from every fixture payload; it carries no translations of its own.

use crate::dto::{FixtureData, ProducerInfoData};
use crate::urn::Urn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvChannelCi {
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub stream_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerLinkCi {
    pub name: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingChannelCi {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerInfoCi {
    pub is_auto_traded: bool,
    pub is_in_hosted_statistics: bool,
    pub is_in_live_center_soccer: bool,
    pub is_in_live_score: bool,
    pub links: Vec<ProducerLinkCi>,
    pub streaming_channels: Vec<StreamingChannelCi>,
}

impl From<&ProducerInfoData> for ProducerInfoCi {
    fn from(data: &ProducerInfoData) -> Self {
        Self {
            is_auto_traded: data.is_auto_traded,
            is_in_hosted_statistics: data.is_in_hosted_statistics,
            is_in_live_center_soccer: data.is_in_live_center_soccer,
            is_in_live_score: data.is_in_live_score,
            links: data
                .links
                .iter()
                .map(|link| ProducerLinkCi {
                    name: link.name.clone(),
                    reference: link.reference.clone(),
                })
                .collect(),
            streaming_channels: data
                .streaming_channels
                .iter()
                .map(|channel| StreamingChannelCi {
                    id: channel.id,
                    name: channel.name.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureCi {
    pub start_time: Option<DateTime<Utc>>,
    pub start_time_confirmed: Option<bool>,
    pub start_time_tbd: Option<bool>,
    pub next_live_time: Option<DateTime<Utc>>,
    pub replaced_by: Option<Urn>,
    pub extra_info: HashMap<String, String>,
    pub tv_channels: Vec<TvChannelCi>,
    pub references: HashMap<String, String>,
    pub producer_info: Option<ProducerInfoCi>,
}

impl From<&FixtureData> for FixtureCi {
    fn from(data: &FixtureData) -> Self {
        Self {
            start_time: data.start_time,
            start_time_confirmed: data.start_time_confirmed,
            start_time_tbd: data.sport_event.start_time_tbd,
            next_live_time: data.next_live_time,
            replaced_by: data.sport_event.replaced_by.clone(),
            extra_info: data.extra_info.clone(),
            tv_channels: data
                .tv_channels
                .iter()
                .map(|channel| TvChannelCi {
                    name: channel.name.clone(),
                    start_time: channel.start_time,
                    stream_url: channel.stream_url.clone(),
                })
                .collect(),
            references: data.references.clone(),
            producer_info: data.producer_info.as_ref().map(ProducerInfoCi::from),
        }
    }
}
