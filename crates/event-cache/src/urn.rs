//! Entity identifiers
//!
//! Every cached entity is keyed by a [`Urn`] of the form `prefix:type:id`,
//! e.g. `sr:match:12345` or `sr:venue:42`. The string form is what snapshots
//! carry.

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, immutable identifier of a cached entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn {
    prefix: String,
    entity_type: String,
    id: i64,
}

impl Urn {
    /// Build an identifier from its parts
    pub fn new(prefix: &str, entity_type: &str, id: i64) -> CacheResult<Self> {
        if !is_segment(prefix) || !is_segment(entity_type) {
            return Err(CacheError::InvalidUrn(format!("{prefix}:{entity_type}:{id}")));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            entity_type: entity_type.to_string(),
            id,
        })
    }

    /// Parse `prefix:type:id`
    pub fn parse(value: &str) -> CacheResult<Self> {
        let mut parts = value.splitn(3, ':');
        let (Some(prefix), Some(entity_type), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CacheError::InvalidUrn(value.to_string()));
        };

        let id = id
            .parse::<i64>()
            .map_err(|_| CacheError::InvalidUrn(value.to_string()))?;
        Self::new(prefix, entity_type, id).map_err(|_| CacheError::InvalidUrn(value.to_string()))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.prefix, self.entity_type, self.id)
    }
}

impl FromStr for Urn {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Urn {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.to_string()
    }
}
