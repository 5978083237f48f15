//! Competitor roster

use crate::dto::CompetitorData;
use crate::urn::Urn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Competitors participating in a match
///
/// Rosters are replaced wholesale by every payload that carries one: the
/// remote roster can shrink or be swapped entirely between fetches, so a
/// union with the previous value would resurrect stale competitors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompetitorRoster {
    ids: Vec<Urn>,
    qualifiers: HashMap<Urn, String>,
    divisions: HashMap<Urn, i32>,
    virtual_ids: Vec<Urn>,
    references: HashMap<Urn, HashMap<String, String>>,
}

impl CompetitorRoster {
    pub fn from_competitors(competitors: &[CompetitorData]) -> Self {
        let mut roster = Self {
            ids: Vec::with_capacity(competitors.len()),
            ..Self::default()
        };

        for competitor in competitors {
            let id = &competitor.id;
            roster.ids.push(id.clone());

            if let Some(qualifier) = &competitor.qualifier {
                roster.qualifiers.insert(id.clone(), qualifier.clone());
            }
            if let Some(division) = competitor.division {
                roster.divisions.insert(id.clone(), division);
            }
            if competitor.is_virtual == Some(true) {
                roster.virtual_ids.push(id.clone());
            }
            if !competitor.references.is_empty() {
                roster
                    .references
                    .insert(id.clone(), competitor.references.clone());
            }
        }

        roster
    }

    /// Ordered as delivered (home first for matches)
    pub fn ids(&self) -> &[Urn] {
        &self.ids
    }

    pub fn qualifiers(&self) -> &HashMap<Urn, String> {
        &self.qualifiers
    }

    pub fn divisions(&self) -> &HashMap<Urn, i32> {
        &self.divisions
    }

    pub fn virtual_ids(&self) -> &[Urn] {
        &self.virtual_ids
    }

    pub fn references(&self) -> &HashMap<Urn, HashMap<String, String>> {
        &self.references
    }
}
