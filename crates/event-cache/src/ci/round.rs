//! Tournament round

use super::{contains_all, push_locale, put_translation};
use crate::dto::RoundData;
use crate::locale::Locale;
use crate::urn::Urn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Round of the tournament the match belongs to
///
/// Scalar fields are last-write-wins; names are kept per locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundCi {
    names: HashMap<Locale, String>,
    phase_or_group_long_names: HashMap<Locale, String>,
    round_type: Option<String>,
    group: Option<String>,
    group_id: Option<Urn>,
    other_match_id: Option<String>,
    number: Option<i32>,
    cup_round_matches: Option<i32>,
    cup_round_match_number: Option<i32>,
    betradar_id: Option<i32>,
    phase: Option<String>,
    cached_locales: Vec<Locale>,
}

impl RoundCi {
    pub fn new(data: &RoundData, locale: &Locale) -> Self {
        let mut round = Self {
            names: HashMap::new(),
            phase_or_group_long_names: HashMap::new(),
            round_type: None,
            group: None,
            group_id: None,
            other_match_id: None,
            number: None,
            cup_round_matches: None,
            cup_round_match_number: None,
            betradar_id: None,
            phase: None,
            cached_locales: Vec::new(),
        };
        round.merge(data, locale);
        round
    }

    pub fn merge(&mut self, data: &RoundData, locale: &Locale) {
        self.round_type.clone_from(&data.round_type);
        self.group.clone_from(&data.group);
        self.group_id.clone_from(&data.group_id);
        self.other_match_id.clone_from(&data.other_match_id);
        self.number = data.number;
        self.cup_round_matches = data.cup_round_matches;
        self.cup_round_match_number = data.cup_round_match_number;
        self.betradar_id = data.betradar_id;
        self.phase.clone_from(&data.phase);

        put_translation(&mut self.names, locale, data.name.as_ref());
        if let Some(long_name) = &data.group_long_name {
            self.phase_or_group_long_names
                .insert(locale.clone(), long_name.clone());
        }

        push_locale(&mut self.cached_locales, locale);
    }

    pub fn has_translations_for(&self, locales: &[Locale]) -> bool {
        contains_all(&self.cached_locales, locales)
    }

    pub fn name(&self, locale: &Locale) -> Option<&str> {
        self.names.get(locale).map(String::as_str)
    }

    pub fn names(&self) -> &HashMap<Locale, String> {
        &self.names
    }

    pub fn phase_or_group_long_name(&self, locale: &Locale) -> Option<&str> {
        self.phase_or_group_long_names.get(locale).map(String::as_str)
    }

    pub fn round_type(&self) -> Option<&str> {
        self.round_type.as_deref()
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn group_id(&self) -> Option<&Urn> {
        self.group_id.as_ref()
    }

    pub fn other_match_id(&self) -> Option<&str> {
        self.other_match_id.as_deref()
    }

    pub fn number(&self) -> Option<i32> {
        self.number
    }

    pub fn cup_round_matches(&self) -> Option<i32> {
        self.cup_round_matches
    }

    pub fn cup_round_match_number(&self) -> Option<i32> {
        self.cup_round_match_number
    }

    pub fn betradar_id(&self) -> Option<i32> {
        self.betradar_id
    }

    pub fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    pub fn cached_locales(&self) -> &[Locale] {
        &self.cached_locales
    }
}
