//! Season

use super::{contains_all, push_locale, put_translation};
use crate::dto::SeasonData;
use crate::locale::Locale;
use crate::urn::Urn;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCi {
    id: Urn,
    names: HashMap<Locale, String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    year: Option<String>,
    tournament_id: Option<Urn>,
    cached_locales: Vec<Locale>,
}

impl SeasonCi {
    pub fn new(data: &SeasonData, locale: &Locale) -> Self {
        let mut season = Self {
            id: data.id.clone(),
            names: HashMap::new(),
            start_date: None,
            end_date: None,
            year: None,
            tournament_id: None,
            cached_locales: Vec::new(),
        };
        season.merge(data, locale);
        season
    }

    pub fn merge(&mut self, data: &SeasonData, locale: &Locale) {
        if data.id != self.id {
            *self = Self::new(data, locale);
            return;
        }

        put_translation(&mut self.names, locale, data.name.as_ref());
        self.start_date = data.start_date.or(self.start_date);
        self.end_date = data.end_date.or(self.end_date);
        if data.year.is_some() {
            self.year.clone_from(&data.year);
        }
        if data.tournament_id.is_some() {
            self.tournament_id.clone_from(&data.tournament_id);
        }

        push_locale(&mut self.cached_locales, locale);
    }

    pub fn has_translations_for(&self, locales: &[Locale]) -> bool {
        contains_all(&self.cached_locales, locales)
    }

    pub fn id(&self) -> &Urn {
        &self.id
    }

    pub fn name(&self, locale: &Locale) -> Option<&str> {
        self.names.get(locale).map(String::as_str)
    }

    pub fn names(&self) -> &HashMap<Locale, String> {
        &self.names
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn year(&self) -> Option<&str> {
        self.year.as_deref()
    }

    pub fn tournament_id(&self) -> Option<&Urn> {
        self.tournament_id.as_ref()
    }

    pub fn cached_locales(&self) -> &[Locale] {
        &self.cached_locales
    }
}
