//! Venue

use super::{contains_all, push_locale, put_translation};
use crate::dto::VenueData;
use crate::locale::Locale;
use crate::urn::Urn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Venue where the match takes place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueCi {
    id: Urn,
    names: HashMap<Locale, String>,
    city_names: HashMap<Locale, String>,
    country_names: HashMap<Locale, String>,
    capacity: Option<u32>,
    country_code: Option<String>,
    coordinates: Option<String>,
    state: Option<String>,
    cached_locales: Vec<Locale>,
}

impl VenueCi {
    pub fn new(data: &VenueData, locale: &Locale) -> Self {
        let mut venue = Self {
            id: data.id.clone(),
            names: HashMap::new(),
            city_names: HashMap::new(),
            country_names: HashMap::new(),
            capacity: None,
            country_code: None,
            coordinates: None,
            state: None,
            cached_locales: Vec::new(),
        };
        venue.merge(data, locale);
        venue
    }

    /// A venue change (different id) replaces every translation, since names
    /// of the old venue no longer apply
    pub fn merge(&mut self, data: &VenueData, locale: &Locale) {
        if data.id != self.id {
            *self = Self::new(data, locale);
            return;
        }

        put_translation(&mut self.names, locale, data.name.as_ref());
        put_translation(&mut self.city_names, locale, data.city_name.as_ref());
        put_translation(&mut self.country_names, locale, data.country_name.as_ref());

        if data.capacity.is_some() {
            self.capacity = data.capacity;
        }
        if data.country_code.is_some() {
            self.country_code.clone_from(&data.country_code);
        }
        if data.map_coordinates.is_some() {
            self.coordinates.clone_from(&data.map_coordinates);
        }
        if data.state.is_some() {
            self.state.clone_from(&data.state);
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

    pub fn city_name(&self, locale: &Locale) -> Option<&str> {
        self.city_names.get(locale).map(String::as_str)
    }

    pub fn country_name(&self, locale: &Locale) -> Option<&str> {
        self.country_names.get(locale).map(String::as_str)
    }

    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn coordinates(&self) -> Option<&str> {
        self.coordinates.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn cached_locales(&self) -> &[Locale] {
        &self.cached_locales
    }
}
