//! Delay information

use super::{contains_all, push_locale, put_translation};
use crate::dto::DelayedInfoData;
use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedInfoCi {
    id: i32,
    descriptions: HashMap<Locale, String>,
    cached_locales: Vec<Locale>,
}

impl DelayedInfoCi {
    pub fn new(data: &DelayedInfoData, locale: &Locale) -> Self {
        let mut info = Self {
            id: data.id,
            descriptions: HashMap::new(),
            cached_locales: Vec::new(),
        };
        info.merge(data, locale);
        info
    }

    pub fn merge(&mut self, data: &DelayedInfoData, locale: &Locale) {
        if data.id != self.id {
            self.id = data.id;
            self.descriptions.clear();
            self.cached_locales.clear();
        }
        put_translation(&mut self.descriptions, locale, data.description.as_ref());
        push_locale(&mut self.cached_locales, locale);
    }

    pub fn has_translations_for(&self, locales: &[Locale]) -> bool {
        contains_all(&self.cached_locales, locales)
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn description(&self, locale: &Locale) -> Option<&str> {
        self.descriptions.get(locale).map(String::as_str)
    }

    pub fn cached_locales(&self) -> &[Locale] {
        &self.cached_locales
    }
}
