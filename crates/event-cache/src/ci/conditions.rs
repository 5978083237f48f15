//! Live conditions of a match: attendance, referee, weather

use super::{contains_all, push_locale, put_translation};
use crate::dto::{ConditionsData, RefereeData, WeatherInfoData};
use crate::locale::Locale;
use crate::urn::Urn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeCi {
    id: Urn,
    name: Option<String>,
    nationalities: HashMap<Locale, String>,
}

impl RefereeCi {
    fn new(data: &RefereeData, locale: &Locale) -> Self {
        let mut referee = Self {
            id: data.id.clone(),
            name: None,
            nationalities: HashMap::new(),
        };
        referee.merge(data, locale);
        referee
    }

    fn merge(&mut self, data: &RefereeData, locale: &Locale) {
        if data.id != self.id {
            *self = Self::new(data, locale);
            return;
        }
        if data.name.is_some() {
            self.name.clone_from(&data.name);
        }
        put_translation(&mut self.nationalities, locale, data.nationality.as_ref());
    }

    pub fn id(&self) -> &Urn {
        &self.id
    }

    /// Referee names are not translated
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn nationality(&self, locale: &Locale) -> Option<&str> {
        self.nationalities.get(locale).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeatherInfoCi {
    pub pitch: Option<String>,
    pub temperature_celsius: Option<i32>,
    pub weather_conditions: Option<String>,
    pub wind: Option<String>,
    pub wind_advantage: Option<String>,
}

impl From<&WeatherInfoData> for WeatherInfoCi {
    fn from(data: &WeatherInfoData) -> Self {
        Self {
            pitch: data.pitch.clone(),
            temperature_celsius: data.temperature_celsius,
            weather_conditions: data.weather_conditions.clone(),
            wind: data.wind.clone(),
            wind_advantage: data.wind_advantage.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionsCi {
    attendance: Option<String>,
    event_mode: Option<String>,
    referee: Option<RefereeCi>,
    weather_info: Option<WeatherInfoCi>,
    cached_locales: Vec<Locale>,
}

impl ConditionsCi {
    pub fn new(data: &ConditionsData, locale: &Locale) -> Self {
        let mut conditions = Self {
            attendance: None,
            event_mode: None,
            referee: None,
            weather_info: None,
            cached_locales: Vec::new(),
        };
        conditions.merge(data, locale);
        conditions
    }

    pub fn merge(&mut self, data: &ConditionsData, locale: &Locale) {
        self.attendance.clone_from(&data.attendance);
        self.event_mode.clone_from(&data.event_mode);

        if let Some(referee) = &data.referee {
            match &mut self.referee {
                Some(existing) => existing.merge(referee, locale),
                None => self.referee = Some(RefereeCi::new(referee, locale)),
            }
        }
        if let Some(weather) = &data.weather_info {
            self.weather_info = Some(WeatherInfoCi::from(weather));
        }

        push_locale(&mut self.cached_locales, locale);
    }

    pub fn has_translations_for(&self, locales: &[Locale]) -> bool {
        contains_all(&self.cached_locales, locales)
    }

    pub fn attendance(&self) -> Option<&str> {
        self.attendance.as_deref()
    }

    pub fn event_mode(&self) -> Option<&str> {
        self.event_mode.as_deref()
    }

    pub fn referee(&self) -> Option<&RefereeCi> {
        self.referee.as_ref()
    }

    pub fn weather_info(&self) -> Option<&WeatherInfoCi> {
        self.weather_info.as_ref()
    }

    pub fn cached_locales(&self) -> &[Locale] {
        &self.cached_locales
    }
}
