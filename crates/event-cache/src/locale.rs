//! Locale value type
//!
//! A [`Locale`] is a normalized language tag (`en`, `de`, `pt-br`). Lookups
//! against locale-keyed maps and trackers compare the normalized form, so
//! `EN` and `en` name the same translation.

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language/region identifier for which translated data may exist
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parse and normalize a language tag
    ///
    /// Underscores are folded to dashes and the tag is lowercased.
    pub fn parse(tag: &str) -> CacheResult<Self> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(CacheError::InvalidLocale(tag.to_string()));
        }

        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid || trimmed.starts_with(['-', '_']) || trimmed.ends_with(['-', '_']) {
            return Err(CacheError::InvalidLocale(tag.to_string()));
        }

        Ok(Self(trimmed.replace('_', "-").to_ascii_lowercase()))
    }

    /// English, the fallback locale of the remote source
    pub fn english() -> Self {
        Self("en".to_string())
    }

    /// The normalized tag
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// Locales from `required` that are not in `loaded`, in request order and
/// without duplicates
pub fn find_missing_locales(loaded: &[Locale], required: &[Locale]) -> Vec<Locale> {
    let mut missing: Vec<Locale> = Vec::with_capacity(required.len());
    for locale in required {
        if !loaded.contains(locale) && !missing.contains(locale) {
            missing.push(locale.clone());
        }
    }
    missing
}

/// Comma separated list used in log lines and error messages
pub fn locale_list_to_string(locales: &[Locale]) -> String {
    locales
        .iter()
        .map(Locale::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn locales(tags: &[&str]) -> Vec<Locale> {
        tags.iter().map(|t| Locale::parse(t).unwrap()).collect()
    }

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(Locale::parse("EN").unwrap().as_str(), "en");
        assert_eq!(Locale::parse(" pt_BR ").unwrap().as_str(), "pt-br");
        assert_eq!(Locale::parse("de").unwrap(), "DE".parse::<Locale>().unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for tag in ["", "  ", "en us", "-en", "de_", "fr!"] {
            assert!(Locale::parse(tag).is_err(), "{tag:?} should be rejected");
        }
    }

    #[test]
    fn test_missing_keeps_request_order() {
        let loaded = locales(&["en", "de"]);
        let required = locales(&["fr", "en", "it", "fr", "de"]);

        assert_eq!(find_missing_locales(&loaded, &required), locales(&["fr", "it"]));
        assert!(find_missing_locales(&loaded, &locales(&["de", "en"])).is_empty());
        assert!(find_missing_locales(&[], &[]).is_empty());
    }

    #[test]
    fn test_serde_as_string() {
        let locale = Locale::parse("en").unwrap();
        assert_eq!(serde_json::to_string(&locale).unwrap(), "\"en\"");
        let parsed: Locale = serde_json::from_str("\"DE\"").unwrap();
        assert_eq!(parsed.as_str(), "de");
        assert!(serde_json::from_str::<Locale>("\"\"").is_err());
    }

    #[test]
    fn test_list_to_string() {
        assert_eq!(locale_list_to_string(&locales(&["en", "de"])), "en, de");
    }
}
