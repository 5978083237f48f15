//! Cache configuration
//!
//! Configuration is plain data with sensible defaults, builder-style setters
//! and a `validate()` pass, so it can be embedded in a larger service
//! configuration file and deserialized with serde.

use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How fetch failures are surfaced to accessor callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionHandlingStrategy {
    /// Wrap the failure in [`CacheError::ItemNotAvailable`](crate::CacheError::ItemNotAvailable)
    /// and return it from the accessor
    Throw,
    /// Record the failure, log it and return the best current value
    #[default]
    Catch,
}

/// Configuration shared by every item of a [`SportEventCache`](crate::SportEventCache)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Locale used by identity-level accessors that take no locale list
    pub default_locale: Locale,
    /// Failure propagation strategy
    pub exception_handling_strategy: ExceptionHandlingStrategy,
    /// Fixture requests bypass upstream caches while a recorded fixture
    /// change is younger than this
    pub fixture_change_window: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::english(),
            exception_handling_strategy: ExceptionHandlingStrategy::default(),
            fixture_change_window: Duration::from_secs(15 * 60), // 15 minutes
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default locale
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Set the failure propagation strategy
    pub fn with_exception_handling_strategy(mut self, strategy: ExceptionHandlingStrategy) -> Self {
        self.exception_handling_strategy = strategy;
        self
    }

    /// Set the fixture change window
    pub fn with_fixture_change_window(mut self, window: Duration) -> Self {
        self.fixture_change_window = window;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_locale.as_str().is_empty() {
            return Err("default_locale must not be empty".to_string());
        }

        if self.fixture_change_window.is_zero() {
            return Err("fixture_change_window must be greater than 0".to_string());
        }

        Ok(())
    }
}
