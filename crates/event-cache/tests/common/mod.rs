//! Shared helpers for integration tests: a scripted, counting loader.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use event_cache::prelude::*;
use event_cache::dto::CompetitorData;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// One recorded loader invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub class: RequestClass,
    pub locale: Locale,
    pub id: Urn,
    pub force_refresh: bool,
}

type Responder = dyn Fn(RequestClass, &Locale, &Urn) -> Payload + Send + Sync;

/// Loader answering from a closure, recording every call
pub struct MockLoader {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Locale>>,
    muted: Mutex<HashSet<Locale>>,
    delay: Duration,
    responder: Box<Responder>,
}

impl MockLoader {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(RequestClass, &Locale, &Urn) -> Payload + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            muted: Mutex::new(HashSet::new()),
            delay: Duration::ZERO,
            responder: Box::new(responder),
        }
    }

    /// Loader answering every class with the payload built by `sport_event`
    pub fn summaries() -> Self {
        Self::new(|class, locale, id| match class {
            RequestClass::Fixture => {
                Payload::Fixture(FixtureData::new(sport_event(id, locale)))
            }
            RequestClass::Timeline => {
                Payload::Timeline(TimelineData::new(sport_event(id, locale)))
            }
            RequestClass::Summary | RequestClass::Competitors => summary_payload(id, locale),
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_locale(&self, locale: &Locale) {
        self.failing.lock().insert(locale.clone());
    }

    pub fn heal_locale(&self, locale: &Locale) {
        self.failing.lock().remove(locale);
    }

    /// Answer `Ok` for `locale` without delivering anything
    pub fn mute_locale(&self, locale: &Locale) {
        self.muted.lock().insert(locale.clone());
    }

    pub fn unmute_locale(&self, locale: &Locale) {
        self.muted.lock().remove(locale);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, class: RequestClass, locale: &Locale) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.class == class && &call.locale == locale)
            .count()
    }
}

impl Loader for MockLoader {
    fn request(
        &self,
        class: RequestClass,
        locale: &Locale,
        id: &Urn,
        force_refresh: bool,
        receiver: &dyn DataReceiver,
    ) -> CacheResult<()> {
        self.calls.lock().push(Call {
            class,
            locale: locale.clone(),
            id: id.clone(),
            force_refresh,
        });

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if self.failing.lock().contains(locale) {
            return Err(CacheError::CommunicationFailure(format!(
                "connection reset while fetching {class} for {id} in {locale}"
            )));
        }

        if self.muted.lock().contains(locale) {
            return Ok(());
        }

        receiver.merge((self.responder)(class, locale, id), locale)
    }
}

/// Route crate logs to the test output; `RUST_LOG` overrides the filter
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("event_cache=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn locale(tag: &str) -> Locale {
    Locale::parse(tag).expect("valid locale")
}

pub fn match_urn(id: i64) -> Urn {
    Urn::new("sr", "match", id).expect("valid urn")
}

pub fn competitor(id: i64, name: &str, qualifier: &str) -> CompetitorData {
    CompetitorData {
        name: Some(name.to_string()),
        qualifier: Some(qualifier.to_string()),
        ..CompetitorData::new(Urn::new("sr", "competitor", id).expect("valid urn"))
    }
}

/// "Team A vs Team B" in English, "Team A gegen Team B" in German, the
/// locale tag elsewhere
pub fn match_name(locale: &Locale) -> String {
    match locale.as_str() {
        "en" => "Team A vs Team B".to_string(),
        "de" => "Team A gegen Team B".to_string(),
        other => format!("Team A - Team B ({other})"),
    }
}

pub fn sport_event(id: &Urn, locale: &Locale) -> SportEventData {
    SportEventData {
        name: Some(match_name(locale)),
        scheduled: Some("2026-05-01T18:30:00Z".parse().expect("valid timestamp")),
        competitors: Some(vec![
            competitor(1, "Team A", "home"),
            competitor(2, "Team B", "away"),
        ]),
        live_odds: Some("bookable".to_string()),
        ..SportEventData::new(id.clone())
    }
}

pub fn summary_payload(id: &Urn, locale: &Locale) -> Payload {
    Payload::Summary(SummaryData::new(sport_event(id, locale)))
}

pub fn cache_with(loader: &Arc<MockLoader>, strategy: ExceptionHandlingStrategy) -> SportEventCache {
    let config = CacheConfig::default().with_exception_handling_strategy(strategy);
    SportEventCache::new(Arc::clone(loader) as Arc<dyn Loader>, config).expect("valid config")
}
