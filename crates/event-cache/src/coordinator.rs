//! Fetch coordination
//!
//! One lock per request class of one item. A fetch for the locales missing
//! from a class tracker works like this:
//!
//! 1. compute the missing locales without locking; done if none
//! 2. take the class lock and compute them again, another caller may have
//!    fetched them while this one waited
//! 3. fetch the remaining locales one by one, marking each as loaded as soon
//!    as its payload is merged
//!
//! So concurrent callers wanting the same locale collapse into a single remote
//! call, and a failure on one locale keeps what earlier locales delivered.
//! Callers for other classes or other items never wait on each other.

use crate::error::CacheError;
use crate::locale::{Locale, locale_list_to_string};
use crate::tracker::{LocaleTracker, RequestClass};
use crate::urn::Urn;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

/// Result of one `ensure_loaded` pass
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// False when the tracker already held every locale, with or without the
    /// lock
    pub attempted: bool,
    /// Locales fetched and marked loaded in this pass
    pub fetched: Vec<Locale>,
    /// Locales that failed, in fetch order; they stay unmarked
    pub failures: Vec<(Locale, CacheError)>,
}

impl FetchOutcome {
    /// True when no locale failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Locales that failed, in fetch order
    pub fn failed_locales(&self) -> Vec<Locale> {
        self.failures.iter().map(|(locale, _)| locale.clone()).collect()
    }
}

/// Per-class fetch locks of a single cache item
#[derive(Debug)]
pub struct FetchCoordinator {
    id: Urn,
    locks: [Mutex<()>; 4],
}

impl FetchCoordinator {
    /// Locks for the item identified by `id`
    pub fn new(id: Urn) -> Self {
        Self {
            id,
            locks: Default::default(),
        }
    }

    /// Hold the lock of `class` for work that does not fit `ensure_loaded`
    pub fn lock(&self, class: RequestClass) -> MutexGuard<'_, ()> {
        self.locks[class.index()].lock()
    }

    /// Make sure `tracker` holds every locale in `required`
    ///
    /// `fetch` is called once per missing locale, sequentially, while the class
    /// lock is held. With `force` set every required locale is fetched again
    /// even if already loaded.
    pub fn ensure_loaded<F>(
        &self,
        tracker: &LocaleTracker,
        class: RequestClass,
        required: &[Locale],
        force: bool,
        fetch: F,
    ) -> FetchOutcome
    where
        F: FnMut(&Locale) -> Result<(), CacheError>,
    {
        if !force && tracker.is_complete(required) {
            trace!(id = %self.id, class = %class, "All locales already loaded");
            return FetchOutcome::default();
        }

        let _guard = self.lock(class);

        let pending = if force {
            let mut pending: Vec<Locale> = Vec::with_capacity(required.len());
            for locale in required {
                if !pending.contains(locale) {
                    pending.push(locale.clone());
                }
            }
            pending
        } else {
            tracker.missing(required)
        };

        if pending.is_empty() {
            trace!(id = %self.id, class = %class, "Locales loaded while waiting for lock");
            return FetchOutcome::default();
        }

        self.fetch_locales(tracker, class, &pending, fetch)
    }

    fn fetch_locales<F>(
        &self,
        tracker: &LocaleTracker,
        class: RequestClass,
        pending: &[Locale],
        mut fetch: F,
    ) -> FetchOutcome
    where
        F: FnMut(&Locale) -> Result<(), CacheError>,
    {
        debug!(
            id = %self.id,
            class = %class,
            locales = %locale_list_to_string(pending),
            "Fetching missing locales"
        );

        let mut outcome = FetchOutcome {
            attempted: true,
            ..FetchOutcome::default()
        };

        for locale in pending {
            match fetch(locale) {
                Ok(()) => {
                    tracker.mark_loaded(locale);
                    outcome.fetched.push(locale.clone());
                }
                Err(e) => {
                    debug!(id = %self.id, class = %class, locale = %locale, error = %e, "Fetch failed");
                    outcome.failures.push((locale.clone(), e));
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn locales(tags: &[&str]) -> Vec<Locale> {
        tags.iter().map(|tag| Locale::parse(tag).unwrap()).collect()
    }

    fn coordinator() -> FetchCoordinator {
        FetchCoordinator::new(Urn::parse("sr:match:1").unwrap())
    }

    #[test]
    fn test_fast_path_skips_fetch() {
        let coordinator = coordinator();
        let tracker = LocaleTracker::from_locales(locales(&["en", "de"]));

        let outcome = coordinator.ensure_loaded(
            &tracker,
            RequestClass::Summary,
            &locales(&["de"]),
            false,
            |_| panic!("nothing to fetch"),
        );

        assert!(!outcome.attempted);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_fetches_only_missing() {
        let coordinator = coordinator();
        let tracker = LocaleTracker::from_locales(locales(&["en"]));
        let mut seen = Vec::new();

        let outcome = coordinator.ensure_loaded(
            &tracker,
            RequestClass::Summary,
            &locales(&["en", "de", "fr"]),
            false,
            |locale| {
                seen.push(locale.clone());
                Ok(())
            },
        );

        assert_eq!(seen, locales(&["de", "fr"]));
        assert_eq!(outcome.fetched, locales(&["de", "fr"]));
        assert_eq!(tracker.locales(), locales(&["en", "de", "fr"]));
    }

    #[test]
    fn test_failure_keeps_other_locales() {
        let coordinator = coordinator();
        let tracker = LocaleTracker::new();

        let outcome = coordinator.ensure_loaded(
            &tracker,
            RequestClass::Fixture,
            &locales(&["en", "it", "de"]),
            false,
            |locale| {
                if locale.as_str() == "it" {
                    Err(CacheError::CommunicationFailure("timeout".into()))
                } else {
                    Ok(())
                }
            },
        );

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_locales(), locales(&["it"]));
        assert_eq!(tracker.locales(), locales(&["en", "de"]));
        assert!(!tracker.contains(&Locale::parse("it").unwrap()));
    }

    #[test]
    fn test_force_refetches_loaded() {
        let coordinator = coordinator();
        let tracker = LocaleTracker::from_locales(locales(&["en"]));
        let mut calls = 0;

        let outcome = coordinator.ensure_loaded(
            &tracker,
            RequestClass::Summary,
            &locales(&["en", "en"]),
            true,
            |_| {
                calls += 1;
                Ok(())
            },
        );

        assert_eq!(calls, 1);
        assert!(outcome.attempted);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_concurrent_callers_fetch_once() {
        const THREADS: usize = 8;

        let coordinator = Arc::new(coordinator());
        let tracker = Arc::new(LocaleTracker::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let coordinator = Arc::clone(&coordinator);
                let tracker = Arc::clone(&tracker);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    coordinator.ensure_loaded(
                        &tracker,
                        RequestClass::Summary,
                        &locales(&["fr"]),
                        false,
                        |_| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok(())
                        },
                    )
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_success());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_classes_do_not_block_each_other() {
        let coordinator = coordinator();
        let _fixture = coordinator.lock(RequestClass::Fixture);
        let tracker = LocaleTracker::new();

        let outcome = coordinator.ensure_loaded(
            &tracker,
            RequestClass::Summary,
            &locales(&["en"]),
            false,
            |_| Ok(()),
        );

        assert_eq!(outcome.fetched, locales(&["en"]));
    }
}
