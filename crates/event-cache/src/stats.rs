//! Fetch diagnostics
//!
//! Every cache item counts what its coordinator did. Failures swallowed under
//! the `Catch` strategy end up here (and in the log) instead of crossing the
//! item boundary.

#![allow(missing_docs)]

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Plain copy of a [`FetchStats`] at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStatsSnapshot {
    /// Loader calls, one per (class, locale)
    pub loader_invocations: u64,
    pub successful_fetches: u64,
    pub failed_fetches: u64,
    /// Accessor calls answered without taking a fetch lock
    pub fast_path_hits: u64,
    /// Accessor calls that returned `Ok` despite failed fetches
    pub swallowed_failures: u64,
    pub last_failure: Option<String>,
}

impl FetchStatsSnapshot {
    /// Fraction of loader calls that failed, 0.0 when nothing was fetched
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_rate(&self) -> f64 {
        if self.loader_invocations == 0 {
            0.0
        } else {
            self.failed_fetches as f64 / self.loader_invocations as f64
        }
    }
}

/// Thread-safe fetch counters
#[derive(Debug, Default)]
pub struct FetchStats {
    loader_invocations: AtomicU64,
    successful_fetches: AtomicU64,
    failed_fetches: AtomicU64,
    fast_path_hits: AtomicU64,
    swallowed_failures: AtomicU64,
    last_failure: Mutex<Option<String>>,
}

impl FetchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_fast_path(&self) {
        self.fast_path_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fetch(&self, succeeded: bool) {
        self.loader_invocations.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.successful_fetches.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_fetches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self, message: String) {
        *self.last_failure.lock() = Some(message);
    }

    #[inline]
    pub fn record_swallowed(&self) {
        self.swallowed_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FetchStatsSnapshot {
        FetchStatsSnapshot {
            loader_invocations: self.loader_invocations.load(Ordering::Relaxed),
            successful_fetches: self.successful_fetches.load(Ordering::Relaxed),
            failed_fetches: self.failed_fetches.load(Ordering::Relaxed),
            fast_path_hits: self.fast_path_hits.load(Ordering::Relaxed),
            swallowed_failures: self.swallowed_failures.load(Ordering::Relaxed),
            last_failure: self.last_failure.lock().clone(),
        }
    }
}
