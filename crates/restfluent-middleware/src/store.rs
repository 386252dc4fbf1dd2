//! Counter storage for rate limiting.
//!
//! The store is an external key/value service with get/set/expire semantics.
//! No transactional guarantee is required: a read-then-write race between
//! concurrent requests may overshoot the ceiling slightly.

use crate::middleware::BoxFuture;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Entry count at which [`InMemoryCounterStore`] first sweeps expired keys.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 1024;

/// Key/value store holding request counters.
pub trait CounterStore: Send + Sync + 'static {
    /// Returns the live counter for `key`, or `None` if absent or expired.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<u64>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    fn set<'a>(&'a self, key: &'a str, value: u64, ttl: Duration) -> BoxFuture<'a, ()>;
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: u64,
    /// `None` when the TTL is too large to represent; never expires.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-local counter store.
///
/// Expired entries are dropped on read, and swept from the whole map on write
/// once the entry count reaches a high-water mark. After each sweep the mark
/// is reset to twice the surviving count, but never below the threshold.
#[derive(Debug)]
pub struct InMemoryCounterStore {
    entries: DashMap<String, Entry>,
    sweep_threshold: usize,
    high_water: AtomicUsize,
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }
}

impl InMemoryCounterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that sweeps once it holds `threshold` entries.
    #[must_use]
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            entries: DashMap::new(),
            sweep_threshold: threshold,
            high_water: AtomicUsize::new(threshold),
        }
    }

    /// Drops every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Returns the number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn read(&self, key: &str) -> Option<u64> {
        let now = Instant::now();
        let live = self
            .entries
            .get(key)
            .map(|entry| (entry.value, entry.is_live(now)))?;

        match live {
            (value, true) => Some(value),
            (_, false) => {
                self.entries.remove_if(key, |_, entry| !entry.is_live(now));
                None
            }
        }
    }

    fn write(&self, key: &str, value: u64, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });

        if self.entries.len() >= self.high_water.load(Ordering::Relaxed) {
            self.purge_expired();
            let mark = (self.entries.len() * 2).max(self.sweep_threshold);
            self.high_water.store(mark, Ordering::Relaxed);
        }
    }
}

impl CounterStore for InMemoryCounterStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<u64>> {
        let value = self.read(key);
        Box::pin(async move { value })
    }

    fn set<'a>(&'a self, key: &'a str, value: u64, ttl: Duration) -> BoxFuture<'a, ()> {
        self.write(key, value, ttl);
        Box::pin(async {})
    }
}
