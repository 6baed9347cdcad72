// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cached::{Cached, TimedCache};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::models::{CategoryTotal, DailyTotal, Summary, Transaction};

/// The read-side queries that are memoized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Transactions,
    Summary,
    Categories,
    Daily,
}

impl Accessor {
    pub const ALL: [Accessor; 4] = [
        Accessor::Transactions,
        Accessor::Summary,
        Accessor::Categories,
        Accessor::Daily,
    ];
}

/// A cached value, tagged by the accessor that produced it.
#[derive(Debug, Clone)]
pub enum Aggregate {
    Transactions(Vec<Transaction>),
    Summary(Summary),
    Categories(Vec<CategoryTotal>),
    Daily(Vec<DailyTotal>),
}

impl Aggregate {
    pub fn accessor(&self) -> Accessor {
        match self {
            Aggregate::Transactions(_) => Accessor::Transactions,
            Aggregate::Summary(_) => Accessor::Summary,
            Aggregate::Categories(_) => Accessor::Categories,
            Aggregate::Daily(_) => Accessor::Daily,
        }
    }
}

type CacheKey = (Accessor, String);

/// Process-wide read-through cache keyed by `(accessor, user_id)`.
///
/// Entries expire `ttl` after they were computed. Writers call
/// [`AggregateCache::invalidate`] so the next read for that user recomputes.
/// A poisoned lock is treated as a miss.
pub struct AggregateCache {
    ttl: Duration,
    store: Mutex<TimedCache<CacheKey, Aggregate>>,
}

impl AggregateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: Mutex::new(TimedCache::with_lifespan(ttl.as_secs())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the live entry for `(accessor, user_id)` or runs `compute`
    /// and stores its result with a fresh TTL. Errors are passed through and
    /// never cached.
    pub fn get_or_compute<E, F>(
        &self,
        accessor: Accessor,
        user_id: &str,
        compute: F,
    ) -> Result<Aggregate, E>
    where
        F: FnOnce() -> Result<Aggregate, E>,
    {
        let key = (accessor, user_id.to_string());
        if let Some(hit) = self.lookup(&key) {
            debug!(?accessor, user_id, "aggregate cache hit");
            return Ok(hit);
        }
        debug!(?accessor, user_id, "aggregate cache miss");
        let value = compute()?;
        debug_assert_eq!(value.accessor(), accessor);
        if let Ok(mut cache) = self.store.lock() {
            cache.cache_set(key, value.clone());
        }
        Ok(value)
    }

    fn lookup(&self, key: &CacheKey) -> Option<Aggregate> {
        let mut cache = self.store.lock().ok()?;
        cache.cache_get(key).cloned()
    }

    /// Evicts every accessor's entry for `user_id`.
    pub fn invalidate(&self, user_id: &str) {
        if let Ok(mut cache) = self.store.lock() {
            for accessor in Accessor::ALL {
                cache.cache_remove(&(accessor, user_id.to_string()));
            }
        }
        debug!(user_id, "aggregate cache invalidated");
    }

    /// Drops every entry for every user.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.store.lock() {
            cache.cache_clear();
        }
        debug!("aggregate cache cleared");
    }

    pub fn contains(&self, accessor: Accessor, user_id: &str) -> bool {
        self.lookup(&(accessor, user_id.to_string())).is_some()
    }

    pub fn len(&self) -> usize {
        self.store.lock().map(|c| c.cache_size()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::cell::Cell;

    fn summary(income: i64) -> Aggregate {
        Aggregate::Summary(Summary {
            income: Decimal::new(income, 0),
            expense: Decimal::ZERO,
        })
    }

    fn income_of(agg: Aggregate) -> Decimal {
        match agg {
            Aggregate::Summary(s) => s.income,
            other => panic!("unexpected aggregate {:?}", other),
        }
    }

    #[test]
    fn second_read_is_served_from_cache() {
        let cache = AggregateCache::new(Duration::from_secs(3600));
        let calls = Cell::new(0);
        for _ in 0..3 {
            let v = cache
                .get_or_compute::<(), _>(Accessor::Summary, "u1", || {
                    calls.set(calls.get() + 1);
                    Ok(summary(10))
                })
                .unwrap();
            assert_eq!(income_of(v), Decimal::new(10, 0));
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn users_do_not_share_entries() {
        let cache = AggregateCache::new(Duration::from_secs(3600));
        cache
            .get_or_compute::<(), _>(Accessor::Summary, "u1", || Ok(summary(1)))
            .unwrap();
        let v = cache
            .get_or_compute::<(), _>(Accessor::Summary, "u2", || Ok(summary(2)))
            .unwrap();
        assert_eq!(income_of(v), Decimal::new(2, 0));
    }

    #[test]
    fn invalidate_only_touches_one_user() {
        let cache = AggregateCache::new(Duration::from_secs(3600));
        for user in ["u1", "u2"] {
            cache
                .get_or_compute::<(), _>(Accessor::Summary, user, || Ok(summary(1)))
                .unwrap();
            cache
                .get_or_compute::<(), _>(Accessor::Daily, user, || Ok(Aggregate::Daily(vec![])))
                .unwrap();
        }
        cache.invalidate("u1");
        assert!(!cache.contains(Accessor::Summary, "u1"));
        assert!(!cache.contains(Accessor::Daily, "u1"));
        assert!(cache.contains(Accessor::Summary, "u2"));
        assert!(cache.contains(Accessor::Daily, "u2"));
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = AggregateCache::new(Duration::from_secs(3600));
        let err = cache.get_or_compute(Accessor::Summary, "u1", || Err("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_always_recomputes() {
        let cache = AggregateCache::new(Duration::ZERO);
        let calls = Cell::new(0);
        for _ in 0..2 {
            cache
                .get_or_compute::<(), _>(Accessor::Summary, "u1", || {
                    calls.set(calls.get() + 1);
                    Ok(summary(1))
                })
                .unwrap();
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = AggregateCache::new(Duration::from_secs(3600));
        cache
            .get_or_compute::<(), _>(Accessor::Summary, "u1", || Ok(summary(1)))
            .unwrap();
        cache.clear();
        assert!(!cache.contains(Accessor::Summary, "u1"));
    }
}
