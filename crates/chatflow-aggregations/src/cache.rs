//! Caller-owned cache for aux op results
//!
//! Entries are keyed by the op's [`key`](crate::AuxOp::key) and the content
//! fingerprint of the input table, so two aggregators preparing the same
//! table with the same op share a single computation.
//!
//! # Compute-Once Algorithm
//!
//! 1. Fingerprint the input table
//! 2. If `(op key, fingerprint)` is stored, return the stored table
//! 3. Otherwise apply the op while holding the storage lock, store the
//!    result and evict according to the [`CachePolicy`]
//!
//! Holding the lock during the computation means a concurrent lookup for
//! the same entry waits instead of computing it a second time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatflow_core::{CachePolicy, CacheStats, EventTableExt, Result, TableFingerprint};
use polars::prelude::DataFrame;
use tracing::{debug, trace};

use crate::aux_ops::AuxOp;

type CacheKey = (String, TableFingerprint);

#[derive(Debug)]
struct CacheEntry {
    table: Arc<DataFrame>,
    last_access: u64,
}

/// Shared store of pre-processed tables
#[derive(Debug)]
pub struct AuxCache {
    storage: Mutex<HashMap<CacheKey, CacheEntry>>,
    policy: CachePolicy,
    hits: AtomicUsize,
    misses: AtomicUsize,
    access_counter: AtomicU64,
}

impl AuxCache {
    /// Create a new cache with the given policy
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            storage: Mutex::new(HashMap::new()),
            policy,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            access_counter: AtomicU64::new(0),
        }
    }

    /// A cache wrapped for sharing between aggregators
    pub fn shared(policy: CachePolicy) -> Arc<Self> {
        Arc::new(Self::new(policy))
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        // entries are only inserted once complete, so a poisoned map is still consistent
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> u64 {
        self.access_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Result of `op` applied to `table`, computed at most once per entry
    pub fn get_or_apply(&self, op: &dyn AuxOp, table: &DataFrame) -> Result<Arc<DataFrame>> {
        if matches!(self.policy, CachePolicy::NoCache) {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::new(op.apply(table)?));
        }

        let key = (op.key(), table.fingerprint()?);
        let mut storage = self.storage();

        if let Some(entry) = storage.get_mut(&key) {
            entry.last_access = self.tick();
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(op = %key.0, fingerprint = ?key.1, "aux cache hit");
            return Ok(Arc::clone(&entry.table));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let table = Arc::new(op.apply(table)?);
        debug!(op = %key.0, fingerprint = ?key.1, rows = table.height(), "aux op applied");

        if let CachePolicy::Lru { max_entries } = self.policy {
            if max_entries == 0 {
                return Ok(table);
            }
            while storage.len() >= max_entries {
                let oldest = storage
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_access)
                    .map(|(key, _)| key.clone());
                match oldest {
                    Some(oldest) => {
                        storage.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        storage.insert(
            key,
            CacheEntry {
                table: Arc::clone(&table),
                last_access: self.tick(),
            },
        );
        Ok(table)
    }

    /// Whether a result for `op` on `table` is stored
    pub fn contains(&self, op: &dyn AuxOp, table: &DataFrame) -> Result<bool> {
        let key = (op.key(), table.fingerprint()?);
        Ok(self.storage().contains_key(&key))
    }

    pub fn len(&self) -> usize {
        self.storage().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.storage().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for AuxCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}
