//! Memoization of substitution verdicts.
//!
//! Type shapes never change once declared, so a verdict for a
//! `(source, target)` pair is a permanent fact: entries are never evicted,
//! only dropped wholesale by [`SubstitutionCache::clear`].
//!
//! The map is a `DashMap`, so lookups and insertions from concurrent queries
//! need no outer lock. Two threads racing on the same pair may both compute
//! it; [`SubstitutionCache::record`] keeps whichever entry landed first and
//! hands it back to both, so every caller observes the same resolved type.

use crate::types::TypeId;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};

/// Order-sensitive cache key: `(source, target)` and `(target, source)` are
/// different entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypePair {
    pub source: TypeId,
    pub target: TypeId,
}

impl TypePair {
    #[inline]
    pub const fn new(source: TypeId, target: TypeId) -> Self {
        Self { source, target }
    }
}

/// A recorded verdict.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheEntry {
    /// The source substitutes for the target as this closed type.
    Substitute(TypeId),
    /// The substitution was proven impossible.
    NoSubstitution,
}

impl CacheEntry {
    #[inline]
    pub const fn substitution(self) -> Option<TypeId> {
        match self {
            CacheEntry::Substitute(ty) => Some(ty),
            CacheEntry::NoSubstitution => None,
        }
    }
}

impl From<Option<TypeId>> for CacheEntry {
    fn from(substitution: Option<TypeId>) -> Self {
        match substitution {
            Some(ty) => CacheEntry::Substitute(ty),
            None => CacheEntry::NoSubstitution,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Concurrent `(source, target)` → verdict store.
#[derive(Default)]
pub struct SubstitutionCache {
    entries: DashMap<TypePair, CacheEntry, FxBuildHasher>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SubstitutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded verdict for `key`, if any.
    pub fn lookup(&self, key: TypePair) -> Option<CacheEntry> {
        let found = self.entries.get(&key).map(|r| *r);
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Record `entry` for `key` unless one is already present, and return
    /// the entry that is now stored.
    pub fn record(&self, key: TypePair, entry: CacheEntry) -> CacheEntry {
        *self.entries.entry(key).or_insert(entry)
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> SubstitutionCacheStats {
        SubstitutionCacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
