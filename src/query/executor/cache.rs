//! 路径签名缓存
//!
//! 以步骤序列签名为键的并发映射，记录命中、未命中与插入次数。
//! 没有淘汰策略，生命周期与所属求值器相同。

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::types::PathSignature;

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub insertions: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insertion(&self) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64 * 100.0
        }
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.insertions.store(0, Ordering::Relaxed);
    }
}

/// 缓存统计快照
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CacheSnapshot {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub hit_rate: f64,
}

/// 以路径签名为键的缓存
#[derive(Debug)]
pub struct PathCache<V: Clone> {
    name: &'static str,
    entries: DashMap<PathSignature, V>,
    stats: CacheStats,
}

impl<V: Clone> PathCache<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// 查找并记录命中/未命中
    pub fn get(&self, signature: &PathSignature) -> Option<V> {
        match self.entries.get(signature) {
            Some(entry) => {
                self.stats.record_hit();
                log::trace!("{} 缓存命中: {}", self.name, signature);
                Some(entry.value().clone())
            }
            None => {
                self.stats.record_miss();
                log::trace!("{} 缓存未命中: {}", self.name, signature);
                None
            }
        }
    }

    pub fn insert(&self, signature: PathSignature, value: V) {
        self.entries.insert(signature, value);
        self.stats.record_insertion();
    }

    pub fn contains(&self, signature: &PathSignature) -> bool {
        self.entries.contains_key(signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.stats.reset();
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            entries: self.entries.len(),
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            insertions: self.stats.insertions.load(Ordering::Relaxed),
            hit_rate: self.stats.hit_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Step;

    #[test]
    fn test_hit_and_miss_counting() {
        let cache: PathCache<u32> = PathCache::new("test");
        let signature = PathSignature::from_steps(&[Step::forward(1)]);

        assert_eq!(cache.get(&signature), None);
        cache.insert(signature.clone(), 7);
        assert_eq!(cache.get(&signature), Some(7));
        assert!(cache.contains(&signature));

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.entries, 1);
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.insertions, 1);
        assert_eq!(snapshot.hit_rate, 50.0);
    }

    #[test]
    fn test_clear() {
        let cache: PathCache<u32> = PathCache::new("test");
        cache.insert(PathSignature::from_steps(&[Step::reverse(0)]), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.snapshot(), CacheSnapshot::default());
    }
}
