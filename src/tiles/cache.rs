use crate::core::geo::TileKey;
use crate::tiles::TileImage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// In-memory tile cache using LRU eviction.
///
/// Owned by a single loader; reads and writes happen on the engine thread so no
/// locking is involved. Failed loads are never inserted.
#[derive(Debug)]
pub struct TileCache {
    cache: LruCache<TileKey, Arc<TileImage>>,
}

impl TileCache {
    /// Create a new tile cache with the given capacity (at least one entry)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Get a tile and mark it most recently used
    pub fn get(&mut self, key: &TileKey) -> Option<Arc<TileImage>> {
        self.cache.get(key).cloned()
    }

    /// Look at a tile without touching its recency
    pub fn peek(&self, key: &TileKey) -> Option<&Arc<TileImage>> {
        self.cache.peek(key)
    }

    /// Insert a tile as most recently used, returning the key evicted to stay within capacity
    pub fn insert(&mut self, key: TileKey, image: Arc<TileImage>) -> Option<TileKey> {
        match self.cache.push(key, image) {
            Some((evicted, _)) if evicted != key => Some(evicted),
            _ => None,
        }
    }

    /// Check if a tile is cached without touching its recency
    pub fn contains(&self, key: &TileKey) -> bool {
        self.cache.contains(key)
    }

    /// Key that would be evicted next
    pub fn least_recently_used(&self) -> Option<TileKey> {
        self.cache.peek_lru().map(|(key, _)| *key)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(crate::core::constants::MAX_TILE_CACHE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MAX_TILE_CACHE;

    fn image(key: TileKey) -> Arc<TileImage> {
        Arc::new(TileImage::solid(key, 1, [0, 0, 0, 255]))
    }

    fn key(i: u32) -> TileKey {
        TileKey::new(18, i, i)
    }

    #[test]
    fn test_tile_cache_basic_operations() {
        let mut cache = TileCache::new(2);
        let k1 = TileKey::new(3, 1, 2);
        let k2 = TileKey::new(6, 4, 5);

        assert!(cache.is_empty());
        assert_eq!(cache.insert(k1, image(k1)), None);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&k1));
        assert_eq!(cache.get(&k1).unwrap().key, k1);

        cache.insert(k2, image(k2));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reinsert_same_key_evicts_nothing() {
        let mut cache = TileCache::new(1);
        let k = key(1);
        cache.insert(k, image(k));
        assert_eq!(cache.insert(k, image(k)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_follows_access_order() {
        let mut cache = TileCache::new(MAX_TILE_CACHE);
        for i in 0..MAX_TILE_CACHE as u32 {
            cache.insert(key(i), image(key(i)));
        }

        // Touch the ten oldest entries so they become most recently used
        for i in 0..10 {
            assert!(cache.get(&key(i)).is_some());
        }

        let extra = 15u32;
        let mut evicted = Vec::new();
        for i in 0..extra {
            let k = key(10_000 + i);
            evicted.extend(cache.insert(k, image(k)));
        }

        assert_eq!(cache.len(), MAX_TILE_CACHE);
        let expected: Vec<TileKey> = (10..10 + extra).map(key).collect();
        assert_eq!(evicted, expected);
        for i in 0..10 {
            assert!(cache.contains(&key(i)));
        }
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let mut cache = TileCache::new(2);
        cache.insert(key(1), image(key(1)));
        cache.insert(key(2), image(key(2)));
        assert!(cache.peek(&key(1)).is_some());
        assert_eq!(cache.least_recently_used(), Some(key(1)));
        cache.get(&key(1));
        assert_eq!(cache.least_recently_used(), Some(key(2)));
    }
}
