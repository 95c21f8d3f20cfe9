use crate::core::geo::TileCoord;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// In-memory tile cache using LRU eviction.
///
/// Clones share the same storage, so a cache handle can travel into the
/// futures that fill it.
#[derive(Debug, Clone)]
pub struct TileCache {
    cache: Arc<Mutex<LruCache<TileCoord, Arc<Vec<u8>>>>>,
}

impl TileCache {
    /// Create a new tile cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Get a tile from the cache
    pub fn get(&self, coord: &TileCoord) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok()?.get(coord).cloned()
    }

    /// Insert a tile into the cache
    pub fn insert(&self, coord: TileCoord, data: Vec<u8>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(coord, Arc::new(data));
        }
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.cache
            .lock()
            .map(|cache| cache.contains(coord))
            .unwrap_or(false)
    }

    /// Clear all tiles from the cache
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_eviction() {
        let cache = TileCache::new(2);
        cache.insert(TileCoord::new(0, 0, 1), vec![1]);
        cache.insert(TileCoord::new(1, 0, 1), vec![2]);
        // touch the first tile so the second becomes least recently used
        assert!(cache.get(&TileCoord::new(0, 0, 1)).is_some());
        cache.insert(TileCoord::new(0, 1, 1), vec![3]);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&TileCoord::new(0, 0, 1)));
        assert!(!cache.contains(&TileCoord::new(1, 0, 1)));
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = TileCache::new(0);
        let handle = cache.clone();
        handle.insert(TileCoord::new(3, 4, 5), vec![9, 9]);

        assert_eq!(cache.get(&TileCoord::new(3, 4, 5)).unwrap().as_slice(), &[9, 9]);
        cache.clear();
        assert!(handle.is_empty());
    }
}
