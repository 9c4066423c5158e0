//! Custom role resolution cache

use crate::domain::{CustomRoleId, PermissionSet};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default capacity (number of custom roles)
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct CachedResolution {
    version: u64,
    permissions: Arc<PermissionSet>,
}

/// LRU cache of resolved custom role permission sets.
///
/// Entries are tagged with the custom role version they were computed from;
/// a lookup with any other version is a miss.
pub struct ResolutionCache {
    entries: Mutex<LruCache<CustomRoleId, CachedResolution>>,
}

impl ResolutionCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN));
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, id: CustomRoleId, version: u64) -> Option<Arc<PermissionSet>> {
        let mut entries = self.entries.lock();
        match entries.get(&id) {
            Some(entry) if entry.version == version => {
                metrics::counter!("farmgate_custom_role_cache_total", "result" => "hit")
                    .increment(1);
                Some(Arc::clone(&entry.permissions))
            }
            _ => {
                metrics::counter!("farmgate_custom_role_cache_total", "result" => "miss")
                    .increment(1);
                None
            }
        }
    }

    pub fn put(&self, id: CustomRoleId, version: u64, permissions: Arc<PermissionSet>) {
        self.entries.lock().put(
            id,
            CachedResolution {
                version,
                permissions,
            },
        );
    }

    /// Drop the cached resolution of one custom role.
    pub fn invalidate(&self, id: CustomRoleId) {
        if self.entries.lock().pop(&id).is_some() {
            tracing::debug!(custom_role_id = %id, "Invalidated custom role resolution");
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
