use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::info::{MemberInfo, VisibilityFilter};
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// MetaCache

const DEFAULT_CAPACITY: usize = 256;

/// Memoizes filtered member lists and the registry snapshot.
///
/// Member sets are invariant once a type is registered, so a stale entry can
/// never be observed; the only coherence concern is the `all_types` snapshot,
/// which late registrations invalidate through [`clear`](MetaCache::clear).
/// The LRU bound keeps a long-running host from accumulating entries for
/// types it asked about once.
pub struct MetaCache {
    members: Mutex<LruCache<(TypeTag, VisibilityFilter), Arc<Vec<MemberInfo>>>>,
    all_types: Mutex<Option<Arc<Vec<TypeTag>>>>,
}

impl Default for MetaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaCache {
    pub fn new() -> Self {
        Self::with_capacity(
            NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        )
    }

    /// A cache holding at most `capacity` member lists before evicting the
    /// least recently used.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            members: Mutex::new(LruCache::new(capacity)),
            all_types: Mutex::new(None),
        }
    }

    /// The members of `tag` that pass `filter`, memoized per `(tag, filter)`.
    ///
    /// `None` when the tag is not registered.
    pub fn members(
        &self,
        registry: &TypeRegistry,
        tag: &TypeTag,
        filter: VisibilityFilter,
    ) -> Option<Arc<Vec<MemberInfo>>> {
        let meta = registry.meta(tag)?;
        let mut cache = self.members.lock();
        let entry = cache.get_or_insert((tag.clone(), filter), || {
            Arc::new(
                meta.members()
                    .iter()
                    .filter(|info| filter.admits(info))
                    .copied()
                    .collect(),
            )
        });
        Some(Arc::clone(entry))
    }

    /// A snapshot of every registered tag, sorted by canonical identity.
    /// Computed once and reused until [`clear`](MetaCache::clear).
    pub fn all_types(&self, registry: &TypeRegistry) -> Arc<Vec<TypeTag>> {
        let mut snapshot = self.all_types.lock();
        match snapshot.as_ref() {
            Some(existing) => Arc::clone(existing),
            None => {
                let mut tags: Vec<TypeTag> = registry.tags().cloned().collect();
                tags.sort_by_key(TypeTag::canonical);
                let built = Arc::new(tags);
                *snapshot = Some(Arc::clone(&built));
                built
            }
        }
    }

    /// Drops every memoized entry. Call after late registrations.
    pub fn clear(&self) {
        self.members.lock().clear();
        *self.all_types.lock() = None;
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_lists_are_memoized() {
        let registry = TypeRegistry::new();
        let cache = MetaCache::new();
        let tag = registry.decode("i32").unwrap();

        let first = cache.members(&registry, &tag, VisibilityFilter::Public).unwrap();
        let second = cache.members(&registry, &tag, VisibilityFilter::Public).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let unknown = TypeTag::named("no::such", "Type");
        assert!(cache.members(&registry, &unknown, VisibilityFilter::All).is_none());
    }

    #[test]
    fn snapshot_invalidated_by_clear() {
        let mut registry = TypeRegistry::new();
        let cache = MetaCache::new();

        let before = cache.all_types(&registry);
        registry.register::<Vec<i32>>();
        // Stale until cleared.
        assert!(Arc::ptr_eq(&before, &cache.all_types(&registry)));

        cache.clear();
        let after = cache.all_types(&registry);
        assert!(after.len() > before.len());
    }

    #[test]
    fn eviction_respects_capacity() {
        let registry = TypeRegistry::new();
        let cache = MetaCache::with_capacity(NonZeroUsize::MIN);
        let a = registry.decode("i32").unwrap();
        let b = registry.decode("bool").unwrap();

        cache.members(&registry, &a, VisibilityFilter::Public);
        cache.members(&registry, &b, VisibilityFilter::Public);
        assert_eq!(cache.members.lock().len(), 1);
    }
}
