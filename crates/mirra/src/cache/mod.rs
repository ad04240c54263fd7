//! Bounded memoization for reflective metadata lookups.

mod meta_cache;

pub use meta_cache::MetaCache;
