//! Taxonomy caching.

pub mod store;
pub mod taxonomy;

pub use store::{KeyValueStore, MemoryStore};
pub use taxonomy::{subcategories_key, ttl_for_days, TaxonomyCache, CATEGORIES_KEY};
