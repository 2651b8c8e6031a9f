//! Caches for open file handles and decoded arrays.

mod keyed;

pub use keyed::{CacheStats, KeyedCache};
