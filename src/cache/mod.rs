//! Snapshot cache and the cache-aside repository decorator

pub mod decorator;
pub mod service;
pub mod transport;

pub use decorator::CachedRepository;
pub use service::CacheService;
pub use transport::{CacheEntry, CacheTransport, InMemoryCacheTransport};
