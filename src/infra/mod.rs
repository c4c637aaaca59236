//! Collaborators with the outside world: the zip geocoder and its caches.

pub mod geocache;
pub mod zippopotam;

pub use geocache::{GeoCache, ZIP_CACHE_TTL};
pub use zippopotam::{CacheStatus, CachedPayload, ZipLookupError, ZippopotamClient};
