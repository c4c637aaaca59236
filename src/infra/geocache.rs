//! Persistent on-disk caching for resolved zip-code locations.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ZipLocation;

const CACHE_FILENAME: &str = "zip_cache.json";

/// Cache TTL: 30 days. Zip centroids only move when the postal service
/// redraws boundaries.
pub const ZIP_CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Snapshot of every zip the geocoder has resolved, with a creation
/// timestamp for the TTL check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoCache {
    /// Unix timestamp (seconds) when this cache was created.
    pub cached_at: u64,
    /// Resolved locations keyed by zip code.
    pub locations: HashMap<String, ZipLocation>,
}

impl GeoCache {
    /// Create a new cache with the current timestamp.
    pub fn new(locations: HashMap<String, ZipLocation>) -> Self {
        let cached_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            cached_at,
            locations,
        }
    }

    pub fn get(&self, zip: &str) -> Option<&ZipLocation> {
        self.locations.get(zip)
    }

    /// Check if the cache has expired (older than TTL).
    pub fn is_expired(&self) -> bool {
        self.age() > ZIP_CACHE_TTL
    }

    /// Cache age as a Duration.
    pub fn age(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Duration::from_secs(now.saturating_sub(self.cached_at))
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Get the cache file path (in the app data directory).
fn cache_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("freight-rate-quoter");

        let _ = fs::create_dir_all(&base);

        base.join(CACHE_FILENAME)
    })
    .clone()
}

/// Load the zip cache from disk, if it exists and has not expired.
pub fn load_geo_cache() -> Option<GeoCache> {
    let path = cache_path();

    if !path.exists() {
        debug!(path = %path.display(), "no zip cache on disk");
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<GeoCache>(&content) {
            Ok(cache) => {
                if cache.is_expired() {
                    debug!(age = %cache.age_string(), "zip cache expired");
                    return None;
                }
                debug!(
                    entries = cache.locations.len(),
                    age = %cache.age_string(),
                    "loaded zip cache"
                );
                Some(cache)
            }
            Err(e) => {
                warn!(error = %e, "failed to parse zip cache");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "failed to read zip cache");
            None
        }
    }
}

/// Save the zip cache to disk.
pub fn save_geo_cache(cache: &GeoCache) -> Result<(), std::io::Error> {
    let path = cache_path();
    let content = serde_json::to_string_pretty(cache)?;
    fs::write(&path, content)?;
    debug!(
        entries = cache.locations.len(),
        path = %path.display(),
        "saved zip cache"
    );
    Ok(())
}
