//! Thin asynchronous client for the Zippopotam US postal API.
//!
//! - Resolves a zip code to city, state, and coordinates.
//! - Maintains a 24-hour in-memory cache with stale fallbacks, backed by
//!   a 30-day disk snapshot.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{GeoPoint, ZipLocation};
use crate::infra::geocache::{load_geo_cache, save_geo_cache, GeoCache};

const DEFAULT_BASE_URL: &str = "https://api.zippopotam.us/";
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const USER_AGENT: &str = "freight-rate-quoter/0.1.0";

#[derive(Debug, Error)]
pub enum ZipLookupError {
    #[error("{0:?} is not a five-digit US zip code")]
    InvalidZip(String),
    #[error("no location found for zip {0}")]
    NotFound(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
}

impl ZipLookupError {
    /// Transient failures may be papered over with a stale cache entry;
    /// a malformed zip or an authoritative not-found may not.
    fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Default)]
struct ZipCache {
    lookups: HashMap<String, Cached<ZipLocation>>,
    /// Disk snapshot; None until the first miss triggers a load.
    disk: Option<GeoCache>,
}

#[derive(Clone)]
pub struct ZippopotamClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<ZipCache>>,
    ttl: Duration,
}

impl ZippopotamClient {
    pub fn new() -> Result<Self, ZipLookupError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, ZipLookupError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(ZipCache::default())),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Resolves one zip code, serving from the in-memory cache, then the
    /// disk snapshot, then the API. A transient API failure falls back to
    /// a stale cache entry when one exists.
    pub async fn lookup(&self, zip: &str) -> Result<CachedPayload<ZipLocation>, ZipLookupError> {
        let zip = normalize_zip(zip)?;

        if let Some(payload) = self.cached_lookup(&zip).await {
            return Ok(payload);
        }
        if let Some(payload) = self.disk_lookup(&zip).await {
            return Ok(payload);
        }

        match self.fetch_location(&zip).await {
            Ok(location) => Ok(self.store_lookup(location).await),
            Err(error) => {
                if error.is_transient() {
                    if let Some(stale) = self.cached_lookup_stale(&zip).await {
                        warn!(zip = %zip, error = %error, "zip lookup failed; serving stale entry");
                        return Ok(stale);
                    }
                }
                Err(error)
            }
        }
    }

    /// Resolves the origin and destination zips of one quote request.
    pub async fn lookup_pair(
        &self,
        origin_zip: &str,
        destination_zip: &str,
    ) -> Result<(CachedPayload<ZipLocation>, CachedPayload<ZipLocation>), ZipLookupError> {
        let origin = self.lookup(origin_zip).await?;
        let destination = self.lookup(destination_zip).await?;
        Ok((origin, destination))
    }

    async fn fetch_location(&self, zip: &str) -> Result<ZipLocation, ZipLookupError> {
        let url = self.url(&format!("us/{zip}"))?;
        debug!(%url, "requesting zip lookup");

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ZipLookupError::NotFound(zip.to_string()));
        }
        let dto: ZippopotamResponse = response.error_for_status()?.json().await?;
        location_from_response(dto)
    }

    async fn cached_lookup(&self, zip: &str) -> Option<CachedPayload<ZipLocation>> {
        let cache = self.cache.lock().await;
        let result = cache
            .lookups
            .get(zip)
            .and_then(|entry| entry.if_fresh(self.ttl));
        if result.is_some() {
            debug!(zip, "serving cached zip lookup");
        }
        result
    }

    async fn cached_lookup_stale(&self, zip: &str) -> Option<CachedPayload<ZipLocation>> {
        let cache = self.cache.lock().await;
        cache.lookups.get(zip).map(Cached::stale)
    }

    /// Promotes a disk-snapshot hit into the in-memory cache. The snapshot
    /// is loaded at most once per client.
    async fn disk_lookup(&self, zip: &str) -> Option<CachedPayload<ZipLocation>> {
        let mut cache = self.cache.lock().await;
        if cache.disk.is_none() {
            cache.disk = Some(load_geo_cache().unwrap_or_else(|| GeoCache::new(HashMap::new())));
        }

        let location = cache.disk.as_ref()?.get(zip)?.clone();
        let fetched_at = SystemTime::now();
        cache
            .lookups
            .insert(zip.to_string(), Cached::new(location.clone(), fetched_at));
        debug!(zip, "serving zip lookup from disk snapshot");
        Some(CachedPayload::new(location, fetched_at, CacheStatus::Cached))
    }

    async fn store_lookup(&self, location: ZipLocation) -> CachedPayload<ZipLocation> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(location.clone(), fetched_at, CacheStatus::Fresh);

        let mut cache = self.cache.lock().await;
        cache
            .lookups
            .insert(location.zip.clone(), Cached::new(location.clone(), fetched_at));

        let disk = cache
            .disk
            .get_or_insert_with(|| GeoCache::new(HashMap::new()));
        disk.locations.insert(location.zip.clone(), location);
        if let Err(error) = save_geo_cache(disk) {
            warn!(error = %error, "failed to save zip cache");
        }

        payload
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

fn normalize_zip(zip: &str) -> Result<String, ZipLookupError> {
    let trimmed = zip.trim();
    if trimmed.len() == 5 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        Ok(trimmed.to_string())
    } else {
        Err(ZipLookupError::InvalidZip(zip.to_string()))
    }
}

/// Response shape of `GET /us/{zip}`. Coordinates arrive string-encoded.
#[derive(Debug, Deserialize)]
struct ZippopotamResponse {
    #[serde(rename = "post code")]
    post_code: String,
    #[serde(default)]
    places: Vec<ZippopotamPlace>,
}

#[derive(Debug, Deserialize)]
struct ZippopotamPlace {
    #[serde(rename = "place name")]
    place_name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(rename = "state abbreviation", default)]
    state_abbreviation: Option<String>,
    #[serde(default)]
    latitude: Option<String>,
    #[serde(default)]
    longitude: Option<String>,
}

fn location_from_response(dto: ZippopotamResponse) -> Result<ZipLocation, ZipLookupError> {
    let zip = dto.post_code;
    let place = dto
        .places
        .into_iter()
        .next()
        .ok_or_else(|| ZipLookupError::NotFound(zip.clone()))?;

    let latitude = parse_coordinate(place.latitude.as_deref());
    let longitude = parse_coordinate(place.longitude.as_deref());
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(ZipLocation {
            zip,
            city: place.place_name,
            state: place.state.unwrap_or_else(|| "Unknown".to_string()),
            state_abbreviation: place.state_abbreviation.unwrap_or_default(),
            point: GeoPoint::new(latitude, longitude),
        }),
        _ => Err(ZipLookupError::Api(format!(
            "response for zip {zip} is missing coordinates"
        ))),
    }
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
}
