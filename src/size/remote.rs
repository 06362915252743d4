//! Remote size back-end backed by the bundlephobia API.
//!
//! Lookups go through three layers before reaching the network:
//!
//! 1. the [`SizeCache`], keyed by `name@version`
//! 2. an in-flight table, so concurrent requests for the same key share one
//!    fetch
//! 3. a [`RateGovernor`] that spaces outgoing requests
//!
//! Failed lookups are logged and count as zero bytes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tokio::time::Instant;

use super::cache::{CachedSize, SizeCache};
use super::SizeError;

/// Bundlephobia size endpoint
pub const BUNDLEPHOBIA_URL: &str = "https://bundlephobia.com/api/size";

/// Default spacing between requests
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);

/// Default number of lookups in flight at once
pub const DEFAULT_CONCURRENCY: usize = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Size fields of a bundlephobia response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BundleSize {
    #[serde(default)]
    pub gzip: u64,
    #[serde(default)]
    pub size: u64,
}

impl BundleSize {
    /// Gzipped size when known, raw size otherwise.
    pub fn footprint(&self) -> u64 {
        if self.gzip > 0 {
            self.gzip
        } else {
            self.size
        }
    }
}

/// Anything that can look up the bundle size of a published package.
#[async_trait]
pub trait SizeFetcher: Send + Sync {
    async fn fetch(&self, name: &str, version: &str) -> Result<BundleSize, SizeError>;
}

/// HTTP client for bundlephobia.
pub struct BundlephobiaClient {
    client: Client,
    base_url: String,
}

impl BundlephobiaClient {
    pub fn new() -> Result<Self, SizeError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("dep-hunter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: BUNDLEPHOBIA_URL.to_string(),
        })
    }

    /// Create with custom base URL (for testing or proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SizeFetcher for BundlephobiaClient {
    async fn fetch(&self, name: &str, version: &str) -> Result<BundleSize, SizeError> {
        let package = format!("{}@{}", name, version);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("package", package.as_str()), ("record", "true")])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SizeError::Status {
                package,
                status: status.as_u16(),
            });
        }

        Ok(response.json::<BundleSize>().await?)
    }
}

/// Enforces a minimum interval between request starts.
#[derive(Debug)]
pub struct RateGovernor {
    interval: Duration,
    next_slot: AsyncMutex<Option<Instant>>,
}

impl RateGovernor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: AsyncMutex::new(None),
        }
    }

    /// Waits until the next request may start and reserves the slot after it.
    pub async fn wait(&self) {
        let mut next = self.next_slot.lock().await;
        if let Some(slot) = *next {
            if slot > Instant::now() {
                tokio::time::sleep_until(slot).await;
            }
        }
        *next = Some(Instant::now() + self.interval);
    }
}

/// Resolves package sizes through the cache, the in-flight table and a
/// [`SizeFetcher`].
pub struct RemoteSizeCalculator<F> {
    fetcher: F,
    cache: Mutex<SizeCache>,
    governor: RateGovernor,
    in_flight: Mutex<HashMap<String, Arc<OnceCell<u64>>>>,
    concurrency: usize,
}

impl<F: SizeFetcher> RemoteSizeCalculator<F> {
    pub fn new(fetcher: F, cache: SizeCache) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(cache),
            governor: RateGovernor::new(DEFAULT_REQUEST_INTERVAL),
            in_flight: Mutex::new(HashMap::new()),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.governor = RateGovernor::new(interval);
        self
    }

    /// Maximum lookups in flight at once; zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Size of one package version in bytes, or zero if unknown.
    pub async fn package_size(&self, name: &str, version: &str) -> u64 {
        let cached = self.cache.lock().get(name, version).map(CachedSize::footprint);
        if let Some(hit) = cached {
            return hit;
        }

        let cell = self
            .in_flight
            .lock()
            .entry(SizeCache::key(name, version))
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        *cell.get_or_init(|| self.fetch_uncached(name, version)).await
    }

    async fn fetch_uncached(&self, name: &str, version: &str) -> u64 {
        self.governor.wait().await;
        debug!("Fetching size of {}@{}", name, version);

        match self.fetcher.fetch(name, version).await {
            Ok(bundle) => {
                self.cache
                    .lock()
                    .insert(CachedSize::new(name, version, bundle.gzip, bundle.size));
                bundle.footprint()
            }
            Err(e) => {
                warn!("Failed to get size for {}@{}: {}", name, version, e);
                0
            }
        }
    }

    /// Sizes for every `(name, version)` pair, keyed by name.
    pub async fn sizes_for(&self, packages: &[(String, String)]) -> HashMap<String, u64> {
        stream::iter(packages)
            .map(|(name, version)| async move {
                (name.clone(), self.package_size(name, version).await)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Persists newly fetched entries.
    pub fn save_cache(&self) -> Result<(), SizeError> {
        self.cache.lock().save()
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }
}
