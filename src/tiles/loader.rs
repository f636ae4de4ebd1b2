use crossbeam_channel::{unbounded, Receiver, Sender};

use super::cache::TileCache;
use super::fetcher::TileFetcher;
use super::source::pick_subdomain;
use super::TileImage;
use crate::core::config::TileLoadingConfig;
use crate::core::geo::TileKey;
use crate::prelude::{Arc, Duration, HashMap, HashSet, VecDeque};
use crate::runtime::{self, async_utils::with_timeout, AsyncHandle, AsyncSpawner};
use crate::{MapError, Result};

/// Answer to a tile request
#[derive(Debug, Clone)]
pub enum TileRequest {
    /// Cached; recency refreshed
    Ready(Arc<TileImage>),
    /// Queued or in flight; the result arrives through `poll_completions`
    Pending,
}

/// A finished load, drained on the engine thread
#[derive(Debug)]
pub struct TileCompletion {
    pub key: TileKey,
    pub result: Result<Arc<TileImage>>,
}

/// Raw result sent back by a fetch task
struct FetchOutcome {
    key: TileKey,
    result: Result<TileImage>,
}

/// Bounded-concurrency tile loader in front of an LRU cache.
///
/// Requests for uncached keys join a FIFO queue. At most `max_concurrent`
/// fetches run at once; each completion frees its slot and starts the next
/// queued key. A key that is already queued or in flight is never fetched
/// twice, later requests simply wait on the same task.
pub struct TileLoader {
    cache: TileCache,
    fetcher: Arc<dyn TileFetcher>,
    spawner: Arc<dyn AsyncSpawner>,
    queue: VecDeque<TileKey>,
    /// Queued or in flight
    pending: HashSet<TileKey>,
    in_flight: HashMap<TileKey, Box<dyn AsyncHandle>>,
    max_concurrent: usize,
    fetch_timeout: Option<Duration>,
    result_tx: Sender<FetchOutcome>,
    result_rx: Receiver<FetchOutcome>,
}

impl TileLoader {
    pub fn new(
        config: &TileLoadingConfig,
        fetcher: Arc<dyn TileFetcher>,
        spawner: Arc<dyn AsyncSpawner>,
    ) -> Self {
        let (result_tx, result_rx) = unbounded();
        log::debug!(
            "TileLoader starting with max_concurrent: {}, cache_size: {}",
            config.max_concurrent,
            config.cache_size
        );

        Self {
            cache: TileCache::new(config.cache_size),
            fetcher,
            spawner,
            queue: VecDeque::new(),
            pending: HashSet::default(),
            in_flight: HashMap::default(),
            max_concurrent: config.max_concurrent.max(1),
            fetch_timeout: config.fetch_timeout(),
            result_tx,
            result_rx,
        }
    }

    /// Loader spawning fetches on the current Tokio runtime
    #[cfg(feature = "tokio-runtime")]
    pub fn with_default_spawner(config: &TileLoadingConfig, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self::new(config, fetcher, runtime::default_spawner())
    }

    /// Return a cached tile, or make sure exactly one load for it is outstanding
    pub fn request(&mut self, key: TileKey) -> TileRequest {
        if let Some(image) = self.cache.get(&key) {
            return TileRequest::Ready(image);
        }

        if self.pending.insert(key) {
            self.queue.push_back(key);
            self.start_queued();
        } else {
            log::trace!("tile {} already loading, joining existing task", key);
        }
        TileRequest::Pending
    }

    /// Drain finished fetches: free their slots, cache successes, start queued work
    pub fn poll_completions(&mut self) -> Vec<TileCompletion> {
        let mut completions = Vec::new();

        while let Ok(FetchOutcome { key, result }) = self.result_rx.try_recv() {
            self.in_flight.remove(&key);
            self.pending.remove(&key);

            let result = match result {
                Ok(image) => {
                    let image = Arc::new(image);
                    if let Some(evicted) = self.cache.insert(key, Arc::clone(&image)) {
                        log::debug!("evicted tile {} to make room for {}", evicted, key);
                    }
                    log::debug!("loaded tile {} ({}x{})", key, image.width(), image.height());
                    Ok(image)
                }
                Err(e) => {
                    log::warn!("tile {} failed: {}", key, e);
                    Err(e)
                }
            };

            completions.push(TileCompletion { key, result });
            self.start_queued();
        }

        completions
    }

    fn start_queued(&mut self) {
        while self.in_flight.len() < self.max_concurrent {
            let Some(key) = self.queue.pop_front() else {
                break;
            };

            let fetcher = Arc::clone(&self.fetcher);
            let result_tx = self.result_tx.clone();
            let timeout = self.fetch_timeout;
            let subdomain = pick_subdomain(fetcher.subdomain_count());

            log::debug!("starting download for tile {} (host {})", key, subdomain);
            let handle = runtime::spawn(self.spawner.as_ref(), async move {
                let fetch = fetcher.fetch_tile_image(subdomain, key);
                let result = with_timeout(fetch, timeout)
                    .await
                    .unwrap_or(Err(MapError::TileTimeout(key)));
                let _ = result_tx.send(FetchOutcome { key, result });
            });
            self.in_flight.insert(key, handle);
        }
    }

    /// Whether a load for `key` is queued or in flight
    pub fn is_pending(&self, key: &TileKey) -> bool {
        self.pending.contains(key)
    }

    /// Fetches currently running
    pub fn active_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Keys waiting for a free slot
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Queued plus running
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TileCache {
        &mut self.cache
    }
}

impl Drop for TileLoader {
    fn drop(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.cancel();
        }
    }
}
