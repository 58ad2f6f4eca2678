use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::driver::cancellable;
use crate::driver::error::Result;
use crate::model::AccountId;
use crate::vfs::path::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: String,
    account: AccountId,
}

impl CacheKey {
    pub fn new(path: &str, account: AccountId) -> Self {
        CacheKey { path: normalize(path), account }
    }
}

/// Raw directory listings keyed by (normalized path, account).
///
/// Entries never expire. Empty listings are never stored, so an empty
/// directory is fetched on every access. Concurrent misses for one key are
/// serialized so only the first caller hits the provider; a waiter whose
/// `cancel` fires leaves the queue with `Cancelled`.
pub struct ListingCache<T> {
    entries: RwLock<HashMap<CacheKey, Arc<Vec<T>>>>,
    flights: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl<T> Default for ListingCache<T> {
    fn default() -> Self {
        ListingCache {
            entries: RwLock::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> ListingCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str, account: AccountId) -> Option<Arc<Vec<T>>> {
        self.entries.read().await.get(&CacheKey::new(path, account)).cloned()
    }

    /// Returns the cached listing, or runs `fetch` and stores a non-empty result.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        path: &str,
        account: AccountId,
        cancel: &CancellationToken,
        fetch: F,
    ) -> Result<Arc<Vec<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let key = CacheKey::new(path, account);
        let cached = self.entries.read().await.get(&key).cloned();
        if let Some(hit) = cached {
            debug!(path = %key.path, "listing cache hit");
            return Ok(hit);
        }

        let flight = self.flights.lock().await
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = match cancellable(cancel, flight.clone().lock_owned().map(Ok)).await {
            Ok(guard) => guard,
            Err(e) => {
                debug!(path = %key.path, "listing wait cancelled");
                self.release_flight(&key, flight).await;
                return Err(e);
            }
        };

        let cached = self.entries.read().await.get(&key).cloned();
        let result = match cached {
            Some(hit) => {
                debug!(path = %key.path, "listing cache hit after wait");
                Ok(hit)
            }
            None => {
                debug!(path = %key.path, "listing cache miss");
                match fetch().await {
                    Ok(listing) => {
                        let listing = Arc::new(listing);
                        if !listing.is_empty() {
                            self.entries.write().await.insert(key.clone(), listing.clone());
                        }
                        Ok(listing)
                    }
                    Err(e) => Err(e),
                }
            }
        };

        drop(guard);
        self.release_flight(&key, flight).await;
        result
    }

    /// Drops every listing cached for `account`.
    pub async fn clear_account(&self, account: AccountId) {
        self.entries.write().await.retain(|key, _| key.account != account);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn release_flight(&self, key: &CacheKey, flight: Arc<Mutex<()>>) {
        let mut flights = self.flights.lock().await;
        // one reference in the map, one held here
        if Arc::strong_count(&flight) <= 2 {
            flights.remove(key);
        }
    }
}
