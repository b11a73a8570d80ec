use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::error::RateError;
use crate::fetcher::RateFetcher;
use crate::snapshot::{CachedRates, RateSnapshot};
use crate::store::SnapshotStore;

/// Single-slot daily rate cache.
///
/// A snapshot is served as fresh for the calendar day (in `tz`) it was
/// fetched on. Once the day rolls over, the next [`RateCache::get`] refreshes
/// it; if that refresh fails, the previous snapshot is served as stale.
pub struct RateCache {
    slot: RwLock<Option<Arc<RateSnapshot>>>,
    force_refresh: AtomicBool,
    fetcher: Arc<dyn RateFetcher>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    store: Option<Arc<dyn SnapshotStore>>,
}

impl RateCache {
    pub fn new(fetcher: Arc<dyn RateFetcher>, clock: Arc<dyn Clock>, tz: Tz) -> Self {
        Self {
            slot: RwLock::new(None),
            force_refresh: AtomicBool::new(false),
            fetcher,
            clock,
            tz,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.tz).date_naive()
    }

    pub async fn get(&self) -> Result<CachedRates, RateError> {
        let today = self.today();
        let forced = self.force_refresh.swap(false, Ordering::SeqCst);

        let current = self.slot.read().await.clone();
        match current {
            Some(snapshot) if snapshot.is_fresh_on(today) && !forced => {
                debug!("Returning cached exchange rates for {}", today);
                return Ok(CachedRates::fresh(snapshot));
            }
            Some(_) if forced => info!("Revalidation requested"),
            Some(snapshot) => info!(
                "Cache expired. Cached date: {}, today: {}",
                snapshot.for_date, today
            ),
            None => {}
        }

        info!("Fetching new exchange rates...");
        match self.fetcher.fetch().await {
            Ok(rates) => {
                let snapshot = Arc::new(rates.for_date(today));
                *self.slot.write().await = Some(snapshot.clone());
                info!(
                    "Cached new exchange rates for {}: USD {} EUR {}",
                    today, snapshot.usd_per_unit, snapshot.eur_per_unit
                );
                self.persist(&snapshot).await;
                Ok(CachedRates::fresh(snapshot))
            }
            Err(e) => {
                warn!("Error fetching exchange rates: {}", e);
                let previous = self.slot.read().await.clone();
                match previous {
                    Some(previous) => {
                        warn!(
                            "Returning stale exchange rates from {}",
                            previous.for_date
                        );
                        Ok(CachedRates::stale(previous))
                    }
                    None => {
                        error!("No cached exchange rates to fall back to");
                        Err(RateError::Unavailable(e))
                    }
                }
            }
        }
    }

    /// Makes the next [`RateCache::get`] fetch even if the snapshot is from today.
    /// The snapshot stays available as a fallback.
    pub fn revalidate(&self) {
        info!("Exchange rates marked for revalidation");
        self.force_refresh.store(true, Ordering::SeqCst);
    }

    pub async fn peek(&self) -> Option<Arc<RateSnapshot>> {
        self.slot.read().await.clone()
    }

    /// Loads the last persisted snapshot into an empty slot.
    pub async fn restore(&self) -> anyhow::Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        let Some(snapshot) = store.latest().await? else {
            info!("No persisted exchange rates found");
            return Ok(false);
        };

        let mut slot = self.slot.write().await;
        if slot.is_some() {
            return Ok(false);
        }
        info!("Restored exchange rates from {}", snapshot.for_date);
        *slot = Some(Arc::new(snapshot));
        Ok(true)
    }

    async fn persist(&self, snapshot: &RateSnapshot) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(snapshot).await {
                warn!("Can't persist exchange rates: {:#}", e);
            }
        }
    }
}
