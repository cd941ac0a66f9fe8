//! Parent-zone name server cache.
//!
//! Finding a parent zone's name server (usually a TLD server) is the most
//! repeated lookup in a run: every `*.com` domain needs the same answer. The
//! cache memoizes it for the life of the process, or for a configured TTL.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;

#[derive(Debug)]
struct CachedHost {
    host: String,
    inserted_at: Instant,
}

type Slot = Arc<OnceCell<CachedHost>>;

/// Thread-safe map from parent zone name to its first discovered name server.
///
/// Each zone owns a slot that is filled at most once. The map lock is only
/// held long enough to find or create the slot; the resolution itself runs on
/// the slot, so concurrent first-time lookups of the same parent share one
/// resolver call while lookups of different parents proceed in parallel.
///
/// # Thread Safety
///
/// Share it across workers with `Arc`. A poisoned lock is recovered from: the
/// map only ever holds complete entries, so a panic elsewhere cannot leave a
/// half-written value behind.
#[derive(Debug, Default)]
pub struct ParentCache {
    slots: Mutex<HashMap<String, Slot>>,
    ttl: Option<Duration>,
}

impl ParentCache {
    /// Creates a cache whose entries never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache whose entries expire after `ttl` (`None` = never).
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CachedHost) -> bool {
        self.ttl
            .map_or(true, |ttl| entry.inserted_at.elapsed() < ttl)
    }

    /// Returns the cached name server for `zone`, if present and not expired.
    pub fn get(&self, zone: &str) -> Option<String> {
        let mut slots = self.slots();
        match slots.get(zone)?.get() {
            Some(entry) if self.is_fresh(entry) => return Some(entry.host.clone()),
            Some(_) => {}
            None => return None,
        }
        log::debug!("Parent cache entry for {zone} expired");
        slots.remove(zone);
        None
    }

    /// Stores `host` as the name server for `zone`, replacing any previous entry.
    pub fn put(&self, zone: &str, host: &str) {
        let entry = CachedHost {
            host: host.to_string(),
            inserted_at: Instant::now(),
        };
        self.slots()
            .insert(zone.to_string(), Arc::new(OnceCell::new_with(Some(entry))));
    }

    /// Returns the cached name server for `zone`, running `resolve` on a miss.
    ///
    /// Concurrent callers missing on the same zone wait for one shared
    /// resolution. If `resolve` fails nothing is cached and the error is
    /// returned; the next caller tries again.
    pub async fn get_or_resolve<F, Fut, E>(&self, zone: &str, resolve: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let slot = {
            let mut slots = self.slots();
            let stale = slots
                .get(zone)
                .and_then(|slot| slot.get())
                .is_some_and(|entry| !self.is_fresh(entry));
            if stale {
                log::debug!("Parent cache entry for {zone} expired");
                slots.remove(zone);
            }
            Arc::clone(slots.entry(zone.to_string()).or_default())
        };

        let entry = slot
            .get_or_try_init(|| async move {
                let host = resolve().await?;
                Ok(CachedHost {
                    host,
                    inserted_at: Instant::now(),
                })
            })
            .await?;
        Ok(entry.host.clone())
    }

    /// Number of zones with a resolved name server.
    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Returns `true` if no zone has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
