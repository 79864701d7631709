//! Location manager.
//!
//! Owns the `kisan_setu.location` and `kisan_setu.location_enabled` slices
//! of the store. A location is acquired by walking an ordered list of
//! [`AcquisitionStrategy`] values and taking the first success; the chain is
//! data, so each branch tests on its own. Every acquisition path terminates
//! in a persisted record - callers never see an error, only a location.

mod providers;
mod strategy;

pub use providers::{
    BigDataCloudGeocoder, Coordinates, GeocodedPlace, GeolocationProvider, IpApiLocator,
    IpLocate, NoGeolocation, ReverseGeocode,
};
pub use strategy::{
    AcquisitionStrategy, DefaultStrategy, DeviceStrategy, IpStrategy, standard_chain,
};

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;

use kisan_setu_core::LocationRecord;

use crate::store::{KeyValueStore, StoreExt, keys};

/// Errors inside the acquisition chain. These never escape
/// [`LocationManager::acquire`]; they decide which strategy runs next.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The user or platform refused to provide a fix.
    #[error("geolocation denied: {0}")]
    Denied(String),

    /// No fix arrived within the configured bound.
    #[error("geolocation timed out after {0:?}")]
    Timeout(Duration),

    /// A lookup service could not be reached.
    #[error("lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A lookup service answered with something unusable.
    #[error("lookup response unusable: {0}")]
    Parse(#[from] serde_json::Error),

    /// No way to obtain this kind of fix on this host.
    #[error("geolocation unavailable: {0}")]
    Unavailable(String),
}

/// How the current record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// The hard-coded fallback; never persisted as enabled.
    Default,
    /// Acquired or explicitly set, persisted with the enabled flag.
    UserConfirmed,
}

/// Snapshot of the manager's state for rendering.
#[derive(Debug, Clone)]
pub struct LocationState {
    pub record: LocationRecord,
    /// True only while an acquisition chain is running.
    pub is_loading: bool,
}

struct Inner {
    record: LocationRecord,
    source: LocationSource,
    loading: bool,
}

/// Manages the saved location and the acquisition fallback chain.
pub struct LocationManager {
    store: Arc<dyn KeyValueStore>,
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
    inner: Mutex<Inner>,
}

impl LocationManager {
    /// Create a manager over `store` with an ordered acquisition chain.
    ///
    /// If a complete record was saved with the enabled flag set, it becomes
    /// the current, user-confirmed location. Anything else (nothing saved,
    /// flag unset, incomplete or corrupt record) starts from the hard-coded
    /// default, which is not itself persisted as enabled.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        strategies: Vec<Box<dyn AcquisitionStrategy>>,
    ) -> Self {
        let saved = store
            .read_json::<LocationRecord>(keys::LOCATION)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "location storage unreadable");
                None
            });
        let enabled = store
            .read_json::<bool>(keys::LOCATION_ENABLED)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "location flag unreadable");
                None
            })
            .unwrap_or(false);

        let inner = match saved {
            Some(record) if enabled && record.is_complete() => Inner {
                record,
                source: LocationSource::UserConfirmed,
                loading: false,
            },
            _ => Inner {
                record: LocationRecord::fallback(),
                source: LocationSource::Default,
                loading: false,
            },
        };

        Self {
            store,
            strategies,
            inner: Mutex::new(inner),
        }
    }

    /// Current record plus loading flag.
    #[must_use]
    pub fn state(&self) -> LocationState {
        let inner = self.lock();
        LocationState {
            record: inner.record.clone(),
            is_loading: inner.loading,
        }
    }

    /// Whether the current record was confirmed rather than defaulted.
    #[must_use]
    pub fn source(&self) -> LocationSource {
        self.lock().source
    }

    /// Replace the current location wholesale and persist it, along with
    /// the enabled flag. Records are never field-merged.
    pub fn update(&self, record: LocationRecord) {
        if let Err(e) = self.store.write_json(keys::LOCATION, &record) {
            tracing::warn!(error = %e, "location not persisted, continuing in memory");
        }
        if let Err(e) = self.store.write_json(keys::LOCATION_ENABLED, &true) {
            tracing::warn!(error = %e, "location flag not persisted");
        }
        let mut inner = self.lock();
        inner.record = record;
        inner.source = LocationSource::UserConfirmed;
    }

    /// Run the acquisition chain and return the first location obtained.
    ///
    /// Never fails: strategy failures are logged and the next strategy is
    /// tried, and a chain built with [`standard_chain`] ends in the
    /// infallible default. The loading flag is set for the duration and
    /// reset on every exit path, including panics, via a drop guard.
    pub async fn acquire(&self) -> LocationRecord {
        let _loading = LoadingGuard::engage(&self.inner);

        for strategy in &self.strategies {
            match strategy.acquire().await {
                Ok(record) => {
                    tracing::debug!(strategy = strategy.name(), "location acquired");
                    self.update(record.clone());
                    return record;
                }
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "strategy failed");
                }
            }
        }

        // Only reachable with a custom chain that has no infallible tail.
        tracing::warn!("all acquisition strategies failed, using fallback");
        let record = LocationRecord::fallback();
        self.update(record.clone());
        record
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sets the loading flag on creation and clears it when dropped, so every
/// exit path out of an acquisition resets it.
struct LoadingGuard<'a> {
    inner: &'a Mutex<Inner>,
}

impl<'a> LoadingGuard<'a> {
    fn engage(inner: &'a Mutex<Inner>) -> Self {
        inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = true;
        Self { inner }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct Failing;

    #[async_trait]
    impl AcquisitionStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn acquire(&self) -> Result<LocationRecord, LocationError> {
            Err(LocationError::Unavailable("nope".to_owned()))
        }
    }

    struct Fixed(LocationRecord);

    #[async_trait]
    impl AcquisitionStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        async fn acquire(&self) -> Result<LocationRecord, LocationError> {
            Ok(self.0.clone())
        }
    }

    fn pune() -> LocationRecord {
        LocationRecord {
            latitude: Some(18.52),
            longitude: Some(73.86),
            city: "Pune".to_owned(),
            state: "Maharashtra".to_owned(),
            country: "India".to_owned(),
            pincode: "411001".to_owned(),
            district: "Pune".to_owned(),
        }
    }

    #[test]
    fn test_initializes_with_default_when_nothing_saved() {
        let manager = LocationManager::new(Arc::new(MemoryStore::new()), vec![]);
        let state = manager.state();

        assert!(!state.record.city.is_empty());
        assert!(!state.record.state.is_empty());
        assert_eq!(state.record.city, "Delhi");
        assert_eq!(manager.source(), LocationSource::Default);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_saved_record_without_flag_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.write_json(keys::LOCATION, &pune()).unwrap();

        let manager = LocationManager::new(store, vec![]);
        assert_eq!(manager.state().record.city, "Delhi");
        assert_eq!(manager.source(), LocationSource::Default);
    }

    #[test]
    fn test_incomplete_saved_record_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut rec = pune();
        rec.city = String::new();
        store.write_json(keys::LOCATION, &rec).unwrap();
        store.write_json(keys::LOCATION_ENABLED, &true).unwrap();

        let manager = LocationManager::new(store, vec![]);
        assert_eq!(manager.source(), LocationSource::Default);
    }

    #[test]
    fn test_update_round_trips_through_fresh_manager() {
        let store = Arc::new(MemoryStore::new());
        let manager = LocationManager::new(store.clone(), vec![]);
        manager.update(pune());

        let fresh = LocationManager::new(store, vec![]);
        assert_eq!(fresh.state().record, pune());
        assert_eq!(fresh.source(), LocationSource::UserConfirmed);
    }

    #[test]
    fn test_default_is_never_persisted_as_enabled() {
        let store = Arc::new(MemoryStore::new());
        let _manager = LocationManager::new(store.clone(), vec![]);

        let enabled: Option<bool> = store.read_json(keys::LOCATION_ENABLED).unwrap();
        assert!(enabled.is_none());
    }

    #[tokio::test]
    async fn test_acquire_takes_first_success() {
        let store = Arc::new(MemoryStore::new());
        let manager = LocationManager::new(
            store.clone(),
            vec![
                Box::new(Failing),
                Box::new(Fixed(pune())),
                Box::new(DefaultStrategy),
            ],
        );

        let record = manager.acquire().await;
        assert_eq!(record.city, "Pune");
        assert_eq!(manager.source(), LocationSource::UserConfirmed);

        // Persisted immediately.
        let saved: LocationRecord = store.read_json(keys::LOCATION).unwrap().unwrap();
        assert_eq!(saved, pune());
    }

    #[tokio::test]
    async fn test_acquire_never_fails_and_resets_loading() {
        let manager = LocationManager::new(
            Arc::new(MemoryStore::new()),
            vec![Box::new(Failing), Box::new(Failing)],
        );

        let record = manager.acquire().await;
        assert_eq!(record, LocationRecord::fallback());
        assert!(!manager.state().is_loading);
    }

    #[tokio::test]
    async fn test_full_chain_with_default_tail() {
        let manager = LocationManager::new(
            Arc::new(MemoryStore::new()),
            vec![Box::new(Failing), Box::new(DefaultStrategy)],
        );

        let record = manager.acquire().await;
        assert_eq!(record.city, "Delhi");
        assert!(!manager.state().is_loading);
    }
}
