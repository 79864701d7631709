//! Acquisition strategies.
//!
//! The original fallback logic was nested error handling; here it is an
//! ordered list of strategies the manager walks, taking the first success.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use kisan_setu_core::LocationRecord;

use super::providers::{
    BigDataCloudGeocoder, GeolocationProvider, IpApiLocator, IpLocate, ReverseGeocode,
};
use super::LocationError;
use crate::config::ClientConfig;

/// One way of obtaining a location fix.
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Attempt to obtain a location.
    async fn acquire(&self) -> Result<LocationRecord, LocationError>;
}

/// Device GPS plus reverse geocoding.
///
/// The position request is bounded by `timeout`. A geocoder failure after a
/// successful fix still succeeds, yielding the coordinates-only placeholder
/// record - a detected position beats no position.
pub struct DeviceStrategy {
    provider: Arc<dyn GeolocationProvider>,
    geocoder: Arc<dyn ReverseGeocode>,
    timeout: Duration,
}

impl DeviceStrategy {
    /// Create the device strategy.
    #[must_use]
    pub fn new(
        provider: Arc<dyn GeolocationProvider>,
        geocoder: Arc<dyn ReverseGeocode>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            geocoder,
            timeout,
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for DeviceStrategy {
    fn name(&self) -> &'static str {
        "device_gps"
    }

    async fn acquire(&self) -> Result<LocationRecord, LocationError> {
        let coords = tokio::time::timeout(self.timeout, self.provider.current_position())
            .await
            .map_err(|_| LocationError::Timeout(self.timeout))??;

        match self.geocoder.reverse(coords).await {
            Ok(place) => Ok(place.into_record(coords)),
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed, keeping raw coordinates");
                Ok(LocationRecord::unresolved(
                    coords.latitude,
                    coords.longitude,
                ))
            }
        }
    }
}

/// IP-based coarse lookup.
pub struct IpStrategy {
    locator: Arc<dyn IpLocate>,
}

impl IpStrategy {
    /// Create the IP strategy.
    #[must_use]
    pub fn new(locator: Arc<dyn IpLocate>) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl AcquisitionStrategy for IpStrategy {
    fn name(&self) -> &'static str {
        "ip_lookup"
    }

    async fn acquire(&self) -> Result<LocationRecord, LocationError> {
        self.locator.locate().await
    }
}

/// The infallible tail of the chain: the hard-coded default record.
pub struct DefaultStrategy;

#[async_trait]
impl AcquisitionStrategy for DefaultStrategy {
    fn name(&self) -> &'static str {
        "default"
    }

    async fn acquire(&self) -> Result<LocationRecord, LocationError> {
        Ok(LocationRecord::fallback())
    }
}

/// Build the production chain: device GPS, then IP lookup, then default.
#[must_use]
pub fn standard_chain(
    provider: Arc<dyn GeolocationProvider>,
    http: reqwest::Client,
    config: &ClientConfig,
) -> Vec<Box<dyn AcquisitionStrategy>> {
    vec![
        Box::new(DeviceStrategy::new(
            provider,
            Arc::new(BigDataCloudGeocoder::new(
                http.clone(),
                config.geocoder_url.clone(),
            )),
            config.gps_timeout,
        )),
        Box::new(IpStrategy::new(Arc::new(IpApiLocator::new(
            http,
            config.ip_lookup_url.clone(),
        )))),
        Box::new(DefaultStrategy),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::location::providers::{Coordinates, GeocodedPlace};

    struct FixedPosition(Coordinates);

    #[async_trait]
    impl GeolocationProvider for FixedPosition {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Ok(self.0)
        }
    }

    struct DeniedPosition;

    #[async_trait]
    impl GeolocationProvider for DeniedPosition {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::Denied("user said no".to_owned()))
        }
    }

    struct HangingPosition;

    #[async_trait]
    impl GeolocationProvider for HangingPosition {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            std::future::pending().await
        }
    }

    struct FixedGeocoder(GeocodedPlace);

    #[async_trait]
    impl ReverseGeocode for FixedGeocoder {
        async fn reverse(&self, _coords: Coordinates) -> Result<GeocodedPlace, LocationError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenGeocoder;

    #[async_trait]
    impl ReverseGeocode for BrokenGeocoder {
        async fn reverse(&self, _coords: Coordinates) -> Result<GeocodedPlace, LocationError> {
            Err(LocationError::Unavailable("geocoder down".to_owned()))
        }
    }

    fn coords() -> Coordinates {
        Coordinates {
            latitude: 28.6,
            longitude: 77.2,
        }
    }

    #[tokio::test]
    async fn test_device_strategy_geocodes_fix() {
        let strategy = DeviceStrategy::new(
            Arc::new(FixedPosition(coords())),
            Arc::new(FixedGeocoder(GeocodedPlace {
                city: Some("New Delhi".to_owned()),
                principal_subdivision: Some("Delhi".to_owned()),
                ..GeocodedPlace::default()
            })),
            Duration::from_secs(1),
        );

        let record = strategy.acquire().await.unwrap();
        assert_eq!(record.city, "New Delhi");
        assert_eq!(record.latitude, Some(28.6));
        assert!(record.is_geocoded());
    }

    #[tokio::test]
    async fn test_device_strategy_keeps_coordinates_when_geocoder_fails() {
        let strategy = DeviceStrategy::new(
            Arc::new(FixedPosition(coords())),
            Arc::new(BrokenGeocoder),
            Duration::from_secs(1),
        );

        let record = strategy.acquire().await.unwrap();
        assert_eq!(record.latitude, Some(28.6));
        assert_eq!(record.city, "GPS Location");
        assert!(record.is_complete());
        assert!(!record.is_geocoded());
    }

    #[tokio::test]
    async fn test_device_strategy_propagates_denial() {
        let strategy = DeviceStrategy::new(
            Arc::new(DeniedPosition),
            Arc::new(BrokenGeocoder),
            Duration::from_secs(1),
        );

        assert!(matches!(
            strategy.acquire().await,
            Err(LocationError::Denied(_))
        ));
    }

    #[tokio::test]
    async fn test_device_strategy_times_out() {
        let strategy = DeviceStrategy::new(
            Arc::new(HangingPosition),
            Arc::new(BrokenGeocoder),
            Duration::from_millis(10),
        );

        assert!(matches!(
            strategy.acquire().await,
            Err(LocationError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_default_strategy_is_infallible() {
        let record = DefaultStrategy.acquire().await.unwrap();
        assert_eq!(record, LocationRecord::fallback());
    }
}
