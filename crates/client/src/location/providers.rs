//! Ports to the outside world: device geolocation, reverse geocoding, and
//! IP-based lookup. Each is a trait so tests can run the fallback chain
//! without a network.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use kisan_setu_core::LocationRecord;

use super::LocationError;

/// A raw geolocation fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Device geolocation capability.
///
/// Implementations must return a fresh fix, never a cached one; staleness
/// is handled by asking again, not by trusting old answers.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Obtain the device's current coordinates, or fail with denied /
    /// unavailable.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// The no-capability provider for headless hosts; always unavailable, which
/// sends the chain straight to the IP lookup.
#[derive(Debug, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable(
            "no device geolocation on this host".to_owned(),
        ))
    }
}

/// Coordinates resolved to an administrative place.
///
/// All fields are optional; [`GeocodedPlace::into_record`] substitutes the
/// literal `"Unknown"` (and service-specific defaults) for whatever the
/// lookup omitted.
#[derive(Debug, Clone, Default)]
pub struct GeocodedPlace {
    pub city: Option<String>,
    pub locality: Option<String>,
    pub principal_subdivision: Option<String>,
    pub country_name: Option<String>,
    pub postcode: Option<String>,
    pub district: Option<String>,
}

impl GeocodedPlace {
    /// Build a full location record, filling gaps the way the marketplace
    /// expects: city falls back through locality and subdivision, country
    /// defaults to India, pincode to 000000.
    #[must_use]
    pub fn into_record(self, coords: Coordinates) -> LocationRecord {
        let city = self
            .city
            .or(self.locality)
            .or_else(|| self.principal_subdivision.clone())
            .unwrap_or_else(|| "Unknown".to_owned());
        LocationRecord {
            latitude: Some(coords.latitude),
            longitude: Some(coords.longitude),
            state: self
                .principal_subdivision
                .unwrap_or_else(|| "Unknown".to_owned()),
            country: self.country_name.unwrap_or_else(|| "India".to_owned()),
            pincode: self.postcode.unwrap_or_else(|| "000000".to_owned()),
            district: self.district.unwrap_or_else(|| city.clone()),
            city,
        }
    }
}

/// Reverse geocoding: coordinates in, administrative place out.
#[async_trait]
pub trait ReverseGeocode: Send + Sync {
    async fn reverse(&self, coords: Coordinates) -> Result<GeocodedPlace, LocationError>;
}

/// Reverse geocoder backed by the BigDataCloud client endpoint (keyless).
#[derive(Debug, Clone)]
pub struct BigDataCloudGeocoder {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    principal_subdivision: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
    #[serde(default)]
    locality_info: Option<LocalityInfo>,
}

#[derive(Debug, Deserialize)]
struct LocalityInfo {
    #[serde(default)]
    administrative: Vec<AdminArea>,
}

#[derive(Debug, Deserialize)]
struct AdminArea {
    #[serde(default)]
    name: String,
}

impl BigDataCloudGeocoder {
    /// Create a geocoder calling `endpoint`.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

/// Collapse the service's empty strings into proper absences.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[async_trait]
impl ReverseGeocode for BigDataCloudGeocoder {
    #[instrument(skip(self))]
    async fn reverse(&self, coords: Coordinates) -> Result<GeocodedPlace, LocationError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("localityLanguage", "en".to_owned()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = response.json().await?;

        // The third administrative level is the district where present.
        let district = body
            .locality_info
            .as_ref()
            .and_then(|info| info.administrative.get(2))
            .map(|area| area.name.clone());

        Ok(GeocodedPlace {
            city: non_empty(body.city),
            locality: non_empty(body.locality),
            principal_subdivision: non_empty(body.principal_subdivision),
            country_name: non_empty(body.country_name),
            postcode: non_empty(body.postcode),
            district: non_empty(district),
        })
    }
}

/// IP-based geolocation: a coarse fix with no device involvement.
#[async_trait]
pub trait IpLocate: Send + Sync {
    async fn locate(&self) -> Result<LocationRecord, LocationError>;
}

/// IP locator backed by an ipapi.co-style JSON endpoint.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    postal: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl IpApiLocator {
    /// Create a locator calling `endpoint`.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl IpLocate for IpApiLocator {
    #[instrument(skip(self))]
    async fn locate(&self) -> Result<LocationRecord, LocationError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?;
        let body: IpLookupResponse = response.json().await?;

        let city = non_empty(body.city);
        let region = non_empty(body.region);
        if city.is_none() && region.is_none() {
            // Nothing usable; let the chain fall through to the default.
            return Err(LocationError::Unavailable(
                "ip lookup returned no usable location".to_owned(),
            ));
        }

        let city = city.unwrap_or_else(|| "Unknown".to_owned());
        Ok(LocationRecord {
            latitude: body.latitude,
            longitude: body.longitude,
            state: region.unwrap_or_else(|| "Unknown".to_owned()),
            country: non_empty(body.country_name).unwrap_or_else(|| "India".to_owned()),
            pincode: non_empty(body.postal).unwrap_or_else(|| "000000".to_owned()),
            district: city.clone(),
            city,
        })
    }
}
