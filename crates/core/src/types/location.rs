//! Location record type.

use serde::{Deserialize, Serialize};

/// Placeholder city used when coordinates were obtained but reverse
/// geocoding failed.
pub const PLACEHOLDER_CITY: &str = "GPS Location";
/// Placeholder state paired with [`PLACEHOLDER_CITY`].
pub const PLACEHOLDER_STATE: &str = "Detected";
/// Placeholder district paired with [`PLACEHOLDER_CITY`].
pub const PLACEHOLDER_DISTRICT: &str = "GPS Area";

/// A resolved location.
///
/// Records are replaced wholesale on every successful acquisition - fields
/// are never merged between records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Latitude in decimal degrees, if a fix was obtained.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, if a fix was obtained.
    #[serde(default)]
    pub longitude: Option<f64>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
    pub district: String,
}

impl LocationRecord {
    /// The hard-coded fallback location (Delhi) used when nothing better is
    /// available.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            latitude: Some(28.6139),
            longitude: Some(77.2090),
            city: "Delhi".to_owned(),
            state: "Delhi".to_owned(),
            country: "India".to_owned(),
            pincode: "110001".to_owned(),
            district: "Delhi".to_owned(),
        }
    }

    /// A coordinates-only record for a fix that could not be reverse
    /// geocoded. Still counts as complete; see [`Self::is_geocoded`] for
    /// consumers that need to tell the difference.
    #[must_use]
    pub fn unresolved(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            city: PLACEHOLDER_CITY.to_owned(),
            state: PLACEHOLDER_STATE.to_owned(),
            country: "India".to_owned(),
            pincode: "000000".to_owned(),
            district: PLACEHOLDER_DISTRICT.to_owned(),
        }
    }

    /// Whether this record is usable as a saved location.
    ///
    /// A record with only coordinates and no city/state is considered
    /// incomplete and must be enriched before being trusted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.city.is_empty() && !self.state.is_empty()
    }

    /// Whether the city/state came from an actual geocoder rather than the
    /// unresolved-fix placeholders.
    #[must_use]
    pub fn is_geocoded(&self) -> bool {
        self.is_complete() && self.city != PLACEHOLDER_CITY && self.state != PLACEHOLDER_STATE
    }
}
