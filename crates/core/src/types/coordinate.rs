//! Geographic coordinate type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Coordinate`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    /// Latitude is NaN or infinite.
    #[error("latitude must be a finite number")]
    NonFiniteLatitude,
    /// Longitude is NaN or infinite.
    #[error("longitude must be a finite number")]
    NonFiniteLongitude,
    /// Latitude is outside -90..=90.
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    /// Longitude is outside -180..=180.
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 coordinate in canonical (latitude, longitude) order.
///
/// ## Constraints
///
/// - Both components are finite
/// - Latitude is within -90..=90
/// - Longitude is within -180..=180
///
/// ## Examples
///
/// ```
/// use bloom_core::Coordinate;
///
/// let point = Coordinate::new(51.66, 39.20).unwrap();
/// assert!((point.latitude() - 51.66).abs() < f64::EPSILON);
///
/// assert!(Coordinate::new(91.0, 39.20).is_err());   // latitude out of range
/// assert!(Coordinate::new(51.66, f64::NAN).is_err()); // not a number
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Valid latitude range in degrees.
    pub const LATITUDE_RANGE: core::ops::RangeInclusive<f64> = -90.0..=90.0;
    /// Valid longitude range in degrees.
    pub const LONGITUDE_RANGE: core::ops::RangeInclusive<f64> = -180.0..=180.0;

    /// Create a coordinate from a latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() {
            return Err(CoordinateError::NonFiniteLatitude);
        }
        if !longitude.is_finite() {
            return Err(CoordinateError::NonFiniteLongitude);
        }
        if !Self::LATITUDE_RANGE.contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !Self::LONGITUDE_RANGE.contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the coordinate with latitude and longitude exchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the current longitude is not a valid latitude.
    pub fn swapped(&self) -> Result<Self, CoordinateError> {
        Self::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_range_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(
            Coordinate::new(f64::INFINITY, 0.0),
            Err(CoordinateError::NonFiniteLatitude)
        );
        assert_eq!(
            Coordinate::new(0.0, f64::NAN),
            Err(CoordinateError::NonFiniteLongitude)
        );
    }

    #[test]
    fn test_swapped() {
        let point = Coordinate::new(51.66, 39.20).unwrap();
        let swapped = point.swapped().unwrap();
        assert_eq!(swapped, Coordinate::new(39.20, 51.66).unwrap());

        // A longitude beyond 90 can never become a latitude
        let far_east = Coordinate::new(43.1, 131.9).unwrap();
        assert!(far_east.swapped().is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 51.66, "longitude": 39.2}"#);
        assert!(ok.is_ok());

        let bad: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 151.66, "longitude": 39.2}"#);
        assert!(bad.is_err());
    }
}
