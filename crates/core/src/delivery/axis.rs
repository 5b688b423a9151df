//! Vertex axis order and swapped-axis auditing.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Polygon;
use crate::types::Coordinate;

/// Maximum distance, in degrees, between a store and one of its zones for the
/// audit to consider them related (roughly 200 km at mid latitudes).
const AUDIT_RADIUS_DEGREES: f64 = 2.0;

/// Layout of each `[a, b]` pair in raw vertex data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisOrder {
    /// `[latitude, longitude]`, the canonical storage order.
    LatLng,
    /// `[longitude, latitude]`, as used by GeoJSON and most map widgets.
    LngLat,
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatLng => write!(f, "lat-lng"),
            Self::LngLat => write!(f, "lng-lat"),
        }
    }
}

impl std::str::FromStr for AxisOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lat-lng" => Ok(Self::LatLng),
            "lng-lat" => Ok(Self::LngLat),
            _ => Err(format!("invalid axis order: {s} (expected lat-lng or lng-lat)")),
        }
    }
}

/// Outcome of [`audit_axis_order`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AxisAudit {
    /// The polygon lies near the store as stored.
    Consistent {
        /// Distance in degrees from the store to the polygon's bounding box.
        distance: f64,
    },
    /// The polygon is far from the store but its axis-swapped form is near.
    LikelySwapped {
        /// Distance as stored.
        distance: f64,
        /// Distance after swapping axes.
        swapped_distance: f64,
    },
    /// Neither orientation is near the store.
    Inconclusive {
        /// Distance as stored.
        distance: f64,
    },
}

/// Check whether a stored polygon is plausibly in (lat, lng) order.
///
/// The store's own coordinate is the reference: a delivery zone is expected to
/// lie within two degrees of its store. This never changes data;
/// a `LikelySwapped` verdict is for an operator to act on.
#[must_use]
pub fn audit_axis_order(polygon: &Polygon, store_location: Coordinate) -> AxisAudit {
    let distance = polygon.bounding_box().distance_to(store_location);
    let swapped_distance = polygon
        .swapped()
        .ok()
        .map(|swapped| swapped.bounding_box().distance_to(store_location));

    match swapped_distance {
        Some(swapped_distance)
            if distance > AUDIT_RADIUS_DEGREES
                && swapped_distance < distance
                && swapped_distance <= AUDIT_RADIUS_DEGREES =>
        {
            AxisAudit::LikelySwapped {
                distance,
                swapped_distance,
            }
        }
        _ if distance <= AUDIT_RADIUS_DEGREES => AxisAudit::Consistent { distance },
        _ => AxisAudit::Inconclusive { distance },
    }
}
