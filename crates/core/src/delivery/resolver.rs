//! Delivery zone resolution.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::{DeliveryZone, ZoneError, ZoneRecord};
use crate::types::{Coordinate, CoordinateError, DeliveryZoneId, Money, StoreId};

/// A request that failed validation before any zone was looked at.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// The delivery point is not a valid coordinate.
    #[error("invalid delivery point: {0}")]
    Point(#[from] CoordinateError),
    /// The subtotal is below zero.
    #[error("subtotal must not be negative")]
    NegativeSubtotal,
}

/// Errors returned by [`resolve`].
///
/// A point outside every zone is not an error; see [`Resolution::NoZoneMatched`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The store does not exist.
    #[error("store {0} not found")]
    NotFound(StoreId),
    /// The request itself is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
}

/// A validated delivery pricing request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryRequest {
    pub store_id: StoreId,
    pub point: Coordinate,
    pub subtotal: Money,
}

impl DeliveryRequest {
    /// Validate raw request values.
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the point is not a valid coordinate or the
    /// subtotal is negative.
    pub fn new(
        store_id: StoreId,
        latitude: f64,
        longitude: f64,
        subtotal: Decimal,
    ) -> Result<Self, InputError> {
        let point = Coordinate::new(latitude, longitude)?;
        let subtotal = Money::new(subtotal).map_err(|_| InputError::NegativeSubtotal)?;

        Ok(Self {
            store_id,
            point,
            subtotal,
        })
    }
}

/// The zone that matched a delivery point, and the resulting fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneMatch {
    pub zone_id: DeliveryZoneId,
    pub zone_name: String,
    /// Fee to charge; zero when `is_free`.
    pub fee: Money,
    pub is_free: bool,
    /// The zone's free-delivery threshold, if it has one.
    pub free_threshold: Option<Money>,
}

impl ZoneMatch {
    /// How much more the customer has to spend for free delivery.
    ///
    /// `None` when delivery is already free or the zone has no threshold.
    #[must_use]
    pub fn amount_until_free(&self, subtotal: Money) -> Option<Money> {
        if self.is_free {
            return None;
        }
        self.free_threshold
            .and_then(|threshold| threshold.checked_sub(subtotal))
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The point lies inside a zone.
    Matched(ZoneMatch),
    /// The store has no zone covering the point.
    NoZoneMatched,
}

/// Resolve the delivery zone and fee for a point.
///
/// `zones` is the store's zone list as fetched from storage; `None` means the
/// store does not exist.
///
/// # Errors
///
/// Returns `ResolveError::InvalidInput` for a bad coordinate or negative
/// subtotal, and `ResolveError::NotFound` if `zones` is `None`.
pub fn resolve(
    store_id: StoreId,
    zones: Option<&[ZoneRecord]>,
    latitude: f64,
    longitude: f64,
    subtotal: Decimal,
) -> Result<Resolution, ResolveError> {
    let request = DeliveryRequest::new(store_id, latitude, longitude, subtotal)?;
    resolve_request(&request, zones)
}

/// Resolve an already-validated request.
///
/// Zones are scanned in ascending id order (input order breaks ties) and the
/// first zone containing the point wins. Zones that fail validation are
/// skipped with a warning.
///
/// # Errors
///
/// Returns `ResolveError::NotFound` if `zones` is `None`.
pub fn resolve_request(
    request: &DeliveryRequest,
    zones: Option<&[ZoneRecord]>,
) -> Result<Resolution, ResolveError> {
    let zones = zones.ok_or(ResolveError::NotFound(request.store_id))?;

    let mut ordered: Vec<&ZoneRecord> = zones.iter().collect();
    ordered.sort_by_key(|record| record.id);

    for record in ordered {
        let zone = match validate(record, request.store_id) {
            Ok(zone) => zone,
            Err(reason) => {
                warn!(
                    zone_id = %record.id,
                    store_id = %request.store_id,
                    reason = %reason,
                    "Skipping malformed delivery zone"
                );
                continue;
            }
        };

        if zone.polygon.contains(request.point) {
            debug!(
                zone_id = %zone.id,
                store_id = %request.store_id,
                point = %request.point,
                "Delivery zone matched"
            );
            return Ok(Resolution::Matched(zone.quote(request.subtotal)));
        }
    }

    debug!(
        store_id = %request.store_id,
        point = %request.point,
        "No delivery zone matched"
    );
    Ok(Resolution::NoZoneMatched)
}

fn validate(record: &ZoneRecord, store_id: StoreId) -> Result<DeliveryZone, ZoneError> {
    if record.store_id != store_id {
        return Err(ZoneError::ForeignStore {
            expected: store_id,
            found: record.store_id,
        });
    }
    DeliveryZone::try_from(record)
}
