//! Stores, persisted zone records and validated delivery zones.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AxisOrder, Polygon, PolygonError, ZoneMatch};
use crate::types::{Coordinate, DeliveryZoneId, Money, MoneyError, StoreId};

/// Reasons a zone fails validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    /// The polygon is malformed.
    #[error("invalid polygon: {0}")]
    Polygon(#[from] PolygonError),
    /// The delivery fee is negative.
    #[error("invalid delivery fee: {0}")]
    InvalidFee(MoneyError),
    /// The free-delivery threshold is negative.
    #[error("invalid free delivery threshold: {0}")]
    InvalidThreshold(MoneyError),
    /// The zone name is empty or whitespace.
    #[error("zone name cannot be blank")]
    BlankName,
    /// The zone is attached to a different store than the one being resolved.
    #[error("zone belongs to store {found}, expected store {expected}")]
    ForeignStore {
        /// Store being resolved.
        expected: StoreId,
        /// Store recorded on the zone.
        found: StoreId,
    },
}

/// A store that owns delivery zones.
///
/// The location is metadata; it is only used to audit zone axis order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub location: Coordinate,
}

/// A delivery zone row as persisted, before validation.
///
/// The polygon is kept as raw JSON; [`DeliveryZone::try_from`] turns it into a
/// typed [`Polygon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ZoneRecord {
    pub id: DeliveryZoneId,
    pub store_id: StoreId,
    pub name: String,
    pub polygon: Value,
    pub delivery_fee: Decimal,
    pub free_delivery_threshold: Option<Decimal>,
}

/// A validated delivery zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryZone {
    pub id: DeliveryZoneId,
    pub store_id: StoreId,
    pub name: String,
    pub polygon: Polygon,
    pub delivery_fee: Money,
    pub free_delivery_threshold: Option<Money>,
}

impl DeliveryZone {
    /// Price delivery from this zone for the given subtotal.
    ///
    /// Delivery is free when the zone has a threshold and
    /// `subtotal >= threshold`.
    #[must_use]
    pub fn quote(&self, subtotal: Money) -> ZoneMatch {
        let is_free = self
            .free_delivery_threshold
            .is_some_and(|threshold| subtotal >= threshold);

        ZoneMatch {
            zone_id: self.id,
            zone_name: self.name.clone(),
            fee: if is_free { Money::ZERO } else { self.delivery_fee },
            is_free,
            free_threshold: self.free_delivery_threshold,
        }
    }
}

impl TryFrom<&ZoneRecord> for DeliveryZone {
    type Error = ZoneError;

    /// Validate a stored record. Stored polygons are always in (lat, lng) order.
    fn try_from(record: &ZoneRecord) -> Result<Self, Self::Error> {
        let polygon = Polygon::from_json(&record.polygon, AxisOrder::LatLng)?;
        let (delivery_fee, free_delivery_threshold) =
            validate_pricing(record.delivery_fee, record.free_delivery_threshold)?;

        Ok(Self {
            id: record.id,
            store_id: record.store_id,
            name: record.name.clone(),
            polygon,
            delivery_fee,
            free_delivery_threshold,
        })
    }
}

/// An unvalidated zone definition, as authored in a zone file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDraft {
    pub name: String,
    pub polygon: Value,
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub free_delivery_threshold: Option<Decimal>,
}

impl ZoneDraft {
    /// Validate the draft, converting its vertices from `order` to (lat, lng).
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self, store_id: StoreId, order: AxisOrder) -> Result<NewZone, ZoneError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ZoneError::BlankName);
        }

        let polygon = Polygon::from_json(&self.polygon, order)?;
        let (delivery_fee, free_delivery_threshold) =
            validate_pricing(self.delivery_fee, self.free_delivery_threshold)?;

        Ok(NewZone {
            store_id,
            name: name.to_owned(),
            polygon,
            delivery_fee,
            free_delivery_threshold,
        })
    }
}

/// A validated zone ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewZone {
    pub store_id: StoreId,
    pub name: String,
    pub polygon: Polygon,
    pub delivery_fee: Money,
    pub free_delivery_threshold: Option<Money>,
}

impl NewZone {
    /// Convert into a persisted record with the given id.
    #[must_use]
    pub fn into_record(self, id: DeliveryZoneId) -> ZoneRecord {
        ZoneRecord {
            id,
            store_id: self.store_id,
            name: self.name,
            polygon: self.polygon.to_json(),
            delivery_fee: self.delivery_fee.amount(),
            free_delivery_threshold: self.free_delivery_threshold.map(|t| t.amount()),
        }
    }
}

/// A zone file: one store and the complete set of its zones.
///
/// `axis_order` has no default; every file must say how its vertices are laid
/// out.
///
/// ```yaml
/// store:
///   id: 1
///   name: Bloom Voronezh
///   location: { latitude: 51.6615, longitude: 39.2003 }
/// axis_order: lat-lng
/// zones:
///   - name: Центр
///     polygon: [[51.65, 39.19], [51.65, 39.22], [51.68, 39.22], [51.68, 39.19]]
///     delivery_fee: 200
///     free_delivery_threshold: 3000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneFile {
    pub store: Store,
    pub axis_order: AxisOrder,
    pub zones: Vec<ZoneDraft>,
}

impl ZoneFile {
    /// Validate every zone in the file.
    ///
    /// # Errors
    ///
    /// Returns every failing zone as `(position, name, error)` so that an
    /// operator can fix the whole file in one pass.
    pub fn validate(&self) -> Result<Vec<NewZone>, Vec<(usize, String, ZoneError)>> {
        let mut zones = Vec::with_capacity(self.zones.len());
        let mut errors = Vec::new();

        for (position, draft) in self.zones.iter().enumerate() {
            match draft.validate(self.store.id, self.axis_order) {
                Ok(zone) => zones.push(zone),
                Err(e) => errors.push((position, draft.name.clone(), e)),
            }
        }

        if errors.is_empty() {
            Ok(zones)
        } else {
            Err(errors)
        }
    }
}

fn validate_pricing(
    fee: Decimal,
    threshold: Option<Decimal>,
) -> Result<(Money, Option<Money>), ZoneError> {
    let fee = Money::new(fee).map_err(ZoneError::InvalidFee)?;
    let threshold = threshold
        .map(Money::new)
        .transpose()
        .map_err(ZoneError::InvalidThreshold)?;
    Ok((fee, threshold))
}
