//! Delivery zone management commands.
//!
//! # Usage
//!
//! ```bash
//! # Replace a store's zones with the contents of a file
//! bloom-cli zones import zones/voronezh.yaml
//!
//! # Audit every stored zone, or one store's
//! bloom-cli zones audit
//! bloom-cli zones audit --store 1
//!
//! # Swap the axes of one stored polygon
//! bloom-cli zones swap-axes 7
//! ```
//!
//! Zone files must declare `axis_order` (`lat-lng` or `lng-lat`). Polygons are
//! always stored as `[lat, lng]` pairs. Rows written before that rule existed
//! are found by `audit` and repaired one at a time by `swap-axes`.
//!
//! The storefront caches zones per store, so changes become visible there
//! within `DELIVERY_ZONE_CACHE_TTL_SECS`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use bloom_core::delivery::{
    AxisAudit, AxisOrder, DeliveryZone, Polygon, ZoneError, ZoneRecord, audit_axis_order,
};
use bloom_core::{Coordinate, DeliveryZoneId, StoreId};
use bloom_storefront::db::ZoneRepository;

use super::{CommandError, connect, read_zone_file, validate_zone_file};

/// Import a zone file, replacing all zones of its store.
///
/// Every zone is validated before anything is written; a single invalid zone
/// aborts the import.
///
/// # Errors
///
/// Returns `CommandError::InvalidZones` if any zone fails validation, or a
/// database error if the write fails.
pub async fn import(path: &Path) -> Result<(), CommandError> {
    let file = read_zone_file(path)?;
    let zones = validate_zone_file(&file)?;

    for zone in &zones {
        let verdict = audit_axis_order(&zone.polygon, file.store.location);
        if matches!(verdict, AxisAudit::LikelySwapped { .. }) {
            tracing::warn!(
                zone = %zone.name,
                axis_order = %file.axis_order,
                ?verdict,
                "Zone is far from its store but would be near with axes swapped; check axis_order"
            );
        }
    }

    let pool = connect().await?;
    let ids = ZoneRepository::new(&pool)
        .replace_zones(&file.store, &zones)
        .await?;

    tracing::info!(
        store_id = %file.store.id,
        store = %file.store.name,
        zones = ids.len(),
        "Zones imported"
    );
    Ok(())
}

/// Print a report of malformed and suspicious zones.
///
/// Read-only: nothing is changed.
///
/// # Errors
///
/// Returns `CommandError::StoreNotFound` if `store` is given but unknown, or a
/// database error.
#[allow(clippy::print_stdout)]
pub async fn audit(store: Option<StoreId>) -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = ZoneRepository::new(&pool);

    let stores: BTreeMap<StoreId, Coordinate> = repo
        .list_stores()
        .await?
        .into_iter()
        .map(|s| (s.id, s.location))
        .collect();

    if let Some(id) = store
        && !stores.contains_key(&id)
    {
        return Err(CommandError::StoreNotFound(id));
    }

    let zones = repo.all_zones(store).await?;
    let mut flagged = 0_usize;

    for record in &zones {
        let Some(&location) = stores.get(&record.store_id) else {
            continue;
        };

        let finding = inspect(record, location);
        if finding.needs_attention() {
            flagged += 1;
        }

        println!(
            "store {:>4}  zone {:>6}  {:<24}  {finding}",
            record.store_id, record.id, record.name
        );
    }

    println!("{} zone(s) checked, {flagged} need attention", zones.len());
    Ok(())
}

/// Rewrite one stored polygon with latitude and longitude exchanged.
///
/// # Errors
///
/// Returns `CommandError::ZoneNotFound` for an unknown zone and
/// `CommandError::Zone` if the swapped polygon is invalid.
pub async fn swap_axes(zone_id: DeliveryZoneId) -> Result<(), CommandError> {
    let pool = connect().await?;
    let repo = ZoneRepository::new(&pool);

    let record = repo
        .get_zone(zone_id)
        .await?
        .ok_or(CommandError::ZoneNotFound(zone_id))?;

    let polygon = swapped_polygon(&record)?;

    if let Some(store) = repo.get_store(record.store_id).await? {
        let verdict = audit_axis_order(&polygon, store.location);
        if !matches!(verdict, AxisAudit::Consistent { .. }) {
            tracing::warn!(%zone_id, ?verdict, "Swapped polygon is still not near its store");
        }
    }

    repo.update_polygon(zone_id, &polygon).await?;

    tracing::info!(%zone_id, zone = %record.name, "Polygon axes swapped");
    Ok(())
}

/// Read the stored vertices as `[lng, lat]`, which yields the swapped polygon
/// in canonical order.
fn swapped_polygon(record: &ZoneRecord) -> Result<Polygon, CommandError> {
    Polygon::from_json(&record.polygon, AxisOrder::LngLat)
        .map_err(|e| CommandError::Zone(record.id, ZoneError::from(e)))
}

/// Audit result for one stored zone.
#[derive(Debug, Clone, PartialEq)]
enum Finding {
    /// Zone is valid; verdict of the axis check.
    Audited(AxisAudit),
    /// Invalid as stored, but valid with axes swapped.
    SwappedOutOfRange,
    /// Zone is invalid either way and is skipped by quoting.
    Malformed(ZoneError),
}

impl Finding {
    const fn needs_attention(&self) -> bool {
        !matches!(self, Self::Audited(AxisAudit::Consistent { .. }))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audited(AxisAudit::Consistent { distance }) => {
                write!(f, "ok ({distance:.3} deg from store)")
            }
            Self::Audited(AxisAudit::LikelySwapped {
                distance,
                swapped_distance,
            }) => write!(
                f,
                "LIKELY SWAPPED ({distance:.3} deg as stored, {swapped_distance:.3} deg swapped); run swap-axes"
            ),
            Self::Audited(AxisAudit::Inconclusive { distance }) => {
                write!(f, "FAR FROM STORE ({distance:.3} deg either way)")
            }
            Self::SwappedOutOfRange => {
                write!(f, "LIKELY SWAPPED (out of range as stored); run swap-axes")
            }
            Self::Malformed(e) => write!(f, "MALFORMED: {e}"),
        }
    }
}

fn inspect(record: &ZoneRecord, store_location: Coordinate) -> Finding {
    match DeliveryZone::try_from(record) {
        Ok(zone) => Finding::Audited(audit_axis_order(&zone.polygon, store_location)),
        Err(ZoneError::Polygon(_)) if swapped_polygon(record).is_ok() => Finding::SwappedOutOfRange,
        Err(e) => Finding::Malformed(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use super::*;

    fn record(polygon: Value) -> ZoneRecord {
        ZoneRecord {
            id: DeliveryZoneId::new(7),
            store_id: StoreId::new(1),
            name: "Центр".to_string(),
            polygon,
            delivery_fee: Decimal::from(200),
            free_delivery_threshold: None,
        }
    }

    fn voronezh() -> Coordinate {
        Coordinate::new(51.6615, 39.2003).unwrap()
    }

    #[test]
    fn test_inspect_consistent() {
        let finding = inspect(
            &record(json!([[51.65, 39.19], [51.65, 39.22], [51.68, 39.22], [51.68, 39.19]])),
            voronezh(),
        );
        assert!(matches!(finding, Finding::Audited(AxisAudit::Consistent { .. })));
        assert!(!finding.needs_attention());
    }

    #[test]
    fn test_inspect_swapped() {
        let finding = inspect(
            &record(json!([[39.19, 51.65], [39.22, 51.65], [39.22, 51.68], [39.19, 51.68]])),
            voronezh(),
        );
        assert!(matches!(finding, Finding::Audited(AxisAudit::LikelySwapped { .. })));
        assert!(finding.needs_attention());
    }

    #[test]
    fn test_inspect_swapped_out_of_range() {
        // Vladivostok, stored as [lng, lat]: longitude 131 is not a latitude.
        let location = Coordinate::new(43.12, 131.88).unwrap();
        let finding = inspect(
            &record(json!([[131.85, 43.10], [131.92, 43.10], [131.92, 43.14], [131.85, 43.14]])),
            location,
        );
        assert_eq!(finding, Finding::SwappedOutOfRange);
    }

    #[test]
    fn test_inspect_malformed() {
        let finding = inspect(&record(json!([[51.65, 39.19], [51.65, 39.22]])), voronezh());
        assert!(matches!(finding, Finding::Malformed(ZoneError::Polygon(_))));
        assert!(finding.to_string().starts_with("MALFORMED"));
    }

    #[test]
    fn test_swapped_polygon_is_canonical() {
        let polygon = swapped_polygon(&record(json!([
            [39.19, 51.65],
            [39.22, 51.65],
            [39.22, 51.68],
            [39.19, 51.68]
        ])))
        .unwrap();

        assert_eq!(polygon.to_json()[0], json!([51.65, 39.19]));
        assert!(polygon.contains(Coordinate::new(51.66, 39.20).unwrap()));
    }
}
