//! Offline checks of the Voronezh fixture.
//!
//! These run the resolver over the same file the HTTP tests import, so a
//! broken fixture fails here before any server is involved.

#![allow(clippy::unwrap_used)]

use bloom_core::delivery::{AxisAudit, Resolution, ZoneBook, audit_axis_order};
use bloom_core::{Money, StoreId};
use bloom_integration_tests::voronezh;
use rust_decimal::Decimal;

fn book() -> ZoneBook {
    let file = voronezh().unwrap();
    let zones = file.validate().unwrap();
    let mut book = ZoneBook::new();
    book.insert_store(&file.store, zones);
    book
}

fn matched(resolution: Resolution) -> bloom_core::delivery::ZoneMatch {
    match resolution {
        Resolution::Matched(zone) => zone,
        Resolution::NoZoneMatched => panic!("expected a zone match"),
    }
}

#[test]
fn test_fixture_zones_are_near_store() {
    let file = voronezh().unwrap();
    for zone in file.validate().unwrap() {
        assert!(
            matches!(
                audit_axis_order(&zone.polygon, file.store.location),
                AxisAudit::Consistent { .. }
            ),
            "zone {} failed the axis audit",
            zone.name
        );
    }
}

#[test]
fn test_centre_below_threshold() {
    let zone = matched(
        book()
            .resolve(StoreId::new(1), 51.66, 39.20, Decimal::from(2000))
            .unwrap(),
    );

    assert_eq!(zone.zone_name, "Центр");
    assert_eq!(zone.fee, Money::from_units(200));
    assert!(!zone.is_free);
}

#[test]
fn test_centre_above_threshold() {
    let zone = matched(
        book()
            .resolve(StoreId::new(1), 51.66, 39.20, Decimal::from(3500))
            .unwrap(),
    );

    assert_eq!(zone.zone_name, "Центр");
    assert_eq!(zone.fee, Money::ZERO);
    assert!(zone.is_free);
}

#[test]
fn test_outer_zone_has_no_threshold() {
    let zone = matched(
        book()
            .resolve(StoreId::new(1), 51.75, 39.30, Decimal::from(100_000))
            .unwrap(),
    );

    assert_eq!(zone.zone_name, "Пригород");
    assert_eq!(zone.fee, Money::from_units(400));
    assert!(!zone.is_free);
}

#[test]
fn test_outside_every_zone() {
    let result = book()
        .resolve(StoreId::new(1), 51.50, 39.10, Decimal::from(2000))
        .unwrap();

    assert_eq!(result, Resolution::NoZoneMatched);
}
