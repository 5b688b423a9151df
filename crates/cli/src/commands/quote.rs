//! Offline delivery quotes.
//!
//! Resolves a point against a zone file using the same rules as the
//! storefront, which makes it handy for checking a file before importing it.
//!
//! ```bash
//! bloom-cli quote --file zones/voronezh.yaml --lat 51.66 --lng 39.20 --subtotal 2000
//! ```

use std::path::Path;

use rust_decimal::Decimal;

use bloom_core::Money;
use bloom_core::delivery::{Resolution, ZoneBook};

use super::{CommandError, read_zone_file, validate_zone_file};

/// Quote delivery for a point against the zones in `path`.
///
/// # Errors
///
/// Returns `CommandError` if the file is unreadable or invalid, or if the
/// point or subtotal is invalid.
#[allow(clippy::print_stdout)]
pub fn offline(
    path: &Path,
    latitude: f64,
    longitude: f64,
    subtotal: Decimal,
) -> Result<(), CommandError> {
    let file = read_zone_file(path)?;
    let zones = validate_zone_file(&file)?;

    let mut book = ZoneBook::new();
    book.insert_store(&file.store, zones);

    match book.resolve(file.store.id, latitude, longitude, subtotal)? {
        Resolution::Matched(zone) => {
            println!("Zone:  {} ({})", zone.zone_name, zone.zone_id);
            println!("Fee:   {}", zone.fee);
            if let Some(threshold) = zone.free_threshold {
                println!("Free from: {threshold}");
            }
            if zone.is_free {
                println!("Delivery is free for this order");
            } else if let Some(remaining) = Money::new(subtotal)
                .ok()
                .and_then(|subtotal| zone.amount_until_free(subtotal))
            {
                println!("Add {remaining} more for free delivery");
            }
        }
        Resolution::NoZoneMatched => println!("Delivery is unavailable at this address"),
    }

    Ok(())
}
