//! In-memory zone storage.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::{NewZone, Resolution, ResolveError, Store, ZoneRecord, resolve};
use crate::types::{DeliveryZoneId, StoreId};

/// Zones grouped by store, held in memory.
///
/// Used for offline quoting from zone files and in tests; the storefront
/// reads zones from `PostgreSQL` instead.
#[derive(Debug, Clone, Default)]
pub struct ZoneBook {
    stores: BTreeMap<StoreId, Vec<ZoneRecord>>,
    next_id: i32,
}

impl ZoneBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store and its zones, assigning zone ids in order.
    ///
    /// Replaces any zones previously registered for the store.
    pub fn insert_store(&mut self, store: &Store, zones: Vec<NewZone>) {
        let records = zones
            .into_iter()
            .map(|zone| {
                self.next_id += 1;
                zone.into_record(DeliveryZoneId::new(self.next_id))
            })
            .collect();
        self.stores.insert(store.id, records);
    }

    /// Zones for a store, or `None` if the store is unknown.
    #[must_use]
    pub fn zones_for_store(&self, store_id: StoreId) -> Option<&[ZoneRecord]> {
        self.stores.get(&store_id).map(Vec::as_slice)
    }

    /// Resolve a delivery point against this book.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn resolve(
        &self,
        store_id: StoreId,
        latitude: f64,
        longitude: f64,
        subtotal: Decimal,
    ) -> Result<Resolution, ResolveError> {
        resolve(
            store_id,
            self.zones_for_store(store_id),
            latitude,
            longitude,
            subtotal,
        )
    }
}
