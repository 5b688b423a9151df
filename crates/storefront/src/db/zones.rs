//! Store and delivery zone repository.
//!
//! Zone rows are returned unvalidated as [`ZoneRecord`]s; validation happens in
//! `bloom_core::delivery` so that one malformed row never hides the others.

use sqlx::PgPool;

use bloom_core::delivery::{NewZone, Polygon, Store, ZoneRecord};
use bloom_core::{Coordinate, DeliveryZoneId, StoreId};

use super::RepositoryError;

/// Raw `storefront.store` row.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    name: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let location = Coordinate::new(row.latitude, row.longitude).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid location for store {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            location,
        })
    }
}

/// Repository for store and delivery zone database operations.
pub struct ZoneRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ZoneRepository<'a> {
    /// Create a new zone repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored location is invalid.
    pub async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, name, latitude, longitude
            FROM storefront.store
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Store::try_from).transpose()
    }

    /// List all stores ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored location is invalid.
    pub async fn list_stores(&self) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, name, latitude, longitude
            FROM storefront.store
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Store::try_from).collect()
    }

    /// Get every zone of a store, ordered by ascending zone ID.
    ///
    /// Returns `None` if the store does not exist, and an empty list if it
    /// exists but has no zones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn zones_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Option<Vec<ZoneRecord>>, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM storefront.store WHERE id = $1)",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        if !exists {
            return Ok(None);
        }

        let zones = sqlx::query_as::<_, ZoneRecord>(
            r"
            SELECT id, store_id, name, polygon, delivery_fee, free_delivery_threshold
            FROM storefront.delivery_zone
            WHERE store_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(zones))
    }

    /// Get every zone, optionally restricted to one store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_zones(
        &self,
        store_id: Option<StoreId>,
    ) -> Result<Vec<ZoneRecord>, RepositoryError> {
        let zones = sqlx::query_as::<_, ZoneRecord>(
            r"
            SELECT id, store_id, name, polygon, delivery_fee, free_delivery_threshold
            FROM storefront.delivery_zone
            WHERE $1::INTEGER IS NULL OR store_id = $1
            ORDER BY store_id ASC, id ASC
            ",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(zones)
    }

    /// Create or update a store, then replace all of its zones.
    ///
    /// Runs in a single transaction: either every zone is written or none is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn replace_zones(
        &self,
        store: &Store,
        zones: &[NewZone],
    ) -> Result<Vec<DeliveryZoneId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO storefront.store (id, name, latitude, longitude)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                updated_at = NOW()
            ",
        )
        .bind(store.id)
        .bind(&store.name)
        .bind(store.location.latitude())
        .bind(store.location.longitude())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM storefront.delivery_zone WHERE store_id = $1")
            .bind(store.id)
            .execute(&mut *tx)
            .await?;

        let mut ids = Vec::with_capacity(zones.len());
        for zone in zones {
            let id = sqlx::query_scalar::<_, DeliveryZoneId>(
                r"
                INSERT INTO storefront.delivery_zone
                    (store_id, name, polygon, delivery_fee, free_delivery_threshold)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                ",
            )
            .bind(zone.store_id)
            .bind(&zone.name)
            .bind(zone.polygon.to_json())
            .bind(zone.delivery_fee.amount())
            .bind(zone.free_delivery_threshold.map(|t| t.amount()))
            .fetch_one(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;

        Ok(ids)
    }

    /// Overwrite the polygon of a single zone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the zone does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_polygon(
        &self,
        zone_id: DeliveryZoneId,
        polygon: &Polygon,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.delivery_zone
            SET polygon = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(zone_id)
        .bind(polygon.to_json())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a single zone by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_zone(
        &self,
        zone_id: DeliveryZoneId,
    ) -> Result<Option<ZoneRecord>, RepositoryError> {
        let zone = sqlx::query_as::<_, ZoneRecord>(
            r"
            SELECT id, store_id, name, polygon, delivery_fee, free_delivery_threshold
            FROM storefront.delivery_zone
            WHERE id = $1
            ",
        )
        .bind(zone_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(zone)
    }
}
