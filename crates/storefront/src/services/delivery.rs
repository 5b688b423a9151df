//! Delivery quoting over cached zone data.
//!
//! Zone lists are cached per store using `moka` (TTL from
//! `DELIVERY_ZONE_CACHE_TTL_SECS`). Unknown stores are never cached, so a
//! store created after a failed lookup becomes visible immediately.

use std::sync::Arc;

use moka::future::Cache;
use sqlx::PgPool;

use bloom_core::StoreId;
use bloom_core::delivery::{
    DeliveryRequest, DeliveryZone, Resolution, ResolveError, ZoneRecord, resolve_request,
};

use crate::config::ZoneCacheConfig;
use crate::db::{RepositoryError, ZoneRepository};
use crate::error::AppError;

/// Delivery quoting service.
///
/// Cheap to clone; clones share the same zone cache.
#[derive(Clone)]
pub struct DeliveryService {
    inner: Arc<DeliveryServiceInner>,
}

struct DeliveryServiceInner {
    pool: PgPool,
    cache: Cache<StoreId, Arc<[ZoneRecord]>>,
}

impl DeliveryService {
    /// Create a new delivery service.
    #[must_use]
    pub fn new(pool: PgPool, config: &ZoneCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_stores)
            .time_to_live(config.ttl)
            .build();

        Self {
            inner: Arc::new(DeliveryServiceInner { pool, cache }),
        }
    }

    /// Get a store's zones, from cache when possible.
    ///
    /// Returns `None` if the store does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database lookup fails.
    pub async fn zones_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Option<Arc<[ZoneRecord]>>, RepositoryError> {
        if let Some(zones) = self.inner.cache.get(&store_id).await {
            tracing::debug!(%store_id, "Zone cache hit");
            return Ok(Some(zones));
        }

        let Some(zones) = ZoneRepository::new(&self.inner.pool)
            .zones_for_store(store_id)
            .await?
        else {
            return Ok(None);
        };

        let zones: Arc<[ZoneRecord]> = zones.into();
        self.inner.cache.insert(store_id, Arc::clone(&zones)).await;
        tracing::debug!(%store_id, zones = zones.len(), "Zone cache filled");

        Ok(Some(zones))
    }

    /// Quote delivery for a validated request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown store and
    /// `AppError::Database` if zone data cannot be loaded.
    pub async fn quote(&self, request: &DeliveryRequest) -> Result<Resolution, AppError> {
        let zones = self.zones_for_store(request.store_id).await?;
        Ok(resolve_request(request, zones.as_deref())?)
    }

    /// Valid zones of a store, for display on the checkout map.
    ///
    /// Malformed zones are left out with a warning, matching what quoting
    /// would do with them.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown store and
    /// `AppError::Database` if zone data cannot be loaded.
    pub async fn display_zones(&self, store_id: StoreId) -> Result<Vec<DeliveryZone>, AppError> {
        let zones = self
            .zones_for_store(store_id)
            .await?
            .ok_or(ResolveError::NotFound(store_id))?;

        Ok(zones
            .iter()
            .filter_map(|record| match DeliveryZone::try_from(record) {
                Ok(zone) => Some(zone),
                Err(reason) => {
                    tracing::warn!(
                        zone_id = %record.id,
                        %store_id,
                        %reason,
                        "Hiding malformed delivery zone"
                    );
                    None
                }
            })
            .collect())
    }

    /// Seed the cache directly, bypassing the database.
    #[cfg(test)]
    pub async fn prime(&self, store_id: StoreId, zones: Vec<ZoneRecord>) {
        self.inner.cache.insert(store_id, zones.into()).await;
    }
}
