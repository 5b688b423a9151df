//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::DeliveryService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    delivery: DeliveryService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let delivery = DeliveryService::new(pool.clone(), &config.zone_cache);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                delivery,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the delivery quoting service.
    #[must_use]
    pub fn delivery(&self) -> &DeliveryService {
        &self.inner.delivery
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::config::ZoneCacheConfig;

    #[tokio::test]
    async fn test_state_exposes_config() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://bloom@localhost/bloom_test"),
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            cors_origin: Some("https://shop.example".to_string()),
            zone_cache: ZoneCacheConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://bloom@localhost/bloom_test")
            .unwrap();

        let state = AppState::new(config, pool);
        let clone = state.clone();

        assert_eq!(clone.config().socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(
            clone.config().cors_origin.as_deref(),
            Some("https://shop.example")
        );
    }
}
