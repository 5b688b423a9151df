//! Delivery API routes.
//!
//! JSON endpoints used by the checkout page to price delivery and to draw the
//! store's delivery zones on a map.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bloom_core::delivery::{DeliveryRequest, DeliveryZone, Resolution, ResolveError, ZoneMatch};
use bloom_core::{Money, StoreId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Message returned when no zone covers the delivery address.
pub const DELIVERY_UNAVAILABLE: &str = "Delivery is unavailable at this address";

/// Request body for a delivery quote.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub store_id: StoreId,
    pub latitude: f64,
    pub longitude: f64,
    /// Current cart subtotal, as a decimal string or number.
    pub subtotal: Decimal,
}

/// Response body for a delivery quote.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuoteResponse {
    /// A zone covers the address.
    Matched {
        #[serde(flatten)]
        zone: ZoneMatch,
        /// Additional spend needed for free delivery, if applicable.
        amount_until_free: Option<Money>,
    },
    /// No zone covers the address.
    NoZoneMatched { message: &'static str },
}

/// Quote delivery for a point and subtotal.
///
/// POST /api/delivery/quote
///
/// # Errors
///
/// Returns 400 for malformed JSON, an invalid coordinate or a negative
/// subtotal, and 404 for an unknown store.
pub async fn quote(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>> {
    let Json(payload) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let request = DeliveryRequest::new(
        payload.store_id,
        payload.latitude,
        payload.longitude,
        payload.subtotal,
    )
    .map_err(ResolveError::from)?;

    let resolution = state.delivery().quote(&request).await?;

    let store_id = request.store_id.to_string();
    let response = match resolution {
        Resolution::Matched(zone) => {
            let zone_id = zone.zone_id.to_string();
            add_breadcrumb(
                "delivery",
                "Delivery quoted",
                Some(&[("store_id", store_id.as_str()), ("zone_id", zone_id.as_str())]),
            );
            QuoteResponse::Matched {
                amount_until_free: zone.amount_until_free(request.subtotal),
                zone,
            }
        }
        Resolution::NoZoneMatched => {
            add_breadcrumb(
                "delivery",
                "Delivery unavailable",
                Some(&[("store_id", store_id.as_str())]),
            );
            QuoteResponse::NoZoneMatched {
                message: DELIVERY_UNAVAILABLE,
            }
        }
    };

    Ok(Json(response))
}

/// List a store's delivery zones.
///
/// GET /api/stores/{store_id}/zones
///
/// # Errors
///
/// Returns 400 for a non-integer store ID and 404 for an unknown store.
pub async fn zones(
    State(state): State<AppState>,
    store_id: std::result::Result<Path<StoreId>, PathRejection>,
) -> Result<Json<Vec<DeliveryZone>>> {
    let Path(store_id) =
        store_id.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let zones = state.delivery().display_zones(store_id).await?;
    Ok(Json(zones))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use bloom_core::DeliveryZoneId;
    use bloom_core::delivery::ZoneRecord;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{StorefrontConfig, ZoneCacheConfig};
    use crate::routes::routes;

    fn centre() -> ZoneRecord {
        ZoneRecord {
            id: DeliveryZoneId::new(1),
            store_id: StoreId::new(1),
            name: "Центр".to_string(),
            polygon: json!([[51.65, 39.19], [51.65, 39.22], [51.68, 39.22], [51.68, 39.19]]),
            delivery_fee: Decimal::from(200),
            free_delivery_threshold: Some(Decimal::from(3000)),
        }
    }

    fn broken() -> ZoneRecord {
        ZoneRecord {
            id: DeliveryZoneId::new(2),
            name: "Broken".to_string(),
            polygon: json!([[51.65, 39.19], [51.65, 39.22]]),
            ..centre()
        }
    }

    const TEST_DATABASE_URL: &str = "postgres://bloom@localhost/bloom_test";

    fn storefront_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from(TEST_DATABASE_URL),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            cors_origin: None,
            zone_cache: ZoneCacheConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Router whose zone cache is pre-filled, so no database is touched.
    async fn app() -> Router {
        let pool = PgPoolOptions::new().connect_lazy(TEST_DATABASE_URL).unwrap();
        let state = AppState::new(storefront_config(), pool);
        state
            .delivery()
            .prime(StoreId::new(1), vec![centre(), broken()])
            .await;
        routes().with_state(state)
    }

    async fn post_quote(body: &str) -> (StatusCode, Value) {
        send_quote(app().await, body).await
    }

    async fn send_quote(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post("/api/delivery/quote")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_quote_matched_below_threshold() {
        let (status, body) = post_quote(
            r#"{"store_id": 1, "latitude": 51.66, "longitude": 39.20, "subtotal": "2000"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "matched");
        assert_eq!(body["zone_id"], 1);
        assert_eq!(body["zone_name"], "Центр");
        assert_eq!(body["fee"], "200");
        assert_eq!(body["is_free"], false);
        assert_eq!(body["free_threshold"], "3000");
        assert_eq!(body["amount_until_free"], "1000");
    }

    #[tokio::test]
    async fn test_quote_matched_free_delivery() {
        let (status, body) = post_quote(
            r#"{"store_id": 1, "latitude": 51.66, "longitude": 39.20, "subtotal": 3500}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "matched");
        assert_eq!(body["fee"], "0");
        assert_eq!(body["is_free"], true);
        assert_eq!(body["amount_until_free"], Value::Null);
    }

    #[tokio::test]
    async fn test_quote_no_zone_matched() {
        let (status, body) = post_quote(
            r#"{"store_id": 1, "latitude": 51.50, "longitude": 39.10, "subtotal": "2000"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "no_zone_matched");
        assert_eq!(body["message"], DELIVERY_UNAVAILABLE);
        assert!(body.get("fee").is_none());
    }

    #[tokio::test]
    async fn test_quote_rejects_invalid_coordinate() {
        let (status, body) = post_quote(
            r#"{"store_id": 1, "latitude": 151.66, "longitude": 39.20, "subtotal": "2000"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("latitude"));
    }

    #[tokio::test]
    async fn test_quote_rejects_negative_subtotal() {
        let (status, _) = post_quote(
            r#"{"store_id": 1, "latitude": 51.66, "longitude": 39.20, "subtotal": "-1"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_quote_rejects_non_numeric_coordinate() {
        let (status, _) = post_quote(
            r#"{"store_id": 1, "latitude": "north", "longitude": 39.20, "subtotal": "2000"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_zones_hides_malformed() {
        let response = app()
            .await
            .oneshot(
                Request::get("/api/stores/1/zones")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let zones = body.as_array().unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0]["name"], "Центр");
        assert_eq!(zones[0]["polygon"][0], json!([51.65, 39.19]));
    }

    #[tokio::test]
    async fn test_zones_rejects_non_integer_store_id() {
        let response = app()
            .await
            .oneshot(
                Request::get("/api/stores/voronezh/zones")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_unknown_store_is_not_cached() {
        let database_url =
            std::env::var("STOREFRONT_DATABASE_URL").unwrap_or_else(|_| TEST_DATABASE_URL.into());
        let pool = PgPoolOptions::new().connect(&database_url).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let store_id = StoreId::new(900_001);
        sqlx::query("DELETE FROM storefront.store WHERE id = $1")
            .bind(store_id)
            .execute(&pool)
            .await
            .unwrap();

        let app = routes().with_state(AppState::new(storefront_config(), pool.clone()));
        let body = r#"{"store_id": 900001, "latitude": 51.66, "longitude": 39.20, "subtotal": "2000"}"#;

        let (status, _) = send_quote(app.clone(), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let store = bloom_core::delivery::Store {
            id: store_id,
            name: "Bloom Test".to_string(),
            location: bloom_core::Coordinate::new(51.66, 39.20).unwrap(),
        };
        crate::db::ZoneRepository::new(&pool)
            .replace_zones(&store, &[])
            .await
            .unwrap();

        // Well within the cache TTL: the earlier miss must not be remembered.
        let (status, response) = send_quote(app, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["status"], "no_zone_matched");

        sqlx::query("DELETE FROM storefront.store WHERE id = $1")
            .bind(store_id)
            .execute(&pool)
            .await
            .unwrap();
    }
}
