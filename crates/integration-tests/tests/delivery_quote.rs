//! HTTP tests for the delivery quote API.
//!
//! Require a running storefront with `fixtures/voronezh.yaml` imported.

#![allow(clippy::unwrap_used)]

use bloom_integration_tests::{post_quote, storefront_base_url};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_health() {
    let client = Client::new();

    for path in ["/health", "/health/ready"] {
        let resp = client
            .get(format!("{}{path}", storefront_base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront with the Voronezh zones imported"]
async fn test_quote_centre_below_threshold() {
    let (status, body) = post_quote(
        &Client::new(),
        &json!({"store_id": 1, "latitude": 51.66, "longitude": 39.20, "subtotal": "2000"}),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "matched");
    assert_eq!(body["zone_name"], "Центр");
    assert_eq!(body["fee"], "200");
    assert_eq!(body["is_free"], false);
    assert_eq!(body["amount_until_free"], "1000");
}

#[tokio::test]
#[ignore = "Requires running storefront with the Voronezh zones imported"]
async fn test_quote_centre_free_delivery() {
    let (status, body) = post_quote(
        &Client::new(),
        &json!({"store_id": 1, "latitude": 51.66, "longitude": 39.20, "subtotal": "3500"}),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zone_name"], "Центр");
    assert_eq!(body["fee"], "0");
    assert_eq!(body["is_free"], true);
}

#[tokio::test]
#[ignore = "Requires running storefront with the Voronezh zones imported"]
async fn test_quote_outside_every_zone() {
    let (status, body) = post_quote(
        &Client::new(),
        &json!({"store_id": 1, "latitude": 51.50, "longitude": 39.10, "subtotal": "2000"}),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_zone_matched");
    assert_eq!(body["message"], "Delivery is unavailable at this address");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_quote_unknown_store() {
    let (status, _) = post_quote(
        &Client::new(),
        &json!({"store_id": 999_999, "latitude": 51.66, "longitude": 39.20, "subtotal": "2000"}),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_quote_invalid_input() {
    let client = Client::new();

    for body in [
        json!({"store_id": 1, "latitude": 91.0, "longitude": 39.20, "subtotal": "2000"}),
        json!({"store_id": 1, "latitude": 51.66, "longitude": -181.0, "subtotal": "2000"}),
        json!({"store_id": 1, "latitude": 51.66, "longitude": 39.20, "subtotal": "-0.01"}),
        json!({"store_id": 1, "latitude": "51.66", "longitude": 39.20, "subtotal": "2000"}),
    ] {
        let (status, response) = post_quote(&client, &body).await.unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response["error"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires running storefront with the Voronezh zones imported"]
async fn test_store_zones_listing() {
    let resp = Client::new()
        .get(format!("{}/api/stores/1/zones", storefront_base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let zones: Vec<Value> = resp.json().await.unwrap();
    let names: Vec<&str> = zones.iter().filter_map(|z| z["name"].as_str()).collect();
    assert_eq!(names, ["Центр", "Пригород"]);
    assert_eq!(zones[0]["polygon"][0], json!([51.65, 39.19]));
}
