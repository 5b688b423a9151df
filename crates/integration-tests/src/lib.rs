//! Integration tests for Bloom.
//!
//! # Running Tests
//!
//! ```bash
//! # Offline tests (zone fixture, no services needed)
//! cargo test -p bloom-integration-tests
//!
//! # HTTP tests against a running storefront
//! bloom-cli migrate
//! bloom-cli zones import crates/integration-tests/fixtures/voronezh.yaml
//! cargo run -p bloom-storefront &
//! cargo test -p bloom-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Storefront under test (default: `http://localhost:3000`)

use bloom_core::delivery::ZoneFile;

/// The Voronezh fixture: store 1 with an inner "Центр" zone inside a larger
/// "Пригород" zone.
pub const VORONEZH_FIXTURE: &str = include_str!("../fixtures/voronezh.yaml");

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Parse the Voronezh fixture.
///
/// # Errors
///
/// Returns an error if the fixture is not a valid zone file.
pub fn voronezh() -> Result<ZoneFile, serde_yaml::Error> {
    serde_yaml::from_str(VORONEZH_FIXTURE)
}

/// POST a quote request and return the status with the decoded JSON body.
///
/// # Errors
///
/// Returns an error if the request fails or the body is not JSON.
pub async fn post_quote(
    client: &reqwest::Client,
    body: &serde_json::Value,
) -> Result<(reqwest::StatusCode, serde_json::Value), reqwest::Error> {
    let response = client
        .post(format!("{}/api/delivery/quote", storefront_base_url()))
        .json(body)
        .send()
        .await?;

    let status = response.status();
    let body = response.json().await?;
    Ok((status, body))
}
