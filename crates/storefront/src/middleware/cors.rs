//! CORS for the checkout single-page app.

use axum::http::{HeaderValue, Method, header::CONTENT_TYPE, header::InvalidHeaderValue};
use tower_http::cors::CorsLayer;

use super::REQUEST_ID_HEADER;

/// Allow the given origin to call the JSON API.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([axum::http::HeaderName::from_static(REQUEST_ID_HEADER)]))
}
