//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. Request ID (add unique ID to each request)
//! 3. `TraceLayer` (request tracing, span carries the request ID)
//! 4. CORS (only when `STOREFRONT_CORS_ORIGIN` is set)

pub mod cors;
pub mod request_id;
pub mod trace;

pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use trace::{RequestSpan, trace_layer};
