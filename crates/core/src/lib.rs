//! Bloom Core - Shared types and delivery zone resolution.
//!
//! This crate provides the domain types used across all Bloom components:
//! - `storefront` - Public JSON API used by the checkout page
//! - `cli` - Command-line tools for migrations and zone management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no database access,
//! no HTTP clients. Zone data is always passed in explicitly, which keeps the
//! resolver usable from tests and offline tools without any I/O.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, coordinates and money
//! - [`delivery`] - Polygons, delivery zones and the zone resolver

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod delivery;
pub mod types;

pub use types::*;
