//! Core types for Bloom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coordinate;
pub mod id;
pub mod money;

pub use coordinate::{Coordinate, CoordinateError};
pub use id::*;
pub use money::{Money, MoneyError};
