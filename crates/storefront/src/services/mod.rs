//! Business logic services.

pub mod delivery;

pub use delivery::DeliveryService;
