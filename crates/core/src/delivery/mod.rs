//! Geofenced delivery pricing.
//!
//! A store owns a set of delivery zones. Each zone is a polygon with a flat
//! delivery fee and an optional subtotal above which delivery is free.
//! [`resolve`] picks the first zone (by ascending id) whose polygon contains
//! the customer's coordinate and prices delivery from it.
//!
//! # Boundary policy
//!
//! A point lying exactly on a polygon edge or vertex is treated as outside
//! that polygon, so a customer on the shared edge of two adjacent zones
//! matches neither of them.
//!
//! # Axis order
//!
//! Vertices are stored in canonical `[latitude, longitude]` order. Imported
//! data must declare its [`AxisOrder`]; [`audit_axis_order`] flags stored
//! zones that look swapped so that an operator can migrate them explicitly.

mod axis;
mod book;
mod polygon;
mod resolver;
mod zone;

pub use axis::{AxisAudit, AxisOrder, audit_axis_order};
pub use book::ZoneBook;
pub use polygon::{BoundingBox, Polygon, PolygonError};
pub use resolver::{
    DeliveryRequest, InputError, Resolution, ResolveError, ZoneMatch, resolve, resolve_request,
};
pub use zone::{DeliveryZone, NewZone, Store, ZoneDraft, ZoneError, ZoneFile, ZoneRecord};
