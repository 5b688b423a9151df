//! Validated delivery polygons and the point-in-polygon test.

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::AxisOrder;
use crate::types::{Coordinate, CoordinateError};

/// Tolerance for the on-boundary check, in squared degrees.
const BOUNDARY_EPSILON: f64 = 1e-12;

/// Errors produced while validating polygon data.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PolygonError {
    /// The polygon is not a JSON array of vertices.
    #[error("polygon must be an array of [lat, lng] pairs")]
    NotAnArray,
    /// A vertex is not a two-element array.
    #[error("vertex {index} must be a two-element array")]
    MalformedVertex {
        /// Zero-based vertex position.
        index: usize,
    },
    /// A vertex component is not a JSON number.
    #[error("vertex {index} has a non-numeric component")]
    NonNumeric {
        /// Zero-based vertex position.
        index: usize,
    },
    /// A vertex is outside the valid coordinate ranges.
    #[error("vertex {index} is invalid: {source}")]
    InvalidCoordinate {
        /// Zero-based vertex position.
        index: usize,
        /// The underlying range error.
        source: CoordinateError,
    },
    /// Fewer than three distinct vertices remain after removing repeats.
    #[error("polygon needs at least {min} distinct vertices (got {count})", min = Polygon::MIN_VERTICES)]
    TooFewVertices {
        /// Number of distinct vertices found.
        count: usize,
    },
}

/// A simple polygon with vertices in canonical (lat, lng) order.
///
/// The polygon is implicitly closed: if the input repeats the first vertex at
/// the end, the duplicate is dropped. Consecutive repeated vertices are
/// collapsed into one.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Coordinate>,
}

impl Polygon {
    /// Minimum number of vertices of a valid polygon.
    pub const MIN_VERTICES: usize = 3;

    /// Build a polygon from validated vertices.
    ///
    /// # Errors
    ///
    /// Returns `PolygonError::TooFewVertices` if fewer than three distinct
    /// vertices remain after collapsing repeats and the closing vertex.
    pub fn new(mut vertices: Vec<Coordinate>) -> Result<Self, PolygonError> {
        vertices.dedup();
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        let distinct = vertices
            .iter()
            .enumerate()
            .filter(|&(i, v)| !vertices.iter().take(i).any(|seen| seen == v))
            .count();

        if distinct < Self::MIN_VERTICES {
            return Err(PolygonError::TooFewVertices { count: distinct });
        }

        Ok(Self { vertices })
    }

    /// Parse a polygon from a JSON array of two-element number arrays.
    ///
    /// `order` states how each pair is laid out in the input; the result is
    /// always stored as (lat, lng).
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid vertex, or
    /// `TooFewVertices` if the array is too short.
    pub fn from_json(value: &Value, order: AxisOrder) -> Result<Self, PolygonError> {
        let raw = value.as_array().ok_or(PolygonError::NotAnArray)?;

        let vertices = raw
            .iter()
            .enumerate()
            .map(|(index, vertex)| parse_vertex(index, vertex, order))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(vertices)
    }

    /// The polygon's vertices, without a closing duplicate.
    #[must_use]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Canonical JSON form: `[[lat, lng], ...]`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.vertices
                .iter()
                .map(|v| serde_json::json!([v.latitude(), v.longitude()]))
                .collect(),
        )
    }

    /// Returns the polygon with every vertex's axes exchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if any longitude is not a valid latitude.
    pub fn swapped(&self) -> Result<Self, PolygonError> {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.swapped()
                    .map_err(|source| PolygonError::InvalidCoordinate { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(vertices)
    }

    /// Smallest lat/lng rectangle containing every vertex.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let initial = BoundingBox {
            min_latitude: f64::INFINITY,
            max_latitude: f64::NEG_INFINITY,
            min_longitude: f64::INFINITY,
            max_longitude: f64::NEG_INFINITY,
        };

        self.vertices.iter().fold(initial, |bbox, v| BoundingBox {
            min_latitude: bbox.min_latitude.min(v.latitude()),
            max_latitude: bbox.max_latitude.max(v.latitude()),
            min_longitude: bbox.min_longitude.min(v.longitude()),
            max_longitude: bbox.max_longitude.max(v.longitude()),
        })
    }

    /// Even-odd ray casting test.
    ///
    /// Casts a ray from `point` towards increasing longitude and counts edge
    /// crossings; an odd count means inside. Points on an edge or vertex are
    /// outside.
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        if self.on_boundary(point) {
            return false;
        }

        let (px, py) = (point.longitude(), point.latitude());
        let mut inside = false;

        for (a, b) in self.edges() {
            let (ax, ay) = (a.longitude(), a.latitude());
            let (bx, by) = (b.longitude(), b.latitude());

            // Half-open rule: an edge counts only if it straddles the ray's
            // latitude, so a vertex touching the ray is counted once.
            if (ay > py) != (by > py) {
                let crossing_x = ((bx - ax) * (py - ay) / (by - ay)) + ax;
                if px < crossing_x {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Returns `true` if `point` lies on any edge (vertices included).
    #[must_use]
    pub fn on_boundary(&self, point: Coordinate) -> bool {
        self.edges().any(|(a, b)| on_segment(point, a, b))
    }

    /// Iterate over edges `(v0, v1), (v1, v2), ..., (vn, v0)`.
    fn edges(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        self.vertices
            .iter()
            .copied()
            .zip(self.vertices.iter().copied().cycle().skip(1))
    }
}

impl Serialize for Polygon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.vertices
                .iter()
                .map(|v| [v.latitude(), v.longitude()]),
        )
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Planar distance in degrees from `point` to the box; zero if inside.
    #[must_use]
    pub fn distance_to(&self, point: Coordinate) -> f64 {
        let dy = (self.min_latitude - point.latitude())
            .max(point.latitude() - self.max_latitude)
            .max(0.0);
        let dx = (self.min_longitude - point.longitude())
            .max(point.longitude() - self.max_longitude)
            .max(0.0);
        dx.hypot(dy)
    }
}

fn parse_vertex(index: usize, vertex: &Value, order: AxisOrder) -> Result<Coordinate, PolygonError> {
    let pair = vertex
        .as_array()
        .ok_or(PolygonError::MalformedVertex { index })?;
    let [first, second] = pair.as_slice() else {
        return Err(PolygonError::MalformedVertex { index });
    };

    let (Some(first), Some(second)) = (first.as_f64(), second.as_f64()) else {
        return Err(PolygonError::NonNumeric { index });
    };

    let (latitude, longitude) = match order {
        AxisOrder::LatLng => (first, second),
        AxisOrder::LngLat => (second, first),
    };

    Coordinate::new(latitude, longitude)
        .map_err(|source| PolygonError::InvalidCoordinate { index, source })
}

fn on_segment(point: Coordinate, a: Coordinate, b: Coordinate) -> bool {
    let (px, py) = (point.longitude(), point.latitude());
    let (ax, ay) = (a.longitude(), a.latitude());
    let (bx, by) = (b.longitude(), b.latitude());

    let cross = (bx - ax).mul_add(py - ay, -(by - ay) * (px - ax));
    if cross.abs() > BOUNDARY_EPSILON {
        return false;
    }

    px >= ax.min(bx) - BOUNDARY_EPSILON
        && px <= ax.max(bx) + BOUNDARY_EPSILON
        && py >= ay.min(by) - BOUNDARY_EPSILON
        && py <= ay.max(by) + BOUNDARY_EPSILON
}
