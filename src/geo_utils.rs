//! # Geographic Utilities
//!
//! Geometry helpers shared by route projection and viewport fitting.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`decode_polyline`] | Decode an encoded polyline into GPS points |
//! | [`route_points`] | Resolve an activity's geometry into valid GPS points |
//! | [`coordinate_bounds`] | Bounding box of `[lng, lat]` coordinates |
//!
//! ## Example
//!
//! ```rust
//! use activity_atlas::geo_utils;
//!
//! let points = geo_utils::decode_polyline("run-1", "_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
//! assert_eq!(points.len(), 3);
//! assert!((points[0].latitude - 38.5).abs() < 1e-6);
//! assert!((points[0].longitude + 120.2).abs() < 1e-6);
//! ```
//!
//! ## Coordinate System
//!
//! Points are WGS84 degrees. Feature coordinates use GeoJSON order
//! (`[longitude, latitude]`), while [`GpsPoint`] names both fields explicitly.

use geo::{BoundingRect, MultiPoint, Point};

use crate::error::{AtlasError, Result};
use crate::{Activity, Bounds, GpsPoint, RouteGeometry};

/// Precision of encoded summary polylines.
pub const POLYLINE_PRECISION: u32 = 5;

/// Decode an encoded polyline (precision 5) into GPS points.
pub fn decode_polyline(activity_id: &str, encoded: &str) -> Result<Vec<GpsPoint>> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION).map_err(|e| {
        AtlasError::Geometry {
            activity_id: activity_id.to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(line
        .coords()
        .map(|c| GpsPoint::new(c.y, c.x))
        .collect())
}

/// Resolve an activity's route into valid GPS points.
///
/// Returns an empty list for activities without geometry. Points outside the
/// WGS84 range or with non-finite values are dropped.
pub fn route_points(activity: &Activity) -> Result<Vec<GpsPoint>> {
    let points = match &activity.geometry {
        None => return Ok(Vec::new()),
        Some(RouteGeometry::Encoded(encoded)) if encoded.is_empty() => return Ok(Vec::new()),
        Some(RouteGeometry::Encoded(encoded)) => decode_polyline(activity.id.as_str(), encoded)?,
        Some(RouteGeometry::Points(points)) => points.clone(),
    };

    Ok(points.into_iter().filter(GpsPoint::is_valid).collect())
}

/// Compute the bounding box of `[lng, lat]` coordinates.
///
/// Returns `None` for empty input.
pub fn coordinate_bounds<'a, I>(coords: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a [f64; 2]>,
{
    let points: MultiPoint<f64> = coords
        .into_iter()
        .map(|c| Point::new(c[0], c[1]))
        .collect();

    points.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
