//! Map viewport fitting.
//!
//! Frames a feature collection inside a nominal viewport using the Web
//! Mercator projection, the same world-coordinate convention map renderers use
//! (512 px tiles, zoom 0 = whole world in one tile).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::geo_utils::coordinate_bounds;
use crate::projection::GeoFeatureCollection;

/// Size of one map tile in pixels at zoom 0.
const TILE_SIZE: f64 = 512.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_129;

/// Map camera: center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

impl ViewState {
    /// Wide view used when there is nothing to frame.
    pub const FALLBACK: ViewState = ViewState {
        longitude: 20.0,
        latitude: 20.0,
        zoom: 3.0,
    };
}

/// Nominal viewport the bounds are fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
    /// Padding on every side in pixels
    pub padding: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// View returned for an empty collection
    pub fallback: ViewState,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 200.0,
            min_zoom: 1.0,
            max_zoom: 18.0,
            fallback: ViewState::FALLBACK,
        }
    }
}

/// Project WGS84 degrees to world pixels at zoom 0.
fn to_world(lng: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let x = (lng.to_radians() + PI) * TILE_SIZE / (2.0 * PI);
    let y = (PI + (PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * TILE_SIZE / (2.0 * PI);
    (x, y)
}

/// Inverse of [`to_world`].
fn from_world(x: f64, y: f64) -> (f64, f64) {
    let lng = (x * 2.0 * PI / TILE_SIZE - PI).to_degrees();
    let lat = (2.0 * (y * 2.0 * PI / TILE_SIZE - PI).exp().atan() - PI / 2.0).to_degrees();
    (lng, lat)
}

/// Compute a viewport that frames every coordinate of `geo`.
///
/// An empty collection yields `config.fallback`. A single location (zero-size
/// box) zooms to `config.max_zoom`.
///
/// # Example
///
/// ```rust
/// use activity_atlas::{
///     compute_bounds, project, Activity, ProjectOptions, RoutePalette, ViewState, ViewportConfig,
/// };
///
/// let activities: Vec<Activity> = Vec::new();
/// let geo = project(&activities, &RoutePalette::default(), &ProjectOptions::default());
/// assert_eq!(compute_bounds(&geo, &ViewportConfig::default()), ViewState::FALLBACK);
/// ```
pub fn compute_bounds(geo: &GeoFeatureCollection, config: &ViewportConfig) -> ViewState {
    let bounds = match coordinate_bounds(geo.coordinates()) {
        Some(bounds) => bounds,
        None => return config.fallback,
    };

    let (west, north) = to_world(bounds.min_lng, bounds.max_lat);
    let (east, south) = to_world(bounds.max_lng, bounds.min_lat);

    let size_x = (east - west).abs();
    let size_y = (north - south).abs();
    let target_x = (config.width - 2.0 * config.padding).max(1.0);
    let target_y = (config.height - 2.0 * config.padding).max(1.0);

    // Zero extent on an axis places no constraint on it
    let scale = (target_x / size_x).min(target_y / size_y);
    let zoom = if scale.is_finite() {
        scale.log2()
    } else {
        config.max_zoom
    };

    let (longitude, latitude) = from_world((west + east) / 2.0, (north + south) / 2.0);

    ViewState {
        longitude,
        latitude,
        zoom: zoom.clamp(config.min_zoom, config.max_zoom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{FeatureGeometry, FeatureProperties, GeoFeature, Theme};
    use crate::ActivityId;

    fn collection(geometries: Vec<FeatureGeometry>) -> GeoFeatureCollection {
        GeoFeatureCollection {
            revision: 0,
            theme: Theme::Light,
            features: geometries
                .into_iter()
                .enumerate()
                .map(|(i, geometry)| GeoFeature {
                    geometry,
                    properties: FeatureProperties {
                        activity_id: ActivityId::from(i.to_string()),
                        activity_type: "Run".to_string(),
                        color: "#000".to_string(),
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_collection_uses_fallback() {
        let view = compute_bounds(&collection(vec![]), &ViewportConfig::default());
        assert_eq!(view, ViewState::FALLBACK);
        assert_eq!(view, ViewState { longitude: 20.0, latitude: 20.0, zoom: 3.0 });
    }

    #[test]
    fn test_single_point_zooms_to_max() {
        let geo = collection(vec![FeatureGeometry::Point([2.35, 48.85])]);
        let view = compute_bounds(&geo, &ViewportConfig::default());
        assert!((view.longitude - 2.35).abs() < 1e-9);
        assert!((view.latitude - 48.85).abs() < 1e-9);
        assert_eq!(view.zoom, 18.0);
    }

    #[test]
    fn test_box_spans_all_features() {
        let geo = collection(vec![
            FeatureGeometry::LineString(vec![[0.0, 0.0], [0.5, 0.2]]),
            FeatureGeometry::Point([1.0, 1.0]),
        ]);
        let view = compute_bounds(&geo, &ViewportConfig::default());
        assert!((view.longitude - 0.5).abs() < 1e-9);
        assert!((view.latitude - 0.5).abs() < 1e-3);
        // One degree is 512/360 px at zoom 0; 200 px of usable height
        let expected = (200.0 / (TILE_SIZE / 360.0)).log2();
        assert!((view.zoom - expected).abs() < 0.01);
    }

    #[test]
    fn test_zoom_clamped_to_minimum() {
        let geo = collection(vec![FeatureGeometry::LineString(vec![
            [-179.0, -80.0],
            [179.0, 80.0],
        ])]);
        let view = compute_bounds(&geo, &ViewportConfig::default());
        assert_eq!(view.zoom, 1.0);
    }

    #[test]
    fn test_deterministic() {
        let geo = collection(vec![FeatureGeometry::LineString(vec![
            [-0.13, 51.50],
            [-0.10, 51.52],
        ])]);
        let config = ViewportConfig::default();
        assert_eq!(compute_bounds(&geo, &config), compute_bounds(&geo, &config));
    }

    #[test]
    fn test_world_projection_round_trip_center() {
        let (x, y) = to_world(0.0, 0.0);
        assert!((x - 256.0).abs() < 1e-9);
        assert!((y - 256.0).abs() < 1e-9);
        let (lng, lat) = from_world(x, y);
        assert!(lng.abs() < 1e-9);
        assert!(lat.abs() < 1e-9);
    }
}
