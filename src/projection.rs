//! Route features for map rendering.
//!
//! Converts an ordered activity list into a GeoJSON-shaped feature collection,
//! one feature per activity with usable geometry. Feature order follows the
//! input order. Activities without geometry (or with geometry that fails to
//! decode) are skipped here but still count in statistics.
//!
//! Feature colors depend on the active [`Theme`]. The collection also carries
//! the caller's redraw token as its `revision`, so a theme change produces a
//! collection that compares unequal to the previous one even when every
//! coordinate is the same.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::geo_utils::route_points;
use crate::{Activity, ActivityId, GpsPoint};

/// Color scheme the map is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Route colors for one theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStyle {
    /// Activity type -> CSS color
    pub colors: HashMap<String, String>,
    /// Color for types without an entry
    pub fallback: String,
}

impl RouteStyle {
    fn from_pairs(pairs: &[(&str, &str)], fallback: &str) -> Self {
        Self {
            colors: pairs
                .iter()
                .map(|(kind, color)| (kind.to_string(), color.to_string()))
                .collect(),
            fallback: fallback.to_string(),
        }
    }

    pub fn color_for(&self, activity_type: &str) -> &str {
        self.colors
            .get(activity_type)
            .map_or(self.fallback.as_str(), String::as_str)
    }
}

/// Route colors for both themes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePalette {
    pub light: RouteStyle,
    pub dark: RouteStyle,
}

impl Default for RoutePalette {
    fn default() -> Self {
        Self {
            light: RouteStyle::from_pairs(
                &[
                    ("Run", "#2f6fbd"),
                    ("Ride", "#2e9e57"),
                    ("Hike", "#a8652a"),
                    ("Walk", "#7a5fc2"),
                    ("Swim", "#1f9fb0"),
                ],
                "#d9480f",
            ),
            dark: RouteStyle::from_pairs(
                &[
                    ("Run", "rgb(224,237,94)"),
                    ("Ride", "rgb(91,213,138)"),
                    ("Hike", "rgb(230,168,91)"),
                    ("Walk", "rgb(184,160,255)"),
                    ("Swim", "rgb(95,205,228)"),
                ],
                "rgb(255,140,80)",
            ),
        }
    }
}

impl RoutePalette {
    pub fn for_theme(&self, theme: Theme) -> &RouteStyle {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }
}

/// Per-call projection inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectOptions {
    pub theme: Theme,
    /// Opaque change counter; bump it to force renderers to restyle.
    pub redraw_token: u64,
}

/// Feature geometry in GeoJSON coordinate order (`[lng, lat]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum FeatureGeometry {
    LineString(Vec<[f64; 2]>),
    Point([f64; 2]),
}

impl FeatureGeometry {
    fn from_points(points: &[GpsPoint]) -> Option<Self> {
        match points {
            [] => None,
            [single] => Some(FeatureGeometry::Point(single.to_lng_lat())),
            _ => Some(FeatureGeometry::LineString(
                points.iter().map(|p| p.to_lng_lat()).collect(),
            )),
        }
    }

    pub fn coordinates(&self) -> &[[f64; 2]] {
        match self {
            FeatureGeometry::LineString(coords) => coords,
            FeatureGeometry::Point(coord) => std::slice::from_ref(coord),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub activity_id: ActivityId,
    pub activity_type: String,
    pub color: String,
}

/// One activity's route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoFeature {
    pub geometry: FeatureGeometry,
    pub properties: FeatureProperties,
}

/// Ordered routes for a map renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct GeoFeatureCollection {
    /// Redraw token the collection was built with
    pub revision: u64,
    pub theme: Theme,
    pub features: Vec<GeoFeature>,
}

impl GeoFeatureCollection {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Every coordinate of every feature, in feature order.
    pub fn coordinates(&self) -> impl Iterator<Item = &[f64; 2]> {
        self.features
            .iter()
            .flat_map(|f| f.geometry.coordinates().iter())
    }

    /// True when both collections hold the same features, regardless of revision.
    pub fn same_geometry(&self, other: &GeoFeatureCollection) -> bool {
        self.features.len() == other.features.len()
            && self
                .features
                .iter()
                .zip(&other.features)
                .all(|(a, b)| a.geometry == b.geometry)
    }
}

fn to_feature(activity: &Activity, style: &RouteStyle) -> Option<GeoFeature> {
    let points = match route_points(activity) {
        Ok(points) => points,
        Err(e) => {
            debug!("Skipping route: {}", e);
            return None;
        }
    };

    let geometry = FeatureGeometry::from_points(&points)?;
    let kind = activity.kind();

    Some(GeoFeature {
        geometry,
        properties: FeatureProperties {
            activity_id: activity.id.clone(),
            activity_type: kind.to_string(),
            color: style.color_for(kind).to_string(),
        },
    })
}

/// Build the feature collection for an ordered activity list.
///
/// # Example
///
/// ```rust
/// use activity_atlas::{Activity, GpsPoint, ProjectOptions, RouteGeometry, RoutePalette, project};
///
/// let activities = vec![
///     Activity::new("1", "Run", "2023-01-01").with_geometry(RouteGeometry::Points(vec![
///         GpsPoint::new(51.50, -0.12),
///         GpsPoint::new(51.51, -0.13),
///     ])),
///     Activity::new("2", "Run", "2023-01-02"), // no route, skipped
/// ];
///
/// let geo = project(&activities, &RoutePalette::default(), &ProjectOptions::default());
/// assert_eq!(geo.features.len(), 1);
/// assert_eq!(geo.features[0].geometry.coordinates()[0], [-0.12, 51.50]);
/// ```
pub fn project<'a, I>(
    activities: I,
    palette: &RoutePalette,
    options: &ProjectOptions,
) -> GeoFeatureCollection
where
    I: IntoIterator<Item = &'a Activity>,
{
    let style = palette.for_theme(options.theme);
    let activities: Vec<&Activity> = activities.into_iter().collect();

    #[cfg(feature = "parallel")]
    let features: Vec<GeoFeature> = {
        use rayon::prelude::*;
        activities
            .par_iter()
            .filter_map(|activity| to_feature(activity, style))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let features: Vec<GeoFeature> = activities
        .iter()
        .filter_map(|activity| to_feature(activity, style))
        .collect();

    debug!(
        "Projected {} of {} activities (revision {})",
        features.len(),
        activities.len(),
        options.redraw_token
    );

    GeoFeatureCollection {
        revision: options.redraw_token,
        theme: options.theme,
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouteGeometry;

    fn with_route(id: &str, kind: &str, points: Vec<GpsPoint>) -> Activity {
        Activity::new(id, kind, "2023-05-01 08:00:00").with_geometry(RouteGeometry::Points(points))
    }

    fn sample() -> Vec<Activity> {
        vec![
            with_route(
                "1",
                "Run",
                vec![GpsPoint::new(51.50, -0.12), GpsPoint::new(51.51, -0.13)],
            ),
            Activity::new("2", "Run", "2023-05-02 08:00:00"),
            with_route("3", "Ride", vec![GpsPoint::new(48.85, 2.35)]),
            Activity::new("4", "Run", "2023-05-03 08:00:00")
                .with_geometry(RouteGeometry::Encoded("!!!".to_string())),
            Activity::new("5", "Hike", "2023-05-04 08:00:00")
                .with_geometry(RouteGeometry::Encoded("_p~iF~ps|U_ulLnnqC_mqNvxq`@".to_string())),
        ]
    }

    fn ids(geo: &GeoFeatureCollection) -> Vec<String> {
        geo.features
            .iter()
            .map(|f| f.properties.activity_id.to_string())
            .collect()
    }

    #[test]
    fn test_skips_missing_and_broken_geometry_preserving_order() {
        let activities = sample();
        let geo = project(&activities, &RoutePalette::default(), &ProjectOptions::default());
        assert_eq!(ids(&geo), vec!["1", "3", "5"]);
    }

    #[test]
    fn test_geometry_kinds() {
        let activities = sample();
        let geo = project(&activities, &RoutePalette::default(), &ProjectOptions::default());
        assert_eq!(
            geo.features[0].geometry,
            FeatureGeometry::LineString(vec![[-0.12, 51.50], [-0.13, 51.51]])
        );
        assert_eq!(geo.features[1].geometry, FeatureGeometry::Point([2.35, 48.85]));
        assert_eq!(geo.features[2].geometry.coordinates().len(), 3);
    }

    #[test]
    fn test_redraw_token_changes_identity_not_geometry() {
        let activities = sample();
        let palette = RoutePalette::default();
        let options = |redraw_token| ProjectOptions {
            theme: Theme::Light,
            redraw_token,
        };
        let first = project(&activities, &palette, &options(1));
        let second = project(&activities, &palette, &options(2));

        assert_ne!(first, second);
        assert_ne!(first.revision, second.revision);
        assert!(first.same_geometry(&second));
        assert_eq!(first.features, second.features);
    }

    #[test]
    fn test_theme_changes_colors() {
        let activities = sample();
        let palette = RoutePalette::default();
        let light_options = ProjectOptions {
            theme: Theme::Light,
            redraw_token: 0,
        };
        let dark_options = ProjectOptions {
            theme: Theme::Dark,
            redraw_token: 1,
        };
        let light = project(&activities, &palette, &light_options);
        let dark = project(&activities, &palette, &dark_options);

        assert!(light.same_geometry(&dark));
        assert_eq!(light.features[0].properties.color, "#2f6fbd");
        assert_eq!(dark.features[0].properties.color, "rgb(224,237,94)");
    }

    #[test]
    fn test_unknown_type_uses_fallback_color() {
        let activities = vec![with_route("1", "Rowing", vec![GpsPoint::new(0.0, 0.0)])];
        let geo = project(&activities, &RoutePalette::default(), &ProjectOptions::default());
        assert_eq!(geo.features[0].properties.color, "#d9480f");
    }

    #[test]
    fn test_empty_input() {
        let activities: Vec<Activity> = Vec::new();
        let geo = project(&activities, &RoutePalette::default(), &ProjectOptions::default());
        assert!(geo.is_empty());
        assert_eq!(geo.coordinates().count(), 0);
    }

    #[test]
    fn test_serializes_as_geojson() {
        let activities = vec![with_route("7", "Run", vec![GpsPoint::new(1.0, 2.0)])];
        let geo = project(&activities, &RoutePalette::default(), &ProjectOptions::default());
        let json = serde_json::to_value(&geo).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0], 2.0);
        assert_eq!(json["features"][0]["properties"]["activity_id"], "7");
    }
}
