//! # Activity Atlas
//!
//! Statistics and route-map data for a personal running page.
//!
//! This library turns a loaded list of recorded activities into:
//! - Per-period summary statistics (distance, pace, elevation, heart rate, streak)
//!   with a breakdown by activity type
//! - A GeoJSON-style feature collection of routes, ready for a map renderer
//! - A viewport (center + zoom) framing those routes
//!
//! Everything here is a pure function over immutable input. Rendering, data
//! fetching and UI state belong to the caller.
//!
//! ## Features
//!
//! - **`parallel`** - Decode route geometry in parallel with rayon
//! - **`ffi`** - Enable JSON-in/JSON-out FFI bindings for mobile/web hosts
//! - **`cli`** - Build the `svg-manifest` command line tool
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use activity_atlas::{
//!     Activity, AtlasConfig, PeriodKey, ProjectOptions, build_dashboard, collect_years,
//! };
//!
//! let activities = vec![
//!     Activity::new("1", "Run", "2023-03-04 07:12:00")
//!         .with_distance(5000.0)
//!         .with_average_speed(3.2),
//!     Activity::new("2", "Ride", "2023-05-01 18:30:00").with_distance(30_000.0),
//! ];
//!
//! let years = collect_years(&activities);
//! let dashboard = build_dashboard(
//!     &activities,
//!     &PeriodKey::parse("2023"),
//!     &years,
//!     &AtlasConfig::default(),
//!     &ProjectOptions::default(),
//! );
//!
//! assert_eq!(dashboard.summary.activity_count, 2);
//! assert_eq!(dashboard.summary.total_distance, 35.0);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// Unified error handling
pub mod error;
pub use error::{AtlasError, Result};

// Display unit conversion
pub mod units;
pub use units::{DisplayUnits, UnitSystem};

// Period selection and ordering
pub mod filter;
pub use filter::{collect_years, default_period, filter_activities, PeriodKey, SortOrder};

// Summary statistics
pub mod stats;
pub use stats::{
    aggregate, ActivityLabel, ActivityLabels, ActivityTypeBucket, ActivityTypeStat,
    StatsAccumulator, YearSummary,
};

// Geographic utilities (polyline decoding, bounds)
pub mod geo_utils;

// Route features for map rendering
pub mod projection;
pub use projection::{
    project, FeatureGeometry, FeatureProperties, GeoFeature, GeoFeatureCollection,
    ProjectOptions, RoutePalette, RouteStyle, Theme,
};

// Map viewport fitting
pub mod viewport;
pub use viewport::{compute_bounds, ViewState, ViewportConfig};

// Configuration
pub mod config;
pub use config::AtlasConfig;

// End-to-end pipeline
pub mod dashboard;
pub use dashboard::{build_dashboard, Dashboard};

// Yearly heatmap SVG manifest
pub mod manifest;
pub use manifest::{build_manifest, PeriodMap, SvgAsset, SvgManifest};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("ActivityAtlasRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use activity_atlas::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// GeoJSON coordinate order: `[longitude, latitude]`.
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Opaque activity identifier.
///
/// Activity lists store ids either as numbers or strings; both deserialize
/// into the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawActivityId")]
pub struct ActivityId(String);

impl ActivityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActivityId {
    fn from(id: &str) -> Self {
        ActivityId(id.to_string())
    }
}

impl From<String> for ActivityId {
    fn from(id: String) -> Self {
        ActivityId(id)
    }
}

impl Serialize for ActivityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawActivityId {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl From<RawActivityId> for ActivityId {
    fn from(raw: RawActivityId) -> Self {
        match raw {
            RawActivityId::Unsigned(n) => ActivityId(n.to_string()),
            RawActivityId::Signed(n) => ActivityId(n.to_string()),
            // Some exporters write numeric ids as `1.0`
            RawActivityId::Float(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                ActivityId((n as i64).to_string())
            }
            RawActivityId::Float(n) => ActivityId(n.to_string()),
            RawActivityId::Text(s) => ActivityId(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDayCount {
    Whole(u32),
    Float(f64),
}

/// Day counts arrive as integers or integral floats (`3` or `3.0`).
fn deserialize_day_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawDayCount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawDayCount::Whole(days)) => Ok(Some(days)),
        Some(RawDayCount::Float(days))
            if days.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&days) =>
        {
            Ok(Some(days as u32))
        }
        Some(RawDayCount::Float(days)) => Err(D::Error::custom(format!(
            "invalid day count {}, expected a whole non-negative number",
            days
        ))),
    }
}

/// Where an activity's route comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteGeometry {
    /// Encoded polyline (precision 5)
    Encoded(String),
    /// Explicit list of points
    Points(Vec<GpsPoint>),
}

/// A single recorded activity, as written by the data loader.
///
/// Every measurement is optional. Accessor methods apply the defaults the
/// aggregation relies on, so fields can be read raw or normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "run_id", alias = "id")]
    pub id: ActivityId,
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
    pub start_date_local: String,
    /// Meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Meters
    #[serde(default)]
    pub elevation_gain: Option<f64>,
    /// Meters per second
    #[serde(default)]
    pub average_speed: Option<f64>,
    /// Beats per minute
    #[serde(default, rename = "average_heartrate")]
    pub average_heart_rate: Option<f64>,
    /// Consecutive-day streak at the time of this activity
    #[serde(default, deserialize_with = "deserialize_day_count")]
    pub streak: Option<u32>,
    #[serde(default, rename = "summary_polyline")]
    pub geometry: Option<RouteGeometry>,
}

impl Activity {
    /// Create an activity with only an id, type and local start time.
    pub fn new(id: impl Into<ActivityId>, activity_type: &str, start_date_local: &str) -> Self {
        Self {
            id: id.into(),
            activity_type: Some(activity_type.to_string()),
            start_date_local: start_date_local.to_string(),
            distance: None,
            elevation_gain: None,
            average_speed: None,
            average_heart_rate: None,
            streak: None,
            geometry: None,
        }
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance = Some(meters);
        self
    }

    pub fn with_elevation_gain(mut self, meters: f64) -> Self {
        self.elevation_gain = Some(meters);
        self
    }

    pub fn with_average_speed(mut self, meters_per_second: f64) -> Self {
        self.average_speed = Some(meters_per_second);
        self
    }

    pub fn with_average_heart_rate(mut self, bpm: f64) -> Self {
        self.average_heart_rate = Some(bpm);
        self
    }

    pub fn with_streak(mut self, days: u32) -> Self {
        self.streak = Some(days);
        self
    }

    pub fn with_geometry(mut self, geometry: RouteGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Activity kind, `"Unknown"` when absent or blank.
    pub fn kind(&self) -> &str {
        match self.activity_type.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Unknown",
        }
    }

    /// Calendar year prefix of the local start time.
    pub fn year(&self) -> Option<&str> {
        self.start_date_local
            .get(..4)
            .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Distance in meters; absent or invalid values count as 0.
    pub fn distance_meters(&self) -> f64 {
        non_negative(self.distance)
    }

    /// Elevation gain in meters; absent or invalid values count as 0.
    pub fn elevation_gain_meters(&self) -> f64 {
        non_negative(self.elevation_gain)
    }

    /// Average speed in m/s, only when positive and finite.
    pub fn speed(&self) -> Option<f64> {
        positive(self.average_speed)
    }

    /// Average heart rate, only when positive and finite.
    pub fn heart_rate(&self) -> Option<f64> {
        positive(self.average_heart_rate)
    }

    pub fn streak_days(&self) -> u32 {
        self.streak.unwrap_or(0)
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::{info, warn};

    fn parse_activities(activities_json: &str) -> Option<Vec<Activity>> {
        match serde_json::from_str::<Vec<Activity>>(activities_json) {
            Ok(activities) => Some(activities),
            Err(e) => {
                warn!("[ActivityAtlasRust] Failed to parse activities: {}", e);
                None
            }
        }
    }

    fn parse_config(config_json: Option<String>) -> Option<AtlasConfig> {
        match config_json {
            None => Some(AtlasConfig::default()),
            Some(json) => match AtlasConfig::from_json(&json) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("[ActivityAtlasRust] Invalid config: {}", e);
                    None
                }
            },
        }
    }

    /// Distinct years present in the activity list, newest first.
    #[uniffi::export]
    pub fn ffi_collect_years(activities_json: String) -> Vec<String> {
        init_logging();
        parse_activities(&activities_json)
            .map(|activities| collect_years(&activities))
            .unwrap_or_default()
    }

    /// Summary statistics for one period, as JSON.
    #[uniffi::export]
    pub fn ffi_year_summary(
        activities_json: String,
        period: String,
        config_json: Option<String>,
    ) -> Option<String> {
        init_logging();
        let activities = parse_activities(&activities_json)?;
        let config = parse_config(config_json)?;
        let years = collect_years(&activities);
        let selected = filter_activities(
            &activities,
            &PeriodKey::parse(&period),
            &years,
            config.sort_order,
        );
        let summary = aggregate(selected, &config);
        info!(
            "[ActivityAtlasRust] Summary for {}: {} activities",
            period, summary.activity_count
        );
        serde_json::to_string(&summary).ok()
    }

    /// Full dashboard (summary, features, viewport) for one period, as JSON.
    #[uniffi::export]
    pub fn ffi_build_dashboard(
        activities_json: String,
        period: String,
        dark_theme: bool,
        redraw_token: u64,
        config_json: Option<String>,
    ) -> Option<String> {
        init_logging();
        let start = std::time::Instant::now();
        let activities = parse_activities(&activities_json)?;
        let config = parse_config(config_json)?;
        let years = collect_years(&activities);
        let options = ProjectOptions {
            theme: if dark_theme { Theme::Dark } else { Theme::Light },
            redraw_token,
        };
        let dashboard = build_dashboard(
            &activities,
            &PeriodKey::parse(&period),
            &years,
            &config,
            &options,
        );
        info!(
            "[ActivityAtlasRust] Dashboard for {}: {} features in {:?}",
            period,
            dashboard.geo.features.len(),
            start.elapsed()
        );
        serde_json::to_string(&dashboard).ok()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_activity_deserialize_running_page_format() {
        let json = r#"{
            "run_id": 9223372036,
            "name": "Morning Run",
            "type": "Run",
            "start_date_local": "2023-06-01 07:00:00",
            "distance": 5012.3,
            "average_speed": 3.1,
            "average_heartrate": null,
            "streak": 4,
            "summary_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.id.as_str(), "9223372036");
        assert_eq!(activity.kind(), "Run");
        assert_eq!(activity.year(), Some("2023"));
        assert_eq!(activity.streak_days(), 4);
        assert!(activity.heart_rate().is_none());
        assert!(matches!(activity.geometry, Some(RouteGeometry::Encoded(_))));
    }

    #[test]
    fn test_activity_deserialize_point_geometry_and_string_id() {
        let json = r#"{
            "id": "abc",
            "start_date_local": "2021-01-01T00:00:00",
            "summary_polyline": [{"latitude": 1.0, "longitude": 2.0}]
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.id.as_str(), "abc");
        assert_eq!(activity.kind(), "Unknown");
        assert_eq!(activity.distance_meters(), 0.0);
        assert_eq!(
            activity.geometry,
            Some(RouteGeometry::Points(vec![GpsPoint::new(1.0, 2.0)]))
        );
    }

    #[test]
    fn test_activity_normalized_accessors() {
        let activity = Activity::new("1", "", "20")
            .with_distance(-5.0)
            .with_average_speed(0.0)
            .with_average_heart_rate(f64::NAN);
        assert_eq!(activity.kind(), "Unknown");
        assert_eq!(activity.year(), None);
        assert_eq!(activity.distance_meters(), 0.0);
        assert!(activity.speed().is_none());
        assert!(activity.heart_rate().is_none());
    }

    #[test]
    fn test_activity_deserialize_float_id_and_streak() {
        let json = r#"{
            "run_id": 1.0,
            "type": "Run",
            "start_date_local": "2023-06-01 07:00:00",
            "streak": 2.0
        }"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.id.as_str(), "1");
        assert_eq!(activity.streak_days(), 2);

        let fractional = r#"{"run_id": 2, "start_date_local": "2023", "streak": 2.5}"#;
        assert!(serde_json::from_str::<Activity>(fractional).is_err());

        let missing = r#"{"run_id": 3, "start_date_local": "2023", "streak": null}"#;
        let activity: Activity = serde_json::from_str(missing).unwrap();
        assert_eq!(activity.streak, None);
    }

    #[test]
    fn test_activity_id_serializes_as_string() {
        let json = serde_json::to_string(&ActivityId::from("42")).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
