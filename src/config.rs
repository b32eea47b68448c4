//! Configuration for statistics, route styling and viewport fitting.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```json
//! { "units": "imperial", "show_elevation_gain": false, "viewport": { "max_zoom": 15.0 } }
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AtlasError, Result};
use crate::filter::SortOrder;
use crate::projection::RoutePalette;
use crate::stats::ActivityLabels;
use crate::units::UnitSystem;
use crate::viewport::ViewportConfig;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Display unit system. Default: metric
    pub units: UnitSystem,

    /// Include elevation gain in summaries. Default: true
    pub show_elevation_gain: bool,

    /// Number of activity types listed in the breakdown. Default: 5
    pub top_activity_types: usize,

    /// Order of the filtered activity list. Default: most recent first
    pub sort_order: SortOrder,

    /// Icons and labels per activity type
    pub activity_labels: ActivityLabels,

    /// Route colors per theme
    pub palette: RoutePalette,

    /// Map viewport fitting
    pub viewport: ViewportConfig,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            units: UnitSystem::Metric,
            show_elevation_gain: true,
            top_activity_types: 5,
            sort_order: SortOrder::MostRecentFirst,
            activity_labels: ActivityLabels::default(),
            palette: RoutePalette::default(),
            viewport: ViewportConfig::default(),
        }
    }
}

impl AtlasConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AtlasConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| AtlasError::io(path, e))?;
        debug!("Loaded config from {}", path.display());
        Self::from_json(&json)
    }

    /// Check that viewport dimensions and zoom limits are usable.
    pub fn validate(&self) -> Result<()> {
        let v = &self.viewport;
        if !(v.width.is_finite() && v.width > 0.0 && v.height.is_finite() && v.height > 0.0) {
            return Err(AtlasError::config(format!(
                "viewport must have a positive size, got {}x{}",
                v.width, v.height
            )));
        }
        if !v.padding.is_finite() || v.padding < 0.0 {
            return Err(AtlasError::config(format!(
                "viewport padding must be non-negative, got {}",
                v.padding
            )));
        }
        if !(v.min_zoom.is_finite() && v.max_zoom.is_finite()) || v.min_zoom > v.max_zoom {
            return Err(AtlasError::config(format!(
                "invalid zoom range {}..{}",
                v.min_zoom, v.max_zoom
            )));
        }
        if self.top_activity_types == 0 {
            return Err(AtlasError::config("top_activity_types must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(AtlasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "units": "imperial",
            "show_elevation_gain": false,
            "viewport": { "max_zoom": 15.0 }
        }"#;
        let config = AtlasConfig::from_json(json).unwrap();
        assert_eq!(config.units, UnitSystem::Imperial);
        assert!(!config.show_elevation_gain);
        assert_eq!(config.viewport.max_zoom, 15.0);
        assert_eq!(config.viewport.width, 800.0);
        assert_eq!(config.top_activity_types, 5);
        assert_eq!(config.activity_labels.resolve("Run").label, "Running");
    }

    #[test]
    fn test_sort_order_from_json() {
        let config = AtlasConfig::from_json(r#"{ "sort_order": "chronological" }"#).unwrap();
        assert_eq!(config.sort_order, SortOrder::Chronological);
    }

    #[test]
    fn test_invalid_zoom_range_rejected() {
        let err = AtlasConfig::from_json(r#"{ "viewport": { "min_zoom": 10.0, "max_zoom": 2.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, AtlasError::InvalidConfig { .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = AtlasConfig::from_json("{ units: metric").unwrap_err();
        assert!(matches!(err, AtlasError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "top_activity_types": 3 }}"#).unwrap();
        let config = AtlasConfig::load(file.path()).unwrap();
        assert_eq!(config.top_activity_types, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AtlasConfig::load("/nonexistent/atlas.json").unwrap_err();
        assert!(matches!(err, AtlasError::Io { .. }));
    }
}
