//! Manifest for the yearly GitHub-style heatmap SVGs.
//!
//! The site ships one all-time heatmap (`github.svg`) and one per year
//! (`github_YYYY.svg`). Embedders read the manifest to learn which periods
//! exist, which one to open first and when the assets last changed.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AtlasError, Result};
use crate::filter::TOTAL;

/// File name of the all-time heatmap.
pub const BASE_SVG: &str = "github.svg";

/// Current manifest layout version.
pub const SCHEMA_VERSION: u32 = 1;

/// An SVG file and its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgAsset {
    pub file_name: String,
    pub modified: DateTime<Utc>,
}

impl SvgAsset {
    pub fn new(file_name: &str, modified: DateTime<Utc>) -> Self {
        Self {
            file_name: file_name.to_string(),
            modified,
        }
    }
}

/// Period -> value map that keeps its entries in insertion order.
///
/// Manifests list `"Total"` first, then years newest first, and the JSON
/// object keys follow the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodMap(Vec<(String, String)>);

impl PeriodMap {
    pub fn get(&self, period: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == period)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for PeriodMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        PeriodMap(iter.into_iter().collect())
    }
}

impl Serialize for PeriodMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PeriodMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PeriodMapVisitor;

        impl<'de> Visitor<'de> for PeriodMapVisitor {
            type Value = PeriodMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of period to string")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<PeriodMap, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(PeriodMap(entries))
            }
        }

        deserializer.deserialize_map(PeriodMapVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvgManifest {
    pub schema_version: u32,
    /// Latest asset modification, ISO-8601 UTC
    pub updated_at: String,
    /// Same instant as `updated_at`, as `YYYYMMDDHHMMSS`; usable as a cache buster
    pub version: String,
    pub default_year: String,
    /// `"Total"` followed by years, newest first
    pub years: Vec<String>,
    /// Period -> file name, in `years` order
    pub files: PeriodMap,
    /// Period -> absolute URL, when a base URL was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<PeriodMap>,
}

/// Year of a `github_YYYY.svg` file name.
fn year_of(file_name: &str) -> Option<&str> {
    let year = file_name.strip_prefix("github_")?.strip_suffix(".svg")?;
    (year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())).then_some(year)
}

/// Build a manifest from a set of assets.
///
/// `current_year` becomes the default period when a heatmap exists for it;
/// otherwise the newest year is used, or `"Total"` when there are none.
pub fn build_manifest(
    assets: &[SvgAsset],
    current_year: i32,
    base_url: Option<&str>,
) -> Result<SvgManifest> {
    let base = assets
        .iter()
        .find(|a| a.file_name == BASE_SVG)
        .ok_or_else(|| AtlasError::MissingBaseSvg {
            path: PathBuf::from(BASE_SVG),
        })?;

    let mut latest = base.modified;
    let mut by_year: BTreeMap<String, String> = BTreeMap::new();
    for asset in assets {
        if let Some(year) = year_of(&asset.file_name) {
            by_year.insert(year.to_string(), asset.file_name.clone());
            latest = latest.max(asset.modified);
        }
    }

    let years: Vec<String> = by_year.keys().rev().cloned().collect();

    let current = current_year.to_string();
    let default_year = if by_year.contains_key(&current) {
        current
    } else {
        years.first().cloned().unwrap_or_else(|| TOTAL.to_string())
    };

    let files: PeriodMap = std::iter::once((TOTAL.to_string(), BASE_SVG.to_string()))
        .chain(by_year.into_iter().rev())
        .collect();

    let urls = base_url
        .map(|url| url.trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .map(|url| {
            files
                .iter()
                .map(|(period, file)| (period.to_string(), format!("{}/{}", url, file)))
                .collect()
        });

    Ok(SvgManifest {
        schema_version: SCHEMA_VERSION,
        updated_at: latest.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        version: latest.format("%Y%m%d%H%M%S").to_string(),
        default_year,
        years: std::iter::once(TOTAL.to_string()).chain(years).collect(),
        files,
        urls,
    })
}

/// Collect the heatmap SVGs in `assets_dir`.
pub fn scan_assets_dir(assets_dir: &Path) -> Result<Vec<SvgAsset>> {
    if !assets_dir.is_dir() {
        return Err(AtlasError::MissingAssetsDir {
            path: assets_dir.to_path_buf(),
        });
    }

    let base = assets_dir.join(BASE_SVG);
    if !base.is_file() {
        return Err(AtlasError::MissingBaseSvg { path: base });
    }

    let entries = fs::read_dir(assets_dir).map_err(|e| AtlasError::io(assets_dir, e))?;

    let mut assets = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AtlasError::io(assets_dir, e))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name != BASE_SVG && year_of(&file_name).is_none() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| AtlasError::io(entry.path(), e))?;
        debug!("Found heatmap asset {}", file_name);
        assets.push(SvgAsset {
            file_name,
            modified: DateTime::<Utc>::from(modified),
        });
    }

    Ok(assets)
}

/// Scan `assets_dir` and build its manifest for the current year.
pub fn generate_manifest(assets_dir: &Path, base_url: Option<&str>) -> Result<SvgManifest> {
    use chrono::Datelike;

    let assets = scan_assets_dir(assets_dir)?;
    build_manifest(&assets, chrono::Local::now().year(), base_url)
}

/// Write `manifest` as pretty JSON, creating parent directories.
pub fn write_manifest(path: &Path, manifest: &SvgManifest) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AtlasError::io(parent, e))?;
    }
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    fs::write(path, json).map_err(|e| AtlasError::io(path, e))?;
    info!("Manifest written: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    fn sample_assets() -> Vec<SvgAsset> {
        vec![
            SvgAsset::new(BASE_SVG, at(2024, 1, 1, 0)),
            SvgAsset::new("github_2022.svg", at(2023, 1, 1, 0)),
            SvgAsset::new("github_2024.svg", at(2024, 3, 2, 10)),
            SvgAsset::new("github_2023.svg", at(2024, 1, 1, 0)),
            SvgAsset::new("github_extra.svg", at(2030, 1, 1, 0)),
        ]
    }

    #[test]
    fn test_year_of() {
        assert_eq!(year_of("github_2023.svg"), Some("2023"));
        assert_eq!(year_of("github.svg"), None);
        assert_eq!(year_of("github_23.svg"), None);
        assert_eq!(year_of("github_abcd.svg"), None);
        assert_eq!(year_of("grid_2023.svg"), None);
    }

    #[test]
    fn test_build_manifest() {
        let manifest = build_manifest(&sample_assets(), 2024, None).unwrap();
        assert_eq!(manifest.schema_version, 1);
        assert_eq!(manifest.years, vec!["Total", "2024", "2023", "2022"]);
        assert_eq!(manifest.default_year, "2024");
        assert_eq!(manifest.files.get("Total"), Some("github.svg"));
        assert_eq!(manifest.files.get("2022"), Some("github_2022.svg"));
        let keys: Vec<&str> = manifest.files.keys().collect();
        assert_eq!(keys, manifest.years);
        // Unmatched files don't contribute to the timestamp
        assert_eq!(manifest.updated_at, "2024-03-02T10:00:00Z");
        assert_eq!(manifest.version, "20240302100000");
        assert!(manifest.urls.is_none());
    }

    #[test]
    fn test_default_year_falls_back() {
        let manifest = build_manifest(&sample_assets(), 2026, None).unwrap();
        assert_eq!(manifest.default_year, "2024");

        let only_base = vec![SvgAsset::new(BASE_SVG, at(2024, 1, 1, 0))];
        let manifest = build_manifest(&only_base, 2026, None).unwrap();
        assert_eq!(manifest.default_year, "Total");
        assert_eq!(manifest.years, vec!["Total"]);
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let manifest =
            build_manifest(&sample_assets(), 2024, Some("https://example.com/assets/")).unwrap();
        let urls = manifest.urls.unwrap();
        assert_eq!(urls.get("Total"), Some("https://example.com/assets/github.svg"));
        assert_eq!(urls.get("2023"), Some("https://example.com/assets/github_2023.svg"));

        let manifest = build_manifest(&sample_assets(), 2024, Some("/")).unwrap();
        assert!(manifest.urls.is_none());
    }

    #[test]
    fn test_json_keys_follow_period_order() {
        let manifest =
            build_manifest(&sample_assets(), 2024, Some("https://example.com")).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();

        let files = json.find("\"files\"").unwrap();
        let order: Vec<usize> = ["\"Total\"", "\"2024\"", "\"2023\"", "\"2022\""]
            .iter()
            .map(|key| files + json[files..].find(key).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));

        let parsed: SvgManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_missing_base_svg() {
        let assets = vec![SvgAsset::new("github_2023.svg", at(2023, 1, 1, 0))];
        let err = build_manifest(&assets, 2023, None).unwrap_err();
        assert!(matches!(err, AtlasError::MissingBaseSvg { .. }));
    }

    #[test]
    fn test_scan_and_write() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["github.svg", "github_2021.svg", "github_2022.svg", "grid.svg"] {
            fs::write(dir.path().join(name), "<svg/>").unwrap();
        }

        let mut assets = scan_assets_dir(dir.path()).unwrap();
        assets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        let names: Vec<&str> = assets.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["github.svg", "github_2021.svg", "github_2022.svg"]);

        let manifest = build_manifest(&assets, 2022, None).unwrap();
        let output = dir.path().join("out").join("github_manifest.json");
        write_manifest(&output, &manifest).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.ends_with('\n'));
        let parsed: SvgManifest = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(parsed.default_year, "2022");
    }

    #[test]
    fn test_scan_requires_base_svg() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("github_2021.svg"), "<svg/>").unwrap();
        let err = scan_assets_dir(dir.path()).unwrap_err();
        assert!(matches!(err, AtlasError::MissingBaseSvg { .. }));
    }

    #[test]
    fn test_scan_requires_assets_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("assets");
        let err = scan_assets_dir(&missing).unwrap_err();
        assert!(matches!(err, AtlasError::MissingAssetsDir { .. }));
    }
}
