//! Summary statistics for a period.
//!
//! Aggregation is a fold over an owned [`StatsAccumulator`]: each activity
//! produces the next accumulator value, and [`StatsAccumulator::finish`]
//! converts the raw totals into display units in one step at the end.
//!
//! ## Averages
//!
//! - **Pace** is total paced distance over total paced time, where an
//!   activity's time is `distance / average_speed`. Activities without a speed
//!   (or with zero distance) are left out of both sums instead of counting as
//!   zero pace. Averaging per-activity paces would overweight short efforts.
//! - **Heart rate** averages only the activities that recorded one.
//! - **Streak** is the highest per-activity streak, not a sum.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AtlasConfig;
use crate::Activity;

/// Per-type count and distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityTypeBucket {
    pub count: u32,
    /// Meters
    pub total_distance_meters: f64,
}

/// Presentation vocabulary for one activity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLabel {
    pub icon: String,
    pub label: String,
}

/// Injected mapping from activity type to icon and display name.
///
/// Types without an entry use `fallback_icon` and their raw type string as
/// the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLabels {
    pub labels: HashMap<String, ActivityLabel>,
    pub fallback_icon: String,
}

impl Default for ActivityLabels {
    fn default() -> Self {
        let entries: [(&[&str], &str, &str); 5] = [
            (&["Run", "running"], "🏃", "Running"),
            (&["Hike", "hiking"], "🥾", "Hiking"),
            (&["Ride", "cycling"], "🚴", "Cycling"),
            (&["Walk", "walking"], "🚶", "Walking"),
            (&["Swim", "swimming"], "🏊", "Swimming"),
        ];

        let mut labels = HashMap::new();
        for (keys, icon, label) in entries {
            for key in keys {
                labels.insert(
                    key.to_string(),
                    ActivityLabel {
                        icon: icon.to_string(),
                        label: label.to_string(),
                    },
                );
            }
        }

        Self {
            labels,
            fallback_icon: "🏃".to_string(),
        }
    }
}

impl ActivityLabels {
    pub fn resolve(&self, activity_type: &str) -> ActivityLabel {
        self.labels.get(activity_type).cloned().unwrap_or_else(|| ActivityLabel {
            icon: self.fallback_icon.clone(),
            label: activity_type.to_string(),
        })
    }
}

/// One row of the by-type breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTypeStat {
    pub activity_type: String,
    pub icon: String,
    pub label: String,
    #[serde(flatten)]
    pub bucket: ActivityTypeBucket,
    /// Distance in the display unit, one decimal place
    pub distance: f64,
}

/// Aggregated statistics for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub activity_count: usize,
    pub total_distance_meters: f64,
    /// Display unit, one decimal place
    pub total_distance: f64,
    pub distance_unit: String,
    pub elevation_gain_meters: f64,
    /// Display unit, whole number; `None` when elevation display is disabled
    pub elevation_gain: Option<i64>,
    pub elevation_unit: String,
    /// Distance-weighted average speed in m/s
    pub average_speed: Option<f64>,
    /// Pace per display unit, e.g. `5'12"`
    pub average_pace: Option<String>,
    pub max_streak: u32,
    pub has_heart_rate: bool,
    pub average_heart_rate: Option<u32>,
    /// Number of distinct activity types
    pub activity_type_count: usize,
    /// Largest types by distance, descending
    pub top_activity_types: Vec<ActivityTypeStat>,
}

/// Running totals for a single pass over activities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAccumulator {
    count: usize,
    distance: f64,
    elevation_gain: f64,
    paced_distance: f64,
    paced_seconds: f64,
    heart_rate_sum: f64,
    heart_rate_missing: usize,
    max_streak: u32,
    // Insertion-ordered so that sorting can break ties by first appearance
    buckets: Vec<(String, ActivityTypeBucket)>,
}

impl StatsAccumulator {
    /// Fold one activity into the totals.
    pub fn absorb(mut self, activity: &Activity) -> Self {
        let distance = activity.distance_meters();

        self.count += 1;
        self.distance += distance;
        self.elevation_gain += activity.elevation_gain_meters();

        if let Some(speed) = activity.speed() {
            if distance > 0.0 {
                self.paced_distance += distance;
                self.paced_seconds += distance / speed;
            }
        }

        match activity.heart_rate() {
            Some(bpm) => self.heart_rate_sum += bpm,
            None => self.heart_rate_missing += 1,
        }

        self.max_streak = self.max_streak.max(activity.streak_days());

        let kind = activity.kind();
        match self.buckets.iter_mut().find(|(t, _)| t == kind) {
            Some((_, bucket)) => {
                bucket.count += 1;
                bucket.total_distance_meters += distance;
            }
            None => self.buckets.push((
                kind.to_string(),
                ActivityTypeBucket {
                    count: 1,
                    total_distance_meters: distance,
                },
            )),
        }

        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Per-type buckets in first-seen order.
    pub fn buckets(&self) -> &[(String, ActivityTypeBucket)] {
        &self.buckets
    }

    /// Distance-weighted average speed, `None` without paced activities.
    pub fn average_speed(&self) -> Option<f64> {
        (self.paced_seconds > 0.0).then_some(self.paced_distance / self.paced_seconds)
    }

    /// Mean heart rate over activities that have one.
    pub fn average_heart_rate(&self) -> Option<f64> {
        let with_heart_rate = self.count - self.heart_rate_missing;
        (with_heart_rate > 0).then_some(self.heart_rate_sum / with_heart_rate as f64)
    }

    /// Convert the raw totals into a display summary.
    pub fn finish(self, config: &AtlasConfig) -> YearSummary {
        let units = config.units.display_units();
        let average_speed = self.average_speed();
        let average_heart_rate = self.average_heart_rate();
        let activity_type_count = self.buckets.len();

        let mut ranked = self.buckets;
        ranked.sort_by(|a, b| b.1.total_distance_meters.total_cmp(&a.1.total_distance_meters));
        ranked.truncate(config.top_activity_types);

        let top_activity_types = ranked
            .into_iter()
            .map(|(activity_type, bucket)| {
                let ActivityLabel { icon, label } = config.activity_labels.resolve(&activity_type);
                ActivityTypeStat {
                    distance: units.distance(bucket.total_distance_meters),
                    activity_type,
                    icon,
                    label,
                    bucket,
                }
            })
            .collect();

        YearSummary {
            activity_count: self.count,
            total_distance_meters: self.distance,
            total_distance: units.distance(self.distance),
            distance_unit: units.distance_unit.to_string(),
            elevation_gain_meters: self.elevation_gain,
            elevation_gain: config
                .show_elevation_gain
                .then(|| units.elevation(self.elevation_gain)),
            elevation_unit: units.elevation_unit.to_string(),
            average_speed,
            average_pace: average_speed.and_then(|speed| units.pace(speed)),
            max_streak: self.max_streak,
            has_heart_rate: average_heart_rate.is_some(),
            average_heart_rate: average_heart_rate.map(|bpm| bpm.round() as u32),
            activity_type_count,
            top_activity_types,
        }
    }
}

/// Aggregate a filtered activity list into a [`YearSummary`].
pub fn aggregate<'a, I>(activities: I, config: &AtlasConfig) -> YearSummary
where
    I: IntoIterator<Item = &'a Activity>,
{
    activities
        .into_iter()
        .fold(StatsAccumulator::default(), StatsAccumulator::absorb)
        .finish(config)
}
