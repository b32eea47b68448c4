//! Period selection and canonical ordering of activities.
//!
//! A period is either a single calendar year or the all-time sentinel
//! `"Total"`. Filtering never fails: a year the caller does not know about
//! selects everything rather than nothing.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Activity;

/// Sentinel period meaning "all years".
pub const TOTAL: &str = "Total";

/// Aggregation window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PeriodKey {
    /// All activities
    Total,
    /// A single year, e.g. `"2023"`
    Year(String),
}

impl PeriodKey {
    /// Interpret a period string. Anything other than `"Total"` is a year key.
    pub fn parse(key: &str) -> Self {
        if key == TOTAL {
            PeriodKey::Total
        } else {
            PeriodKey::Year(key.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PeriodKey::Total => TOTAL,
            PeriodKey::Year(year) => year,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for PeriodKey {
    fn from(key: String) -> Self {
        PeriodKey::parse(&key)
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.as_str().to_string()
    }
}

/// Ordering of the filtered list by local start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest activity first
    #[default]
    MostRecentFirst,
    /// Oldest activity first
    Chronological,
}

/// Select the activities of `period`, ordered by local start time.
///
/// `known_years` is the set of years the data loader reported. A year key
/// outside that set applies no filter. The sort is stable, so activities with
/// identical timestamps keep their input order.
///
/// # Example
///
/// ```rust
/// use activity_atlas::{Activity, PeriodKey, SortOrder, filter_activities};
///
/// let activities = vec![
///     Activity::new("a", "Run", "2022-01-01 08:00:00"),
///     Activity::new("b", "Run", "2023-06-01 08:00:00"),
/// ];
/// let years = vec!["2023".to_string(), "2022".to_string()];
///
/// let period = PeriodKey::parse("2023");
/// let selected = filter_activities(&activities, &period, &years, SortOrder::default());
/// assert_eq!(selected.len(), 1);
/// assert_eq!(selected[0].id.as_str(), "b");
/// ```
pub fn filter_activities<'a>(
    activities: &'a [Activity],
    period: &PeriodKey,
    known_years: &[String],
    order: SortOrder,
) -> Vec<&'a Activity> {
    let mut selected: Vec<&Activity> = match period {
        PeriodKey::Year(year) if known_years.iter().any(|y| y == year) => activities
            .iter()
            .filter(|a| a.year() == Some(year.as_str()))
            .collect(),
        PeriodKey::Year(year) => {
            debug!(
                "Unknown period '{}', passing all {} activities through",
                year,
                activities.len()
            );
            activities.iter().collect()
        }
        PeriodKey::Total => activities.iter().collect(),
    };

    match order {
        SortOrder::MostRecentFirst => {
            selected.sort_by(|a, b| b.start_date_local.cmp(&a.start_date_local))
        }
        SortOrder::Chronological => {
            selected.sort_by(|a, b| a.start_date_local.cmp(&b.start_date_local))
        }
    }

    selected
}

/// Distinct years present in `activities`, newest first.
pub fn collect_years(activities: &[Activity]) -> Vec<String> {
    let mut years: Vec<String> = activities
        .iter()
        .filter_map(|a| a.year())
        .map(str::to_string)
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

/// The period a page opens on: the newest year, or `Total` without data.
pub fn default_period(years: &[String]) -> PeriodKey {
    years
        .iter()
        .max()
        .map(|y| PeriodKey::Year(y.clone()))
        .unwrap_or(PeriodKey::Total)
}
