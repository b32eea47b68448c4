//! End-to-end pipeline for one page view.
//!
//! ```text
//! activities ─► filter ─┬─► aggregate ─────────────► YearSummary
//!                       └─► project ─► compute_bounds ► ViewState
//! ```
//!
//! Callers memoize on their own keys (activity source, period, redraw token);
//! nothing is cached here.

use log::debug;
use serde::Serialize;

use crate::config::AtlasConfig;
use crate::filter::{filter_activities, PeriodKey};
use crate::projection::{project, GeoFeatureCollection, ProjectOptions};
use crate::stats::{aggregate, YearSummary};
use crate::viewport::{compute_bounds, ViewState};
use crate::{Activity, ActivityId};

/// Everything a stats panel and a route map need for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub period: PeriodKey,
    /// Ids of the selected activities, in display order
    pub activity_ids: Vec<ActivityId>,
    pub summary: YearSummary,
    pub geo: GeoFeatureCollection,
    pub view_state: ViewState,
}

/// Run filter, aggregation, projection and viewport fitting for `period`.
pub fn build_dashboard(
    activities: &[Activity],
    period: &PeriodKey,
    known_years: &[String],
    config: &AtlasConfig,
    options: &ProjectOptions,
) -> Dashboard {
    let selected = filter_activities(activities, period, known_years, config.sort_order);

    let summary = aggregate(selected.iter().copied(), config);
    let geo = project(selected.iter().copied(), &config.palette, options);
    let view_state = compute_bounds(&geo, &config.viewport);

    debug!(
        "Dashboard {}: {} activities, {} routes, zoom {:.2}",
        period,
        selected.len(),
        geo.features.len(),
        view_state.zoom
    );

    Dashboard {
        period: period.clone(),
        activity_ids: selected.iter().map(|a| a.id.clone()).collect(),
        summary,
        geo,
        view_state,
    }
}
