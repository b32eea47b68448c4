//! Summarize a small activity list for every period.
//!
//! Run with: cargo run --example year_summary

use activity_atlas::{
    build_dashboard, collect_years, Activity, AtlasConfig, GpsPoint, PeriodKey, ProjectOptions,
    RouteGeometry, Theme,
};

fn main() {
    let activities = vec![
        Activity::new("1", "Run", "2023-03-04 07:12:00")
            .with_distance(10_250.0)
            .with_average_speed(3.1)
            .with_average_heart_rate(152.0)
            .with_streak(3)
            .with_geometry(RouteGeometry::Encoded("_p~iF~ps|U_ulLnnqC_mqNvxq`@".to_string())),
        Activity::new("2", "Ride", "2023-05-01 18:30:00")
            .with_distance(42_000.0)
            .with_average_speed(7.5)
            .with_elevation_gain(380.0),
        Activity::new("3", "Run", "2022-11-20 09:00:00")
            .with_distance(5_000.0)
            .with_average_speed(3.4)
            .with_streak(12)
            .with_geometry(RouteGeometry::Points(vec![
                GpsPoint::new(51.5074, -0.1278),
                GpsPoint::new(51.5090, -0.1300),
                GpsPoint::new(51.5110, -0.1320),
            ])),
    ];

    let config = AtlasConfig::default();
    let years = collect_years(&activities);
    let options = ProjectOptions { theme: Theme::Dark, redraw_token: 1 };

    println!("Activity Summary\n");

    let periods =
        std::iter::once(PeriodKey::Total).chain(years.iter().map(|y| PeriodKey::parse(y)));
    for period in periods {
        let dashboard = build_dashboard(&activities, &period, &years, &config, &options);
        let summary = &dashboard.summary;

        println!("{}", period);
        println!("  Activities: {}", summary.activity_count);
        println!("  Distance:   {} {}", summary.total_distance, summary.distance_unit);
        if let Some(elevation) = summary.elevation_gain {
            println!("  Elevation:  {} {}", elevation, summary.elevation_unit);
        }
        println!("  Avg pace:   {}", summary.average_pace.as_deref().unwrap_or("-"));
        println!("  Streak:     {} day", summary.max_streak);
        if let Some(bpm) = summary.average_heart_rate {
            println!("  Avg HR:     {}", bpm);
        }
        for stat in &summary.top_activity_types {
            println!(
                "    {} {:<9} {:>3}x {:>7} {}",
                stat.icon, stat.label, stat.bucket.count, stat.distance, summary.distance_unit
            );
        }
        println!(
            "  Map: {} routes, center ({:.4}, {:.4}) zoom {:.1}\n",
            dashboard.geo.features.len(),
            dashboard.view_state.latitude,
            dashboard.view_state.longitude,
            dashboard.view_state.zoom
        );
    }
}
