// tests/test_track.rs
use chrono::{Duration, TimeZone, Utc};
use gpxify_core::climbs::{detect_climbs, ClimbParams};
use gpxify_core::models::Point;
use gpxify_core::track::{
    analyze_segment, build, elevation_profile, extract_range, gradient_profile, speed_profile, statistics,
};
use gpxify_core::{ElevationAction, TrackError};

fn flat_three() -> Vec<Point> {
    vec![
        Point::new(45.0, 6.0).with_elevation(1000.0),
        Point::new(45.01, 6.01).with_elevation(1000.0),
        Point::new(45.02, 6.02).with_elevation(1000.0),
    ]
}

fn climb_four() -> Vec<Point> {
    vec![
        Point::new(45.0, 6.0).with_elevation(1000.0),
        Point::new(45.005, 6.005).with_elevation(1200.0),
        Point::new(45.01, 6.01).with_elevation(1400.0),
        Point::new(45.015, 6.015).with_elevation(1300.0),
    ]
}

#[test]
fn flat_track_distances_increase_without_elevation_change() {
    let track = build(&flat_three());
    let d = track.distances();
    assert_eq!(d[0], 0.0);
    assert!(d[1] > d[0] && d[2] > d[1]);

    let stats = statistics(&track);
    assert!(stats.elevation_gain.abs() < 1e-9);
    assert!(stats.elevation_loss.abs() < 1e-9);
    assert_eq!(stats.total_distance_m, d[2]);
    assert_eq!(stats.duration_s, None);
}

#[test]
fn four_point_climb_statistics() {
    let track = build(&climb_four());
    let stats = statistics(&track);
    assert!((stats.elevation_gain - 310.0).abs() < 1e-6, "gain {}", stats.elevation_gain);
    assert!((stats.elevation_loss - 10.0).abs() < 1e-6, "loss {}", stats.elevation_loss);
    assert_eq!(stats.min_elevation, Some(1000.0));
    assert_eq!(stats.max_elevation, Some(1400.0));
    assert_eq!(stats.avg_elevation, Some(1225.0));

    // the 5-sample average flattens four samples to a 100 m rise
    assert!(detect_climbs(&track, &ClimbParams::default()).is_empty());
}

#[test]
fn missing_elevation_counts_as_zero() {
    let pts = vec![Point::new(45.0, 6.0), Point::new(45.001, 6.0).with_elevation(10.0)];
    let track = build(&pts);
    assert_eq!(track.points()[0].elevation, 0.0);
    assert_eq!(track.points()[1].elevation, 10.0);
}

#[test]
fn segment_analysis_and_empty_range() {
    let track = build(&climb_four());
    let total_km = track.total_distance() / 1000.0;

    let seg = analyze_segment(&track, 0.0, total_km + 0.001).unwrap();
    assert_eq!(seg.point_count, 4);
    assert_eq!(seg.elevation_gain, 400.0);
    assert_eq!(seg.elevation_loss, 100.0);

    let err = analyze_segment(&track, total_km + 1.0, total_km + 2.0).unwrap_err();
    assert!(matches!(err, TrackError::NoPointsInRange { .. }));
    assert!(err.is_validation());
}

#[test]
fn extract_range_applies_the_elevation_policy() {
    let track = build(&climb_four());
    let (points, report) = extract_range(&track, 0.0, 1.0).unwrap();
    assert!(!points.is_empty());
    // fewer than 10 samples: not trusted, smoothed with the wide window
    assert_eq!(report.processing_applied, Some(ElevationAction::Interpolate));
    assert!(points.iter().all(|p| p.elevation.is_some()));

    assert!(extract_range(&track, 50.0, 60.0).is_err());
}

#[test]
fn profiles() {
    let pts: Vec<Point> = (0..250)
        .map(|i| Point::new(45.0 + i as f64 * 0.0001, 6.0).with_elevation(1000.0 + i as f64))
        .collect();
    let track = build(&pts);

    let elev = elevation_profile(&track, 100);
    assert_eq!(elev.len(), 4); // 0, 100, 200, 249
    assert_eq!(elev.last().map(|s| s.elevation), Some(1249.0));

    let grad = gradient_profile(&track, 500.0);
    assert_eq!(grad.len(), track.len());
    // 1 m per ~11.1 m step
    assert!(grad.iter().all(|g| (g.gradient_pct - 9.0).abs() < 0.1), "{:?}", grad[0]);
}

#[test]
fn speed_profile_skips_untimed_and_stalled_pairs() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let pts = vec![
        Point::new(45.0, 6.0).with_time(t0),
        Point::new(45.001, 6.0).with_time(t0 + Duration::seconds(40)),
        Point::new(45.002, 6.0).with_time(t0 + Duration::seconds(40)),
        Point::new(45.003, 6.0),
    ];
    let track = build(&pts);
    let speeds = speed_profile(&track);
    assert_eq!(speeds.len(), 1);
    // ~111 m in 40 s
    assert!((speeds[0].speed_kmh - 10.0).abs() < 0.1, "{}", speeds[0].speed_kmh);

    let stats = statistics(&track);
    assert_eq!(stats.duration_s, Some(40.0));
}
