// tests/test_merge.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use gpxify_core::merge::{merge_tracks, MergeInput, MergeOptions};
use gpxify_core::models::Point;
use gpxify_core::TrackError;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 30, 6, 0, 0).unwrap()
}

/// Three timed points, one minute apart, heading north from `lat`.
fn file(name: &str, lat: f64, start: Option<DateTime<Utc>>) -> MergeInput {
    let points = (0..3)
        .map(|i| {
            let p = Point::new(lat + i as f64 * 0.001, 6.0).with_elevation(1000.0);
            match start {
                Some(t) => p.with_time(t + Duration::seconds(60 * i)),
                None => p,
            }
        })
        .collect();
    MergeInput { name: name.to_string(), segments: vec![points] }
}

#[test]
fn gap_above_threshold_starts_a_new_segment() {
    let a = file("morning.gpx", 45.0, Some(t0()));
    // a ends at t0+120 s, b starts 400 s later
    let b = file("afternoon.gpx", 45.01, Some(t0() + Duration::seconds(520)));

    let merged = merge_tracks(&[a, b], &MergeOptions::default()).unwrap();
    assert_eq!(merged.segments.len(), 2);
    assert_eq!(merged.point_count(), 6);
    assert_eq!(merged.track.len(), 6);
    assert_eq!(
        merged.warnings[0],
        "Successfully merged 2 segment(s) from 2 file(s) into 2 segment(s) with 6 total points"
    );
    assert!(merged.warnings.iter().any(|w| w.starts_with("Gap detected: 6.7 minutes between segments")));
    assert!(merged.warnings[1].contains("(from 45.00200,6.00000 to 45.01000,6.00000)"));

    // the ~900 m jump between the files adds no distance
    let step = merged.track.points()[1].distance;
    assert!((merged.track.total_distance() - 4.0 * step).abs() < 1e-6);
}

#[test]
fn bridged_gap_keeps_one_segment() {
    let a = file("a.gpx", 45.0, Some(t0()));
    let b = file("b.gpx", 45.01, Some(t0() + Duration::seconds(520)));
    let opts = MergeOptions { interpolate_gaps: true, ..MergeOptions::default() };

    let merged = merge_tracks(&[a, b], &opts).unwrap();
    assert_eq!(merged.segments.len(), 1);
    assert_eq!(merged.warnings.len(), 2);
}

#[test]
fn inputs_are_sorted_chronologically() {
    let early = file("early.gpx", 45.0, Some(t0()));
    let late = file("late.gpx", 45.003, Some(t0() + Duration::seconds(180)));

    let merged = merge_tracks(&[late, early], &MergeOptions::default()).unwrap();
    assert_eq!(merged.segments.len(), 1);
    assert_eq!(merged.segments[0][0].time, Some(t0()));
    assert_eq!(merged.warnings.len(), 1);

    let times: Vec<_> = merged.segments[0].iter().filter_map(|p| p.time).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn overlap_is_reported_but_kept() {
    let a = file("a.gpx", 45.0, Some(t0()));
    let b = file("b.gpx", 45.003, Some(t0() + Duration::seconds(90)));

    let merged = merge_tracks(&[a, b], &MergeOptions::default()).unwrap();
    assert_eq!(merged.segments.len(), 1);
    assert_eq!(merged.point_count(), 6);
    assert_eq!(
        merged.warnings[1],
        "Overlap detected: b.gpx starts 30s before previous segment ended. Keeping chronological order."
    );
}

#[test]
fn untimed_segments_go_last() {
    let untimed = file("plan.gpx", 46.0, None);
    let timed = file("watch.gpx", 45.0, Some(t0()));

    let merged = merge_tracks(&[untimed, timed], &MergeOptions::default()).unwrap();
    assert_eq!(merged.segments[0][0].lat, 45.0);
    assert_eq!(merged.segments[0][3].lat, 46.0);
    assert!(merged
        .warnings
        .iter()
        .any(|w| w == "Only 1/2 segments have timestamps. Segments without time will be placed at the end."));
}

#[test]
fn manual_order_without_timestamps() {
    let a = file("b-side.gpx", 46.0, None);
    let b = file("a-side.gpx", 45.0, None);

    let merged = merge_tracks(&[a, b], &MergeOptions::default()).unwrap();
    assert_eq!(merged.segments[0][0].lat, 46.0);
    assert_eq!(merged.warnings[1], "No segments have timestamps. Using original order.");
}

#[test]
fn empty_inputs_are_rejected() {
    let empty = MergeInput { name: "empty.gpx".into(), segments: vec![vec![]] };
    assert_eq!(merge_tracks(&[empty], &MergeOptions::default()).unwrap_err(), TrackError::NoSegments);
    assert_eq!(merge_tracks(&[], &MergeOptions::default()).unwrap_err(), TrackError::NoSegments);
}
