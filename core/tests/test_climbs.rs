// tests/test_climbs.rs
use gpxify_core::climbs::{detect_climbs, ClimbParams};
use gpxify_core::models::Point;
use gpxify_core::track::build;
use gpxify_core::ClimbSegment;

fn load_fixture(path: &str) -> Vec<Point> {
    let mut rdr = csv::Reader::from_path(path).expect("fixture missing");
    rdr.records()
        .map(|r| {
            let r = r.expect("bad csv row");
            let lat: f64 = r[0].parse().unwrap();
            let lon: f64 = r[1].parse().unwrap();
            let ele: f64 = r[2].parse().unwrap();
            Point::new(lat, lon).with_elevation(ele)
        })
        .collect()
}

/// 0.001° latitude steps, one elevation per step.
fn course(profile: &[f64]) -> Vec<Point> {
    profile
        .iter()
        .enumerate()
        .map(|(i, e)| Point::new(45.0 + i as f64 * 0.001, 6.0).with_elevation(*e))
        .collect()
}

fn ramp(start: f64, step: f64, n: usize) -> Vec<f64> {
    (1..=n).map(|i| start + step * i as f64).collect()
}

fn assert_valid(climbs: &[ClimbSegment], p: &ClimbParams) {
    for c in climbs {
        assert!(c.elevation_gain >= p.min_gain, "{c:?}");
        assert!(c.elevation_loss == 0.0 || c.elevation_gain > p.min_ratio * c.elevation_loss, "{c:?}");
        assert!(c.avg_gradient_pct >= p.min_gradient, "{c:?}");
    }
    for w in climbs.windows(2) {
        assert!(w[0].end_index < w[1].start_index, "overlap: {:?} / {:?}", w[0], w[1]);
    }
}

#[test]
fn fixture_course_has_one_climb() {
    let track = build(&load_fixture("tests/fixtures/course_profile.csv"));
    assert_eq!(track.len(), 90);

    let params = ClimbParams::default();
    let climbs = detect_climbs(&track, &params);
    assert_eq!(climbs.len(), 1, "{climbs:?}");
    assert_valid(&climbs, &params);

    let c = &climbs[0];
    assert!((c.elevation_gain - 385.0).abs() < 1.0, "gain {}", c.elevation_gain);
    assert!(c.end_km > 5.0 && c.end_km < 6.5, "end {}", c.end_km);
    assert!((c.distance_km - (c.end_km - c.start_km)).abs() < 1e-9);
}

#[test]
fn faux_plat_is_merged_into_one_climb() {
    let mut profile = vec![1000.0; 5];
    profile.extend(ramp(1000.0, 10.0, 35)); // 1350
    profile.extend(ramp(1350.0, -15.0, 4)); // 1290
    profile.extend(ramp(1290.0, 10.0, 35)); // 1640
    profile.extend(vec![1640.0; 5]);

    let params = ClimbParams::default();
    let climbs = detect_climbs(&build(&course(&profile)), &params);
    assert_eq!(climbs.len(), 1, "{climbs:?}");
    assert_valid(&climbs, &params);
    assert!((climbs[0].elevation_gain - 670.0).abs() < 1.0);
}

#[test]
fn deep_valley_keeps_climbs_apart() {
    let mut profile = vec![1000.0; 5];
    profile.extend(ramp(1000.0, 10.0, 35)); // 1350
    profile.extend(ramp(1350.0, -15.0, 20)); // 1050
    profile.extend(ramp(1050.0, 10.0, 35)); // 1400
    profile.extend(vec![1400.0; 5]);

    let params = ClimbParams::default();
    let climbs = detect_climbs(&build(&course(&profile)), &params);
    assert_eq!(climbs.len(), 2, "{climbs:?}");
    assert_valid(&climbs, &params);
    assert!(climbs[0].end_km < climbs[1].start_km);
}

#[test]
fn thresholds_are_configurable() {
    let track = build(&load_fixture("tests/fixtures/course_profile.csv"));
    let strict = ClimbParams { min_gain: 500.0, ..ClimbParams::default() };
    assert!(detect_climbs(&track, &strict).is_empty());
}

#[test]
fn short_or_flat_tracks_have_no_climbs() {
    let params = ClimbParams::default();
    assert!(detect_climbs(&build(&[]), &params).is_empty());
    assert!(detect_climbs(&build(&course(&[1000.0])), &params).is_empty());
    assert!(detect_climbs(&build(&course(&[1000.0; 50])), &params).is_empty());
}

#[test]
fn climb_running_to_the_finish_is_kept() {
    let mut profile = vec![1000.0; 5];
    profile.extend(ramp(1000.0, 10.0, 45));

    let params = ClimbParams::default();
    let track = build(&course(&profile));
    let climbs = detect_climbs(&track, &params);
    assert_eq!(climbs.len(), 1);
    assert_eq!(climbs[0].end_index, track.len() - 1);
}
