// core/src/track.rs
use crate::elevation::{elevation_stats, process_elevation_data, uphill_downhill};
use crate::error::{Result, TrackError};
use crate::geo::haversine_m;
use crate::models::{Point, Track, TrackPoint};
use crate::types::{
    ElevationQualityReport, GradientSample, ProfileSample, SegmentAnalysis, SpeedSample, TrackStatistics,
};

pub const PROFILE_SAMPLE_RATE: usize = 100;
pub const GRADIENT_WINDOW_M: f64 = 500.0;

#[inline]
fn to_track_point(p: &Point, distance: f64) -> TrackPoint {
    TrackPoint {
        lat: p.lat,
        lon: p.lon,
        elevation: p.elevation.unwrap_or(0.0),
        time: p.time,
        distance,
    }
}

/// Places `points` on a track: cumulative horizontal distance, first point
/// at 0, missing elevation as 0.0.
pub fn build(points: &[Point]) -> Track {
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;

    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            let prev = &points[i - 1];
            acc += haversine_m(prev.lat, prev.lon, p.lat, p.lon);
        }
        out.push(to_track_point(p, acc));
    }

    Track::from_points(out)
}

/// Like `build`, over several physical segments. Distance keeps
/// accumulating across segments but the jump between one segment's last
/// point and the next segment's first point is not counted.
pub fn build_segments(segments: &[Vec<Point>]) -> Track {
    let mut out = Vec::with_capacity(segments.iter().map(Vec::len).sum());
    let mut acc = 0.0;

    for seg in segments {
        for (i, p) in seg.iter().enumerate() {
            if i > 0 {
                let prev = &seg[i - 1];
                acc += haversine_m(prev.lat, prev.lon, p.lat, p.lon);
            }
            out.push(to_track_point(p, acc));
        }
    }

    Track::from_points(out)
}

/// Distance, D+/D-, elevation extremes and time bounds of a track.
pub fn statistics(track: &Track) -> TrackStatistics {
    let pts = track.points();
    let (gain, loss) = uphill_downhill(&track.elevations());
    let points: Vec<Point> = pts.iter().map(TrackPoint::to_point).collect();
    let elev = elevation_stats(&points);

    let start_time = pts.iter().find_map(|p| p.time);
    let end_time = pts.iter().rev().find_map(|p| p.time);
    let duration_s = match (start_time, end_time) {
        (Some(a), Some(b)) => Some((b - a).num_milliseconds() as f64 / 1000.0),
        _ => None,
    };

    TrackStatistics {
        total_distance_m: track.total_distance(),
        elevation_gain: gain,
        elevation_loss: loss,
        min_elevation: elev.min,
        max_elevation: elev.max,
        avg_elevation: elev.avg,
        duration_s,
        start_time,
        end_time,
    }
}

fn km_label(km: f64) -> String {
    format!("{km:.2} km")
}

/// D+/D- (unsmoothed) and distance between two km markers.
pub fn analyze_segment(track: &Track, start_km: f64, end_km: f64) -> Result<SegmentAnalysis> {
    let seg = track.points_between(start_km * 1000.0, end_km * 1000.0);
    if seg.len() < 2 {
        return Err(TrackError::no_points_between(km_label(start_km), km_label(end_km)));
    }

    let mut gain = 0.0;
    let mut loss = 0.0;
    for w in seg.windows(2) {
        let d = w[1].elevation - w[0].elevation;
        if d > 0.0 {
            gain += d;
        } else {
            loss -= d;
        }
    }

    Ok(SegmentAnalysis {
        start_km,
        end_km,
        distance_m: seg[seg.len() - 1].distance - seg[0].distance,
        elevation_gain: gain,
        elevation_loss: loss,
        point_count: seg.len(),
    })
}

/// Points between two km markers, ready for export, after the elevation
/// processing policy.
pub fn extract_range(track: &Track, start_km: f64, end_km: f64) -> Result<(Vec<Point>, ElevationQualityReport)> {
    let seg = track.points_between(start_km * 1000.0, end_km * 1000.0);
    if seg.is_empty() {
        return Err(TrackError::no_points_between(km_label(start_km), km_label(end_km)));
    }
    let raw: Vec<Point> = seg.iter().map(TrackPoint::to_point).collect();
    let (points, report) = process_elevation_data(&raw, None);
    log::info!(
        "extract {:.1}-{:.1} km: elevation quality {:.1}/100 ({:?}), action {:?}",
        start_km,
        end_km,
        report.score,
        report.source,
        report.processing_applied
    );
    Ok((points, report))
}

/// Every `sample_rate`-th point plus the last one.
pub fn elevation_profile(track: &Track, sample_rate: usize) -> Vec<ProfileSample> {
    let rate = sample_rate.max(1);
    let pts = track.points();
    let last = pts.len().saturating_sub(1);
    pts.iter()
        .enumerate()
        .filter(|(i, _)| i % rate == 0 || *i == last)
        .map(|(_, p)| ProfileSample { distance_km: p.distance / 1000.0, elevation: p.elevation })
        .collect()
}

/// Gradient (%) across a window of `window_m` centered on each point.
/// Points whose window spans no distance are skipped.
pub fn gradient_profile(track: &Track, window_m: f64) -> Vec<GradientSample> {
    let pts = track.points();
    if pts.len() < 2 {
        return Vec::new();
    }
    let half = window_m / 2.0;
    let mut out = Vec::new();
    let mut lo = 0usize;
    let mut hi = 0usize;

    for p in pts {
        while pts[lo].distance < p.distance - half {
            lo += 1;
        }
        while hi + 1 < pts.len() && pts[hi + 1].distance <= p.distance + half {
            hi += 1;
        }
        let run = pts[hi].distance - pts[lo].distance;
        if run > 0.0 {
            out.push(GradientSample {
                distance_km: p.distance / 1000.0,
                gradient_pct: (pts[hi].elevation - pts[lo].elevation) / run * 100.0,
            });
        }
    }

    out
}

/// Speed between consecutive timed points with a positive time step.
pub fn speed_profile(track: &Track) -> Vec<SpeedSample> {
    track
        .points()
        .windows(2)
        .filter_map(|w| {
            let (t0, t1) = (w[0].time?, w[1].time?);
            let dt = (t1 - t0).num_milliseconds() as f64 / 1000.0;
            if dt <= 0.0 {
                return None;
            }
            let v_ms = (w[1].distance - w[0].distance) / dt;
            Some(SpeedSample { distance_km: w[1].distance / 1000.0, speed_kmh: v_ms * 3.6, time: t1 })
        })
        .collect()
}
