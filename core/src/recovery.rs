// core/src/recovery.rs
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::elevation::{assess, interpolate_linear, process_elevation_data};
use crate::error::{Result, TrackError};
use crate::geo::{distance, slope};
use crate::models::{Point, Track};
use crate::track::build;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryParams {
    /// Without a distance hint, only this leading share of the reference
    /// is searched for the cutoff point.
    pub search_ratio: f64,
    /// Half-width of the cutoff search window around a distance hint (km).
    pub hint_window_km: f64,
    pub speed_min_ms: f64,
    pub speed_max_ms: f64,
    pub iterations: usize,
    /// Speed on a segment is `v * (1 - slope_factor * slope)`.
    pub slope_factor: f64,
    pub min_speed_factor: f64,
    pub max_speed_factor: f64,
    /// Partial elevation must score this much higher than the reference to
    /// be trusted over it.
    pub quality_margin: f64,
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self {
            search_ratio: 0.75,
            hint_window_km: 5.0,
            speed_min_ms: 0.1,
            speed_max_ms: 10.0,
            iterations: 50,
            slope_factor: 2.0,
            min_speed_factor: 0.3,
            max_speed_factor: 2.0,
            quality_margin: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecoveryRequest<'a> {
    /// Timestamped recording that stopped before the finish.
    pub partial: &'a [Point],
    /// Untimed full course.
    pub reference: &'a [Point],
    pub official_duration: Duration,
    pub approx_distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveredElevation {
    /// Reference elevations after the quality policy.
    Reference,
    /// Integrated from segment slopes, starting at the partial's last elevation.
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveredTrack {
    pub points: Vec<Point>,
    pub track: Track,
    pub cutoff_index: usize,
    pub base_speed_ms: f64,
    pub remaining_duration_s: f64,
    pub elevation_source: RecoveredElevation,
}

#[derive(Debug, Clone, Copy)]
struct Leg {
    distance: f64,
    slope: f64,
}

/// Parses "HH:MM:SS" or "MM:SS".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let malformed = || TrackError::MalformedDuration(s.to_string());
    let fields = s
        .trim()
        .split(':')
        .map(|f| f.parse::<i64>().map_err(|_| malformed()))
        .collect::<Result<Vec<i64>>>()?;

    let (h, m, sec) = match fields.as_slice() {
        [h, m, sec] => (*h, *m, *sec),
        [m, sec] => (0, *m, *sec),
        _ => return Err(malformed()),
    };
    // out-of-range components count as malformed
    Duration::try_hours(h)
        .zip(Duration::try_minutes(m))
        .zip(Duration::try_seconds(sec))
        .and_then(|((h, m), sec)| h.checked_add(&m)?.checked_add(&sec))
        .ok_or_else(malformed)
}

fn seconds(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}

/// Reference index closest to `target`, within the hint window or the
/// leading share of the course.
fn find_cutoff(target: &Point, reference: &[Point], hint_km: Option<f64>, p: &RecoveryParams) -> usize {
    let candidates: Vec<usize> = match hint_km {
        Some(km) => {
            let dists = build(reference).distances();
            let window: Vec<usize> = (0..reference.len())
                .filter(|&i| (dists[i] - km * 1000.0).abs() <= p.hint_window_km * 1000.0)
                .collect();
            if window.is_empty() {
                (0..reference.len()).collect()
            } else {
                window
            }
        }
        None => {
            let limit = ((reference.len() as f64 * p.search_ratio) as usize).max(1);
            (0..limit.min(reference.len())).collect()
        }
    };

    let mut best = candidates.first().copied().unwrap_or(0);
    let mut best_d = f64::INFINITY;
    for i in candidates {
        let d = distance(target, &reference[i]);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn leg_speed(v: f64, leg: &Leg, p: &RecoveryParams) -> f64 {
    (v * (1.0 - p.slope_factor * leg.slope)).clamp(p.min_speed_factor * v, p.max_speed_factor * v)
}

fn total_time(v: f64, legs: &[Leg], p: &RecoveryParams) -> f64 {
    legs.iter().map(|l| l.distance / leg_speed(v, l, p)).sum()
}

/// Base speed whose slope-adjusted time over `legs` matches `target_s`.
fn solve_base_speed(legs: &[Leg], target_s: f64, p: &RecoveryParams) -> f64 {
    let (mut lo, mut hi) = (p.speed_min_ms, p.speed_max_ms);
    for _ in 0..p.iterations {
        let mid = (lo + hi) / 2.0;
        if total_time(mid, legs, p) > target_s {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// Completes a recording that stopped early: the rest of the reference
/// course is timestamped so the whole effort matches the official duration.
pub fn recover_race(req: &RecoveryRequest<'_>, p: &RecoveryParams) -> Result<RecoveredTrack> {
    let (Some(first), Some(last)) = (req.partial.first(), req.partial.last()) else {
        return Err(TrackError::EmptyTrack);
    };
    if req.reference.is_empty() {
        return Err(TrackError::EmptyTrack);
    }

    let cutoff_index = find_cutoff(last, req.reference, req.approx_distance_km, p);

    let (Some(t0), Some(t_end)) = (first.time, last.time) else {
        return Err(TrackError::MissingTimestamps);
    };
    let recorded_s = seconds(t_end - t0);
    let official_s = seconds(req.official_duration);
    let remaining_s = official_s - recorded_s;
    if remaining_s <= 0.0 {
        return Err(TrackError::DurationTooShort { official_s, recorded_s });
    }

    let partial_quality = assess(req.partial);
    let (reference, reference_quality) = process_elevation_data(req.reference, None);

    let rest = &reference[cutoff_index + 1..];
    let legs: Vec<Leg> = rest
        .iter()
        .scan(*last, |prev, pt| {
            let leg = Leg { distance: distance(prev, pt), slope: slope(prev, pt) };
            *prev = *pt;
            Some(leg)
        })
        .collect();

    let base_speed_ms = solve_base_speed(&legs, remaining_s, p);
    log::debug!(
        "recovery: cutoff {} / {}, {} leg(s), {:.0}s to fill, base speed {:.3} m/s",
        cutoff_index,
        req.reference.len(),
        legs.len(),
        remaining_s,
        base_speed_ms
    );

    let synthesize = partial_quality.score - reference_quality.score > p.quality_margin;
    let (elevation_source, mut tail) = if synthesize {
        let base = req.partial.iter().rev().find_map(|pt| pt.elevation).unwrap_or(0.0);
        log::info!(
            "recovery: partial elevation ({:.1}) beats reference ({:.1}), synthesizing from {:.0} m",
            partial_quality.score,
            reference_quality.score,
            base
        );
        let dists: Vec<f64> = legs.iter().map(|l| l.distance).collect();
        let slopes: Vec<f64> = legs.iter().map(|l| l.slope).collect();
        (RecoveredElevation::Synthesized, interpolate_linear(rest, base, &dists, &slopes))
    } else {
        (RecoveredElevation::Reference, rest.to_vec())
    };

    let mut elapsed = 0.0;
    for (pt, leg) in tail.iter_mut().zip(&legs) {
        elapsed += leg.distance / leg_speed(base_speed_ms, leg, p);
        pt.time = Some(t_end + Duration::microseconds((elapsed * 1e6).round() as i64));
    }

    let mut points = Vec::with_capacity(req.partial.len() + tail.len());
    points.extend_from_slice(req.partial);
    points.append(&mut tail);
    let track = build(&points);

    Ok(RecoveredTrack {
        points,
        track,
        cutoff_index,
        base_speed_ms,
        remaining_duration_s: remaining_s,
        elevation_source,
    })
}
