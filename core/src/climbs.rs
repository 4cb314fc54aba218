// core/src/climbs.rs
use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::elevation::{find_local_maximum, find_local_minimum, smooth_series};
use crate::models::{Track, TrackPoint};
use crate::types::ClimbSegment;

/// Thresholds of the climb detector. Every field has a default so a
/// partial JSON object is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbParams {
    /// Minimum D+ (m).
    pub min_gain: f64,
    /// D+ must exceed `min_ratio * D-`.
    pub min_ratio: f64,
    /// Minimum average gradient (%).
    pub min_gradient: f64,
    pub smoothing_window: usize,
    /// The forward walk stops once it is this far below the running peak (m).
    pub max_descent_from_peak: f64,
    /// Samples searched around a candidate's bounds during refinement.
    pub refine_search: usize,
    pub merge_max_gap_m: f64,
    pub merge_max_gap_descent_m: f64,
}

impl Default for ClimbParams {
    fn default() -> Self {
        Self {
            min_gain: 300.0,
            min_ratio: 4.0,
            min_gradient: 4.0,
            smoothing_window: 5,
            max_descent_from_peak: 50.0,
            refine_search: 10,
            merge_max_gap_m: 1000.0,
            merge_max_gap_descent_m: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ClimbStats {
    d_plus: f64,
    d_minus: f64,
    distance_m: f64,
    avg_gradient_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    start: usize,
    end: usize,
    stats: ClimbStats,
}

fn climb_stats(pts: &[TrackPoint], smoothed: &[f64], start: usize, end: usize) -> ClimbStats {
    let mut d_plus = 0.0;
    let mut d_minus = 0.0;
    for i in start + 1..=end {
        let d = smoothed[i] - smoothed[i - 1];
        if d > 0.0 {
            d_plus += d;
        } else {
            d_minus -= d;
        }
    }
    let distance_m = pts[end].distance - pts[start].distance;
    let avg_gradient_pct = if distance_m > 0.0 { d_plus / distance_m * 100.0 } else { 0.0 };
    ClimbStats { d_plus, d_minus, distance_m, avg_gradient_pct }
}

fn accepts(s: &ClimbStats, p: &ClimbParams) -> bool {
    s.d_plus >= p.min_gain
        && (s.d_minus == 0.0 || s.d_plus > p.min_ratio * s.d_minus)
        && s.avg_gradient_pct >= p.min_gradient
}

/// Walks forward from `start` while the climb stays clean, then refines the
/// bounds to the surrounding local extrema.
fn find_candidate(pts: &[TrackPoint], smoothed: &[f64], start: usize, p: &ClimbParams) -> Option<Candidate> {
    let mut prev = smoothed[start];
    let mut peak = smoothed[start];
    let mut d_plus = 0.0;
    let mut d_minus = 0.0;
    let mut descent_from_peak = 0.0;
    let mut best_end = None;

    for (end, &cur) in smoothed.iter().enumerate().skip(start + 1) {
        let diff = cur - prev;
        if diff > 0.0 {
            d_plus += diff;
            if cur > peak {
                peak = cur;
                descent_from_peak = 0.0;
            }
        } else {
            d_minus -= diff;
            descent_from_peak = peak - cur;
        }
        prev = cur;

        if d_plus >= p.min_gain && (d_minus == 0.0 || d_plus / d_minus > p.min_ratio) {
            best_end = Some(end);
        }

        // past the summit
        if descent_from_peak > p.max_descent_from_peak {
            break;
        }
        if d_minus > 0.0 && d_plus / d_minus < p.min_ratio {
            break;
        }
    }

    let best_end = best_end?;
    let start = find_local_minimum(smoothed, start, p.refine_search);
    let end = find_local_maximum(smoothed, best_end, p.refine_search);
    let stats = climb_stats(pts, smoothed, start, end);

    accepts(&stats, p).then_some(Candidate { start, end, stats })
}

/// Keeps the biggest climbs first; a candidate whose index range touches an
/// already kept one is dropped. Result is in track order.
fn remove_overlaps(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by_key(|c| Reverse(OrderedFloat(c.stats.d_plus)));

    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if kept.iter().all(|k| c.end < k.start || c.start > k.end) {
            kept.push(c);
        }
    }

    kept.sort_by_key(|c| c.start);
    kept
}

fn gap_descent(smoothed: &[f64], from: usize, to: usize) -> f64 {
    (from + 1..=to)
        .map(|i| smoothed[i] - smoothed[i - 1])
        .filter(|d| *d < 0.0)
        .map(f64::abs)
        .sum()
}

/// Joins consecutive climbs separated by a short, nearly flat gap
/// ("faux-plat") as long as the joined interval is still a climb.
fn merge_consecutive(climbs: Vec<Candidate>, pts: &[TrackPoint], smoothed: &[f64], p: &ClimbParams) -> Vec<Candidate> {
    if climbs.len() <= 1 {
        return climbs;
    }

    let mut merged = Vec::with_capacity(climbs.len());
    let mut i = 0;

    while i < climbs.len() {
        let current = climbs[i];
        let mut end = current.end;
        let mut j = i + 1;

        while let Some(next) = climbs.get(j) {
            if pts[next.start].distance - pts[end].distance > p.merge_max_gap_m {
                break;
            }
            if gap_descent(smoothed, end, next.start) > p.merge_max_gap_descent_m {
                break;
            }
            if !accepts(&climb_stats(pts, smoothed, current.start, next.end), p) {
                break;
            }
            end = next.end;
            j += 1;
        }

        if end != current.end {
            log::debug!("merged climbs {}..{} into one ({}..{})", i, j - 1, current.start, end);
            merged.push(Candidate {
                start: current.start,
                end,
                stats: climb_stats(pts, smoothed, current.start, end),
            });
            i = j;
        } else {
            merged.push(current);
            i += 1;
        }
    }

    merged
}

fn to_segment(pts: &[TrackPoint], c: &Candidate) -> ClimbSegment {
    ClimbSegment {
        start_km: pts[c.start].distance / 1000.0,
        end_km: pts[c.end].distance / 1000.0,
        distance_km: c.stats.distance_m / 1000.0,
        elevation_gain: c.stats.d_plus,
        elevation_loss: c.stats.d_minus,
        avg_gradient_pct: c.stats.avg_gradient_pct,
        start_index: c.start,
        end_index: c.end,
    }
}

/// Significant climbs of `track`, in track order, without overlap.
pub fn detect_climbs(track: &Track, params: &ClimbParams) -> Vec<ClimbSegment> {
    let pts = track.points();
    let n = pts.len();
    if n < 2 {
        return Vec::new();
    }

    let smoothed = smooth_series(&track.elevations(), params.smoothing_window);

    let mut candidates = Vec::new();
    let mut i = 0;
    while i < n - 1 {
        match find_candidate(pts, &smoothed, i, params) {
            Some(c) => {
                i = c.end + 1;
                candidates.push(c);
            }
            None => i += 1,
        }
    }
    log::debug!("climb scan: {} candidate(s) over {} points", candidates.len(), n);

    let kept = remove_overlaps(candidates);
    let merged = merge_consecutive(kept, pts, &smoothed, params);

    merged.iter().map(|c| to_segment(pts, c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(start: usize, end: usize, d_plus: f64) -> Candidate {
        Candidate {
            start,
            end,
            stats: ClimbStats { d_plus, d_minus: 0.0, distance_m: 1.0, avg_gradient_pct: 10.0 },
        }
    }

    #[test]
    fn overlaps_keep_the_biggest_and_return_track_order() {
        let kept = remove_overlaps(vec![cand(0, 10, 300.0), cand(8, 20, 500.0), cand(21, 30, 400.0)]);
        let ranges: Vec<(usize, usize)> = kept.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(ranges, vec![(8, 20), (21, 30)]);
    }

    #[test]
    fn touching_ranges_overlap() {
        let kept = remove_overlaps(vec![cand(0, 10, 300.0), cand(10, 20, 400.0)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start, 10);
    }

    #[test]
    fn gap_descent_counts_only_drops() {
        let s = [100.0, 90.0, 95.0, 80.0];
        assert_eq!(gap_descent(&s, 0, 3), 25.0);
        assert_eq!(gap_descent(&s, 1, 2), 0.0);
    }
}
