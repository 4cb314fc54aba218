// core/src/elevation.rs
use crate::models::Point;
use crate::types::{ElevationAction, ElevationQualityReport, ElevationSource, QualityStats};

pub const BIG_JUMP_M: f64 = 20.0;         // |Δelevation| counted as a jump
pub const MIN_SAMPLES: usize = 10;        // below this the data is not scored
pub const FLAT_RUN_LIMIT: usize = 10;     // longer identical runs are penalized
pub const SMOOTH_WINDOW: usize = 5;
pub const FALLBACK_WINDOW: usize = 7;

/// Scores how trustworthy the elevation channel of `points` is.
pub fn assess(points: &[Point]) -> ElevationQualityReport {
    let elevations: Vec<f64> = points.iter().filter_map(|p| p.elevation).collect();

    if elevations.is_empty() {
        return ElevationQualityReport {
            score: 0.0,
            source: ElevationSource::Missing,
            issues: vec!["no_elevation_data".to_string()],
            recommended_action: ElevationAction::Interpolate,
            stats: QualityStats::default(),
            processing_applied: None,
        };
    }

    let n = elevations.len();
    if n < MIN_SAMPLES {
        return ElevationQualityReport {
            score: 20.0,
            source: ElevationSource::Unknown,
            issues: vec!["too_few_points".to_string()],
            recommended_action: ElevationAction::Interpolate,
            stats: QualityStats { point_count: n, ..Default::default() },
            processing_applied: None,
        };
    }

    let mut issues = Vec::new();

    // 1) big jumps between consecutive samples
    let mut big_jumps = 0usize;
    let mut max_jump = 0.0f64;
    // 2) identical consecutive values + 3) longest identical run
    let mut identical = 0usize;
    let mut max_run = 0usize;
    let mut run = 1usize;

    for w in elevations.windows(2) {
        let jump = (w[1] - w[0]).abs();
        if jump > BIG_JUMP_M {
            big_jumps += 1;
            max_jump = max_jump.max(jump);
        }
        if w[1] == w[0] {
            identical += 1;
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 1;
        }
    }

    // Ratios are over the sample count, not the pair count.
    let jump_ratio = big_jumps as f64 / n as f64;
    let identical_ratio = identical as f64 / n as f64;

    if jump_ratio > 0.05 {
        issues.push(format!("frequent_jumps ({big_jumps} jumps, max {max_jump:.1}m)"));
    }
    if identical_ratio > 0.3 {
        issues.push(format!("low_resolution ({:.1}% identical values)", identical_ratio * 100.0));
    }
    if max_run > FLAT_RUN_LIMIT {
        issues.push(format!("flat_sections ({max_run} consecutive identical values)"));
    }

    let mut score = 100.0;
    score -= (jump_ratio * 100.0).min(40.0);
    score -= (identical_ratio * 50.0).min(30.0);
    if max_run > FLAT_RUN_LIMIT {
        score -= ((max_run - FLAT_RUN_LIMIT) as f64 * 2.0).min(20.0);
    }
    let score = f64::max(score, 0.0);

    let source = if score < 40.0 {
        ElevationSource::Unknown
    } else if jump_ratio < 0.02 && identical_ratio < 0.1 {
        ElevationSource::Barometric
    } else if jump_ratio < 0.1 {
        ElevationSource::Gps
    } else {
        ElevationSource::Unknown
    };

    let recommended_action = if score >= 80.0 {
        ElevationAction::Use
    } else if score >= 50.0 {
        ElevationAction::Smooth
    } else {
        ElevationAction::Interpolate
    };

    let min = elevations.iter().copied().fold(f64::INFINITY, f64::min);
    let max = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ElevationQualityReport {
        score,
        source,
        issues,
        recommended_action,
        stats: QualityStats {
            point_count: n,
            min: Some(min),
            max: Some(max),
            range: Some(max - min),
            big_jump_count: big_jumps,
            max_jump,
            jump_ratio,
            identical_ratio,
            max_identical_run: max_run,
        },
        processing_applied: None,
    }
}

/// Centered moving average. The window is forced odd and truncated at the
/// boundaries (no wrap-around).
pub fn smooth_series(values: &[f64], window: usize) -> Vec<f64> {
    let w = if window % 2 == 0 { window + 1 } else { window };
    let k = w / 2;
    let n = values.len();
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let a = i.saturating_sub(k);
        let b = (i + k + 1).min(n);
        let slice = &values[a..b];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }

    out
}

/// Smoothed elevations of `points`. Missing elevations count as 0.0 in the
/// average.
pub fn smooth(points: &[Point], window: usize) -> Vec<f64> {
    let raw: Vec<f64> = points.iter().map(|p| p.elevation.unwrap_or(0.0)).collect();
    smooth_series(&raw, window)
}

fn with_elevations(points: &[Point], elevations: &[f64]) -> Vec<Point> {
    points
        .iter()
        .zip(elevations)
        .map(|(p, &e)| Point { elevation: Some(e), ..*p })
        .collect()
}

/// Assess, then use / smooth (5) / fall back to smooth (7). `force`
/// overrides the recommended action. The applied action is recorded in the
/// returned report.
pub fn process_elevation_data(
    points: &[Point],
    force: Option<ElevationAction>,
) -> (Vec<Point>, ElevationQualityReport) {
    let mut report = assess(points);
    let action = force.unwrap_or(report.recommended_action);

    let processed = match action {
        ElevationAction::Use => points.to_vec(),
        ElevationAction::Smooth => with_elevations(points, &smooth(points, SMOOTH_WINDOW)),
        // No better elevation source at this layer.
        ElevationAction::Interpolate => with_elevations(points, &smooth(points, FALLBACK_WINDOW)),
    };

    log::debug!(
        "elevation quality {:.1}/100 ({:?}), action {:?}",
        report.score,
        report.source,
        action
    );

    report.processing_applied = Some(action);
    (processed, report)
}

/// Rebuilds elevations by integrating `distance_i * slope_i` from
/// `base_elevation`. Output is as long as the shortest input.
pub fn interpolate_linear(points: &[Point], base_elevation: f64, distances: &[f64], slopes: &[f64]) -> Vec<Point> {
    let mut current = base_elevation;
    points
        .iter()
        .zip(distances.iter().zip(slopes))
        .map(|(p, (d, s))| {
            current += d * s;
            Point { elevation: Some(current), ..*p }
        })
        .collect()
}

/// Track-level D+/D-: a 0.3/0.4/0.3 three-point filter (endpoints kept raw)
/// followed by a sum of positive/negative deltas.
pub fn uphill_downhill(elevations: &[f64]) -> (f64, f64) {
    let n = elevations.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let filtered: Vec<f64> = (0..n)
        .map(|i| {
            if i > 0 && i + 1 < n {
                0.3 * elevations[i - 1] + 0.4 * elevations[i] + 0.3 * elevations[i + 1]
            } else {
                elevations[i]
            }
        })
        .collect();

    let mut up = 0.0;
    let mut down = 0.0;
    for w in filtered.windows(2) {
        let d = w[1] - w[0];
        if d > 0.0 {
            up += d;
        } else {
            down -= d;
        }
    }
    (up, down)
}

/// Lowest index in `[idx - search, idx]` by elevation; ties keep `idx`.
pub fn find_local_minimum(elevations: &[f64], idx: usize, search: usize) -> usize {
    let mut best = idx;
    let mut best_elev = elevations[idx];
    for (i, &e) in elevations.iter().enumerate().take(idx).skip(idx.saturating_sub(search)) {
        if e < best_elev {
            best_elev = e;
            best = i;
        }
    }
    best
}

/// Highest index in `[idx, idx + search)` by elevation; ties keep the
/// earliest.
pub fn find_local_maximum(elevations: &[f64], idx: usize, search: usize) -> usize {
    let mut best = idx;
    let mut best_elev = elevations[idx];
    let end = (idx + search).min(elevations.len());
    for (i, &e) in elevations.iter().enumerate().take(end).skip(idx) {
        if e > best_elev {
            best_elev = e;
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElevationStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

/// Min/max/avg over the points that carry an elevation.
pub fn elevation_stats(points: &[Point]) -> ElevationStats {
    let elevations: Vec<f64> = points.iter().filter_map(|p| p.elevation).collect();
    if elevations.is_empty() {
        return ElevationStats::default();
    }
    ElevationStats {
        min: elevations.iter().copied().reduce(f64::min),
        max: elevations.iter().copied().reduce(f64::max),
        avg: Some(elevations.iter().sum::<f64>() / elevations.len() as f64),
    }
}
