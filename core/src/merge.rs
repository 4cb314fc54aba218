// core/src/merge.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::elevation::assess;
use crate::error::{Result, TrackError};
use crate::models::{Point, Track};
use crate::track::build_segments;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// A time jump above this (s) between two inputs is a gap.
    pub gap_threshold_s: f64,
    /// Keep gaps inside the same sub-segment instead of breaking it.
    pub interpolate_gaps: bool,
    pub sort_by_time: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { gap_threshold_s: 300.0, interpolate_gaps: false, sort_by_time: true }
    }
}

/// One recording file: a name plus its point segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeInput {
    pub name: String,
    pub segments: Vec<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedTrack {
    /// Contiguous sub-segments; a new one starts at each unbridged gap.
    pub segments: Vec<Vec<Point>>,
    /// All points placed on one track, no distance across sub-segment breaks.
    pub track: Track,
    pub warnings: Vec<String>,
}

impl MergedTrack {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

struct Tagged<'a> {
    file: &'a str,
    points: &'a [Point],
    start_time: Option<DateTime<Utc>>,
}

/// Concatenates the segments of several recordings into one track,
/// chronologically when asked. Never drops a point; gaps and overlaps are
/// reported as warnings.
pub fn merge_tracks(files: &[MergeInput], opts: &MergeOptions) -> Result<MergedTrack> {
    let mut warnings = Vec::new();
    let mut tagged = Vec::new();

    for f in files {
        for seg in f.segments.iter().filter(|s| !s.is_empty()) {
            let report = assess(seg);
            log::info!(
                "merge - {}: elevation quality {:.1}/100 ({:?}), recommended {:?}",
                f.name,
                report.score,
                report.source,
                report.recommended_action
            );
            tagged.push(Tagged {
                file: &f.name,
                points: seg,
                start_time: seg.iter().find_map(|p| p.time),
            });
        }
    }

    if tagged.is_empty() {
        return Err(TrackError::NoSegments);
    }

    if opts.sort_by_time {
        let timed = tagged.iter().filter(|t| t.start_time.is_some()).count();
        if timed == 0 {
            warnings.push("No segments have timestamps. Using original order.".to_string());
        } else {
            if timed < tagged.len() {
                warnings.push(format!(
                    "Only {timed}/{} segments have timestamps. Segments without time will be placed at the end.",
                    tagged.len()
                ));
            }
            tagged.sort_by_key(|t| (t.start_time.is_none(), t.start_time));
        }
    }

    let mut out: Vec<Vec<Point>> = vec![Vec::new()];
    let mut last_point: Option<Point> = None;
    let mut last_time: Option<DateTime<Utc>> = None;

    for t in &tagged {
        if let (Some(lp), Some(lt), Some(first)) = (last_point, last_time, t.points.first()) {
            if let Some(ft) = first.time {
                let gap_s = (ft - lt).num_milliseconds() as f64 / 1000.0;
                if gap_s < 0.0 {
                    let msg = format!(
                        "Overlap detected: {} starts {:.0}s before previous segment ended. Keeping chronological order.",
                        t.file,
                        gap_s.abs()
                    );
                    log::warn!("{msg}");
                    warnings.push(msg);
                } else if gap_s > opts.gap_threshold_s {
                    let msg = format!(
                        "Gap detected: {:.1} minutes between segments (from {:.5},{:.5} to {:.5},{:.5})",
                        gap_s / 60.0,
                        lp.lat,
                        lp.lon,
                        first.lat,
                        first.lon
                    );
                    log::warn!("{msg}");
                    warnings.push(msg);
                    if !opts.interpolate_gaps {
                        out.push(Vec::new());
                    }
                }
            }
        }

        if let Some(current) = out.last_mut() {
            current.extend_from_slice(t.points);
        }
        if let Some(lt) = t.points.iter().rev().find_map(|p| p.time) {
            last_time = Some(lt);
        }
        last_point = t.points.last().copied();
    }

    let total: usize = out.iter().map(Vec::len).sum();
    if total == 0 {
        return Err(TrackError::EmptyTrack);
    }

    warnings.insert(
        0,
        format!(
            "Successfully merged {} segment(s) from {} file(s) into {} segment(s) with {} total points",
            tagged.len(),
            files.len(),
            out.len(),
            total
        ),
    );
    log::info!("{}", warnings[0]);

    let track = build_segments(&out);
    Ok(MergedTrack { segments: out, track, warnings })
}
