// core/src/api.rs
//
// JSON in, JSON out. Each entry point parses its request with path-aware
// errors, runs one engine operation and counts the outcome.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_path_to_error as spte;
use thiserror::Error;

use crate::aid_stations::aid_station_table;
use crate::climbs::{detect_climbs, ClimbParams};
use crate::elevation::assess;
use crate::error::{ErrorKind, TrackError};
use crate::merge::{merge_tracks, MergeInput, MergeOptions};
use crate::metrics::Metrics;
use crate::models::{AidStation, Point};
use crate::pacing::{cumulative_minutes, format_duration_minutes, PacingOptions};
use crate::recovery::{parse_duration, recover_race, RecoveryParams, RecoveryRequest};
use crate::track::{self, GRADIENT_WINDOW_M, PROFILE_SAMPLE_RATE};
use crate::types::{
    AidStationTable, ClimbSegment, ElevationQualityReport, GradientSample, ProfileSample, SpeedSample,
    TrackStatistics,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    Validation,
    MissingTimestamps,
    Internal,
    /// The request itself could not be parsed.
    BadRequest,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self { kind: ApiErrorKind::BadRequest, message }
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ApiErrorKind::Internal
    }
}

impl From<TrackError> for ApiError {
    fn from(e: TrackError) -> Self {
        let kind = match e.kind() {
            ErrorKind::Validation => ApiErrorKind::Validation,
            ErrorKind::MissingTimestamps => ApiErrorKind::MissingTimestamps,
            ErrorKind::Internal => ApiErrorKind::Internal,
        };
        Self { kind, message: e.to_string() }
    }
}

fn parse<T: DeserializeOwned>(json_in: &str, what: &str) -> Result<T, ApiError> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    spte::deserialize(&mut de).map_err(|e| ApiError::bad_request(format!("parse error ({what}) at {}: {}", e.path(), e)))
}

/// Parse, run, serialize, count. `op` returns its output plus the number of
/// warnings it attached.
fn run<I, O, F>(operation: &str, json_in: &str, metrics: &Metrics, op: F) -> Result<String, ApiError>
where
    I: DeserializeOwned,
    O: Serialize,
    F: FnOnce(I) -> Result<(O, usize), TrackError>,
{
    let result = parse::<I>(json_in, operation).and_then(|input| {
        let (out, warnings) = op(input)?;
        metrics.record_warnings(operation, warnings);
        serde_json::to_string(&out).map_err(|e| TrackError::Internal(format!("serialize {operation}: {e}")).into())
    });
    metrics.record(operation, result.is_ok());
    if let Err(e) = &result {
        log::debug!("{operation} rejected ({:?}): {}", e.kind, e.message);
    }
    result
}

#[derive(Debug, Deserialize)]
struct AnalyzeTrackIn {
    points: Vec<Point>,
    #[serde(default)]
    profile_sample_rate: Option<usize>,
    #[serde(default)]
    gradient_window_m: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AnalyzeTrackOut {
    statistics: TrackStatistics,
    elevation_quality: ElevationQualityReport,
    elevation_profile: Vec<ProfileSample>,
    gradient_profile: Vec<GradientSample>,
    speed_profile: Vec<SpeedSample>,
}

/// `{points, profile_sample_rate?, gradient_window_m?}` → statistics,
/// elevation quality and the three profiles.
pub fn analyze_track_json(json_in: &str, metrics: &Metrics) -> Result<String, ApiError> {
    run("analyze_track", json_in, metrics, |req: AnalyzeTrackIn| {
        if req.points.is_empty() {
            return Err(TrackError::EmptyTrack);
        }
        let t = track::build(&req.points);
        let quality = assess(&req.points);
        let warnings = quality.issues.len();
        let out = AnalyzeTrackOut {
            statistics: track::statistics(&t),
            elevation_quality: quality,
            elevation_profile: track::elevation_profile(&t, req.profile_sample_rate.unwrap_or(PROFILE_SAMPLE_RATE)),
            gradient_profile: track::gradient_profile(&t, req.gradient_window_m.unwrap_or(GRADIENT_WINDOW_M)),
            speed_profile: track::speed_profile(&t),
        };
        Ok((out, warnings))
    })
}

#[derive(Debug, Deserialize)]
struct DetectClimbsIn {
    points: Vec<Point>,
    #[serde(default)]
    params: ClimbParams,
}

#[derive(Debug, Serialize)]
struct DetectClimbsOut {
    climbs: Vec<ClimbSegment>,
}

pub fn detect_climbs_json(json_in: &str, metrics: &Metrics) -> Result<String, ApiError> {
    run("detect_climbs", json_in, metrics, |req: DetectClimbsIn| {
        let t = track::build(&req.points);
        Ok((DetectClimbsOut { climbs: detect_climbs(&t, &req.params) }, 0))
    })
}

#[derive(Debug, Deserialize)]
struct AidStationTableIn {
    points: Vec<Point>,
    aid_stations: Vec<AidStation>,
    #[serde(default)]
    pacing: PacingOptions,
    /// Race start offset for the cumulative column (min).
    #[serde(default)]
    start_minutes: f64,
}

#[derive(Debug, Serialize)]
struct AidStationTableOut {
    #[serde(flatten)]
    table: AidStationTable,
    cumulative_minutes: Option<Vec<f64>>,
    total_formatted: Option<String>,
}

pub fn aid_station_table_json(json_in: &str, metrics: &Metrics) -> Result<String, ApiError> {
    run("aid_station_table", json_in, metrics, |req: AidStationTableIn| {
        let t = track::build(&req.points);
        let table = aid_station_table(&t, &req.aid_stations, &req.pacing)?;
        let per_segment: Option<Vec<f64>> = table.segments.iter().map(|s| s.estimated_minutes).collect();
        let out = AidStationTableOut {
            cumulative_minutes: per_segment.map(|m| cumulative_minutes(&m, req.start_minutes)),
            total_formatted: table.total_estimated_minutes.map(format_duration_minutes),
            table,
        };
        Ok((out, 0))
    })
}

#[derive(Debug, Deserialize)]
struct MergeTracksIn {
    files: Vec<MergeInput>,
    #[serde(default)]
    options: MergeOptions,
}

pub fn merge_tracks_json(json_in: &str, metrics: &Metrics) -> Result<String, ApiError> {
    run("merge_tracks", json_in, metrics, |req: MergeTracksIn| {
        let merged = merge_tracks(&req.files, &req.options)?;
        // the leading summary line is not a warning
        let warnings = merged.warnings.len().saturating_sub(1);
        Ok((merged, warnings))
    })
}

#[derive(Debug, Deserialize)]
struct RecoverRaceIn {
    partial: Vec<Point>,
    reference: Vec<Point>,
    /// "HH:MM:SS" or "MM:SS".
    official_time: String,
    #[serde(default)]
    approx_distance_km: Option<f64>,
    #[serde(default)]
    params: RecoveryParams,
}

pub fn recover_race_json(json_in: &str, metrics: &Metrics) -> Result<String, ApiError> {
    run("recover_race", json_in, metrics, |req: RecoverRaceIn| {
        let request = RecoveryRequest {
            partial: &req.partial,
            reference: &req.reference,
            official_duration: parse_duration(&req.official_time)?,
            approx_distance_km: req.approx_distance_km,
        };
        Ok((recover_race(&request, &req.params)?, 0))
    })
}
