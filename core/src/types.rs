use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationSource {
    Barometric,
    Gps,
    Unknown,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationAction {
    Use,
    Smooth,
    Interpolate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityStats {
    pub point_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub range: Option<f64>,
    pub big_jump_count: usize,
    pub max_jump: f64,
    pub jump_ratio: f64,
    pub identical_ratio: f64,
    pub max_identical_run: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElevationQualityReport {
    /// 0–100
    pub score: f64,
    pub source: ElevationSource,
    pub issues: Vec<String>,
    pub recommended_action: ElevationAction,
    pub stats: QualityStats,
    /// Set by `elevation::process_elevation_data`.
    pub processing_applied: Option<ElevationAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbSegment {
    pub start_km: f64,
    pub end_km: f64,
    pub distance_km: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub avg_gradient_pct: f64,
    /// Track indices (inclusive) the climb spans.
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AidStationSegment {
    pub from: String,
    pub to: String,
    pub start_km: f64,
    pub end_km: f64,
    pub distance_km: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub avg_gradient_pct: f64,
    pub estimated_minutes: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AidStationTable {
    pub segments: Vec<AidStationSegment>,
    pub total_distance_km: f64,
    pub total_elevation_gain: f64,
    pub total_elevation_loss: f64,
    /// None unless every segment produced an estimate.
    pub total_estimated_minutes: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackStatistics {
    pub total_distance_m: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub min_elevation: Option<f64>,
    pub max_elevation: Option<f64>,
    pub avg_elevation: Option<f64>,
    pub duration_s: Option<f64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentAnalysis {
    pub start_km: f64,
    pub end_km: f64,
    pub distance_m: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub point_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileSample {
    pub distance_km: f64,
    pub elevation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientSample {
    pub distance_km: f64,
    pub gradient_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedSample {
    pub distance_km: f64,
    pub speed_kmh: f64,
    pub time: DateTime<Utc>,
}
