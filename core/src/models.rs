use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded GPS sample. Elevation and time are optional in the source
/// files, every consumer states its own fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lon: f64,
    #[serde(default, alias = "ele", skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, elevation: None, time: None }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }
}

/// A point placed on a track. Missing elevation has already been
/// normalized to 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// Cumulative horizontal distance from the first point (m).
    pub distance: f64,
}

impl TrackPoint {
    pub fn to_point(&self) -> Point {
        Point { lat: self.lat, lon: self.lon, elevation: Some(self.elevation), time: self.time }
    }
}

/// Ordered track points with non-decreasing cumulative distance starting at
/// 0. Only `track::build*` constructs one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    pub(crate) fn from_points(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total distance in meters (0 for an empty track).
    pub fn total_distance(&self) -> f64 {
        self.points.last().map(|p| p.distance).unwrap_or(0.0)
    }

    pub fn elevations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.elevation).collect()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.distance).collect()
    }

    /// Contiguous run of points with `start_m <= distance <= end_m`.
    pub fn points_between(&self, start_m: f64, end_m: f64) -> &[TrackPoint] {
        let lo = self.points.partition_point(|p| p.distance < start_m);
        let hi = self.points.partition_point(|p| p.distance <= end_m);
        if lo >= hi {
            &[]
        } else {
            &self.points[lo..hi]
        }
    }
}

/// Supply point ("ravito") at a known distance along the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidStation {
    pub name: String,
    pub distance_km: f64,
}

impl AidStation {
    pub fn new(name: impl Into<String>, distance_km: f64) -> Self {
        Self { name: name.into(), distance_km }
    }
}
