// core/src/aid_stations.rs
use crate::error::{Result, TrackError};
use crate::models::{AidStation, Track};
use crate::pacing::{estimate_segment_minutes, PacingOptions};
use crate::types::{AidStationSegment, AidStationTable};

/// Per-leg statistics and time estimates between consecutive aid stations.
/// Stations are sorted by distance first; gain/loss use the raw elevations.
pub fn aid_station_table(track: &Track, stations: &[AidStation], pacing: &PacingOptions) -> Result<AidStationTable> {
    if stations.len() < 2 {
        return Err(TrackError::InsufficientAidStations(stations.len()));
    }
    if track.is_empty() {
        return Err(TrackError::EmptyTrack);
    }

    let mut sorted: Vec<&AidStation> = stations.iter().collect();
    sorted.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    let mut table = AidStationTable { total_estimated_minutes: Some(0.0), ..Default::default() };

    for pair in sorted.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let pts = track.points_between(from.distance_km * 1000.0, to.distance_km * 1000.0);
        let (Some(first), Some(last)) = (pts.first(), pts.last()) else {
            return Err(TrackError::no_points_between(from.name.as_str(), to.name.as_str()));
        };

        let distance_km = to.distance_km - from.distance_km;
        let (mut gain, mut loss) = (0.0, 0.0);
        for w in pts.windows(2) {
            let d = w[1].elevation - w[0].elevation;
            if d > 0.0 {
                gain += d;
            } else {
                loss -= d;
            }
        }
        let avg_gradient_pct = if distance_km > 0.0 {
            (last.elevation - first.elevation) / (distance_km * 1000.0) * 100.0
        } else {
            0.0
        };
        let estimated_minutes = estimate_segment_minutes(distance_km, gain, loss, avg_gradient_pct, pacing);

        table.total_distance_km += distance_km;
        table.total_elevation_gain += gain;
        table.total_elevation_loss += loss;
        table.total_estimated_minutes = table.total_estimated_minutes.zip(estimated_minutes).map(|(a, b)| a + b);

        table.segments.push(AidStationSegment {
            from: from.name.clone(),
            to: to.name.clone(),
            start_km: from.distance_km,
            end_km: to.distance_km,
            distance_km,
            elevation_gain: gain,
            elevation_loss: loss,
            avg_gradient_pct,
            estimated_minutes,
        });
    }

    log::info!(
        "aid station table: {} segment(s), {:.2} km, D+ {:.0} m",
        table.segments.len(),
        table.total_distance_km,
        table.total_elevation_gain
    );
    Ok(table)
}
