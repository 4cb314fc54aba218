// core/src/lib.rs
pub mod aid_stations;
pub mod api;
pub mod climbs;
pub mod config;
pub mod elevation;
pub mod error;
pub mod geo;
pub mod merge;
pub mod metrics;
pub mod models;
pub mod pacing;
pub mod recovery;
pub mod track;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use aid_stations::aid_station_table;
pub use climbs::{detect_climbs, ClimbParams};
pub use config::{load_settings, save_settings, AnalysisSettings};
pub use elevation::{assess, process_elevation_data};
pub use error::{ErrorKind, Result, TrackError};
pub use merge::{merge_tracks, MergeInput, MergeOptions, MergedTrack};
pub use metrics::Metrics;
pub use models::{AidStation, Point, Track, TrackPoint};
pub use pacing::{NaismithRule, PacingOptions};
pub use recovery::{parse_duration, recover_race, RecoveredElevation, RecoveredTrack, RecoveryParams, RecoveryRequest};
pub use types::{
    AidStationSegment, AidStationTable, ClimbSegment, ElevationAction, ElevationQualityReport, ElevationSource,
    TrackStatistics,
};
