// core/src/error.rs
use thiserror::Error;

/// Coarse classification a caller uses to decide between "reject this
/// request" and "this is a bug".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    MissingTimestamps,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("at least 2 aid stations are required (got {0})")]
    InsufficientAidStations(usize),

    #[error("no track points provided")]
    EmptyTrack,

    #[error("no valid GPS segments found in the provided files")]
    NoSegments,

    #[error("no points found between {from} and {to}")]
    NoPointsInRange { from: String, to: String },

    #[error("time format must be HH:MM:SS or MM:SS (got {0:?})")]
    MalformedDuration(String),

    #[error("official time ({official_s:.0}s) must be greater than the recorded time ({recorded_s:.0}s)")]
    DurationTooShort { official_s: f64, recorded_s: f64 },

    #[error("the partial recording must carry timestamps on its first and last points")]
    MissingTimestamps,

    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackError::MissingTimestamps => ErrorKind::MissingTimestamps,
            TrackError::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }

    /// True for every error a caller should surface as a rejected request,
    /// `MissingTimestamps` included.
    pub fn is_validation(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }

    pub(crate) fn no_points_between(from: impl Into<String>, to: impl Into<String>) -> Self {
        TrackError::NoPointsInRange { from: from.into(), to: to.into() }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
