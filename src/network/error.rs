use crate::network::connection::TrackKey;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("Station not found: {0}")]
    UnknownStation(String),

    #[error("Track is not closed: {0}")]
    TrackNotClosed(TrackKey),

    #[error("Original time not found for closed track: {0}")]
    MissingOriginalTime(TrackKey),

    #[error("Track not found: {0}")]
    UnknownTrack(TrackKey),

    #[error("Invalid travel time {time} for track {key}")]
    InvalidTime { key: TrackKey, time: f64 },

    #[error("Invalid interchange penalty: {0}")]
    InvalidPenalty(f64),
}
