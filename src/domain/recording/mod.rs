//! Recording domain: durations, per-question session states, recorded artifacts

mod artifact;
mod duration;
mod state;

pub use artifact::{MediaClip, MediaMimeType, RecordingArtifact, TelemetrySample};
pub use duration::{
    Duration, DEFAULT_MAX_RECORDING_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_UPLOAD_BACKOFF_MS,
};
pub use state::{RecordingEvent, RecordingState};
