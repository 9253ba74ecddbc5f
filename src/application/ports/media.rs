//! Media device and recorder port interfaces

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::MediaClip;

/// Kind of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl TrackKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to request when opening the capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for MediaConstraints {
    /// Camera and microphone together at 1280x720
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
            width: 1280,
            height: 720,
        }
    }
}

/// Device acquisition and track errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Permission to use the camera or microphone was denied: {0}")]
    PermissionDenied(String),

    #[error("Camera or microphone unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Media device was already released")]
    AlreadyReleased,

    #[error("No {0} track on the media stream")]
    TrackNotFound(TrackKind),
}

/// One live track of an open stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSource {
    pub kind: TrackKind,
    /// Adapter-specific source locator (device node, audio source name)
    pub source: String,
    pub enabled: bool,
    pub resolution: Option<(u32, u32)>,
}

/// An open camera/microphone stream.
///
/// Exactly one exists per interview; recorders borrow its track list.
pub trait MediaStream: Send + Sync {
    /// Snapshot of the live tracks
    fn tracks(&self) -> Vec<TrackSource>;

    /// Enable or disable a track without stopping it
    fn set_track_enabled(&mut self, kind: TrackKind, enabled: bool) -> Result<(), MediaError>;

    /// Stop every track and release the hardware
    fn stop(&mut self) -> Result<(), MediaError>;

    /// Number of tracks still live
    fn track_count(&self) -> usize;
}

/// Port for opening the capture hardware
#[async_trait]
pub trait MediaDevice: Send + Sync {
    /// Open camera and microphone.
    ///
    /// # Returns
    /// The live stream, or PermissionDenied / DeviceUnavailable
    async fn open(&self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>, MediaError>;
}

/// Recorder errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Failed to read recorded file: {0}")]
    ReadFailed(String),

    #[error("Recording was cancelled")]
    Cancelled,

    #[error("Not recording")]
    NotRecording,
}

/// Port for capturing one answer from the open stream
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    /// Begin capturing the given tracks
    async fn start(&self, tracks: &[TrackSource]) -> Result<(), RecordingError>;

    /// Finalize the capture and return the encoded clip
    async fn stop(&self) -> Result<MediaClip, RecordingError>;

    /// Abort the capture and discard everything
    async fn cancel(&self) -> Result<(), RecordingError>;

    /// Check if currently recording
    fn is_recording(&self) -> bool;
}
