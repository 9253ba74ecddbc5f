//! Recorded media value objects

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Duration;

/// Supported video container MIME types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaMimeType {
    #[default]
    Webm,
    Matroska,
    Mp4,
}

impl MediaMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Webm => "video/webm",
            Self::Matroska => "video/x-matroska",
            Self::Mp4 => "video/mp4",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Matroska => "mkv",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MediaMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw bytes of a finished recording and their container type
#[derive(Debug, Clone)]
pub struct MediaClip {
    data: Vec<u8>,
    mime_type: MediaMimeType,
}

impl MediaClip {
    pub fn new(data: Vec<u8>, mime_type: MediaMimeType) -> Self {
        Self { data, mime_type }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn mime_type(&self) -> MediaMimeType {
        self.mime_type
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

/// A timestamped behavioral data point captured while recording.
/// The payload is opaque and forwarded to the backend untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    pub offset_ms: u64,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl TelemetrySample {
    pub fn new(offset_ms: u64, data: Map<String, Value>) -> Self {
        Self { offset_ms, data }
    }
}

/// The finished clip for one question, ready for upload
#[derive(Debug, Clone)]
pub struct RecordingArtifact {
    pub question_order: u32,
    pub clip: MediaClip,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub telemetry: Vec<TelemetrySample>,
}

impl RecordingArtifact {
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Upload file name, e.g. `interview_42_q3.webm`
    pub fn file_name(&self, interview_id: &str) -> String {
        format!(
            "interview_{}_q{}.{}",
            interview_id,
            self.question_order,
            self.clip.mime_type().extension()
        )
    }
}
