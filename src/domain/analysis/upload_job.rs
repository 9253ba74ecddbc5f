//! Upload job entity

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::recording::RecordingArtifact;

/// Upload and processing lifecycle of one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UploadStatus {
    #[default]
    Pending,
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl UploadStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one answer from submission until analysis resolves.
///
/// Owns the artifact until the upload succeeds or fails permanently.
#[derive(Debug)]
pub struct UploadJob {
    pub interview_id: String,
    pub question_order: u32,
    pub status: UploadStatus,
    pub response_id: Option<String>,
    pub video_url: Option<String>,
    /// Transmission tries made by the upload pipeline
    pub upload_attempts: u32,
    /// Status queries made by the poller
    pub attempts: u32,
    pub last_polled_at: Option<DateTime<Utc>>,
    artifact: Option<RecordingArtifact>,
}

impl UploadJob {
    pub fn new(interview_id: impl Into<String>, artifact: RecordingArtifact) -> Self {
        Self {
            interview_id: interview_id.into(),
            question_order: artifact.question_order,
            status: UploadStatus::Pending,
            response_id: None,
            video_url: None,
            upload_attempts: 0,
            attempts: 0,
            last_polled_at: None,
            artifact: Some(artifact),
        }
    }

    pub fn artifact(&self) -> Option<&RecordingArtifact> {
        self.artifact.as_ref()
    }

    pub fn has_artifact(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn take_artifact(&mut self) -> Option<RecordingArtifact> {
        self.artifact.take()
    }

    pub fn restore_artifact(&mut self, artifact: RecordingArtifact) {
        self.artifact = Some(artifact);
    }

    /// Count one status query
    pub fn record_poll(&mut self) {
        self.attempts += 1;
        self.last_polled_at = Some(Utc::now());
    }
}
