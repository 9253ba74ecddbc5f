//! Domain layer - Core business logic
//!
//! Contains value objects, entities, state machines and domain errors.
//! This layer has no dependencies on external systems.

pub mod analysis;
pub mod config;
pub mod error;
pub mod interview;
pub mod recording;
pub mod session;

// Re-export common types
pub use analysis::{AnalysisResult, UploadJob, UploadStatus};
pub use config::AppConfig;
pub use error::*;
pub use interview::{
    Interview, InterviewAction, InterviewStatus, InterviewSummary, Question, QuestionProgress,
};
pub use recording::{
    Duration, MediaClip, MediaMimeType, RecordingArtifact, RecordingEvent, RecordingState,
    TelemetrySample,
};
pub use session::UserSession;
