//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod backend;
pub mod config;
pub mod media;
pub mod notifier;
pub mod requirements;
pub mod telemetry;

// Re-export common types
pub use backend::{
    AnalysisPayload, BackendError, CreatedInterview, InterviewBackend, NewInterview,
    ProcessingReport, ProcessingState, QuestionSpec, UploadReceipt,
};
pub use config::ConfigStore;
pub use media::{
    MediaConstraints, MediaDevice, MediaError, MediaRecorder, MediaStream, RecordingError,
    TrackKind, TrackSource,
};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use requirements::{Requirement, RequirementsReport, RequirementsValidator, ValidationFailure};
pub use telemetry::TelemetrySource;
