//! Application layer - Use cases and port interfaces
//!
//! Contains the interview pipeline components and trait definitions
//! for external system interactions.

pub mod media;
pub mod orchestrator;
pub mod poller;
pub mod ports;
pub mod recording;
pub mod upload;

// Re-export use cases
pub use media::{DeviceHandle, MediaResourceManager};
pub use orchestrator::{
    Advance, EventCallback, InterviewError, InterviewEvent, InterviewOrchestrator,
    InterviewSnapshot, OrchestratorConfig,
};
pub use poller::{PollOutcome, PollPolicy, ProcessingPoller};
pub use recording::{RecordingSession, RecordingSessionError};
pub use upload::{RetryPolicy, UploadError, UploadPipeline};
