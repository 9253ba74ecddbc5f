//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like FFmpeg, V4L2 and the interview API.

pub mod backend;
#[cfg(unix)]
pub mod capture;
pub mod config;
pub mod notification;
pub mod telemetry;

// Re-export adapters
pub use backend::{HttpInterviewBackend, HttpRequirementsValidator};
#[cfg(unix)]
pub use capture::{FfmpegRecorder, V4l2Device};
pub use config::XdgConfigStore;
pub use notification::{create_notifier, NoOpNotifier, NotifyRustNotifier};
pub use telemetry::NoOpTelemetry;
