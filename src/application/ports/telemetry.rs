//! Behavioral telemetry port interface

use crate::domain::recording::TelemetrySample;

/// Port for collecting behavioral samples while an answer is recorded
pub trait TelemetrySource: Send + Sync {
    /// Start a fresh collection window
    fn begin(&self);

    /// End the window and return everything collected since `begin`
    fn collect(&self) -> Vec<TelemetrySample>;
}
