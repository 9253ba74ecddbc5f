//! Telemetry source for hosts without an expression analyzer

use crate::application::ports::TelemetrySource;
use crate::domain::recording::TelemetrySample;

/// Collects nothing; uploads carry an empty sample list
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTelemetry;

impl TelemetrySource for NoOpTelemetry {
    fn begin(&self) {}

    fn collect(&self) -> Vec<TelemetrySample> {
        Vec::new()
    }
}
