//! Telemetry infrastructure module

mod noop;

pub use noop::NoOpTelemetry;
