//! Interview Capture - video interview recording and analysis orchestration
//!
//! This crate records time-boxed video answers to interview questions,
//! uploads them to an analysis backend and polls until the AI feedback
//! is ready.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, entities, state machines and errors
//! - **Application**: Pipeline components, the orchestrator and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (FFmpeg, V4L2, HTTP backend, notifications)
//! - **CLI**: Command-line interface, argument parsing and interactive input

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
