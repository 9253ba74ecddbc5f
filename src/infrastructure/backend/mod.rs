//! Backend infrastructure module
//!
//! HTTP adapters for the interview API and the requirement checks.

mod client;
mod http;
mod requirements;

pub use http::HttpInterviewBackend;
pub use requirements::HttpRequirementsValidator;
