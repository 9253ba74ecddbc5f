//! Analysis domain: results and upload tracking

mod result;
mod upload_job;

pub use result::{AnalysisResult, PENDING_RECOMMENDATION, PENDING_SCORE};
pub use upload_job::{UploadJob, UploadStatus};
