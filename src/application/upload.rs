//! Upload pipeline: artifact transmission with bounded retries

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::analysis::{UploadJob, UploadStatus};
use crate::domain::recording::{Duration, RecordingArtifact};

use super::ports::InterviewBackend;

/// Upload failures, as seen by the orchestrator
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Upload failed after {attempts} attempts: {message}")]
    Transient { attempts: u32, message: String },

    #[error("Upload rejected: {0}")]
    Permanent(String),

    #[error("No recording to upload")]
    MissingArtifact,
}

impl UploadError {
    /// The job kept its artifact and can be uploaded again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Retry budget for transient upload failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::default_upload_backoff(),
        }
    }
}

impl RetryPolicy {
    /// Linear backoff: attempt x step
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.times(attempt)
    }
}

/// Sends finished artifacts to the backend
pub struct UploadPipeline<B: InterviewBackend> {
    backend: Arc<B>,
    policy: RetryPolicy,
}

impl<B: InterviewBackend> UploadPipeline<B> {
    pub fn new(backend: Arc<B>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Wrap an artifact in a pending job that owns it
    pub fn submit(&self, artifact: RecordingArtifact, interview_id: &str) -> UploadJob {
        UploadJob::new(interview_id, artifact)
    }

    /// Transmit the job's artifact and telemetry.
    ///
    /// On success the job moves to Processing, the artifact is dropped and
    /// the response id is returned. Transient failures are retried; if all
    /// tries fail the job keeps its artifact for a later retry. Permanent
    /// failures drop the artifact.
    pub async fn upload(&self, job: &mut UploadJob) -> Result<String, UploadError> {
        let artifact = job.take_artifact().ok_or(UploadError::MissingArtifact)?;
        job.status = UploadStatus::Uploading;

        let max = self.policy.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max {
            job.upload_attempts += 1;
            match self
                .backend
                .upload_video_response(&job.interview_id, &artifact)
                .await
            {
                Ok(receipt) => {
                    info!(
                        question = job.question_order,
                        response_id = %receipt.response_id,
                        size = %artifact.clip.human_readable_size(),
                        attempt,
                        "answer uploaded"
                    );
                    job.status = UploadStatus::Processing;
                    job.response_id = Some(receipt.response_id.clone());
                    job.video_url = receipt.video_url;
                    return Ok(receipt.response_id);
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        question = job.question_order,
                        attempt,
                        max,
                        error = %e,
                        "upload attempt failed"
                    );
                    last_error = e.to_string();
                    if attempt < max {
                        tokio::time::sleep(self.policy.delay_after(attempt).as_std()).await;
                    }
                }
                Err(e) => {
                    warn!(question = job.question_order, error = %e, "upload rejected");
                    job.status = UploadStatus::Failed;
                    return Err(UploadError::Permanent(e.to_string()));
                }
            }
        }

        job.status = UploadStatus::Failed;
        job.restore_artifact(artifact);
        Err(UploadError::Transient {
            attempts: max,
            message: last_error,
        })
    }
}
