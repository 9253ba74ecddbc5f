//! Processing status polling with a bounded attempt budget

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::analysis::{AnalysisResult, UploadJob, UploadStatus};
use crate::domain::config::DEFAULT_POLL_MAX_ATTEMPTS;
use crate::domain::recording::Duration;

use super::ports::{InterviewBackend, ProcessingState};

/// Poll budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            interval: Duration::default_poll_interval(),
        }
    }
}

/// How polling ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Backend finished the analysis
    Completed(AnalysisResult),
    /// Budget exhausted; carries the pending placeholder
    Fallback(AnalysisResult),
    /// Backend reported an analysis failure
    Failed(String),
    Cancelled,
}

/// Queries processing status until a terminal answer, failure or budget
/// exhaustion
pub struct ProcessingPoller<B: InterviewBackend> {
    backend: Arc<B>,
    policy: PollPolicy,
}

impl<B: InterviewBackend> ProcessingPoller<B> {
    pub fn new(backend: Arc<B>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Poll the job's response until done.
    ///
    /// Every query, including one that errors, counts as an attempt, and
    /// `job.attempts` never exceeds the budget. Once `cancel` fires, no
    /// further query is issued and the job is left untouched.
    pub async fn poll_until_done(&self, job: &mut UploadJob, cancel: &CancellationToken) -> PollOutcome {
        let Some(response_id) = job.response_id.clone() else {
            return PollOutcome::Failed("upload has no response id".to_string());
        };

        while job.attempts < self.policy.max_attempts {
            if cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }

            let report = tokio::select! {
                biased;
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                report = self.backend.processing_status(&job.interview_id, &response_id) => report,
            };
            job.record_poll();

            match report {
                Ok(report) => match report.state {
                    ProcessingState::Completed => {
                        info!(
                            question = job.question_order,
                            attempts = job.attempts,
                            "analysis completed"
                        );
                        job.status = UploadStatus::Completed;
                        return PollOutcome::Completed(report.into_analysis());
                    }
                    ProcessingState::Failed => {
                        let message = report
                            .error_message
                            .unwrap_or_else(|| "analysis failed".to_string());
                        warn!(question = job.question_order, error = %message, "analysis failed");
                        job.status = UploadStatus::Failed;
                        return PollOutcome::Failed(message);
                    }
                    state => debug!(
                        question = job.question_order,
                        attempt = job.attempts,
                        max = self.policy.max_attempts,
                        ?state,
                        "analysis not ready"
                    ),
                },
                Err(e) => warn!(
                    question = job.question_order,
                    attempt = job.attempts,
                    error = %e,
                    "status query failed"
                ),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = tokio::time::sleep(self.policy.interval.as_std()) => {}
            }
        }

        info!(
            question = job.question_order,
            attempts = job.attempts,
            "poll budget exhausted, using pending placeholder"
        );
        PollOutcome::Fallback(AnalysisResult::pending_fallback())
    }
}
