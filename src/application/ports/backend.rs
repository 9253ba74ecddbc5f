//! Interview backend port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::analysis::AnalysisResult;
use crate::domain::recording::RecordingArtifact;

/// Backend errors
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to parse backend response: {0}")]
    ParseError(String),
}

impl BackendError {
    /// Network failures and 5xx responses may succeed on a later try
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Server { .. })
    }
}

/// Request to create an interview record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInterview {
    pub job_id: String,
    pub candidature_id: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
}

/// A question as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSpec {
    pub id: String,
    pub text: String,
    pub order: u32,
}

/// Interview record created by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInterview {
    pub id: String,
    pub questions: Vec<QuestionSpec>,
}

/// Tracking handle for an uploaded answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub response_id: String,
    pub video_url: Option<String>,
}

/// Backend-side analysis state of one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Structured AI feedback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPayload {
    pub score: Option<f64>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub adequacy: Option<String>,
    pub recommendation: Option<String>,
}

/// One processing status answer
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReport {
    pub state: ProcessingState,
    pub transcription: Option<String>,
    pub analysis_score: Option<f64>,
    pub analysis: Option<AnalysisPayload>,
    pub error_message: Option<String>,
}

impl ProcessingReport {
    pub fn with_state(state: ProcessingState) -> Self {
        Self {
            state,
            transcription: None,
            analysis_score: None,
            analysis: None,
            error_message: None,
        }
    }

    /// Flatten a completed report into an analysis result
    pub fn into_analysis(self) -> AnalysisResult {
        let payload = self.analysis.unwrap_or_default();
        let score = self.analysis_score.or(payload.score).unwrap_or(0.0);
        let recommendation = payload
            .recommendation
            .or(payload.adequacy)
            .unwrap_or_else(|| "unrated".to_string());

        AnalysisResult {
            transcription: self.transcription.unwrap_or_default(),
            score,
            recommendation,
            strengths: payload.strengths,
            improvements: payload.improvements,
            pending: false,
        }
    }
}

/// Port for the interview backend
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    /// Check whether the backend answers at all
    async fn health(&self) -> bool;

    /// Create the interview record and fetch its questions
    async fn create_interview(&self, request: &NewInterview) -> Result<CreatedInterview, BackendError>;

    /// Upload one recorded answer with its telemetry
    async fn upload_video_response(
        &self,
        interview_id: &str,
        artifact: &RecordingArtifact,
    ) -> Result<UploadReceipt, BackendError>;

    /// Query the analysis status of an uploaded answer
    async fn processing_status(
        &self,
        interview_id: &str,
        response_id: &str,
    ) -> Result<ProcessingReport, BackendError>;

    /// Mark the interview complete.
    ///
    /// # Returns
    /// The backend's success flag
    async fn finish_interview(&self, interview_id: &str) -> Result<bool, BackendError>;
}
