//! HTTP interview backend adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::client::{id_string, ApiClient};
use crate::application::ports::{
    AnalysisPayload, BackendError, CreatedInterview, InterviewBackend, NewInterview,
    ProcessingReport, ProcessingState, QuestionSpec, UploadReceipt,
};
use crate::domain::recording::RecordingArtifact;

// Request types

#[derive(Debug, Serialize)]
struct CreateInterviewBody<'a> {
    job_id: &'a str,
    candidate_name: &'a str,
    candidate_email: &'a str,
    user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidature_id: Option<&'a str>,
    status: &'static str,
}

// Response types

#[derive(Debug, Deserialize)]
struct CreateInterviewResponse {
    id: Option<Value>,
    #[serde(default)]
    questions: Vec<QuestionWire>,
    interview: Option<Box<CreateInterviewResponse>>,
}

#[derive(Debug, Deserialize)]
struct QuestionWire {
    id: Value,
    #[serde(alias = "question", alias = "text")]
    title: String,
    order: u32,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadData {
    response_id: Value,
    video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    processing_status: String,
    transcription: Option<String>,
    analysis_score: Option<f64>,
    ai_analysis: Option<AiAnalysisWire>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiAnalysisWire {
    score: Option<f64>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    adequacy: Option<Value>,
    recommendation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinishResponse {
    #[serde(default)]
    success: bool,
}

/// Interview backend over HTTP JSON
pub struct HttpInterviewBackend {
    api: ApiClient,
}

impl HttpInterviewBackend {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api: ApiClient::new(base_url, token),
        }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    fn parse_created(response: CreateInterviewResponse) -> Result<CreatedInterview, BackendError> {
        let (id, questions) = match response.interview {
            Some(inner) if response.id.is_none() => (inner.id, inner.questions),
            _ => (response.id, response.questions),
        };
        let id = id
            .as_ref()
            .and_then(id_string)
            .ok_or_else(|| BackendError::ParseError("interview id missing".to_string()))?;

        let questions = questions
            .into_iter()
            .map(|q| QuestionSpec {
                id: id_string(&q.id).unwrap_or_else(|| format!("q{}", q.order)),
                text: q.title,
                order: q.order,
            })
            .collect();

        Ok(CreatedInterview { id, questions })
    }

    fn parse_state(raw: &str) -> Result<ProcessingState, BackendError> {
        match raw {
            "pending" => Ok(ProcessingState::Pending),
            "processing" => Ok(ProcessingState::Processing),
            "completed" => Ok(ProcessingState::Completed),
            "failed" => Ok(ProcessingState::Failed),
            other => Err(BackendError::ParseError(format!(
                "unknown processing status '{}'",
                other
            ))),
        }
    }

    fn parse_report(response: StatusResponse) -> Result<ProcessingReport, BackendError> {
        Ok(ProcessingReport {
            state: Self::parse_state(&response.processing_status)?,
            transcription: response.transcription,
            analysis_score: response.analysis_score,
            analysis: response.ai_analysis.map(|a| AnalysisPayload {
                score: a.score,
                strengths: a.strengths,
                improvements: a.improvements,
                adequacy: a.adequacy.and_then(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                }),
                recommendation: a.recommendation,
            }),
            error_message: response.error_message,
        })
    }

    fn build_form(artifact: &RecordingArtifact, interview_id: &str) -> Result<Form, BackendError> {
        let mime = artifact.clip.mime_type();
        let video = Part::bytes(artifact.clip.data().to_vec())
            .file_name(artifact.file_name(interview_id))
            .mime_str(mime.as_str())
            .map_err(|e| BackendError::ParseError(e.to_string()))?;
        let telemetry = serde_json::to_string(&artifact.telemetry)
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        Ok(Form::new()
            .part("video", video)
            .text("questionNumber", artifact.question_order.to_string())
            .text("faceAnalysisData", telemetry))
    }
}

#[async_trait]
impl InterviewBackend for HttpInterviewBackend {
    async fn health(&self) -> bool {
        match ApiClient::send(self.api.request(Method::GET, "/api/interviews")).await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }

    async fn create_interview(&self, request: &NewInterview) -> Result<CreatedInterview, BackendError> {
        let body = CreateInterviewBody {
            job_id: &request.job_id,
            candidate_name: &request.user_name,
            candidate_email: &request.user_email,
            user_id: &request.user_id,
            candidature_id: request.candidature_id.as_deref(),
            status: "in_progress",
        };
        let response =
            ApiClient::send(self.api.request(Method::POST, "/api/interviews").json(&body)).await?;
        let response = ApiClient::check(response).await?;
        Self::parse_created(ApiClient::json(response).await?)
    }

    async fn upload_video_response(
        &self,
        interview_id: &str,
        artifact: &RecordingArtifact,
    ) -> Result<UploadReceipt, BackendError> {
        let form = Self::build_form(artifact, interview_id)?;
        let path = format!("/api/interviews/{}/responses/upload-video", interview_id);
        let response = ApiClient::send(self.api.request(Method::POST, &path).multipart(form)).await?;
        let response = ApiClient::check(response).await?;
        let body: UploadResponse = ApiClient::json(response).await?;

        let response_id = id_string(&body.data.response_id)
            .ok_or_else(|| BackendError::ParseError("responseId missing".to_string()))?;
        Ok(UploadReceipt {
            response_id,
            video_url: body.data.video_url,
        })
    }

    async fn processing_status(
        &self,
        interview_id: &str,
        response_id: &str,
    ) -> Result<ProcessingReport, BackendError> {
        let path = format!(
            "/api/interviews/{}/responses/{}/status",
            interview_id, response_id
        );
        let response = ApiClient::send(self.api.request(Method::GET, &path)).await?;
        let response = ApiClient::check(response).await?;
        Self::parse_report(ApiClient::json(response).await?)
    }

    async fn finish_interview(&self, interview_id: &str) -> Result<bool, BackendError> {
        let path = format!("/api/interviews/{}/complete", interview_id);
        let response = ApiClient::send(self.api.request(Method::POST, &path)).await?;
        let response = ApiClient::check(response).await?;
        let body: FinishResponse = ApiClient::json(response).await?;
        Ok(body.success)
    }
}
