//! HTTP adapters against a mock backend

use chrono::Utc;
use serde_json::{json, Map, Value};
use wiremock::matchers::{
    body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use interview_capture::application::ports::{
    BackendError, InterviewBackend, NewInterview, ProcessingState, Requirement,
    RequirementsValidator,
};
use interview_capture::domain::recording::{
    Duration, MediaClip, MediaMimeType, RecordingArtifact, TelemetrySample,
};
use interview_capture::domain::session::UserSession;
use interview_capture::infrastructure::{HttpInterviewBackend, HttpRequirementsValidator};

fn new_interview() -> NewInterview {
    NewInterview {
        job_id: "job-9".into(),
        candidature_id: Some("cand-3".into()),
        user_id: "user-7".into(),
        user_name: "Ana Souza".into(),
        user_email: "ana@example.com".into(),
    }
}

fn artifact() -> RecordingArtifact {
    let mut data = Map::new();
    data.insert("smile".into(), Value::from(0.5));
    RecordingArtifact {
        question_order: 2,
        clip: MediaClip::new(b"webm-bytes".to_vec(), MediaMimeType::Webm),
        started_at: Utc::now(),
        duration: Duration::from_secs(30),
        telemetry: vec![TelemetrySample::new(1200, data)],
    }
}

#[tokio::test]
async fn health_is_false_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interviews"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    assert!(!backend.health().await);
}

#[tokio::test]
async fn health_is_false_when_unreachable() {
    let backend = HttpInterviewBackend::new("http://127.0.0.1:9", None);
    assert!(!backend.health().await);
}

#[tokio::test]
async fn create_sends_candidate_and_parses_questions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interviews"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_partial_json(json!({
            "job_id": "job-9",
            "candidate_name": "Ana Souza",
            "candidate_email": "ana@example.com",
            "user_id": "user-7",
            "candidature_id": "cand-3",
            "status": "in_progress"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "questions": [
                {"id": 7, "question": "Why this farm?", "order": 2},
                {"id": "q-a", "title": "Introduce yourself", "order": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(format!("{}/", server.uri()), Some("tok-123".into()));
    let created = backend.create_interview(&new_interview()).await.unwrap();

    assert_eq!(created.id, "42");
    assert_eq!(created.questions.len(), 2);
    let second = created.questions.iter().find(|q| q.order == 2).unwrap();
    assert_eq!(second.id, "7");
    assert_eq!(second.text, "Why this farm?");
}

#[tokio::test]
async fn create_accepts_wrapped_interview() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "interview": {"id": "iv-5", "questions": []}
        })))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    let created = backend.create_interview(&new_interview()).await.unwrap();
    assert_eq!(created.id, "iv-5");
    assert!(created.questions.is_empty());
}

#[tokio::test]
async fn create_rejection_carries_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interviews"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "job is closed"})),
        )
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    let err = backend.create_interview(&new_interview()).await.unwrap_err();
    match err {
        BackendError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "job is closed");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!BackendError::Rejected {
        status: 422,
        message: String::new()
    }
    .is_retryable());
}

#[tokio::test]
async fn upload_posts_multipart_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interviews/iv-5/responses/upload-video"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_string_contains("name=\"video\""))
        .and(body_string_contains("filename=\"interview_iv-5_q2.webm\""))
        .and(body_string_contains("name=\"questionNumber\""))
        .and(body_string_contains("name=\"faceAnalysisData\""))
        .and(body_string_contains("\"offsetMs\":1200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"responseId": 88, "videoUrl": "https://cdn.example.com/v/88.webm"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), Some("tok-123".into()));
    let receipt = backend
        .upload_video_response("iv-5", &artifact())
        .await
        .unwrap();
    assert_eq!(receipt.response_id, "88");
    assert_eq!(
        receipt.video_url.as_deref(),
        Some("https://cdn.example.com/v/88.webm")
    );
}

#[tokio::test]
async fn upload_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interviews/iv-5/responses/upload-video"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    let err = backend
        .upload_video_response("iv-5", &artifact())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Server { status: 502, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn status_parses_completed_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interviews/iv-5/responses/88/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processingStatus": "completed",
            "transcription": "I managed irrigation for ten years",
            "analysisScore": 7.5,
            "aiAnalysis": {
                "strengths": ["clear examples"],
                "improvements": ["more detail on outcomes"],
                "adequacy": "high",
                "recommendation": "advance"
            }
        })))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    let report = backend.processing_status("iv-5", "88").await.unwrap();
    assert_eq!(report.state, ProcessingState::Completed);

    let analysis = report.into_analysis();
    assert_eq!(analysis.score, 7.5);
    assert_eq!(analysis.recommendation, "advance");
    assert_eq!(analysis.strengths, vec!["clear examples".to_string()]);
    assert_eq!(analysis.transcription, "I managed irrigation for ten years");
    assert!(!analysis.pending);
}

#[tokio::test]
async fn status_reports_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interviews/iv-5/responses/88/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processingStatus": "failed",
            "errorMessage": "audio track empty"
        })))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    let report = backend.processing_status("iv-5", "88").await.unwrap();
    assert_eq!(report.state, ProcessingState::Failed);
    assert_eq!(report.error_message.as_deref(), Some("audio track empty"));
}

#[tokio::test]
async fn status_with_unknown_state_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/interviews/iv-5/responses/88/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"processingStatus": "queued"})),
        )
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    let err = backend.processing_status("iv-5", "88").await.unwrap_err();
    assert!(matches!(err, BackendError::ParseError(_)));
}

#[tokio::test]
async fn finish_returns_backend_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interviews/iv-5/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/interviews/iv-6/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    assert!(backend.finish_interview("iv-5").await.unwrap());
    assert!(!backend.finish_interview("iv-6").await.unwrap());
}

#[tokio::test]
async fn finish_rate_limit_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interviews/iv-5/complete"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let backend = HttpInterviewBackend::new(server.uri(), None);
    let err = backend.finish_interview("iv-5").await.unwrap_err();
    assert!(matches!(err, BackendError::Server { status: 429, .. }));
}

fn onboarded_session() -> UserSession {
    let mut session = UserSession::new("user-7");
    session.name = Some("Ana Souza".into());
    session.role = Some("Agronomist".into());
    session
}

async fn mount_resume(server: &MockServer, status: u16) {
    Mock::given(method("HEAD"))
        .and(path("/api/users/user-7/curriculo"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mount_disc(server: &MockServer, tests: Value) {
    Mock::given(method("GET"))
        .and(path("/api/tests/psychological/user/user-7"))
        .and(query_param("status", "completed"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tests": tests })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn validator_reports_only_missing_items() {
    let server = MockServer::start().await;
    mount_resume(&server, 200).await;
    mount_disc(&server, json!([{"id": 1, "status": "completed"}])).await;

    let validator = HttpRequirementsValidator::new(server.uri(), None);
    let report = validator.validate(&onboarded_session()).await.unwrap();
    assert_eq!(report.missing, vec![Requirement::LinkedIn]);
    assert!(!report.is_valid());
}

#[tokio::test]
async fn validator_passes_complete_profile() {
    let server = MockServer::start().await;
    mount_resume(&server, 200).await;
    mount_disc(&server, json!([{"id": 1}])).await;

    let mut session = onboarded_session();
    session.linkedin = Some("https://linkedin.com/in/ana".into());
    let validator = HttpRequirementsValidator::new(server.uri(), None);
    let report = validator.validate(&session).await.unwrap();
    assert!(report.is_valid());
}

#[tokio::test]
async fn validator_treats_not_found_as_missing() {
    let server = MockServer::start().await;
    mount_resume(&server, 404).await;
    mount_disc(&server, json!([])).await;

    let validator = HttpRequirementsValidator::new(server.uri(), None);
    let report = validator.validate(&UserSession::new("user-7")).await.unwrap();
    assert_eq!(
        report.missing,
        vec![
            Requirement::Resume,
            Requirement::DiscTest,
            Requirement::Onboarding,
            Requirement::LinkedIn
        ]
    );
}

#[tokio::test]
async fn validator_fails_on_server_error() {
    let server = MockServer::start().await;
    mount_resume(&server, 500).await;
    mount_disc(&server, json!([])).await;

    let validator = HttpRequirementsValidator::new(server.uri(), None);
    assert!(validator.validate(&onboarded_session()).await.is_err());
}
