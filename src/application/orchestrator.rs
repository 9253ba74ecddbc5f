//! Interview orchestration use case

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::analysis::{AnalysisResult, UploadJob};
use crate::domain::error::{InvalidQuestionSet, InvalidStateTransition};
use crate::domain::interview::{
    default_questions, Interview, InterviewAction, InterviewStatus, InterviewSummary, Question,
    QuestionProgress,
};
use crate::domain::recording::{Duration, RecordingState};
use crate::domain::session::UserSession;

use super::media::MediaResourceManager;
use super::poller::{PollOutcome, PollPolicy, ProcessingPoller};
use super::ports::{
    BackendError, InterviewBackend, MediaConstraints, MediaDevice, MediaError, MediaRecorder,
    NewInterview, NotificationIcon, Notifier, Requirement, RequirementsValidator,
    TelemetrySource, TrackKind, ValidationFailure,
};
use super::recording::{RecordingSession, RecordingSessionError};
use super::upload::{RetryPolicy, UploadError, UploadPipeline};

/// Errors from the interview orchestrator
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("Camera or microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Camera or microphone unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Media error: {0}")]
    Media(MediaError),

    #[error("Interview backend is unavailable")]
    BackendUnavailable,

    #[error("Interview requirements not met: {}", describe(.missing))]
    ValidationError { missing: Vec<Requirement> },

    #[error(transparent)]
    ValidationFailure(#[from] ValidationFailure),

    #[error("Backend request failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Backend did not confirm interview completion")]
    FinishRejected,

    #[error("Invalid question set: {0}")]
    InvalidQuestions(#[from] InvalidQuestionSet),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error(transparent)]
    Recording(#[from] RecordingSessionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("No interview has been created")]
    NoInterview,

    #[error("An interview was already created")]
    AlreadyCreated,

    #[error("At least one question must be answered before finishing")]
    NoAnsweredQuestions,

    #[error("Question {order} is not answered yet")]
    QuestionNotAnswered { order: u32 },

    #[error("Question {order} is already answered")]
    QuestionAlreadyAnswered { order: u32 },

    #[error("A recording is in progress")]
    RecordingInProgress,

    #[error("Answer to question {order} is still being processed")]
    AnswerInFlight { order: u32 },

    #[error("Skipping questions is disabled")]
    SkipDisabled,

    #[error("No failed upload to retry for question {order}")]
    NothingToRetry { order: u32 },
}

fn describe(missing: &[Requirement]) -> String {
    missing
        .iter()
        .map(Requirement::label)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<MediaError> for InterviewError {
    fn from(value: MediaError) -> Self {
        match value {
            MediaError::PermissionDenied(m) => Self::PermissionDenied(m),
            MediaError::DeviceUnavailable(m) => Self::DeviceUnavailable(m),
            other => Self::Media(other),
        }
    }
}

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Recording cutoff per answer
    pub max_duration: Duration,
    pub retry: RetryPolicy,
    pub poll: PollPolicy,
    /// Whether questions may be skipped without an answer
    pub allow_skip: bool,
    /// Whether to show notifications
    pub enable_notify: bool,
    pub constraints: MediaConstraints,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_duration: Duration::default_max_recording(),
            retry: RetryPolicy::default(),
            poll: PollPolicy::default(),
            allow_skip: false,
            enable_notify: false,
            constraints: MediaConstraints::default(),
        }
    }
}

/// Progress reported to the presentation layer
#[derive(Debug, Clone)]
pub enum InterviewEvent {
    RecordingStarted { order: u32, max: Duration },
    RecordingStopped { order: u32, duration: Duration },
    Uploading { order: u32 },
    Processing { order: u32 },
    AnswerReady { order: u32, analysis: AnalysisResult },
    AnswerFailed { order: u32, message: String, retryable: bool },
}

/// Callback for interview progress events
pub type EventCallback = Arc<dyn Fn(InterviewEvent) + Send + Sync>;

/// Result of trying to move to the next question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved; carries the new question's order
    Moved(u32),
    /// Current question unresolved; nothing changed
    NotAnswered,
    /// Already at the last question
    AtEnd,
}

/// Point-in-time view of the interview
#[derive(Debug, Clone)]
pub struct InterviewSnapshot {
    pub interview_id: Option<String>,
    pub status: Option<InterviewStatus>,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub recording: RecordingState,
    pub track_count: usize,
    pub answered: usize,
}

struct PipelineTask {
    order: u32,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PipelineTask {
    fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

struct OrchestratorState<D: MediaDevice> {
    interview: Option<Interview>,
    cursor: usize,
    media: MediaResourceManager<D>,
    pipeline: Option<PipelineTask>,
    failed_uploads: HashMap<u32, UploadJob>,
}

impl<D: MediaDevice> OrchestratorState<D> {
    fn interview(&self) -> Result<&Interview, InterviewError> {
        self.interview.as_ref().ok_or(InterviewError::NoInterview)
    }

    fn interview_mut(&mut self) -> Result<&mut Interview, InterviewError> {
        self.interview.as_mut().ok_or(InterviewError::NoInterview)
    }

    /// The interview, if it accepts question work
    fn active(&self, action: &'static str) -> Result<&Interview, InterviewError> {
        let interview = self.interview()?;
        if interview.status() != InterviewStatus::Active {
            return Err(InvalidStateTransition {
                current_state: interview.status().as_str(),
                action,
            }
            .into());
        }
        Ok(interview)
    }

    fn current(&self) -> Option<&Question> {
        self.interview.as_ref()?.question_at(self.cursor)
    }

    fn running_pipeline(&self) -> Option<u32> {
        self.pipeline
            .as_ref()
            .filter(|p| p.is_running())
            .map(|p| p.order)
    }

    fn cancel_pipeline(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            pipeline.token.cancel();
            debug!(question = pipeline.order, "pipeline cancelled");
        }
    }

    fn question_mut(&mut self, order: u32) -> Option<&mut Question> {
        self.interview.as_mut()?.question_by_order_mut(order)
    }
}

/// Shared pieces a per-question pipeline task needs
struct PipelineContext<D, R, T, B>
where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
{
    state: Arc<Mutex<OrchestratorState<D>>>,
    recording: RecordingSession<R, T>,
    uploader: Arc<UploadPipeline<B>>,
    poller: Arc<ProcessingPoller<B>>,
    on_event: Option<EventCallback>,
}

impl<D, R, T, B> Clone for PipelineContext<D, R, T, B>
where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            recording: self.recording.clone(),
            uploader: Arc::clone(&self.uploader),
            poller: Arc::clone(&self.poller),
            on_event: self.on_event.clone(),
        }
    }
}

impl<D, R, T, B> PipelineContext<D, R, T, B>
where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
{
    fn emit(&self, event: InterviewEvent) {
        if let Some(ref cb) = self.on_event {
            cb(event);
        }
    }

    /// Apply a question update under the lock unless the task was cancelled
    async fn update_question(
        &self,
        order: u32,
        token: &CancellationToken,
        f: impl FnOnce(&mut OrchestratorState<D>, &mut Question),
    ) -> bool {
        let mut state = self.state.lock().await;
        if token.is_cancelled() {
            return false;
        }
        let Some(mut question) = state.question_mut(order).cloned() else {
            return false;
        };
        f(&mut *state, &mut question);
        if let Some(target) = state.question_mut(order) {
            *target = question;
        }
        true
    }

    /// Wait for the take to end, then upload and poll it
    async fn record_then_process(self, interview_id: String, order: u32, token: CancellationToken) {
        let finished = tokio::select! {
            _ = token.cancelled() => return,
            state = self.recording.wait_finished() => state,
        };
        if finished != RecordingState::Stopped {
            debug!(question = order, "take ended without an artifact");
            let message = self
                .recording
                .take_failure()
                .await
                .unwrap_or_else(|| "recording ended without a clip".to_string());
            let mut reset = false;
            self.update_question(order, &token, |_, q| {
                if q.progress == QuestionProgress::Recording {
                    q.progress = QuestionProgress::Unanswered;
                    q.last_error = Some(message.clone());
                    reset = true;
                }
            })
            .await;
            if reset {
                self.emit(InterviewEvent::AnswerFailed {
                    order,
                    message,
                    retryable: false,
                });
            }
            return;
        }
        let Some(artifact) = self.recording.take_artifact().await else {
            return;
        };
        let duration = artifact.duration;
        self.update_question(order, &token, |_, q| q.answer_duration = Some(duration))
            .await;
        self.emit(InterviewEvent::RecordingStopped {
            order,
            duration: artifact.duration,
        });

        let job = self.uploader.submit(artifact, &interview_id);
        self.process(job, token).await;
    }

    /// Upload a job and poll its analysis, then record the outcome
    async fn process(self, mut job: UploadJob, token: CancellationToken) {
        let order = job.question_order;

        if !self
            .update_question(order, &token, |_, q| q.progress = QuestionProgress::Uploading)
            .await
        {
            return;
        }
        self.emit(InterviewEvent::Uploading { order });

        let uploaded = tokio::select! {
            _ = token.cancelled() => return,
            result = self.uploader.upload(&mut job) => result,
        };

        if let Err(e) = uploaded {
            let retryable = e.is_retryable();
            let message = e.to_string();
            let applied = self
                .update_question(order, &token, |state, q| {
                    q.mark_failed(QuestionProgress::UploadFailed { retryable }, message.clone());
                    if retryable {
                        state.failed_uploads.insert(order, job);
                    }
                })
                .await;
            if applied {
                self.emit(InterviewEvent::AnswerFailed {
                    order,
                    message,
                    retryable,
                });
            }
            return;
        }

        if !self
            .update_question(order, &token, |_, q| q.progress = QuestionProgress::Processing)
            .await
        {
            return;
        }
        self.emit(InterviewEvent::Processing { order });

        let event = match self.poller.poll_until_done(&mut job, &token).await {
            PollOutcome::Completed(analysis) | PollOutcome::Fallback(analysis) => {
                let stored = analysis.clone();
                self.update_question(order, &token, move |_, q| q.mark_answered(stored))
                    .await
                    .then_some(InterviewEvent::AnswerReady { order, analysis })
            }
            PollOutcome::Failed(message) => {
                let stored = message.clone();
                self.update_question(order, &token, move |_, q| {
                    q.mark_failed(QuestionProgress::AnalysisFailed, stored)
                })
                .await
                .then_some(InterviewEvent::AnswerFailed {
                    order,
                    message,
                    retryable: false,
                })
            }
            PollOutcome::Cancelled => None,
        };

        if let Some(event) = event {
            self.emit(event);
        }
    }
}

/// Interview orchestrator.
///
/// Lifecycle:
///   SETUP -> ACTIVE (device acquired)
///   ACTIVE -> COMPLETING (finish)
///   COMPLETING -> COMPLETED (backend confirmed)
///   SETUP | ACTIVE | COMPLETING -> ABANDONED (abandon)
///
/// Owns the media device for the interview's lifetime and releases it on
/// finish and abandon.
pub struct InterviewOrchestrator<D, R, T, B, V, N>
where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
    V: RequirementsValidator,
    N: Notifier,
{
    ctx: PipelineContext<D, R, T, B>,
    backend: Arc<B>,
    validator: V,
    notifier: N,
    session: UserSession,
    config: OrchestratorConfig,
}

impl<D, R, T, B, V, N> InterviewOrchestrator<D, R, T, B, V, N>
where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
    V: RequirementsValidator,
    N: Notifier,
{
    /// Create a new orchestrator instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: D,
        recorder: R,
        telemetry: T,
        backend: B,
        validator: V,
        notifier: N,
        session: UserSession,
        config: OrchestratorConfig,
    ) -> Self {
        let backend = Arc::new(backend);
        let state = OrchestratorState {
            interview: None,
            cursor: 0,
            media: MediaResourceManager::new(device),
            pipeline: None,
            failed_uploads: HashMap::new(),
        };
        Self {
            ctx: PipelineContext {
                state: Arc::new(Mutex::new(state)),
                recording: RecordingSession::new(recorder, telemetry, config.max_duration),
                uploader: Arc::new(UploadPipeline::new(Arc::clone(&backend), config.retry)),
                poller: Arc::new(ProcessingPoller::new(Arc::clone(&backend), config.poll)),
                on_event: None,
            },
            backend,
            validator,
            notifier,
            session,
            config,
        }
    }

    /// Register a progress callback
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.ctx.on_event = Some(callback);
        self
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub async fn status(&self) -> Option<InterviewStatus> {
        self.ctx.state.lock().await.interview.as_ref().map(Interview::status)
    }

    /// Check prerequisites, create the backend record, acquire the device.
    ///
    /// If the device cannot be opened, the interview exists but stays in
    /// Setup and the device error is returned; see [`Self::retry_device`].
    pub async fn create_interview(
        &self,
        job_id: &str,
        candidature_id: Option<&str>,
    ) -> Result<InterviewSnapshot, InterviewError> {
        let mut state = self.ctx.state.lock().await;
        if state.interview.is_some() {
            return Err(InterviewError::AlreadyCreated);
        }

        if !self.backend.health().await {
            warn!("backend health check failed");
            return Err(InterviewError::BackendUnavailable);
        }

        let report = self.validator.validate(&self.session).await?;
        if !report.is_valid() {
            info!(missing = %report.describe_missing(), "interview requirements not met");
            return Err(InterviewError::ValidationError {
                missing: report.missing,
            });
        }

        let created = self
            .backend
            .create_interview(&NewInterview {
                job_id: job_id.to_string(),
                candidature_id: candidature_id.map(str::to_string),
                user_id: self.session.user_id.clone(),
                user_name: self.session.display_name().to_string(),
                user_email: self.session.email_or_default().to_string(),
            })
            .await?;

        let questions = if created.questions.is_empty() {
            debug!("backend returned no questions, using default set");
            default_questions()
        } else {
            created
                .questions
                .into_iter()
                .map(|q| Question::new(q.id, q.order, q.text))
                .collect()
        };

        let interview = Interview::new(
            created.id,
            job_id,
            candidature_id.map(str::to_string),
            self.session.user_id.clone(),
            questions,
        )?;
        info!(
            interview = interview.id(),
            questions = interview.len(),
            "interview created"
        );
        state.interview = Some(interview);
        state.cursor = 0;

        self.acquire_device(&mut state).await?;
        Ok(self.snapshot_of(&state))
    }

    /// Try the device again while the interview is still in Setup
    pub async fn retry_device(&self) -> Result<InterviewSnapshot, InterviewError> {
        let mut state = self.ctx.state.lock().await;
        state.interview()?.status().on(InterviewAction::DeviceAcquired)?;
        self.acquire_device(&mut state).await?;
        Ok(self.snapshot_of(&state))
    }

    async fn acquire_device(&self, state: &mut OrchestratorState<D>) -> Result<(), InterviewError> {
        if let Err(e) = state.media.acquire(&self.config.constraints).await {
            warn!(error = %e, "media device acquisition failed");
            self.notify("Interview", &e.to_string(), NotificationIcon::Camera)
                .await;
            return Err(e.into());
        }
        state.interview_mut()?.apply(InterviewAction::DeviceAcquired)?;
        Ok(())
    }

    /// The question at the cursor
    pub async fn current_question(&self) -> Option<Question> {
        self.ctx.state.lock().await.current().cloned()
    }

    /// Arm and start recording the current question.
    ///
    /// Spawns the question's pipeline task, which uploads and analyzes the
    /// answer once recording stops.
    pub async fn record_answer(&self) -> Result<u32, InterviewError> {
        let mut state = self.ctx.state.lock().await;
        let interview_id = state.active("record answer")?.id().to_string();

        if self.ctx.recording.state().is_active() {
            return Err(InterviewError::RecordingInProgress);
        }
        let question = state.current().cloned().ok_or(InterviewError::NoInterview)?;
        let order = question.order;
        if question.answered {
            return Err(InterviewError::QuestionAlreadyAnswered { order });
        }
        if let Some(running) = state.running_pipeline() {
            return Err(InterviewError::AnswerInFlight { order: running });
        }

        if state.failed_uploads.remove(&order).is_some() {
            debug!(question = order, "discarding failed upload for re-record");
        }

        let tracks = state.media.tracks();
        self.ctx.recording.arm(order, tracks).await?;
        if let Err(e) = self.ctx.recording.start().await {
            if let Err(cancel_err) = self.ctx.recording.cancel().await {
                warn!(error = %cancel_err, "failed to reset recording session");
            }
            return Err(e.into());
        }

        if let Some(q) = state.question_mut(order) {
            q.progress = QuestionProgress::Recording;
            q.last_error = None;
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(self.ctx.clone().record_then_process(
            interview_id,
            order,
            token.clone(),
        ));
        state.pipeline = Some(PipelineTask {
            order,
            token,
            handle,
        });
        drop(state);

        self.ctx.emit(InterviewEvent::RecordingStarted {
            order,
            max: self.config.max_duration,
        });
        Ok(order)
    }

    /// Stop the current take early
    pub async fn stop_recording(&self) -> Result<(), InterviewError> {
        self.ctx.state.lock().await.active("stop recording")?;
        self.ctx.recording.stop().await?;
        Ok(())
    }

    /// Move to the next question if the current one is resolved
    pub async fn next_question(&self) -> Result<Advance, InterviewError> {
        let mut state = self.ctx.state.lock().await;
        let total = state.active("advance")?.len();

        let resolved = state.current().is_some_and(Question::is_resolved);
        if !resolved {
            return Ok(Advance::NotAnswered);
        }
        if state.cursor + 1 >= total {
            return Ok(Advance::AtEnd);
        }
        state.cursor += 1;
        let order = state.current().map(|q| q.order).unwrap_or_default();
        info!(question = order, "advanced to next question");
        Ok(Advance::Moved(order))
    }

    /// Skip the current question and advance, when skipping is allowed
    pub async fn skip_question(&self) -> Result<Advance, InterviewError> {
        if !self.config.allow_skip {
            return Err(InterviewError::SkipDisabled);
        }
        let mut state = self.ctx.state.lock().await;
        let total = state.active("skip question")?.len();
        if self.ctx.recording.state().is_active() {
            return Err(InterviewError::RecordingInProgress);
        }
        let Some(order) = state.current().map(|q| q.order) else {
            return Err(InterviewError::NoInterview);
        };
        if state.current().is_some_and(|q| q.answered) {
            return Err(InterviewError::QuestionAlreadyAnswered { order });
        }

        if state.running_pipeline() == Some(order) {
            state.cancel_pipeline();
        }
        state.failed_uploads.remove(&order);
        if let Some(q) = state.question_mut(order) {
            q.mark_skipped();
        }
        info!(question = order, "question skipped");

        if state.cursor + 1 >= total {
            return Ok(Advance::AtEnd);
        }
        state.cursor += 1;
        let next = state.current().map(|q| q.order).unwrap_or_default();
        Ok(Advance::Moved(next))
    }

    /// Upload the current question's failed artifact again
    pub async fn retry_upload(&self) -> Result<u32, InterviewError> {
        let mut state = self.ctx.state.lock().await;
        state.active("retry upload")?;
        let order = state
            .current()
            .map(|q| q.order)
            .ok_or(InterviewError::NoInterview)?;
        if let Some(running) = state.running_pipeline() {
            return Err(InterviewError::AnswerInFlight { order: running });
        }
        let job = state
            .failed_uploads
            .remove(&order)
            .ok_or(InterviewError::NothingToRetry { order })?;

        info!(question = order, "retrying upload");
        let token = CancellationToken::new();
        let handle = tokio::spawn(self.ctx.clone().process(job, token.clone()));
        state.pipeline = Some(PipelineTask {
            order,
            token,
            handle,
        });
        Ok(order)
    }

    /// Enable or disable the camera or microphone
    pub async fn set_track_enabled(&self, kind: TrackKind, enabled: bool) -> Result<(), InterviewError> {
        let mut state = self.ctx.state.lock().await;
        state.interview()?;
        state.media.set_track_enabled(kind, enabled)?;
        Ok(())
    }

    /// Flip the camera or microphone; returns whether it is now on
    pub async fn toggle_track(&self, kind: TrackKind) -> Result<bool, InterviewError> {
        let mut state = self.ctx.state.lock().await;
        state.interview()?;
        Ok(state.media.toggle_track(kind)?)
    }

    /// Complete the interview with the backend.
    ///
    /// The device is released whatever the backend answers. If the backend
    /// call fails the interview stays in Completing and finish may be
    /// called again. On success returns the totals of the interview.
    pub async fn finish(&self) -> Result<InterviewSummary, InterviewError> {
        let mut state = self.ctx.state.lock().await;
        let interview = state.interview()?;
        interview.status().on(InterviewAction::BeginFinish)?;
        if interview.answered_count() == 0 {
            return Err(InterviewError::NoAnsweredQuestions);
        }
        if self.ctx.recording.state().is_active() {
            return Err(InterviewError::RecordingInProgress);
        }

        state.cancel_pipeline();
        let interview = state.interview_mut()?;
        interview.apply(InterviewAction::BeginFinish)?;
        let interview_id = interview.id().to_string();
        let answered = interview.answered_count();

        let result = self.backend.finish_interview(&interview_id).await;

        if let Err(e) = state.media.release() {
            warn!(error = %e, "failed to release media device");
        }

        match result {
            Ok(true) => {
                let interview = state.interview_mut()?;
                interview.apply(InterviewAction::Complete)?;
                let summary = interview.summary();
                state.failed_uploads.clear();
                info!(
                    interview = %interview_id,
                    answered,
                    pending = summary.pending_analyses,
                    "interview completed"
                );
                self.notify(
                    "Interview complete",
                    &format!("{} answers submitted for analysis", answered),
                    NotificationIcon::Success,
                )
                .await;
                Ok(summary)
            }
            Ok(false) => {
                warn!(interview = %interview_id, "backend did not confirm completion");
                self.notify(
                    "Interview not completed",
                    "The server did not confirm completion. Try again.",
                    NotificationIcon::Error,
                )
                .await;
                Err(InterviewError::FinishRejected)
            }
            Err(e) => {
                warn!(interview = %interview_id, error = %e, "finish request failed");
                self.notify("Interview not completed", &e.to_string(), NotificationIcon::Error)
                    .await;
                Err(e.into())
            }
        }
    }

    /// Abandon the interview from any non-terminal state.
    ///
    /// Cancels the recording deadline and the pipeline, discards the current
    /// take and any unsent artifacts, and releases the device. Each step runs
    /// even if an earlier one fails.
    pub async fn abandon(&self) -> Result<(), InterviewError> {
        self.ctx.recording.cancel_deadline();

        let mut state = self.ctx.state.lock().await;
        state.cancel_pipeline();

        if let Err(e) = self.ctx.recording.cancel().await {
            warn!(error = %e, "failed to cancel recording");
        }
        if let Err(e) = state.media.release() {
            warn!(error = %e, "failed to release media device");
        }
        let discarded = state.failed_uploads.len();
        state.failed_uploads.clear();

        let interview = state.interview_mut()?;
        interview.apply(InterviewAction::Abandon)?;
        info!(interview = interview.id(), discarded, "interview abandoned");
        drop(state);

        self.notify(
            "Interview abandoned",
            "Recording stopped and camera released",
            NotificationIcon::Warning,
        )
        .await;
        Ok(())
    }

    pub async fn snapshot(&self) -> InterviewSnapshot {
        let state = self.ctx.state.lock().await;
        self.snapshot_of(&state)
    }

    fn snapshot_of(&self, state: &OrchestratorState<D>) -> InterviewSnapshot {
        let interview = state.interview.as_ref();
        InterviewSnapshot {
            interview_id: interview.map(|i| i.id().to_string()),
            status: interview.map(Interview::status),
            questions: interview.map(|i| i.questions().to_vec()).unwrap_or_default(),
            current_index: state.cursor,
            recording: self.ctx.recording.state(),
            track_count: state.media.track_count(),
            answered: interview.map(Interview::answered_count).unwrap_or(0),
        }
    }

    async fn notify(&self, title: &str, message: &str, icon: NotificationIcon) {
        if !self.config.enable_notify {
            return;
        }
        if let Err(e) = self.notifier.notify(title, message, icon).await {
            debug!(error = %e, "notification failed");
        }
    }
}
