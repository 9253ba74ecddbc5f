//! In-memory port doubles shared by integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use interview_capture::application::ports::{
    BackendError, CreatedInterview, InterviewBackend, MediaConstraints, MediaDevice, MediaError,
    MediaRecorder, MediaStream, NewInterview, NotificationError, NotificationIcon, Notifier,
    ProcessingReport, ProcessingState, QuestionSpec, RecordingError, Requirement,
    RequirementsReport, RequirementsValidator, TelemetrySource, TrackKind, TrackSource,
    UploadReceipt, ValidationFailure,
};
use interview_capture::application::{
    EventCallback, InterviewEvent, InterviewOrchestrator, OrchestratorConfig, PollPolicy,
    RetryPolicy,
};
use interview_capture::domain::recording::{Duration, MediaClip, MediaMimeType, TelemetrySample};
use interview_capture::domain::session::UserSession;

// Device

#[derive(Default)]
pub struct DeviceLog {
    pub opens: AtomicUsize,
    pub live_tracks: AtomicUsize,
    pub stops: AtomicUsize,
    failures: Mutex<VecDeque<MediaError>>,
}

/// Camera + microphone that hands out two live tracks
#[derive(Clone, Default)]
pub struct FakeDevice {
    pub log: Arc<DeviceLog>,
}

impl FakeDevice {
    /// Fail the next opens with these errors, in order
    pub fn failing_with(errors: Vec<MediaError>) -> Self {
        let device = Self::default();
        *device.log.failures.lock().unwrap() = errors.into();
        device
    }

    pub fn live_tracks(&self) -> usize {
        self.log.live_tracks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDevice for FakeDevice {
    async fn open(&self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>, MediaError> {
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.log.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut tracks = Vec::new();
        if constraints.video {
            tracks.push(TrackSource {
                kind: TrackKind::Video,
                source: "/dev/video-test".into(),
                enabled: true,
                resolution: Some((constraints.width, constraints.height)),
            });
        }
        if constraints.audio {
            tracks.push(TrackSource {
                kind: TrackKind::Audio,
                source: "test-mic".into(),
                enabled: true,
                resolution: None,
            });
        }
        self.log.live_tracks.store(tracks.len(), Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            tracks,
            stopped: false,
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeStream {
    tracks: Vec<TrackSource>,
    stopped: bool,
    log: Arc<DeviceLog>,
}

impl MediaStream for FakeStream {
    fn tracks(&self) -> Vec<TrackSource> {
        if self.stopped {
            return Vec::new();
        }
        self.tracks.clone()
    }

    fn set_track_enabled(&mut self, kind: TrackKind, enabled: bool) -> Result<(), MediaError> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.kind == kind)
            .ok_or(MediaError::TrackNotFound(kind))?;
        track.enabled = enabled;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MediaError> {
        self.stopped = true;
        self.log.stops.fetch_add(1, Ordering::SeqCst);
        self.log.live_tracks.store(0, Ordering::SeqCst);
        Ok(())
    }

    fn track_count(&self) -> usize {
        if self.stopped {
            0
        } else {
            self.tracks.len()
        }
    }
}

// Recorder

#[derive(Default)]
pub struct RecorderLog {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub cancels: AtomicUsize,
    pub last_tracks: Mutex<Vec<TrackSource>>,
    /// Make stop lose the clip, like an encoder that died mid-take
    pub fail_stop: AtomicBool,
    recording: AtomicBool,
}

#[derive(Clone, Default)]
pub struct FakeRecorder {
    pub log: Arc<RecorderLog>,
}

#[async_trait]
impl MediaRecorder for FakeRecorder {
    async fn start(&self, tracks: &[TrackSource]) -> Result<(), RecordingError> {
        self.log.starts.fetch_add(1, Ordering::SeqCst);
        *self.log.last_tracks.lock().unwrap() = tracks.to_vec();
        self.log.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<MediaClip, RecordingError> {
        if !self.log.recording.swap(false, Ordering::SeqCst) {
            return Err(RecordingError::NotRecording);
        }
        self.log.stops.fetch_add(1, Ordering::SeqCst);
        if self.log.fail_stop.load(Ordering::SeqCst) {
            return Err(RecordingError::RecordingFailed("ffmpeg exited with status 1".into()));
        }
        Ok(MediaClip::new(vec![0x1a, 0x45, 0xdf, 0xa3], MediaMimeType::Webm))
    }

    async fn cancel(&self) -> Result<(), RecordingError> {
        self.log.cancels.fetch_add(1, Ordering::SeqCst);
        self.log.recording.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.log.recording.load(Ordering::SeqCst)
    }
}

// Telemetry

/// Emits one smile sample per take
#[derive(Clone, Default)]
pub struct FakeTelemetry {
    pub windows: Arc<AtomicUsize>,
}

impl TelemetrySource for FakeTelemetry {
    fn begin(&self) {
        self.windows.fetch_add(1, Ordering::SeqCst);
    }

    fn collect(&self) -> Vec<TelemetrySample> {
        let mut data = Map::new();
        data.insert("smile".into(), Value::from(0.8));
        vec![TelemetrySample::new(500, data)]
    }
}

// Backend

pub struct BackendScript {
    pub healthy: AtomicBool,
    pub created: Mutex<CreatedInterview>,
    pub uploads: Mutex<VecDeque<Result<UploadReceipt, BackendError>>>,
    pub statuses: Mutex<VecDeque<Result<ProcessingReport, BackendError>>>,
    /// Answer once the script runs out
    pub default_status: Mutex<ProcessingReport>,
    pub status_delay: Mutex<StdDuration>,
    pub finish: Mutex<VecDeque<Result<bool, BackendError>>>,
    pub create_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub finish_calls: AtomicUsize,
    pub uploaded_files: Mutex<Vec<String>>,
}

impl Default for BackendScript {
    fn default() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            created: Mutex::new(CreatedInterview {
                id: "iv-1".into(),
                questions: numbered_questions(3),
            }),
            uploads: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            default_status: Mutex::new(completed_report(8.0)),
            status_delay: Mutex::new(StdDuration::ZERO),
            finish: Mutex::new(VecDeque::new()),
            create_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            finish_calls: AtomicUsize::new(0),
            uploaded_files: Mutex::new(Vec::new()),
        }
    }
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    pub script: Arc<BackendScript>,
}

impl ScriptedBackend {
    pub fn never_completes() -> Self {
        let backend = Self::default();
        *backend.script.default_status.lock().unwrap() =
            ProcessingReport::with_state(ProcessingState::Processing);
        backend
    }

    pub fn push_upload(&self, result: Result<UploadReceipt, BackendError>) {
        self.script.uploads.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, result: Result<ProcessingReport, BackendError>) {
        self.script.statuses.lock().unwrap().push_back(result);
    }

    pub fn push_finish(&self, result: Result<bool, BackendError>) {
        self.script.finish.lock().unwrap().push_back(result);
    }

    pub fn set_questions(&self, questions: Vec<QuestionSpec>) {
        self.script.created.lock().unwrap().questions = questions;
    }

    pub fn set_status_delay(&self, delay: StdDuration) {
        *self.script.status_delay.lock().unwrap() = delay;
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InterviewBackend for ScriptedBackend {
    async fn health(&self) -> bool {
        self.script.healthy.load(Ordering::SeqCst)
    }

    async fn create_interview(&self, _request: &NewInterview) -> Result<CreatedInterview, BackendError> {
        self.script.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.created.lock().unwrap().clone())
    }

    async fn upload_video_response(
        &self,
        interview_id: &str,
        artifact: &interview_capture::domain::recording::RecordingArtifact,
    ) -> Result<UploadReceipt, BackendError> {
        let call = self.script.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.script
            .uploaded_files
            .lock()
            .unwrap()
            .push(artifact.file_name(interview_id));
        let scripted = self.script.uploads.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(UploadReceipt {
                response_id: format!("resp-{}", call),
                video_url: None,
            })
        })
    }

    async fn processing_status(
        &self,
        _interview_id: &str,
        _response_id: &str,
    ) -> Result<ProcessingReport, BackendError> {
        self.script.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.script.status_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.script.statuses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.script.default_status.lock().unwrap().clone()))
    }

    async fn finish_interview(&self, _interview_id: &str) -> Result<bool, BackendError> {
        self.script.finish_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.finish.lock().unwrap().pop_front();
        scripted.unwrap_or(Ok(true))
    }
}

pub fn numbered_questions(count: u32) -> Vec<QuestionSpec> {
    (1..=count)
        .map(|order| QuestionSpec {
            id: format!("q{}", order),
            text: format!("Question number {}", order),
            order,
        })
        .collect()
}

pub fn completed_report(score: f64) -> ProcessingReport {
    ProcessingReport {
        transcription: Some("I led the harvest planning".into()),
        analysis_score: Some(score),
        ..ProcessingReport::with_state(ProcessingState::Completed)
    }
}

// Validator

#[derive(Clone, Default)]
pub struct StaticValidator {
    pub missing: Vec<Requirement>,
    pub unreachable: bool,
}

#[async_trait]
impl RequirementsValidator for StaticValidator {
    async fn validate(&self, _session: &UserSession) -> Result<RequirementsReport, ValidationFailure> {
        if self.unreachable {
            return Err(ValidationFailure("requirements service down".into()));
        }
        Ok(RequirementsReport {
            missing: self.missing.clone(),
        })
    }
}

// Notifier

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<(String, NotificationIcon)>>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        title: &str,
        _message: &str,
        icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push((title.to_string(), icon));
        Ok(())
    }
}

// Harness

pub type TestOrchestrator = InterviewOrchestrator<
    FakeDevice,
    FakeRecorder,
    FakeTelemetry,
    ScriptedBackend,
    StaticValidator,
    RecordingNotifier,
>;

/// Orchestrator plus handles to every double it owns
pub struct Harness {
    pub orchestrator: TestOrchestrator,
    pub device: FakeDevice,
    pub recorder: FakeRecorder,
    pub telemetry: FakeTelemetry,
    pub backend: ScriptedBackend,
    pub notifier: RecordingNotifier,
    pub events: Arc<Mutex<Vec<InterviewEvent>>>,
}

pub struct HarnessBuilder {
    device: FakeDevice,
    backend: ScriptedBackend,
    validator: StaticValidator,
    config: OrchestratorConfig,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            device: FakeDevice::default(),
            backend: ScriptedBackend::default(),
            validator: StaticValidator::default(),
            config: OrchestratorConfig {
                max_duration: Duration::from_secs(120),
                retry: RetryPolicy {
                    max_attempts: 3,
                    backoff: Duration::from_secs(1),
                },
                poll: PollPolicy {
                    max_attempts: 30,
                    interval: Duration::from_millis(3000),
                },
                allow_skip: false,
                enable_notify: true,
                constraints: MediaConstraints::default(),
            },
        }
    }

    pub fn device(mut self, device: FakeDevice) -> Self {
        self.device = device;
        self
    }

    pub fn backend(mut self, backend: ScriptedBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn validator(mut self, validator: StaticValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn allow_skip(mut self) -> Self {
        self.config.allow_skip = true;
        self
    }

    pub fn max_duration(mut self, max: Duration) -> Self {
        self.config.max_duration = max;
        self
    }

    pub fn build(self) -> Harness {
        let recorder = FakeRecorder::default();
        let telemetry = FakeTelemetry::default();
        let notifier = RecordingNotifier::default();
        let events = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&events);
        let callback: EventCallback = Arc::new(move |event: InterviewEvent| {
            sink.lock().unwrap().push(event);
        });

        let mut session = UserSession::new("user-7");
        session.name = Some("Ana Souza".into());
        session.role = Some("Agronomist".into());

        let orchestrator = InterviewOrchestrator::new(
            self.device.clone(),
            recorder.clone(),
            telemetry.clone(),
            self.backend.clone(),
            self.validator,
            notifier.clone(),
            session,
            self.config,
        )
        .with_event_callback(callback);

        Harness {
            orchestrator,
            device: self.device,
            recorder,
            telemetry,
            backend: self.backend,
            notifier,
            events,
        }
    }
}

impl Harness {
    pub fn events(&self) -> Vec<InterviewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub async fn current_progress(&self) -> Option<interview_capture::domain::QuestionProgress> {
        self.orchestrator.current_question().await.map(|q| q.progress)
    }
}

/// Poll a condition, letting paused time advance in 10ms steps
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..20_000 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    false
}
