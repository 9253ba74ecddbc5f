//! Per-question recording session with an automatic deadline

use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::error::InvalidStateTransition;
use crate::domain::recording::{Duration, RecordingArtifact, RecordingEvent, RecordingState};

use super::ports::{MediaRecorder, RecordingError, TelemetrySource, TrackSource};

/// Errors from the recording session
#[derive(Debug, Error)]
pub enum RecordingSessionError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error(transparent)]
    Recorder(#[from] RecordingError),

    #[error("No media device handle to record from")]
    NoDevice,
}

struct SessionInner {
    state: RecordingState,
    question_order: u32,
    tracks: Vec<TrackSource>,
    started: Option<(DateTime<Utc>, Instant)>,
    artifact: Option<RecordingArtifact>,
    /// Why the last take ended without an artifact
    failure: Option<String>,
}

/// Drives one bounded capture at a time.
///
/// State machine:
///   IDLE -> ARMED (arm)
///   ARMED -> RECORDING (start)
///   RECORDING -> STOPPED (stop, or the deadline firing)
///   STOPPED -> ARMED (arm again, previous artifact discarded)
///   any -> IDLE (cancel)
///
/// Cloning yields another handle to the same session.
pub struct RecordingSession<R, T>
where
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
{
    recorder: Arc<R>,
    telemetry: Arc<T>,
    inner: Arc<Mutex<SessionInner>>,
    state_tx: Arc<watch::Sender<RecordingState>>,
    deadline: Arc<StdMutex<Option<CancellationToken>>>,
    max_duration: Duration,
}

impl<R, T> Clone for RecordingSession<R, T>
where
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            recorder: Arc::clone(&self.recorder),
            telemetry: Arc::clone(&self.telemetry),
            inner: Arc::clone(&self.inner),
            state_tx: Arc::clone(&self.state_tx),
            deadline: Arc::clone(&self.deadline),
            max_duration: self.max_duration,
        }
    }
}

impl<R, T> RecordingSession<R, T>
where
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
{
    pub fn new(recorder: R, telemetry: T, max_duration: Duration) -> Self {
        let (state_tx, _) = watch::channel(RecordingState::Idle);
        Self {
            recorder: Arc::new(recorder),
            telemetry: Arc::new(telemetry),
            inner: Arc::new(Mutex::new(SessionInner {
                state: RecordingState::Idle,
                question_order: 0,
                tracks: Vec::new(),
                started: None,
                artifact: None,
                failure: None,
            })),
            state_tx: Arc::new(state_tx),
            deadline: Arc::new(StdMutex::new(None)),
            max_duration,
        }
    }

    pub fn state(&self) -> RecordingState {
        *self.state_tx.borrow()
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<RecordingState> {
        self.state_tx.subscribe()
    }

    /// Wait until the current capture ends, either stopped or cancelled
    pub async fn wait_finished(&self) -> RecordingState {
        let mut rx = self.subscribe();
        let finished = match rx
            .wait_for(|s| matches!(s, RecordingState::Stopped | RecordingState::Idle))
            .await
        {
            Ok(state) => *state,
            Err(_) => RecordingState::Idle,
        };
        // bound first so the watch::Ref is dropped before rx
        finished
    }

    /// Prepare to record the given question on the device's tracks
    pub async fn arm(&self, question_order: u32, tracks: Vec<TrackSource>) -> Result<(), RecordingSessionError> {
        if tracks.is_empty() {
            return Err(RecordingSessionError::NoDevice);
        }
        let mut inner = self.inner.lock().await;
        let next = inner.state.on(RecordingEvent::Arm)?;
        if inner.artifact.take().is_some() {
            debug!(question = inner.question_order, "discarding previous take");
        }
        inner.question_order = question_order;
        inner.tracks = tracks;
        inner.started = None;
        inner.failure = None;
        self.set_state(&mut inner, next);
        Ok(())
    }

    /// Begin capture and telemetry, and arm the deadline
    pub async fn start(&self) -> Result<(), RecordingSessionError> {
        let mut inner = self.inner.lock().await;
        let next = inner.state.on(RecordingEvent::Start)?;

        self.telemetry.begin();
        self.recorder.start(&inner.tracks).await?;

        inner.started = Some((Utc::now(), Instant::now()));
        self.set_state(&mut inner, next);
        info!(
            question = inner.question_order,
            max = %self.max_duration,
            "recording started"
        );
        drop(inner);

        self.spawn_deadline();
        Ok(())
    }

    /// Stop capture and finalize the artifact.
    /// A no-op if the deadline already stopped this take.
    pub async fn stop(&self) -> Result<(), RecordingSessionError> {
        self.cancel_deadline();
        self.finalize(false).await
    }

    /// Disarm the deadline timer without waiting on the session lock
    pub fn cancel_deadline(&self) {
        let token = match self.deadline.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(token) = token {
            token.cancel();
        }
    }

    /// Abort any capture, discard the artifact, return to idle
    pub async fn cancel(&self) -> Result<(), RecordingSessionError> {
        self.cancel_deadline();
        let mut inner = self.inner.lock().await;
        let was_recording = inner.state == RecordingState::Recording;
        let next = inner.state.on(RecordingEvent::Cancel)?;

        inner.artifact = None;
        inner.started = None;
        inner.failure = None;
        self.set_state(&mut inner, next);

        if was_recording {
            let _ = self.telemetry.collect();
            self.recorder.cancel().await?;
            info!(question = inner.question_order, "recording cancelled");
        }
        Ok(())
    }

    /// Recorder error that ended the last take, at most once
    pub async fn take_failure(&self) -> Option<String> {
        self.inner.lock().await.failure.take()
    }

    /// Hand the finished artifact to the caller, at most once
    pub async fn take_artifact(&self) -> Option<RecordingArtifact> {
        self.inner.lock().await.artifact.take()
    }

    fn set_state(&self, inner: &mut SessionInner, next: RecordingState) {
        inner.state = next;
        self.state_tx.send_replace(next);
    }

    fn spawn_deadline(&self) {
        let token = CancellationToken::new();
        let previous = match self.deadline.lock() {
            Ok(mut slot) => slot.replace(token.clone()),
            Err(poisoned) => poisoned.into_inner().replace(token.clone()),
        };
        if let Some(previous) = previous {
            previous.cancel();
        }

        let session = self.clone();
        let max = self.max_duration;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(max.as_std()) => {
                    info!(max = %max, "recording deadline reached");
                    if let Err(e) = session.finalize(true).await {
                        warn!(error = %e, "automatic stop failed");
                    }
                }
            }
        });
    }

    async fn finalize(&self, automatic: bool) -> Result<(), RecordingSessionError> {
        let mut inner = self.inner.lock().await;
        if inner.state == RecordingState::Stopped && !automatic {
            debug!("recording already stopped by deadline");
            return Ok(());
        }
        let next = inner.state.on(RecordingEvent::Stop)?;

        let clip = match self.recorder.stop().await {
            Ok(clip) => clip,
            Err(e) => {
                let _ = self.telemetry.collect();
                warn!(question = inner.question_order, error = %e, "recording could not be finalized");
                inner.started = None;
                inner.failure = Some(e.to_string());
                self.set_state(&mut inner, RecordingState::Idle);
                return Err(e.into());
            }
        };
        let telemetry = self.telemetry.collect();

        let (started_at, elapsed) = match inner.started.take() {
            Some((at, instant)) => (at, Duration::from(instant.elapsed())),
            None => (Utc::now(), Duration::from_millis(0)),
        };

        info!(
            question = inner.question_order,
            duration = %elapsed,
            size = %clip.human_readable_size(),
            automatic,
            "recording stopped"
        );

        inner.artifact = Some(RecordingArtifact {
            question_order: inner.question_order,
            clip,
            started_at,
            duration: elapsed,
            telemetry,
        });
        self.set_state(&mut inner, next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TrackKind;
    use crate::domain::recording::{MediaClip, MediaMimeType, TelemetrySample};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeRecorder {
        recording: AtomicBool,
        cancels: AtomicUsize,
        fail_stop: AtomicBool,
    }

    #[async_trait]
    impl MediaRecorder for FakeRecorder {
        async fn start(&self, _: &[TrackSource]) -> Result<(), RecordingError> {
            self.recording.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<MediaClip, RecordingError> {
            if !self.recording.swap(false, Ordering::SeqCst) {
                return Err(RecordingError::NotRecording);
            }
            if self.fail_stop.load(Ordering::SeqCst) {
                return Err(RecordingError::RecordingFailed("ffmpeg exited early".into()));
            }
            Ok(MediaClip::new(vec![7; 32], MediaMimeType::Webm))
        }

        async fn cancel(&self) -> Result<(), RecordingError> {
            self.recording.store(false, Ordering::SeqCst);
            self.cancels.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn is_recording(&self) -> bool {
            self.recording.load(Ordering::SeqCst)
        }
    }

    struct OneSample;

    impl TelemetrySource for OneSample {
        fn begin(&self) {}

        fn collect(&self) -> Vec<TelemetrySample> {
            vec![TelemetrySample::new(0, Default::default())]
        }
    }

    fn tracks() -> Vec<TrackSource> {
        vec![TrackSource {
            kind: TrackKind::Video,
            source: "/dev/video0".into(),
            enabled: true,
            resolution: None,
        }]
    }

    fn session(max_secs: u64) -> RecordingSession<FakeRecorder, OneSample> {
        RecordingSession::new(FakeRecorder::default(), OneSample, Duration::from_secs(max_secs))
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_at_exact_duration() {
        let session = session(120);
        session.arm(1, tracks()).await.unwrap();
        session.start().await.unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(119)).await;
        assert_eq!(session.state(), RecordingState::Recording);

        assert_eq!(session.wait_finished().await, RecordingState::Stopped);
        let artifact = session.take_artifact().await.unwrap();
        assert_eq!(artifact.duration.as_secs(), 120);
        assert_eq!(artifact.question_order, 1);
        assert_eq!(artifact.telemetry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_stop_cancels_deadline() {
        let session = session(120);
        session.arm(2, tracks()).await.unwrap();
        session.start().await.unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        session.stop().await.unwrap();
        let artifact = session.take_artifact().await.unwrap();
        assert_eq!(artifact.duration.as_secs(), 30);

        // Re-arm; the old deadline must not stop the new take
        session.arm(2, tracks()).await.unwrap();
        session.start().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(100)).await;
        assert_eq!(session.state(), RecordingState::Recording);
    }

    #[tokio::test]
    async fn start_requires_arm() {
        let session = session(120);
        assert!(matches!(
            session.start().await,
            Err(RecordingSessionError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn arm_requires_device_tracks() {
        let session = session(120);
        assert!(matches!(
            session.arm(1, Vec::new()).await,
            Err(RecordingSessionError::NoDevice)
        ));
    }

    #[tokio::test]
    async fn stop_without_recording_fails() {
        let session = session(120);
        session.arm(1, tracks()).await.unwrap();
        assert!(session.stop().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_and_returns_to_idle() {
        let session = session(120);
        session.arm(1, tracks()).await.unwrap();
        session.start().await.unwrap();

        session.cancel().await.unwrap();
        assert_eq!(session.state(), RecordingState::Idle);
        assert_eq!(session.recorder.cancels.load(Ordering::SeqCst), 1);

        tokio::time::sleep(std::time::Duration::from_secs(200)).await;
        assert_eq!(session.state(), RecordingState::Idle);
        assert!(session.take_artifact().await.is_none());
    }

    #[tokio::test]
    async fn rearm_discards_previous_artifact() {
        let session = session(120);
        session.arm(1, tracks()).await.unwrap();
        session.start().await.unwrap();
        session.stop().await.unwrap();

        session.arm(1, tracks()).await.unwrap();
        assert_eq!(session.state(), RecordingState::Armed);
        assert!(session.take_artifact().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_deadline_stop_keeps_recorder_error() {
        let session = session(120);
        session.arm(3, tracks()).await.unwrap();
        session.start().await.unwrap();
        session.recorder.fail_stop.store(true, Ordering::SeqCst);

        assert_eq!(session.wait_finished().await, RecordingState::Idle);
        assert!(session.take_artifact().await.is_none());
        let failure = session.take_failure().await.unwrap();
        assert!(failure.contains("ffmpeg exited early"));
        assert!(session.take_failure().await.is_none());
    }

    #[tokio::test]
    async fn rearm_clears_previous_failure() {
        let session = session(120);
        session.arm(1, tracks()).await.unwrap();
        session.start().await.unwrap();
        session.recorder.fail_stop.store(true, Ordering::SeqCst);
        assert!(session.stop().await.is_err());

        session.arm(1, tracks()).await.unwrap();
        assert!(session.take_failure().await.is_none());
    }
}
