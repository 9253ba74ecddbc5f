//! App runners for the interview and check commands

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::application::ports::{
    ConfigStore, InterviewBackend, MediaDevice, MediaRecorder, Notifier, RequirementsValidator,
    TelemetrySource, TrackKind,
};
use crate::application::{
    Advance, InterviewError, InterviewEvent, InterviewOrchestrator, PollPolicy, RetryPolicy,
};
use crate::domain::config::{AppConfig, UserConfig};
use crate::domain::interview::InterviewStatus;
use crate::domain::recording::Duration;
use crate::domain::session::UserSession;
use crate::infrastructure::{HttpInterviewBackend, HttpRequirementsValidator, XdgConfigStore};

use super::args::{InterviewOptions, RunArgs};
use super::presenter::Presenter;
use super::signals::{CommandSource, InterviewCommand};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

pub const ENV_BACKEND_URL: &str = "INTERVIEW_BACKEND_URL";
pub const ENV_ACCESS_TOKEN: &str = "INTERVIEW_ACCESS_TOKEN";

/// Install the tracing subscriber; `RUST_LOG` wins over the default filter
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "interview_capture=debug"
    } else {
        "interview_capture=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

fn env_config() -> AppConfig {
    let non_empty = |key: &str| env::var(key).ok().filter(|s| !s.is_empty());
    AppConfig {
        backend_url: non_empty(ENV_BACKEND_URL),
        user: non_empty(ENV_ACCESS_TOKEN).map(|token| UserConfig {
            token: Some(token),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Config overrides carried by `run` flags
pub fn cli_config(backend_url: Option<String>, run: Option<&RunArgs>) -> AppConfig {
    AppConfig {
        backend_url,
        max_duration: run.and_then(|r| r.max_duration.clone()),
        allow_skip: run.filter(|r| r.allow_skip).map(|_| true),
        notify: run.filter(|r| r.notify).map(|_| true),
        ..Default::default()
    }
}

/// Resolve the merged config into run options, rejecting malformed durations
pub fn resolve_options(config: &AppConfig, args: &RunArgs) -> Result<InterviewOptions, String> {
    let parse = |name: &str, value: &Option<String>, fallback: Duration| match value {
        Some(raw) => raw
            .parse::<Duration>()
            .map_err(|e| format!("Invalid {}: {}", name, e))
            .and_then(|d| {
                if d.as_millis() == 0 {
                    Err(format!("Invalid {}: must be greater than zero", name))
                } else {
                    Ok(d)
                }
            }),
        None => Ok(fallback),
    };

    Ok(InterviewOptions {
        job_id: args.job_id.clone(),
        candidature_id: args.candidature_id.clone(),
        backend_url: config.backend_url_or_default().to_string(),
        max_duration: parse(
            "max-duration",
            &config.max_duration,
            Duration::default_max_recording(),
        )?,
        poll_max_attempts: config.poll_max_attempts_or_default(),
        poll_interval: parse(
            "poll_interval",
            &config.poll_interval,
            Duration::default_poll_interval(),
        )?,
        upload_retries: config.upload_retries_or_default(),
        upload_backoff: parse(
            "upload_backoff",
            &config.upload_backoff,
            Duration::default_upload_backoff(),
        )?,
        allow_skip: config.allow_skip_or_default(),
        notify: config.notify_or_default(),
        video_device: config.video_device_or_default().to_string(),
        audio_source: config.audio_source_or_default().to_string(),
    })
}

/// Session from the `[user]` config section
pub fn session_from_config(config: &AppConfig) -> Result<UserSession, String> {
    config.user_session().ok_or_else(|| {
        "No user configured. Run 'interview-capture config set user.id <ID>' first".to_string()
    })
}

/// Backend health and requirement report
pub async fn run_check(config: &AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let session = match session_from_config(config) {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let base_url = config.backend_url_or_default();
    let token = session.access_token.clone();
    let backend = HttpInterviewBackend::new(base_url, token.clone());

    presenter.start_spinner(&format!("Checking backend at {}", base_url));
    if !backend.health().await {
        presenter.spinner_fail(&format!("Backend at {} is unavailable", base_url));
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.spinner_success("Backend reachable");

    let validator = HttpRequirementsValidator::new(base_url, token);
    match validator.validate(&session).await {
        Ok(report) => {
            presenter.requirements(&report);
            if report.is_valid() {
                ExitCode::from(EXIT_SUCCESS)
            } else {
                ExitCode::from(EXIT_ERROR)
            }
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run an interactive interview
#[cfg(unix)]
pub async fn run_interview(options: InterviewOptions, session: UserSession) -> ExitCode {
    use crate::application::OrchestratorConfig;
    use crate::infrastructure::{create_notifier, FfmpegRecorder, NoOpTelemetry, V4l2Device};

    let presenter = Presenter::new();

    let mut commands = match CommandSource::spawn() {
        Ok(c) => c,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let token = session.access_token.clone();
    let config = OrchestratorConfig {
        max_duration: options.max_duration,
        retry: RetryPolicy {
            max_attempts: options.upload_retries,
            backoff: options.upload_backoff,
        },
        poll: PollPolicy {
            max_attempts: options.poll_max_attempts,
            interval: options.poll_interval,
        },
        allow_skip: options.allow_skip,
        enable_notify: options.notify,
        ..Default::default()
    };

    let events = presenter.clone();
    let orchestrator = InterviewOrchestrator::new(
        V4l2Device::new(&options.video_device, &options.audio_source),
        FfmpegRecorder::new(),
        NoOpTelemetry,
        HttpInterviewBackend::new(&options.backend_url, token.clone()),
        HttpRequirementsValidator::new(&options.backend_url, token),
        create_notifier(options.notify),
        session,
        config,
    )
    .with_event_callback(Arc::new(move |event: InterviewEvent| {
        present_event(&events, event)
    }));

    presenter.start_spinner("Preparing interview...");
    let created = orchestrator
        .create_interview(&options.job_id, options.candidature_id.as_deref())
        .await;
    match created {
        Ok(snapshot) => {
            presenter.spinner_success(&format!(
                "Interview {} ready ({} questions)",
                snapshot.interview_id.as_deref().unwrap_or("-"),
                snapshot.questions.len()
            ));
        }
        Err(e @ (InterviewError::PermissionDenied(_) | InterviewError::DeviceUnavailable(_))) => {
            presenter.spinner_fail(&e.to_string());
            presenter.info("Fix the camera or microphone, then type 'd' to try again");
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    }

    presenter.command_help();
    show_current(&orchestrator, &presenter).await;

    if interview_loop(&orchestrator, &mut commands, &presenter).await {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

#[cfg(not(unix))]
pub async fn run_interview(_options: InterviewOptions, _session: UserSession) -> ExitCode {
    Presenter::new().error("Video capture is only supported on Unix systems");
    ExitCode::from(EXIT_ERROR)
}

fn present_event(presenter: &Presenter, event: InterviewEvent) {
    match event {
        InterviewEvent::RecordingStarted { order, max } => {
            presenter.start_recording_progress(order, max);
        }
        InterviewEvent::RecordingStopped { order, duration } => {
            presenter.stop_recording_progress();
            presenter.info(&format!("Q{}: recorded {}", order, duration));
        }
        InterviewEvent::Uploading { order } => {
            presenter.info(&format!("Q{}: uploading answer...", order));
        }
        InterviewEvent::Processing { order } => {
            presenter.info(&format!("Q{}: waiting for analysis...", order));
        }
        InterviewEvent::AnswerReady { order, analysis } => {
            presenter.analysis(order, &analysis);
            presenter.info("Type 'n' for the next question or 'f' to finish");
        }
        InterviewEvent::AnswerFailed {
            order,
            message,
            retryable,
        } => {
            presenter.stop_recording_progress();
            presenter.error(&format!("Q{}: {}", order, message));
            if retryable {
                presenter.info("Type 'u' to retry the upload or 'r' to record again");
            } else {
                presenter.info("Type 'r' to record again");
            }
        }
    }
}

async fn show_current<D, R, T, B, V, N>(
    orchestrator: &InterviewOrchestrator<D, R, T, B, V, N>,
    presenter: &Presenter,
) where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
    V: RequirementsValidator,
    N: Notifier,
{
    let snapshot = orchestrator.snapshot().await;
    if let Some(question) = snapshot.questions.get(snapshot.current_index) {
        presenter.question(question, snapshot.questions.len());
    }
}

/// Drive the orchestrator from user commands until finished or abandoned.
///
/// Returns true when the interview completed.
async fn interview_loop<D, R, T, B, V, N>(
    orchestrator: &InterviewOrchestrator<D, R, T, B, V, N>,
    commands: &mut CommandSource,
    presenter: &Presenter,
) -> bool
where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
    V: RequirementsValidator,
    N: Notifier,
{
    loop {
        let Some(command) = commands.recv().await else {
            abandon(orchestrator, presenter).await;
            return false;
        };
        debug!(?command, "command received");

        let result = match command {
            InterviewCommand::Record => orchestrator.record_answer().await.map(|_| ()),
            InterviewCommand::Stop => orchestrator.stop_recording().await,
            InterviewCommand::Next => match orchestrator.next_question().await {
                Ok(Advance::Moved(_)) => {
                    show_current(orchestrator, presenter).await;
                    Ok(())
                }
                Ok(Advance::NotAnswered) => {
                    let order = orchestrator
                        .current_question()
                        .await
                        .map(|q| q.order)
                        .unwrap_or_default();
                    Err(InterviewError::QuestionNotAnswered { order })
                }
                Ok(Advance::AtEnd) => {
                    presenter.info("That was the last question. Type 'f' to finish");
                    Ok(())
                }
                Err(e) => Err(e),
            },
            InterviewCommand::Skip => match orchestrator.skip_question().await {
                Ok(Advance::Moved(_)) => {
                    show_current(orchestrator, presenter).await;
                    Ok(())
                }
                Ok(_) => {
                    presenter.info("Skipped the last question. Type 'f' to finish");
                    Ok(())
                }
                Err(e) => Err(e),
            },
            InterviewCommand::RetryUpload => orchestrator.retry_upload().await.map(|_| ()),
            InterviewCommand::ToggleMicrophone => {
                toggle(orchestrator, presenter, TrackKind::Audio).await
            }
            InterviewCommand::ToggleCamera => {
                toggle(orchestrator, presenter, TrackKind::Video).await
            }
            InterviewCommand::RetryDevice => match orchestrator.retry_device().await {
                Ok(_) => {
                    presenter.success("Camera and microphone ready");
                    show_current(orchestrator, presenter).await;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            InterviewCommand::Finish => {
                presenter.start_spinner("Finishing interview...");
                match orchestrator.finish().await {
                    Ok(summary) => {
                        presenter.spinner_success("Interview completed");
                        presenter.summary(&summary);
                        return true;
                    }
                    Err(e) => {
                        presenter.stop_spinner();
                        if orchestrator.status().await == Some(InterviewStatus::Completing) {
                            presenter.info("Type 'f' to try again or 'q' to abandon");
                        }
                        Err(e)
                    }
                }
            }
            InterviewCommand::Abandon | InterviewCommand::Shutdown => {
                abandon(orchestrator, presenter).await;
                return false;
            }
            InterviewCommand::Status => {
                presenter.status(&orchestrator.snapshot().await);
                Ok(())
            }
            InterviewCommand::Help => {
                presenter.command_help();
                Ok(())
            }
        };

        if let Err(e) = result {
            presenter.error(&e.to_string());
        }
    }
}

async fn toggle<D, R, T, B, V, N>(
    orchestrator: &InterviewOrchestrator<D, R, T, B, V, N>,
    presenter: &Presenter,
    kind: TrackKind,
) -> Result<(), InterviewError>
where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
    V: RequirementsValidator,
    N: Notifier,
{
    let enabled = orchestrator.toggle_track(kind).await?;
    let label = match kind {
        TrackKind::Audio => "Microphone",
        TrackKind::Video => "Camera",
    };
    presenter.info(&format!(
        "{} {} (applies to the next recording)",
        label,
        if enabled { "on" } else { "off" }
    ));
    Ok(())
}

async fn abandon<D, R, T, B, V, N>(
    orchestrator: &InterviewOrchestrator<D, R, T, B, V, N>,
    presenter: &Presenter,
) where
    D: MediaDevice + 'static,
    R: MediaRecorder + 'static,
    T: TelemetrySource + 'static,
    B: InterviewBackend + 'static,
    V: RequirementsValidator,
    N: Notifier,
{
    presenter.stop_recording_progress();
    match orchestrator.abandon().await {
        Ok(()) => presenter.warn("Interview abandoned"),
        Err(InterviewError::NoInterview) => {}
        Err(e) => presenter.error(&e.to_string()),
    }
}
