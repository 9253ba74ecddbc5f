//! FFmpeg-based video recorder adapter

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::application::ports::{MediaRecorder, RecordingError, TrackKind, TrackSource};
use crate::domain::recording::{MediaClip, MediaMimeType};

/// Temp file for one take, removed on drop
struct TempVideoFile {
    path: PathBuf,
}

impl TempVideoFile {
    fn new(mime_type: MediaMimeType) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let path = std::env::temp_dir().join(format!(
            "interview-capture-{}-{}.{}",
            std::process::id(),
            timestamp,
            mime_type.extension()
        ));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempVideoFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

struct ActiveTake {
    child: Child,
    output: TempVideoFile,
    /// Resolves to the last stderr line once FFmpeg closes the pipe
    stderr_tail: Option<JoinHandle<Option<String>>>,
}

/// Records the device tracks to WebM (VP8 + Opus) through FFmpeg
pub struct FfmpegRecorder {
    take: Mutex<Option<ActiveTake>>,
    is_recording: AtomicBool,
}

impl FfmpegRecorder {
    const MIME_TYPE: MediaMimeType = MediaMimeType::Webm;

    pub fn new() -> Self {
        Self {
            take: Mutex::new(None),
            is_recording: AtomicBool::new(false),
        }
    }

    /// Build FFmpeg args for one take.
    /// Disabled tracks are still captured but blanked (black video, muted audio).
    fn build_ffmpeg_args(tracks: &[TrackSource], output_path: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
        let video = tracks.iter().find(|t| t.kind == TrackKind::Video);
        let audio = tracks.iter().find(|t| t.kind == TrackKind::Audio);

        if let Some(video) = video {
            args.extend(["-f".into(), "v4l2".into()]);
            if let Some((w, h)) = video.resolution {
                args.extend(["-video_size".into(), format!("{}x{}", w, h)]);
            }
            args.extend(["-i".into(), video.source.clone()]);
        }
        if let Some(audio) = audio {
            args.extend([
                "-f".into(),
                "pulse".into(),
                "-i".into(),
                audio.source.clone(),
            ]);
        }

        if let Some(video) = video {
            if !video.enabled {
                args.extend(["-vf".into(), "drawbox=color=black:t=fill".into()]);
            }
            args.extend([
                "-c:v".into(),
                "libvpx".into(),
                "-deadline".into(),
                "realtime".into(),
                "-b:v".into(),
                "1M".into(),
            ]);
        }
        if let Some(audio) = audio {
            if !audio.enabled {
                args.extend(["-af".into(), "volume=0".into()]);
            }
            args.extend(["-c:a".into(), "libopus".into(), "-b:a".into(), "64k".into()]);
        }

        args.extend([
            "-f".into(),
            "webm".into(),
            "-y".into(),
            output_path.to_string_lossy().to_string(),
        ]);
        args
    }

    fn spawn_ffmpeg(args: &[String]) -> Result<Child, RecordingError> {
        Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecordingError::StartFailed("ffmpeg not found in PATH".to_string())
                } else {
                    RecordingError::StartFailed(e.to_string())
                }
            })
    }

    async fn read_clip(path: &Path) -> Result<MediaClip, RecordingError> {
        let data = fs::read(path)
            .await
            .map_err(|e| RecordingError::ReadFailed(e.to_string()))?;

        if data.is_empty() {
            return Err(RecordingError::ReadFailed(
                "Recording file is empty".to_string(),
            ));
        }

        Ok(MediaClip::new(data, Self::MIME_TYPE))
    }

    fn send_signal(child: &Child, sig: Signal) -> Result<(), RecordingError> {
        if let Some(id) = child.id() {
            signal::kill(Pid::from_raw(id as i32), sig)
                .map_err(|e| RecordingError::RecordingFailed(format!("Signal failed: {}", e)))?;
        }
        Ok(())
    }

    /// Read stderr for the whole take so FFmpeg never blocks on a full pipe
    fn drain_stderr<R>(stderr: R) -> JoinHandle<Option<String>>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut last = None;
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.trim().is_empty() {
                    last = Some(line);
                }
            }
            last
        })
    }

    async fn last_stderr_line(tail: Option<JoinHandle<Option<String>>>) -> String {
        let line = match tail {
            Some(handle) => handle.await.ok().flatten(),
            None => None,
        };
        line.unwrap_or_else(|| "unknown error".to_string())
    }
}

impl Default for FfmpegRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaRecorder for FfmpegRecorder {
    async fn start(&self, tracks: &[TrackSource]) -> Result<(), RecordingError> {
        let mut take = self.take.lock().await;
        if take.is_some() {
            return Err(RecordingError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        let output = TempVideoFile::new(Self::MIME_TYPE);
        let args = Self::build_ffmpeg_args(tracks, output.path());
        debug!(args = ?args, "spawning ffmpeg");
        let mut child = Self::spawn_ffmpeg(&args)?;
        let stderr_tail = child.stderr.take().map(Self::drain_stderr);

        *take = Some(ActiveTake {
            child,
            output,
            stderr_tail,
        });
        self.is_recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<MediaClip, RecordingError> {
        let ActiveTake {
            mut child,
            output,
            stderr_tail,
        } = self
            .take
            .lock()
            .await
            .take()
            .ok_or(RecordingError::NotRecording)?;
        self.is_recording.store(false, Ordering::SeqCst);

        // SIGINT lets FFmpeg write the container trailer
        Self::send_signal(&child, Signal::SIGINT)?;
        let status = child
            .wait()
            .await
            .map_err(|e| RecordingError::RecordingFailed(format!("FFmpeg failed: {}", e)))?;

        let clip = Self::read_clip(output.path()).await;
        if clip.is_err() && !status.success() {
            let message = Self::last_stderr_line(stderr_tail).await;
            return Err(RecordingError::RecordingFailed(format!(
                "FFmpeg exited with error: {}",
                message
            )));
        }
        clip
    }

    async fn cancel(&self) -> Result<(), RecordingError> {
        let take = self.take.lock().await.take();
        self.is_recording.store(false, Ordering::SeqCst);
        if let Some(ActiveTake {
            mut child,
            output,
            stderr_tail,
        }) = take
        {
            Self::send_signal(&child, Signal::SIGKILL)?;
            let _ = child.wait().await;
            if let Some(tail) = stderr_tail {
                tail.abort();
            }
            drop(output);
        }
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }
}
