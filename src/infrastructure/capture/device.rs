//! V4L2 camera + PulseAudio microphone device adapter

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{
    MediaConstraints, MediaDevice, MediaError, MediaStream, TrackKind, TrackSource,
};

/// Opens the camera device node and pairs it with an audio source
pub struct V4l2Device {
    video_device: PathBuf,
    audio_source: String,
}

impl V4l2Device {
    pub fn new(video_device: impl Into<PathBuf>, audio_source: impl Into<String>) -> Self {
        Self {
            video_device: video_device.into(),
            audio_source: audio_source.into(),
        }
    }

    fn open_node(path: &Path) -> Result<File, MediaError> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => {
                    MediaError::PermissionDenied(format!("{}: {}", path.display(), e))
                }
                _ => MediaError::DeviceUnavailable(format!("{}: {}", path.display(), e)),
            })
    }
}

#[async_trait]
impl MediaDevice for V4l2Device {
    async fn open(&self, constraints: &MediaConstraints) -> Result<Box<dyn MediaStream>, MediaError> {
        if !constraints.audio && !constraints.video {
            return Err(MediaError::DeviceUnavailable(
                "no audio or video track requested".to_string(),
            ));
        }

        let mut tracks = Vec::with_capacity(2);
        let node = if constraints.video {
            let path = self.video_device.clone();
            let node = tokio::task::spawn_blocking(move || Self::open_node(&path))
                .await
                .map_err(|e| MediaError::DeviceUnavailable(e.to_string()))??;
            tracks.push(TrackSource {
                kind: TrackKind::Video,
                source: self.video_device.to_string_lossy().to_string(),
                enabled: true,
                resolution: Some((constraints.width, constraints.height)),
            });
            Some(node)
        } else {
            None
        };

        if constraints.audio {
            tracks.push(TrackSource {
                kind: TrackKind::Audio,
                source: self.audio_source.clone(),
                enabled: true,
                resolution: None,
            });
        }

        debug!(
            video = %self.video_device.display(),
            audio = %self.audio_source,
            "capture device opened"
        );
        Ok(Box::new(V4l2Stream {
            node,
            tracks,
            stopped: false,
        }))
    }
}

/// Open device stream; holding the node keeps the camera claimed
struct V4l2Stream {
    node: Option<File>,
    tracks: Vec<TrackSource>,
    stopped: bool,
}

impl MediaStream for V4l2Stream {
    fn tracks(&self) -> Vec<TrackSource> {
        if self.stopped {
            return Vec::new();
        }
        self.tracks.clone()
    }

    fn set_track_enabled(&mut self, kind: TrackKind, enabled: bool) -> Result<(), MediaError> {
        if self.stopped {
            return Err(MediaError::AlreadyReleased);
        }
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
        self.node = None;
        self.tracks.clear();
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
