//! Configuration domain

mod app_config;

pub use app_config::{
    AppConfig, CaptureConfig, UserConfig, DEFAULT_AUDIO_SOURCE, DEFAULT_BACKEND_URL,
    DEFAULT_POLL_MAX_ATTEMPTS, DEFAULT_UPLOAD_RETRIES, DEFAULT_VIDEO_DEVICE,
};
