//! Capture infrastructure module
//!
//! Opens the V4L2 camera and PulseAudio source and records answers to
//! WebM through FFmpeg.

mod device;
mod ffmpeg;

pub use device::V4l2Device;
pub use ffmpeg::FfmpegRecorder;
