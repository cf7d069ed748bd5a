//! Recording infrastructure module
//!
//! Encodes the capture device into AAC/M4A through an FFmpeg child process.

#[cfg(unix)]
mod ffmpeg;

#[cfg(unix)]
pub use ffmpeg::{FfmpegEncoder, DEFAULT_FFMPEG_PROGRAM};
