//! Configuration for the ffmpeg-based encoder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Video codec used when muxing a unit.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Frame rate of the looped still image.
    #[serde(default = "default_framerate")]
    pub framerate: u32,

    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default = "default_tune")]
    pub tune: String,

    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Output frame width; the image is scaled down and padded to fit.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output frame height.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Padding color around letterboxed images.
    #[serde(default = "default_pad_color")]
    pub pad_color: String,

    #[serde(default = "default_pix_fmt")]
    pub pix_fmt: String,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timeout for a single invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Container extension of segments and artifacts.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_framerate() -> u32 {
    2
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_tune() -> String {
    "stillimage".to_string()
}

fn default_crf() -> u8 {
    18
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_pad_color() -> String {
    "#333333".to_string()
}

fn default_pix_fmt() -> String {
    "yuv420p".to_string()
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_timeout() -> u64 {
    600
}

fn default_output_extension() -> String {
    "mkv".to_string()
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            video_codec: default_video_codec(),
            framerate: default_framerate(),
            preset: default_preset(),
            tune: default_tune(),
            crf: default_crf(),
            width: default_width(),
            height: default_height(),
            pad_color: default_pad_color(),
            pix_fmt: default_pix_fmt(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            output_extension: default_output_extension(),
        }
    }
}
