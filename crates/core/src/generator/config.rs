//! Configuration for the generation back-ends.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the HTTP speech back-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Full URL of the synthesis endpoint.
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,

    /// Voice identifier passed as `speaker`.
    #[serde(default = "default_speaker")]
    pub speaker: String,

    /// Speaking style passed as `style`.
    #[serde(default = "default_style")]
    pub style: String,

    /// Request timeout in seconds.
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,
}

fn default_speech_endpoint() -> String {
    "http://localhost:5002/api/tts".to_string()
}

fn default_speaker() -> String {
    "p273".to_string()
}

fn default_style() -> String {
    "neutral".to_string()
}

fn default_speech_timeout() -> u64 {
    60
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: default_speech_endpoint(),
            speaker: default_speaker(),
            style: default_style(),
            timeout_secs: default_speech_timeout(),
        }
    }
}

/// Configuration for the headless-browser capture back-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Path to the chromium (or compatible) binary.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Base URL of the render server, without trailing slash.
    #[serde(default = "default_render_url")]
    pub render_url: String,

    /// Viewport width in pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Viewport height in pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Directory for screenshot scratch files.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Timeout for a single capture in seconds.
    #[serde(default = "default_capture_timeout")]
    pub timeout_secs: u64,

    /// Additional browser arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_program() -> PathBuf {
    PathBuf::from("chromium")
}

fn default_render_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("tales-capture")
}

fn default_capture_timeout() -> u64 {
    60
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            render_url: default_render_url(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            scratch_dir: default_scratch_dir(),
            timeout_secs: default_capture_timeout(),
            extra_args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_config_partial_toml() {
        let config: SpeechConfig = toml::from_str(r#"speaker = "p225""#).unwrap();
        assert_eq!(config.speaker, "p225");
        assert_eq!(config.style, "neutral");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_capture_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 1080);
        assert_eq!(config.program, PathBuf::from("chromium"));
        assert_eq!(config.render_url, "http://127.0.0.1:3000");
    }
}
