use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::assembler::EncoderConfig;
use crate::generator::{CaptureConfig, SpeechConfig};
use crate::orchestrator::OrchestratorConfig;
use crate::staging::StagingConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub render_server: RenderServerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

/// Render server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Page template file; the built-in layout is used when unset.
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    /// Re-read `template_path` before every render.
    #[serde(default)]
    pub refresh_template: bool,
}

impl Default for RenderServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            template_path: None,
            refresh_template: false,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    3000
}

/// Content source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Directory of `*.json` content trees fed to the orchestrator.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("tales")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splicer::ConcatOrder;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render_server.port, 3000);
        assert_eq!(config.render_server.template_path, None);
        assert!(!config.render_server.refresh_template);
        assert_eq!(config.content.input_dir, PathBuf::from("tales"));
        assert_eq!(config.encoder.output_extension, "mkv");
        assert_eq!(config.staging.concat_order, ConcatOrder::OwnFirst);
        assert!(!config.staging.keep_staging);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let toml = r#"
[encoder]
crf = 23

[staging]
concat_order = "reversed"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.encoder.crf, 23);
        assert_eq!(config.encoder.framerate, 2);
        assert_eq!(config.encoder.video_codec, "libx264");
        assert_eq!(config.staging.concat_order, ConcatOrder::Reversed);
        assert_eq!(config.staging.finished_dir, PathBuf::from("finished"));
    }

    #[test]
    fn test_render_template_settings() {
        let toml = r#"
[render_server]
template_path = "templates/page.html"
refresh_template = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.render_server.template_path,
            Some(PathBuf::from("templates/page.html"))
        );
        assert!(config.render_server.refresh_template);
        assert_eq!(config.render_server.port, 3000);
    }

    #[test]
    fn test_unknown_concat_order_rejected() {
        let toml = r#"
[staging]
concat_order = "children_first"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
