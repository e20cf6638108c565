use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "TALES_CONFIG";

/// Configuration file used when `TALES_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "tales.toml";

/// Path of the configuration file, from `TALES_CONFIG` or the default.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from file with environment variable overrides.
///
/// Overrides use `TALES_` plus the section and key separated by a double
/// underscore, e.g. `TALES_ENCODER__CRF=23`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("TALES_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[render_server]
port = 9000

[orchestrator]
max_concurrent_dispatches = 4
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.render_server.port, 9000);
        assert_eq!(config.orchestrator.max_concurrent_dispatches, 4);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[render_server]
port = "not a port"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/tales.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[render_server]
host = "127.0.0.1"
port = 3100

[capture]
render_url = "http://127.0.0.1:3100"
window_width = 1280
window_height = 720

[content]
input_dir = "/srv/tales"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.render_server.port, 3100);
        assert_eq!(config.render_server.host.to_string(), "127.0.0.1");
        assert_eq!(config.capture.window_width, 1280);
        assert_eq!(config.content.input_dir, PathBuf::from("/srv/tales"));
    }
}
