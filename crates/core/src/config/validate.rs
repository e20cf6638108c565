use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Render server port is not 0
/// - Template refresh is only enabled with a template path
/// - Output and capture dimensions are positive and even (yuv420p)
/// - Encoder framerate is positive
/// - Queue capacities and dispatch concurrency are positive
/// - Finished directory differs from the staging root
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.render_server.port == 0 {
        return Err(invalid("render_server.port cannot be 0"));
    }

    if config.render_server.refresh_template && config.render_server.template_path.is_none() {
        return Err(invalid(
            "render_server.refresh_template requires render_server.template_path",
        ));
    }

    check_dimension("encoder.width", config.encoder.width)?;
    check_dimension("encoder.height", config.encoder.height)?;
    check_dimension("capture.window_width", config.capture.window_width)?;
    check_dimension("capture.window_height", config.capture.window_height)?;

    if config.encoder.framerate == 0 {
        return Err(invalid("encoder.framerate must be greater than 0"));
    }

    let orchestrator = &config.orchestrator;
    for (name, value) in [
        ("orchestrator.input_queue_capacity", orchestrator.input_queue_capacity),
        ("orchestrator.stage_queue_capacity", orchestrator.stage_queue_capacity),
        (
            "orchestrator.max_concurrent_dispatches",
            orchestrator.max_concurrent_dispatches,
        ),
    ] {
        if value == 0 {
            return Err(invalid(&format!("{} must be greater than 0", name)));
        }
    }

    if config.staging.finished_dir == config.staging.root {
        return Err(invalid("staging.finished_dir must differ from staging.root"));
    }

    Ok(())
}

fn check_dimension(name: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value % 2 != 0 {
        return Err(invalid(&format!(
            "{} must be a positive even number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_validate_default_config() {
        assert_ok!(validate_config(&Config::default()));
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.render_server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_refresh_without_template_fails() {
        let mut config = Config::default();
        config.render_server.refresh_template = true;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("template_path"));

        config.render_server.template_path = Some("page.html".into());
        assert_ok!(validate_config(&config));
    }

    #[test]
    fn test_validate_odd_width_fails() {
        let mut config = Config::default();
        config.encoder.width = 1921;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("encoder.width"));
    }

    #[test]
    fn test_validate_zero_capacity_fails() {
        let mut config = Config::default();
        config.orchestrator.stage_queue_capacity = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("stage_queue_capacity"));
    }

    #[test]
    fn test_validate_zero_framerate_fails() {
        let mut config = Config::default();
        config.encoder.framerate = 0;
        assert_err!(validate_config(&config));
    }

    #[test]
    fn test_validate_finished_dir_equal_to_staging_root_fails() {
        let mut config = Config::default();
        config.staging.finished_dir = config.staging.root.clone();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("finished_dir"));
    }
}
