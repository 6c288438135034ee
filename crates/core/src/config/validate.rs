use super::{types::Config, ConfigError};
use crate::synthesizer::SynthesizerBackend;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Pipeline admits at least one request
/// - Delegate timeouts and the image size cap are non-zero
/// - The openai synthesizer has an API key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.pipeline.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.max_concurrent must be at least 1".to_string(),
        ));
    }

    let timeouts = [
        ("fetcher.timeout_secs", config.fetcher.timeout_secs),
        ("synthesizer.timeout_secs", config.synthesizer.timeout_secs),
        ("encoder.timeout_secs", config.encoder.timeout_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be 0",
                name
            )));
        }
    }

    if config.fetcher.max_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.max_bytes cannot be 0".to_string(),
        ));
    }

    if config.synthesizer.backend == SynthesizerBackend::Openai
        && config
            .synthesizer
            .openai
            .api_key
            .as_deref()
            .map_or(true, str::is_empty)
    {
        return Err(ConfigError::ValidationError(
            "synthesizer.openai.api_key is required when backend = \"openai\"".to_string(),
        ));
    }

    Ok(())
}
