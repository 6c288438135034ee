use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix for overrides, e.g. `VIDSPEAK_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "VIDSPEAK_";

/// Load configuration from file with environment variable overrides.
///
/// When `required` is false a missing file is not an error and the defaults
/// (plus environment overrides) are used instead.
pub fn load_config(path: &Path, required: bool) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else if required {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
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
[server]
port = 9000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_config_from_str_invalid_type() {
        let toml = r#"
[server]
port = "not a number"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_required_file_not_found() {
        let result = load_config(Path::new("/nonexistent/vidspeak.toml"), true);
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_optional_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/vidspeak.toml"), false).unwrap();
        assert_eq!(config.pipeline.max_concurrent, 4);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[encoder]
timeout_secs = 42
"#
        )
        .unwrap();

        let config = load_config(temp_file.path(), true).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.encoder.timeout_secs, 42);
    }
}
