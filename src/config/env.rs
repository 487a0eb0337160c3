//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    ///
    /// Variables already present in the environment win over the file.
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Example .env file listing every supported variable, commented out
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# Prometheus Speedtest Exporter Configuration\n\
             #\n\
             # Command-line arguments override these values. Variables already set\n\
             # in the environment take precedence over this file.\n\n",
        );

        for (var, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("# {}\n# {}={}\n\n", description, var, example));
        }

        content
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SPEEDTEST_ADDRESS", "Address the HTTP server listens on", "0.0.0.0"),
            ("SPEEDTEST_PORT", "Port the HTTP server listens on", "9516"),
            ("SPEEDTEST_SERVER_ID", "Speedtest server id (empty for auto)", "1234"),
            ("SPEEDTEST_SOURCE_ADDRESS", "Local address for the measurement", "10.0.0.5"),
            ("SPEEDTEST_TIMEOUT_SECONDS", "Measurement timeout in seconds (1-900)", "120"),
            ("SPEEDTEST_COMMAND", "Command launching the speedtest tool", "speedtest"),
            ("SPEEDTEST_STATIC_DIR", "Directory for the status page", "static"),
            ("SPEEDTEST_BUSY_POLICY", "Probe behaviour while busy (queue, reject)", "queue"),
            ("LOG_LEVEL", "Minimum log level", "info"),
            ("LOG_FORMAT", "Log format (console, compact, json)", "console"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{clear_env, ENV_LOCK};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        assert!(content.starts_with("# Prometheus Speedtest Exporter Configuration"));
        for (name, _, example) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("# {}={}\n", name, example)), "missing {}", name);
        }
    }

    #[test]
    fn test_example_content_loads_as_empty_env_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", EnvManager::create_example_env_content()).unwrap();
        EnvManager::load_env_file_from(file.path(), false).unwrap();

        let port = std::env::var("SPEEDTEST_PORT");
        clear_env();
        assert!(port.is_err());
    }

    #[test]
    fn test_load_env_file_keeps_existing_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SPEEDTEST_PORT=9700").unwrap();
        writeln!(file, "SPEEDTEST_SERVER_ID=4321").unwrap();
        std::env::set_var("SPEEDTEST_SERVER_ID", "1111");

        EnvManager::load_env_file_from(file.path(), false).unwrap();
        let port = std::env::var("SPEEDTEST_PORT");
        let server_id = std::env::var("SPEEDTEST_SERVER_ID");
        clear_env();

        assert_eq!(port.as_deref(), Ok("9700"));
        assert_eq!(server_id.as_deref(), Ok("1111"));
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EnvManager::load_env_file_from(&dir.path().join(".env"), false).is_ok());
    }
}
