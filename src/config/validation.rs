//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::Config,
};
use colored::Colorize;

/// Shortest timeout that leaves room for a full download and upload run
const RECOMMENDED_MIN_TIMEOUT_SECS: u64 = 30;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Hard checks from [`Config::validate`] plus advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_timeout(config));
        warnings.extend(Self::validate_static_dir(config));
        warnings.extend(Self::validate_listener(config));
        warnings.extend(Self::validate_measurement_target(config));

        Ok(warnings)
    }

    fn validate_timeout(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.timeout_seconds < RECOMMENDED_MIN_TIMEOUT_SECS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Timeout of {}s is shorter than a typical speedtest run (20-40s); most probes will time out",
                    config.timeout_seconds
                ),
            ));
        }

        warnings
    }

    fn validate_static_dir(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if !config.static_dir.is_dir() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Static directory '{}' does not exist; every path other than /probe will return 404",
                    config.static_dir.display()
                ),
            ));
        }

        warnings
    }

    fn validate_listener(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.port < 1024 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Port {} is privileged and may require elevated permissions", config.port),
            ));
        }

        if let Ok(address) = config.listen_socket_addr() {
            if address.ip().is_loopback() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Listening on loopback address {}; remote scrapers cannot reach it", address.ip()),
                ));
            }
        }

        warnings
    }

    fn validate_measurement_target(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.server_id == Some(0) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Server id 0 means automatic server selection".to_string(),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> &'static str {
        match self {
            Self::Info => "blue",
            Self::Warning => "yellow",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
