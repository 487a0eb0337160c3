//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::Result,
    config::env::EnvManager,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(address) = &cli.address {
            config.listen_address = address.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if cli.server_id.is_some() {
            config.server_id = cli.server_id;
        }
        if let Some(source_address) = &cli.source_address {
            config.source_address = Some(source_address.clone());
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(command) = &cli.speedtest_command {
            config.speedtest_command = command.clone();
        }
        if let Some(static_dir) = &cli.static_dir {
            config.static_dir = static_dir.clone();
        }
        if let Some(policy) = cli.busy_policy {
            config.busy_policy = policy;
        }
        if let Some(level) = cli.log_level {
            config.log_level = level;
        }
        if let Some(format) = cli.log_format {
            config.log_format = format;
        }

        if cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Listen: {}:{}", config.listen_address, config.port));
    summary.push(format!(
        "Server: {}",
        config.server_id.filter(|id| *id != 0).map_or_else(|| "auto".to_string(), |id| id.to_string())
    ));
    summary.push(format!("Source Address: {}", config.source_address.as_deref().unwrap_or("default")));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Speedtest Command: {}", config.speedtest_command));
    summary.push(format!("Static Dir: {}", config.static_dir.display()));
    summary.push(format!("Busy Policy: {}", config.busy_policy));
    summary.push(format!("Log Level: {}", config.log_level.as_str()));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
