//! Logger setup for the host application

use crate::error::{JotbookError, Result};
use crate::infrastructure::Config;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Install a terminal logger at the configured level.
///
/// The library only logs through the `log` facade; call this once from the
/// application entry point. Fails if a logger is already installed.
pub fn init(config: &Config) -> Result<()> {
    let level = config.level_filter()?;
    let log_config = ConfigBuilder::new()
        .add_filter_allow_str("jotbook")
        .build();

    TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto)
        .map_err(|e| JotbookError::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected_before_install() {
        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::new()
        };
        assert!(matches!(init(&config), Err(JotbookError::Config(_))));
    }
}
