//! Configuration commands.
//!
//! - `config show`: Display the effective configuration
//! - `config set`: Set a configuration value
//! - `config get`: Print one configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{Config, PROJECT_URL_ENV, SUPPORT_URL_ENV};
use crate::error::Result;

fn source(env: &str) -> &'static str {
    match std::env::var(env) {
        Ok(value) if !value.trim().is_empty() => "environment",
        _ => "config file",
    }
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let json_output = json!({
        "support": {
            "url": config.support_url(),
            "source": source(SUPPORT_URL_ENV),
        },
        "project": {
            "url": config.project_url(),
            "source": source(PROJECT_URL_ENV),
        },
        "remote": {
            "timeout": config.remote_timeout,
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}:\n", "support".cyan()));
    text_output.push_str(&format!(
        "  url: {} {}\n",
        config.support_url(),
        format!("({})", source(SUPPORT_URL_ENV)).dimmed()
    ));
    text_output.push_str(&format!("{}:\n", "project".cyan()));
    text_output.push_str(&format!(
        "  url: {} {}\n",
        config.project_url(),
        format!("({})", source(PROJECT_URL_ENV)).dimmed()
    ));
    text_output.push_str(&format!("{}:\n", "remote".cyan()));
    text_output.push_str(&format!("  timeout: {}s\n", config.remote_timeout));

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let stored = config.get(key)?;
    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": stored,
        "success": true,
    }))
    .with_text(format!("Set {} = {}", key.cyan(), stored))
    .print(output)
}

/// Get a configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;

    CommandOutput::new(json!({
        "key": key,
        "value": value,
    }))
    .with_text(value)
    .print(output)
}
