//! Config command - view and validate DriveMirror configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use drivemirror_core::config::Config;

use crate::output::{OutputFormat, Reporter};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate the configuration file
    Validate,
}

impl ConfigCommand {
    pub async fn execute(
        &self,
        config: &Config,
        config_path: &Path,
        format: OutputFormat,
    ) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(config, config_path, format),
            ConfigCommand::Validate => self.execute_validate(config, config_path, format),
        }
    }

    fn execute_show(&self, config: &Config, config_path: &Path, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);

        if matches!(format, OutputFormat::Json) {
            let json = serde_json::to_value(config)
                .context("Failed to serialize configuration to JSON")?;
            reporter.document(&json);
        } else {
            reporter.status(&format!("Configuration ({})", config_path.display()));
            let yaml = serde_yaml::to_string(config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                println!("  {line}");
            }
        }
        Ok(())
    }

    fn execute_validate(
        &self,
        config: &Config,
        config_path: &Path,
        format: OutputFormat,
    ) -> Result<()> {
        let reporter = Reporter::new(format);
        let errors = config.validate();

        if matches!(format, OutputFormat::Json) {
            let report: Vec<serde_json::Value> = errors
                .iter()
                .map(|e| serde_json::json!({"field": e.field, "message": e.message}))
                .collect();
            reporter.document(&serde_json::json!({
                "path": config_path.display().to_string(),
                "valid": errors.is_empty(),
                "errors": report,
            }));
        } else if errors.is_empty() {
            reporter.status(&format!("{} is valid", config_path.display()));
        } else {
            for error in &errors {
                reporter.error(&error.to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("configuration has {} error(s)", errors.len())
        }
    }
}
