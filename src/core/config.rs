use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::core::error::{HarnessError, Result};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub report_name: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            report_name: "test".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Load a configuration file. `.toml` files are read as TOML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::ConfigError(format!("Config file not found: {}", path.display())));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| HarnessError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config = if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            toml::from_str::<Self>(&contents)
                .map_err(|e| HarnessError::ConfigError(format!("Failed to parse TOML config: {}", e)))?
        } else {
            serde_json::from_str::<Self>(&contents)
                .map_err(|e| HarnessError::ConfigError(format!("Failed to parse JSON config: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Override the report name, typically from the command line.
    pub fn with_report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_report_name(&self.report_name)
    }
}

pub(crate) fn validate_report_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HarnessError::InvalidArgument(
            "Report name cannot be null or empty".to_string(),
        ));
    }
    Ok(())
}
