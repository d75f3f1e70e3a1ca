// FILE: src/cli/config.rs

use crate::error::{InlineError, Result};
use crate::InlineOptions;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub base: Option<String>,
    pub relative: Option<bool>,
    pub include_paths: Option<Vec<String>>,
    pub compress: Option<bool>,
    pub parse_only_template: Option<bool>,
    pub less_command: Option<String>,
}

impl ConfigFile {
    /// Options from the file alone, defaults for anything it leaves out
    pub fn to_options(&self) -> InlineOptions {
        let defaults = InlineOptions::default();
        InlineOptions {
            base: self.base.clone().unwrap_or(defaults.base),
            relative: self.relative.unwrap_or(defaults.relative),
            include_paths: self.include_paths.clone().unwrap_or_default(),
            compress: self.compress.unwrap_or(defaults.compress),
            parse_only_template: self.parse_only_template.unwrap_or(defaults.parse_only_template),
            less_command: self.less_command.clone().unwrap_or(defaults.less_command),
        }
    }
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    log::info!("Loaded configuration from {}", config_path);
    let config_content = fs::read_to_string(config_path).map_err(|e| InlineError::FileNotFound {
        path: format!("Config file {}: {}", config_path, e),
    })?;

    parse(config_path, &config_content)
}

fn parse(config_path: &str, config_content: &str) -> Result<ConfigFile> {
    if config_path.ends_with(".json") {
        serde_json::from_str(config_content)
            .map_err(|e| InlineError::invalid_format(format!("Invalid JSON config: {}", e)))
    } else if config_path.ends_with(".toml") {
        toml::from_str(config_content)
            .map_err(|e| InlineError::invalid_format(format!("Invalid TOML config: {}", e)))
    } else {
        Err(InlineError::invalid_format("Config file must be .json or .toml format"))
    }
}
