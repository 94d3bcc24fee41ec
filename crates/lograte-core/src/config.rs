//! Configuration file parsing for lograte
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{LineFlags, LogLevel, Rotation};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Non-file output of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
}

impl std::str::FromStr for OutputTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(OutputTarget::Stdout),
            "stderr" => Ok(OutputTarget::Stderr),
            _ => Err(Error::config(format!("Invalid output: {}", s))),
        }
    }
}

/// Configuration file structure (lograte.toml/yaml/json)
#[derive(Debug, Deserialize, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Single backend configuration from config file
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub name: String,
    /// Log file; when absent the backend writes to `output`
    pub path: Option<PathBuf>,
    /// stdout or stderr
    pub output: Option<String>,
    /// Level name (fatal, error, warn, info, debug); anything else enables all
    pub level: Option<String>,
    /// Defaults to true for stdout/stderr and false for files
    pub colored: Option<bool>,
    /// Line metadata flags, defaults to date + time
    pub flags: Option<Vec<String>>,
    #[serde(default)]
    pub prefix: String,
    /// none, daily, hourly or size
    pub rotate: Option<String>,
    /// Threshold in bytes for size rotation
    pub rotate_size: Option<u64>,
}

impl BackendConfig {
    /// A console backend with every option left at its default
    pub fn console(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            output: None,
            level: None,
            colored: None,
            flags: None,
            prefix: String::new(),
            rotate: None,
            rotate_size: None,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
            .as_deref()
            .map(LogLevel::from_level_name)
            .unwrap_or_default()
    }

    pub fn flags(&self) -> Result<LineFlags> {
        match &self.flags {
            Some(names) => LineFlags::from_names(names),
            None => Ok(LineFlags::default()),
        }
    }

    pub fn output_target(&self) -> Result<OutputTarget> {
        match &self.output {
            Some(output) => output.parse(),
            None => Ok(OutputTarget::default()),
        }
    }

    pub fn is_colored(&self) -> bool {
        self.colored.unwrap_or(self.path.is_none())
    }

    pub fn rotation(&self) -> Result<Rotation> {
        let rotation = match &self.rotate {
            Some(mode) => Rotation::parse(mode, self.rotate_size)?,
            None => Rotation::None,
        };
        if rotation != Rotation::None && self.path.is_none() {
            return Err(Error::ConfigError(format!(
                "Backend '{}' rotates but has no path",
                self.name
            )));
        }
        Ok(rotation)
    }

    /// Check every field without building anything
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Backend name must not be empty"));
        }
        self.flags()?;
        self.output_target()?;
        self.rotation()?;
        Ok(())
    }
}

impl LogConfig {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: LogConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// First of the known config file names present in `dir`
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Find and load config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        let path = Self::discover(dir).ok_or_else(|| {
            Error::ConfigError(format!(
                "No config file found in {}. Expected one of: {:?}",
                dir.display(),
                CONFIG_FILES
            ))
        })?;
        let config = Self::load(&path)?;
        Ok((config, path))
    }

    /// Validate every backend and reject duplicate names
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for backend in &self.backends {
            backend.validate()?;
            if !seen.insert(backend.name.as_str()) {
                return Err(Error::ConfigError(format!(
                    "Duplicate backend name: {}",
                    backend.name
                )));
            }
        }
        Ok(())
    }
}
