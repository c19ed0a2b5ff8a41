//! YAML configuration file support for the desk.
//!
//! One file describes where aggregate state lives, the validation limits and
//! how hard a flush tries before giving up.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "front desk"
//!
//! storage:
//!   backend: "files"
//!   data_dir: "/var/lib/msgdesk"
//!   layout:
//!     messages: "StoredMessages.json"
//!
//! validation:
//!   sms_max_chars: 140
//!   tweet_max_chars: 140
//!   email_max_chars: 1028
//!   subject_max_chars: 20
//!   sir_subject_chars: 12
//!
//! flush:
//!   attempts: 3
//! ```
//!
//! Every section is optional. Omitted sections take their defaults, which
//! means an in-memory desk with the standard limits.

use std::fs;
use std::path::{Path, PathBuf};

use ingest::ValidationConfig;
use serde::{Deserialize, Serialize};
use store::{FileLayout, GatewayConfig};
use thiserror::Error;

use crate::{DeskOptions, DEFAULT_FLUSH_ATTEMPTS};

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for a desk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DeskConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub storage: StorageYamlConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub flush: FlushYamlConfig,
}

impl DeskConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: DeskConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Render back to YAML, e.g. to write out a starter file.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.storage.validate()?;
        self.validation
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("validation: {err}")))?;
        self.flush.validate()?;

        Ok(())
    }

    /// Gateway selection derived from the `storage` section.
    pub fn gateway_config(&self) -> GatewayConfig {
        match self.storage.backend {
            StorageBackend::InMemory => GatewayConfig::InMemory,
            StorageBackend::Files => GatewayConfig::Files {
                dir: self.storage.data_dir.clone(),
                layout: self.storage.layout.clone(),
            },
        }
    }

    pub fn desk_options(&self) -> DeskOptions {
        DeskOptions {
            validation: self.validation.clone(),
            flush_attempts: self.flush.attempts,
        }
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            storage: StorageYamlConfig::default(),
            validation: ValidationConfig::default(),
            flush: FlushYamlConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Files,
    #[default]
    InMemory,
}

/// Storage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageYamlConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding the CSV and JSON files. Required for `files`.
    #[serde(default)]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub layout: FileLayout,
}

impl StorageYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.backend == StorageBackend::Files && self.data_dir.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "storage.data_dir is required when backend is 'files'".to_string(),
            ));
        }

        let layout = &self.layout;
        let names = [
            ("sir", &layout.sir),
            ("trending", &layout.trending),
            ("mentions", &layout.mentions),
            ("quarantine", &layout.quarantine),
            ("messages", &layout.messages),
            ("abbreviations", &layout.abbreviations),
        ];
        for (field, name) in names {
            if name.trim().is_empty() {
                return Err(ConfigLoadError::Validation(format!(
                    "storage.layout.{field} must not be empty"
                )));
            }
        }

        Ok(())
    }
}

impl Default for StorageYamlConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            data_dir: PathBuf::new(),
            layout: FileLayout::default(),
        }
    }
}

/// Flush YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlushYamlConfig {
    /// Attempts per file write before the write is left pending.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

impl FlushYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.attempts == 0 {
            return Err(ConfigLoadError::Validation(
                "flush.attempts must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FlushYamlConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
        }
    }
}

fn default_attempts() -> u32 {
    DEFAULT_FLUSH_ATTEMPTS
}
