//! Notifier configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! [trigger]
//! alignment_status = "Awaiting"
//! service_status = "Pending"
//!
//! [recipients]
//! alignment_roles = ["aligner", "manager"]
//! service_role = "mechanic"
//!
//! [alignment]
//! title = "New Alignment Queue"
//! icon = "icons/icon-192x192.png"
//! link = "/"
//!
//! [service]
//! title = "New Service Assigned!"
//! icon = "icons/icon01.png"
//! link = "/"
//! fallback_description = "See details"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Role;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub trigger: TriggerConfig,
    pub recipients: RecipientConfig,
    pub alignment: AlignmentTemplate,
    pub service: ServiceTemplate,
}

/// Statuses whose entry edge triggers a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub alignment_status: String,
    pub service_status: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            alignment_status: "Awaiting".to_string(),
            service_status: "Pending".to_string(),
        }
    }
}

/// Role scoping for recipient resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipientConfig {
    /// Broadcast group for alignment events.
    pub alignment_roles: Vec<Role>,
    /// Role the assigned worker must be registered under.
    pub service_role: Role,
}

impl Default for RecipientConfig {
    fn default() -> Self {
        Self {
            alignment_roles: vec![Role::Aligner, Role::Manager],
            service_role: Role::Mechanic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentTemplate {
    pub title: String,
    pub icon: Option<String>,
    pub link: Option<String>,
}

impl Default for AlignmentTemplate {
    fn default() -> Self {
        Self {
            title: "New Alignment Queue".to_string(),
            icon: Some("icons/icon-192x192.png".to_string()),
            link: Some("/".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTemplate {
    pub title: String,
    pub icon: Option<String>,
    pub link: Option<String>,
    /// Used when the job has no description.
    pub fallback_description: String,
}

impl Default for ServiceTemplate {
    fn default() -> Self {
        Self {
            title: "New Service Assigned!".to_string(),
            icon: Some("icons/icon01.png".to_string()),
            link: Some("/".to_string()),
            fallback_description: "See details".to_string(),
        }
    }
}

impl NotifierConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: NotifierConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.alignment_status.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "trigger.alignment_status must not be empty".to_string(),
            ));
        }
        if self.trigger.service_status.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "trigger.service_status must not be empty".to_string(),
            ));
        }
        if self.recipients.alignment_roles.is_empty() {
            return Err(ConfigError::Invalid(
                "recipients.alignment_roles must name at least one role".to_string(),
            ));
        }
        Ok(())
    }
}
