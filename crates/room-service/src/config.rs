//! Room Service configuration.
//!
//! Configuration is loaded from environment variables once at startup and
//! passed by reference afterwards. The server tag catalog lives here so the
//! routing policy never reads process-wide state.

use crate::models::{FallbackMode, ServerTagConfig};
use common::types::RoleId;
use std::collections::{HashMap, HashSet};
use std::env;
use thiserror::Error;
use uuid::Uuid;

/// Default origin version reported in meeting metadata.
pub const DEFAULT_VERSION_TAG: &str = "v3";

/// Default locale for moderator messages.
pub const DEFAULT_LOCALE: &str = "en";

/// Room Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin version reported as `meta_bbb-origin-version`.
    pub version_tag: String,

    /// Locale used when the acting user has none.
    pub default_locale: String,

    /// Server tag catalog and fallback mode.
    pub server_tags: ServerTagConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_tag: DEFAULT_VERSION_TAG.to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
            server_tags: ServerTagConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server tag configuration: {0}")]
    InvalidServerTags(String),

    #[error("Invalid server tag role configuration: {0}")]
    InvalidServerTagRoles(String),

    #[error("Invalid server tag fallback mode: {0}")]
    InvalidFallbackMode(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let version_tag = vars
            .get("VERSION_TAG")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_VERSION_TAG.to_string());

        let default_locale = vars
            .get("DEFAULT_LOCALE")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let names = match vars.get("SERVER_TAG_NAMES") {
            Some(value) => parse_tag_names(value)?,
            None => HashMap::new(),
        };

        let roles = match vars.get("SERVER_TAG_ROLES") {
            Some(value) => parse_tag_roles(value)?,
            None => HashMap::new(),
        };

        let fallback_mode = match vars.get("SERVER_TAG_FALLBACK_MODE") {
            Some(value) => parse_fallback_mode(value)?,
            None => FallbackMode::Unset,
        };

        Ok(Config {
            version_tag,
            default_locale,
            server_tags: ServerTagConfig {
                names,
                roles,
                fallback_mode,
            },
        })
    }
}

/// Split a `tag:value,tag2:value2` list into pairs.
fn parse_tag_pairs(value: &str) -> Result<Vec<(String, String)>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (tag, rest) = entry
                .split_once(':')
                .ok_or_else(|| format!("entry '{}' must have the form tag:value", entry))?;
            let tag = tag.trim();
            if tag.is_empty() {
                return Err(format!("entry '{}' has an empty tag name", entry));
            }
            Ok((tag.to_string(), rest.trim().to_string()))
        })
        .collect()
}

fn parse_tag_names(value: &str) -> Result<HashMap<String, String>, ConfigError> {
    let pairs = parse_tag_pairs(value)
        .map_err(|msg| ConfigError::InvalidServerTags(format!("SERVER_TAG_NAMES {}", msg)))?;

    Ok(pairs.into_iter().collect())
}

fn parse_tag_roles(value: &str) -> Result<HashMap<String, HashSet<RoleId>>, ConfigError> {
    let pairs = parse_tag_pairs(value)
        .map_err(|msg| ConfigError::InvalidServerTagRoles(format!("SERVER_TAG_ROLES {}", msg)))?;

    let mut roles: HashMap<String, HashSet<RoleId>> = HashMap::new();
    for (tag, role_list) in pairs {
        let allowed = roles.entry(tag.clone()).or_default();
        for role in role_list.split('/').map(str::trim).filter(|r| !r.is_empty()) {
            let id = Uuid::parse_str(role).map_err(|e| {
                ConfigError::InvalidServerTagRoles(format!(
                    "SERVER_TAG_ROLES role for tag '{}' must be a UUID, got '{}': {}",
                    tag, role, e
                ))
            })?;
            allowed.insert(RoleId(id));
        }
    }

    Ok(roles)
}

fn parse_fallback_mode(value: &str) -> Result<FallbackMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "unset" => Ok(FallbackMode::Unset),
        "required" => Ok(FallbackMode::Required),
        "desired" => Ok(FallbackMode::Desired),
        other => Err(ConfigError::InvalidFallbackMode(format!(
            "SERVER_TAG_FALLBACK_MODE must be 'required', 'desired' or unset, got '{}'",
            other
        ))),
    }
}
