//! Configuration management for gcectl
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::credential::StoredToken;
use super::error::{ConfigError, Result};
use crate::client::{ComputeClient, DEFAULT_API_URL};
use crate::progress::PollSettings;

/// Environment variable overriding the profile's project
pub const PROJECT_ENV: &str = "GCECTL_PROJECT";
/// Environment variable overriding the profile's access token
pub const ACCESS_TOKEN_ENV: &str = "GCECTL_ACCESS_TOKEN";
/// Environment variable overriding the profile's API URL
pub const API_URL_ENV: &str = "GCECTL_API_URL";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is named on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Project every request is made against
    pub project: String,
    /// OAuth2 bearer token. Supports keyring: prefix for secure storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Compute API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// How operations are waited on
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Polling configuration stored in a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Milliseconds between operation refreshes
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Milliseconds before waiting gives up
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PollingConfig {
    pub fn to_settings(self) -> PollSettings {
        PollSettings::new(Duration::from_millis(self.timeout_ms))
            .with_interval(Duration::from_millis(self.interval_ms))
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// A profile with credentials resolved, ready to build a client from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    /// Profile name, or "environment" when built from env vars alone
    pub name: String,
    pub project: String,
    pub access_token: Option<String>,
    pub api_url: String,
    pub polling: PollingConfig,
}

impl Profile {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            access_token: None,
            api_url: default_api_url(),
            polling: PollingConfig::default(),
        }
    }

    /// Check if this profile has a stored token
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Resolve keyring references into a [`ResolvedProfile`]
    pub fn resolve(&self, name: &str) -> Result<ResolvedProfile> {
        if self.project.trim().is_empty() {
            return Err(ConfigError::MissingProject {
                name: name.to_string(),
            });
        }

        let access_token = self
            .access_token
            .as_deref()
            .map(|token| {
                StoredToken::parse(token).resolve().map_err(|e| {
                    ConfigError::CredentialError(format!("Failed to resolve access token: {}", e))
                })
            })
            .transpose()?;

        Ok(ResolvedProfile {
            name: name.to_string(),
            project: self.project.clone(),
            access_token,
            api_url: self.api_url.clone(),
            polling: self.polling,
        })
    }
}

impl ResolvedProfile {
    /// Build a profile from `GCECTL_PROJECT` and friends, if the project is set
    pub fn from_env() -> Option<Self> {
        let project = std::env::var(PROJECT_ENV).ok().filter(|p| !p.is_empty())?;
        Some(
            Self {
                name: "environment".to_string(),
                project,
                access_token: None,
                api_url: default_api_url(),
                polling: PollingConfig::default(),
            }
            .with_env_overrides(),
        )
    }

    /// Apply `GCECTL_PROJECT`, `GCECTL_ACCESS_TOKEN` and `GCECTL_API_URL`
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        if let Some(project) = var(PROJECT_ENV) {
            self.project = project;
        }
        if let Some(token) = var(ACCESS_TOKEN_ENV) {
            self.access_token = Some(token);
        }
        if let Some(url) = var(API_URL_ENV) {
            self.api_url = url;
        }
        self
    }

    /// Poll settings from the profile's polling table
    pub fn poll_settings(&self) -> PollSettings {
        self.polling.to_settings()
    }

    /// Build a Compute client for this profile
    pub fn client(&self) -> crate::Result<ComputeClient> {
        ComputeClient::new(&self.api_url, &self.project, self.access_token.clone())
    }
}

impl Config {
    /// Resolve the name of the profile to use
    ///
    /// Resolution order:
    /// 1. The explicitly named profile
    /// 2. `default_profile`
    /// 3. The only configured profile
    pub fn resolve_profile_name(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        match names.len() {
            0 => Err(ConfigError::NoProfileSelected {
                suggestion: "Use 'gcectl profile set' to create a profile.".to_string(),
            }),
            1 => Ok(names[0].to_string()),
            _ => {
                names.sort();
                Err(ConfigError::NoProfileSelected {
                    suggestion: format!(
                        "Available profiles: {}. Pass --profile or set a default with 'gcectl profile set --default'.",
                        names.join(", ")
                    ),
                })
            }
        }
    }

    /// Resolve a profile and its credentials
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<ResolvedProfile> {
        let name = self.resolve_profile_name(explicit_profile)?;
        let profile = self
            .profiles
            .get(&name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.clone() })?;
        profile.resolve(&name)
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/gcectl/config.toml` is used when that directory
    /// exists, otherwise the platform default.
    ///
    /// On Linux: ~/.config/gcectl/config.toml
    /// On Windows: %APPDATA%\gcectl\gcectl\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("gcectl")
                    .join("config.toml");

                if linux_style_path
                    .parent()
                    .map(|p| p.exists())
                    .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "gcectl", "gcectl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default}. Unset variables without a default
    /// are left as-is so profiles that are not used still parse.
    ///
    /// Example:
    /// ```toml
    /// [profiles.prod]
    /// project = "${PROD_PROJECT}"
    /// access_token = "${GOOGLE_OAUTH_ACCESS_TOKEN}"
    /// api_url = "${COMPUTE_API:-https://compute.googleapis.com/compute/v1}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
