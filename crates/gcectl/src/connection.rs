//! Connection management: from profile to authenticated Compute client

use crate::error::Result as CliResult;
use anyhow::Context;
use gcectl_core::config::ConfigError;
use gcectl_core::{ComputeClient, Config, PollSettings, ResolvedProfile};
use tracing::{debug, info, trace};

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<std::path::PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<std::path::PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Resolve the profile to use, with environment variable override support
    ///
    /// When --config-file is explicitly specified, environment variables are
    /// ignored so an isolated config behaves the same everywhere.
    pub fn resolve_profile(&self, profile_name: Option<&str>) -> CliResult<ResolvedProfile> {
        trace!("Profile name: {:?}", profile_name);
        let use_env_vars = self.config_path.is_none();
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        match self.config.resolve_profile(profile_name) {
            Ok(profile) => {
                info!("Using profile: {}", profile.name);
                Ok(if use_env_vars {
                    profile.with_env_overrides()
                } else {
                    profile
                })
            }
            Err(e @ ConfigError::NoProfileSelected { .. }) if use_env_vars => {
                match ResolvedProfile::from_env() {
                    Some(profile) => {
                        info!("Using project from environment variables");
                        Ok(profile)
                    }
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create a Compute client and the poll settings of the resolved profile
    pub fn create_client(
        &self,
        profile_name: Option<&str>,
    ) -> CliResult<(ComputeClient, PollSettings)> {
        let profile = self.resolve_profile(profile_name)?;
        debug!(
            project = %profile.project,
            api_url = %profile.api_url,
            authenticated = profile.access_token.is_some(),
            "Creating Compute client"
        );
        let client = profile.client()?;
        Ok((client, profile.poll_settings()))
    }
}
