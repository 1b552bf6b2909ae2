//! Configuration and profile management for gcectl
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! This module provides a reusable configuration system for managing the
//! project, credentials and polling settings used against Compute Engine.
//!
//! # Features
//!
//! - Multiple named profiles for different projects
//! - Secure credential storage using OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod credential;
pub mod error;

// Re-export main types for convenience
pub use config::{
    ACCESS_TOKEN_ENV, API_URL_ENV, Config, PROJECT_ENV, PollingConfig, Profile, ResolvedProfile,
};
#[cfg(feature = "secure-storage")]
pub use credential::store_in_keyring;
pub use credential::{StoredToken, keyring_key};
pub use error::{ConfigError, Result};
