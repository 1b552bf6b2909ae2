//! Access tokens held in the OS keyring
//!
//! A profile's `access_token` is either the bearer token itself or a
//! `keyring:<key>` reference into the `gcectl` keyring service. Reading or
//! writing the keyring needs the `secure-storage` feature.

use super::error::{ConfigError, Result};

/// Prefix marking a token stored in the keyring
const KEYRING_PREFIX: &str = "keyring:";

#[cfg(feature = "secure-storage")]
const SERVICE_NAME: &str = "gcectl";

/// A profile's `access_token` value as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredToken<'a> {
    /// The bearer token itself
    Plain(&'a str),
    /// Key of the keyring entry holding the token
    Keyring(&'a str),
}

impl<'a> StoredToken<'a> {
    pub fn parse(value: &'a str) -> Self {
        match value.strip_prefix(KEYRING_PREFIX) {
            Some(key) => Self::Keyring(key),
            None => Self::Plain(value),
        }
    }

    pub fn is_keyring(&self) -> bool {
        matches!(self, Self::Keyring(_))
    }

    /// The bearer token to send, read from the keyring if needed
    pub fn resolve(&self) -> Result<String> {
        match *self {
            Self::Plain(token) => Ok(token.to_string()),
            Self::Keyring(key) => read_keyring(key),
        }
    }

    /// Delete the keyring entry behind this token, if any
    ///
    /// An entry that is already gone is not an error.
    pub fn forget(&self) -> Result<()> {
        match *self {
            Self::Plain(_) => Ok(()),
            Self::Keyring(key) => delete_keyring(key),
        }
    }
}

/// Keyring entry name for a profile's access token
pub fn keyring_key(profile: &str) -> String {
    format!("{}-access-token", profile)
}

/// Save a profile's token in the keyring
///
/// Returns the `keyring:` reference to write into the profile.
#[cfg(feature = "secure-storage")]
pub fn store_in_keyring(profile: &str, token: &str) -> Result<String> {
    let key = keyring_key(profile);
    entry(&key)?.set_password(token).map_err(|e| {
        ConfigError::KeyringError(format!(
            "Failed to store access token for '{}': {}",
            profile, e
        ))
    })?;
    Ok(format!("{}{}", KEYRING_PREFIX, key))
}

#[cfg(feature = "secure-storage")]
fn entry(key: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, key).map_err(|e| ConfigError::KeyringError(e.to_string()))
}

#[cfg(feature = "secure-storage")]
fn read_keyring(key: &str) -> Result<String> {
    entry(key)?.get_password().map_err(|e| {
        ConfigError::KeyringError(format!("Failed to read '{}' from keyring: {}", key, e))
    })
}

#[cfg(not(feature = "secure-storage"))]
fn read_keyring(key: &str) -> Result<String> {
    Err(ConfigError::CredentialError(format!(
        "Access token '{}' is in the keyring but secure-storage is not enabled",
        key
    )))
}

#[cfg(feature = "secure-storage")]
fn delete_keyring(key: &str) -> Result<()> {
    match entry(key)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ConfigError::KeyringError(format!(
            "Failed to delete '{}' from keyring: {}",
            key, e
        ))),
    }
}

#[cfg(not(feature = "secure-storage"))]
fn delete_keyring(_key: &str) -> Result<()> {
    Ok(())
}
