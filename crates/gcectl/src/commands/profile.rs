//! Profile management command implementations

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::GcectlError;
use crate::output;
use colored::Colorize;
use gcectl_core::config::StoredToken;
use gcectl_core::{Config, PollingConfig, Profile};
use serde_json::json;
use tracing::{debug, info, trace, warn};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &mut ConnectionManager,
    output_format: OutputFormat,
) -> Result<(), GcectlError> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            project,
            access_token,
            api_url,
            interval_ms,
            timeout_ms,
            default,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            let mut profile = conn_mgr
                .config
                .profiles
                .get(name)
                .cloned()
                .unwrap_or_else(|| Profile::new(project.clone()));
            profile.project = project.clone();
            if let Some(url) = api_url {
                profile.api_url = url.clone();
            }
            if let Some(token) = access_token {
                #[cfg(feature = "secure-storage")]
                let token = if *use_keyring {
                    gcectl_core::config::store_in_keyring(name, token)?
                } else {
                    token.clone()
                };
                #[cfg(not(feature = "secure-storage"))]
                let token = token.clone();
                profile.access_token = Some(token);
            }
            profile.polling = PollingConfig {
                interval_ms: interval_ms.unwrap_or(profile.polling.interval_ms),
                timeout_ms: timeout_ms.unwrap_or(profile.polling.timeout_ms),
            };
            handle_set(conn_mgr, name, profile, *default)
        }
        Remove { name } => handle_remove(conn_mgr, name),
    }
}

fn config_path_display(conn_mgr: &ConnectionManager) -> Option<String> {
    conn_mgr
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .or_else(|| Config::config_path().ok().map(|p| p.display().to_string()))
}

/// Redacted view of a stored token
fn token_preview(token: Option<&str>) -> Option<String> {
    let token = token?;
    if StoredToken::parse(token).is_keyring() {
        return Some("(keyring)".to_string());
    }
    if token.starts_with("${") {
        return Some(token.to_string());
    }
    let prefix: String = token.chars().take(8).collect();
    Some(format!("{}...", prefix))
}

fn profile_json(conn_mgr: &ConnectionManager, name: &str, profile: &Profile) -> serde_json::Value {
    json!({
        "name": name,
        "project": profile.project,
        "api_url": profile.api_url,
        "access_token": token_preview(profile.access_token.as_deref()),
        "polling": {
            "interval_ms": profile.polling.interval_ms,
            "timeout_ms": profile.polling.timeout_ms,
        },
        "is_default": conn_mgr.config.default_profile.as_deref() == Some(name),
    })
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> Result<(), GcectlError> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let profile_list: Vec<serde_json::Value> = profiles
                .iter()
                .map(|(name, profile)| profile_json(conn_mgr, name, profile))
                .collect();
            let output_data = json!({
                "config_path": config_path_display(conn_mgr),
                "profiles": profile_list,
            });
            output::print_output(&output_data, output_format)?;
        }
        OutputFormat::Auto => {
            if profiles.is_empty() {
                println!("No profiles configured.");
                println!("Use 'gcectl profile set <name> --project <project>' to create one.");
                return Ok(());
            }
            for (name, profile) in profiles {
                let marker = if conn_mgr.config.default_profile.as_deref() == Some(name.as_str())
                {
                    "*".green().bold().to_string()
                } else {
                    " ".to_string()
                };
                println!("{} {:<16} {}", marker, name.bold(), profile.project);
            }
        }
    }
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> Result<(), GcectlError> {
    let config_path = config_path_display(conn_mgr).ok_or_else(|| {
        GcectlError::Configuration("Failed to determine config directory".to_string())
    })?;

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            output::print_output(json!({ "config_path": config_path }), output_format)?;
        }
        OutputFormat::Auto => println!("{}", config_path),
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> Result<(), GcectlError> {
    let profile = conn_mgr
        .config
        .profiles
        .get(name)
        .ok_or_else(|| GcectlError::ProfileNotFound { name: name.into() })?;
    let data = profile_json(conn_mgr, name, profile);

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_output(&data, output_format)?,
        OutputFormat::Auto => {
            println!("Profile: {}", name.bold());
            println!("Project: {}", profile.project);
            println!("API URL: {}", profile.api_url);
            println!(
                "Access token: {}",
                token_preview(profile.access_token.as_deref())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!(
                "Polling: every {} ms, timeout {} ms",
                profile.polling.interval_ms, profile.polling.timeout_ms
            );
            if data["is_default"] == json!(true) {
                println!("Default: yes");
            }
        }
    }
    Ok(())
}

fn handle_set(
    conn_mgr: &mut ConnectionManager,
    name: &str,
    profile: Profile,
    make_default: bool,
) -> Result<(), GcectlError> {
    debug!("Setting profile: {}", name);
    if profile.polling.interval_ms == 0 || profile.polling.timeout_ms == 0 {
        return Err(GcectlError::InvalidInput {
            message: "polling interval and timeout must be positive".to_string(),
        });
    }

    let is_first = conn_mgr.config.profiles.is_empty();
    conn_mgr.config.set_profile(name.to_string(), profile);
    if make_default || is_first {
        conn_mgr.config.default_profile = Some(name.to_string());
    }
    conn_mgr.save_config()?;

    info!("Saved profile '{}'", name);
    println!("Profile '{}' saved", name);
    if conn_mgr.config.default_profile.as_deref() == Some(name) {
        println!("'{}' is the default profile", name);
    }
    Ok(())
}

fn handle_remove(conn_mgr: &mut ConnectionManager, name: &str) -> Result<(), GcectlError> {
    debug!("Removing profile: {}", name);

    let Some(profile) = conn_mgr.config.remove_profile(name) else {
        return Err(GcectlError::ProfileNotFound { name: name.into() });
    };

    // The profile goes even if its keyring entry cannot be removed
    if let Some(token) = profile.access_token.as_deref().map(StoredToken::parse)
        && let Err(e) = token.forget()
    {
        warn!("Could not delete keyring entry for '{}': {}", name, e);
    }

    conn_mgr.save_config()?;
    println!("Profile '{}' removed", name);
    Ok(())
}
