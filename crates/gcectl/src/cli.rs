//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};
use gcectl_core::{OperationScope, ResourceKind};
use std::path::PathBuf;

/// Compute Engine CLI that tracks operations to completion
#[derive(Parser, Debug)]
#[command(name = "gcectl")]
#[command(version, about = "Compute Engine CLI that waits on long-running operations")]
#[command(long_about = "
Compute Engine CLI that waits on long-running operations

Every mutating Compute Engine call returns an operation. gcectl can follow
that operation through its zonal, regional or global endpoint until the
provider marks it DONE, and reports success, failure, or an unknown outcome
when the operation record disappears.

EXAMPLES:
    # Set up a profile
    gcectl profile set dev --project my-project --access-token \"$(gcloud auth print-access-token)\"

    # Wait for a zonal operation
    gcectl operation wait operation-1714000000000-abc --zone us-central1-a

    # Create a firewall rule and wait for it
    gcectl resource create firewall allow-ssh --body firewall.json --wait

    # Get JSON output for scripting
    gcectl operation get operation-1714000000000-abc -o json

For more help on a specific command, run:
    gcectl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "GCECTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "GCECTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summaries, JSON for raw resources
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and wait on operations
    #[command(subcommand, visible_alias = "op")]
    Operation(OperationCommands),

    /// Create, read, update and delete resources
    #[command(subcommand, visible_alias = "res")]
    Resource(ResourceCommands),

    /// Manage configuration profiles
    #[command(subcommand, visible_alias = "prof")]
    Profile(ProfileCommands),

    /// Show version information
    #[command(visible_alias = "ver")]
    Version,
}

/// Where an operation or resource lives; global when neither flag is given
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Zone name or URL (zonal scope)
    #[arg(long, conflicts_with = "region")]
    pub zone: Option<String>,

    /// Region name or URL (regional scope)
    #[arg(long)]
    pub region: Option<String>,
}

impl ScopeArgs {
    pub fn scope(&self) -> OperationScope {
        OperationScope::from_parts(self.zone.as_deref(), self.region.as_deref())
    }
}

/// Overrides for the profile's polling settings
#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
    /// Give up waiting after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Milliseconds between operation refreshes
    #[arg(long, value_name = "MS")]
    pub interval: Option<u64>,
}

/// Operation commands
#[derive(Subcommand, Debug)]
pub enum OperationCommands {
    /// Fetch the current state of an operation
    Get {
        /// Operation name
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Wait until an operation is DONE
    #[command(after_help = "EXAMPLES:
    # Wait on a global operation with the profile's polling settings
    gcectl operation wait operation-1714000000000-abc

    # Wait up to five minutes, refreshing every two seconds
    gcectl operation wait operation-1714000000000-abc --region us-east1 \\
        --timeout 300000 --interval 2000
")]
    Wait {
        /// Operation name
        name: String,

        #[command(flatten)]
        scope: ScopeArgs,

        #[command(flatten)]
        poll: PollArgs,
    },
}

/// Resource commands
#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// Create a resource from a JSON body
    #[command(after_help = "EXAMPLES:
    # Create a regional address and wait for it
    gcectl resource create address web-ip --region us-central1 --body address.json --wait

    # Read the body from stdin
    echo '{\"sizeGb\": \"10\"}' | gcectl resource create disk data --zone us-central1-a --body -
")]
    Create {
        #[command(flatten)]
        target: ResourceTarget,

        /// JSON file with the resource body ('-' for stdin)
        #[arg(long, value_name = "FILE")]
        body: PathBuf,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Fetch a resource
    Get {
        #[command(flatten)]
        target: ResourceTarget,
    },

    /// Patch a resource from a JSON body
    Update {
        #[command(flatten)]
        target: ResourceTarget,

        /// JSON file with the fields to patch ('-' for stdin)
        #[arg(long, value_name = "FILE")]
        body: PathBuf,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a resource
    Delete {
        #[command(flatten)]
        target: ResourceTarget,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Identifies one resource
#[derive(Args, Debug, Clone)]
pub struct ResourceTarget {
    /// Resource kind
    #[arg(value_enum)]
    pub kind: ResourceKind,

    /// Resource name
    pub name: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

/// Arguments for commands that start an operation
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Wait for the operation to complete
    #[arg(long)]
    pub wait: bool,

    #[command(flatten)]
    pub poll: PollArgs,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add")]
    #[command(after_help = "EXAMPLES:
    # Create a profile and make it the default
    gcectl profile set dev --project my-project --default

    # Reference the token from the environment when the config is loaded
    gcectl profile set prod --project prod-project --access-token '${PROD_ACCESS_TOKEN}'

    # Point at a local emulator with fast polling
    gcectl profile set local --project test --api-url http://localhost:8080/compute/v1 \\
        --interval-ms 100 --timeout-ms 5000
")]
    Set {
        /// Profile name
        name: String,

        /// Project every request is made against
        #[arg(long)]
        project: String,

        /// OAuth2 access token
        #[arg(long)]
        access_token: Option<String>,

        /// Compute API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Milliseconds between operation refreshes
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Milliseconds before waiting gives up
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,

        /// Store the access token in the OS keyring
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,
    },
}
