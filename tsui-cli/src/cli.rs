//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tsui_core::BackendType;

/// `TimeseriesUI` command-line interface for managing backend connections
#[derive(Parser)]
#[command(name = "tsui")]
#[command(author, version, about = "TimeseriesUI connection control panel")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the TimeseriesUI host server (overrides host_url in
    /// config.toml)
    #[arg(long, global = true, env = "TSUI_HOST")]
    pub host: Option<String>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Options shared by every command
    pub fn globals(&self) -> GlobalArgs {
        GlobalArgs {
            config_path: self.config.clone(),
            host: self.host.clone().filter(|h| !h.trim().is_empty()),
        }
    }
}

/// Global options resolved from the command line
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Custom configuration directory
    pub config_path: Option<PathBuf>,
    /// Host server override
    pub host: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List all connections
    #[command(about = "List all connections in the registry")]
    List {
        /// Output format for the connection list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Show connection details
    #[command(about = "Show details of a connection")]
    Show {
        /// Connection name or ID
        name: String,
    },

    /// Add a new connection
    #[command(about = "Add a new connection to the registry")]
    Add {
        /// Name for the new connection
        #[arg(short, long, default_value = "")]
        name: String,

        /// Base URL of the backend
        #[arg(short, long)]
        url: String,

        /// Backend type (influxdb, prometheus)
        #[arg(short = 't', long = "type", default_value = "influxdb")]
        backend_type: BackendType,

        #[command(flatten)]
        fields: ProfileFields,
    },

    /// Edit an existing connection
    #[command(about = "Update fields of a connection")]
    Edit {
        /// Connection name or ID
        target: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New base URL
        #[arg(short, long)]
        url: Option<String>,

        /// New backend type (influxdb, prometheus)
        #[arg(short = 't', long = "type")]
        backend_type: Option<BackendType>,

        #[command(flatten)]
        fields: ProfileFields,
    },

    /// Remove a connection
    #[command(about = "Remove a connection from the registry")]
    Remove {
        /// Connection name or ID
        name: String,
    },

    /// Make a connection the active one
    #[command(about = "Set the active connection")]
    Activate {
        /// Connection name or ID
        name: String,
    },

    /// Merge the host's connection list into the registry
    #[command(about = "Fetch connections from the host and merge them")]
    SyncHost,

    /// Detect and print the host mode
    #[command(about = "Print whether the host runs standalone or embedded")]
    Mode,

    /// Probe the active connection once
    #[command(about = "Check health of the active connection")]
    Status,

    /// Poll the active connection until interrupted
    #[command(about = "Watch health of the active connection (Ctrl-C to stop)")]
    Watch {
        /// Poll at the admin metrics rate (every 5 seconds)
        #[arg(long)]
        admin: bool,
    },
}

impl Commands {
    /// Command name used in log spans
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Remove { .. } => "remove",
            Self::Activate { .. } => "activate",
            Self::SyncHost => "sync-host",
            Self::Mode => "mode",
            Self::Status => "status",
            Self::Watch { .. } => "watch",
        }
    }
}

/// Optional profile fields shared by `add` and `edit`
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileFields {
    /// Basic-auth username
    #[arg(long)]
    pub username: Option<String>,

    /// Basic-auth password
    #[arg(long)]
    pub password: Option<String>,

    /// Database selected by default in query views
    #[arg(long)]
    pub default_database: Option<String>,

    /// Alertmanager base URL (Prometheus only)
    #[arg(long)]
    pub alertmanager_url: Option<String>,

    /// Alertmanager basic-auth username
    #[arg(long)]
    pub alertmanager_username: Option<String>,

    /// Alertmanager basic-auth password
    #[arg(long)]
    pub alertmanager_password: Option<String>,
}

/// Output format for the list command
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for scripting
    Json,
}
