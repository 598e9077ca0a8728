//! CLI argument parsing
//!
//! Uses clap for argument parsing with derive macros.

use crate::state::{Category, NotificationFilter, Severity, TimeOfDay};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Get default socket path, preferring XDG_RUNTIME_DIR on Linux
fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("herald.sock");
    }
    PathBuf::from("/tmp/herald.sock")
}

/// Notification center daemon - inbox, toasts, and desktop delivery with quiet hours
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Socket path for daemon commands (default: $XDG_RUNTIME_DIR/herald.sock or /tmp/herald.sock)
    #[arg(
        short,
        long,
        env = "HERALD_SOCKET",
        default_value_os_t = default_socket_path(),
        global = true
    )]
    pub socket: PathBuf,

    /// Config file (default: ~/.config/herald/config.toml)
    #[arg(short, long, env = "HERALD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the notification daemon (default)
    Serve,

    /// Add a notification to the inbox
    Notify {
        /// Notification title
        #[arg(long)]
        title: String,

        /// Notification body
        #[arg(long)]
        message: String,

        /// success, error, warning, or info
        #[arg(short = 'T', long = "type", default_value = "info", value_parser = parse_severity)]
        kind: Severity,

        /// order, payment, voucher, account, promotion, or system
        #[arg(short = 'C', long, default_value = "system", value_parser = parse_category)]
        category: Category,

        /// Remove automatically after this many milliseconds
        #[arg(long)]
        auto_close: Option<u64>,

        /// Never remove automatically
        #[arg(long, default_value_t = false)]
        persistent: bool,
    },

    /// Mark a notification as read
    Read {
        /// Notification id
        id: u64,
    },

    /// Mark every notification as read
    ReadAll,

    /// Delete a notification
    Remove {
        /// Notification id
        id: u64,
    },

    /// Delete every notification
    Clear,

    /// Show a toast
    Toast {
        /// Toast text
        message: String,

        /// success, error, warning, or info
        #[arg(short = 'T', long = "type", default_value = "info", value_parser = parse_severity)]
        kind: Severity,

        /// Optional heading
        #[arg(long)]
        title: Option<String>,

        /// Hide after this many milliseconds (default 5000)
        #[arg(long)]
        auto_close: Option<u64>,

        /// Keep until hidden explicitly
        #[arg(long, default_value_t = false)]
        persistent: bool,
    },

    /// Hide a toast
    HideToast {
        /// Toast id
        id: u64,
    },

    /// Hide every toast
    ClearToasts,

    /// Change notification settings
    Settings(SettingsArgs),

    /// Select the inbox filter (all, unread, or a category)
    Filter {
        #[arg(value_parser = parse_filter)]
        filter: NotificationFilter,
    },

    /// Ask the desktop notification service for permission
    Permission,

    /// Record a sync timestamp
    Sync,

    /// List notifications from the storage document
    List {
        /// Override the saved filter
        #[arg(short, long, value_parser = parse_filter)]
        filter: Option<NotificationFilter>,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show unread counts and settings from the storage document
    Status,

    /// Check whether a time falls inside a quiet-hours window
    QuietCheck {
        /// Window start (HH:MM)
        #[arg(long)]
        start: TimeOfDay,

        /// Window end (HH:MM)
        #[arg(long)]
        end: TimeOfDay,

        /// Time to check (HH:MM, default: now)
        #[arg(long)]
        at: Option<TimeOfDay>,
    },

    /// Print an example configuration file
    ExampleConfig,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Flags for `herald settings`; unset flags leave the setting unchanged
#[derive(clap::Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub email: Option<bool>,

    #[arg(long)]
    pub push: Option<bool>,

    #[arg(long)]
    pub sms: Option<bool>,

    #[arg(long)]
    pub sound: Option<bool>,

    #[arg(long)]
    pub desktop: Option<bool>,

    /// Turn quiet hours on or off
    #[arg(long)]
    pub quiet_hours: Option<bool>,

    /// Quiet hours start (HH:MM)
    #[arg(long)]
    pub quiet_start: Option<TimeOfDay>,

    /// Quiet hours end (HH:MM)
    #[arg(long)]
    pub quiet_end: Option<TimeOfDay>,

    /// Enable delivery for a category (repeatable)
    #[arg(long, value_parser = parse_category)]
    pub enable_category: Vec<Category>,

    /// Disable delivery for a category (repeatable)
    #[arg(long, value_parser = parse_category)]
    pub disable_category: Vec<Category>,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse::<Severity>().map_err(|e: &str| e.to_string())
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse::<Category>().map_err(|e: &str| e.to_string())
}

fn parse_filter(s: &str) -> Result<NotificationFilter, String> {
    s.parse::<NotificationFilter>().map_err(|e: &str| e.to_string())
}

/// Generate shell completions and print to stdout
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "herald", &mut io::stdout());
}
