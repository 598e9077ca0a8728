// Clippy configuration: enable pedantic but allow overly strict lints
#![allow(clippy::missing_errors_doc)] // Internal functions don't need # Errors docs
#![allow(clippy::missing_panics_doc)] // Internal functions don't need # Panics docs
#![allow(clippy::must_use_candidate)] // Not all getters need #[must_use]
#![allow(clippy::module_name_repetitions)] // e.g., NotificationStore in state module is fine
#![allow(clippy::doc_markdown)] // Don't require backticks around JSON, HH:MM, etc.
#![allow(clippy::too_many_lines)] // Some functions are naturally long
#![allow(clippy::struct_excessive_bools)] // Settings structs have one bool per channel
#![allow(clippy::cast_possible_truncation)] // Millisecond durations fit in u64
#![allow(clippy::needless_pass_by_value)] // PathBuf by value is fine for config loading
#![allow(clippy::trivially_copy_pass_by_ref)] // &self on Copy types follows Rust conventions

//! Herald - notification center daemon
//!
//! A single Rust binary that provides both:
//! - Daemon mode: owns the notification inbox, toasts and settings, listens
//!   for commands on a Unix socket and forwards notifications to the desktop
//! - Client mode: sends commands to the daemon or reads the storage document
//!
//! Usage:
//!   herald                                  # Start the daemon (default)
//!   herald notify --title A --message B     # Add a notification
//!   herald toast "network down" -T error    # Show a toast
//!   herald list                             # Print the inbox

mod app;
mod cli;
mod client;
mod config;
mod desktop;
mod errors;
mod event;
mod state;

use app::App;
use clap::Parser;
use cli::{Cli, Commands, SettingsArgs};
use color_eyre::Result;
use config::HeraldConfig;
use event::{Command, Event};
use state::{
    apply_filter, NotificationData, NotificationId, PersistedState, QuietHours, SettingsPatch,
    Storage, TimeOfDay, ToastData, ToastId,
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Capacity of the daemon event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Get the log directory path
fn get_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("/tmp/herald/logs"),
        |dirs| dirs.cache_dir().join("herald").join("logs"),
    )
}

fn load_config(cli: &Cli) -> HeraldConfig {
    match &cli.config {
        Some(path) => HeraldConfig::load_from_path(path.clone()),
        None => HeraldConfig::load(),
    }
}

/// Build a settings patch from CLI flags
///
/// Nested values (quiet hours, categories) are replaced whole by the merge,
/// so they start from the currently saved settings.
fn settings_patch(args: SettingsArgs, saved: &PersistedState) -> SettingsPatch {
    let quiet_hours = if args.quiet_hours.is_some()
        || args.quiet_start.is_some()
        || args.quiet_end.is_some()
    {
        let current = saved.settings.quiet_hours;
        Some(QuietHours {
            enabled: args.quiet_hours.unwrap_or(current.enabled),
            start: args.quiet_start.unwrap_or(current.start),
            end: args.quiet_end.unwrap_or(current.end),
        })
    } else {
        None
    };

    let categories = if args.enable_category.is_empty() && args.disable_category.is_empty() {
        None
    } else {
        let mut toggles = saved.settings.categories;
        for category in &args.enable_category {
            toggles.set(*category, true);
        }
        for category in &args.disable_category {
            toggles.set(*category, false);
        }
        Some(toggles)
    };

    SettingsPatch {
        email: args.email,
        push: args.push,
        sms: args.sms,
        categories,
        quiet_hours,
        sound: args.sound,
        desktop: args.desktop,
    }
}

/// Map a client subcommand to a daemon command
///
/// Returns None for subcommands handled locally.
fn to_command(command: Commands, saved: &PersistedState) -> Option<Command> {
    let command = match command {
        Commands::Notify {
            title,
            message,
            kind,
            category,
            auto_close,
            persistent,
        } => {
            let mut data = NotificationData::new(kind, category, &title, &message);
            data.auto_close = auto_close;
            data.persistent = persistent;
            Command::AddNotification(data)
        }
        Commands::Read { id } => Command::MarkAsRead {
            id: NotificationId(id),
        },
        Commands::ReadAll => Command::MarkAllAsRead,
        Commands::Remove { id } => Command::RemoveNotification {
            id: NotificationId(id),
        },
        Commands::Clear => Command::ClearNotifications,
        Commands::Toast {
            message,
            kind,
            title,
            auto_close,
            persistent,
        } => {
            let mut data = ToastData::new(kind, &message);
            data.title = title;
            data.auto_close = auto_close;
            data.persistent = persistent;
            Command::ShowToast(data)
        }
        Commands::HideToast { id } => Command::HideToast { id: ToastId(id) },
        Commands::ClearToasts => Command::ClearToasts,
        Commands::Settings(args) => Command::UpdateSettings(settings_patch(args, saved)),
        Commands::Filter { filter } => Command::SetFilter { filter },
        Commands::Permission => Command::RequestPermission,
        Commands::Sync => Command::Sync,
        _ => return None,
    };
    Some(command)
}

/// Print the inbox from the storage document
fn print_list(saved: &PersistedState, filter: state::NotificationFilter, json: bool) -> Result<()> {
    let entries = apply_filter(saved.notifications.iter(), filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No notifications");
        return Ok(());
    }

    println!(
        "{:<6} {:<2} {:<8} {:<10} {:<17} {}",
        "ID", "", "TYPE", "CATEGORY", "CREATED", "TITLE"
    );
    println!("{}", "-".repeat(72));
    for n in entries {
        println!(
            "{:<6} {:<2} {:<8} {:<10} {:<17} {}",
            n.id.0,
            if n.read { "" } else { "*" },
            n.kind.as_str(),
            n.category.as_str(),
            n.created_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            n.title
        );
    }
    Ok(())
}

/// Print unread counts and settings from the storage document
fn print_status(saved: &PersistedState) {
    let unread: Vec<&state::Notification> =
        saved.notifications.iter().filter(|n| !n.read).collect();

    println!("Notifications: {}", saved.notifications.len());
    println!("Unread:        {}", unread.len());
    for category in state::Category::ALL {
        let count = unread.iter().filter(|n| n.category == category).count();
        if count > 0 {
            println!("  {:<12} {}", category.as_str(), count);
        }
    }

    let s = &saved.settings;
    println!(
        "Channels:      email={} push={} sms={} desktop={} sound={}",
        s.email, s.push, s.sms, s.desktop, s.sound
    );
    if s.quiet_hours.enabled {
        println!("Quiet hours:   {} - {}", s.quiet_hours.start, s.quiet_hours.end);
    } else {
        println!("Quiet hours:   off");
    }
    if let Some(at) = saved.last_sync {
        println!("Last sync:     {}", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
    }
}

fn init_cli_logging(log_level: &str) {
    let filter = format!("herald={log_level}");
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Initialize error handling
    color_eyre::install()?;

    let command = cli.command.take().unwrap_or(Commands::Serve);

    match command {
        Commands::Serve => return serve(&cli).await,
        Commands::Completions { shell } => {
            cli::print_completions(shell);
            return Ok(());
        }
        Commands::ExampleConfig => {
            print!("{}", HeraldConfig::example());
            return Ok(());
        }
        Commands::QuietCheck { start, end, at } => {
            let now = at.unwrap_or_else(|| TimeOfDay::from(chrono::Local::now().time()));
            let window = QuietHours {
                enabled: true,
                start,
                end,
            };
            if window.is_active(now) {
                println!("{now} is inside quiet hours {start} - {end}: suppressed");
            } else {
                println!("{now} is outside quiet hours {start} - {end}: delivered");
            }
            return Ok(());
        }
        _ => {}
    }

    // Client commands: warnings to stderr only
    init_cli_logging("warn");

    let config = load_config(&cli);
    let storage = Storage::new(config.storage.resolve());
    let saved = storage.load();

    match command {
        Commands::List { filter, json } => print_list(&saved, filter.unwrap_or(saved.filter), json),
        Commands::Status => {
            print_status(&saved);
            Ok(())
        }
        other => {
            if let Some(command) = to_command(other, &saved) {
                client::send(&cli.socket, &command).await?;
            }
            Ok(())
        }
    }
}

/// Run the daemon until Ctrl-C
async fn serve(cli: &Cli) -> Result<()> {
    // Setup file logging with rotation
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "herald.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging with both file and stderr
    let log_filter = format!("herald={}", cli.log_level);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting herald v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {:?}", log_dir);
    tracing::debug!("Socket path: {:?}", cli.socket);

    let config = load_config(cli);
    let storage = Storage::new(config.storage.resolve());
    tracing::info!("Storage document: {:?}", storage.path());

    // Create event channel
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    // Spawn socket listener
    let socket_path = cli.socket.clone();
    let socket_tx = event_tx.clone();
    let socket_handle = tokio::spawn(async move {
        if let Err(e) = event::socket::listen(socket_tx, &socket_path).await {
            tracing::error!("Socket listener error: {}", e);
        }
    });

    let app = App::new(&config, storage, event_tx);
    let result = run_loop(app, event_rx).await;

    // Cleanup
    socket_handle.abort();
    if cli.socket.exists() {
        let _ = std::fs::remove_file(&cli.socket);
    }

    tracing::info!("herald stopped");
    result
}

async fn run_loop(mut app: App, mut event_rx: mpsc::Receiver<Event>) -> Result<()> {
    use tokio_util::sync::CancellationToken;

    // Cancellation token for graceful shutdown
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_handle = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        tracing::info!("Shutdown requested");
        signal_cancel.cancel();
    });

    app.start();

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            event = event_rx.recv() => match event {
                Some(event) => app.handle_event(event),
                None => break,
            },
        }
    }

    signal_handle.abort();
    Ok(())
}
