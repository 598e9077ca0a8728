use super::{Command, Event};
use color_eyre::Result;
use std::os::unix::io::{FromRawFd, IntoRawFd};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::{timeout, Duration};

/// Maximum concurrent connections to prevent resource exhaustion
const MAX_CONNECTIONS: usize = 100;

/// Socket receive buffer size (commands are small JSON objects)
const SOCKET_RECV_BUF: usize = 16 * 1024;

/// Upper bound for accept-error backoff
const MAX_BACKOFF_MS: u64 = 5000;

/// Listen for client commands on a Unix socket
pub async fn listen(tx: mpsc::Sender<Event>, socket_path: &Path) -> Result<()> {
    // Remove stale socket file
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Create socket with socket2 for buffer tuning
    let socket = socket2::Socket::new(socket2::Domain::UNIX, socket2::Type::STREAM, None)?;

    // OS may clamp to its minimum, which is fine
    if let Err(e) = socket.set_recv_buffer_size(SOCKET_RECV_BUF) {
        tracing::debug!("Could not set recv buffer size: {}", e);
    }

    socket.bind(&socket2::SockAddr::unix(socket_path)?)?;
    socket.listen(128)?;
    socket.set_nonblocking(true)?;

    // SAFETY: the fd comes straight from socket2 and ownership moves into the listener
    let std_listener: std::os::unix::net::UnixListener =
        unsafe { std::os::unix::net::UnixListener::from_raw_fd(socket.into_raw_fd()) };
    let listener = UnixListener::from_std(std_listener)?;

    tracing::info!("Listening on {:?}", socket_path);

    let semaphore = Arc::new(Semaphore::new(MAX_CONNECTIONS));
    let mut backoff_ms: u64 = 0;

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                backoff_ms = 0;

                let permit = match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!(
                            "Connection limit reached ({} max), dropping connection",
                            MAX_CONNECTIONS
                        );
                        continue;
                    }
                };

                let tx = tx.clone();
                tokio::spawn(async move {
                    // Permit is held until this task completes
                    let _permit = permit;

                    let reader = BufReader::new(stream);
                    let mut lines = reader.lines();

                    match timeout(Duration::from_secs(2), lines.next_line()).await {
                        Ok(Ok(Some(line))) if !line.trim().is_empty() => {
                            if let Some(command) = parse_command(&line) {
                                let _ = tx.send(Event::Command(Box::new(command))).await;
                            }
                        }
                        Ok(Ok(Some(_))) => {} // Empty line, ignore
                        Ok(Ok(None)) => {}    // Stream closed
                        Ok(Err(e)) => {
                            tracing::warn!("Read error: {}", e);
                        }
                        Err(_) => {
                            tracing::debug!("Read timeout (connection may be stale)");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::error!("Accept error: {}", e);

                // Exponential backoff to prevent CPU spin on persistent errors
                backoff_ms = if backoff_ms == 0 {
                    100
                } else {
                    (backoff_ms * 2).min(MAX_BACKOFF_MS)
                };

                tracing::debug!("Backing off for {}ms", backoff_ms);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Parse and validate one command line; invalid input is logged and dropped
fn parse_command(line: &str) -> Option<Command> {
    match serde_json::from_str::<Command>(line) {
        Ok(command) => match command.validate() {
            Ok(()) => {
                tracing::debug!(command = command.name(), "Received command");
                Some(command)
            }
            Err(e) => {
                tracing::warn!("Invalid command: {} - {:?}", e, command);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Failed to parse command: {} - {}", e, line);
            None
        }
    }
}
