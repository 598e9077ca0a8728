//! Client side of the command socket

use crate::errors::{HeraldError, Result};
use crate::event::Command;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::time::{timeout, Duration};

/// Connect and write timeouts
const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

/// Send one command to the running daemon
pub async fn send(socket_path: &Path, command: &Command) -> Result<()> {
    command.validate()?;

    let unavailable = |reason: String| HeraldError::DaemonUnavailable {
        path: socket_path.display().to_string(),
        reason,
    };

    if !socket_path.exists() {
        return Err(unavailable("socket not found (is `herald serve` running?)".to_string()));
    }

    let mut stream = match timeout(CLIENT_TIMEOUT, UnixStream::connect(socket_path)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(unavailable(e.to_string())),
        Err(_) => return Err(unavailable("connect timed out".to_string())),
    };

    let data = format!("{}\n", serde_json::to_string(command)?);
    match timeout(CLIENT_TIMEOUT, stream.write_all(data.as_bytes())).await {
        Ok(result) => result?,
        Err(_) => return Err(unavailable("write timed out".to_string())),
    }
    let _ = stream.shutdown().await;

    tracing::debug!(command = command.name(), "Command sent");
    Ok(())
}
