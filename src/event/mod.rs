pub mod command;
pub mod socket;

pub use command::Command;

use crate::desktop::Permission;
use crate::state::TimerKey;

/// Events consumed by the daemon's event loop
#[derive(Debug)]
pub enum Event {
    /// Command received over the socket (boxed to reduce enum size)
    Command(Box<Command>),
    /// Auto-close timer fired
    Expired(TimerKey),
    /// Desktop permission probe finished
    PermissionResolved(Permission),
}
