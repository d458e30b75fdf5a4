//! Connection readiness state machine.

use std::fmt;

/// The overall readiness of the client.
///
/// ```text
/// Disconnected ──connect()──► Connecting ──link up──► Authenticating
///       ▲                                                   │
///       │                                     ┌─────────────┴─────────┐
///       │                                  accepted               rejected
///       │                                     ▼                       ▼
///       └──────link down (from any state)── Ready                AuthFailed
/// ```
///
/// `AuthFailed` leaves the link open; only a link-level disconnect
/// returns the machine to `Disconnected`, and nothing reconnects
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No link. The initial state; also entered on any link-level
    /// disconnect.
    Disconnected,
    /// A dial is in progress.
    Connecting,
    /// The link is up and the credential handshake is in flight.
    Authenticating,
    /// Authenticated; commands may be issued.
    Ready,
    /// The supervisor rejected the credentials.
    AuthFailed,
}

impl ConnectionState {
    /// True only while the client holds a valid authenticated session.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::AuthFailed => "auth-failed",
        };
        f.write_str(s)
    }
}
