//! # Foreman client
//!
//! Client-side library for managing remote game-server processes through a
//! supervising daemon over a single persistent, message-oriented
//! connection.
//!
//! The core pieces:
//!
//! - [`ConnectionState`] — the lifecycle state machine (disconnected →
//!   connecting → authenticating → ready), driven by link-level signals.
//! - The authentication gate — every command re-validates the session
//!   before it is emitted, so no command ever rides a stale session.
//! - The request correlator — converts the supervisor's acknowledgment
//!   frames into single-settlement futures, one per in-flight command.
//! - The event dispatcher — routes server-pushed notifications to
//!   per-event subscribers, with a catch-all for everything unsubscribed.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use foreman_client::{ClientConfig, ForemanClient};
//!
//! # async fn run() -> Result<(), foreman_client::ClientError> {
//! let client: ForemanClient = ForemanClient::new(ClientConfig::new(
//!     "srv-a",
//!     "ws://127.0.0.1:7070",
//!     "secret",
//! ));
//!
//! client.on_line(|server, line| println!("[{server}] {}", line.text)).await;
//! client.connect();
//!
//! // ...once the `connect` callback reports success:
//! let started = client.start("mc1").await?;
//! # let _ = started;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod events;
mod state;

pub use client::{ForemanClient, WhitelistReply};
pub use config::ClientConfig;
pub use error::ClientError;
pub use state::ConnectionState;

// Protocol types a caller needs to talk to the client.
pub use foreman_protocol::{
    LineEvent, LoginEvent, LogoutEvent, OfflineEvent, OnlineEvent,
    RconRunningEvent, ServerStatus, StartingEvent, StatusEvent, StoppingEvent,
    WhitelistAction, WhitelistEntry,
};
