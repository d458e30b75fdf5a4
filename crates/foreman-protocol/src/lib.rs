//! Wire protocol for Foreman.
//!
//! This crate defines the "language" spoken between a controlling
//! application and the supervising daemon that owns the game-server
//! processes:
//!
//! - **Types** ([`Request`], [`Command`], [`ServerFrame`], the pushed-event
//!   payloads) — the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw frames) and the
//! client (state machine, correlation). It doesn't know about connections
//! or sessions — it only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (Request / ServerFrame) → Client (session context)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    event_names, Command, LineEvent, LoginEvent, LogoutEvent, OfflineEvent,
    OnlineEvent, RconRunningEvent, Request, RequestId, ServerFrame,
    ServerStatus, StartingEvent, StatusEvent, StoppingEvent, WhitelistAction,
    WhitelistEntry, AUTH_OK,
};
