//! Transport binding for Foreman.
//!
//! Provides the [`Link`] trait — the narrow duplex-connection interface the
//! client consumes — and a WebSocket implementation.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket link via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::LinkError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketLink;

/// A persistent duplex message connection to a supervising server.
///
/// One logical connection per link; there is no pooling or multiplexing at
/// this layer. A link is opened only by an explicit [`Link::connect`] —
/// nothing dials on construction of the types above it.
pub trait Link: Send + Sync + Sized + 'static {
    /// Opens a connection to the given endpoint.
    fn connect(
        endpoint: &str,
    ) -> impl std::future::Future<Output = Result<Self, LinkError>> + Send;

    /// Sends one message to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<(), LinkError>> + Send;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, LinkError>> + Send;

    /// Closes the connection.
    fn close(
        &self,
    ) -> impl std::future::Future<Output = Result<(), LinkError>> + Send;
}
