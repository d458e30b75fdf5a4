//! Unified error type for client operations.

use foreman_protocol::ProtocolError;
use foreman_transport::LinkError;

/// Errors surfaced to the caller of a client operation.
///
/// All failures are values: nothing here aborts the process, and nothing
/// is retried behind the caller's back.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The supervisor rejected the credential handshake. Carries the raw
    /// server-supplied reason. The link stays open.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The supervisor acknowledged a command with an error. The result
    /// value, if any, was discarded.
    #[error("command failed: {0}")]
    Command(String),

    /// A command was issued while no link is up.
    #[error("not connected")]
    NotConnected,

    /// The pending acknowledgment slot was dropped before the reply
    /// arrived.
    #[error("acknowledgment slot dropped before reply")]
    AckDropped,

    /// A link-level failure.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// A wire-format failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_link_error() {
        let err = LinkError::ConnectFailed("refused".into());
        let client_err: ClientError = err.into();
        assert!(matches!(client_err, ClientError::Link(_)));
        assert!(client_err.to_string().contains("refused"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidFrame("bad".into());
        let client_err: ClientError = err.into();
        assert!(matches!(client_err, ClientError::Protocol(_)));
    }

    #[test]
    fn test_auth_error_carries_raw_reason() {
        let err = ClientError::Auth("key expired".into());
        assert_eq!(err.to_string(), "authentication failed: key expired");
    }

    #[test]
    fn test_command_error_carries_raw_reason() {
        let err = ClientError::Command("server offline".into());
        assert_eq!(err.to_string(), "command failed: server offline");
    }
}
