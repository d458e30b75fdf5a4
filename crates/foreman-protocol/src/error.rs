//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// payload whose shape doesn't match the expected type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded fine but violates a protocol rule.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
