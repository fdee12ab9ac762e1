//! Error types for the protocol layer.
//!
//! Every variant here is recoverable: the connection handler turns each one
//! into an `ERROR` response envelope and keeps reading. The variants are
//! deliberately distinct so the handler can tell "the buffer was not a
//! valid envelope" apart from "the envelope was fine but a payload field
//! was missing or mistyped".

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a response into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The inbound buffer was not a well-formed request envelope.
    ///
    /// Common causes: malformed JSON, a truncated message (the transport
    /// caps messages at its read-buffer size), or a non-object top level.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope parsed but its `Command` field was absent or empty.
    #[error("request has no command")]
    MissingCommand,

    /// The `Command` string is not one the server recognizes.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command was recognized but its `Data` payload was missing a
    /// field or carried a wrong-typed one.
    #[error("invalid payload for {command}: {source}")]
    Payload {
        /// Canonical (upper-case) name of the command being parsed.
        command: &'static str,
        /// The underlying serde failure naming the offending field.
        source: serde_json::Error,
    },
}
