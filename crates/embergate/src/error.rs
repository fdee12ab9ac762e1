//! Unified error type for the Embergate server.

use embergate_protocol::ProtocolError;
use embergate_storage::StorageError;
use embergate_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically. Note what
/// is NOT here: domain outcomes like "wrong password" or "already logged
/// in" are `ERROR` response envelopes, never Rust errors — this type only
/// carries failures that end a connection or get logged.
#[derive(Debug, thiserror::Error)]
pub enum EmbergateError {
    /// A transport-level error (accept, send, recv). Fatal to the one
    /// connection it occurred on.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error that escaped the per-message recovery path
    /// (in practice: response encoding failed).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A storage backend failure. Surfaced to the client as a generic
    /// error envelope before this bubbles into the logs.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
