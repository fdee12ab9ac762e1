//! Transport abstraction layer for Embergate.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract over
//! the network protocol, plus the plain-TCP implementation the gate server
//! actually runs on ([`TcpTransport`] / [`TcpConnection`]).

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{TcpConnection, TcpTransport, DEFAULT_READ_BUFFER};

use std::fmt;

/// Opaque identifier for a connection.
///
/// The session registry keys its reverse map on this, so it must stay
/// unique for the life of the process (ids are never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Tears down any accept-side resources. Existing connections are
    /// unaffected. Implementations with nothing to release return `Ok(())`.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that can send and receive message buffers.
///
/// One `recv()` returns one whole inbound message: this transport does no
/// framing beyond the read buffer, so a message must fit in a single read
/// and peers must not coalesce writes. Known limitation of the wire
/// protocol; a framed replacement would change this trait, not its callers.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message buffer to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
