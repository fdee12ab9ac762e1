//! # Embergate
//!
//! A multi-client TCP gate server for game accounts and characters:
//! registration, login with a one-session-per-account guarantee, and
//! character creation/lookup over a JSON request/response protocol.
//!
//! The workspace is layered — transport, protocol, session, storage —
//! and this crate ties them together: the accept loop, the
//! per-connection handler, and the five command handlers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use embergate::prelude::*;
//!
//! # async fn run() -> Result<(), EmbergateError> {
//! let server = EmbergateServerBuilder::new()
//!     .bind("0.0.0.0:7777")
//!     .build(MemoryStorage::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod commands;
mod error;
mod handler;
mod server;

pub use error::EmbergateError;
pub use server::{EmbergateServer, EmbergateServerBuilder};

/// One-stop imports for building and talking to a gate server.
pub mod prelude {
    pub use crate::{EmbergateError, EmbergateServer, EmbergateServerBuilder};
    pub use embergate_protocol::{
        AccountId, CharacterId, Codec, Command, JsonCodec, ProtocolError,
        RequestEnvelope, Response, Status,
    };
    pub use embergate_session::SessionRegistry;
    pub use embergate_storage::{
        Character, MemoryStorage, StorageError, StorageProvider,
    };
    pub use embergate_transport::{
        Connection, ConnectionId, TcpTransport, Transport, TransportError,
    };
}
