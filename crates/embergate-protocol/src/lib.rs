//! Wire protocol for Embergate.
//!
//! This crate defines the language that game clients and the gate server
//! speak:
//!
//! - **Types** ([`RequestEnvelope`], [`Command`], [`Response`], the id
//!   newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while decoding a
//!   request, all of it recoverable.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw buffers) and the command
//! handlers (account/character semantics). It knows nothing about sessions
//! or storage — it only turns buffers into typed commands and responses
//! back into buffers.
//!
//! ```text
//! Transport (bytes) → Protocol (Command / Response) → Handlers (domain)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    AccountId, CharacterId, Command, CreateCharacter, Credentials,
    GetCharacter, RequestEnvelope, Response, SelectCharacter, Status,
};
