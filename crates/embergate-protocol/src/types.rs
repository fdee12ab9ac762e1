//! Core protocol types for Embergate's wire format.
//!
//! This module defines everything that travels on the wire between a game
//! client and the gate server. The shapes are fixed by the deployed client
//! population, so the serde attributes here are load-bearing:
//!
//! - Requests are `{ "Command": "...", "Data": { ... } }`, command name
//!   matched case-insensitively.
//! - Responses are `{ "Status": "SUCCESS" | "ERROR", "Message": "...",
//!   "Data": { ... } }` with `Data` optional.
//!
//! Inside `Data`, field names are camelCase (`accountId`, `characterName`).

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for an account.
///
/// Newtype over `u64` so an account id can't be confused with a character
/// id in a signature. `#[serde(transparent)]` keeps the wire form a plain
/// number: `AccountId(42)` serializes as `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct-{}", self.0)
    }
}

/// A unique identifier for a player character.
///
/// Same newtype pattern as [`AccountId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "char-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// The raw inbound envelope, before the command name is interpreted.
///
/// `command` is an `Option` because "field absent" and "field present but
/// empty" both have to produce the same `Invalid request format` response,
/// not a decode failure. `data` defaults to JSON `null` when absent so a
/// bare `{ "Command": "..." }` still reaches the per-command payload parse
/// (which then reports exactly which field is missing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// The command name, matched case-insensitively.
    #[serde(rename = "Command", default)]
    pub command: Option<String>,

    /// The command-specific payload, parsed lazily by [`Command::from_envelope`].
    #[serde(rename = "Data", default)]
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Typed command payloads
// ---------------------------------------------------------------------------

/// Username/password pair shared by the two account commands.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Payload of `CREATE_CHARACTER`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacter {
    pub account_id: AccountId,
    pub name: String,
    pub race: String,
}

/// Payload of `GET_CHARACTER`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCharacter {
    pub account_id: AccountId,
}

/// Payload of `SELECT_CHARACTER`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCharacter {
    pub account_id: AccountId,
    pub character_name: String,
}

/// A fully parsed request: command name resolved, payload typed.
///
/// Historically this server read payload fields dynamically out of the JSON
/// object at each use site; a typo'd field name surfaced as a parser panic
/// deep in a handler. Parsing into one variant per command up front means a
/// missing or mistyped field is a single [`ProtocolError::Payload`] at the
/// protocol boundary and handlers only ever see well-formed input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoginAccount(Credentials),
    CreateAccount(Credentials),
    CreateCharacter(CreateCharacter),
    GetCharacter(GetCharacter),
    SelectCharacter(SelectCharacter),
}

impl Command {
    /// Canonical name of this command as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::LoginAccount(_) => "LOGIN_ACCOUNT",
            Command::CreateAccount(_) => "CREATE_ACCOUNT",
            Command::CreateCharacter(_) => "CREATE_CHARACTER",
            Command::GetCharacter(_) => "GET_CHARACTER",
            Command::SelectCharacter(_) => "SELECT_CHARACTER",
        }
    }

    /// Resolves a raw envelope into a typed command.
    ///
    /// # Errors
    /// - [`ProtocolError::MissingCommand`] — `Command` absent or empty
    /// - [`ProtocolError::UnknownCommand`] — name not recognized
    /// - [`ProtocolError::Payload`] — `Data` missing a field or wrong-typed
    pub fn from_envelope(
        envelope: RequestEnvelope,
    ) -> Result<Self, ProtocolError> {
        let name = match envelope.command.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(ProtocolError::MissingCommand),
        };

        fn payload<T: serde::de::DeserializeOwned>(
            command: &'static str,
            data: serde_json::Value,
        ) -> Result<T, ProtocolError> {
            serde_json::from_value(data)
                .map_err(|source| ProtocolError::Payload { command, source })
        }

        match name.to_ascii_uppercase().as_str() {
            "LOGIN_ACCOUNT" => {
                payload("LOGIN_ACCOUNT", envelope.data)
                    .map(Command::LoginAccount)
            }
            "CREATE_ACCOUNT" => {
                payload("CREATE_ACCOUNT", envelope.data)
                    .map(Command::CreateAccount)
            }
            "CREATE_CHARACTER" => {
                payload("CREATE_CHARACTER", envelope.data)
                    .map(Command::CreateCharacter)
            }
            "GET_CHARACTER" => {
                payload("GET_CHARACTER", envelope.data)
                    .map(Command::GetCharacter)
            }
            "SELECT_CHARACTER" => {
                payload("SELECT_CHARACTER", envelope.data)
                    .map(Command::SelectCharacter)
            }
            _ => Err(ProtocolError::UnknownCommand(name.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Outcome of a command, as it appears in the `Status` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Error,
}

/// The outbound envelope. Every reply on the wire is one of these.
///
/// `Status` and `Message` are always present; `Data` is omitted entirely
/// when there is nothing to attach (clients accept absent and `null`
/// interchangeably).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Response {
    /// A `SUCCESS` response with no payload.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
        }
    }

    /// A `SUCCESS` response carrying a payload.
    pub fn success_with(
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    /// An `ERROR` response. Used for protocol errors and expected domain
    /// failures alike; the message is the whole story for the client.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
