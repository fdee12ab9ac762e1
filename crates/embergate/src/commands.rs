//! The five command handlers.
//!
//! Each handler takes its typed payload and returns a response envelope.
//! Expected outcomes — wrong password, duplicate account, no characters —
//! are `ERROR` envelopes with their contractual messages, not Rust
//! errors. Only storage faults propagate as `Err`, and the handler layer
//! above converts those to a generic error response.

use std::sync::Arc;

use embergate_protocol::{
    Codec, Command, CreateCharacter, Credentials, GetCharacter,
    ProtocolError, Response, SelectCharacter,
};
use embergate_storage::{Character, StorageProvider};
use embergate_transport::ConnectionId;
use serde_json::json;

use crate::server::ServerState;
use crate::EmbergateError;

/// Routes a typed command to its handler.
pub(crate) async fn dispatch<S, C>(
    state: &Arc<ServerState<S, C>>,
    connection: ConnectionId,
    command: Command,
) -> Result<Response, EmbergateError>
where
    S: StorageProvider,
    C: Codec,
{
    match command {
        Command::LoginAccount(payload) => {
            login_account(state, connection, payload).await
        }
        Command::CreateAccount(payload) => {
            create_account(state, payload).await
        }
        Command::CreateCharacter(payload) => {
            create_character(state, payload).await
        }
        Command::GetCharacter(payload) => {
            get_character(state, payload).await
        }
        Command::SelectCharacter(payload) => {
            select_character(state, payload).await
        }
    }
}

/// `LOGIN_ACCOUNT`: validate credentials, then atomically claim the
/// account's session slot.
///
/// The registry lock is taken once, around the single check-and-bind, so
/// two connections racing to log in as the same account can never both
/// succeed. The bind also refuses a connection that already logged in as
/// some account; both refusals share the "already logged in" envelope.
/// "Bad username" and "bad password" share one message so clients cannot
/// enumerate accounts.
async fn login_account<S, C>(
    state: &Arc<ServerState<S, C>>,
    connection: ConnectionId,
    payload: Credentials,
) -> Result<Response, EmbergateError>
where
    S: StorageProvider,
    C: Codec,
{
    let Some(account_id) = state
        .storage
        .validate_account(&payload.username, &payload.password)
        .await?
    else {
        tracing::debug!(username = %payload.username, "login rejected");
        return Ok(Response::error("Invalid username or password"));
    };

    if !state.registry.lock().await.try_bind(account_id, connection) {
        tracing::debug!(%account_id, "duplicate login rejected");
        return Ok(Response::error("Account already logged in"));
    }

    tracing::info!(%account_id, %connection, "account logged in");
    Ok(Response::success_with(
        "Login successful",
        json!({ "accountId": account_id }),
    ))
}

/// `CREATE_ACCOUNT`: register a new account.
///
/// The password reaches storage exactly once and is persisted only as a
/// salted hash. The exists-check races harmlessly with a concurrent
/// create: storage enforces username uniqueness and the loser surfaces
/// as a storage error.
async fn create_account<S, C>(
    state: &Arc<ServerState<S, C>>,
    payload: Credentials,
) -> Result<Response, EmbergateError>
where
    S: StorageProvider,
    C: Codec,
{
    if state.storage.account_exists(&payload.username).await? {
        return Ok(Response::error("Account already exists"));
    }

    let account_id = state
        .storage
        .insert_account(&payload.username, &payload.password)
        .await?;

    tracing::info!(%account_id, username = %payload.username, "account created");
    Ok(Response::success("Account created"))
}

/// `CREATE_CHARACTER`: build the default stat block and persist it.
async fn create_character<S, C>(
    state: &Arc<ServerState<S, C>>,
    payload: CreateCharacter,
) -> Result<Response, EmbergateError>
where
    S: StorageProvider,
    C: Codec,
{
    let character =
        Character::new(payload.account_id, payload.name, payload.race);

    if !state.storage.insert_character(character).await? {
        return Ok(Response::error("Failed to create character"));
    }

    tracing::info!(account_id = %payload.account_id, "character created");
    Ok(Response::success("Character created"))
}

/// `GET_CHARACTER`: fetch the account's character summary.
async fn get_character<S, C>(
    state: &Arc<ServerState<S, C>>,
    payload: GetCharacter,
) -> Result<Response, EmbergateError>
where
    S: StorageProvider,
    C: Codec,
{
    let Some(character) = state
        .storage
        .characters_by_account(payload.account_id)
        .await?
    else {
        return Ok(Response::error("No characters found"));
    };

    let summary =
        serde_json::to_value(&character).map_err(ProtocolError::Encode)?;
    Ok(Response::success_with("Character found", summary))
}

/// `SELECT_CHARACTER`: confirm the account has a character to enter the
/// world with.
///
/// The name in the payload is advisory: the contract only requires that
/// some character exists for the account, so a mismatch is logged, not
/// rejected.
async fn select_character<S, C>(
    state: &Arc<ServerState<S, C>>,
    payload: SelectCharacter,
) -> Result<Response, EmbergateError>
where
    S: StorageProvider,
    C: Codec,
{
    let Some(character) = state
        .storage
        .characters_by_account(payload.account_id)
        .await?
    else {
        return Ok(Response::error("Character not found"));
    };

    if character.name != payload.character_name {
        tracing::debug!(
            account_id = %payload.account_id,
            requested = %payload.character_name,
            found = %character.name,
            "selected name differs from stored character"
        );
    }

    Ok(Response::success("Character selected"))
}
