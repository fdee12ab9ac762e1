//! Per-connection handler: the read/decode/dispatch/respond loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The state machine per connection is simple — read a message, turn it
//! into a typed command, run the command, write the response, repeat —
//! with two hard rules:
//!
//! - A bad message never kills the connection. Every protocol or command
//!   failure becomes an `ERROR` envelope and the loop keeps reading.
//! - Teardown runs exactly once on every exit path (peer close, I/O
//!   error, handler bug): the stream is closed and the connection's
//!   registry slot is released, whether or not it ever logged in.
//!
//! Within one connection, messages are processed strictly in arrival
//! order; there is no pipelining.

use std::sync::Arc;

use embergate_protocol::{
    Codec, Command, ProtocolError, RequestEnvelope, Response,
};
use embergate_storage::StorageProvider;
use embergate_transport::{Connection, ConnectionId, TcpConnection};

use crate::commands;
use crate::server::ServerState;
use crate::EmbergateError;

/// Drop guard that releases the connection's session-registry slot.
///
/// Armed as soon as the handler starts, so the release happens even if
/// the read loop exits through an error path or a panic unwind. Since
/// `Drop` is synchronous, the async lock is taken in a spawned task;
/// `release` is idempotent, so racing a normal exit is harmless.
struct ReleaseGuard<S: StorageProvider, C: Codec> {
    connection: ConnectionId,
    state: Arc<ServerState<S, C>>,
}

impl<S: StorageProvider, C: Codec> Drop for ReleaseGuard<S, C> {
    fn drop(&mut self) {
        let connection = self.connection;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.registry.lock().await.release(connection);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: TcpConnection,
    state: Arc<ServerState<S, C>>,
) -> Result<(), EmbergateError>
where
    S: StorageProvider,
    C: Codec,
{
    let connection = conn.id();
    tracing::debug!(%connection, "handling new connection");

    let _guard = ReleaseGuard {
        connection,
        state: Arc::clone(&state),
    };

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%connection, "connection closed by peer");
                break;
            }
            Err(e) => {
                tracing::debug!(%connection, error = %e, "recv error");
                break;
            }
        };

        let response = process_message(&state, connection, &data).await;

        // Encode failure is a server bug, not client input; let it end
        // the connection and surface in the logs.
        let bytes = state.codec.encode(&response)?;
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%connection, error = %e, "send error");
            break;
        }
    }

    // Teardown: close the stream, then _guard releases the registry slot.
    let _ = conn.close().await;
    Ok(())
}

/// Turns one inbound buffer into exactly one response envelope.
///
/// This is the containment boundary: nothing below it may escape as a
/// Rust error except response encoding. Decode failures, bad commands,
/// and storage faults all come back as `ERROR` responses.
async fn process_message<S, C>(
    state: &Arc<ServerState<S, C>>,
    connection: ConnectionId,
    data: &[u8],
) -> Response
where
    S: StorageProvider,
    C: Codec,
{
    let envelope: RequestEnvelope = match state.codec.decode(data) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(%connection, error = %e, "malformed request");
            return Response::error("Malformed JSON request");
        }
    };

    let command = match Command::from_envelope(envelope) {
        Ok(command) => command,
        Err(e) => return protocol_error_response(connection, e),
    };

    let name = command.name();
    match commands::dispatch(state, connection, command).await {
        Ok(response) => response,
        Err(e) => {
            // Storage faults land here. No retry at this layer; the
            // client gets a generic error and the connection lives on.
            tracing::warn!(
                %connection,
                command = name,
                error = %e,
                "command failed"
            );
            Response::error("Internal server error")
        }
    }
}

/// Maps a request-parse failure to its wire message.
fn protocol_error_response(
    connection: ConnectionId,
    error: ProtocolError,
) -> Response {
    tracing::debug!(%connection, error = %error, "rejected request");
    match error {
        ProtocolError::MissingCommand => {
            Response::error("Invalid request format")
        }
        ProtocolError::UnknownCommand(_) => {
            Response::error("Unknown command")
        }
        ProtocolError::Payload { .. } => {
            Response::error("Invalid request format")
        }
        ProtocolError::Decode(_) | ProtocolError::Encode(_) => {
            Response::error("Malformed JSON request")
        }
    }
}
