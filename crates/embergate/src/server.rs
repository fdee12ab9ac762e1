//! `EmbergateServer` builder and accept loop.
//!
//! This is the entry point for running a gate server. It ties the layers
//! together: transport → protocol → session registry / storage.

use std::sync::Arc;

use embergate_protocol::{Codec, JsonCodec};
use embergate_session::SessionRegistry;
use embergate_storage::StorageProvider;
use embergate_transport::{TcpTransport, Transport, DEFAULT_READ_BUFFER};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::EmbergateError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The session
/// registry sits behind one `Mutex` — that single lock is what makes
/// login's check-and-bind atomic across connections. The storage provider
/// serializes itself and needs no lock here.
pub(crate) struct ServerState<S: StorageProvider, C: Codec> {
    pub(crate) registry: Mutex<SessionRegistry>,
    pub(crate) storage: S,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a gate server.
///
/// # Example
///
/// ```rust,no_run
/// use embergate::prelude::*;
///
/// # async fn run() -> Result<(), EmbergateError> {
/// let server = EmbergateServerBuilder::new()
///     .bind("0.0.0.0:7777")
///     .build(MemoryStorage::new())
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct EmbergateServerBuilder {
    bind_addr: String,
    read_buffer: usize,
}

impl EmbergateServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:7777".to_string(),
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-connection read-buffer (maximum message) size.
    pub fn read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer = bytes;
        self
    }

    /// Binds the listener and builds the server with the given storage
    /// provider. Uses `JsonCodec` — the only codec deployed clients speak.
    ///
    /// # Errors
    /// A bind failure here is the one process-fatal error in the system.
    pub async fn build<S: StorageProvider>(
        self,
        storage: S,
    ) -> Result<EmbergateServer<S, JsonCodec>, EmbergateError> {
        let transport =
            TcpTransport::bind_with_buffer(&self.bind_addr, self.read_buffer)
                .await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(SessionRegistry::new()),
            storage,
            codec: JsonCodec,
        });

        Ok(EmbergateServer { transport, state })
    }
}

impl Default for EmbergateServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running gate server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct EmbergateServer<S: StorageProvider, C: Codec> {
    transport: TcpTransport,
    state: Arc<ServerState<S, C>>,
}

impl<S, C> EmbergateServer<S, C>
where
    S: StorageProvider,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> EmbergateServerBuilder {
        EmbergateServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each,
    /// so the loop itself never waits on any connection's I/O or command
    /// work. A failed accept is logged and the loop continues; only
    /// process termination stops it.
    pub async fn run(mut self) -> Result<(), EmbergateError> {
        tracing::info!("Embergate server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
