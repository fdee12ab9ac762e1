//! Plain TCP transport implementation.
//!
//! The gate protocol is unframed JSON over TCP: every read chunk is treated
//! as one complete message, and every message is written in one `send`.
//! There is no length prefix and no delimiter. That matches the clients in
//! the wild, so the transport keeps the behavior rather than fixing it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Default size of the per-connection read buffer.
///
/// Also the maximum message size: a request larger than this is truncated
/// by the one-chunk-one-message rule and will fail to decode upstream.
pub const DEFAULT_READ_BUFFER: usize = 4096;

/// A TCP [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
    read_buffer: usize,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        Self::bind_with_buffer(addr, DEFAULT_READ_BUFFER).await
    }

    /// Binds with a custom read-buffer (maximum message) size.
    pub async fn bind_with_buffer(
        addr: &str,
        read_buffer: usize,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self {
            listener,
            read_buffer,
        })
    }

    /// Returns the local address the listener is bound to.
    ///
    /// Tests bind to port 0 and use this to discover the real port.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted TCP connection");

        Ok(TcpConnection {
            id,
            stream: Arc::new(Mutex::new(stream)),
            read_buffer: self.read_buffer,
        })
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        // The listener closes when the transport is dropped; nothing to
        // release here.
        Ok(())
    }
}

/// A single TCP connection.
pub struct TcpConnection {
    id: ConnectionId,
    stream: Arc<Mutex<TcpStream>>,
    read_buffer: usize,
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let mut stream = self.stream.lock().await;
        stream
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)?;
        stream.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut buf = vec![0u8; self.read_buffer];
        let n = self
            .stream
            .lock()
            .await
            .read(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        // Zero-length read means the peer closed the stream.
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.stream
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
