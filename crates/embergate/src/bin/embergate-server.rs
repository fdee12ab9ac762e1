//! Development gate server: in-memory storage, JSON over TCP.
//!
//! Configuration comes from the environment:
//! - `EMBERGATE_ADDR` — listen address (default `0.0.0.0:7777`)
//! - `RUST_LOG` — tracing filter (default `info`)
//!
//! State is process-lifetime only; accounts and characters vanish on
//! restart. A persistent deployment swaps `MemoryStorage` for a backend
//! implementing `StorageProvider`.

use embergate::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), EmbergateError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("EMBERGATE_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:7777".to_string());

    let server = EmbergateServerBuilder::new()
        .bind(&addr)
        .build(MemoryStorage::new())
        .await?;

    tracing::info!(%addr, "embergate listening");
    server.run().await
}
