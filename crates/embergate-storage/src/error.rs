//! Error types for the storage layer.

/// Errors that can occur in a storage backend.
///
/// The connection handler never unpacks these — any storage failure is
/// surfaced to the client as one generic `ERROR` envelope and is not
/// retried. The variants exist for logs and for backends to be precise.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend itself failed (I/O, pool exhausted, process state).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A uniqueness or referential constraint was violated.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Password hashing or verification failed.
    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}
