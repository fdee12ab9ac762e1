//! The storage contract the gate server consumes.
//!
//! Embergate doesn't mandate a persistence engine. It defines the
//! [`StorageProvider`] trait — five async operations over accounts and
//! characters — and deployments bring the implementation: a SQL pool in
//! production, [`MemoryStorage`](crate::MemoryStorage) for development and
//! tests. The server core calls through this trait and nothing else.
//!
//! Backends provide their own internal serialization or transactional
//! guarantees; the core does not coordinate concurrent storage calls and
//! never retries a failed one.

use embergate_protocol::AccountId;

use crate::{Character, StorageError};

/// Persistence operations for accounts and player characters.
///
/// `Send + Sync + 'static` because one provider instance is shared by
/// every connection task for the life of the server. Each method returns
/// a `Send` future for the same reason.
pub trait StorageProvider: Send + Sync + 'static {
    /// Checks a username/password pair.
    ///
    /// Returns `Ok(Some(account_id))` on a match, `Ok(None)` when the
    /// account doesn't exist or the password is wrong — the two cases are
    /// deliberately indistinguishable to callers (and clients).
    fn validate_account(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Option<AccountId>, StorageError>> + Send;

    /// Returns `true` if an account with this username exists.
    fn account_exists(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool, StorageError>> + Send;

    /// Creates an account. The password is stored only as a salted hash.
    ///
    /// # Errors
    /// [`StorageError::Constraint`] if the username is already taken,
    /// [`StorageError::Backend`] on I/O failure.
    fn insert_account(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AccountId, StorageError>> + Send;

    /// Persists a character. Returns `false` when the backend declines to
    /// persist it (the reason is backend-specific; callers only need the
    /// bit).
    fn insert_character(
        &self,
        character: Character,
    ) -> impl std::future::Future<Output = Result<bool, StorageError>> + Send;

    /// Fetches a character for the account, or `None` if it has none.
    fn characters_by_account(
        &self,
        account_id: AccountId,
    ) -> impl std::future::Future<Output = Result<Option<Character>, StorageError>> + Send;
}
