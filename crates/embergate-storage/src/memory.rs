//! In-process reference backend.
//!
//! `MemoryStorage` implements the full [`StorageProvider`] contract over
//! HashMaps. It backs the development binary and the integration tests; a
//! SQL deployment implements the same trait against a pool instead. State
//! lives for the process and is gone on restart.

use std::collections::HashMap;

use embergate_protocol::{AccountId, CharacterId};
use tokio::sync::Mutex;

use crate::{Account, Character, StorageError, StorageProvider};

/// Everything behind one async mutex: the contract promises the backend
/// serializes its own operations.
#[derive(Debug, Default)]
struct Inner {
    /// Accounts keyed by username (the unique column).
    accounts: HashMap<String, Account>,
    /// Characters grouped by owning account, in creation order.
    characters: HashMap<AccountId, Vec<Character>>,
    next_account_id: u64,
    next_character_id: u64,
}

/// An in-memory [`StorageProvider`].
pub struct MemoryStorage {
    inner: Mutex<Inner>,
    bcrypt_cost: u32,
}

impl MemoryStorage {
    /// Creates an empty store hashing passwords at bcrypt's default cost.
    pub fn new() -> Self {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }

    /// Creates an empty store with an explicit bcrypt cost.
    ///
    /// Tests use the minimum cost (4); the default cost takes hundreds of
    /// milliseconds per hash, which is right for production and wrong for
    /// a test suite.
    pub fn with_cost(bcrypt_cost: u32) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            bcrypt_cost,
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageProvider for MemoryStorage {
    async fn validate_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountId>, StorageError> {
        let inner = self.inner.lock().await;
        let Some(account) = inner.accounts.get(username) else {
            return Ok(None);
        };
        if bcrypt::verify(password, &account.password_hash)? {
            Ok(Some(account.id))
        } else {
            Ok(None)
        }
    }

    async fn account_exists(
        &self,
        username: &str,
    ) -> Result<bool, StorageError> {
        Ok(self.inner.lock().await.accounts.contains_key(username))
    }

    async fn insert_account(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccountId, StorageError> {
        // Hash outside the lock; bcrypt is the slow part by design.
        let password_hash = bcrypt::hash(password, self.bcrypt_cost)?;

        let mut inner = self.inner.lock().await;
        if inner.accounts.contains_key(username) {
            return Err(StorageError::Constraint(format!(
                "username already taken: {username}"
            )));
        }

        inner.next_account_id += 1;
        let id = AccountId(inner.next_account_id);
        inner.accounts.insert(
            username.to_string(),
            Account {
                id,
                username: username.to_string(),
                password_hash,
            },
        );
        tracing::debug!(%id, username, "account inserted");
        Ok(id)
    }

    async fn insert_character(
        &self,
        mut character: Character,
    ) -> Result<bool, StorageError> {
        let mut inner = self.inner.lock().await;

        let duplicate = inner
            .characters
            .get(&character.account_id)
            .is_some_and(|roster| {
                roster.iter().any(|c| c.name == character.name)
            });
        if duplicate {
            // Duplicate name on the same account: declined, not an error.
            return Ok(false);
        }

        inner.next_character_id += 1;
        character.id = CharacterId(inner.next_character_id);
        tracing::debug!(
            id = %character.id,
            account_id = %character.account_id,
            name = %character.name,
            "character inserted"
        );
        inner
            .characters
            .entry(character.account_id)
            .or_default()
            .push(character);
        Ok(true)
    }

    async fn characters_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Character>, StorageError> {
        Ok(self
            .inner
            .lock()
            .await
            .characters
            .get(&account_id)
            .and_then(|roster| roster.first())
            .cloned())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimum bcrypt cost keeps the suite fast.
    fn store() -> MemoryStorage {
        MemoryStorage::with_cost(4)
    }

    // =====================================================================
    // Accounts
    // =====================================================================

    #[tokio::test]
    async fn test_insert_account_then_validate_succeeds() {
        let store = store();

        let id = store.insert_account("alice", "pw").await.unwrap();

        let validated = store.validate_account("alice", "pw").await.unwrap();
        assert_eq!(validated, Some(id));
    }

    #[tokio::test]
    async fn test_validate_account_wrong_password_returns_none() {
        let store = store();
        store.insert_account("alice", "pw").await.unwrap();

        let validated =
            store.validate_account("alice", "wrong").await.unwrap();
        assert_eq!(validated, None);
    }

    #[tokio::test]
    async fn test_validate_account_unknown_user_returns_none() {
        let store = store();

        let validated =
            store.validate_account("nobody", "pw").await.unwrap();
        assert_eq!(validated, None);
    }

    #[tokio::test]
    async fn test_insert_account_duplicate_returns_constraint_error() {
        let store = store();
        store.insert_account("alice", "pw").await.unwrap();

        let result = store.insert_account("alice", "other").await;
        assert!(matches!(result, Err(StorageError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_insert_account_never_stores_plaintext() {
        let store = store();
        store.insert_account("alice", "hunter2").await.unwrap();

        let inner = store.inner.lock().await;
        let hash = &inner.accounts["alice"].password_hash;
        assert!(!hash.contains("hunter2"));
        assert!(hash.starts_with("$2"), "expected a bcrypt hash, got {hash}");
    }

    #[tokio::test]
    async fn test_account_exists_tracks_inserts() {
        let store = store();
        assert!(!store.account_exists("alice").await.unwrap());

        store.insert_account("alice", "pw").await.unwrap();
        assert!(store.account_exists("alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_account_ids_are_sequential_and_distinct() {
        let store = store();
        let a = store.insert_account("alice", "pw").await.unwrap();
        let b = store.insert_account("bob", "pw").await.unwrap();
        assert_ne!(a, b);
    }

    // =====================================================================
    // Characters
    // =====================================================================

    #[tokio::test]
    async fn test_insert_character_assigns_id_and_is_fetchable() {
        let store = store();
        let account = store.insert_account("alice", "pw").await.unwrap();

        let ok = store
            .insert_character(Character::new(account, "Zed", "Elf"))
            .await
            .unwrap();
        assert!(ok);

        let fetched = store
            .characters_by_account(account)
            .await
            .unwrap()
            .expect("character should exist");
        assert_eq!(fetched.name, "Zed");
        assert_ne!(fetched.id, CharacterId(0), "storage must assign an id");
        assert_eq!(fetched.level, 1);
        assert_eq!(fetched.hp, 100);
        assert_eq!(fetched.mp, 50);
    }

    #[tokio::test]
    async fn test_insert_character_duplicate_name_returns_false() {
        let store = store();
        let account = store.insert_account("alice", "pw").await.unwrap();

        assert!(store
            .insert_character(Character::new(account, "Zed", "Elf"))
            .await
            .unwrap());
        assert!(!store
            .insert_character(Character::new(account, "Zed", "Orc"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_insert_character_same_name_other_account_is_fine() {
        let store = store();
        let alice = store.insert_account("alice", "pw").await.unwrap();
        let bob = store.insert_account("bob", "pw").await.unwrap();

        assert!(store
            .insert_character(Character::new(alice, "Zed", "Elf"))
            .await
            .unwrap());
        assert!(store
            .insert_character(Character::new(bob, "Zed", "Elf"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_characters_by_account_none_when_empty() {
        let store = store();
        let account = store.insert_account("alice", "pw").await.unwrap();

        let fetched = store.characters_by_account(account).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_characters_by_account_returns_first_created() {
        let store = store();
        let account = store.insert_account("alice", "pw").await.unwrap();

        store
            .insert_character(Character::new(account, "Zed", "Elf"))
            .await
            .unwrap();
        store
            .insert_character(Character::new(account, "Yara", "Orc"))
            .await
            .unwrap();

        let fetched = store
            .characters_by_account(account)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.name, "Zed");
    }
}
