//! The session registry: which account is live on which connection.
//!
//! This is the only state shared across connection tasks. It enforces the
//! server's core rule: at most one live connection per authenticated
//! account, under arbitrary concurrency.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — it uses plain
//! `HashMap`s. The server wraps the whole registry in a single
//! `tokio::sync::Mutex`, which is exactly the point: the forward and
//! reverse maps must change together or not at all, so there is one
//! critical section per bind/release, never a lock per map. Two
//! independently locked maps could tear (login observed in one direction
//! but not the other) under a concurrent release.

use std::collections::HashMap;

use embergate_protocol::AccountId;
use embergate_transport::ConnectionId;

/// Tracks the live account ↔ connection associations.
///
/// Invariant: `by_account` and `by_connection` are inverse images of each
/// other at every point where the registry's lock is not held. An account
/// appears in `by_account` if and only if its connection appears in
/// `by_connection`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Forward map: which connection currently represents an account.
    by_account: HashMap<AccountId, ConnectionId>,

    /// Reverse map: which account a connection authenticated as.
    ///
    /// Needed so teardown can release by connection id alone — the handler
    /// doesn't know (or care) whether its connection ever logged in.
    by_connection: HashMap<ConnectionId, AccountId>,
}

impl SessionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically binds `account_id` to `connection` if neither side is
    /// already bound.
    ///
    /// Returns `false` and mutates nothing when the account already has a
    /// live session (including on this same connection) or when the
    /// connection already represents an account. A connection's account is
    /// set exactly once for its lifetime; allowing a rebind would strand
    /// the first account in `by_account` with no reverse entry to release
    /// it through. The check and the two inserts happen under the caller's
    /// single lock acquisition, so two concurrent logins for one account
    /// can never both succeed.
    pub fn try_bind(
        &mut self,
        account_id: AccountId,
        connection: ConnectionId,
    ) -> bool {
        if self.by_account.contains_key(&account_id)
            || self.by_connection.contains_key(&connection)
        {
            return false;
        }
        self.by_account.insert(account_id, connection);
        self.by_connection.insert(connection, account_id);
        tracing::info!(%account_id, %connection, "session bound");
        true
    }

    /// Releases whatever session `connection` holds, if any.
    ///
    /// Idempotent: safe to call repeatedly and on connections that never
    /// logged in. Teardown calls this unconditionally on every exit path.
    pub fn release(&mut self, connection: ConnectionId) {
        if let Some(account_id) = self.by_connection.remove(&connection) {
            self.by_account.remove(&account_id);
            tracing::info!(%account_id, %connection, "session released");
        }
    }

    /// Returns `true` if the account currently has a live session.
    pub fn is_bound(&self, account_id: AccountId) -> bool {
        self.by_account.contains_key(&account_id)
    }

    /// Returns the account a connection authenticated as, if it did.
    pub fn account_for(
        &self,
        connection: ConnectionId,
    ) -> Option<AccountId> {
        self.by_connection.get(&connection).copied()
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.by_account.len(), self.by_connection.len());
        self.by_account.len()
    }

    /// Returns `true` if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.by_account.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(id: u64) -> AccountId {
        AccountId(id)
    }

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    // =====================================================================
    // try_bind()
    // =====================================================================

    #[test]
    fn test_try_bind_new_account_succeeds() {
        let mut reg = SessionRegistry::new();

        assert!(reg.try_bind(acct(1), conn(10)));
        assert!(reg.is_bound(acct(1)));
        assert_eq!(reg.account_for(conn(10)), Some(acct(1)));
    }

    #[test]
    fn test_try_bind_already_bound_fails_without_mutation() {
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));

        assert!(!reg.try_bind(acct(1), conn(20)));

        // The original binding must be untouched.
        assert_eq!(reg.account_for(conn(10)), Some(acct(1)));
        assert_eq!(reg.account_for(conn(20)), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_try_bind_same_connection_twice_fails_second_time() {
        // A connection logging in again as the same account is still a
        // duplicate login from the registry's point of view.
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));

        assert!(!reg.try_bind(acct(1), conn(10)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_try_bind_bound_connection_cannot_claim_second_account() {
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));

        assert!(
            !reg.try_bind(acct(2), conn(10)),
            "a connection's account is set exactly once"
        );

        // The first binding is untouched and account 2 stays free.
        assert_eq!(reg.account_for(conn(10)), Some(acct(1)));
        assert!(!reg.is_bound(acct(2)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_rejected_second_account_leaves_first_releasable() {
        // A rejected second bind must not orphan the first account: after
        // the connection releases, both accounts are free again.
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));
        let _ = reg.try_bind(acct(2), conn(10));

        reg.release(conn(10));

        assert!(!reg.is_bound(acct(1)));
        assert!(!reg.is_bound(acct(2)));
        assert!(reg.is_empty());
        assert!(reg.try_bind(acct(1), conn(20)));
    }

    #[test]
    fn test_try_bind_distinct_accounts_coexist() {
        let mut reg = SessionRegistry::new();

        assert!(reg.try_bind(acct(1), conn(10)));
        assert!(reg.try_bind(acct(2), conn(20)));

        assert_eq!(reg.len(), 2);
        assert!(reg.is_bound(acct(1)));
        assert!(reg.is_bound(acct(2)));
    }

    // =====================================================================
    // release()
    // =====================================================================

    #[test]
    fn test_release_removes_both_directions() {
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));

        reg.release(conn(10));

        assert!(!reg.is_bound(acct(1)));
        assert_eq!(reg.account_for(conn(10)), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_release_unbound_connection_is_noop() {
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));

        // conn(99) never logged in; releasing it must not disturb others.
        reg.release(conn(99));

        assert!(reg.is_bound(acct(1)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));

        reg.release(conn(10));
        reg.release(conn(10));
        reg.release(conn(10));

        assert!(reg.is_empty());
    }

    #[test]
    fn test_release_then_rebind_from_other_connection_succeeds() {
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));
        reg.release(conn(10));

        assert!(
            reg.try_bind(acct(1), conn(20)),
            "account must be rebindable after release"
        );
        assert_eq!(reg.account_for(conn(20)), Some(acct(1)));
    }

    #[test]
    fn test_release_one_connection_leaves_others_bound() {
        let mut reg = SessionRegistry::new();
        reg.try_bind(acct(1), conn(10));
        reg.try_bind(acct(2), conn(20));

        reg.release(conn(10));

        assert!(!reg.is_bound(acct(1)));
        assert!(reg.is_bound(acct(2)));
        assert_eq!(reg.len(), 1);
    }

    // =====================================================================
    // Concurrency: the one-login-per-account race
    // =====================================================================

    #[test]
    fn test_concurrent_try_bind_exactly_one_wins() {
        // Many threads race to bind the same account through the same
        // mutex discipline the server uses. Exactly one must win, every
        // loser must see a clean false, and the maps must stay consistent.
        use std::sync::{Arc, Mutex};

        let reg = Arc::new(Mutex::new(SessionRegistry::new()));
        let mut handles = Vec::new();

        for i in 0..16u64 {
            let reg = Arc::clone(&reg);
            handles.push(std::thread::spawn(move || {
                reg.lock().unwrap().try_bind(acct(1), conn(100 + i))
            }));
        }

        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();

        assert_eq!(wins, 1, "exactly one concurrent bind may succeed");
        let reg = reg.lock().unwrap();
        assert_eq!(reg.len(), 1);
        assert!(reg.is_bound(acct(1)));
    }

    #[test]
    fn test_concurrent_bind_release_churn_stays_consistent() {
        // Interleaved binds and releases across many accounts must never
        // leave the maps disagreeing (len() debug-asserts the pair).
        use std::sync::{Arc, Mutex};

        let reg = Arc::new(Mutex::new(SessionRegistry::new()));
        let mut handles = Vec::new();

        for i in 0..8u64 {
            let reg = Arc::clone(&reg);
            handles.push(std::thread::spawn(move || {
                for round in 0..50u64 {
                    let c = conn(i * 1000 + round);
                    let mut reg = reg.lock().unwrap();
                    if reg.try_bind(acct(i % 4), c) {
                        reg.release(c);
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let reg = reg.lock().unwrap();
        assert!(reg.is_empty(), "every successful bind was released");
    }
}
