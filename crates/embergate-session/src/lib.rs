//! Active-login tracking for Embergate.
//!
//! One rule lives here: an account may be represented by at most one live
//! connection at a time. [`SessionRegistry`] holds the account↔connection
//! association as a guarded pair of maps; the server layer wraps it in a
//! single mutex so every bind and release is one atomic step.
//!
//! # How it fits in the stack
//!
//! ```text
//! Command handlers (above)  ← bind on login, check duplicates
//!     ↕
//! Session layer (this crate)  ← owns the account ↔ connection pair
//!     ↕
//! Transport layer (below)  ← provides ConnectionId
//! ```

mod registry;

pub use registry::SessionRegistry;
