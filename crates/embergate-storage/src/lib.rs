//! Account and character persistence for Embergate.
//!
//! This crate holds three things:
//!
//! 1. **The contract** — the [`StorageProvider`] trait the server core
//!    calls through (validate/insert accounts, insert/fetch characters).
//! 2. **The records** — [`Account`] and [`Character`], including the fixed
//!    stat block a new character starts with.
//! 3. **A reference backend** — [`MemoryStorage`], HashMaps plus bcrypt,
//!    used by the dev binary and the test suites.
//!
//! The server core never touches a concrete backend type; swapping
//! `MemoryStorage` for a SQL pool is a deployment decision, not a code
//! change in the core.

mod error;
mod memory;
mod provider;
mod records;

pub use error::StorageError;
pub use memory::MemoryStorage;
pub use provider::StorageProvider;
pub use records::{Account, Character};
