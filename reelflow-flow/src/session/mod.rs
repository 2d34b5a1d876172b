//! Session layer
//!
//! Replaces ambient global storage with an explicit [`SessionContext`] over a
//! pluggable [`SessionStore`].

mod context;
mod store;

pub use context::SessionContext;
pub use store::{JsonFileStore, MemoryStore, SessionStore, StoreError};
