//! Per-user session state.
//!
//! - `store` -- `SessionStore`, the cache-first map of each user's menu
//! - `persist` -- `PersistenceQueue`, the single writer task that owns the durable store

pub mod persist;
pub mod store;

pub use persist::PersistenceQueue;
pub use store::SessionStore;
