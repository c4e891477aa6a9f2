//! SQLite storage layer.
//!
//! The durable menu-state store backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod menu_state;
pub mod pool;

pub use menu_state::SqliteMenuStateStore;
pub use pool::DatabasePool;
