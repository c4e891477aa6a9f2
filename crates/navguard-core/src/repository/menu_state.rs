//! Durable menu-state store trait.
//!
//! The durable store is a crash-recovery replica of the in-memory session
//! cache plus an append-only activity log. Every call is treated as
//! best-effort by the session store; implementations should simply report
//! failures and never retry on their own.

use navguard_types::error::RepositoryError;
use navguard_types::user::UserId;

/// Trait for durable per-user menu state and activity logging.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in navguard-infra.
pub trait MenuStateStore: Send + Sync {
    /// Persist the user's current menu tag (upsert).
    fn store_menu_state(
        &self,
        user_id: &UserId,
        menu_tag: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Read the user's last persisted menu tag. Returns None if the user has
    /// never been stored.
    fn get_menu_state(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Append an entry to the activity log.
    fn log_activity(
        &self,
        user_id: &UserId,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
