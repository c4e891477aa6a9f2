use thiserror::Error;

use crate::menu::{AccessRequirement, MenuType};

/// Errors from the menu registry and navigation engine.
#[derive(Debug, Error)]
pub enum NavError {
    /// A tag that is not in the menu table (stale or malformed input).
    #[error("unknown menu: '{0}'")]
    UnknownMenu(String),

    #[error("menu '{menu}' requires {requirement}")]
    AccessDenied {
        menu: MenuType,
        requirement: AccessRequirement,
    },
}

/// Errors raised while building the menu registry at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no node declared for menu '{0}'")]
    MissingNode(MenuType),

    #[error("menu '{0}' declared more than once")]
    DuplicateNode(MenuType),

    #[error("root menu '{0}' must not have a parent")]
    RootHasParent(MenuType),

    #[error("parent chain from '{0}' does not reach the root (cycle)")]
    ParentCycle(MenuType),
}

/// Errors surfaced at the callback dispatch boundary.
///
/// These never propagate past `dispatch`; they are logged and turned into a
/// generic acknowledgment for the user.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no handler registered for payload '{0}'")]
    Miss(String),

    #[error("handler '{prefix}' failed: {message}")]
    HandlerFailure { prefix: String, message: String },

    #[error("handler '{prefix}' timed out after {timeout_ms}ms")]
    Timeout { prefix: String, timeout_ms: u64 },
}

/// Error returned by a callback handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("navigation error: {0}")]
    Nav(#[from] NavError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Other(String),
}

/// Errors from the chat transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Errors from repository operations (durable store).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

impl From<TransportError> for HandlerError {
    fn from(err: TransportError) -> Self {
        HandlerError::Transport(err.to_string())
    }
}
