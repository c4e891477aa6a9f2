//! Conversation front door: per-user ordering, abuse guard, routing.

pub mod lanes;
pub mod service;

pub use lanes::UserLanes;
pub use service::{CallbackOutcome, ConversationService, Reply, Suppression};
