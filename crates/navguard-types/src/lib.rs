//! Shared domain types for Navguard.
//!
//! This crate contains the domain types used across the workspace: menu
//! graph nodes, user identifiers, callback payloads, configuration, activity
//! records, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod activity;
pub mod callback;
pub mod config;
pub mod error;
pub mod menu;
pub mod user;
