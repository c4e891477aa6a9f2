//! Repository trait definitions.
//!
//! These are the "ports" the infrastructure layer implements. The core never
//! depends on a concrete database crate.

pub mod menu_state;

pub use menu_state::MenuStateStore;
