//! Menu graph: the static registry and the navigation engine.
//!
//! - `catalog` -- built-in menu nodes and button-label table
//! - `registry` -- `MenuRegistry`, validated slot table with label resolution
//! - `engine` -- `NavigationEngine`, transitions that update session state

pub mod catalog;
pub mod engine;
pub mod registry;

pub use engine::NavigationEngine;
pub use registry::{MenuRegistry, RegistryReport, BACK_LABEL_PREFIX};
