//! Infrastructure layer for Navguard.
//!
//! Contains the SQLite implementation of the durable store trait defined in
//! `navguard-core`, the `config.toml` loader, and data-directory resolution.

pub mod config;
pub mod data_dir;
pub mod sqlite;
