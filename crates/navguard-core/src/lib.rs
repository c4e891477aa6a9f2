//! Navigation, dispatch, and abuse-guard logic for Navguard.
//!
//! This crate defines the ports (durable store and chat transport traits)
//! that the infrastructure and binary crates implement. It depends only on
//! `navguard-types` -- never on `navguard-infra` or any database crate.

pub mod conversation;
pub mod dispatch;
pub mod guard;
pub mod menu;
pub mod repository;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
