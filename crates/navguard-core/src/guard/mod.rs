//! Abuse guard: loop detection, button rate limiting, outbound dedup.

pub mod abuse;

pub use abuse::{AbuseGuard, SweepStats};
