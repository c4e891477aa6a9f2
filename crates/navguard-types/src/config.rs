//! Global configuration types for Navguard.
//!
//! `GlobalConfig` represents the top-level `config.toml` that tunes the abuse
//! guard windows, callback dispatch policy, and background sweep cadence.
//! Every field has a default so an empty file is a valid config.

use serde::{Deserialize, Serialize};

use std::time::Duration;

/// Top-level configuration.
///
/// Loaded from `~/.navguard/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Sliding-window thresholds for the abuse guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Inbound messages remembered per user (FIFO).
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Window for counting repeated inbound text and for pruning presses.
    #[serde(default = "default_duplicate_window_ms")]
    pub duplicate_window_ms: u64,

    /// Repetitions within the duplicate window that count as a loop.
    #[serde(default = "default_loop_threshold")]
    pub loop_threshold: usize,

    /// Window in which a second press of the same button is rate limited.
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,

    /// Minimum gap before the same outbound text may be sent again.
    #[serde(default = "default_outbound_min_interval_ms")]
    pub outbound_min_interval_ms: u64,
}

fn default_history_cap() -> usize {
    20
}

fn default_duplicate_window_ms() -> u64 {
    10_000
}

fn default_loop_threshold() -> usize {
    3
}

fn default_rate_limit_window_ms() -> u64 {
    2_000
}

fn default_outbound_min_interval_ms() -> u64 {
    2_000
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            duplicate_window_ms: default_duplicate_window_ms(),
            loop_threshold: default_loop_threshold(),
            rate_limit_window_ms: default_rate_limit_window_ms(),
            outbound_min_interval_ms: default_outbound_min_interval_ms(),
        }
    }
}

impl GuardConfig {
    pub fn duplicate_window(&self) -> Duration {
        Duration::from_millis(self.duplicate_window_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn outbound_min_interval(&self) -> Duration {
        Duration::from_millis(self.outbound_min_interval_ms)
    }

    /// Entries older than this are removed by a sweep.
    pub fn retention(&self) -> Duration {
        self.duplicate_window() * 2
    }
}

/// How the callback registry picks a handler when several prefixes match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// First registered prefix that matches wins.
    #[default]
    FirstMatch,
    /// The longest matching prefix wins, regardless of registration order.
    LongestPrefix,
}

/// Callback dispatch settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub match_policy: MatchPolicy,

    /// Upper bound on a single handler invocation. `None` lets handlers run
    /// to completion.
    #[serde(default)]
    pub handler_timeout_ms: Option<u64>,
}

impl DispatchConfig {
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }
}

/// Background sweep cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_sweep_interval_ms")]
    pub interval_ms: u64,
}

fn default_sweep_interval_ms() -> u64 {
    60_000
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_sweep_interval_ms(),
        }
    }
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.guard.history_cap, 20);
        assert_eq!(config.guard.duplicate_window(), Duration::from_secs(10));
        assert_eq!(config.guard.loop_threshold, 3);
        assert_eq!(config.guard.rate_limit_window(), Duration::from_secs(2));
        assert_eq!(config.guard.outbound_min_interval(), Duration::from_secs(2));
        assert_eq!(config.guard.retention(), Duration::from_secs(20));
        assert_eq!(config.dispatch.match_policy, MatchPolicy::FirstMatch);
        assert!(config.dispatch.handler_timeout().is_none());
        assert_eq!(config.sweep.interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_global_config_deserialize_partial_sections() {
        let toml_str = r#"
[guard]
loop_threshold = 5
rate_limit_window_ms = 1500

[dispatch]
match_policy = "longest_prefix"
handler_timeout_ms = 3000
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.guard.loop_threshold, 5);
        assert_eq!(config.guard.rate_limit_window(), Duration::from_millis(1500));
        // Untouched fields keep their defaults
        assert_eq!(config.guard.history_cap, 20);
        assert_eq!(config.dispatch.match_policy, MatchPolicy::LongestPrefix);
        assert_eq!(
            config.dispatch.handler_timeout(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(config.sweep.interval_ms, 60_000);
    }
}
