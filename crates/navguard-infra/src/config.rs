//! Loads `config.toml` from the data directory.
//!
//! A missing or unreadable file yields defaults. Values that would disable a
//! guard outright are corrected with a warning.

use std::path::Path;

use navguard_types::config::GlobalConfig;

/// Load `{data_dir}/config.toml`, falling back to [`GlobalConfig::default()`].
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let path = data_dir.join("config.toml");

    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return GlobalConfig::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config file unreadable, using defaults");
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&raw) {
        Ok(config) => sanitize(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config file invalid, using defaults");
            GlobalConfig::default()
        }
    }
}

/// Correct settings that parse but make no sense.
fn sanitize(mut config: GlobalConfig) -> GlobalConfig {
    let guard = &mut config.guard;
    if guard.loop_threshold == 0 {
        tracing::warn!("guard.loop_threshold = 0 would flag every message, using 1");
        guard.loop_threshold = 1;
    }
    // The history must hold enough messages to ever reach the threshold.
    if guard.history_cap < guard.loop_threshold {
        tracing::warn!(
            history_cap = guard.history_cap,
            loop_threshold = guard.loop_threshold,
            "guard.history_cap below loop_threshold, raising it"
        );
        guard.history_cap = guard.loop_threshold;
    }
    if config.dispatch.handler_timeout_ms == Some(0) {
        tracing::warn!("dispatch.handler_timeout_ms = 0 would fail every handler, disabling the timeout");
        config.dispatch.handler_timeout_ms = None;
    }
    config
}
