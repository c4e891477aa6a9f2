//! Prefix-based callback dispatch registry.
//!
//! Handlers are registered once at startup through [`CallbackRegistryBuilder`];
//! the resulting [`CallbackRegistry`] is immutable and shared by `Arc`.
//!
//! Matching is first-match-wins in registration order unless the config asks
//! for [`MatchPolicy::LongestPrefix`]. With first-match, a prefix that is
//! itself a prefix of a later registration shadows it (`"pool:"` swallows
//! `"pool:sub:42"` and hands the handler `"sub:42"`); the builder warns
//! about every such pair.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use navguard_types::callback::CallbackData;
use navguard_types::config::{DispatchConfig, MatchPolicy};
use navguard_types::error::DispatchError;

use super::handler::{BoxCallbackHandler, CallbackContext, CallbackHandler};

/// Shown when no handler matches a payload.
pub const NOT_IMPLEMENTED_NOTICE: &str = "This action is not available yet.";

/// Shown when a handler fails, panics, or times out.
pub const GENERIC_ERROR_NOTICE: &str = "Sorry, something went wrong. Please try again.";

/// Result of routing one payload.
#[derive(Debug)]
pub enum DispatchOutcome {
    Handled { prefix: String },
    /// No prefix matched; always carries [`DispatchError::Miss`].
    Miss(DispatchError),
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }

    /// The error behind a miss or a failure.
    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            DispatchOutcome::Handled { .. } => None,
            DispatchOutcome::Miss(err) | DispatchOutcome::Failed(err) => Some(err),
        }
    }
}

struct Registration {
    prefix: String,
    handler: BoxCallbackHandler,
}

/// Collects handler registrations before the table is frozen.
pub struct CallbackRegistryBuilder {
    config: DispatchConfig,
    entries: Vec<Registration>,
}

impl CallbackRegistryBuilder {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    /// Bind `handler` to `prefix`.
    ///
    /// Registering a prefix twice replaces the earlier handler but keeps its
    /// position in the match order.
    pub fn register<H: CallbackHandler + 'static>(
        mut self,
        prefix: impl Into<String>,
        handler: H,
    ) -> Self {
        let prefix = prefix.into();
        let handler = BoxCallbackHandler::new(handler);

        if let Some(existing) = self.entries.iter_mut().find(|e| e.prefix == prefix) {
            tracing::warn!(prefix = %prefix, "callback prefix registered twice, replacing handler");
            existing.handler = handler;
        } else {
            self.entries.push(Registration { prefix, handler });
        }
        self
    }

    /// Freeze the table.
    pub fn build(self) -> CallbackRegistry {
        let registry = CallbackRegistry {
            entries: self.entries,
            policy: self.config.match_policy,
            handler_timeout: self.config.handler_timeout(),
        };

        for (shorter, longer) in registry.overlapping_prefixes() {
            match registry.policy {
                MatchPolicy::FirstMatch => tracing::warn!(
                    shadowing = %shorter,
                    shadowed = %longer,
                    "callback prefix shadows a later registration"
                ),
                MatchPolicy::LongestPrefix => tracing::debug!(
                    shorter = %shorter,
                    longer = %longer,
                    "overlapping callback prefixes, longest wins"
                ),
            }
        }

        tracing::debug!(
            handlers = registry.entries.len(),
            policy = ?registry.policy,
            "callback registry built"
        );
        registry
    }
}

/// Immutable prefix table routing button payloads to handlers.
pub struct CallbackRegistry {
    entries: Vec<Registration>,
    policy: MatchPolicy,
    handler_timeout: Option<Duration>,
}

impl CallbackRegistry {
    pub fn builder(config: DispatchConfig) -> CallbackRegistryBuilder {
        CallbackRegistryBuilder::new(config)
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Registered prefixes in match order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.prefix.as_str())
    }

    /// Pairs `(earlier, later)` where `later` starts with `earlier`, or the
    /// other way round, so one can capture payloads meant for the other.
    pub fn overlapping_prefixes(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if b.prefix.starts_with(&a.prefix) {
                    pairs.push((a.prefix.clone(), b.prefix.clone()));
                } else if a.prefix.starts_with(&b.prefix) {
                    pairs.push((b.prefix.clone(), a.prefix.clone()));
                }
            }
        }
        pairs
    }

    /// The prefix that would handle `payload`, and the remainder after it.
    pub fn resolve<'p>(&self, payload: &'p str) -> Option<(&str, &'p str)> {
        self.find(payload)
            .map(|entry| (entry.prefix.as_str(), &payload[entry.prefix.len()..]))
    }

    fn find(&self, payload: &str) -> Option<&Registration> {
        let mut matching = self
            .entries
            .iter()
            .filter(|e| payload.starts_with(e.prefix.as_str()));
        match self.policy {
            MatchPolicy::FirstMatch => matching.next(),
            MatchPolicy::LongestPrefix => matching.max_by_key(|e| e.prefix.len()),
        }
    }

    /// Route one button press.
    ///
    /// Never returns an error: misses and handler failures (errors, panics,
    /// timeouts) are logged and acknowledged to the user with a generic
    /// notice. A successful press is acknowledged without a notice.
    pub async fn dispatch(&self, ctx: &CallbackContext, payload: &str) -> DispatchOutcome {
        let Some(entry) = self.find(payload) else {
            let err = DispatchError::Miss(payload.to_string());
            tracing::warn!(user_id = %ctx.user_id, error = %err, "callback not dispatched");
            acknowledge(ctx, Some(NOT_IMPLEMENTED_NOTICE)).await;
            return DispatchOutcome::Miss(err);
        };

        let remainder = &payload[entry.prefix.len()..];
        let data = CallbackData::decode(remainder);
        let handled = AssertUnwindSafe(entry.handler.handle(ctx, data)).catch_unwind();

        let result = match self.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, handled).await {
                Ok(result) => result,
                Err(_) => {
                    let err = DispatchError::Timeout {
                        prefix: entry.prefix.clone(),
                        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    };
                    return self.fail(ctx, payload, err).await;
                }
            },
            None => handled.await,
        };

        match result {
            Ok(Ok(())) => {
                tracing::debug!(user_id = %ctx.user_id, prefix = %entry.prefix, "callback handled");
                acknowledge(ctx, None).await;
                DispatchOutcome::Handled {
                    prefix: entry.prefix.clone(),
                }
            }
            Ok(Err(e)) => {
                let err = DispatchError::HandlerFailure {
                    prefix: entry.prefix.clone(),
                    message: e.to_string(),
                };
                self.fail(ctx, payload, err).await
            }
            Err(panic) => {
                let err = DispatchError::HandlerFailure {
                    prefix: entry.prefix.clone(),
                    message: format!("handler panicked: {}", panic_message(panic.as_ref())),
                };
                self.fail(ctx, payload, err).await
            }
        }
    }

    async fn fail(&self, ctx: &CallbackContext, payload: &str, err: DispatchError) -> DispatchOutcome {
        tracing::error!(
            user_id = %ctx.user_id,
            callback_id = ?ctx.callback_id,
            payload = %payload,
            error = %err,
            "callback handler failed"
        );
        acknowledge(ctx, Some(GENERIC_ERROR_NOTICE)).await;
        DispatchOutcome::Failed(err)
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("prefixes", &self.prefixes().collect::<Vec<_>>())
            .field("policy", &self.policy)
            .field("handler_timeout", &self.handler_timeout)
            .finish()
    }
}

async fn acknowledge(ctx: &CallbackContext, notice: Option<&str>) {
    if let Err(e) = ctx
        .transport
        .acknowledge(&ctx.user_id, ctx.callback_id.as_deref(), notice)
        .await
    {
        tracing::warn!(user_id = %ctx.user_id, error = %e, "failed to acknowledge callback");
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
