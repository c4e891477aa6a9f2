//! Observability setup for Navguard: tracing subscriber and optional
//! OpenTelemetry export.

pub mod tracing_setup;
