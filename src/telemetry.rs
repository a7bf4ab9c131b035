//! Usage events emitted by the engine.

use serde_json::{Map, Value};

/// Properties attached to an event.
pub type Properties = Map<String, Value>;

/// A sink refused or failed to deliver an event. The engine logs these and carries on.
#[derive(Debug, thiserror::Error)]
#[error("failed to emit '{event}': {reason}")]
pub struct TelemetryError {
    pub event: String,
    pub reason: String,
}

/// Receives one call per public engine operation.
pub trait EventSink {
    fn emit(&mut self, event: &str, properties: &Properties) -> Result<(), TelemetryError>;
}

/// Discards every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&mut self, _event: &str, _properties: &Properties) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Forwards events to `tracing` at the `info` level under the `uuidkit::telemetry` target.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &str, properties: &Properties) -> Result<(), TelemetryError> {
        let properties = serde_json::to_string(properties).map_err(|err| TelemetryError {
            event: event.to_owned(),
            reason: err.to_string(),
        })?;
        tracing::info!(target: "uuidkit::telemetry", event, %properties);
        Ok(())
    }
}
