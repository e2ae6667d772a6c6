use tracing::warn;

use wc_signer_core::TelemetryPort;

/// Forwards telemetry events to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TelemetryPort for TracingTelemetry {
    fn capture(&self, event: &str, message: &str) {
        warn!(target: "wc_signer::telemetry", event, detail = message, "telemetry event captured");
    }
}
