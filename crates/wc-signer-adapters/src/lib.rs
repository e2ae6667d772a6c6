pub mod config;
pub mod explorer;
pub mod node_client;
pub mod signer;
pub mod telemetry;
pub mod throttle;
pub mod wc;

use wc_signer_core::{PortError, ResponseLedger, SigningCoordinator};

pub use config::{NetworkPreset, SignerAdapterConfig};
pub use explorer::ExplorerLinks;
pub use node_client::NodeDecodeClient;
pub use signer::LocalKeySigner;
pub use telemetry::TracingTelemetry;
pub use throttle::{RequestThrottle, ThrottlePermit};
pub use wc::{SessionResponse, SessionResponseRecord, WalletConnectAdapter};

pub type DefaultCoordinator =
    SigningCoordinator<NodeDecodeClient, LocalKeySigner, WalletConnectAdapter, TracingTelemetry>;

/// Wires the production adapters into a coordinator.
pub fn build_coordinator(config: &SignerAdapterConfig) -> Result<DefaultCoordinator, PortError> {
    Ok(SigningCoordinator::with_ledger(
        NodeDecodeClient::with_config(config)?,
        LocalKeySigner,
        WalletConnectAdapter::with_config(config)?,
        TracingTelemetry,
        ResponseLedger::with_retention(config.resolved_request_retention),
    ))
}
