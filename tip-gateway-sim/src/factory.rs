use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use tip_core::PaymentGateway;
use tip_core::gateway::{GatewayConfig, GatewayError, PaymentGatewayFactory};

use crate::gateway::SimulatedGateway;
use crate::script::Script;

/// [`PaymentGatewayFactory`] for the in-process simulator.
///
/// Register this with a [`tip_core::gateway::GatewayRegistry`] to make the
/// `"simulated"` backend available:
///
/// ```rust
/// use tip_core::gateway::GatewayRegistry;
/// use tip_gateway_sim::SimulatedGatewayFactory;
///
/// let mut registry = GatewayRegistry::new();
/// registry.register(Box::new(SimulatedGatewayFactory));
/// assert_eq!(registry.available_backends(), vec!["simulated"]);
/// ```
pub struct SimulatedGatewayFactory;

#[async_trait]
impl PaymentGatewayFactory for SimulatedGatewayFactory {
    fn backend_name(&self) -> &'static str {
        "simulated"
    }

    /// Parse `config.connection_string` as a [`Script`] and build the gateway.
    /// A script marked `unreachable` fails with [`GatewayError::Unavailable`].
    async fn create(
        &self,
        config: &GatewayConfig,
    ) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        let script: Script = config
            .connection_string
            .parse()
            .map_err(|e| GatewayError::Configuration(format!("simulated gateway: {e}")))?;
        if script.unreachable {
            warn!("simulated gateway refuses to connect");
            return Err(GatewayError::Unavailable(
                "simulated gateway is unreachable".to_string(),
            ));
        }
        Ok(Arc::new(SimulatedGateway::new(script)))
    }
}
