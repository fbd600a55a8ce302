use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::payment::PaymentGateway;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

/// Backend-agnostic gateway configuration.
///
/// `backend` must match the [`PaymentGatewayFactory::backend_name`] of a
/// registered factory.  `connection_string` is passed through to that
/// factory unchanged; its meaning is backend-specific.
///
/// | backend     | connection_string examples              |
/// |-------------|-----------------------------------------|
/// | `simulated` | `approve`, `offline,approve,latency=50` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"simulated"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend: "simulated".to_string(),
            connection_string: "approve".to_string(),
        }
    }
}

/// One implementation per payment backend.  Each backend crate exports a
/// single unit struct that implements this trait and is registered with a
/// [`GatewayRegistry`] at startup.
#[async_trait]
pub trait PaymentGatewayFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Build a ready-to-use gateway.
    async fn create(
        &self,
        config: &GatewayConfig,
    ) -> Result<Arc<dyn PaymentGateway>, GatewayError>;
}

/// Registry of [`PaymentGatewayFactory`] instances, keyed by backend name.
pub struct GatewayRegistry {
    factories: HashMap<&'static str, Box<dyn PaymentGatewayFactory>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory, replacing any factory with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn PaymentGatewayFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`GatewayError::Configuration`]: no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &GatewayConfig,
    ) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                GatewayError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for GatewayRegistry {
    fn default() -> Self {
        Self::new()
    }
}
