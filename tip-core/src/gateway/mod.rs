pub mod factory;
pub mod payment;

pub use factory::{GatewayConfig, GatewayError, GatewayRegistry, PaymentGatewayFactory};
pub use payment::{PaymentError, PaymentGateway};
