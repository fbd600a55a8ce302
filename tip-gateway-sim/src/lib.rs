mod factory;
mod gateway;
mod script;

pub use factory::SimulatedGatewayFactory;
pub use gateway::SimulatedGateway;
pub use script::{Outcome, Script, ScriptError};
