pub mod amount;
pub mod gateway;
pub mod host;
pub mod models;
pub mod selection;
pub mod session;
pub mod submission;

pub use gateway::payment::{PaymentError, PaymentGateway};
pub use host::ScreenHost;
pub use models::*;
pub use selection::{
    InvalidSelection, SelectionAction, SelectionError, SelectionSource, SelectionState,
    TipAmountResolver,
};
pub use session::{SessionError, TipSession, TipSnapshot};
pub use submission::{SubmissionError, SubmissionPhase, SubmissionState};
