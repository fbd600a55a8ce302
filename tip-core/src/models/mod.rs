mod receipt;
mod suggestion;
mod tip_config;

pub use receipt::{Receipt, ReceiptId};
pub use suggestion::Suggestion;
pub use tip_config::{RetryPolicy, TipConfig};
