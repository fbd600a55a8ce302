pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod views;

pub use app::{App, Flow, TerminalHost};
