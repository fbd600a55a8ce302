use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};

use tip_ui::app::{self, App};
use tip_ui::config::Settings;
use tip_ui::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Tip the driver after a ride.
///
/// Shows the tipping screen in the terminal and reads commands from stdin.
/// Type `help` for the list of commands.
#[derive(Debug, Parser)]
struct Cli {
    /// Settings file (TOML). Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Payment gateway backend, overriding the settings file.
    #[arg(long)]
    backend: Option<String>,

    /// Gateway connection string, overriding the settings file.
    /// For the simulated backend this is an outcome script such as
    /// `offline,approve,latency=300`.
    #[arg(long)]
    gateway: Option<String>,

    /// Log filter, e.g. `debug` or `tip_core=trace,info`. Defaults to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Keep logs off the terminal.
    #[arg(long)]
    quiet: bool,
}

// ─── input ───────────────────────────────────────────────────────────────────

/// Forward stdin lines from a dedicated thread so a blocked read never holds
/// up shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log = logging::init_logging(cli.log_level.as_deref())?;
    if cli.quiet {
        log.set_console_enabled(false)?;
    }
    if let Some(path) = &cli.log_file {
        log.enable_file_logging(path)?;
    }

    let mut settings = match &cli.config {
        Some(path) => {
            debug!("loading settings from {}", path.display());
            Settings::load(path)?
        }
        None => Settings::default(),
    };
    if let Some(backend) = cli.backend {
        settings.gateway.backend = backend;
    }
    if let Some(connection_string) = cli.gateway {
        settings.gateway.connection_string = connection_string;
    }

    let gateway = app::connect_gateway(&settings.gateway_config()).await?;
    let mut app = App::new(settings.tip_config(), gateway).with_log_control(log);

    info!("tipping screen ready");
    app.run(spawn_stdin_reader()).await
}
