//! Tracing setup for the terminal driver.
//!
//! Stdout belongs to the screen, so console logs go to stderr. A log file can
//! be attached at startup or later. Both sinks share one reloadable level
//! filter.

use anyhow::Result;
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{Event, Level, Subscriber, error};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

const DEFAULT_DIRECTIVES: &str = "info";

// --- Formatter ---

/// `<local time> <LEVEL> <file>:<line> <fields>`, coloured on a terminal.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();
        let paint = |code: &'static str| if ansi { code } else { "" };
        let reset = paint("\x1b[0m");

        write!(
            writer,
            "{}{}{reset} ",
            paint("\x1b[2m"),
            Local::now().format("%H:%M:%S%.3f")
        )?;

        let level = match *meta.level() {
            Level::ERROR => paint("\x1b[1;31m"),
            Level::WARN => paint("\x1b[1;33m"),
            Level::INFO => paint("\x1b[1;32m"),
            Level::DEBUG => paint("\x1b[1;34m"),
            Level::TRACE => paint("\x1b[1;35m"),
        };
        write!(writer, "{level}{:>5}{reset} ", meta.level())?;

        let file = meta.file().map(|f| {
            f.strip_prefix("src/")
                .or_else(|| f.strip_prefix("src\\"))
                .unwrap_or(f)
        });
        if let (Some(file), Some(line)) = (file, meta.line()) {
            write!(writer, "{}{file}:{line}{reset} ", paint("\x1b[36m"))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// --- Late-bound file writer ---

/// Writes to whatever file is currently attached; discards while none is.
#[derive(Clone, Default)]
struct FileSlot(Arc<Mutex<Option<File>>>);

impl FileSlot {
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct SlotWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for SlotWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match &mut *self.0 {
            Some(f) => f.write(buf),
            None => Ok(buf.len()),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.0 {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(self.lock())
    }
}

// --- Control handle ---

type SetStrFn = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;
type SetBoolFn = Box<dyn Fn(bool) -> Result<()> + Send + Sync>;

/// Runtime switches for an installed subscriber.
pub struct LogControl {
    set_level: SetStrFn,
    set_console: SetBoolFn,
    file: FileSlot,
}

impl LogControl {
    /// Changes the active filter. Accepts a bare level ("warn", "debug", ...)
    /// or any full EnvFilter directive.
    pub fn set_log_level(
        &self,
        level: &str,
    ) -> Result<()> {
        (self.set_level)(level)
    }

    /// Shows or hides stderr output without affecting the log file.
    pub fn set_console_enabled(
        &self,
        enabled: bool,
    ) -> Result<()> {
        (self.set_console)(enabled)
    }

    /// Starts appending log output to `path`, replacing any open file.
    /// The directory must already exist.
    pub fn enable_file_logging(
        &self,
        path: &Path,
    ) -> Result<()> {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| anyhow::anyhow!("cannot open log file '{}': {e}", path.display()))?;
        *self.file.lock() = Some(file);
        Ok(())
    }
}

fn make_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level '{level}': {e}")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))),
    }
}

fn level_setter<S>(handle: reload::Handle<EnvFilter, S>) -> SetStrFn
where
    S: Subscriber + Send + Sync + 'static,
{
    Box::new(move |level: &str| {
        let filter = make_filter(Some(level))?;
        handle
            .reload(filter)
            .map_err(|e| anyhow::anyhow!("filter reload failed: {e}"))
    })
}

fn console_setter<S>(handle: reload::Handle<EnvFilter, S>) -> SetBoolFn
where
    S: Subscriber + Send + Sync + 'static,
{
    Box::new(move |enabled: bool| {
        // "trace" passes everything through; the level filter is still the ceiling.
        let filter = EnvFilter::new(if enabled { "trace" } else { "off" });
        handle
            .reload(filter)
            .map_err(|e| anyhow::anyhow!("console reload failed: {e}"))
    })
}

/// Installs the global subscriber. Call once at startup.
///
/// - Level: `level` if given, else `RUST_LOG`, else `info`.
/// - Console: stderr, coloured when attached to a terminal.
/// - File: inactive until [`LogControl::enable_file_logging`].
pub fn init_logging(level: Option<&str>) -> Result<LogControl> {
    let file = FileSlot::default();

    let (console_gate, console_handle) = reload::Layer::new(EnvFilter::new("trace"));
    let (level_filter, level_handle) = reload::Layer::new(make_filter(level)?);

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(console_gate);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(file.clone());

    tracing_subscriber::registry()
        .with(level_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {e}"))?;

    Ok(LogControl {
        set_level: level_setter(level_handle),
        set_console: console_setter(console_handle),
        file,
    })
}

/// Logs a background task failure with context.
pub fn log_task_error<E>(
    task_name: &'static str,
    result: Result<(), E>,
) where
    E: std::fmt::Display,
{
    if let Err(error) = result {
        error!(task = task_name, %error, "background task failed");
    }
}
