//! Logging initialization: human-readable format (timestamp, level, message, fields) to both console and file.

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt::format::{Format, FmtSpan, Full, Writer},
    fmt::time::FormatTime,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Local time in `YYYY-MM-DD HH:MM:SS` for human-readable log lines.
struct ChronoLocal;

impl FormatTime for ChronoLocal {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let t = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(w, "{} ", t)
    }
}

/// Filter directive: `RUST_LOG`, else `LOG_LEVEL` (e.g. `INFO`, `WARNING`), else `info`.
pub fn filter_directive() -> String {
    env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            env::var("LOG_LEVEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| level_directive(&s))
        })
        .unwrap_or_else(|| "info".to_string())
}

/// Maps a single level name to a tracing level. Accepts `WARNING`, `CRITICAL` and `FATAL`
/// besides tracing's own names; anything else is `info`.
fn level_directive(raw: &str) -> String {
    let level = raw.trim().to_ascii_lowercase();
    let level = match level.as_str() {
        "warning" => "warn",
        "critical" | "fatal" => "error",
        other => other,
    };
    level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO)
        .to_string()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_new(filter_directive()).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn event_format() -> Format<Full, ChronoLocal> {
    tracing_subscriber::fmt::format()
        .with_timer(ChronoLocal)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(false)
}

/// Subscriber writing to stderr only, for one-shot commands whose stdout is the result.
pub fn console_subscriber() -> impl tracing::Subscriber + Send + Sync + 'static {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .event_format(event_format())
        .with_span_events(FmtSpan::NONE);

    Registry::default().with(env_filter()).with(fmt_layer)
}

/// Installs [`console_subscriber`] as the global subscriber.
pub fn init_console_tracing() -> anyhow::Result<()> {
    console_subscriber()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))
}

/// Initializes the global tracing subscriber.
///
/// Output is human-readable: `YYYY-MM-DD HH:MM:SS LEVEL [target] message key=value ...`
/// Teed to stdout and the given log file (parent directory is created). No ANSI codes so the
/// log file is plain text. Load `.env` before calling.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    let file = Arc::new(file);

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let writer = io::stdout.and(file);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .event_format(event_format())
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false);

    Registry::default()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
