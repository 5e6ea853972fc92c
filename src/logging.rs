//! Structured logging for ninjagen
//!
//! Logs go to stderr so generated text printed with `--stdout` stays clean.
//! Pipeline stages log with a `stage` field; macro invocations and shell
//! commands log at debug level.
//!
//! # Examples
//!
//! ```rust
//! use tracing::info;
//! use ninjagen::logging::stages;
//!
//! info!(stage = stages::EXPAND, size_bytes = 1024, "macros expanded");
//! ```

use std::fmt as std_fmt;
use std::io::{self, IsTerminal};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Formatter that tags every line with "(ninjagen)" instead of a module path
struct NinjagenFormatter {
    with_ansi: bool,
}

impl<S, N> FormatEvent<S, N> for NinjagenFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let meta = event.metadata();

        write!(
            writer,
            "{} ",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f")
        )?;

        if self.with_ansi {
            let color = level_color(meta.level());
            write!(writer, "{color}{:5}(ninjagen)\x1b[0m: ", meta.level())?;
        } else {
            write!(writer, "{:5}(ninjagen): ", meta.level())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, coloured
    Pretty,
    /// Same layout without colour
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse from the NINJAGEN_LOG_FORMAT environment variable
    pub fn from_env() -> Self {
        Self::parse(
            &std::env::var("NINJAGEN_LOG_FORMAT").unwrap_or_default(),
            std::env::var_os("CI").is_some(),
        )
    }

    fn parse(value: &str, in_ci: bool) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ if in_ci => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: log filter (default "info")
/// - `NINJAGEN_LOG_FORMAT`: "pretty", "compact" or "json"
/// - `CI`: if set, defaults to compact format
///
/// Colour is only used when stderr is a terminal.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::from_env();

    let text = (format != LogFormat::Json).then(|| {
        fmt::layer()
            .event_format(NinjagenFormatter {
                with_ansi: format == LogFormat::Pretty && io::stderr().is_terminal(),
            })
            .with_writer(io::stderr)
    });
    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(false)
            .with_writer(io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

/// Values for the `stage` field
pub mod stages {
    pub const ENV: &str = "env";
    pub const DEFINITIONS: &str = "definitions";
    pub const EXPAND: &str = "expand";
    pub const SUBSTITUTE: &str = "substitute";
    pub const WRITE: &str = "write";
}
