// Centralized tracing setup: runtime log levels from env, optional JSON file sink,
// and span timing for spans tagged with `on_close = true`
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use eyre::{Result, WrapErr};
use tracing::{Id, Subscriber, debug, field::Field, field::Visit, span};
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Context, Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const CRATE_TARGET: &str = "card_roi_projection";
const LOG_DIR: &str = "logs";

static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub console_level: String,
    pub file_level: String,
    pub log_to_file: bool,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            console_level: lookup("CONSOLE_LOG_LEVEL").unwrap_or_else(|| "INFO".to_string()),
            file_level: lookup("FILE_LOG_LEVEL").unwrap_or_else(|| "INFO".to_string()),
            log_to_file: lookup("LOG_TO_FILE").is_some_and(|v| v == "true"),
        }
    }
}

/// Everything outside this crate logs at warn; our own target at `level`
fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("warn,{CRATE_TARGET}={level}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("{CRATE_TARGET}=info")))
}

/// Installs the global subscriber. File logs go to `logs/<bin_name>_<timestamp>.log`.
pub fn init_logging(bin_name: String) -> Result<()> {
    let settings = LogSettings::from_env();

    let console_layer = fmt::Layer::new()
        .pretty()
        .with_filter(crate_filter(&settings.console_level));

    if settings.log_to_file {
        let log_dir = Path::new(LOG_DIR);
        fs::create_dir_all(log_dir).wrap_err("Failed to create log directory")?;
        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let file_name = format!("{bin_name}_{timestamp}.log");

        let file_appender = tracing_appender::rolling::never(log_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        FILE_GUARD.set(guard).ok();

        let file_layer = fmt::Layer::new()
            .json()
            .with_writer(non_blocking)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(crate_filter(&settings.file_level));

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .with(SpanTimingLayer)
            .try_init()
            .wrap_err("Failed to set global tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(console_layer)
            .with(SpanTimingLayer)
            .try_init()
            .wrap_err("Failed to set global tracing subscriber")?;
    }
    Ok(())
}

/// Reports busy and idle time of spans that carry `on_close = true` when they close
struct SpanTimingLayer;

struct SpanTiming {
    started: Instant,
    last_transition: Instant,
    busy: Duration,
    idle: Duration,
}

struct OnCloseVisitor(bool);

impl Visit for OnCloseVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "on_close" {
            self.0 = value;
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S> Layer<S> for SpanTimingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = OnCloseVisitor(false);
        attrs.record(&mut visitor);
        if !visitor.0 {
            return;
        }
        if let Some(span) = ctx.span(id) {
            let now = Instant::now();
            span.extensions_mut().insert(SpanTiming {
                started: now,
                last_transition: now,
                busy: Duration::ZERO,
                idle: Duration::ZERO,
            });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(timing) = span.extensions_mut().get_mut::<SpanTiming>() {
                timing.idle += timing.last_transition.elapsed();
                timing.last_transition = Instant::now();
            }
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            if let Some(timing) = span.extensions_mut().get_mut::<SpanTiming>() {
                timing.busy += timing.last_transition.elapsed();
                timing.last_transition = Instant::now();
            }
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            if let Some(timing) = span.extensions_mut().remove::<SpanTiming>() {
                debug!(
                    span = span.name(),
                    busy_time = ?timing.busy,
                    idle_time = ?timing.idle,
                    total_time = ?timing.started.elapsed(),
                    "span closed"
                );
            }
        }
    }
}
