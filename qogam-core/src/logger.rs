use std::fmt::{self, Write as _};
use std::sync::{Arc, OnceLock};

use tracing::{field::Field, Event, Level, Subscriber};
use tracing_subscriber::{field::Visit, layer::Context, prelude::*, EnvFilter, Layer};

/// Trait representing a logger that can log messages at various levels.
///
/// This trait should be implemented by any logger that wants to receive log messages.
/// It is exported via `UniFFI` for use in foreign languages.
///
/// # Examples
///
/// Implementing the `Logger` trait:
///
/// ```rust
/// use qogam_core::logger::{Logger, LogLevel};
///
/// struct MyLogger;
///
/// impl Logger for MyLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{:?}] {}", level, message);
///     }
/// }
/// ```
///
/// ## Kotlin
///
/// ```kotlin
/// object QogamLoggerBridge : Logger {
///     override fun log(level: LogLevel, message: String) {
///         Log.println(level.toPriority(), "qogam", message)
///     }
/// }
///
/// setLogger(QogamLoggerBridge) // once, in Application.onCreate
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very low priority, extremely detailed messages.
    Trace,
    /// Debugging information.
    Debug,
    /// Progress of the session (code sent, authenticated, logged out).
    Info,
    /// Failed requests and recoverable problems.
    Warn,
    /// Storage failures and other errors the host should know about.
    Error,
}

/// `tracing` layer forwarding events to a host [`Logger`].
///
/// Debug and trace events are only forwarded when they originate from this crate; dependencies
/// (reqwest, hyper, rustls) are too chatty at those levels.
struct ForeignLoggerLayer {
    logger: Arc<dyn Logger>,
}

impl<S: Subscriber> Layer<S> for ForeignLoggerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let is_from_qogam = metadata.target().starts_with("qogam");
        if level > Level::INFO && !is_from_qogam {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logger.log(log_level(level), visitor.finish());
    }
}

/// Renders an event as its message followed by `key=value` pairs.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else if !field.name().starts_with("log.") {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else if !field.name().starts_with("log.") {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

const fn log_level(level: Level) -> LogLevel {
    match level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warn,
        Level::INFO => LogLevel::Info,
        Level::DEBUG => LogLevel::Debug,
        Level::TRACE => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Sets the global logger.
///
/// Installs a `tracing` subscriber that forwards every event (and every `log` record, through
/// `tracing-log`) to `logger`. The filter is read from `RUST_LOG` when set, defaulting to `info`
/// with debug output for this crate.
///
/// Only the first call has an effect; later calls print a message and return.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(Arc::clone(&logger)).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_subscriber(logger) {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_subscriber(logger: Arc<dyn Logger>) -> Result<(), Box<dyn std::error::Error>> {
    tracing_log::LogTracer::init_with_filter(log::LevelFilter::Trace)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,qogam_core=debug"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(ForeignLoggerLayer { logger });
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
