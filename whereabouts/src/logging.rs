//! Subscriber setup for applications that have none of their own
//!
//! The workspace only emits `tracing` events. The router logs every delivery
//! at `trace` and the streams log teardown at `trace`, so the default filter
//! raises the workspace targets, not the whole process, to the level a mode
//! needs.

use std::str::FromStr;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Targets emitted by the workspace crates
const WORKSPACE_TARGETS: [&str; 3] = ["whereabouts", "whereabouts_router", "whereabouts_api"];

/// How much the bridge should log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// Install nothing
    Silent,
    /// Lifecycle lines from the bridge, warnings from everything else
    Development,
    /// Every registration, delivery and teardown, with source locations
    Debug,
}

impl LoggingMode {
    /// Filter directives used when neither override variable is set
    ///
    /// `None` for [`LoggingMode::Silent`], which installs no subscriber.
    pub fn default_directives(self) -> Option<String> {
        match self {
            LoggingMode::Silent => None,
            LoggingMode::Development => Some(workspace_directives("warn", "info")),
            LoggingMode::Debug => Some(workspace_directives("info", "trace")),
        }
    }
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" | "trace" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::UnknownMode(other.to_string())),
        }
    }
}

/// Logging setup error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Unknown logging mode '{0}' (expected silent, development or debug)")]
    UnknownMode(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}

/// Install a global subscriber for `mode`
///
/// The filter is taken from `WHEREABOUTS_LOG_LEVEL`, then `RUST_LOG`, then
/// [`LoggingMode::default_directives`]. Fails if a subscriber is already
/// installed or the override does not parse.
///
/// ```rust,ignore
/// whereabouts::logging::init_logging(LoggingMode::Debug)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let Some(defaults) = mode.default_directives() else {
        return Ok(());
    };
    let directives = select_directives(
        std::env::var("WHEREABOUTS_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
        defaults,
    );
    let filter =
        EnvFilter::try_new(&directives).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    let installed = if mode == LoggingMode::Debug {
        Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init()
    } else {
        Registry::default()
            .with(fmt::layer().compact().with_target(true))
            .with(filter)
            .try_init()
    };
    installed.map_err(|e| LoggingError::TracingInit(e.to_string()))?;

    tracing::debug!("Logging initialized ({:?}, filter: {})", mode, directives);
    Ok(())
}

/// Install a subscriber for the mode named by `WHEREABOUTS_LOG_MODE`
///
/// An unset variable means [`LoggingMode::Silent`]; an unrecognised value
/// is an error rather than a silent fallback.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("WHEREABOUTS_LOG_MODE") {
        Ok(value) => value.parse()?,
        Err(_) => LoggingMode::Silent,
    };
    init_logging(mode)
}

/// Whether a global subscriber has been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

pub fn init_silent() -> Result<(), LoggingError> {
    init_logging(LoggingMode::Silent)
}

fn workspace_directives(base: &str, workspace: &str) -> String {
    std::iter::once(base.to_string())
        .chain(
            WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, workspace)),
        )
        .collect::<Vec<_>>()
        .join(",")
}

fn select_directives(level: Option<String>, rust_log: Option<String>, defaults: String) -> String {
    level
        .filter(|v| !v.trim().is_empty())
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or(defaults)
}
