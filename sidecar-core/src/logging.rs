//! Logging setup for the sidecar binary.
//!
//! Logs always go to stderr so that result tables written to stdout can be
//! piped. The level comes from the CLI flags unless `SIDECAR_LOG` holds a
//! filter directive such as `sidecar_core=trace`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::Result;
use crate::error::SidecarError;

/// Environment variable holding an optional filter directive.
pub const LOG_ENV_VAR: &str = "SIDECAR_LOG";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Maps CLI verbosity flags to a level filter.
///
/// `quiet` wins over any verbosity.
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Builds the event filter. In quiet mode `SIDECAR_LOG` is ignored.
pub fn env_filter(verbose: u8, quiet: bool) -> EnvFilter {
    let level = level_for(verbose, quiet);
    if quiet {
        return EnvFilter::default().add_directive(level.into());
    }
    EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy()
}

/// Initializes text logging at the level given by the CLI flags.
///
/// # Arguments
/// * `verbose` - 0 for INFO, 1 for DEBUG, 2 or more for TRACE
/// * `quiet` - only ERROR events when set
///
/// # Example
/// ```rust,no_run
/// use sidecar_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    init_logging_with_format(verbose, quiet, LogFormat::Text)
}

/// Initializes logging in the given format.
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set.
pub fn init_logging_with_format(verbose: u8, quiet: bool, format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| {
        SidecarError::configuration(format!("Failed to initialize logging: {}", e))
    })
}
