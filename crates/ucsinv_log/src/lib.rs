//! `ucsinv_log` v1:
//! Process-wide `tracing` subscriber setup shared by the binaries.
//!
//! Filter precedence: explicit level, then `UCSINV_LOG`, then `warn`.
//! Log lines go to stderr so stdout stays free for progress output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const C_ENV_LOG: &str = "UCSINV_LOG";
/// Directive used when nothing else is configured.
pub const C_LEVEL_DEFAULT: &str = "warn";

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    /// The explicit level is not a valid filter directive.
    #[error("invalid log filter {directive:?}: {message}")]
    InvalidDirective {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Resolve the filter from `level` or the environment.
pub fn derive_env_filter(level: Option<&str>) -> Result<EnvFilter, LogInitError> {
    if let Some(directive) = level {
        return EnvFilter::try_new(directive).map_err(|err| LogInitError::InvalidDirective {
            directive: directive.to_string(),
            message: err.to_string(),
        });
    }
    Ok(EnvFilter::try_from_env(C_ENV_LOG).unwrap_or_else(|_| EnvFilter::new(C_LEVEL_DEFAULT)))
}

/// Install the global fmt subscriber.
pub fn init_logging(level: Option<&str>) -> Result<(), LogInitError> {
    let filter = derive_env_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LogInitError::AlreadyInitialized(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_wins() {
        let filter = derive_env_filter(Some("ucsinv_ucsm=debug")).expect("filter");
        assert_eq!(filter.to_string(), "ucsinv_ucsm=debug");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(matches!(
            derive_env_filter(Some("ucsinv=loud")),
            Err(LogInitError::InvalidDirective { .. })
        ));
    }

    #[test]
    fn test_second_init_reports_already_initialized() {
        let _ = init_logging(Some("error"));
        assert!(matches!(
            init_logging(Some("error")),
            Err(LogInitError::AlreadyInitialized(_))
        ));
    }
}
