use crate::config::RetargetConfig;
use crate::errors::PowError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Initializes `tracing` as the logger.
///
/// # Parameters
///
/// - `level`: Default log level. `None` leaves filtering entirely to the
///   `RUST_LOG` env var, which is advised for tests.
///
/// # Returns
///
/// Returns `Err` if `tracing` can't be initialized. Multiple subscription error
/// is emitted and will return `Ok(())`.
pub fn initialize_logger(level: Option<LevelFilter>) -> Result<(), PowError> {
    // Standard layer that will output human readable logs.
    let layer = fmt::layer().with_test_writer();
    // JSON layer that will output JSON formatted logs.
    let json_layer = fmt::layer::<Registry>().with_test_writer().json();

    let filter = match level {
        Some(level) => EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy(),
        None => EnvFilter::from_default_env(),
    };

    // Try to initialize tracing, depending on the `JSON_LOGS` env var,
    let res = if std::env::var("JSON_LOGS").is_ok() {
        tracing_subscriber::util::SubscriberInitExt::try_init(
            tracing_subscriber::registry().with(json_layer).with(filter),
        )
    } else {
        tracing_subscriber::util::SubscriberInitExt::try_init(
            tracing_subscriber::registry().with(layer).with(filter),
        )
    };

    if let Err(e) = res {
        // If it failed because of a re-initialization, do not care about
        // the error.
        if e.to_string() != "a global default trace dispatcher has already been set" {
            return Err(PowError::ConfigError(e.to_string()));
        }

        tracing::trace!("Tracing is already initialized, skipping without errors...");
    };

    Ok(())
}

/// Initializes the logger at the level a config asks for.
pub fn initialize_logger_from_config(config: &RetargetConfig) -> Result<(), PowError> {
    initialize_logger(config.log_level()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_can_be_initialized_twice() {
        initialize_logger(Some(LevelFilter::TRACE)).unwrap();
        initialize_logger(None).unwrap();
    }

    #[test]
    fn bad_config_level_is_an_error() {
        let config = RetargetConfig {
            log_level: Some("chatty".to_string()),
            ..RetargetConfig::new()
        };
        assert!(initialize_logger_from_config(&config).is_err());
    }
}
