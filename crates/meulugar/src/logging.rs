//! Logging bootstrap.
//!
//! The library only emits `tracing` events. Binaries call [`init_logging`]
//! once at startup to install a stderr subscriber; `RUST_LOG`, when set,
//! replaces the configured level.

use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOGGING_LEVEL: OnceCell<String> = OnceCell::new();

/// Install the global subscriber.
///
/// Repeated calls with the same level are no-ops. A different level after
/// initialization is rejected, as is an unparsable filter.
pub fn init_logging(level: &str) -> Result<(), String> {
    let level = level.trim().to_lowercase();

    if let Some(active) = LOGGING_LEVEL.get() {
        return check_same(active, &level);
    }

    let active = LOGGING_LEVEL.get_or_try_init(|| -> Result<String, String> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&level)
                .map_err(|e| format!("invalid log level `{level}`: {e}"))?,
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
            .map_err(|e| format!("failed to install subscriber: {e}"))?;

        tracing::debug!(level = %level, "logging: initialized");
        Ok(level.clone())
    })?;

    check_same(active, &level)
}

fn check_same(active: &str, requested: &str) -> Result<(), String> {
    if active != requested {
        return Err(format!(
            "logging already initialized with level `{active}`; refusing to switch to `{requested}`"
        ));
    }
    Ok(())
}
