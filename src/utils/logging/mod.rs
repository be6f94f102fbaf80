//! Logging utilities
//!
//! Subscriber installation and redaction helpers. Raw secrets never reach a
//! log macro; records are identified by id and masked prefix.

use crate::config::LoggingConfig;
use crate::utils::error::{IntegrationError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. A subscriber that is
/// already installed is left in place, so calling this more than once is
/// harmless.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            IntegrationError::config(format!("Invalid log level '{}': {}", config.level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = installed {
        tracing::debug!("Log subscriber already installed: {}", e);
    }
    Ok(())
}

/// Characters of a secret kept by `mask_secret`
pub const MASK_VISIBLE_CHARS: usize = 4;

/// Masked form of a secret that keeps only its last four characters
/// (`...wxyz`); short values are fully hidden
pub fn mask_secret(secret: &str) -> String {
    if secret.len() >= 16 && secret.is_ascii() {
        format!("...{}", &secret[secret.len() - MASK_VISIBLE_CHARS..])
    } else {
        "****".to_string()
    }
}
