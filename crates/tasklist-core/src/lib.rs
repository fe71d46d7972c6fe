pub mod config;
pub mod error;

pub use config::{parse_base_url, ApiConfig, Config, LoggingConfig, SessionConfig, ValidationResult};
pub use error::{extract_api_message, AppError, AuthError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Handle to the installed log filter, used to apply the configured level
/// once the config file has been read.
pub struct LogHandle {
    filter: Option<reload::Handle<EnvFilter, Registry>>,
    from_env: bool,
}

impl LogHandle {
    /// Switch the filter to `level`. No-op when `RUST_LOG` chose the filter
    /// or another subscriber was already installed.
    pub fn set_level(&self, level: &str) -> Result<()> {
        let Some(handle) = &self.filter else {
            return Ok(());
        };
        if self.from_env {
            return Ok(());
        }

        let filter = EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level: {}", level))?;
        handle.reload(filter).context("Failed to apply log level")?;

        tracing::debug!("Log level set to {}", level);
        Ok(())
    }
}

/// Initialize logging for the application.
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init(default_level: &str) -> Result<LogHandle> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_level), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    // A subscriber may already be installed (tests, embedding apps)
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .is_ok();
    if !installed {
        tracing::debug!("Tracing subscriber already installed");
    }

    tracing::info!("Tasklist core initialized");
    Ok(LogHandle {
        filter: installed.then_some(handle),
        from_env,
    })
}
