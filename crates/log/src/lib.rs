//! # dtr-log
//!
//! Logging setup shared by the registry binaries. Libraries in the
//! workspace only emit `tracing` events; this crate installs the
//! subscriber that renders them.
//!
//! ```rust,ignore
//! fn main() -> anyhow::Result<()> {
//!     let _guard = dtr_log::auto_init()?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
//!
//! Output always goes to stderr so that stdout stays machine-readable.

mod builder;
pub mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Format};
pub use error::LogError;

/// Initialize from the environment when `DTR_LOG` or `RUST_LOG` is set,
/// otherwise from the build profile's preset.
pub fn auto_init() -> Result<LoggerGuard, LogError> {
    if Config::env_has_level(|key| std::env::var(key).ok()) {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> Result<LoggerGuard, LogError> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> Result<LoggerGuard, LogError> {
    LoggerBuilder::from_config(config).build()
}
