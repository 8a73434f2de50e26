//! Configuration presets for common scenarios

use super::{Config, DisplayConfig, Format};

/// Primary filter variable; `RUST_LOG` is read when it is absent.
pub const ENV_LEVEL: &str = "DTR_LOG";
/// Format variable: `pretty`, `compact` or `json`.
pub const ENV_FORMAT: &str = "DTR_LOG_FORMAT";

impl Config {
    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from whatever `lookup` returns for the
    /// environment keys
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup(ENV_LEVEL).or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }

        // Unknown names fall back to compact
        if let Some(format) = lookup(ENV_FORMAT) {
            config.format = format.parse().unwrap_or(Format::Compact);
        }

        config
    }

    /// Returns `true` if the environment names a filter.
    pub(crate) fn env_has_level(lookup: impl Fn(&str) -> Option<String>) -> bool {
        lookup(ENV_LEVEL).is_some() || lookup("RUST_LOG").is_some()
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_owned(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_owned(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                ..DisplayConfig::default()
            },
        }
    }

    /// Test configuration
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            level: "trace".to_owned(),
            format: Format::Compact,
            display: DisplayConfig::default(),
        }
    }
}
