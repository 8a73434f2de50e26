//! Subscriber assembly

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{Config, Format};
use crate::error::LogError;

/// Create a formatted fmt layer writing to stderr
macro_rules! fmt_layer {
    ($format:ident, $display:expr) => {
        tracing_subscriber::fmt::layer()
            .$format()
            .with_writer(std::io::stderr)
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($display.source)
            .with_line_number($display.source)
            .with_thread_ids($display.thread_ids)
    };
}

/// Keeps the logger alive; drop it at the end of `main`
#[derive(Debug)]
#[must_use = "dropping the guard immediately is allowed but usually a mistake"]
pub struct LoggerGuard {
    format: Format,
}

impl LoggerGuard {
    /// Format the installed subscriber writes.
    pub fn format(&self) -> Format {
        self.format
    }
}

/// Builds and installs the global subscriber
#[derive(Debug, Clone)]
pub struct LoggerBuilder {
    config: Config,
}

impl LoggerBuilder {
    /// Start from a configuration
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse the filter directive without installing anything
    pub fn filter(&self) -> Result<EnvFilter, LogError> {
        EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            filter: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Install the subscriber as the global default
    pub fn build(self) -> Result<LoggerGuard, LogError> {
        let filter = self.filter()?;
        let display = &self.config.display;
        let registry = Registry::default().with(filter);

        let installed = match self.config.format {
            Format::Pretty => registry.with(fmt_layer!(pretty, display)).try_init(),
            Format::Compact => registry.with(fmt_layer!(compact, display)).try_init(),
            Format::Json => registry
                .with(fmt_layer!(json, display).flatten_event(true))
                .try_init(),
        };
        installed.map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        Ok(LoggerGuard {
            format: self.config.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_reported_before_install() {
        let builder = LoggerBuilder::from_config(Config::default().with_level("dtr_graph=[bogus"));
        let err = builder.build().unwrap_err();
        assert!(matches!(err, LogError::Filter { ref filter, .. } if filter == "dtr_graph=[bogus"));
    }

    #[test]
    fn valid_filters_parse() {
        for level in ["info", "debug,dtr_engine=trace", "warn"] {
            let builder = LoggerBuilder::from_config(Config::test().with_level(level));
            assert!(builder.filter().is_ok(), "{level}");
        }
    }
}
