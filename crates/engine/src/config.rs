//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`EngineConfig::max_parallel`].
pub const ENV_MAX_PARALLEL: &str = "DTR_ENGINE_MAX_PARALLEL";
/// Environment variable overriding [`EngineConfig::timeout`], in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "DTR_ENGINE_TIMEOUT_MS";
/// Environment variable overriding [`EngineConfig::catch_panics`].
pub const ENV_CATCH_PANICS: &str = "DTR_ENGINE_CATCH_PANICS";

/// Runtime knobs for [`RuleEngine`](crate::RuleEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Turn a panicking rule body into a rule fault instead of unwinding
    /// through the engine.
    #[serde(deserialize_with = "crate::serde_flag::deserialize")]
    pub catch_panics: bool,
    /// Upper bound on invocations running at once in a batch.
    pub max_parallel: usize,
    /// Per-element wall-clock budget in a batch, in milliseconds on the wire.
    /// Zero means no budget.
    #[serde(rename = "timeout_ms", with = "crate::serde_duration_opt")]
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            max_parallel: 8,
            timeout: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `DTR_ENGINE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the
    /// `DTR_ENGINE_*` keys. Unparseable values are logged and ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_PARALLEL) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_parallel = n,
                _ => tracing::warn!(key = ENV_MAX_PARALLEL, value = %raw, "ignoring invalid value"),
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.timeout = None,
                Ok(ms) => config.timeout = Some(Duration::from_millis(ms)),
                Err(_) => tracing::warn!(key = ENV_TIMEOUT_MS, value = %raw, "ignoring invalid value"),
            }
        }

        if let Some(raw) = lookup(ENV_CATCH_PANICS) {
            match crate::serde_flag::parse(&raw) {
                Some(catch) => config.catch_panics = catch,
                None => tracing::warn!(key = ENV_CATCH_PANICS, value = %raw, "ignoring invalid value"),
            }
        }

        config
    }

    /// Set whether rule panics are caught.
    #[must_use]
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// Set the batch concurrency bound. Zero is treated as one.
    #[must_use]
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Set the per-element batch timeout. A zero timeout removes it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Remove the per-element batch timeout.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(config.catch_panics);
        assert_eq!(config.max_parallel, 8);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn lookup_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_MAX_PARALLEL, "3"),
            (ENV_TIMEOUT_MS, "250"),
            (ENV_CATCH_PANICS, "off"),
        ]));
        assert_eq!(config.max_parallel, 3);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
        assert!(!config.catch_panics);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_MAX_PARALLEL, "0"),
            (ENV_TIMEOUT_MS, "soon"),
            (ENV_CATCH_PANICS, "maybe"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn builders() {
        let config = EngineConfig::default()
            .with_max_parallel(0)
            .with_timeout(Duration::from_secs(1))
            .with_catch_panics(false);
        assert_eq!(config.max_parallel, 1);
        assert_eq!(config.timeout, Some(Duration::from_secs(1)));
        assert!(!config.catch_panics);
        assert_eq!(config.without_timeout().timeout, None);
    }

    #[test]
    fn zero_timeout_means_none_everywhere() {
        let from_env = EngineConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "0")]));
        let from_serde: EngineConfig = serde_json::from_str(r#"{"timeout_ms": 0}"#).unwrap();
        let from_builder = EngineConfig::default().with_timeout(Duration::ZERO);

        assert_eq!(from_env.timeout, None);
        assert_eq!(from_serde.timeout, None);
        assert_eq!(from_builder.timeout, None);
    }

    #[rstest]
    #[case(r#"{"catch_panics": "off"}"#, false)]
    #[case(r#"{"catch_panics": "YES"}"#, true)]
    #[case(r#"{"catch_panics": 0}"#, false)]
    #[case(r#"{"catch_panics": true}"#, true)]
    fn catch_panics_accepts_env_spellings(#[case] json: &str, #[case] expected: bool) {
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.catch_panics, expected);
    }

    #[test]
    fn catch_panics_rejects_unknown_spellings() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{"catch_panics": "maybe"}"#).is_err());
        assert!(serde_json::from_str::<EngineConfig>(r#"{"catch_panics": 2}"#).is_err());
    }

    #[test]
    fn serde_uses_milliseconds() {
        let config = EngineConfig::default().with_timeout(Duration::from_millis(1500));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 1500);

        let partial: EngineConfig = serde_json::from_str(r#"{"max_parallel": 2}"#).unwrap();
        assert_eq!(partial.max_parallel, 2);
        assert!(partial.catch_panics);
        assert_eq!(partial.timeout, None);
    }
}
