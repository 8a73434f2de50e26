//! Layered configuration: defaults, then the config file, then `DTR_*`
//! environment variables, then flags.

use std::path::Path;

use anyhow::Context;
use dtr_engine::EngineConfig;
use figment::Figment;
use figment::providers::{Env, Format as _, Json, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub engine: EngineConfig,
    pub logging: dtr_log::Config,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            logging: dtr_log::Config::default().with_level("warn"),
        }
    }
}

impl CliConfig {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = &cli.config {
            anyhow::ensure!(path.is_file(), "config file {} not found", path.display());
            figment = merge_file(figment, path);
        }

        let mut config: Self = figment
            .merge(Env::prefixed("DTR_ENGINE_").map(|key| format!("engine.{key}").into()))
            .merge(Env::raw().only(&["RUST_LOG"]).map(|_| "logging.level".into()))
            .merge(Env::raw().only(&["DTR_LOG"]).map(|_| "logging.level".into()))
            .merge(Env::raw().only(&["DTR_LOG_FORMAT"]).map(|_| "logging.format".into()))
            .extract()
            .context("invalid configuration")?;

        if let Some(format) = cli.log_format {
            config.logging.format = format;
        }
        Ok(config)
    }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}
