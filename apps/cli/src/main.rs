//! `dtr`: run the registry's built-in rules from the command line.

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Commands};
use crate::commands::Input;
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = CliConfig::load(&cli)?;
    let _guard = dtr_log::init_with(config.logging.clone())?;
    tracing::debug!(?config, "configuration loaded");

    let engine = commands::engine(config.engine)?;

    match cli.command {
        Commands::Graph { task } => println!("{}", commands::graph(&engine, task)?),
        Commands::Rules => println!("{}", commands::rules(&engine)?),
        Commands::Run { file, task, event } => {
            let input = Input::read(&file)?;

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted, stopping after the current rules");
                    on_signal.cancel();
                }
            });

            let (json, failed) = commands::run(&engine, input, task, event, &cancel).await?;
            println!("{json}");
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
