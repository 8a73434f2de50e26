//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dtr_log::Format;
use dtr_rule::{RuleEvent, RuleTask};

#[derive(Parser, Debug)]
#[command(name = "dtr", version, about = "Data type registry rule engine")]
pub struct Cli {
    /// TOML or JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log output format (pretty, compact, json); logs go to stderr
    #[arg(long, global = true, value_parser = parse_format)]
    pub log_format: Option<Format>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the built-in rule graph and print the precomputed order
    Graph {
        /// Only print the order for this task
        #[arg(long)]
        task: Option<RuleTask>,
    },
    /// Run the rule engine over one element or an array of elements
    Run {
        /// JSON file holding an element or an array of elements
        file: PathBuf,
        /// Task to run
        #[arg(long, default_value = "validate")]
        task: RuleTask,
        /// Lifecycle event triggering the run
        #[arg(long)]
        event: Option<RuleEvent>,
    },
    /// List the built-in rule declarations
    Rules,
}

fn parse_format(raw: &str) -> Result<Format, String> {
    raw.parse().map_err(|err: dtr_log::LogError| err.to_string())
}
