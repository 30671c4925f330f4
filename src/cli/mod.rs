//! Command-line interface wiring for ddi-extractor.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::config::Settings;

pub mod parse;
pub mod predict;
pub mod train;
pub mod tree;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Drug-drug interaction extraction", long_about = None)]
pub struct Cli {
    /// Raise log verbosity (`-v` debug, `-vv` trace); `RUST_LOG` wins.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Parse(args) => parse::run(args, settings).await,
            Commands::Train(args) => train::run(args, settings).await,
            Commands::Predict(args) => predict::run(args, settings).await,
            Commands::Tree(args) => tree::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse an XML corpus into a JSON Lines dataset.
    Parse(parse::Args),
    /// Build codemaps and train a classifier, scoring it on a devel set.
    Train(train::Args),
    /// Label a parsed dataset and write detected interactions.
    Predict(predict::Args),
    /// Print the dependency tree of a single sentence.
    Tree(tree::Args),
}
