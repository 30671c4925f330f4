//! CLI entry-point for training an interaction classifier.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::dataset,
    nlp::{TrainOptions, TrainedModel},
};

/// Args for the `train` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Parsed training dataset.
    pub train: PathBuf,
    /// Parsed validation dataset.
    pub devel: PathBuf,
    /// Model name; bare names are stored under the models directory.
    pub model: String,
    /// Override the padded sequence length.
    #[arg(long)]
    pub max_len: Option<usize>,
    /// Override the optimizer iteration cap.
    #[arg(long)]
    pub max_iterations: Option<u64>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let train = dataset::load_examples(&settings.data_path(&args.train))?;
    let devel = dataset::load_examples(&settings.data_path(&args.devel))?;

    let options = TrainOptions {
        max_len: args.max_len.unwrap_or(settings.max_len),
        feature_dim: settings.feature_dim,
        max_iterations: args.max_iterations.unwrap_or(settings.max_iterations),
    };
    let model = TrainedModel::train(&train, options)?;

    let evaluation = model.evaluate(&devel);
    println!("{evaluation}");

    let name = settings.model_path(&args.model);
    model.save(&name)?;
    info!(model = %name.display(), "saved model and indexes");
    Ok(())
}
