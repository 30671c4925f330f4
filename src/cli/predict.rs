//! CLI entry-point for labelling a parsed dataset.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use csv::WriterBuilder;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::{
        corpus::NULL_LABEL,
        dataset::{self, Example},
    },
    nlp::TrainedModel,
};

/// Args for the `predict` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Model name used at training time.
    pub model: String,
    /// Parsed dataset to label.
    pub data: PathBuf,
    /// Output file receiving `sid|e1|e2|type` lines.
    pub out: PathBuf,
    /// Also score predictions against the dataset's gold labels.
    #[arg(long)]
    pub evaluate: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let name = settings.model_path(&args.model);
    let model = TrainedModel::load(&name)
        .with_context(|| format!("loading model {}", name.display()))?;
    let examples = dataset::load_examples(&settings.data_path(&args.data))?;

    let predicted = model.predict(&examples);
    let written = write_interactions(&args.out, &examples, &predicted)?;
    info!(out = %args.out.display(), interactions = written, "wrote predictions");

    if args.evaluate {
        let gold: Vec<&str> = examples.iter().map(|e| e.label.as_str()).collect();
        println!("{}", crate::nlp::evaluate::evaluate(&gold, &predicted));
    }
    Ok(())
}

/// Write one `sid|e1|e2|type` line per example predicted to interact.
/// Returns the number of lines written.
pub fn write_interactions(
    path: &Path,
    examples: &[Example],
    predicted: &[String],
) -> Result<usize> {
    if examples.len() != predicted.len() {
        bail!(
            "{} examples but {} predictions",
            examples.len(),
            predicted.len()
        );
    }
    let mut writer = WriterBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("create {path:?}"))?;
    let mut written = 0;
    for (example, label) in examples.iter().zip(predicted) {
        if label == NULL_LABEL {
            continue;
        }
        writer.write_record([
            example.sid.as_str(),
            example.e1.as_str(),
            example.e2.as_str(),
            label.as_str(),
        ])?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
