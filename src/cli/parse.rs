//! CLI entry-point for parsing a corpus into examples.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::{corpus, dataset},
    deptree::CoreNlpClient,
};

/// Args for the `parse` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Folder holding the corpus XML files.
    pub data_dir: PathBuf,
    /// Output JSON Lines file.
    pub out: PathBuf,
    /// Override the CoreNLP server URL.
    #[arg(long)]
    pub corenlp_url: Option<String>,
    /// Override how many sentences are parsed concurrently.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let url = args.corenlp_url.as_deref().unwrap_or(&settings.corenlp_url);
    let parser = CoreNlpClient::new(url, settings.corenlp_timeout())
        .context("building CoreNLP client")?;
    let concurrency = args.concurrency.unwrap_or(settings.parse_concurrency);

    let corpus_dir = settings.data_path(&args.data_dir);
    let sentences = corpus::load_corpus(&corpus_dir)
        .with_context(|| format!("loading corpus from {}", corpus_dir.display()))?;
    let (examples, stats) = dataset::build_examples(sentences, &parser, concurrency).await?;
    dataset::save_examples(&args.out, &examples)?;

    info!(
        sentences = stats.sentences,
        skipped = stats.skipped_sentences,
        examples = stats.examples,
        out = %args.out.display(),
        "parsed corpus"
    );
    Ok(())
}
