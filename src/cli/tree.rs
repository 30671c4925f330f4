//! CLI entry-point for inspecting the dependency tree of one sentence.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    deptree::{CoreNlpClient, DependencyTree},
};

/// Args for the `tree` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Sentence to parse.
    pub text: String,
    /// Override the CoreNLP server URL.
    #[arg(long)]
    pub corenlp_url: Option<String>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let url = args.corenlp_url.as_deref().unwrap_or(&settings.corenlp_url);
    let parser = CoreNlpClient::new(url, settings.corenlp_timeout())?;
    let tree = DependencyTree::build(&args.text, &parser)
        .await
        .context("building dependency tree")?;

    print!("{tree}");
    for n in tree.nodes() {
        let span = tree
            .offset_span(n)
            .map(|s| format!("{}-{}", s.start, s.end))
            .unwrap_or_default();
        println!(
            "{n}\t{word}\t{head}\t{span}",
            word = tree.word(n).unwrap_or("<none>"),
            head = tree.parent(n).unwrap_or_default(),
        );
    }
    Ok(())
}
