//! Turns corpus sentences into per-pair examples using dependency-tree
//! features, and persists them as JSON Lines.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    data::corpus::{Entity, Pair, Sentence},
    deptree::{DependencyParser, DependencyTree, NodeId, ROOT},
};

pub const DRUG1: &str = "<DRUG1>";
pub const DRUG2: &str = "<DRUG2>";
pub const DRUG_OTHER: &str = "<DRUG_OTHER>";
pub const NONE: &str = "<none>";

const AFFIX_LEN: usize = 5;

/// Per-token features of one example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFeatures {
    pub form: String,
    pub lc_form: String,
    pub lemma: String,
    pub pos: String,
    pub rel: String,
    pub suffix: String,
    pub prefix: String,
    /// Token lies on the dependency path joining the two entity heads.
    pub on_path: bool,
}

/// One candidate pair, ready for encoding.
///
/// Pairs of a sentence that could not be parsed keep their gold label but
/// carry no tokens, so scoring still counts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub sid: String,
    pub e1: String,
    pub e2: String,
    pub label: String,
    pub tokens: Vec<TokenFeatures>,
}

impl Example {
    /// Token-less placeholder for a pair whose sentence failed to parse.
    pub fn unparsed(sentence: &Sentence, pair: &Pair) -> Self {
        Self {
            sid: sentence.id.clone(),
            e1: pair.e1.clone(),
            e2: pair.e2.clone(),
            label: pair.label.clone(),
            tokens: Vec::new(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        !self.tokens.is_empty()
    }
}

/// Counters reported after a dataset build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub sentences: usize,
    pub skipped_sentences: usize,
    pub examples: usize,
}

/// Parse every sentence that has candidate pairs and extract one example
/// per pair. Pairs of sentences the parser or aligner rejects become
/// [`Example::unparsed`] placeholders.
#[instrument(skip(sentences, parser), fields(sentences = sentences.len()))]
pub async fn build_examples(
    sentences: Vec<Sentence>,
    parser: &dyn DependencyParser,
    concurrency: usize,
) -> Result<(Vec<Example>, BuildStats)> {
    let mut stats = BuildStats::default();
    let with_pairs: Vec<Sentence> = sentences
        .into_iter()
        .filter(|s| !s.pairs.is_empty())
        .collect();
    stats.sentences = with_pairs.len();

    let parsed: Vec<_> = stream::iter(with_pairs)
        .map(|sentence| async move {
            let tree = DependencyTree::build(&sentence.text, parser).await;
            (sentence, tree)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut examples = Vec::new();
    for (sentence, tree) in parsed {
        match tree {
            Ok(tree) => {
                examples.extend(
                    sentence
                        .pairs
                        .iter()
                        .map(|pair| extract_example(&tree, &sentence, pair)),
                );
            }
            Err(err) => {
                stats.skipped_sentences += 1;
                warn!(sid = %sentence.id, error = %err, "sentence not parsed");
                examples.extend(
                    sentence
                        .pairs
                        .iter()
                        .map(|pair| Example::unparsed(&sentence, pair)),
                );
            }
        }
    }
    stats.examples = examples.len();
    info!(
        examples = stats.examples,
        skipped = stats.skipped_sentences,
        "built examples"
    );
    Ok((examples, stats))
}

/// Build the example for `pair` over an already parsed sentence.
pub fn extract_example(tree: &DependencyTree, sentence: &Sentence, pair: &Pair) -> Example {
    let e1 = sentence.entities.get(&pair.e1);
    let e2 = sentence.entities.get(&pair.e2);
    let only = |entity: Option<&Entity>| -> IndexMap<String, Entity> {
        entity
            .map(|e| (e.id.clone(), e.clone()))
            .into_iter()
            .collect()
    };
    let e1_map = only(e1);
    let e2_map = only(e2);

    let h1 = e1.and_then(|e| tree.fragment_head(e.span.start, e.span.end));
    let h2 = e2.and_then(|e| tree.fragment_head(e.span.start, e.span.end));
    let path = match (h1, h2) {
        (Some(h1), Some(h2)) => dependency_path(tree, h1, h2),
        _ => Vec::new(),
    };

    let tokens = tree
        .nodes()
        .into_iter()
        .map(|n| {
            let mask = if tree.is_entity_member(n, &e1_map) {
                Some(DRUG1)
            } else if tree.is_entity_member(n, &e2_map) {
                Some(DRUG2)
            } else if tree.is_entity_member(n, &sentence.entities) {
                Some(DRUG_OTHER)
            } else {
                None
            };
            token_features(tree, n, mask, path.contains(&n))
        })
        .collect();

    Example {
        sid: sentence.id.clone(),
        e1: pair.e1.clone(),
        e2: pair.e2.clone(),
        label: pair.label.clone(),
        tokens,
    }
}

/// Nodes from `h1` up to the subsumer and down to `h2`, both ends
/// included. When the heads only meet at the root, the path joins the two
/// ancestor chains and leaves the root out.
pub fn dependency_path(tree: &DependencyTree, h1: NodeId, h2: NodeId) -> Vec<NodeId> {
    match tree.lowest_common_subsumer(h1, h2) {
        None => Vec::new(),
        Some(ROOT) => {
            let mut path = tree.ancestors(h1);
            path.extend(tree.ancestors(h2).into_iter().rev());
            path
        }
        Some(lcs) => {
            let mut path = tree.up_path(h1, lcs).unwrap_or_default();
            path.push(lcs);
            path.extend(tree.down_path(lcs, h2).unwrap_or_default());
            path
        }
    }
}

fn token_features(
    tree: &DependencyTree,
    n: NodeId,
    mask: Option<&str>,
    on_path: bool,
) -> TokenFeatures {
    let form = mask.or(tree.word(n)).unwrap_or(NONE).to_string();
    let lc_form = form.to_lowercase();
    let lemma = match mask {
        Some(mask) => mask.to_lowercase(),
        None => tree.lemma(n).unwrap_or(NONE).to_lowercase(),
    };
    let chars: Vec<char> = lc_form.chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(AFFIX_LEN)..].iter().collect();
    let prefix: String = chars.iter().take(AFFIX_LEN).collect();

    TokenFeatures {
        form,
        lc_form,
        lemma,
        pos: tree.tag(n).unwrap_or(NONE).to_string(),
        rel: tree.relation(n).unwrap_or(NONE).to_string(),
        suffix,
        prefix,
        on_path,
    }
}

/// Write examples as JSON Lines.
pub fn save_examples(path: &Path, examples: &[Example]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("create {path:?}"))?;
    let mut writer = BufWriter::new(file);
    for example in examples {
        serde_json::to_writer(&mut writer, example)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    info!(path = %path.display(), count = examples.len(), "saved examples");
    Ok(())
}

/// Read examples written by [`save_examples`].
pub fn load_examples(path: &Path) -> Result<Vec<Example>> {
    let file = File::open(path).with_context(|| format!("open {path:?}"))?;
    let mut examples = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let example: Example = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
        examples.push(example);
    }
    info!(path = %path.display(), count = examples.len(), "loaded examples");
    Ok(examples)
}
