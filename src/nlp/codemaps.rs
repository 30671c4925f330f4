//! Vocabulary and label indexes used to encode examples as fixed-length
//! integer sequences.

use std::{
    collections::BTreeSet,
    fmt::Write as _,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use ndarray::Array2;
use tracing::info;

use crate::data::dataset::{Example, TokenFeatures};

pub const PAD: &str = "PAD";
pub const UNK: &str = "UNK";
pub const PAD_CODE: usize = 0;
pub const UNK_CODE: usize = 1;

type Index = IndexMap<String, usize>;

/// Padded code matrices, one row per example and `max_len` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInputs {
    pub words: Array2<usize>,
    pub lc_words: Array2<usize>,
    pub lemmas: Array2<usize>,
    pub pos: Array2<usize>,
    pub rels: Array2<usize>,
    pub suffixes: Array2<usize>,
    pub prefixes: Array2<usize>,
    /// Which cells hold a token on the entity-to-entity dependency path.
    pub on_path: Array2<bool>,
}

impl EncodedInputs {
    pub fn n_examples(&self) -> usize {
        self.words.nrows()
    }
}

/// Indexes built from training data, or loaded back from an `.idx` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codemaps {
    pub max_len: usize,
    word_index: Index,
    lc_word_index: Index,
    lemma_index: Index,
    pos_index: Index,
    rel_index: Index,
    suffix_index: Index,
    prefix_index: Index,
    label_index: Index,
}

impl Codemaps {
    /// Collect every form, lowercased form, lemma, tag, relation, affix and
    /// label seen in `examples`. Keys are sorted; codes `0` and `1` are reserved
    /// for padding and unknown values. Labels are numbered from `0`.
    pub fn from_examples(examples: &[Example], max_len: usize) -> Self {
        let mut words = BTreeSet::new();
        let mut lc_words = BTreeSet::new();
        let mut lemmas = BTreeSet::new();
        let mut pos = BTreeSet::new();
        let mut rels = BTreeSet::new();
        let mut suffixes = BTreeSet::new();
        let mut prefixes = BTreeSet::new();
        let mut labels = BTreeSet::new();

        for example in examples {
            for token in &example.tokens {
                words.insert(token.form.as_str());
                lc_words.insert(token.lc_form.as_str());
                lemmas.insert(token.lemma.as_str());
                pos.insert(token.pos.as_str());
                rels.insert(token.rel.as_str());
                suffixes.insert(token.suffix.as_str());
                prefixes.insert(token.prefix.as_str());
            }
            labels.insert(example.label.as_str());
        }

        let codes = Self {
            max_len,
            word_index: vocabulary(words),
            lc_word_index: vocabulary(lc_words),
            lemma_index: vocabulary(lemmas),
            pos_index: vocabulary(pos),
            rel_index: vocabulary(rels),
            suffix_index: vocabulary(suffixes),
            prefix_index: vocabulary(prefixes),
            label_index: labels
                .into_iter()
                .enumerate()
                .map(|(i, l)| (l.to_string(), i))
                .collect(),
        };
        info!(
            words = codes.n_words(),
            lemmas = codes.n_lemmas(),
            labels = codes.n_labels(),
            max_len,
            "created codemaps"
        );
        codes
    }

    /// Path of the index file belonging to model `name`.
    pub fn index_path(name: &Path) -> PathBuf {
        let mut path = name.as_os_str().to_owned();
        path.push(".idx");
        PathBuf::from(path)
    }

    /// Write the indexes to `<name>.idx`.
    pub fn save(&self, name: &Path) -> Result<PathBuf> {
        let path = Self::index_path(name);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.to_index_string())
            .with_context(|| format!("write {path:?}"))?;
        info!(path = %path.display(), "saved codemaps");
        Ok(path)
    }

    /// Read indexes previously written by [`Codemaps::save`].
    pub fn load(name: &Path) -> Result<Self> {
        let path = Self::index_path(name);
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("read {path:?}"))?;
        Self::from_index_str(&content).with_context(|| format!("parse {path:?}"))
    }

    /// Serialize as `KIND key code` lines, led by `MAXLEN n -`.
    pub fn to_index_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "MAXLEN {} -", self.max_len);
        for (kind, index) in self.tables() {
            for (key, code) in index {
                let _ = writeln!(out, "{kind} {key} {code}");
            }
        }
        out
    }

    pub fn from_index_str(content: &str) -> Result<Self> {
        let mut codes = Self {
            max_len: 0,
            word_index: Index::new(),
            lc_word_index: Index::new(),
            lemma_index: Index::new(),
            pos_index: Index::new(),
            rel_index: Index::new(),
            suffix_index: Index::new(),
            prefix_index: Index::new(),
            label_index: Index::new(),
        };
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [kind, key, value] = fields[..] else {
                bail!("line {}: expected 3 fields, found {}", lineno + 1, fields.len());
            };
            if kind == "MAXLEN" {
                codes.max_len = key
                    .parse()
                    .with_context(|| format!("line {}: bad MAXLEN", lineno + 1))?;
                continue;
            }
            let code: usize = value
                .parse()
                .with_context(|| format!("line {}: bad code {value:?}", lineno + 1))?;
            let index = match kind {
                "WORD" => &mut codes.word_index,
                "LCWORD" => &mut codes.lc_word_index,
                "LEMMA" => &mut codes.lemma_index,
                "POS" => &mut codes.pos_index,
                "REL" => &mut codes.rel_index,
                "SUFFIX" => &mut codes.suffix_index,
                "PREFIX" => &mut codes.prefix_index,
                "LABEL" => &mut codes.label_index,
                other => bail!("line {}: unknown index kind {other:?}", lineno + 1),
            };
            index.insert(key.to_string(), code);
        }
        Ok(codes)
    }

    /// Encode and post-pad every token sequence of `examples`.
    pub fn encode_words(&self, examples: &[Example]) -> EncodedInputs {
        EncodedInputs {
            words: self.encode_and_pad(examples, &self.word_index, |t| &t.form),
            lc_words: self.encode_and_pad(examples, &self.lc_word_index, |t| &t.lc_form),
            lemmas: self.encode_and_pad(examples, &self.lemma_index, |t| &t.lemma),
            pos: self.encode_and_pad(examples, &self.pos_index, |t| &t.pos),
            rels: self.encode_and_pad(examples, &self.rel_index, |t| &t.rel),
            suffixes: self.encode_and_pad(examples, &self.suffix_index, |t| &t.suffix),
            prefixes: self.encode_and_pad(examples, &self.prefix_index, |t| &t.prefix),
            on_path: Array2::from_shape_fn((examples.len(), self.max_len), |(i, j)| {
                examples[i].tokens.get(j).is_some_and(|t| t.on_path)
            }),
        }
    }

    /// Label code of every example.
    pub fn label_codes(&self, examples: &[Example]) -> Result<Vec<usize>> {
        examples
            .iter()
            .map(|e| {
                self.label2idx(&e.label)
                    .ok_or_else(|| anyhow!("label {:?} of {} is not indexed", e.label, e.sid))
            })
            .collect()
    }

    /// One-hot label matrix, `n_examples x n_labels`.
    pub fn encode_labels(&self, examples: &[Example]) -> Result<Array2<f64>> {
        let codes = self.label_codes(examples)?;
        let mut y = Array2::zeros((examples.len(), self.n_labels()));
        for (row, code) in codes.into_iter().enumerate() {
            y[[row, code]] = 1.0;
        }
        Ok(y)
    }

    pub fn n_words(&self) -> usize {
        self.word_index.len()
    }

    pub fn n_lc_words(&self) -> usize {
        self.lc_word_index.len()
    }

    pub fn n_lemmas(&self) -> usize {
        self.lemma_index.len()
    }

    pub fn n_pos(&self) -> usize {
        self.pos_index.len()
    }

    pub fn n_rels(&self) -> usize {
        self.rel_index.len()
    }

    pub fn n_suffixes(&self) -> usize {
        self.suffix_index.len()
    }

    pub fn n_prefixes(&self) -> usize {
        self.prefix_index.len()
    }

    pub fn n_labels(&self) -> usize {
        self.label_index.len()
    }

    pub fn word2idx(&self, w: &str) -> Option<usize> {
        self.word_index.get(w).copied()
    }

    pub fn lcword2idx(&self, w: &str) -> Option<usize> {
        self.lc_word_index.get(w).copied()
    }

    pub fn label2idx(&self, l: &str) -> Option<usize> {
        self.label_index.get(l).copied()
    }

    pub fn idx2label(&self, i: usize) -> Option<&str> {
        self.label_index
            .iter()
            .find(|(_, &code)| code == i)
            .map(|(label, _)| label.as_str())
    }

    /// Labels ordered by code.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<_> = self.label_index.iter().collect();
        labels.sort_by_key(|(_, &code)| code);
        labels.into_iter().map(|(l, _)| l.as_str()).collect()
    }

    fn tables(&self) -> [(&'static str, &Index); 8] {
        [
            ("LABEL", &self.label_index),
            ("WORD", &self.word_index),
            ("LCWORD", &self.lc_word_index),
            ("LEMMA", &self.lemma_index),
            ("POS", &self.pos_index),
            ("REL", &self.rel_index),
            ("SUFFIX", &self.suffix_index),
            ("PREFIX", &self.prefix_index),
        ]
    }

    fn encode_and_pad<F>(&self, examples: &[Example], index: &Index, key: F) -> Array2<usize>
    where
        F: Fn(&TokenFeatures) -> &String,
    {
        let unk = index.get(UNK).copied().unwrap_or(UNK_CODE);
        let pad = index.get(PAD).copied().unwrap_or(PAD_CODE);
        Array2::from_shape_fn((examples.len(), self.max_len), |(i, j)| {
            examples[i]
                .tokens
                .get(j)
                .map_or(pad, |t| index.get(key(t).as_str()).copied().unwrap_or(unk))
        })
    }
}

/// `PAD`/`UNK` first, then sorted keys from code 2. Keys containing
/// whitespace cannot round-trip through the index file and stay unknown.
fn vocabulary(keys: BTreeSet<&str>) -> Index {
    let mut index = Index::with_capacity(keys.len() + 2);
    index.insert(PAD.to_string(), PAD_CODE);
    index.insert(UNK.to_string(), UNK_CODE);
    for key in keys {
        if key.is_empty() || key.chars().any(char::is_whitespace) || index.contains_key(key) {
            continue;
        }
        let code = index.len();
        index.insert(key.to_string(), code);
    }
    index
}
