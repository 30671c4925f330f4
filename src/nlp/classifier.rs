//! Multinomial logistic interaction classifier over hashed bags of codes.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use linfa::{
    dataset::DatasetBase,
    prelude::{Fit, Predict},
};
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::codemaps::{EncodedInputs, PAD_CODE};

/// Feature channels; each hashes into its own region of the bag.
#[derive(Debug, Clone, Copy)]
enum Channel {
    SentenceWord = 1,
    PathWord = 2,
    PathLemma = 3,
    PathPos = 4,
    PathRel = 5,
    SentenceSuffix = 6,
    SentencePrefix = 7,
}

/// Trained classifier plus the feature width it expects.
#[derive(Debug, Serialize, Deserialize)]
pub struct InteractionClassifier {
    feature_dim: usize,
    model: MultiFittedLogisticRegression<f64, usize>,
}

impl InteractionClassifier {
    /// Fit on encoded inputs and their label codes.
    #[instrument(skip(inputs, labels), fields(examples = labels.len()))]
    pub fn train(
        inputs: &EncodedInputs,
        labels: &[usize],
        feature_dim: usize,
        max_iterations: u64,
    ) -> Result<Self> {
        if inputs.n_examples() != labels.len() {
            bail!(
                "{} encoded examples but {} labels",
                inputs.n_examples(),
                labels.len()
            );
        }
        let distinct = labels.iter().collect::<std::collections::BTreeSet<_>>().len();
        if distinct < 2 {
            bail!("training data needs at least two distinct labels, found {distinct}");
        }

        let x = featurise(inputs, feature_dim);
        let y = Array1::from(labels.to_vec());
        let dataset = DatasetBase::new(x, y);
        let model = MultiLogisticRegression::default()
            .max_iterations(max_iterations)
            .fit(&dataset)
            .context("fitting logistic regression")?;
        info!(feature_dim, max_iterations, "trained interaction classifier");
        Ok(Self { feature_dim, model })
    }

    /// Predicted label code per example.
    pub fn predict(&self, inputs: &EncodedInputs) -> Vec<usize> {
        if inputs.n_examples() == 0 {
            return Vec::new();
        }
        let x = featurise(inputs, self.feature_dim);
        self.model.predict(&x).to_vec()
    }

    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Path of the serialized model belonging to model `name`.
    pub fn model_path(name: &Path) -> PathBuf {
        let mut path = name.as_os_str().to_owned();
        path.push(".json");
        PathBuf::from(path)
    }

    pub fn save(&self, name: &Path) -> Result<PathBuf> {
        let path = Self::model_path(name);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path).with_context(|| format!("create {path:?}"))?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        info!(path = %path.display(), "saved classifier");
        Ok(path)
    }

    pub fn load(name: &Path) -> Result<Self> {
        let path = Self::model_path(name);
        let file = File::open(&path).with_context(|| format!("open {path:?}"))?;
        let model = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("decode {path:?}"))?;
        Ok(model)
    }
}

/// Hashed, L2-normalized bag of codes: every lowercased word of the
/// sentence and their affixes, plus words, lemmas, tags and relations on
/// the dependency path.
pub fn featurise(inputs: &EncodedInputs, feature_dim: usize) -> Array2<f64> {
    let dim = feature_dim.max(1);
    let mut x = Array2::<f64>::zeros((inputs.n_examples(), dim));

    for (row, mut bag) in x.rows_mut().into_iter().enumerate() {
        let path = inputs.on_path.row(row);
        let mut add = |channel: Channel, codes: ArrayView1<usize>, path_only: bool| {
            for (col, &code) in codes.iter().enumerate() {
                if code == PAD_CODE || (path_only && !path[col]) {
                    continue;
                }
                bag[bucket(channel, code, dim)] += 1.0;
            }
        };
        add(Channel::SentenceWord, inputs.lc_words.row(row), false);
        add(Channel::SentenceSuffix, inputs.suffixes.row(row), false);
        add(Channel::SentencePrefix, inputs.prefixes.row(row), false);
        add(Channel::PathWord, inputs.lc_words.row(row), true);
        add(Channel::PathLemma, inputs.lemmas.row(row), true);
        add(Channel::PathPos, inputs.pos.row(row), true);
        add(Channel::PathRel, inputs.rels.row(row), true);

        let norm = bag.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            bag.mapv_inplace(|v| v / norm);
        }
    }
    x
}

fn bucket(channel: Channel, code: usize, dim: usize) -> usize {
    let key = ((channel as u64) << 32) ^ code as u64;
    let mixed = key.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    ((mixed >> 17) % dim as u64) as usize
}
