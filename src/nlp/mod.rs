//! Encoding, classification and scoring of interaction examples.

pub mod classifier;
pub mod codemaps;
pub mod evaluate;

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::data::{corpus::NULL_LABEL, dataset::Example};

use self::{classifier::InteractionClassifier, codemaps::Codemaps, evaluate::Evaluation};

/// Options of a training run.
#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    pub max_len: usize,
    pub feature_dim: usize,
    pub max_iterations: u64,
}

/// Codemaps and classifier that travel together under one model name.
#[derive(Debug)]
pub struct TrainedModel {
    pub codes: Codemaps,
    pub classifier: InteractionClassifier,
}

impl TrainedModel {
    /// Build indexes from the parsed examples of `train`, encode and fit.
    pub fn train(train: &[Example], options: TrainOptions) -> Result<Self> {
        let parsed: Vec<Example> = train.iter().filter(|e| e.is_parsed()).cloned().collect();
        let train = parsed.as_slice();
        let codes = Codemaps::from_examples(train, options.max_len);
        let inputs = codes.encode_words(train);
        let labels = codes.label_codes(train)?;
        let classifier = InteractionClassifier::train(
            &inputs,
            &labels,
            options.feature_dim,
            options.max_iterations,
        )?;
        Ok(Self { codes, classifier })
    }

    /// Predicted label per example. Unparsed examples, and codes without a
    /// label, fall back to `null`.
    pub fn predict(&self, examples: &[Example]) -> Vec<String> {
        let parsed: Vec<Example> = examples.iter().filter(|e| e.is_parsed()).cloned().collect();
        let inputs = self.codes.encode_words(&parsed);
        let mut codes = self.classifier.predict(&inputs).into_iter();
        examples
            .iter()
            .map(|example| {
                let code = if example.is_parsed() { codes.next() } else { None };
                code.and_then(|code| self.codes.idx2label(code))
                    .unwrap_or(NULL_LABEL)
                    .to_string()
            })
            .collect()
    }

    /// Predict and score against the gold labels of `examples`.
    pub fn evaluate(&self, examples: &[Example]) -> Evaluation {
        let predicted = self.predict(examples);
        let gold: Vec<&str> = examples.iter().map(|e| e.label.as_str()).collect();
        let evaluation = evaluate::evaluate(&gold, &predicted);
        info!(
            macro_f1 = evaluation.macro_f1,
            examples = examples.len(),
            unparsed = examples.iter().filter(|e| !e.is_parsed()).count(),
            "evaluated model"
        );
        evaluation
    }

    pub fn save(&self, name: &Path) -> Result<()> {
        self.classifier.save(name)?;
        self.codes.save(name)?;
        Ok(())
    }

    pub fn load(name: &Path) -> Result<Self> {
        Ok(Self {
            codes: Codemaps::load(name)?,
            classifier: InteractionClassifier::load(name)?,
        })
    }
}
