//! Precision, recall and F1 of predicted interaction types.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::data::corpus::NULL_LABEL;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassScore {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Scores per interaction type (never `null`) and their macro average.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub per_class: BTreeMap<String, ClassScore>,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
}

/// Compare gold and predicted labels position by position.
pub fn evaluate<G, P>(gold: &[G], predicted: &[P]) -> Evaluation
where
    G: AsRef<str>,
    P: AsRef<str>,
{
    let mut per_class: BTreeMap<String, ClassScore> = BTreeMap::new();
    for (g, p) in gold.iter().zip(predicted) {
        let (g, p) = (g.as_ref(), p.as_ref());
        if g == p {
            if g != NULL_LABEL {
                per_class.entry(g.to_string()).or_default().tp += 1;
            }
            continue;
        }
        if p != NULL_LABEL {
            per_class.entry(p.to_string()).or_default().fp += 1;
        }
        if g != NULL_LABEL {
            per_class.entry(g.to_string()).or_default().fn_ += 1;
        }
    }

    for score in per_class.values_mut() {
        score.precision = ratio(score.tp, score.tp + score.fp);
        score.recall = ratio(score.tp, score.tp + score.fn_);
        score.f1 = harmonic(score.precision, score.recall);
    }

    let n = per_class.len() as f64;
    let mean = |f: fn(&ClassScore) -> f64| {
        if per_class.is_empty() {
            0.0
        } else {
            per_class.values().map(f).sum::<f64>() / n
        }
    };
    let macro_precision = mean(|s| s.precision);
    let macro_recall = mean(|s| s.recall);
    let macro_f1 = mean(|s| s.f1);

    Evaluation {
        per_class,
        macro_precision,
        macro_recall,
        macro_f1,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn harmonic(p: f64, r: f64) -> f64 {
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>5} {:>5} {:>5} {:>7} {:>7} {:>7}",
            "type", "tp", "fp", "fn", "P", "R", "F1"
        )?;
        for (label, s) in &self.per_class {
            writeln!(
                f,
                "{:<12} {:>5} {:>5} {:>5} {:>6.1}% {:>6.1}% {:>6.1}%",
                label,
                s.tp,
                s.fp,
                s.fn_,
                s.precision * 100.0,
                s.recall * 100.0,
                s.f1 * 100.0
            )?;
        }
        write!(
            f,
            "{:<12} {:>5} {:>5} {:>5} {:>6.1}% {:>6.1}% {:>6.1}%",
            "M.avg",
            "",
            "",
            "",
            self.macro_precision * 100.0,
            self.macro_recall * 100.0,
            self.macro_f1 * 100.0
        )
    }
}
