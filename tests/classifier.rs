use ddi_extractor::{
    cli::predict::write_interactions,
    data::dataset::{Example, TokenFeatures},
    nlp::{TrainOptions, TrainedModel},
};

fn example(sid: &str, label: &str, words: &[&str]) -> Example {
    Example {
        sid: sid.into(),
        e1: format!("{sid}.e0"),
        e2: format!("{sid}.e1"),
        label: label.into(),
        tokens: words
            .iter()
            .map(|w| TokenFeatures {
                form: w.to_string(),
                lc_form: w.to_lowercase(),
                lemma: w.to_lowercase(),
                pos: "NN".into(),
                rel: "dep".into(),
                suffix: String::new(),
                prefix: String::new(),
                on_path: true,
            })
            .collect(),
    }
}

fn corpus() -> Vec<Example> {
    let mut examples = Vec::new();
    for i in 0..6 {
        examples.push(example(
            &format!("a{i}"),
            "effect",
            &["<DRUG1>", "increases", "effect", "<DRUG2>"],
        ));
        examples.push(example(
            &format!("b{i}"),
            "null",
            &["<DRUG1>", "and", "<DRUG2>", "tablets"],
        ));
    }
    examples
}

fn options() -> TrainOptions {
    TrainOptions {
        max_len: 8,
        feature_dim: 64,
        max_iterations: 50,
    }
}

#[test]
fn separable_corpus_is_learned() {
    let model = TrainedModel::train(&corpus(), options()).unwrap();
    let gold: Vec<String> = corpus().into_iter().map(|e| e.label).collect();
    assert_eq!(model.predict(&corpus()), gold);
}

#[test]
fn unparsed_examples_predict_null_and_count_as_misses() {
    let model = TrainedModel::train(&corpus(), options()).unwrap();
    let mut examples = corpus();
    examples.push(example("c0", "effect", &[]));

    let predicted = model.predict(&examples);
    assert_eq!(predicted.last().map(String::as_str), Some("null"));
    assert_eq!(predicted[..examples.len() - 1], model.predict(&corpus())[..]);

    let evaluation = model.evaluate(&examples);
    assert_eq!(evaluation.per_class["effect"].fn_, 1);
}

#[test]
fn single_label_training_is_rejected() {
    let only_null: Vec<Example> = corpus().into_iter().filter(|e| e.label == "null").collect();
    assert!(TrainedModel::train(&only_null, options()).is_err());
}

#[test]
fn saved_model_predicts_identically() {
    let model = TrainedModel::train(&corpus(), options()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("ddi");
    model.save(&name).unwrap();

    let loaded = TrainedModel::load(&name).unwrap();
    assert_eq!(loaded.classifier.feature_dim(), options().feature_dim);
    assert_eq!(loaded.codes, model.codes);
    assert_eq!(loaded.predict(&corpus()), model.predict(&corpus()));
}

#[test]
fn only_interactions_are_written() {
    let examples = vec![
        example("s1", "effect", &["x"]),
        example("s2", "null", &["y"]),
    ];
    let predicted = vec!["mechanism".to_string(), "null".to_string()];
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.txt");
    let written = write_interactions(&out, &examples, &predicted).unwrap();
    assert_eq!(written, 1);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "s1|s1.e0|s1.e1|mechanism\n"
    );
}
