use ddi_extractor::nlp::evaluate::evaluate;

#[test]
fn null_is_excluded_from_scores() {
    let gold = ["effect", "effect", "null", "mechanism", "null"];
    let pred = ["effect", "null", "effect", "mechanism", "null"];
    let eval = evaluate(&gold, &pred);

    let effect = &eval.per_class["effect"];
    assert_eq!((effect.tp, effect.fp, effect.fn_), (1, 1, 1));
    assert!((effect.precision - 0.5).abs() < 1e-9);
    assert!((effect.recall - 0.5).abs() < 1e-9);
    assert!((effect.f1 - 0.5).abs() < 1e-9);

    let mechanism = &eval.per_class["mechanism"];
    assert_eq!((mechanism.tp, mechanism.fp, mechanism.fn_), (1, 0, 0));
    assert!((mechanism.f1 - 1.0).abs() < 1e-9);

    assert!(!eval.per_class.contains_key("null"));
    assert!((eval.macro_f1 - 0.75).abs() < 1e-9);
}

#[test]
fn all_null_yields_zero_macro() {
    let eval = evaluate(&["null", "null"], &["null", "null"]);
    assert!(eval.per_class.is_empty());
    assert_eq!(eval.macro_f1, 0.0);
    assert!(eval.to_string().contains("M.avg"));
}
