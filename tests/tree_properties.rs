use ddi_extractor::deptree::{DependencyTree, NodeId, RawParse, RawToken, ROOT};
use proptest::{prelude::*, sample::Index};

/// Random well-formed trees: token `i` hangs from some node with a smaller
/// id, so every head chain reaches the root.
fn arb_tree() -> impl Strategy<Value = DependencyTree> {
    prop::collection::vec(any::<Index>(), 1..24).prop_map(|picks| {
        let words: Vec<String> = (1..=picks.len()).map(|i| format!("w{i}")).collect();
        let tokens = picks
            .iter()
            .enumerate()
            .map(|(i, pick)| {
                let id = i + 1;
                let tag = if id % 3 == 0 { "DT" } else { "NN" };
                RawToken::new(id, &words[i], &words[i], tag, "dep", pick.index(id))
            })
            .collect();
        DependencyTree::from_parse(&words.join(" "), RawParse::new(tokens))
            .expect("generated trees are well formed")
    })
}

fn all_ids(tree: &DependencyTree) -> Vec<NodeId> {
    (0..tree.len()).collect()
}

proptest! {
    #[test]
    fn ancestors_end_just_below_root(tree in arb_tree()) {
        for n in tree.nodes() {
            let chain = tree.ancestors(n);
            prop_assert_eq!(chain[0], n);
            prop_assert!(chain.len() < tree.len());
            prop_assert_eq!(tree.parent(*chain.last().unwrap()), Some(ROOT));
            prop_assert!(!chain.contains(&ROOT));
        }
    }

    #[test]
    fn lcs_of_node_with_itself_is_the_node(tree in arb_tree()) {
        for n in tree.nodes() {
            prop_assert_eq!(tree.lowest_common_subsumer(n, n), Some(n));
        }
    }

    #[test]
    fn lcs_dominates_both_nodes(tree in arb_tree()) {
        for a in all_ids(&tree) {
            for b in all_ids(&tree) {
                let lcs = tree.lowest_common_subsumer(a, b).unwrap();
                prop_assert!(lcs == ROOT || tree.ancestors(a).contains(&lcs));
                prop_assert!(lcs == ROOT || tree.ancestors(b).contains(&lcs));
            }
        }
    }

    #[test]
    fn subtree_span_contains_own_span(tree in arb_tree()) {
        for n in tree.nodes() {
            let own = tree.offset_span(n).unwrap();
            let subtree = tree.subtree_span(n).unwrap();
            prop_assert!(subtree.encloses(&own));
        }
    }

    #[test]
    fn down_path_mirrors_up_path(tree in arb_tree()) {
        for a in all_ids(&tree) {
            for b in all_ids(&tree) {
                let down = tree.down_path(a, b);
                let up = tree.up_path(b, a);
                prop_assert_eq!(down.is_none(), up.is_none());
                if let (Some(mut down), Some(up)) = (down, up) {
                    down.reverse();
                    prop_assert_eq!(down, up);
                }
            }
        }
    }

    #[test]
    fn alignment_round_trips(tree in arb_tree()) {
        let chars: Vec<char> = tree.text().chars().collect();
        let mut previous_start = None;
        for n in tree.nodes() {
            let span = tree.offset_span(n).unwrap();
            let surface: String = chars[span.start..=span.end].iter().collect();
            prop_assert_eq!(Some(surface.as_str()), tree.word(n));
            if let Some(prev) = previous_start {
                prop_assert!(prev < span.start);
            }
            previous_start = Some(span.start);
        }
    }

    #[test]
    fn fragment_head_of_a_single_token_is_that_token(tree in arb_tree()) {
        for n in tree.nodes() {
            let span = tree.offset_span(n).unwrap();
            prop_assert_eq!(tree.fragment_head(span.start, span.end), Some(n));
        }
    }
}
