#![allow(dead_code)]

use async_trait::async_trait;
use ddi_extractor::deptree::{DependencyParser, DependencyTree, RawParse, RawToken, Result};

pub const ASPIRIN: &str = "Aspirin increases the effect of Warfarin.";

/// Hand-written parse of [`ASPIRIN`]:
///
/// ```text
/// increases(2) -> Aspirin(1), effect(4), .(7)
/// effect(4)    -> the(3), Warfarin(6)
/// Warfarin(6)  -> of(5)
/// ```
pub fn aspirin_parse() -> RawParse {
    RawParse::new(vec![
        RawToken::new(1, "Aspirin", "aspirin", "NNP", "nsubj", 2),
        RawToken::new(2, "increases", "increase", "VBZ", "ROOT", 0),
        RawToken::new(3, "the", "the", "DT", "det", 4),
        RawToken::new(4, "effect", "effect", "NN", "obj", 2),
        RawToken::new(5, "of", "of", "IN", "case", 6),
        RawToken::new(6, "Warfarin", "warfarin", "NNP", "nmod", 4),
        RawToken::new(7, ".", ".", ".", "punct", 2),
    ])
}

pub fn aspirin_tree() -> DependencyTree {
    DependencyTree::from_parse(ASPIRIN, aspirin_parse()).expect("aligned aspirin tree")
}

/// Parser double answering every request with the same graph.
pub struct StubParser {
    pub parse: RawParse,
}

#[async_trait]
impl DependencyParser for StubParser {
    async fn parse(&self, _sanitized: &str) -> Result<RawParse> {
        Ok(self.parse.clone())
    }
}
