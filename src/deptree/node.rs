//! Node-level types shared by the parser adapter, aligner and query engine.

use serde::{Deserialize, Serialize};

/// Token index inside a sentence; `0` is the synthetic root.
pub type NodeId = usize;

/// Id of the synthetic root node.
pub const ROOT: NodeId = 0;

/// Inclusive character interval `[start, end]` in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// True when `offset` falls inside the interval.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// True when `other` lies entirely within this interval.
    pub fn encloses(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest interval covering both.
    pub fn union(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl AsRef<Span> for Span {
    fn as_ref(&self) -> &Span {
        self
    }
}

/// One token as produced by the parsing service, before alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawToken {
    pub id: NodeId,
    pub word: Option<String>,
    pub lemma: Option<String>,
    pub tag: Option<String>,
    pub relation: Option<String>,
    pub head: NodeId,
}

impl RawToken {
    /// Convenience constructor used by stub parsers and tests.
    pub fn new(
        id: NodeId,
        word: &str,
        lemma: &str,
        tag: &str,
        relation: &str,
        head: NodeId,
    ) -> Self {
        Self {
            id,
            word: Some(word.to_string()),
            lemma: Some(lemma.to_string()),
            tag: Some(tag.to_string()),
            relation: Some(relation.to_string()),
            head,
        }
    }
}

/// Labeled dependency graph for a single sentence, tokens only (no root).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParse {
    pub tokens: Vec<RawToken>,
}

impl RawParse {
    pub fn new(tokens: Vec<RawToken>) -> Self {
        Self { tokens }
    }
}

/// Immutable, offset-annotated tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub id: NodeId,
    pub word: Option<String>,
    pub lemma: Option<String>,
    pub tag: Option<String>,
    pub relation: Option<String>,
    pub head: NodeId,
    /// `None` only for the root.
    pub span: Option<Span>,
}

impl DependencyNode {
    pub(crate) fn root() -> Self {
        Self {
            id: ROOT,
            word: None,
            lemma: None,
            tag: None,
            relation: None,
            head: ROOT,
            span: None,
        }
    }

    pub(crate) fn aligned(token: RawToken, span: Span) -> Self {
        Self {
            id: token.id,
            word: token.word,
            lemma: token.lemma,
            tag: token.tag,
            relation: token.relation,
            head: token.head,
            span: Some(span),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT
    }
}
