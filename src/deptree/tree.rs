//! Offset-annotated dependency tree and the queries feature extraction runs
//! against it.

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use super::{
    align::align_tokens,
    error::{DeptreeError, Result},
    node::{DependencyNode, NodeId, RawParse, RawToken, Span, ROOT},
    parser::{sanitize, DependencyParser},
};

/// Tags whose first character marks an open-class word (noun, verb,
/// adjective, adverb).
const OPEN_CLASS_MARKERS: [char; 4] = ['N', 'V', 'J', 'R'];

/// Dependency parse of one sentence, with every token aligned to the
/// original text.
///
/// Built once, never mutated. A tree built from empty text has no structure
/// at all; every query on it yields an empty or `None` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyTree {
    text: String,
    /// Indexed by node id; slot `0` is the synthetic root.
    nodes: Option<Vec<DependencyNode>>,
}

impl DependencyTree {
    /// Tree for empty text.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            nodes: None,
        }
    }

    /// Parse `text` with `parser` and align the result against `text`.
    pub async fn build(text: &str, parser: &dyn DependencyParser) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        let parse = parser.parse(&sanitize(text)).await?;
        let tree = Self::from_parse(text, parse)?;
        debug!(sentence = %text, "dependency tree\n{tree}");
        Ok(tree)
    }

    /// Pure transform from a raw parse to an aligned tree.
    pub fn from_parse(text: &str, parse: RawParse) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        let mut tokens = parse.tokens;
        tokens.sort_by_key(|t| t.id);
        validate(&tokens)?;

        let mut nodes = Vec::with_capacity(tokens.len() + 1);
        nodes.push(DependencyNode::root());
        nodes.extend(align_tokens(text, tokens)?);

        Ok(Self {
            text: text.to_string(),
            nodes: Some(nodes),
        })
    }

    /// Original, unsanitized sentence.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True for the structureless tree of an empty sentence.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_none()
    }

    /// Number of nodes including the root; `0` for an empty tree.
    pub fn len(&self) -> usize {
        self.nodes.as_ref().map_or(0, Vec::len)
    }

    /// Token ids in sentence order, root excluded.
    pub fn nodes(&self) -> Vec<NodeId> {
        (1..self.len()).collect()
    }

    pub fn node(&self, n: NodeId) -> Option<&DependencyNode> {
        self.nodes.as_ref()?.get(n)
    }

    pub fn word(&self, n: NodeId) -> Option<&str> {
        self.node(n)?.word.as_deref()
    }

    pub fn lemma(&self, n: NodeId) -> Option<&str> {
        self.node(n)?.lemma.as_deref()
    }

    pub fn relation(&self, n: NodeId) -> Option<&str> {
        self.node(n)?.relation.as_deref()
    }

    pub fn tag(&self, n: NodeId) -> Option<&str> {
        self.node(n)?.tag.as_deref()
    }

    /// Character span of a token; `None` for the root.
    pub fn offset_span(&self, n: NodeId) -> Option<Span> {
        self.node(n)?.span
    }

    /// Governing node, or `None` for the root.
    pub fn parent(&self, n: NodeId) -> Option<NodeId> {
        if n == ROOT {
            return None;
        }
        self.node(n).map(|node| node.head)
    }

    /// Dependents of `n` in id (left-to-right) order.
    pub fn children(&self, n: NodeId) -> Vec<NodeId> {
        let Some(nodes) = self.nodes.as_ref() else {
            return Vec::new();
        };
        nodes
            .iter()
            .skip(1)
            .filter(|node| node.head == n)
            .map(|node| node.id)
            .collect()
    }

    /// `[n, head(n), ..., child-of-root]`; empty for the root.
    pub fn ancestors(&self, n: NodeId) -> Vec<NodeId> {
        let Some(nodes) = self.nodes.as_ref() else {
            return Vec::new();
        };
        let mut chain = Vec::new();
        let mut current = n;
        while current != ROOT {
            let Some(node) = nodes.get(current) else {
                break;
            };
            chain.push(current);
            current = node.head;
        }
        chain
    }

    /// Deepest node dominating both `n1` and `n2`.
    ///
    /// Scans `ancestors(n1)` outermost, so the earliest match along `n1`'s
    /// chain wins. Falls back to the root, which subsumes everything.
    pub fn lowest_common_subsumer(&self, n1: NodeId, n2: NodeId) -> Option<NodeId> {
        let nodes = self.nodes.as_ref()?;
        if n1 >= nodes.len() || n2 >= nodes.len() {
            return None;
        }
        let a1 = self.ancestors(n1);
        let a2 = self.ancestors(n2);
        a1.iter()
            .find(|candidate| a2.contains(*candidate))
            .copied()
            .or(Some(ROOT))
    }

    /// Token heading the character fragment `[start, end]`.
    ///
    /// Returns `None` when no token overlaps the fragment, or when the
    /// subsumer of the overlapping tokens lies outside the fragment.
    pub fn fragment_head(&self, start: usize, end: usize) -> Option<NodeId> {
        let nodes = self.nodes.as_ref()?;
        let overlap: Vec<NodeId> = nodes
            .iter()
            .filter(|node| {
                node.span
                    .is_some_and(|span| span.contains_offset(start) || span.contains_offset(end))
            })
            .map(|node| node.id)
            .collect();

        let (&first, rest) = overlap.split_first()?;
        let head = rest
            .iter()
            .try_fold(first, |head, &t| self.lowest_common_subsumer(head, t))?;
        overlap.contains(&head).then_some(head)
    }

    /// Smallest span covering `n` and all its descendants.
    ///
    /// Relies on children being in surface order: only the first and last
    /// child are visited at each level.
    pub fn subtree_span(&self, n: NodeId) -> Option<Span> {
        let node = self.node(n)?;
        let children = self.children(n);
        let mut span = node.span;

        if let Some(left) = children.first().and_then(|&c| self.subtree_span(c)) {
            span = Some(match span {
                Some(own) => Span::new(own.start.min(left.start), own.end),
                None => left,
            });
        }
        if let Some(right) = children.last().and_then(|&c| self.subtree_span(c)) {
            span = Some(match span {
                Some(own) => Span::new(own.start, own.end.max(right.end)),
                None => right,
            });
        }
        span
    }

    /// Nodes from `n1` upwards, stopping before ancestor `n2`.
    ///
    /// `None` when `n2` is not in `ancestors(n1)`, which includes `n2 == ROOT`.
    pub fn up_path(&self, n1: NodeId, n2: NodeId) -> Option<Vec<NodeId>> {
        if self.is_empty() {
            return None;
        }
        let mut path = self.ancestors(n1);
        let pos = path.iter().position(|&a| a == n2)?;
        path.truncate(pos);
        Some(path)
    }

    /// Nodes from just below ancestor `n1` down to `n2`.
    pub fn down_path(&self, n1: NodeId, n2: NodeId) -> Option<Vec<NodeId>> {
        let mut path = self.up_path(n2, n1)?;
        path.reverse();
        Some(path)
    }

    /// Anything that is not a noun, verb, adjective or adverb.
    pub fn is_stopword(&self, n: NodeId) -> bool {
        match self.node(n) {
            Some(node) => !node
                .tag
                .as_deref()
                .and_then(|tag| tag.chars().next())
                .is_some_and(|first| OPEN_CLASS_MARKERS.contains(&first)),
            None => false,
        }
    }

    /// True if the token lies inside any of `entities` (inclusive bounds).
    pub fn is_entity_member<K, E>(&self, n: NodeId, entities: &IndexMap<K, E>) -> bool
    where
        E: AsRef<Span>,
    {
        let Some(span) = self.offset_span(n) else {
            return false;
        };
        entities
            .values()
            .any(|entity| AsRef::<Span>::as_ref(entity).encloses(&span))
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, n: NodeId, depth: usize) -> fmt::Result {
        if n != ROOT {
            writeln!(
                f,
                "{indent}{rel}({lemma}_{tag})",
                indent = "   ".repeat(depth),
                rel = self.relation(n).unwrap_or("<none>"),
                lemma = self.lemma(n).unwrap_or("<none>"),
                tag = self.tag(n).unwrap_or("<none>"),
            )?;
        }
        for child in self.children(n) {
            self.write_subtree(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Default for DependencyTree {
    fn default() -> Self {
        Self::empty()
    }
}

/// Indented `rel(lemma_tag)` dump, depth first from the root.
impl fmt::Display for DependencyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        self.write_subtree(f, ROOT, 0)
    }
}

/// Ids must be `1..=N` without gaps, heads must exist, chains must reach
/// the root.
fn validate(tokens: &[RawToken]) -> Result<()> {
    let n = tokens.len();
    for (idx, token) in tokens.iter().enumerate() {
        if token.id != idx + 1 {
            return Err(DeptreeError::malformed(format!(
                "expected token id {}, found {}",
                idx + 1,
                token.id
            )));
        }
        if token.head > n {
            return Err(DeptreeError::malformed(format!(
                "token {} points at missing head {}",
                token.id, token.head
            )));
        }
    }

    for token in tokens {
        let mut current = token.id;
        let mut steps = 0usize;
        while current != ROOT {
            current = tokens[current - 1].head;
            steps += 1;
            if steps > n {
                return Err(DeptreeError::malformed(format!(
                    "head chain of token {} never reaches the root",
                    token.id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_gaps_are_rejected() {
        let parse = RawParse::new(vec![
            RawToken::new(1, "a", "a", "DT", "det", 3),
            RawToken::new(3, "b", "b", "NN", "root", 0),
        ]);
        assert!(matches!(
            DependencyTree::from_parse("a b", parse),
            Err(DeptreeError::MalformedGraph(_))
        ));
    }

    #[test]
    fn cycles_are_rejected() {
        let parse = RawParse::new(vec![
            RawToken::new(1, "a", "a", "NN", "dep", 2),
            RawToken::new(2, "b", "b", "NN", "dep", 1),
        ]);
        assert!(matches!(
            DependencyTree::from_parse("a b", parse),
            Err(DeptreeError::MalformedGraph(_))
        ));
    }

    #[test]
    fn dangling_head_is_rejected() {
        let parse = RawParse::new(vec![RawToken::new(1, "a", "a", "NN", "dep", 4)]);
        assert!(DependencyTree::from_parse("a", parse).is_err());
    }

    #[test]
    fn tokens_arrive_in_any_order() {
        let parse = RawParse::new(vec![
            RawToken::new(2, "sleeps", "sleep", "VBZ", "root", 0),
            RawToken::new(1, "Drug", "drug", "NN", "nsubj", 2),
        ]);
        let tree = DependencyTree::from_parse("Drug sleeps", parse).unwrap();
        assert_eq!(tree.offset_span(1), Some(Span::new(0, 3)));
        assert_eq!(tree.offset_span(2), Some(Span::new(5, 10)));
    }
}
