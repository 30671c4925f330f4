//! Dependency-tree utility: parse a sentence, align tokens to character
//! offsets, and answer structural queries used by feature extraction.

pub mod align;
pub mod error;
pub mod node;
pub mod parser;
pub mod tree;

pub use error::{DeptreeError, Result};
pub use node::{DependencyNode, NodeId, RawParse, RawToken, Span, ROOT};
pub use parser::{sanitize, CoreNlpClient, DependencyParser};
pub use tree::DependencyTree;
