//! Reader for DDI-style XML corpora: sentences, drug mentions and candidate
//! interaction pairs.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::deptree::Span;

/// Label assigned to pairs that do not interact.
pub const NULL_LABEL: &str = "null";

/// A marked drug mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub span: Span,
    pub kind: String,
    pub text: String,
}

impl AsRef<Span> for Entity {
    fn as_ref(&self) -> &Span {
        &self.span
    }
}

/// Candidate interaction between two entities of the same sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub id: String,
    pub e1: String,
    pub e2: String,
    pub label: String,
}

/// One corpus sentence with its entities (in document order) and pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    pub text: String,
    pub entities: IndexMap<String, Entity>,
    pub pairs: Vec<Pair>,
}

/// Load every `*.xml` file below `dir`, in file-name order.
pub fn load_corpus(dir: &Path) -> Result<Vec<Sentence>> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("xml"))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let mut sentences = Vec::new();
    for path in &files {
        let xml = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
        let parsed = parse_document(&xml).with_context(|| format!("parse {path:?}"))?;
        debug!(path = %path.display(), sentences = parsed.len(), "loaded corpus document");
        sentences.extend(parsed);
    }
    info!(
        files = files.len(),
        sentences = sentences.len(),
        "loaded corpus"
    );
    Ok(sentences)
}

/// Parse a single `<document>` into sentences.
pub fn parse_document(xml: &str) -> Result<Vec<Sentence>> {
    let document: DocumentXml = from_str(xml)?;
    document
        .sentences
        .into_iter()
        .map(SentenceXml::into_sentence)
        .collect()
}

/// Parse `charOffset` values such as `12-20` or `3-9;15-22`. Discontinuous
/// mentions are covered from the first start to the last end.
pub fn parse_char_offset(value: &str) -> Result<Span> {
    static SEGMENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*$").expect("valid regex"));

    let mut bounds = value.split(';').map(|segment| {
        let caps = SEGMENT
            .captures(segment)
            .ok_or_else(|| anyhow!("invalid charOffset segment {segment:?}"))?;
        Ok::<_, anyhow::Error>((caps[1].parse::<usize>()?, caps[2].parse::<usize>()?))
    });

    let (start, mut end) = bounds
        .next()
        .ok_or_else(|| anyhow!("empty charOffset"))??;
    for segment in bounds {
        end = segment?.1;
    }
    if end < start {
        return Err(anyhow!("charOffset {value:?} ends before it starts"));
    }
    Ok(Span::new(start, end))
}

#[derive(Debug, Deserialize)]
struct DocumentXml {
    #[serde(rename = "sentence", default)]
    sentences: Vec<SentenceXml>,
}

#[derive(Debug, Deserialize)]
struct SentenceXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@text", default)]
    text: String,
    #[serde(rename = "entity", default)]
    entities: Vec<EntityXml>,
    #[serde(rename = "pair", default)]
    pairs: Vec<PairXml>,
}

#[derive(Debug, Deserialize)]
struct EntityXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@charOffset")]
    char_offset: String,
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PairXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@e1")]
    e1: String,
    #[serde(rename = "@e2")]
    e2: String,
    #[serde(rename = "@ddi", default)]
    ddi: Option<String>,
    #[serde(rename = "@type", default)]
    kind: Option<String>,
}

impl SentenceXml {
    fn into_sentence(self) -> Result<Sentence> {
        let mut entities = IndexMap::with_capacity(self.entities.len());
        for entity in self.entities {
            let span = parse_char_offset(&entity.char_offset)
                .with_context(|| format!("entity {}", entity.id))?;
            entities.insert(
                entity.id.clone(),
                Entity {
                    id: entity.id,
                    span,
                    kind: entity.kind,
                    text: entity.text,
                },
            );
        }
        let pairs = self.pairs.into_iter().map(PairXml::into_pair).collect();
        Ok(Sentence {
            id: self.id,
            text: self.text,
            entities,
            pairs,
        })
    }
}

impl PairXml {
    fn into_pair(self) -> Pair {
        let interacts = self.ddi.as_deref() == Some("true");
        let label = match self.kind {
            Some(kind) if interacts && !kind.is_empty() => kind,
            _ => NULL_LABEL.to_string(),
        };
        Pair {
            id: self.id,
            e1: self.e1,
            e2: self.e2,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document id="DDI-DrugBank.d1">
  <sentence id="DDI-DrugBank.d1.s0" text="Aspirin increases the effect of Warfarin.">
    <entity id="DDI-DrugBank.d1.s0.e0" charOffset="0-6" type="drug" text="Aspirin"/>
    <entity id="DDI-DrugBank.d1.s0.e1" charOffset="32-39" type="drug" text="Warfarin"/>
    <pair id="DDI-DrugBank.d1.s0.p0" e1="DDI-DrugBank.d1.s0.e0" e2="DDI-DrugBank.d1.s0.e1" ddi="true" type="effect"/>
  </sentence>
  <sentence id="DDI-DrugBank.d1.s1" text="No interactions &amp; no pairs.">
  </sentence>
</document>"#;

    #[test]
    fn parses_sentences_entities_and_pairs() {
        let sentences = parse_document(DOC).unwrap();
        assert_eq!(sentences.len(), 2);
        let first = &sentences[0];
        assert_eq!(first.entities.len(), 2);
        assert_eq!(first.entities["DDI-DrugBank.d1.s0.e1"].span, Span::new(32, 39));
        assert_eq!(first.pairs[0].label, "effect");
        assert_eq!(sentences[1].text, "No interactions & no pairs.");
        assert!(sentences[1].pairs.is_empty());
    }

    #[test]
    fn non_interacting_pairs_get_null_label() {
        let pair = PairXml {
            id: "p".into(),
            e1: "a".into(),
            e2: "b".into(),
            ddi: Some("false".into()),
            kind: None,
        };
        assert_eq!(pair.into_pair().label, NULL_LABEL);
    }

    #[test]
    fn discontinuous_offsets_cover_all_segments() {
        assert_eq!(parse_char_offset("3-9;15-22").unwrap(), Span::new(3, 22));
        assert_eq!(parse_char_offset("0-6").unwrap(), Span::new(0, 6));
        assert!(parse_char_offset("x-1").is_err());
        assert!(parse_char_offset("9-3").is_err());
    }
}
