//! Parser adapter: turns sentence text into a labeled dependency graph.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use urlencoding::encode;

use super::{
    error::{DeptreeError, Result},
    node::{NodeId, RawParse, RawToken},
};

const CORENLP_PROPERTIES: &str = r#"{"annotators":"tokenize,ssplit,pos,lemma,depparse","outputFormat":"json","ssplit.eolonly":"true"}"#;

/// Anything able to produce a single dependency parse for one sentence.
///
/// Implementations must hold no per-call mutable state so that independent
/// sentences can be parsed concurrently.
#[async_trait]
pub trait DependencyParser: Send + Sync {
    /// Parse already-sanitized text into exactly one graph.
    async fn parse(&self, sanitized: &str) -> Result<RawParse>;
}

/// Space out characters the parser would otherwise glue onto neighbouring
/// tokens. Alignment still runs against the unsanitized text.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '/' => out.push_str(" / "),
            '-' => out.push_str(" - "),
            '.' => out.push_str(". "),
            '\'' => out.push_str(" ' "),
            other => out.push(other),
        }
    }
    out
}

/// HTTP client for a Stanford CoreNLP server.
#[derive(Debug, Clone)]
pub struct CoreNlpClient {
    client: Client,
    base_url: String,
}

impl CoreNlpClient {
    /// Build a client for the server at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("ddi-extractor/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DependencyParser for CoreNlpClient {
    #[instrument(skip(self), level = "debug")]
    async fn parse(&self, sanitized: &str) -> Result<RawParse> {
        let url = format!(
            "{base}/?properties={props}",
            base = self.base_url,
            props = encode(CORENLP_PROPERTIES)
        );
        let resp = self
            .client
            .post(url)
            .body(sanitized.to_string())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DeptreeError::parse(format!("parser answered HTTP {status}")));
        }
        let body = resp.text().await?;
        let annotation: CoreNlpAnnotation = serde_json::from_str(&body)
            .map_err(|err| DeptreeError::parse(format!("malformed parser payload: {err}")))?;
        let parse = annotation.into_single_parse()?;
        debug!(tokens = parse.tokens.len(), "received dependency parse");
        Ok(parse)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoreNlpAnnotation {
    #[serde(default)]
    sentences: Vec<CoreNlpSentence>,
}

#[derive(Debug, Deserialize)]
struct CoreNlpSentence {
    #[serde(rename = "basicDependencies", default)]
    dependencies: Vec<CoreNlpDependency>,
    #[serde(default)]
    tokens: Vec<CoreNlpToken>,
}

#[derive(Debug, Deserialize)]
struct CoreNlpDependency {
    dep: Option<String>,
    governor: NodeId,
    dependent: NodeId,
}

#[derive(Debug, Deserialize)]
struct CoreNlpToken {
    index: NodeId,
    word: Option<String>,
    lemma: Option<String>,
    pos: Option<String>,
}

impl CoreNlpAnnotation {
    pub(crate) fn into_single_parse(self) -> Result<RawParse> {
        let mut sentences = self.sentences;
        if sentences.len() != 1 {
            return Err(DeptreeError::parse(format!(
                "expected exactly one parsed sentence, got {}",
                sentences.len()
            )));
        }
        let Some(sentence) = sentences.pop() else {
            return Err(DeptreeError::parse("parser returned no sentence"));
        };
        if sentence.tokens.is_empty() {
            return Err(DeptreeError::parse("parser returned an empty sentence"));
        }

        let mut tokens = Vec::with_capacity(sentence.tokens.len());
        for token in sentence.tokens {
            let Some(arc) = sentence
                .dependencies
                .iter()
                .find(|d| d.dependent == token.index)
            else {
                return Err(DeptreeError::parse(format!(
                    "token {} has no governing arc",
                    token.index
                )));
            };
            tokens.push(RawToken {
                id: token.index,
                word: token.word,
                lemma: token.lemma,
                tag: token.pos,
                relation: arc.dep.clone(),
                head: arc.governor,
            });
        }
        Ok(RawParse::new(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_spaces_out_separators() {
        assert_eq!(sanitize("5-HT/NE"), "5 - HT / NE");
        assert_eq!(sanitize("Ca."), "Ca. ");
        assert_eq!(sanitize("patient's"), "patient ' s");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            CoreNlpClient::new("http://localhost:9000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn corenlp_payload_converts_to_raw_parse() {
        let payload = r#"{
            "sentences": [{
                "index": 0,
                "basicDependencies": [
                    {"dep": "ROOT", "governor": 0, "governorGloss": "ROOT", "dependent": 2, "dependentGloss": "inhibits"},
                    {"dep": "nsubj", "governor": 2, "governorGloss": "inhibits", "dependent": 1, "dependentGloss": "Ketoconazole"},
                    {"dep": "obj", "governor": 2, "governorGloss": "inhibits", "dependent": 3, "dependentGloss": "CYP3A4"}
                ],
                "tokens": [
                    {"index": 1, "word": "Ketoconazole", "originalText": "Ketoconazole", "lemma": "ketoconazole", "pos": "NN"},
                    {"index": 2, "word": "inhibits", "originalText": "inhibits", "lemma": "inhibit", "pos": "VBZ"},
                    {"index": 3, "word": "CYP3A4", "originalText": "CYP3A4", "lemma": "CYP3A4", "pos": "NN"}
                ]
            }]
        }"#;
        let annotation: CoreNlpAnnotation = serde_json::from_str(payload).unwrap();
        let parse = annotation.into_single_parse().unwrap();
        assert_eq!(parse.tokens.len(), 3);
        assert_eq!(parse.tokens[0].head, 2);
        assert_eq!(parse.tokens[0].relation.as_deref(), Some("nsubj"));
        assert_eq!(parse.tokens[1].head, 0);
        assert_eq!(parse.tokens[1].relation.as_deref(), Some("ROOT"));
        assert_eq!(parse.tokens[2].tag.as_deref(), Some("NN"));
    }

    #[test]
    fn multiple_sentences_are_a_parse_failure() {
        let payload = r#"{"sentences": [{"tokens": [], "basicDependencies": []}, {"tokens": [], "basicDependencies": []}]}"#;
        let annotation: CoreNlpAnnotation = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            annotation.into_single_parse(),
            Err(DeptreeError::ParseFailure(_))
        ));
    }

    #[test]
    fn zero_sentences_are_a_parse_failure() {
        let annotation: CoreNlpAnnotation = serde_json::from_str("{}").unwrap();
        assert!(annotation.into_single_parse().is_err());
    }
}
