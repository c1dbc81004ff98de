//! Essay loading from CoreNLP JSON output
//!
//! Accepts the document the CoreNLP server emits for the `tokenize, ssplit,
//! pos, lemma, parse` annotators, optionally wrapped with essay metadata:
//!
//! ```json
//! { "id": "990384.txt", "topic": "...", "expectedGrade": "high",
//!   "sentences": [ { "tokens": [...], "basicDependencies": [...],
//!                    "enhancedPlusPlusDependencies": [...], "parse": "(ROOT ...)" } ] }
//! ```

use super::{ConstituencyTree, Dependency, DependencyGraph, Document, DocumentError, Sentence, Token};
use crate::Grade;
use log::warn;
use serde::Deserialize;

/// One essay ready for grading
#[derive(Debug, Clone)]
pub struct Essay {
    /// Identifier (usually the source file name)
    pub id: String,
    /// Topic prompt, possibly prefixed by a tab-delimited label
    pub topic: Option<String>,
    /// Annotated topic prompt, when the annotator processed it too
    pub topic_document: Option<Document>,
    /// Reference grade for evaluation runs
    pub expected_grade: Option<Grade>,
    pub document: Document,
}

impl Essay {
    pub fn new(id: &str, document: Document) -> Self {
        Self {
            id: id.to_string(),
            topic: None,
            topic_document: None,
            expected_grade: None,
            document,
        }
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = Some(topic.to_string());
        self
    }

    pub fn with_topic_document(mut self, topic: Document) -> Self {
        self.topic_document = Some(topic);
        self
    }

    pub fn with_expected_grade(mut self, grade: Grade) -> Self {
        self.expected_grade = Some(grade);
        self
    }

    /// Parse an essay from CoreNLP JSON. `fallback_id` is used when the
    /// JSON carries no `id`.
    pub fn from_json(json: &str, fallback_id: &str) -> Result<Self, DocumentError> {
        let raw: RawEssay = serde_json::from_str(json)?;
        let document = raw.document.into_document()?;
        let topic_document = raw
            .topic_annotation
            .map(RawDocument::into_document)
            .transpose()?;
        Ok(Self {
            id: raw.id.unwrap_or_else(|| fallback_id.to_string()),
            topic: raw.topic,
            topic_document,
            expected_grade: raw.expected_grade,
            document,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEssay {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    expected_grade: Option<Grade>,
    #[serde(default)]
    topic_annotation: Option<RawDocument>,
    #[serde(flatten)]
    document: RawDocument,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    sentences: Vec<RawSentence>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSentence {
    #[serde(default)]
    tokens: Vec<RawToken>,
    #[serde(default)]
    basic_dependencies: Vec<RawDependency>,
    #[serde(default)]
    enhanced_plus_plus_dependencies: Option<Vec<RawDependency>>,
    #[serde(default)]
    parse: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawToken {
    index: usize,
    word: String,
    #[serde(default)]
    original_text: Option<String>,
    #[serde(default)]
    lemma: Option<String>,
    #[serde(default)]
    pos: String,
}

#[derive(Deserialize)]
struct RawDependency {
    dep: String,
    governor: usize,
    dependent: usize,
}

impl RawDocument {
    fn into_document(self) -> Result<Document, DocumentError> {
        let sentences = self
            .sentences
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.into_sentence(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Document::new(sentences))
    }
}

impl RawSentence {
    fn into_sentence(self, sentence_index: usize) -> Result<Sentence, DocumentError> {
        let len = self.tokens.len();
        let tokens: Vec<Token> = self
            .tokens
            .into_iter()
            .enumerate()
            .map(|(position, t)| {
                // dependencies address tokens by position, so the index must agree
                if t.index != position + 1 {
                    warn!(
                        "sentence {}: token '{}' has index {}, renumbered to {}",
                        sentence_index + 1,
                        t.word,
                        t.index,
                        position + 1
                    );
                }
                let lemma = t.lemma.unwrap_or_else(|| t.word.clone());
                let original_text = t.original_text.unwrap_or_else(|| t.word.clone());
                Token {
                    text: t.word,
                    original_text,
                    lemma,
                    pos: t.pos,
                    index: position + 1,
                    sentence_index,
                }
            })
            .collect();

        let basic = convert_edges(self.basic_dependencies, sentence_index, len)?;
        let enhanced = self
            .enhanced_plus_plus_dependencies
            .map(|edges| convert_edges(edges, sentence_index, len))
            .transpose()?;

        let tree = match self.parse {
            Some(p) if !p.trim().is_empty() => ConstituencyTree::parse(&p)?,
            _ => ConstituencyTree::default(),
        };
        let leaves = tree.leaves(tree.root()).len();
        if leaves != 0 && leaves != len {
            warn!(
                "sentence {}: parse tree has {} leaves but {} tokens",
                sentence_index + 1,
                leaves,
                len
            );
        }

        let mut sentence = Sentence::new(tokens, basic, tree);
        if let Some(enhanced) = enhanced {
            sentence = sentence.with_enhanced(enhanced);
        }
        Ok(sentence)
    }
}

/// CoreNLP indices are 1-based with 0 meaning ROOT
fn convert_edges(
    edges: Vec<RawDependency>,
    sentence: usize,
    len: usize,
) -> Result<DependencyGraph, DocumentError> {
    let check = |index: usize| {
        if index == 0 || index > len {
            Err(DocumentError::TokenOutOfRange {
                sentence: sentence + 1,
                index,
                len,
            })
        } else {
            Ok(index - 1)
        }
    };

    let mut out = Vec::with_capacity(edges.len());
    for edge in edges {
        let governor = if edge.governor == 0 {
            None
        } else {
            Some(check(edge.governor)?)
        };
        let dependent = check(edge.dependent)?;
        out.push(Dependency {
            governor,
            dependent,
            relation: edge.dep,
        });
    }
    Ok(DependencyGraph::new(out))
}
