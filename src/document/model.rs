//! Annotated document model: tokens, sentences and dependency graphs

use super::tree::ConstituencyTree;
use serde::{Deserialize, Serialize};

/// A single annotated token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Token text after the annotator's normalization
    pub text: String,
    /// Text exactly as it appeared in the essay
    #[serde(default)]
    pub original_text: String,
    /// Lemma produced by the annotator
    pub lemma: String,
    /// Penn Treebank part-of-speech tag
    pub pos: String,
    /// Position in the sentence (1-indexed)
    pub index: usize,
    /// Position of the owning sentence in the document (0-indexed)
    pub sentence_index: usize,
}

impl Token {
    pub fn new(text: &str, lemma: &str, pos: &str, index: usize, sentence_index: usize) -> Self {
        Self {
            text: text.to_string(),
            original_text: text.to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            index,
            sentence_index,
        }
    }

    pub fn with_original_text(mut self, original: &str) -> Self {
        self.original_text = original.to_string();
        self
    }

    /// Tokens are identified by their document coordinates, not by text
    pub fn same_as(&self, other: &Token) -> bool {
        self.index == other.index && self.sentence_index == other.sentence_index
    }

    /// 0-indexed position, for slicing the sentence token list
    pub fn position(&self) -> usize {
        self.index.saturating_sub(1)
    }
}

/// A typed grammatical relation between two tokens of one sentence.
/// Token references are 0-indexed positions; `governor` is `None` for ROOT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub governor: Option<usize>,
    pub dependent: usize,
    pub relation: String,
}

impl Dependency {
    pub fn new(governor: Option<usize>, dependent: usize, relation: &str) -> Self {
        Self {
            governor,
            dependent,
            relation: relation.to_string(),
        }
    }

    pub fn is(&self, relation: &str) -> bool {
        self.relation == relation
    }
}

/// Edge-list view of a dependency parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    edges: Vec<Dependency>,
}

impl DependencyGraph {
    pub fn new(edges: Vec<Dependency>) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[Dependency] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges whose governor is the token at `position`
    pub fn governed_by(&self, position: usize) -> impl Iterator<Item = &Dependency> {
        self.edges
            .iter()
            .filter(move |d| d.governor == Some(position))
    }

    /// Edges whose dependent is the token at `position`
    pub fn depending_on(&self, position: usize) -> impl Iterator<Item = &Dependency> {
        self.edges.iter().filter(move |d| d.dependent == position)
    }

    /// Edges with exactly this relation label
    pub fn with_relation<'a>(&'a self, relation: &'a str) -> impl Iterator<Item = &'a Dependency> {
        self.edges.iter().filter(move |d| d.relation == relation)
    }

    /// True if any relation label contains `fragment` (e.g. "subj")
    pub fn has_relation_containing(&self, fragment: &str) -> bool {
        self.edges.iter().any(|d| d.relation.contains(fragment))
    }
}

/// One annotated sentence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub tokens: Vec<Token>,
    pub basic_dependencies: DependencyGraph,
    /// Enhanced++ dependencies; analyzers fall back to basic when absent
    #[serde(default)]
    pub enhanced_dependencies: Option<DependencyGraph>,
    pub tree: ConstituencyTree,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>, basic: DependencyGraph, tree: ConstituencyTree) -> Self {
        Self {
            tokens,
            basic_dependencies: basic,
            enhanced_dependencies: None,
            tree,
        }
    }

    pub fn with_enhanced(mut self, enhanced: DependencyGraph) -> Self {
        self.enhanced_dependencies = Some(enhanced);
        self
    }

    pub fn basic(&self) -> &DependencyGraph {
        &self.basic_dependencies
    }

    pub fn enhanced(&self) -> &DependencyGraph {
        self.enhanced_dependencies
            .as_ref()
            .unwrap_or(&self.basic_dependencies)
    }

    pub fn token(&self, position: usize) -> Option<&Token> {
        self.tokens.get(position)
    }

    pub fn pos_at(&self, position: usize) -> Option<&str> {
        self.tokens.get(position).map(|t| t.pos.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Surface text joined by single spaces (for messages)
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Ordered sequence of annotated sentences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }
}
