//! Annotated essay documents
//!
//! The annotation pipeline (tokenizer, tagger, lemmatizer, parsers) runs
//! outside this crate; this module holds its output in an owned,
//! index-addressed form that every analyzer can share immutably.

mod builder;
mod corenlp;
mod model;
mod tree;

pub use builder::SentenceBuilder;
pub use corenlp::Essay;
pub use model::{Dependency, DependencyGraph, Document, Sentence, Token};
pub use tree::{base_label, ConstituencyTree, NodeId};

use thiserror::Error;

/// Errors raised while building documents from annotator output
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unbalanced parentheses in constituency tree near lexeme {0}")]
    UnbalancedTree(usize),

    #[error("constituency tree is empty")]
    EmptyTree,

    #[error("constituency tree has more than one root")]
    MultipleRoots,

    #[error("leaf '{0}' appears outside any constituent")]
    StrayLeaf(String),

    #[error("sentence {sentence}: dependency references token {index}, but the sentence has {len} tokens")]
    TokenOutOfRange {
        sentence: usize,
        index: usize,
        len: usize,
    },

    #[error("invalid essay JSON: {0}")]
    Json(#[from] serde_json::Error),
}
