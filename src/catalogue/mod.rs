//! Read-only corpus resources shared by the analyzers
//!
//! Built-in word lists ship inside the binary; any of them can be replaced by
//! a line-oriented file. A file that cannot be read is logged and the
//! built-in (or, for treebank rules, "no rules") is used instead.

mod sequence;

pub use sequence::{
    is_penn_tag, BadSequence, BadSequenceCatalogue, SequenceElement, SequenceMatch, PENN_TAGS,
};

use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const BUILTIN_CLOSED_CLASS: &str = include_str!("../../resources/closed_class.txt");
const BUILTIN_STOPWORDS: &str = include_str!("../../resources/stopwords.txt");
const BUILTIN_BAD_SEQUENCES: &str = include_str!("../../resources/bad_pos_sequences.txt");

/// Optional replacement files for the built-in catalogues
#[derive(Debug, Clone, Default)]
pub struct CatalogueSources {
    pub closed_class: Option<PathBuf>,
    pub stopwords: Option<PathBuf>,
    /// Legal parent/children category strings, e.g. "S,NP,VP"
    pub treebank_rules: Option<PathBuf>,
    pub bad_sequences: Option<PathBuf>,
}

/// Immutable catalogue bundle handed to every analyzer
#[derive(Debug, Clone)]
pub struct Catalogues {
    closed_class: HashSet<String>,
    stopwords: HashSet<String>,
    treebank_rules: Option<HashSet<String>>,
    bad_sequences: BadSequenceCatalogue,
}

impl Default for Catalogues {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalogues {
    /// Built-in word lists and bad-sequence catalogue; no treebank rules
    pub fn builtin() -> Self {
        Self {
            closed_class: word_set(BUILTIN_CLOSED_CLASS),
            stopwords: word_set(BUILTIN_STOPWORDS),
            treebank_rules: None,
            bad_sequences: BadSequenceCatalogue::from_lines(BUILTIN_BAD_SEQUENCES.lines()),
        }
    }

    /// Entirely empty catalogues, for synthetic test setups
    pub fn empty() -> Self {
        Self {
            closed_class: HashSet::new(),
            stopwords: HashSet::new(),
            treebank_rules: None,
            bad_sequences: BadSequenceCatalogue::default(),
        }
    }

    /// Built-ins overridden by whichever files are configured
    pub fn load(sources: &CatalogueSources) -> Self {
        let mut catalogues = Self::builtin();

        if let Some(text) = sources.closed_class.as_deref().and_then(read_resource) {
            catalogues.closed_class = word_set(&text);
        }
        if let Some(text) = sources.stopwords.as_deref().and_then(read_resource) {
            catalogues.stopwords = word_set(&text);
        }
        if let Some(text) = sources.treebank_rules.as_deref().and_then(read_resource) {
            catalogues.treebank_rules = Some(line_set(&text));
        }
        if let Some(text) = sources.bad_sequences.as_deref().and_then(read_resource) {
            catalogues.bad_sequences = BadSequenceCatalogue::from_lines(text.lines());
        }

        debug!(
            "catalogues: {} closed-class words, {} stopwords, {} treebank rules, {} bad sequences",
            catalogues.closed_class.len(),
            catalogues.stopwords.len(),
            catalogues.treebank_rules.as_ref().map_or(0, HashSet::len),
            catalogues.bad_sequences.len()
        );
        catalogues
    }

    pub fn with_closed_class<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.closed_class = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_treebank_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.treebank_rules = Some(rules.into_iter().map(|r| r.as_ref().to_string()).collect());
        self
    }

    pub fn with_bad_sequences<'a>(mut self, lines: impl IntoIterator<Item = &'a str>) -> Self {
        self.bad_sequences = BadSequenceCatalogue::from_lines(lines);
        self
    }

    pub fn is_closed_class(&self, word: &str) -> bool {
        self.closed_class.contains(&word.to_lowercase())
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// `None` when no treebank rules were loaded
    pub fn treebank_rules(&self) -> Option<&HashSet<String>> {
        self.treebank_rules.as_ref()
    }

    pub fn bad_sequences(&self) -> &BadSequenceCatalogue {
        &self.bad_sequences
    }
}

fn read_resource(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(
                "could not read catalogue {}: {} (using fallback)",
                path.display(),
                e
            );
            None
        }
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

fn line_set(text: &str) -> HashSet<String> {
    text.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
