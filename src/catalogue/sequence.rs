//! Bad POS/lexical sequence patterns

use crate::document::Sentence;

/// Penn Treebank word-level tags. Pattern elements outside this set match words.
pub const PENN_TAGS: &[&str] = &[
    "CC", "CD", "DT", "EX", "FW", "IN", "JJ", "JJR", "JJS", "LS", "MD", "NN", "NNS", "NNP",
    "NNPS", "PDT", "POS", "PRP", "PRP$", "RB", "RBR", "RBS", "RP", "SYM", "TO", "UH", "VB",
    "VBD", "VBG", "VBN", "VBP", "VBZ", "WDT", "WP", "WP$", "WRB",
];

pub fn is_penn_tag(s: &str) -> bool {
    PENN_TAGS.contains(&s)
}

/// One element of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceElement {
    /// Matches a token by POS tag
    Tag(String),
    /// Matches a token by upper-cased surface word
    Word(String),
}

impl SequenceElement {
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        if is_penn_tag(&upper) {
            SequenceElement::Tag(upper)
        } else {
            SequenceElement::Word(upper)
        }
    }

    fn matches(&self, word: &str, pos: &str) -> bool {
        match self {
            SequenceElement::Tag(t) => t == pos,
            SequenceElement::Word(w) => w == word,
        }
    }
}

/// A contiguous run of elements that signals a malformed verb group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadSequence {
    /// The pattern as written in the catalogue ("MD,VB,VBD")
    pub pattern: String,
    pub elements: Vec<SequenceElement>,
}

impl BadSequence {
    /// Parse a comma-joined line; `None` for blank lines
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let elements: Vec<SequenceElement> = line
            .split(',')
            .filter(|e| !e.trim().is_empty())
            .map(SequenceElement::parse)
            .collect();
        if elements.is_empty() {
            return None;
        }
        Some(Self {
            pattern: line.to_string(),
            elements,
        })
    }

    /// 0-indexed start of the first occurrence in a (WORD, POS) sequence
    pub fn find_in(&self, words: &[(String, String)]) -> Option<usize> {
        let n = self.elements.len();
        if n == 0 || n > words.len() {
            return None;
        }
        words.windows(n).position(|window| {
            window
                .iter()
                .zip(&self.elements)
                .all(|((w, p), e)| e.matches(w, p))
        })
    }
}

/// Ordered catalogue of bad sequences. Duplicate entries count separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadSequenceCatalogue {
    entries: Vec<BadSequence>,
}

/// One catalogue entry found in a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceMatch<'a> {
    pub sequence: &'a BadSequence,
    /// 0-indexed token position where the match starts
    pub start: usize,
}

impl BadSequenceCatalogue {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: lines.into_iter().filter_map(BadSequence::parse).collect(),
        }
    }

    pub fn entries(&self) -> &[BadSequence] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every catalogue entry occurring in the sentence (at most one match per entry)
    pub fn matches<'a>(&'a self, sentence: &Sentence) -> Vec<SequenceMatch<'a>> {
        let words: Vec<(String, String)> = sentence
            .tokens
            .iter()
            .map(|t| (t.text.to_uppercase(), t.pos.to_uppercase()))
            .collect();
        self.entries
            .iter()
            .filter_map(|sequence| {
                sequence
                    .find_in(&words)
                    .map(|start| SequenceMatch { sequence, start })
            })
            .collect()
    }
}
