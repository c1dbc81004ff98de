//! Lexical database access (WordNet-style)
//!
//! Analyzers only see the [`Lexicon`] trait. Two backends exist: an in-memory
//! taxonomy for tests and embedding callers, and a reader for WordNet 3.x
//! database files.

mod memory;
mod wordnet;

pub use memory::MemoryLexicon;
pub use wordnet::WordNetLexicon;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Errors raised while opening or reading a lexical database
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("WordNet file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}:{line}: {reason}")]
    Malformed {
        file: String,
        line: usize,
        reason: String,
    },
}

/// Open word classes a lexicon indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl WordClass {
    pub const ALL: [WordClass; 4] = [
        WordClass::Noun,
        WordClass::Verb,
        WordClass::Adjective,
        WordClass::Adverb,
    ];

    /// WordNet part-of-speech letter; satellite adjectives ("s") fold into adjectives
    pub fn from_letter(c: &str) -> Option<Self> {
        match c {
            "n" => Some(WordClass::Noun),
            "v" => Some(WordClass::Verb),
            "a" | "s" => Some(WordClass::Adjective),
            "r" => Some(WordClass::Adverb),
            _ => None,
        }
    }

    /// Database file suffix (`index.noun`, `data.verb`, ...)
    pub fn file_suffix(&self) -> &'static str {
        match self {
            WordClass::Noun => "noun",
            WordClass::Verb => "verb",
            WordClass::Adjective => "adj",
            WordClass::Adverb => "adv",
        }
    }
}

/// Synset identity: word class plus database offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SynsetId {
    pub class: WordClass,
    pub offset: u32,
}

impl SynsetId {
    pub fn noun(offset: u32) -> Self {
        Self {
            class: WordClass::Noun,
            offset,
        }
    }
}

impl std::fmt::Display for SynsetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08}-{}", self.offset, self.class.file_suffix())
    }
}

/// Typed relation between synsets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Hypernym,
    HypernymInstance,
    Hyponym,
    HyponymInstance,
    /// Domain of synset, topic (`;c`)
    Topic,
    /// Member of this topic domain (`-c`)
    TopicMember,
    Region,
    RegionMember,
    Usage,
    UsageMember,
    MeronymMember,
    MeronymSubstance,
    MeronymPart,
    HolonymMember,
    HolonymSubstance,
    HolonymPart,
    Antonym,
    Attribute,
    DerivedForm,
    Entailment,
    Cause,
    AlsoSee,
    SimilarTo,
    VerbGroup,
    Participle,
    Pertainym,
    Other(String),
}

impl PointerKind {
    /// Parse a WordNet pointer symbol
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "@" => PointerKind::Hypernym,
            "@i" => PointerKind::HypernymInstance,
            "~" => PointerKind::Hyponym,
            "~i" => PointerKind::HyponymInstance,
            ";c" => PointerKind::Topic,
            "-c" => PointerKind::TopicMember,
            ";r" => PointerKind::Region,
            "-r" => PointerKind::RegionMember,
            ";u" => PointerKind::Usage,
            "-u" => PointerKind::UsageMember,
            "%m" => PointerKind::MeronymMember,
            "%s" => PointerKind::MeronymSubstance,
            "%p" => PointerKind::MeronymPart,
            "#m" => PointerKind::HolonymMember,
            "#s" => PointerKind::HolonymSubstance,
            "#p" => PointerKind::HolonymPart,
            "!" => PointerKind::Antonym,
            "=" => PointerKind::Attribute,
            "+" => PointerKind::DerivedForm,
            "*" => PointerKind::Entailment,
            ">" => PointerKind::Cause,
            "^" => PointerKind::AlsoSee,
            "&" => PointerKind::SimilarTo,
            "$" => PointerKind::VerbGroup,
            "<" => PointerKind::Participle,
            "\\" => PointerKind::Pertainym,
            other => PointerKind::Other(other.to_string()),
        }
    }

    /// Hypernym links followed when building taxonomy chains
    pub fn is_hypernym(&self) -> bool {
        matches!(self, PointerKind::Hypernym | PointerKind::HypernymInstance)
    }
}

/// A lexical sense unit with its outgoing pointers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synset {
    pub id: SynsetId,
    pub words: Vec<String>,
    pub pointers: Vec<(PointerKind, SynsetId)>,
    pub gloss: String,
}

impl Synset {
    pub fn new(id: SynsetId) -> Self {
        Self {
            id,
            words: Vec::new(),
            pointers: Vec::new(),
            gloss: String::new(),
        }
    }

    /// Targets of one pointer kind, in database order
    pub fn related(&self, kind: &PointerKind) -> Vec<SynsetId> {
        self.pointers
            .iter()
            .filter(|(k, _)| k == kind)
            .map(|(_, id)| *id)
            .collect()
    }

    /// Hypernym and instance-hypernym parents
    pub fn hypernyms(&self) -> Vec<SynsetId> {
        self.pointers
            .iter()
            .filter(|(k, _)| k.is_hypernym())
            .map(|(_, id)| *id)
            .collect()
    }
}

/// Index entry for one lemma in one word class; senses are in frequency order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub lemma: String,
    pub class: WordClass,
    pub senses: Vec<SynsetId>,
}

impl IndexEntry {
    pub fn first_sense(&self) -> Option<SynsetId> {
        self.senses.first().copied()
    }
}

/// Lexical database collaborator.
///
/// `open`/`close` are reference counted: the database stays open until every
/// `open` has been matched by a `close`. Lookups on a closed lexicon return
/// `None`.
pub trait Lexicon: Send + Sync {
    fn open(&self) -> Result<(), LexiconError>;

    fn close(&self);

    fn is_open(&self) -> bool;

    /// Index entry for a lemma; spaces and case are normalized by the backend
    fn lookup(&self, lemma: &str, class: WordClass) -> Option<IndexEntry>;

    fn synset(&self, id: SynsetId) -> Option<Synset>;

    /// True if the lemma is indexed under any word class
    fn knows(&self, lemma: &str) -> bool {
        WordClass::ALL
            .iter()
            .any(|&class| self.lookup(lemma, class).is_some())
    }
}

/// Scoped acquisition: opens on creation, closes on drop
pub struct LexiconSession<'a> {
    lexicon: &'a dyn Lexicon,
}

impl<'a> LexiconSession<'a> {
    pub fn open(lexicon: &'a dyn Lexicon) -> Result<Self, LexiconError> {
        lexicon.open()?;
        Ok(Self { lexicon })
    }

    pub fn lexicon(&self) -> &'a dyn Lexicon {
        self.lexicon
    }
}

impl Drop for LexiconSession<'_> {
    fn drop(&mut self) {
        self.lexicon.close();
    }
}

/// Open/close reference count shared by the backends
#[derive(Debug, Default)]
pub(crate) struct OpenCount(AtomicUsize);

impl OpenCount {
    pub(crate) fn acquire(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn release(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub(crate) fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

/// Lexicon key normalization: lower case, spaces become underscores
pub(crate) fn normalize_lemma(lemma: &str) -> String {
    lemma.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_symbols() {
        assert_eq!(PointerKind::from_symbol("@"), PointerKind::Hypernym);
        assert_eq!(PointerKind::from_symbol("@i"), PointerKind::HypernymInstance);
        assert_eq!(PointerKind::from_symbol(";c"), PointerKind::Topic);
        assert_eq!(PointerKind::from_symbol("%p"), PointerKind::MeronymPart);
        assert_eq!(
            PointerKind::from_symbol("?x"),
            PointerKind::Other("?x".to_string())
        );
        assert!(PointerKind::HypernymInstance.is_hypernym());
        assert!(!PointerKind::Topic.is_hypernym());
    }

    #[test]
    fn test_synset_related() {
        let mut s = Synset::new(SynsetId::noun(10));
        s.pointers.push((PointerKind::Hypernym, SynsetId::noun(1)));
        s.pointers.push((PointerKind::HypernymInstance, SynsetId::noun(2)));
        s.pointers.push((PointerKind::Topic, SynsetId::noun(3)));
        assert_eq!(s.hypernyms(), vec![SynsetId::noun(1), SynsetId::noun(2)]);
        assert_eq!(s.related(&PointerKind::Topic), vec![SynsetId::noun(3)]);
    }

    #[test]
    fn test_session_closes_on_drop() {
        let lex = MemoryLexicon::new().with_synset(1, &["entity"], &[]);
        assert!(!lex.is_open());
        {
            let outer = LexiconSession::open(&lex).unwrap();
            {
                let _inner = LexiconSession::open(outer.lexicon()).unwrap();
                assert!(lex.is_open());
            }
            assert!(lex.is_open());
        }
        assert!(!lex.is_open());
        lex.close();
        assert!(!lex.is_open());
    }

    #[test]
    fn test_normalize_lemma() {
        assert_eq!(normalize_lemma(" Ice Cream "), "ice_cream");
    }
}
