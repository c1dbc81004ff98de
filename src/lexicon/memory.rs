//! In-memory lexicon for synthetic taxonomies

use super::{normalize_lemma, IndexEntry, Lexicon, LexiconError, OpenCount, PointerKind, Synset, SynsetId, WordClass};
use std::collections::HashMap;

/// Builder-style lexicon held entirely in memory.
///
/// ```
/// use lexigrade::lexicon::{Lexicon, LexiconSession, MemoryLexicon, WordClass};
///
/// let lex = MemoryLexicon::new()
///     .with_synset(1, &["entity"], &[])
///     .with_synset(2, &["animal"], &[1])
///     .with_synset(3, &["dog"], &[2]);
/// let session = LexiconSession::open(&lex).unwrap();
/// let dog = session.lexicon().lookup("dog", WordClass::Noun).unwrap();
/// assert_eq!(dog.first_sense().unwrap().offset, 3);
/// ```
#[derive(Debug, Default)]
pub struct MemoryLexicon {
    entries: HashMap<(WordClass, String), Vec<SynsetId>>,
    synsets: HashMap<SynsetId, Synset>,
    opened: OpenCount,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a noun synset; each word gets this synset as its next sense
    pub fn with_synset(mut self, offset: u32, words: &[&str], hypernyms: &[u32]) -> Self {
        let id = SynsetId::noun(offset);
        let synset = self.synsets.entry(id).or_insert_with(|| Synset::new(id));
        for word in words {
            synset.words.push(word.to_string());
        }
        for &parent in hypernyms {
            synset
                .pointers
                .push((PointerKind::Hypernym, SynsetId::noun(parent)));
        }
        for word in words {
            self.entries
                .entry((WordClass::Noun, normalize_lemma(word)))
                .or_default()
                .push(id);
        }
        self
    }

    /// Add an arbitrary pointer between two noun synsets
    pub fn pointer(mut self, from: u32, kind: PointerKind, to: u32) -> Self {
        let id = SynsetId::noun(from);
        self.synsets
            .entry(id)
            .or_insert_with(|| Synset::new(id))
            .pointers
            .push((kind, SynsetId::noun(to)));
        self
    }

    /// Index a lemma without senses (enough for spelling lookups)
    pub fn word(mut self, lemma: &str, class: WordClass) -> Self {
        self.entries
            .entry((class, normalize_lemma(lemma)))
            .or_default();
        self
    }
}

impl Lexicon for MemoryLexicon {
    fn open(&self) -> Result<(), LexiconError> {
        self.opened.acquire();
        Ok(())
    }

    fn close(&self) {
        self.opened.release();
    }

    fn is_open(&self) -> bool {
        self.opened.is_open()
    }

    fn lookup(&self, lemma: &str, class: WordClass) -> Option<IndexEntry> {
        if !self.is_open() {
            return None;
        }
        let key = normalize_lemma(lemma);
        self.entries
            .get(&(class, key.clone()))
            .map(|senses| IndexEntry {
                lemma: key,
                class,
                senses: senses.clone(),
            })
    }

    fn synset(&self, id: SynsetId) -> Option<Synset> {
        if !self.is_open() {
            return None;
        }
        self.synsets.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_lexicon_answers_nothing() {
        let lex = MemoryLexicon::new().with_synset(1, &["dog"], &[]);
        assert!(lex.lookup("dog", WordClass::Noun).is_none());
        lex.open().unwrap();
        assert!(lex.lookup("Dog", WordClass::Noun).is_some());
        lex.close();
    }

    #[test]
    fn test_senses_follow_insertion_order() {
        let lex = MemoryLexicon::new()
            .with_synset(5, &["bank"], &[])
            .with_synset(9, &["bank", "depository"], &[]);
        lex.open().unwrap();
        let entry = lex.lookup("bank", WordClass::Noun).unwrap();
        assert_eq!(entry.senses, vec![SynsetId::noun(5), SynsetId::noun(9)]);
        assert_eq!(lex.synset(SynsetId::noun(9)).unwrap().words.len(), 2);
        lex.close();
    }

    #[test]
    fn test_plain_words_for_spelling() {
        let lex = MemoryLexicon::new().word("quickly", WordClass::Adverb);
        lex.open().unwrap();
        assert!(lex.knows("quickly"));
        assert!(!lex.knows("qwikly"));
        let entry = lex.lookup("quickly", WordClass::Adverb).unwrap();
        assert!(entry.first_sense().is_none());
        lex.close();
    }
}
