//! Programmatic sentence construction (tests, embedding callers)

use super::{ConstituencyTree, Dependency, DependencyGraph, DocumentError, Sentence, Token};

/// Builds a [`Sentence`] from tagged words, 1-based dependency triples and
/// an optional bracketed parse.
///
/// ```
/// use lexigrade::document::SentenceBuilder;
///
/// let sentence = SentenceBuilder::new(0)
///     .tagged("The/DT dogs/NNS run/VBP ./.")
///     .dep(3, 2, "nsubj")
///     .dep(2, 1, "det")
///     .build()
///     .unwrap();
/// assert_eq!(sentence.tokens.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceBuilder {
    sentence_index: usize,
    tokens: Vec<Token>,
    basic: Vec<(usize, usize, String)>,
    enhanced: Option<Vec<(usize, usize, String)>>,
    parse: Option<String>,
}

impl SentenceBuilder {
    pub fn new(sentence_index: usize) -> Self {
        Self {
            sentence_index,
            tokens: Vec::new(),
            basic: Vec::new(),
            enhanced: None,
            parse: None,
        }
    }

    /// Append one token
    pub fn token(mut self, text: &str, lemma: &str, pos: &str) -> Self {
        let index = self.tokens.len() + 1;
        self.tokens
            .push(Token::new(text, lemma, pos, index, self.sentence_index));
        self
    }

    /// Append whitespace-separated `word/TAG` pairs; lemma is the lower-cased word
    pub fn tagged(mut self, words: &str) -> Self {
        for pair in words.split_whitespace() {
            let (word, tag) = pair.rsplit_once('/').unwrap_or((pair, ""));
            let lemma = word.to_lowercase();
            self = self.token(word, &lemma, tag);
        }
        self
    }

    /// Basic dependency; indices are 1-based, governor 0 is ROOT
    pub fn dep(mut self, governor: usize, dependent: usize, relation: &str) -> Self {
        self.basic.push((governor, dependent, relation.to_string()));
        self
    }

    /// Enhanced dependency; once any is given the enhanced graph is distinct from basic
    pub fn enhanced_dep(mut self, governor: usize, dependent: usize, relation: &str) -> Self {
        self.enhanced
            .get_or_insert_with(Vec::new)
            .push((governor, dependent, relation.to_string()));
        self
    }

    pub fn parse(mut self, bracketed: &str) -> Self {
        self.parse = Some(bracketed.to_string());
        self
    }

    pub fn build(self) -> Result<Sentence, DocumentError> {
        let len = self.tokens.len();
        let sentence = self.sentence_index + 1;
        let convert = |edges: Vec<(usize, usize, String)>| -> Result<DependencyGraph, DocumentError> {
            edges
                .into_iter()
                .map(|(g, d, rel)| {
                    if d == 0 || d > len {
                        return Err(DocumentError::TokenOutOfRange { sentence, index: d, len });
                    }
                    if g > len {
                        return Err(DocumentError::TokenOutOfRange { sentence, index: g, len });
                    }
                    Ok(Dependency::new(g.checked_sub(1), d - 1, &rel))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(DependencyGraph::new)
        };

        let basic = convert(self.basic)?;
        let enhanced = self.enhanced.map(convert).transpose()?;
        let tree = match self.parse {
            Some(p) => ConstituencyTree::parse(&p)?,
            None => ConstituencyTree::default(),
        };

        let mut out = Sentence::new(self.tokens, basic, tree);
        if let Some(enhanced) = enhanced {
            out = out.with_enhanced(enhanced);
        }
        Ok(out)
    }
}
