//! Topic relevance through WordNet hypernym chains
//!
//! Every noun is expanded into the root-to-sense hypernym chains of its
//! first sense. Document nouns are scored against the topic nouns by how deep
//! their chains meet, and the essay gets the trimmed mean of those scores.

use super::{EssayContext, FeatureReport, FeatureRule};
use crate::catalogue::Catalogues;
use crate::document::Document;
use crate::lexicon::{Lexicon, LexiconSession, PointerKind, SynsetId, WordClass};
use crate::{Feature, Finding, Location};
use log::{debug, warn};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

pub const MAX_SIMILARITY: f64 = 5.0;

/// One hypernym lineage of a sense: `chain[0]` is the root, the last
/// element is the sense itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperTree {
    pub chain: Vec<SynsetId>,
    /// Topic-domain pointers of the terminal sense
    pub topics: Vec<SynsetId>,
}

impl HyperTree {
    /// All lineages of `sense`, following hypernym and instance-hypernym links
    pub fn build(lexicon: &dyn Lexicon, sense: SynsetId) -> Vec<HyperTree> {
        let Some(terminal) = lexicon.synset(sense) else {
            return Vec::new();
        };
        let topics = terminal.related(&PointerKind::Topic);

        let mut trees: Vec<HyperTree> = Vec::new();
        let mut worklist: Vec<Vec<SynsetId>> = vec![vec![sense]];
        while let Some(chain) = worklist.pop() {
            let head = chain[0];
            let parents: Vec<SynsetId> = lexicon
                .synset(head)
                .map(|s| s.hypernyms())
                .unwrap_or_default()
                .into_iter()
                .filter(|p| !chain.contains(p))
                .collect();

            if parents.is_empty() {
                let tree = HyperTree {
                    chain,
                    topics: topics.clone(),
                };
                if !trees.contains(&tree) {
                    trees.push(tree);
                }
                continue;
            }
            for parent in parents {
                let mut extended = Vec::with_capacity(chain.len() + 1);
                extended.push(parent);
                extended.extend_from_slice(&chain);
                worklist.push(extended);
            }
        }
        trees
    }

    pub fn terminal(&self) -> SynsetId {
        self.chain[self.chain.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    fn contains(&self, id: SynsetId) -> bool {
        self.chain.contains(&id)
    }

    fn position(&self, id: SynsetId) -> Option<usize> {
        self.chain.iter().position(|&s| s == id)
    }

    /// Similarity of two lineages on a 0-5 scale
    pub fn similarity(&self, other: &HyperTree) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        let (mine, theirs) = (self.terminal(), other.terminal());
        if mine == theirs
            || self.topics.iter().any(|&t| other.contains(t))
            || other.topics.iter().any(|&t| self.contains(t))
            || other.contains(mine)
            || self.contains(theirs)
        {
            return MAX_SIMILARITY;
        }

        let deepest = self
            .chain
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, &id)| other.position(id).map(|j| (i, j)));
        match deepest {
            None => 0.0,
            Some((i, j)) => {
                let depth = (i.min(j) + 1) as f64;
                let score = MAX_SIMILARITY * 2.0 * depth / (self.len() + other.len()) as f64;
                score.min(MAX_SIMILARITY)
            }
        }
    }
}

/// Best similarity of any lineage pair; `None` when either side has none
pub fn best_similarity(word: &[HyperTree], topic: &[HyperTree]) -> Option<f64> {
    word.iter()
        .flat_map(|w| topic.iter().map(move |t| w.similarity(t)))
        .reduce(f64::max)
}

/// Mean of the highest `ceil(0.8 N)` values, rounded; 0 when empty
pub fn trimmed_mean(scores: &[f64]) -> (f64, u8) {
    if scores.is_empty() {
        return (0.0, 0);
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let kept = &sorted[sorted.len() / 5..];
    let mean = kept.iter().sum::<f64>() / kept.len() as f64;
    (mean, mean.round().clamp(0.0, MAX_SIMILARITY) as u8)
}

/// Topic prompt text after any tab-delimited label
pub fn strip_topic_label(topic: &str) -> &str {
    topic.rsplit('\t').next().unwrap_or(topic).trim()
}

fn is_lexicon_noun(lexicon: &dyn Lexicon, lemma: &str) -> bool {
    lexicon.lookup(lemma, WordClass::Noun).is_some()
}

/// Document nouns in order, duplicates kept: (lemma, sentence, token index)
pub fn document_nouns(
    document: &Document,
    catalogues: &Catalogues,
    lexicon: &dyn Lexicon,
) -> Vec<(String, usize, usize)> {
    document
        .tokens()
        .filter(|t| t.pos.starts_with("NN"))
        .filter(|t| !catalogues.is_stopword(&t.lemma))
        .filter(|t| is_lexicon_noun(lexicon, &t.lemma))
        .map(|t| (t.lemma.to_lowercase(), t.sentence_index, t.index))
        .collect()
}

/// Distinct nouns of an annotated topic
pub fn topic_nouns(topic: &Document, catalogues: &Catalogues, lexicon: &dyn Lexicon) -> Vec<String> {
    let mut seen = HashSet::new();
    document_nouns(topic, catalogues, lexicon)
        .into_iter()
        .map(|(lemma, _, _)| lemma)
        .filter(|lemma| seen.insert(lemma.clone()))
        .collect()
}

fn word_pattern() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| Regex::new(r"[A-Za-z]+").expect("word pattern compiles"))
}

/// Distinct nouns of a plain-text topic, with a crude plural fallback
pub fn topic_nouns_from_text(topic: &str, catalogues: &Catalogues, lexicon: &dyn Lexicon) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut nouns = Vec::new();
    for word in word_pattern().find_iter(strip_topic_label(topic)) {
        let word = word.as_str().to_lowercase();
        if catalogues.is_stopword(&word) {
            continue;
        }
        let mut candidates = vec![word.clone()];
        if let Some(stem) = word.strip_suffix("ies") {
            candidates.push(format!("{}y", stem));
        }
        if let Some(stem) = word.strip_suffix("es") {
            candidates.push(stem.to_string());
        }
        if let Some(stem) = word.strip_suffix('s') {
            candidates.push(stem.to_string());
        }
        let found = candidates
            .into_iter()
            .find(|c| !c.is_empty() && is_lexicon_noun(lexicon, c));
        if let Some(noun) = found {
            if seen.insert(noun.clone()) {
                nouns.push(noun);
            }
        }
    }
    nouns
}

fn trees_for(lexicon: &dyn Lexicon, lemma: &str) -> Vec<HyperTree> {
    lexicon
        .lookup(lemma, WordClass::Noun)
        .and_then(|entry| entry.first_sense())
        .map(|sense| HyperTree::build(lexicon, sense))
        .unwrap_or_default()
}

pub struct TopicRelevanceRule {
    /// How many weakly related nouns to report
    pub finding_limit: usize,
}

impl Default for TopicRelevanceRule {
    fn default() -> Self {
        Self { finding_limit: 5 }
    }
}

impl TopicRelevanceRule {
    fn empty_report(&self) -> FeatureReport {
        FeatureReport {
            feature: Feature::TopicRelevance,
            score: 0,
            measure: 0.0,
            findings: Vec::new(),
        }
    }
}

impl FeatureRule for TopicRelevanceRule {
    fn name(&self) -> &'static str {
        "topic-relevance"
    }

    fn feature(&self) -> Feature {
        Feature::TopicRelevance
    }

    fn evaluate(&self, ctx: &EssayContext<'_>) -> FeatureReport {
        let Some(lexicon) = ctx.lexicon else {
            debug!("no lexicon configured, topic relevance is 0");
            return self.empty_report();
        };
        if ctx.topic.is_none() && ctx.topic_document.is_none() {
            debug!("essay has no topic, topic relevance is 0");
            return self.empty_report();
        }
        let session = match LexiconSession::open(lexicon) {
            Ok(session) => session,
            Err(e) => {
                warn!("lexicon unavailable, topic relevance is 0: {}", e);
                return self.empty_report();
            }
        };
        let lexicon = session.lexicon();

        let topic_nouns = match (ctx.topic_document, ctx.topic) {
            (Some(doc), _) => topic_nouns(doc, ctx.catalogues, lexicon),
            (None, Some(text)) => topic_nouns_from_text(text, ctx.catalogues, lexicon),
            (None, None) => Vec::new(),
        };
        let topic_trees: Vec<HyperTree> = topic_nouns
            .iter()
            .flat_map(|noun| trees_for(lexicon, noun))
            .collect();
        debug!(
            "topic nouns {:?} expand to {} hypernym chains",
            topic_nouns,
            topic_trees.len()
        );

        let nouns = document_nouns(ctx.document, ctx.catalogues, lexicon);
        let mut per_noun: BTreeMap<&str, Option<f64>> = BTreeMap::new();
        for (lemma, _, _) in &nouns {
            per_noun
                .entry(lemma.as_str())
                .or_insert_with(|| best_similarity(&trees_for(lexicon, lemma), &topic_trees));
        }

        let scores: Vec<f64> = nouns
            .iter()
            .filter_map(|(lemma, _, _)| per_noun.get(lemma.as_str()).copied().flatten())
            .collect();
        let (measure, score) = trimmed_mean(&scores);

        let mut weakest: Vec<(&str, f64)> = per_noun
            .iter()
            .filter_map(|(&lemma, s)| s.map(|s| (lemma, s)))
            .filter(|&(_, s)| s < 1.0)
            .collect();
        weakest.sort_by(|a, b| a.1.total_cmp(&b.1));
        let findings = weakest
            .into_iter()
            .take(self.finding_limit)
            .filter_map(|(lemma, s)| {
                let (_, sentence, index) = nouns.iter().find(|(l, _, _)| l == lemma)?;
                Some(Finding::new(
                    Feature::TopicRelevance,
                    Location::token(*sentence, *index),
                    format!("'{}' is unrelated to the topic (similarity {:.2})", lemma, s),
                ))
            })
            .collect();

        FeatureReport {
            feature: Feature::TopicRelevance,
            score,
            measure,
            findings,
        }
    }
}
