//! Verb-group grammar: missing verbs, missing subjects, bad POS sequences

use super::{EssayContext, FeatureReport, FeatureRule};
use crate::analyzer::scoring::{flipped_score, GRAMMAR_THRESHOLDS};
use crate::catalogue::BadSequenceCatalogue;
use crate::document::Sentence;
use crate::{Feature, Finding, Location};

const MISSING_VERB_WEIGHT: f64 = 2.0;
const MISSING_SUBJECT_WEIGHT: f64 = 1.0;
const BAD_SEQUENCE_WEIGHT: f64 = 5.0;

pub struct GrammarRule;

/// Per-sentence grammar observations
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceGrammar {
    pub has_verb: bool,
    pub has_subject: bool,
    /// (pattern, 0-indexed start) for every matched catalogue entry
    pub bad_sequences: Vec<(String, usize)>,
}

impl SentenceGrammar {
    pub fn inspect(sentence: &Sentence, catalogue: &BadSequenceCatalogue) -> Self {
        Self {
            has_verb: sentence.tokens.iter().any(|t| t.pos.contains("VB")),
            has_subject: sentence.enhanced().has_relation_containing("subj"),
            bad_sequences: catalogue
                .matches(sentence)
                .into_iter()
                .map(|m| (m.sequence.pattern.clone(), m.start))
                .collect(),
        }
    }

    pub fn badness(&self) -> f64 {
        let mut score = BAD_SEQUENCE_WEIGHT * self.bad_sequences.len() as f64;
        if !self.has_verb {
            score += MISSING_VERB_WEIGHT;
        }
        if !self.has_subject {
            score += MISSING_SUBJECT_WEIGHT;
        }
        score
    }
}

impl FeatureRule for GrammarRule {
    fn name(&self) -> &'static str {
        "grammar"
    }

    fn feature(&self) -> Feature {
        Feature::Grammar
    }

    fn evaluate(&self, ctx: &EssayContext<'_>) -> FeatureReport {
        let catalogue = ctx.catalogues.bad_sequences();
        let mut findings = Vec::new();
        let mut total = 0.0;

        for (i, sentence) in ctx.document.sentences.iter().enumerate() {
            if sentence.is_empty() {
                continue;
            }
            let grammar = SentenceGrammar::inspect(sentence, catalogue);
            total += grammar.badness();

            if !grammar.has_verb {
                findings.push(
                    Finding::new(Feature::Grammar, Location::sentence(i), "Sentence has no verb")
                        .with_suggestion("Add a main verb or join this fragment to a neighbouring sentence"),
                );
            }
            if !grammar.has_subject {
                findings.push(Finding::new(
                    Feature::Grammar,
                    Location::sentence(i),
                    "Sentence has no subject",
                ));
            }
            for (pattern, start) in &grammar.bad_sequences {
                let words = sentence
                    .tokens
                    .iter()
                    .skip(*start)
                    .take(pattern.split(',').count())
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let location = sentence
                    .token(*start)
                    .map(|t| Location::token(i, t.index))
                    .unwrap_or_else(|| Location::sentence(i));
                findings.push(
                    Finding::new(
                        Feature::Grammar,
                        location,
                        format!("Malformed verb group '{}' ({})", words, pattern),
                    )
                    .with_suggestion("Check the tense and form of consecutive verbs"),
                );
            }
        }

        let sentences = ctx.document.sentence_count();
        let mean = if sentences == 0 {
            0.0
        } else {
            total / sentences as f64
        };

        FeatureReport {
            feature: Feature::Grammar,
            score: flipped_score(mean, &GRAMMAR_THRESHOLDS),
            measure: mean,
            findings,
        }
    }
}
