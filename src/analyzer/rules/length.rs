//! Essay length, counted in clause-aware sentences
//!
//! A sentence that strings several capitalized subjects together without a
//! conjunction, preposition, comma or wh-word between them is counted as
//! the run-on sentences it really is.

use super::{EssayContext, FeatureReport, FeatureRule};
use crate::analyzer::scoring::{banded_score, LENGTH_THRESHOLDS};
use crate::document::{Document, Sentence};
use crate::{Feature, Finding, Location};

/// POS tags that can join two independent clauses
const CLAUSE_SEPARATORS: &[&str] = &["CC", "IN", ",", "WRB", "WDT", "WP", "WP$"];

pub struct LengthRule;

impl LengthRule {
    /// Number of sentences this one is worth (at least 1)
    pub fn sentence_weight(sentence: &Sentence) -> usize {
        // 0-indexed positions of capitalized subjects
        let mut subjects: Vec<usize> = sentence
            .basic()
            .edges()
            .iter()
            .filter(|d| d.relation.contains("subj"))
            .filter(|d| {
                sentence.token(d.dependent).is_some_and(|t| {
                    t.original_text.chars().next().is_some_and(char::is_uppercase)
                })
            })
            .map(|d| d.dependent)
            .collect();
        subjects.sort_unstable();

        let splits = subjects
            .windows(2)
            .filter(|pair| {
                !(pair[0]..pair[1]).any(|position| {
                    sentence
                        .pos_at(position)
                        .is_some_and(|pos| CLAUSE_SEPARATORS.contains(&pos))
                })
            })
            .count();

        if splits > 1 {
            splits
        } else {
            1
        }
    }

    /// Estimated sentence count for the whole document
    pub fn estimated_sentences(document: &Document) -> usize {
        document.sentences.iter().map(Self::sentence_weight).sum()
    }
}

impl FeatureRule for LengthRule {
    fn name(&self) -> &'static str {
        "length"
    }

    fn feature(&self) -> Feature {
        Feature::Length
    }

    fn evaluate(&self, ctx: &EssayContext<'_>) -> FeatureReport {
        let mut findings = Vec::new();
        let mut total = 0usize;
        for (i, sentence) in ctx.document.sentences.iter().enumerate() {
            let weight = Self::sentence_weight(sentence);
            if weight > 1 {
                findings.push(
                    Finding::new(
                        Feature::Length,
                        Location::sentence(i),
                        format!("Sentence runs {} clauses together without separators", weight),
                    )
                    .with_suggestion("Split independent clauses or join them with a conjunction"),
                );
            }
            total += weight;
        }

        FeatureReport {
            feature: Feature::Length,
            score: banded_score(total as f64, &LENGTH_THRESHOLDS),
            measure: total as f64,
            findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogues;
    use crate::document::SentenceBuilder;

    fn simple(i: usize) -> Sentence {
        SentenceBuilder::new(i)
            .tagged("Dogs/NNS bark/VBP ./.")
            .dep(2, 1, "nsubj")
            .build()
            .unwrap()
    }

    #[test]
    fn test_simple_sentence_counts_once() {
        assert_eq!(LengthRule::sentence_weight(&simple(0)), 1);
    }

    #[test]
    fn test_run_on_sentence_counts_per_split() {
        // "John runs Mary swims Tom sleeps": three capitalized subjects, no separators
        let s = SentenceBuilder::new(0)
            .tagged("John/NNP runs/VBZ Mary/NNP swims/VBZ Tom/NNP sleeps/VBZ")
            .dep(2, 1, "nsubj")
            .dep(4, 3, "nsubj")
            .dep(6, 5, "nsubj")
            .build()
            .unwrap();
        assert_eq!(LengthRule::sentence_weight(&s), 2);
    }

    #[test]
    fn test_separator_blocks_split() {
        let s = SentenceBuilder::new(0)
            .tagged("John/NNP runs/VBZ and/CC Mary/NNP swims/VBZ but/CC Tom/NNP sleeps/VBZ")
            .dep(2, 1, "nsubj")
            .dep(5, 4, "nsubj")
            .dep(8, 7, "nsubj")
            .build()
            .unwrap();
        assert_eq!(LengthRule::sentence_weight(&s), 1);
    }

    #[test]
    fn test_single_split_still_counts_once() {
        let s = SentenceBuilder::new(0)
            .tagged("John/NNP runs/VBZ Mary/NNP swims/VBZ")
            .dep(2, 1, "nsubj")
            .dep(4, 3, "nsubj")
            .build()
            .unwrap();
        assert_eq!(LengthRule::sentence_weight(&s), 1);
    }

    #[test]
    fn test_lowercase_subjects_ignored() {
        let s = SentenceBuilder::new(0)
            .tagged("he/PRP runs/VBZ she/PRP swims/VBZ it/PRP sleeps/VBZ")
            .dep(2, 1, "nsubj")
            .dep(4, 3, "nsubj")
            .dep(6, 5, "nsubj")
            .build()
            .unwrap();
        assert_eq!(LengthRule::sentence_weight(&s), 1);
    }

    #[test]
    fn test_capitalization_read_from_original_text() {
        let mut s = SentenceBuilder::new(0)
            .tagged("john/NNP runs/VBZ mary/NNP swims/VBZ tom/NNP sleeps/VBZ")
            .dep(2, 1, "nsubj")
            .dep(4, 3, "nsubj")
            .dep(6, 5, "nsubj")
            .build()
            .unwrap();
        assert_eq!(LengthRule::sentence_weight(&s), 1);

        for (position, original) in [(0, "John"), (2, "Mary"), (4, "Tom")] {
            s.tokens[position] = s.tokens[position].clone().with_original_text(original);
        }
        assert_eq!(LengthRule::sentence_weight(&s), 2);
    }

    #[test]
    fn test_score_bands() {
        let catalogues = Catalogues::empty();
        let short = Document::new((0..3).map(simple).collect());
        let report = LengthRule.evaluate(&EssayContext::new(&short, &catalogues));
        assert_eq!(report.score, 1);
        assert_eq!(report.measure, 3.0);

        let long = Document::new((0..14).map(simple).collect());
        assert_eq!(LengthRule.evaluate(&EssayContext::new(&long, &catalogues)).score, 3);

        let empty = Document::default();
        assert_eq!(LengthRule.evaluate(&EssayContext::new(&empty, &catalogues)).score, 1);
    }
}
