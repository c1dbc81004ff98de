//! Spelling, checked against closed-class words and the lexicon

use super::{EssayContext, FeatureReport, FeatureRule};
use crate::analyzer::scoring::{interval_index, SPELLING_THRESHOLDS};
use crate::lexicon::LexiconSession;
use crate::{Feature, Finding, Location};
use log::warn;

pub struct SpellingRule;

impl FeatureRule for SpellingRule {
    fn name(&self) -> &'static str {
        "spelling"
    }

    fn feature(&self) -> Feature {
        Feature::Spelling
    }

    fn evaluate(&self, ctx: &EssayContext<'_>) -> FeatureReport {
        let session = match ctx.lexicon.map(LexiconSession::open).transpose() {
            Ok(session) => session,
            Err(e) => {
                warn!("lexicon unavailable, spelling assumes every word is correct: {}", e);
                None
            }
        };

        let mut findings = Vec::new();
        let mut total = 0usize;
        let mut correct = 0usize;
        for token in ctx.document.tokens() {
            total += 1;
            let known = ctx.catalogues.is_closed_class(&token.lemma)
                || session
                    .as_ref()
                    .map_or(true, |s| s.lexicon().knows(&token.lemma));
            if known {
                correct += 1;
            } else {
                findings.push(Finding::new(
                    Feature::Spelling,
                    Location::token(token.sentence_index, token.index),
                    format!("'{}' is not a known word", token.text),
                ));
            }
        }

        let ratio = if total == 0 {
            0.0
        } else {
            1.0 - correct as f64 / total as f64
        };

        FeatureReport {
            feature: Feature::Spelling,
            score: interval_index(ratio, &SPELLING_THRESHOLDS) as u8,
            measure: ratio,
            findings,
        }
    }
}
