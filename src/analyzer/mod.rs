//! Analyzer module - feature scoring and grading
//!
//! The free functions below are the per-feature entry points used by
//! callers that only need one sub-score. [`GradingEngine`] runs every rule
//! and applies the grade model.

pub mod engine;
pub mod rules;
pub mod scoring;

pub use engine::{AggregateStats, GradingEngine};
pub use rules::CenteringMode;
pub use scoring::{LinearGradeModel, ModelWeights};

use crate::catalogue::Catalogues;
use crate::document::Document;
use crate::gender::GenderResolver;
use crate::lexicon::Lexicon;
use rules::{
    CoherenceRule, EssayContext, FeatureRule, GrammarRule, LengthRule, SentenceFormationRule,
    SpellingRule, SubjectVerbRule, TopicRelevanceRule,
};

fn score_with(rule: &dyn FeatureRule, ctx: EssayContext<'_>) -> u8 {
    rule.evaluate(&ctx).score
}

/// Length sub-score, 1-5
pub fn length_score(document: &Document) -> u8 {
    let catalogues = Catalogues::empty();
    score_with(&LengthRule, EssayContext::new(document, &catalogues))
}

/// Misspelling band, 0-4; every word is correct when `lexicon` is `None`
pub fn spell_score(document: &Document, catalogues: &Catalogues, lexicon: Option<&dyn Lexicon>) -> u8 {
    let mut ctx = EssayContext::new(document, catalogues);
    if let Some(lexicon) = lexicon {
        ctx = ctx.with_lexicon(lexicon);
    }
    score_with(&SpellingRule, ctx)
}

/// Subject-verb agreement sub-score, 1-5
pub fn subject_verb_score(document: &Document) -> u8 {
    let catalogues = Catalogues::empty();
    score_with(&SubjectVerbRule, EssayContext::new(document, &catalogues))
}

/// Grammar sub-score, 1-5
pub fn grammar_score(document: &Document, catalogues: &Catalogues) -> u8 {
    score_with(&GrammarRule, EssayContext::new(document, catalogues))
}

/// Sentence formation sub-score, 1-5
pub fn sentence_formation_score(document: &Document, catalogues: &Catalogues) -> u8 {
    score_with(&SentenceFormationRule, EssayContext::new(document, catalogues))
}

/// Coherence sub-score, 1-5
pub fn coherence_score(document: &Document, gender: &dyn GenderResolver) -> u8 {
    let catalogues = Catalogues::empty();
    score_with(
        &CoherenceRule::default(),
        EssayContext::new(document, &catalogues).with_gender(gender),
    )
}

/// Topic relevance, 0-5
pub fn topic_relevance_score(
    document: &Document,
    topic: &str,
    lexicon: &dyn Lexicon,
    catalogues: &Catalogues,
) -> u8 {
    score_with(
        &TopicRelevanceRule::default(),
        EssayContext::new(document, catalogues)
            .with_topic(topic)
            .with_lexicon(lexicon),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SentenceBuilder;
    use crate::gender::NoGender;
    use crate::lexicon::MemoryLexicon;

    fn dogs_run() -> Document {
        Document::new(vec![SentenceBuilder::new(0)
            .tagged("The/DT dogs/NNS runs/VBZ ./.")
            .dep(3, 2, "nsubj")
            .dep(2, 1, "det")
            .parse("(ROOT (S (NP (DT The) (NNS dogs)) (VP (VBZ runs)) (. .)))")
            .build()
            .unwrap()])
    }

    #[test]
    fn test_entry_points_agree_with_rules() {
        let doc = dogs_run();
        let catalogues = Catalogues::builtin();
        assert_eq!(length_score(&doc), 1);
        assert_eq!(spell_score(&doc, &catalogues, None), 0);
        // one mistake in one sentence
        assert_eq!(subject_verb_score(&doc), 1);
        assert_eq!(grammar_score(&doc, &catalogues), 5);
        assert_eq!(sentence_formation_score(&doc, &catalogues), 5);
        assert_eq!(coherence_score(&doc, &NoGender), 5);
    }

    #[test]
    fn test_topic_entry_point() {
        let lex = MemoryLexicon::new()
            .with_synset(1, &["entity"], &[])
            .with_synset(2, &["dog"], &[1]);
        let doc = dogs_run();
        // "dogs" lemma is not in the lexicon, only "dog"
        assert_eq!(topic_relevance_score(&doc, "dog", &lex, &Catalogues::builtin()), 0);

        let doc = Document::new(vec![SentenceBuilder::new(0)
            .token("dogs", "dog", "NNS")
            .token("bark", "bark", "VBP")
            .build()
            .unwrap()]);
        assert_eq!(topic_relevance_score(&doc, "dog", &lex, &Catalogues::builtin()), 5);
    }

    #[test]
    fn test_scores_are_repeatable() {
        let doc = dogs_run();
        let catalogues = Catalogues::builtin();
        let first = (
            grammar_score(&doc, &catalogues),
            sentence_formation_score(&doc, &catalogues),
            coherence_score(&doc, &NoGender),
        );
        let second = (
            grammar_score(&doc, &catalogues),
            sentence_formation_score(&doc, &catalogues),
            coherence_score(&doc, &NoGender),
        );
        assert_eq!(first, second);
    }
}
