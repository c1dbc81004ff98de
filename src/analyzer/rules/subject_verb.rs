//! Subject-verb number agreement
//!
//! Checks every present-tense or base-form verb (VB, VBP, VBZ) against the
//! number of its nominal subject(s), looking through copulas and
//! auxiliaries to the predicate's subject.

use super::{EssayContext, FeatureReport, FeatureRule};
use crate::analyzer::scoring::{flipped_score, SUBJECT_VERB_THRESHOLDS};
use crate::document::{DependencyGraph, Sentence};
use crate::{Feature, Finding, Location};
use std::collections::BTreeSet;

const AGREEING_VERBS: &[&str] = &["VB", "VBP", "VBZ"];
const INFINITIVE_MARKERS: &[&str] = &["MD", "TO"];
const SINGULAR_NOUNS: &[&str] = &["NN", "NNP"];
const THIRD_PERSON_SINGULAR: &[&str] = &["He", "She", "It", "he", "she", "it"];
const SINGULAR_DEMONSTRATIVES: &[&str] = &["This", "That", "this", "that"];

/// One agreement error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementMistake {
    /// 0-indexed verb position
    pub verb: usize,
    /// 0-indexed subject positions, ascending
    pub subjects: Vec<usize>,
    pub subject_is_singular: bool,
}

pub struct SubjectVerbRule;

impl SubjectVerbRule {
    /// Agreement mistakes in one sentence, in verb order
    pub fn mistakes(sentence: &Sentence) -> Vec<AgreementMistake> {
        let graph = sentence.enhanced();
        let mut out = Vec::new();

        for (verb, token) in sentence.tokens.iter().enumerate() {
            if !AGREEING_VERBS.contains(&token.pos.as_str()) {
                continue;
            }
            let subjects = subjects_of(sentence, graph, verb);
            if subjects.is_empty() {
                continue;
            }
            let singular = subject_set_is_singular(sentence, &subjects, verb);
            let wrong = match token.pos.as_str() {
                "VBZ" => !singular,
                "VBP" => singular,
                _ => singular && !valid_infinitive(sentence, graph, verb),
            };
            if wrong {
                out.push(AgreementMistake {
                    verb,
                    subjects,
                    subject_is_singular: singular,
                });
            }
        }
        out
    }
}

/// Non-adjectival `nsubj` dependents of the verb, else of the head the verb
/// serves as copula or auxiliary for
fn subjects_of(sentence: &Sentence, graph: &DependencyGraph, verb: usize) -> Vec<usize> {
    let nominal_subjects = |head: usize| {
        graph
            .governed_by(head)
            .filter(|d| d.is("nsubj") && sentence.pos_at(d.dependent) != Some("JJ"))
            .map(|d| d.dependent)
            .collect::<Vec<_>>()
    };

    let mut subjects: BTreeSet<usize> = nominal_subjects(verb).into_iter().collect();
    if subjects.is_empty() {
        for edge in graph.depending_on(verb) {
            if edge.is("cop") || edge.is("aux") {
                if let Some(head) = edge.governor {
                    subjects.extend(nominal_subjects(head));
                }
            }
        }
    }
    subjects.into_iter().collect()
}

fn subject_set_is_singular(sentence: &Sentence, subjects: &[usize], verb: usize) -> bool {
    match subjects {
        [] => false,
        [only] => single_subject_is_singular(sentence, *only),
        [first, .., last] => {
            let between = || {
                sentence
                    .tokens
                    .get(*first..verb)
                    .unwrap_or_default()
                    .iter()
                    .map(|t| t.text.as_str())
            };
            if between().any(|w| w == "and") {
                false
            } else if between().any(|w| w == "or" || w == "nor") {
                single_subject_is_singular(sentence, *last)
            } else {
                false
            }
        }
    }
}

fn single_subject_is_singular(sentence: &Sentence, subject: usize) -> bool {
    let Some(token) = sentence.token(subject) else {
        return false;
    };
    let word = token.text.as_str();
    match token.pos.as_str() {
        pos if SINGULAR_NOUNS.contains(&pos) => true,
        "PRP" => THIRD_PERSON_SINGULAR.contains(&word),
        "DT" => SINGULAR_DEMONSTRATIVES.contains(&word),
        "CD" => word.eq_ignore_ascii_case("one"),
        _ => false,
    }
}

/// A bare VB is fine sentence-initially, after a modal or "to", or as a
/// clausal complement that takes no direct object
fn valid_infinitive(sentence: &Sentence, graph: &DependencyGraph, verb: usize) -> bool {
    if verb == 0 {
        return true;
    }
    if sentence
        .pos_at(verb - 1)
        .is_some_and(|pos| INFINITIVE_MARKERS.contains(&pos))
    {
        return true;
    }
    let ccomp = graph.depending_on(verb).any(|d| d.is("ccomp"));
    let dobj = graph.depending_on(verb).any(|d| d.is("dobj"));
    ccomp && !dobj
}

impl FeatureRule for SubjectVerbRule {
    fn name(&self) -> &'static str {
        "subject-verb-agreement"
    }

    fn feature(&self) -> Feature {
        Feature::SubjectVerbAgreement
    }

    fn evaluate(&self, ctx: &EssayContext<'_>) -> FeatureReport {
        let mut findings = Vec::new();
        let mut count = 0usize;

        for (i, sentence) in ctx.document.sentences.iter().enumerate() {
            for mistake in Self::mistakes(sentence) {
                count += 1;
                let Some(verb) = sentence.token(mistake.verb) else {
                    continue;
                };
                let subject = mistake
                    .subjects
                    .iter()
                    .filter_map(|&s| sentence.token(s))
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let number = if mistake.subject_is_singular {
                    "singular"
                } else {
                    "plural"
                };
                findings.push(
                    Finding::new(
                        Feature::SubjectVerbAgreement,
                        Location::token(i, verb.index),
                        format!(
                            "Verb '{}' ({}) does not agree with {} subject '{}'",
                            verb.text, verb.pos, number, subject
                        ),
                    )
                    .with_suggestion(format!("Use the {} form of '{}'", number, verb.lemma)),
                );
            }
        }

        let sentences = ctx.document.sentence_count();
        let ratio = if sentences == 0 {
            0.0
        } else {
            count as f64 / sentences as f64
        };

        FeatureReport {
            feature: Feature::SubjectVerbAgreement,
            score: flipped_score(ratio, &SUBJECT_VERB_THRESHOLDS),
            measure: ratio,
            findings,
        }
    }
}
