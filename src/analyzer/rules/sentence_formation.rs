//! Sentence formation from constituency structure
//!
//! A sentence is wrongly formed when the parser had to fall back to FRAG/X,
//! when it opens with a verb, has no S clause, contains a misplaced SBAR,
//! or uses a parent/children production never seen in well-formed text.

use super::{EssayContext, FeatureReport, FeatureRule};
use crate::analyzer::scoring::{flipped_score, FORMATION_THRESHOLDS};
use crate::document::{base_label, ConstituencyTree, NodeId, Sentence};
use crate::{Feature, Finding, Location};
use std::collections::{BTreeSet, HashSet};

const FRAGMENT_LABELS: &[&str] = &["FRAG", "X"];
const SBAR_PARENTS: &[&str] = &["S", "SINV", "VP", "NP"];
const SBAR_CHILDREN: &[&str] = &["IN", "WHNP", "WHPP", "WHADJP", "WHADVP", "S"];
const VERB_INITIAL_TAGS: &[&str] = &["VB", "VBN", "VBZ", "VBP", "VBD"];
/// Nodes handled by the dedicated checks, never mined as productions
const SPECIAL_LABELS: &[&str] = &["ROOT", "FRAG", "X", "SBAR"];
/// Punctuation and empty categories left out of production strings
const IGNORED_CHILDREN: &[&str] = &[
    ",", ".", "``", "''", ":", "#", "", "--", "$", "-NONE-", "-LRB-", "-RRB-", "POS",
];

/// What fired for one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormationPenalties {
    pub fragment: bool,
    pub verb_initial: bool,
    pub no_clause: bool,
    pub invalid_sbar: bool,
    /// Productions absent from the treebank rule catalogue
    pub unknown_productions: Vec<String>,
}

impl FormationPenalties {
    pub fn is_wrong(&self) -> bool {
        self.fragment
            || self.verb_initial
            || self.no_clause
            || self.invalid_sbar
            || !self.unknown_productions.is_empty()
    }

    fn describe(&self) -> Vec<String> {
        if self.fragment {
            return vec!["parsed as a fragment".to_string()];
        }
        let mut out = Vec::new();
        if self.verb_initial {
            out.push("starts with a verb".to_string());
        }
        if self.no_clause {
            out.push("has no complete clause".to_string());
        }
        if self.invalid_sbar {
            out.push("has a misplaced subordinate clause".to_string());
        }
        if !self.unknown_productions.is_empty() {
            out.push(format!(
                "uses unusual structure {}",
                self.unknown_productions.join("; ")
            ));
        }
        out
    }
}

/// Counts gathered in one pre-order walk
#[derive(Debug, Default)]
struct TreeWalk {
    fragment: bool,
    clauses: usize,
    invalid_sbars: usize,
    productions: BTreeSet<String>,
}

fn walk(tree: &ConstituencyTree) -> TreeWalk {
    let mut out = TreeWalk::default();
    let mut stack = vec![tree.root()];

    while let Some(node) = stack.pop() {
        let label = base_label(tree.label(node));
        let mut descend = true;

        if !out.fragment && !tree.is_leaf(node) {
            if FRAGMENT_LABELS.contains(&label) {
                out.fragment = true;
                descend = false;
            } else if label == "S" {
                out.clauses += 1;
            } else if label == "SBAR" && !valid_sbar(tree, node) {
                out.invalid_sbars += 1;
            }
        }

        if descend {
            if let Some(production) = production(tree, node) {
                out.productions.insert(production);
            }
            stack.extend(tree.children(node).iter().rev().copied());
        }
    }
    out
}

fn valid_sbar(tree: &ConstituencyTree, node: NodeId) -> bool {
    let parent_ok = tree
        .parent(node)
        .is_some_and(|p| SBAR_PARENTS.contains(&base_label(tree.label(p))));
    let child_ok = tree
        .children(node)
        .iter()
        .any(|&c| SBAR_CHILDREN.contains(&base_label(tree.label(c))));
    parent_ok && child_ok
}

/// "PARENT,CHILD,CHILD..." for eligible internal nodes
fn production(tree: &ConstituencyTree, node: NodeId) -> Option<String> {
    let children = tree.children(node);
    if children.is_empty() || tree.is_leaf(node) {
        return None;
    }
    if SPECIAL_LABELS.contains(&base_label(tree.label(node))) {
        return None;
    }
    let eligible = children
        .iter()
        .all(|&c| !tree.is_leaf(c) && !SPECIAL_LABELS.contains(&base_label(tree.label(c))));
    if !eligible {
        return None;
    }

    let kept: Vec<&str> = children
        .iter()
        .map(|&c| tree.label(c))
        .filter(|l| !IGNORED_CHILDREN.contains(l))
        .map(base_label)
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(format!("{},{}", base_label(tree.label(node)), kept.join(",")))
}

pub struct SentenceFormationRule;

impl SentenceFormationRule {
    /// Penalties for one sentence. `rules` is the legal-production catalogue;
    /// without one, unknown productions are never reported.
    pub fn penalties(sentence: &Sentence, rules: Option<&HashSet<String>>) -> FormationPenalties {
        if sentence.is_empty() {
            return FormationPenalties::default();
        }
        let walk = walk(&sentence.tree);
        if walk.fragment {
            return FormationPenalties {
                fragment: true,
                ..Default::default()
            };
        }

        FormationPenalties {
            fragment: false,
            verb_initial: sentence
                .pos_at(0)
                .is_some_and(|pos| VERB_INITIAL_TAGS.contains(&pos)),
            no_clause: walk.clauses == 0,
            invalid_sbar: walk.invalid_sbars > 0,
            unknown_productions: rules
                .map(|rules| {
                    walk.productions
                        .into_iter()
                        .filter(|p| !rules.contains(p))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl FeatureRule for SentenceFormationRule {
    fn name(&self) -> &'static str {
        "sentence-formation"
    }

    fn feature(&self) -> Feature {
        Feature::SentenceFormation
    }

    fn evaluate(&self, ctx: &EssayContext<'_>) -> FeatureReport {
        let rules = ctx.catalogues.treebank_rules();
        let mut findings = Vec::new();
        let mut wrong = 0usize;

        for (i, sentence) in ctx.document.sentences.iter().enumerate() {
            let penalties = Self::penalties(sentence, rules);
            if penalties.is_wrong() {
                wrong += 1;
                findings.push(Finding::new(
                    Feature::SentenceFormation,
                    Location::sentence(i),
                    format!("Sentence {}", penalties.describe().join(", ")),
                ));
            }
        }

        let sentences = ctx.document.sentence_count();
        let ratio = if sentences == 0 {
            0.0
        } else {
            wrong as f64 / sentences as f64
        };

        FeatureReport {
            feature: Feature::SentenceFormation,
            score: flipped_score(ratio, &FORMATION_THRESHOLDS),
            measure: ratio,
            findings,
        }
    }
}
