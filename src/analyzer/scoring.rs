//! Score quantization and the linear grade model

use crate::{Feature, FeatureScores, Grade};
use serde::{Deserialize, Serialize};

/// Length: estimated sentence count -> band (score is index + 1)
pub const LENGTH_THRESHOLDS: [f64; 5] = [0.0, 10.0, 13.0, 16.0, 20.0];
/// Spelling: misspelled ratio -> band (not flipped; higher is worse)
pub const SPELLING_THRESHOLDS: [f64; 5] = [0.0, 0.01, 0.022, 0.033, 0.088];
/// Subject-verb agreement: mistakes per sentence
pub const SUBJECT_VERB_THRESHOLDS: [f64; 5] = [0.0, 0.14, 0.25, 0.35, 0.58];
/// Grammar: mean badness per sentence
pub const GRAMMAR_THRESHOLDS: [f64; 5] = [0.0, 0.19, 0.37, 0.62, 1.77];
/// Sentence formation: ratio of wrongly formed sentences
pub const FORMATION_THRESHOLDS: [f64; 5] = [0.0, 0.3, 0.485, 0.660, 0.902];
/// Coherence: cumulative pronoun penalty per sentence
pub const COHERENCE_THRESHOLDS: [f64; 5] = [0.0, 0.31, 0.47, 0.539, 0.72];

/// Index `i` with `thresholds[i] <= x < thresholds[i + 1]`; otherwise the
/// last index. Values below `thresholds[0]` also land in the last bucket.
pub fn interval_index(x: f64, thresholds: &[f64]) -> usize {
    let last = thresholds.len().saturating_sub(1);
    (0..last)
        .rev()
        .find(|&i| thresholds[i] <= x && x < thresholds[i + 1])
        .unwrap_or(last)
}

/// `5 - index`: turns a badness ratio into a 1-5 correctness score
pub fn flipped_score(x: f64, thresholds: &[f64]) -> u8 {
    5u8.saturating_sub(interval_index(x, thresholds) as u8)
}

/// `index + 1`: 1-5 score for measures where more is better
pub fn banded_score(x: f64, thresholds: &[f64]) -> u8 {
    interval_index(x, thresholds) as u8 + 1
}

/// Per-feature weights of the grade model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelWeights {
    pub length: f64,
    pub spelling: f64,
    pub subject_verb_agreement: f64,
    pub grammar: f64,
    pub sentence_formation: f64,
    pub coherence: f64,
    pub topic_relevance: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            length: 1.8721,
            spelling: -0.6243,
            subject_verb_agreement: 0.1266,
            grammar: 0.4999,
            sentence_formation: -0.2504,
            coherence: 0.125,
            topic_relevance: -0.2533,
        }
    }
}

impl ModelWeights {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Length => self.length,
            Feature::Spelling => self.spelling,
            Feature::SubjectVerbAgreement => self.subject_verb_agreement,
            Feature::Grammar => self.grammar,
            Feature::SentenceFormation => self.sentence_formation,
            Feature::Coherence => self.coherence,
            Feature::TopicRelevance => self.topic_relevance,
        }
    }
}

/// Fixed linear combination of the sub-scores, thresholded into high/low
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinearGradeModel {
    pub weights: ModelWeights,
    pub intercept: f64,
    /// Minimum model output for a high grade
    pub cutoff: f64,
}

impl Default for LinearGradeModel {
    fn default() -> Self {
        Self {
            weights: ModelWeights::default(),
            intercept: -6.3601,
            cutoff: 1.0,
        }
    }
}

impl LinearGradeModel {
    /// Weighted sum of the sub-scores, without the intercept
    pub fn weighted_sum(&self, scores: &FeatureScores) -> f64 {
        Feature::ALL
            .iter()
            .map(|&f| self.weights.get(f) * scores.get(f) as f64)
            .sum()
    }

    /// Model output: weighted sum plus intercept
    pub fn score(&self, scores: &FeatureScores) -> f64 {
        self.weighted_sum(scores) + self.intercept
    }

    pub fn grade_for(&self, output: f64) -> Grade {
        if output >= self.cutoff {
            Grade::High
        } else {
            Grade::Low
        }
    }

    pub fn grade(&self, scores: &FeatureScores) -> Grade {
        self.grade_for(self.score(scores))
    }
}
