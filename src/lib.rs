//! Lexigrade: linguistic feature scoring for annotated essays
//!
//! This library derives calibrated sub-scores (length, spelling, subject-verb
//! agreement, grammar, sentence formation, coherence and topic relevance)
//! from an essay that an external NLP pipeline has already annotated, and
//! combines them with a linear model into a high/low grade.

pub mod analyzer;
pub mod catalogue;
pub mod config;
pub mod document;
pub mod gender;
pub mod lexicon;
pub mod reporter;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The main result of grading one essay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    /// Essay identifier
    pub essay_id: String,
    /// Path of the essay file, when it was loaded from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Discrete sub-score per feature
    pub scores: FeatureScores,
    /// Linear model output before the cutoff is applied
    pub final_score: f64,
    /// Predicted grade
    pub grade: Grade,
    /// Reference grade carried by the essay, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_grade: Option<Grade>,
    /// Explanations of what lowered each sub-score
    pub findings: Vec<Finding>,
    /// Statistics about the essay
    pub stats: EssayStats,
}

impl GradeResult {
    /// True when the essay carries a reference grade and the prediction matches it
    pub fn agrees_with_expected(&self) -> Option<bool> {
        self.expected_grade.map(|g| g == self.grade)
    }
}

/// Linguistic features scored by the analyzers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Length,
    Spelling,
    SubjectVerbAgreement,
    Grammar,
    SentenceFormation,
    Coherence,
    TopicRelevance,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Length,
        Feature::Spelling,
        Feature::SubjectVerbAgreement,
        Feature::Grammar,
        Feature::SentenceFormation,
        Feature::Coherence,
        Feature::TopicRelevance,
    ];

    /// Human-readable name for console output
    pub fn title(&self) -> &'static str {
        match self {
            Feature::Length => "Length",
            Feature::Spelling => "Spelling",
            Feature::SubjectVerbAgreement => "Subject-Verb Agreement",
            Feature::Grammar => "Grammar",
            Feature::SentenceFormation => "Sentence Formation",
            Feature::Coherence => "Coherence",
            Feature::TopicRelevance => "Topic Relevance",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feature::Length => write!(f, "length"),
            Feature::Spelling => write!(f, "spelling"),
            Feature::SubjectVerbAgreement => write!(f, "subject-verb-agreement"),
            Feature::Grammar => write!(f, "grammar"),
            Feature::SentenceFormation => write!(f, "sentence-formation"),
            Feature::Coherence => write!(f, "coherence"),
            Feature::TopicRelevance => write!(f, "topic-relevance"),
        }
    }
}

/// Sub-scores by feature.
///
/// Length, subject-verb, grammar, formation and coherence are 1-5 (higher is
/// better). Spelling is a 0-4 band where higher means more misspellings.
/// Topic relevance is a rounded 0-5 similarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureScores {
    pub length: u8,
    pub spelling: u8,
    pub subject_verb_agreement: u8,
    pub grammar: u8,
    pub sentence_formation: u8,
    pub coherence: u8,
    pub topic_relevance: u8,
}

impl FeatureScores {
    pub fn get(&self, feature: Feature) -> u8 {
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

    pub fn set(&mut self, feature: Feature, value: u8) {
        let slot = match feature {
            Feature::Length => &mut self.length,
            Feature::Spelling => &mut self.spelling,
            Feature::SubjectVerbAgreement => &mut self.subject_verb_agreement,
            Feature::Grammar => &mut self.grammar,
            Feature::SentenceFormation => &mut self.sentence_formation,
            Feature::Coherence => &mut self.coherence,
            Feature::TopicRelevance => &mut self.topic_relevance,
        };
        *slot = value;
    }
}

/// Binary essay grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    High,
    Low,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::High => write!(f, "high"),
            Grade::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Grade::High),
            "low" => Ok(Grade::Low),
            other => Err(format!("unknown grade '{}'", other)),
        }
    }
}

/// Something an analyzer noticed while scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Feature whose score the finding explains
    pub feature: Feature,
    /// Where in the essay
    pub location: Location,
    /// Human-readable message
    pub message: String,
    /// How the writer could fix it
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(feature: Feature, location: Location, message: impl Into<String>) -> Self {
        Self {
            feature,
            location,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Location in an essay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Sentence number (1-indexed)
    pub sentence: usize,
    /// Token number within the sentence (1-indexed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<usize>,
}

impl Location {
    /// Whole-sentence location from a 0-indexed sentence position
    pub fn sentence(sentence_index: usize) -> Self {
        Self {
            sentence: sentence_index + 1,
            token: None,
        }
    }

    /// Token location from a 0-indexed sentence position and a 1-indexed token index
    pub fn token(sentence_index: usize, token_index: usize) -> Self {
        Self {
            sentence: sentence_index + 1,
            token: Some(token_index),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.token {
            Some(t) => write!(f, "{}:{}", self.sentence, t),
            None => write!(f, "{}", self.sentence),
        }
    }
}

/// Statistics about an essay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayStats {
    /// Annotated sentences
    pub sentences: usize,
    /// Annotated tokens
    pub tokens: usize,
    /// Raw measure behind each sub-score (ratios, counts, means)
    pub measures: BTreeMap<Feature, f64>,
}
