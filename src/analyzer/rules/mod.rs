//! Feature rules: one analyzer per linguistic feature

pub mod coherence;
pub mod grammar;
pub mod length;
pub mod sentence_formation;
pub mod spelling;
pub mod subject_verb;
pub mod topic_relevance;

pub use coherence::{
    CenteringMode, ClosedSetPlurality, CoherenceRule, Plurality, TagPlurality, Transition,
};
pub use grammar::GrammarRule;
pub use length::LengthRule;
pub use sentence_formation::SentenceFormationRule;
pub use spelling::SpellingRule;
pub use subject_verb::SubjectVerbRule;
pub use topic_relevance::{HyperTree, TopicRelevanceRule};

use crate::catalogue::Catalogues;
use crate::document::Document;
use crate::gender::{GenderResolver, NoGender};
use crate::lexicon::Lexicon;
use crate::{Feature, Finding};

static NO_GENDER: NoGender = NoGender;

/// Everything a rule may read while scoring one essay
#[derive(Clone, Copy)]
pub struct EssayContext<'a> {
    pub document: &'a Document,
    /// Raw topic prompt
    pub topic: Option<&'a str>,
    /// Annotated topic prompt, preferred over `topic` for noun extraction
    pub topic_document: Option<&'a Document>,
    pub catalogues: &'a Catalogues,
    pub lexicon: Option<&'a dyn Lexicon>,
    pub gender: &'a dyn GenderResolver,
}

impl<'a> EssayContext<'a> {
    pub fn new(document: &'a Document, catalogues: &'a Catalogues) -> Self {
        Self {
            document,
            topic: None,
            topic_document: None,
            catalogues,
            lexicon: None,
            gender: &NO_GENDER,
        }
    }

    pub fn with_topic(mut self, topic: &'a str) -> Self {
        self.topic = Some(topic);
        self
    }

    pub fn with_topic_document(mut self, topic: &'a Document) -> Self {
        self.topic_document = Some(topic);
        self
    }

    pub fn with_lexicon(mut self, lexicon: &'a dyn Lexicon) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    pub fn with_gender(mut self, gender: &'a dyn GenderResolver) -> Self {
        self.gender = gender;
        self
    }
}

/// Outcome of one rule on one essay
#[derive(Debug, Clone)]
pub struct FeatureReport {
    pub feature: Feature,
    /// Discrete sub-score
    pub score: u8,
    /// Raw measure the score was quantized from
    pub measure: f64,
    pub findings: Vec<Finding>,
}

/// Trait for feature rules
pub trait FeatureRule: Send + Sync {
    /// Name of the rule
    fn name(&self) -> &'static str;

    /// Feature whose sub-score this rule produces
    fn feature(&self) -> Feature;

    /// Score one essay. Never fails: malformed input degrades to neutral values.
    fn evaluate(&self, ctx: &EssayContext<'_>) -> FeatureReport;
}

/// The seven rules in reporting order
pub fn default_rules() -> Vec<Box<dyn FeatureRule>> {
    rules_with_centering(CenteringMode::default())
}

/// The seven rules, with coherence walking in `mode`
pub fn rules_with_centering(mode: CenteringMode) -> Vec<Box<dyn FeatureRule>> {
    vec![
        Box::new(LengthRule),
        Box::new(SpellingRule),
        Box::new(SubjectVerbRule),
        Box::new(GrammarRule),
        Box::new(SentenceFormationRule),
        Box::new(CoherenceRule::new(mode)),
        Box::new(TopicRelevanceRule::default()),
    ]
}
