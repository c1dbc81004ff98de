//! Grading engine - runs every feature rule and applies the grade model

use crate::catalogue::Catalogues;
use crate::document::Essay;
use crate::gender::{GenderResolver, NoGender};
use crate::lexicon::Lexicon;
use crate::{EssayStats, Feature, FeatureScores, Grade, GradeResult};
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::rules::{default_rules, rules_with_centering, CenteringMode, EssayContext, FeatureRule};
use super::LinearGradeModel;

/// Grades essays with shared, read-only resources
pub struct GradingEngine {
    catalogues: Arc<Catalogues>,
    lexicon: Option<Arc<dyn Lexicon>>,
    gender: Arc<dyn GenderResolver>,
    model: LinearGradeModel,
    rules: Vec<Box<dyn FeatureRule>>,
    topic_override: Option<String>,
}

impl GradingEngine {
    /// Engine with built-in catalogues, no lexicon and no gender knowledge
    pub fn new() -> Self {
        Self {
            catalogues: Arc::new(Catalogues::builtin()),
            lexicon: None,
            gender: Arc::new(NoGender),
            model: LinearGradeModel::default(),
            rules: default_rules(),
            topic_override: None,
        }
    }

    pub fn with_catalogues(mut self, catalogues: Arc<Catalogues>) -> Self {
        self.catalogues = catalogues;
        self
    }

    pub fn with_lexicon(mut self, lexicon: Arc<dyn Lexicon>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    pub fn with_gender(mut self, gender: Arc<dyn GenderResolver>) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_model(mut self, model: LinearGradeModel) -> Self {
        self.model = model;
        self
    }

    /// Replace the rule set (one rule per feature is expected)
    pub fn with_rules(mut self, rules: Vec<Box<dyn FeatureRule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Reset to the default rules with coherence walking in `mode`
    pub fn with_centering(mut self, mode: CenteringMode) -> Self {
        self.rules = rules_with_centering(mode);
        self
    }

    /// Grade every essay against `topic` instead of the topic it carries
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic_override = Some(topic.into());
        self
    }

    pub fn model(&self) -> &LinearGradeModel {
        &self.model
    }

    /// Grade one essay. Never fails: degenerate input yields neutral sub-scores.
    pub fn grade(&self, essay: &Essay) -> GradeResult {
        let mut ctx = EssayContext::new(&essay.document, &self.catalogues).with_gender(&*self.gender);
        if let Some(lexicon) = &self.lexicon {
            ctx = ctx.with_lexicon(lexicon.as_ref());
        }
        match &self.topic_override {
            // the essay's topic annotation describes a different prompt
            Some(topic) => ctx = ctx.with_topic(topic),
            None => {
                if let Some(topic) = &essay.topic {
                    ctx = ctx.with_topic(topic);
                }
                if let Some(topic) = &essay.topic_document {
                    ctx = ctx.with_topic_document(topic);
                }
            }
        }

        let mut scores = FeatureScores::default();
        let mut measures = BTreeMap::new();
        let mut findings = Vec::new();
        for rule in &self.rules {
            let report = rule.evaluate(&ctx);
            debug!(
                "{}: {} = {} (measure {:.3})",
                essay.id,
                rule.name(),
                report.score,
                report.measure
            );
            scores.set(report.feature, report.score);
            measures.insert(report.feature, report.measure);
            findings.extend(report.findings);
        }
        findings.sort_by_key(|f| (f.location.sentence, f.location.token, f.feature));

        let final_score = self.model.score(&scores);
        GradeResult {
            essay_id: essay.id.clone(),
            file_path: None,
            scores,
            final_score,
            grade: self.model.grade_for(final_score),
            expected_grade: essay.expected_grade,
            findings,
            stats: EssayStats {
                sentences: essay.document.sentence_count(),
                tokens: essay.document.token_count(),
                measures,
            },
        }
    }

    /// Load an essay JSON file and grade it
    pub fn grade_file(&self, path: &Path) -> Result<GradeResult> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read essay file: {}", path.display()))?;
        let fallback_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        let essay = Essay::from_json(content, &fallback_id)
            .with_context(|| format!("Failed to parse essay file: {}", path.display()))?;

        let mut result = self.grade(&essay);
        result.file_path = Some(path.to_path_buf());
        Ok(result)
    }

    /// Grade multiple essay files sequentially
    pub fn grade_many(&self, paths: &[&Path]) -> Vec<Result<GradeResult>> {
        paths.iter().map(|p| self.grade_file(p)).collect()
    }

    /// Grade multiple essay files in parallel using rayon
    pub fn grade_parallel(&self, paths: &[PathBuf]) -> Vec<Result<GradeResult>> {
        use rayon::prelude::*;

        paths.par_iter().map(|p| self.grade_file(p)).collect()
    }

    /// Summarize a batch of results
    pub fn aggregate_stats(results: &[GradeResult]) -> AggregateStats {
        if results.is_empty() {
            return AggregateStats::default();
        }
        let n = results.len() as f64;

        let mean_scores = Feature::ALL
            .iter()
            .map(|&f| {
                let total: u32 = results.iter().map(|r| r.scores.get(f) as u32).sum();
                (f, total as f64 / n)
            })
            .collect();

        let judged: Vec<bool> = results.iter().filter_map(|r| r.agrees_with_expected()).collect();
        let agreements = judged.iter().filter(|&&ok| ok).count();

        AggregateStats {
            essays_graded: results.len(),
            high: results.iter().filter(|r| r.grade == Grade::High).count(),
            low: results.iter().filter(|r| r.grade == Grade::Low).count(),
            mean_final_score: results.iter().map(|r| r.final_score).sum::<f64>() / n,
            mean_scores,
            total_findings: results.iter().map(|r| r.findings.len()).sum(),
            with_expected_grade: judged.len(),
            agreements,
            accuracy: if judged.is_empty() {
                None
            } else {
                Some(agreements as f64 / judged.len() as f64)
            },
        }
    }
}

impl Default for GradingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics from multiple graded essays
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Number of essays graded
    pub essays_graded: usize,
    pub high: usize,
    pub low: usize,
    pub mean_final_score: f64,
    /// Mean sub-score per feature
    pub mean_scores: BTreeMap<Feature, f64>,
    pub total_findings: usize,
    /// Essays that carried a reference grade
    pub with_expected_grade: usize,
    /// Of those, how many were predicted correctly
    pub agreements: usize,
    /// `agreements / with_expected_grade`, when any essay had a reference grade
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}
