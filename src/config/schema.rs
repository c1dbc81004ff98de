//! Config schema and deserialization

use crate::analyzer::{CenteringMode, LinearGradeModel, ModelWeights};
use crate::catalogue::CatalogueSources;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Replacement files for the built-in catalogues
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePaths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_class: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<PathBuf>,
    /// Legal parent/children category strings, one per line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treebank_rules: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bad_sequences: Option<PathBuf>,
}

/// Where antecedent genders come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderMode {
    /// Every word has unknown gender
    #[default]
    Off,
    /// Static `<name> <male|female>` table
    Table,
    /// genderize.io web service (needs the `genderize` feature)
    Genderize,
}

/// Gender collaborator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderConfig {
    #[serde(default)]
    pub mode: GenderMode,

    /// Table file for `table` mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<PathBuf>,

    /// JSON file persisting looked-up genders between runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    /// Per-request timeout for the web service
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for GenderConfig {
    fn default() -> Self {
        Self {
            mode: GenderMode::Off,
            table: None,
            cache_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Coherence analyzer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceConfig {
    /// `calibrated` (default) or `crossSentence`
    #[serde(default)]
    pub mode: CenteringMode,
}

/// Partial override of the grade model; unset values keep the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<ModelWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercept: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f64>,
}

impl ModelConfig {
    pub fn to_model(&self) -> LinearGradeModel {
        let mut model = LinearGradeModel::default();
        if let Some(weights) = self.weights {
            model.weights = weights;
        }
        if let Some(intercept) = self.intercept {
            model.intercept = intercept;
        }
        if let Some(cutoff) = self.cutoff {
            model.cutoff = cutoff;
        }
        model
    }
}

/// Root config structure for .lexigraderc.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    #[serde(default)]
    pub resources: ResourcePaths,

    /// WordNet dictionary directory (holding index.noun, data.noun, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wordnet: Option<PathBuf>,

    #[serde(default)]
    pub gender: GenderConfig,

    #[serde(default)]
    pub coherence: CoherenceConfig,

    #[serde(default)]
    pub model: ModelConfig,

    /// Glob patterns for essay files to skip
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn anchor(path: &mut Option<PathBuf>, base: &Path) {
    if let Some(p) = path {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    }
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(mut self, wordnet: Option<&Path>) -> Self {
        if let Some(dir) = wordnet {
            self.wordnet = Some(dir.to_path_buf());
        }
        self
    }

    /// Make every relative path relative to `base` (the config's directory)
    pub fn anchor_paths(&mut self, base: &Path) {
        anchor(&mut self.resources.closed_class, base);
        anchor(&mut self.resources.stopwords, base);
        anchor(&mut self.resources.treebank_rules, base);
        anchor(&mut self.resources.bad_sequences, base);
        anchor(&mut self.wordnet, base);
        anchor(&mut self.gender.table, base);
        anchor(&mut self.gender.cache_path, base);
    }

    pub fn catalogue_sources(&self) -> CatalogueSources {
        CatalogueSources {
            closed_class: self.resources.closed_class.clone(),
            stopwords: self.resources.stopwords.clone(),
            treebank_rules: self.resources.treebank_rules.clone(),
            bad_sequences: self.resources.bad_sequences.clone(),
        }
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.extends.is_none() {
            self.extends = base.extends;
        }

        let r = &mut self.resources;
        r.closed_class = r.closed_class.take().or(base.resources.closed_class);
        r.stopwords = r.stopwords.take().or(base.resources.stopwords);
        r.treebank_rules = r.treebank_rules.take().or(base.resources.treebank_rules);
        r.bad_sequences = r.bad_sequences.take().or(base.resources.bad_sequences);

        if self.wordnet.is_none() {
            self.wordnet = base.wordnet;
        }

        if self.gender.mode == GenderMode::Off {
            self.gender.mode = base.gender.mode;
        }
        if self.gender.table.is_none() {
            self.gender.table = base.gender.table;
        }
        if self.gender.cache_path.is_none() {
            self.gender.cache_path = base.gender.cache_path;
        }
        if self.gender.timeout_secs == default_timeout_secs() {
            self.gender.timeout_secs = base.gender.timeout_secs;
        }

        if self.coherence.mode == CenteringMode::default() {
            self.coherence.mode = base.coherence.mode;
        }

        let m = &mut self.model;
        m.weights = m.weights.or(base.model.weights);
        m.intercept = m.intercept.or(base.model.intercept);
        m.cutoff = m.cutoff.or(base.model.cutoff);

        // Merge ignore patterns
        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.gender.mode, GenderMode::Off);
        assert_eq!(config.gender.timeout_secs, 5);
        assert_eq!(config.model.to_model(), LinearGradeModel::default());
    }

    #[test]
    fn test_partial_model_override() {
        let config: Config = serde_json::from_str(
            r#"{ "model": { "cutoff": 0.5, "weights": { "length": 2.0 } } }"#,
        )
        .unwrap();
        let model = config.model.to_model();
        assert_eq!(model.cutoff, 0.5);
        assert_eq!(model.intercept, -6.3601);
        assert_eq!(model.weights.length, 2.0);
        // unspecified weights keep their trained values
        assert_eq!(model.weights.grammar, 0.4999);
    }

    #[test]
    fn test_gender_mode_parsing() {
        let config: Config = serde_json::from_str(
            r#"{ "gender": { "mode": "table", "table": "names.txt", "timeoutSecs": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.gender.mode, GenderMode::Table);
        assert_eq!(config.gender.timeout_secs, 2);
        assert!(serde_json::from_str::<Config>(r#"{ "gender": { "mode": "psychic" } }"#).is_err());
    }

    #[test]
    fn test_anchor_paths() {
        let mut config: Config = serde_json::from_str(
            r#"{ "wordnet": "dict", "resources": { "stopwords": "/abs/stop.txt" } }"#,
        )
        .unwrap();
        config.anchor_paths(Path::new("/project"));
        assert_eq!(config.wordnet, Some(PathBuf::from("/project/dict")));
        assert_eq!(config.resources.stopwords, Some(PathBuf::from("/abs/stop.txt")));
    }

    #[test]
    fn test_cli_wordnet_wins() {
        let config = Config {
            wordnet: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };
        let config = config.merge_with_cli(Some(Path::new("/from/cli")));
        assert_eq!(config.wordnet, Some(PathBuf::from("/from/cli")));
    }
}
