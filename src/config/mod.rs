//! Configuration loading for Lexigrade

mod schema;

pub use schema::{CoherenceConfig, Config, GenderConfig, GenderMode, ModelConfig, ResourcePaths};

use crate::analyzer::GradingEngine;
use crate::catalogue::Catalogues;
use crate::gender::{GenderCache, GenderResolver, GenderTable, MemoizedGender, NoGender};
use crate::lexicon::WordNetLexicon;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CONFIG_FILENAME: &str = ".lexigraderc.json";

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            debug!("loading config {}", path.display());
            load_config_with_extends(&path, &mut HashSet::new())
        }
        None => Ok(Config::default()),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    config.anchor_paths(config_dir);

    if let Some(extends) = config.extends.take() {
        let base_config = resolve_extends(config_path, &extends, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Resolve an extends reference (relative to the extending file) to a config
fn resolve_extends(
    config_path: &Path,
    extends: &str,
    visited: &mut HashSet<PathBuf>,
) -> Result<Config> {
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    let extends_path = config_dir.join(extends);

    // Ensure it has .json extension
    let extends_path = if extends_path.extension().is_none() {
        extends_path.with_extension("json")
    } else {
        extends_path
    };

    if !extends_path.exists() {
        anyhow::bail!(
            "Extended config not found: {} (referenced from {})",
            extends_path.display(),
            config_path.display()
        );
    }

    load_config_with_extends(&extends_path, visited)
}

/// Search for .lexigraderc.json in directory and its parents
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.exists())
}

/// Build a GlobSet from ignore patterns for path matching
pub fn build_ignore_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Check if a path should be ignored based on config glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

/// Starter config written by `lexigrade init`
pub fn default_config_json() -> Result<String> {
    let config = Config {
        wordnet: Some(PathBuf::from("/usr/share/wordnet")),
        ignore: vec!["**/drafts/**".to_string()],
        ..Default::default()
    };
    serde_json::to_string_pretty(&config).context("Failed to serialize default config")
}

/// Resolver chosen by the gender config; the memoized handle is returned
/// separately so the caller can persist its cache.
pub fn build_gender_resolver(
    config: &GenderConfig,
) -> Result<(Arc<dyn GenderResolver>, Option<Arc<MemoizedGender>>)> {
    match config.mode {
        GenderMode::Off => {
            let resolver: Arc<dyn GenderResolver> = Arc::new(NoGender);
            Ok((resolver, None))
        }
        GenderMode::Table => {
            let path = config
                .table
                .as_deref()
                .context("gender mode 'table' needs a 'table' path")?;
            let table = GenderTable::load(path)
                .with_context(|| format!("Failed to load gender table {}", path.display()))?;
            info!("loaded {} names from {}", table.len(), path.display());
            let resolver: Arc<dyn GenderResolver> = Arc::new(table);
            Ok((resolver, None))
        }
        GenderMode::Genderize => build_genderize(config),
    }
}

#[cfg(feature = "genderize")]
fn build_genderize(
    config: &GenderConfig,
) -> Result<(Arc<dyn GenderResolver>, Option<Arc<MemoizedGender>>)> {
    use crate::gender::GenderizeClient;
    use std::time::Duration;

    let client = GenderizeClient::new(Duration::from_secs(config.timeout_secs))
        .context("Failed to create genderize client")?;
    let cache = match &config.cache_path {
        Some(path) => GenderCache::at(path),
        None => GenderCache::in_memory(),
    };
    let memo = Arc::new(MemoizedGender::with_cache(Box::new(client), cache));
    let resolver: Arc<dyn GenderResolver> = memo.clone();
    Ok((resolver, Some(memo)))
}

#[cfg(not(feature = "genderize"))]
fn build_genderize(
    config: &GenderConfig,
) -> Result<(Arc<dyn GenderResolver>, Option<Arc<MemoizedGender>>)> {
    // Cached answers are still usable offline
    if let Some(path) = &config.cache_path {
        let memo = Arc::new(MemoizedGender::with_cache(Box::new(NoGender), GenderCache::at(path)));
        log::warn!("built without the genderize feature; using cached genders only");
        let resolver: Arc<dyn GenderResolver> = memo.clone();
        return Ok((resolver, Some(memo)));
    }
    anyhow::bail!("gender mode 'genderize' requires building with --features genderize")
}

/// Engine wired from a loaded config
pub fn build_engine(config: &Config) -> Result<(GradingEngine, Option<Arc<MemoizedGender>>)> {
    let catalogues = Arc::new(Catalogues::load(&config.catalogue_sources()));
    let (gender, memo) = build_gender_resolver(&config.gender)?;

    let mut engine = GradingEngine::new()
        .with_catalogues(catalogues)
        .with_gender(gender)
        .with_centering(config.coherence.mode)
        .with_model(config.model.to_model());
    if let Some(dir) = &config.wordnet {
        if !dir.is_dir() {
            anyhow::bail!("WordNet directory not found: {}", dir.display());
        }
        engine = engine.with_lexicon(Arc::new(WordNetLexicon::new(dir.clone())));
    }
    Ok((engine, memo))
}
