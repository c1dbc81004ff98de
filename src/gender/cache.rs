//! Memoized gender lookups with an optional on-disk cache
//!
//! Each distinct word reaches the underlying resolver at most once per
//! process. With a cache path the answers also survive between runs.

use super::{Gender, GenderResolver};
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

const CACHE_VERSION: u32 = 1;

/// Cache entry for a single word
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    gender: Gender,
    /// Seconds since the epoch when the answer was stored
    cached_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheData {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

impl Default for CacheData {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Word -> gender answers, optionally persisted as JSON
#[derive(Debug)]
pub struct GenderCache {
    path: Option<PathBuf>,
    data: CacheData,
    dirty: bool,
}

impl GenderCache {
    /// Process-local cache, never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: CacheData::default(),
            dirty: false,
        }
    }

    /// Cache backed by a file; a missing or incompatible file starts empty
    pub fn at(path: &Path) -> Self {
        let data = Self::load_cache(path).unwrap_or_default();
        debug!(
            "gender cache {} holds {} entries",
            path.display(),
            data.entries.len()
        );
        Self {
            path: Some(path.to_path_buf()),
            data,
            dirty: false,
        }
    }

    fn load_cache(path: &Path) -> Option<CacheData> {
        let content = fs::read_to_string(path).ok()?;
        let data: CacheData = serde_json::from_str(&content).ok()?;
        if data.version != CACHE_VERSION {
            return None;
        }
        Some(data)
    }

    pub fn get(&self, word: &str) -> Option<Gender> {
        self.data.entries.get(word).map(|e| e.gender)
    }

    pub fn set(&mut self, word: &str, gender: Gender) {
        let entry = CacheEntry {
            gender,
            cached_at: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        self.data.entries.insert(word.to_string(), entry);
        self.dirty = true;
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// Write to disk if file-backed and changed
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        let content =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize gender cache")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write gender cache to {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

/// Wraps a resolver so each distinct (lower-cased) word is resolved once
pub struct MemoizedGender {
    inner: Box<dyn GenderResolver>,
    cache: Mutex<GenderCache>,
    misses: AtomicUsize,
}

impl MemoizedGender {
    pub fn new(inner: Box<dyn GenderResolver>) -> Self {
        Self::with_cache(inner, GenderCache::in_memory())
    }

    pub fn with_cache(inner: Box<dyn GenderResolver>, cache: GenderCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            misses: AtomicUsize::new(0),
        }
    }

    /// Number of lookups forwarded to the wrapped resolver
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn save(&self) -> Result<()> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .save()
    }
}

impl GenderResolver for MemoizedGender {
    fn gender(&self, word: &str) -> Gender {
        let key = word.to_lowercase();
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return hit;
        }
        // Resolve outside the lock; a racing thread may resolve the same word.
        let gender = self.inner.gender(&key);
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(&key, gender);
        gender
    }
}
