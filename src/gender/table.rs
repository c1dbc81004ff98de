//! Static name -> gender table

use super::{Gender, GenderError, GenderResolver};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Lookup table loaded from a file of `<name> <male|female>` lines
/// (comma or whitespace separated, `#` comments allowed)
#[derive(Debug, Clone, Default)]
pub struct GenderTable {
    names: HashMap<String, Gender>,
}

impl GenderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, gender: Gender) -> Self {
        self.names.insert(name.to_lowercase(), gender);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, GenderError> {
        let text = fs::read_to_string(path).map_err(|source| GenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, GenderError> {
        let mut table = Self::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty());
            let (Some(name), Some(gender), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(GenderError::InvalidTable {
                    line: n + 1,
                    content: line.to_string(),
                });
            };
            let gender = Gender::parse(gender);
            if !gender.is_known() {
                return Err(GenderError::InvalidTable {
                    line: n + 1,
                    content: line.to_string(),
                });
            }
            table.names.insert(name.to_lowercase(), gender);
        }
        Ok(table)
    }
}

impl GenderResolver for GenderTable {
    fn gender(&self, word: &str) -> Gender {
        self.names
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or_default()
    }
}
