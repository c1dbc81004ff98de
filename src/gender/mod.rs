//! Gender of antecedent candidates, for pronoun agreement
//!
//! Resolvers never fail from the caller's point of view: anything that goes
//! wrong is logged and reported as [`Gender::Unknown`].

mod cache;
#[cfg(feature = "genderize")]
mod genderize;
mod table;

pub use cache::{GenderCache, MemoizedGender};
#[cfg(feature = "genderize")]
pub use genderize::GenderizeClient;
pub use table::GenderTable;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenderError {
    #[error("gender lookup failed: {0}")]
    Request(String),

    #[error("unexpected gender service response: {0}")]
    Decode(String),

    #[error("failed to read gender table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("gender table line {line}: expected '<name> <male|female>', got '{content}'")]
    InvalidTable { line: usize, content: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// "male" / "female"; anything else is unknown
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Gender::Unknown
    }

    /// Known and different
    pub fn conflicts_with(&self, other: Gender) -> bool {
        self.is_known() && other.is_known() && *self != other
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Unknown => write!(f, ""),
        }
    }
}

/// Gender collaborator: `gender(word) -> male | female | unknown`
pub trait GenderResolver: Send + Sync {
    fn gender(&self, word: &str) -> Gender;
}

/// Resolver that knows nothing; agreement checks never reject on gender
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGender;

impl GenderResolver for NoGender {
    fn gender(&self, _word: &str) -> Gender {
        Gender::Unknown
    }
}

impl<R: GenderResolver + ?Sized> GenderResolver for std::sync::Arc<R> {
    fn gender(&self, word: &str) -> Gender {
        (**self).gender(word)
    }
}
