//! Saved prompt templates and their identifiers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::Mode;
use crate::category::CategorySelection;

/// Identifier for a saved template. Doubles as the on-disk file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(Uuid);

#[derive(Debug, Error)]
#[error("invalid template id: {0}")]
pub struct TemplateIdParseError(#[from] uuid::Error);

impl TemplateId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TemplateId {
    type Err = TemplateIdParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(raw.trim())?))
    }
}

/// A saved prompt configuration.
///
/// `categories` uses a BTreeMap so serialized templates are stable and
/// diffable. Keys are category keys (the fixed six plus anything an imported
/// template carried).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 UTC timestamp. Stored as a string so listing can sort
    /// lexicographically without re-parsing.
    pub created_at: String,
    pub mode: Mode,
    #[serde(default)]
    pub categories: BTreeMap<String, CategorySelection>,
    #[serde(default)]
    pub generated_prompt: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Template {
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
