//! Core domain types for promptdeck.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies. Everything here can be used from any layer of the
//! application.

mod category;
mod template;

pub use category::{CategoryKind, CategorySelection, Weight};
pub use template::{Template, TemplateId, TemplateIdParseError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Content mode
// ============================================================================

/// Content mode gating which catalog options are visible.
///
/// Serialized as `"SFW"` / `"NSFW"` to stay compatible with the template
/// files written by earlier versions of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "SFW")]
    Sfw,
    #[serde(rename = "NSFW")]
    Nsfw,
}

#[derive(Debug, Error)]
#[error("unknown mode (expected \"sfw\" or \"nsfw\")")]
pub struct ModeParseError;

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Sfw => "SFW",
            Mode::Nsfw => "NSFW",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Mode::Sfw => Mode::Nsfw,
            Mode::Nsfw => Mode::Sfw,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sfw" => Ok(Mode::Sfw),
            "nsfw" => Ok(Mode::Nsfw),
            _ => Err(ModeParseError),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Prompt statistics
// ============================================================================

/// Summary figures for the currently assembled prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptStats {
    pub length: usize,
    pub word_count: usize,
    pub categories_used: usize,
    pub mode: Mode,
}

// ============================================================================
// NonEmpty string type
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
///
/// Used for template names: existence of the value is the proof of its
/// validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("value must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Truncate `raw` to at most `max` characters, appending `...` when cut.
#[must_use]
pub fn truncate_with_ellipsis(raw: &str, max: usize) -> String {
    let raw = raw.trim();
    let max = max.max(3);
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = raw.chars().take(keep).collect();
    out.push_str("...");
    out
}
