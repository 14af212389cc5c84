//! Category identity, emphasis weights, and per-category selection state.

use serde::{Deserialize, Serialize};

/// The six fixed prompt categories, in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Subject,
    Style,
    Composition,
    Environment,
    Lighting,
    Technical,
}

impl CategoryKind {
    pub const ALL: [Self; 6] = [
        Self::Subject,
        Self::Style,
        Self::Composition,
        Self::Environment,
        Self::Lighting,
        Self::Technical,
    ];

    /// Stable snake identifier used as the selection map key and the
    /// catalog data-file stem.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Style => "style",
            Self::Composition => "composition",
            Self::Environment => "environment",
            Self::Lighting => "lighting",
            Self::Technical => "technical",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::Style => "Style",
            Self::Composition => "Composition",
            Self::Environment => "Environment",
            Self::Lighting => "Lighting",
            Self::Technical => "Technical",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Subject => "Choose the main subject or focus of your image",
            Self::Style => "Select the artistic style and technique",
            Self::Composition => "Define the framing and layout of your image",
            Self::Environment => "Set the background and setting",
            Self::Lighting => "Choose the lighting mood and atmosphere",
            Self::Technical => "Specify camera and technical quality settings",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Emphasis weight for a category fragment, clamped to `[0.1, 2.0]`.
///
/// Weights above 1.0 wrap fragment parts in parentheses, weights below 1.0
/// wrap them in square brackets. The clamp also applies when deserializing,
/// so a hand-edited template file cannot smuggle in an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    pub const MIN: f64 = 0.1;
    pub const MAX: f64 = 2.0;
    pub const STEP: f64 = 0.1;

    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn stepped_up(self) -> Self {
        Self::new(round_to_step(self.0 + Self::STEP))
    }

    #[must_use]
    pub fn stepped_down(self) -> Self {
        Self::new(round_to_step(self.0 - Self::STEP))
    }

    #[must_use]
    pub fn is_emphasized(self) -> bool {
        self.0 > 1.0 + f64::EPSILON
    }

    #[must_use]
    pub fn is_deemphasized(self) -> bool {
        self.0 < 1.0 - f64::EPSILON
    }
}

// Keep stepped values on exact tenths so equality and display stay stable.
fn round_to_step(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Default for Weight {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Snapshot of everything a user picked within one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySelection {
    /// Catalog option ids currently checked.
    #[serde(default)]
    pub option_ids: Vec<String>,
    /// Display labels resolved from the catalog at selection time. Kept on
    /// the snapshot so a saved template renders the same prompt even if the
    /// catalog changes underneath it.
    #[serde(default)]
    pub option_labels: Vec<String>,
    #[serde(default)]
    pub custom_text: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub weight: Weight,
}

impl CategorySelection {
    /// True when nothing in this category would contribute to the prompt.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.option_labels.is_empty()
            && self.custom_text.trim().is_empty()
            && self.modifiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryKind, CategorySelection, Weight};

    #[test]
    fn category_keys_round_trip() {
        for kind in CategoryKind::ALL {
            assert_eq!(CategoryKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(CategoryKind::from_key("palette"), None);
    }

    #[test]
    fn weight_clamps_to_range() {
        assert!((Weight::new(5.0).value() - Weight::MAX).abs() < f64::EPSILON);
        assert!((Weight::new(0.0).value() - Weight::MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn weight_steps_stay_in_range() {
        let mut w = Weight::new(1.9);
        w = w.stepped_up();
        w = w.stepped_up();
        assert!((w.value() - Weight::MAX).abs() < f64::EPSILON);

        let mut w = Weight::new(0.2);
        w = w.stepped_down();
        w = w.stepped_down();
        assert!((w.value() - Weight::MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn weight_deserialization_clamps_out_of_range_values() {
        let high: Weight = serde_json::from_str("3.0").unwrap();
        assert!((high.value() - Weight::MAX).abs() < f64::EPSILON);

        let low: Weight = serde_json::from_str("0.0").unwrap();
        assert!((low.value() - Weight::MIN).abs() < f64::EPSILON);

        let json = serde_json::to_string(&Weight::new(1.5)).unwrap();
        assert_eq!(json, "1.5");
    }

    #[test]
    fn weight_emphasis_predicates() {
        assert!(Weight::new(1.2).is_emphasized());
        assert!(Weight::new(0.8).is_deemphasized());
        let neutral = Weight::default();
        assert!(!neutral.is_emphasized());
        assert!(!neutral.is_deemphasized());
    }

    #[test]
    fn selection_emptiness_ignores_whitespace_custom_text() {
        let mut sel = CategorySelection::default();
        assert!(sel.is_empty());
        sel.custom_text = "   ".to_string();
        assert!(sel.is_empty());
        sel.modifiers.push("highly detailed".to_string());
        assert!(!sel.is_empty());
    }

    #[test]
    fn selection_deserializes_with_missing_fields() {
        let sel: CategorySelection = serde_json::from_str("{}").unwrap();
        assert!(sel.is_empty());
        assert!((sel.weight.value() - 1.0).abs() < f64::EPSILON);
    }
}
