//! Prompt assembly: ordered concatenation of category fragments with
//! weight-bracket decoration.

use promptdeck_types::{CategoryKind, CategorySelection, Mode, PromptStats};

const DEFAULT_SEPARATOR: &str = ", ";

/// Combines per-category selections into the final prompt string.
///
/// The six fixed categories always render in [`CategoryKind::ALL`] order;
/// any other keys (typically carried in by imported templates) render after
/// them in insertion order.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    // Insertion-ordered; small enough that linear scans beat a map.
    selections: Vec<(String, CategorySelection)>,
    mode: Mode,
    separator: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selections: Vec::new(),
            mode: Mode::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn set_selection(&mut self, key: impl Into<String>, selection: CategorySelection) {
        let key = key.into();
        if let Some(slot) = self.selections.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = selection;
        } else {
            self.selections.push((key, selection));
        }
    }

    pub fn remove_selection(&mut self, key: &str) {
        self.selections.retain(|(k, _)| k != key);
    }

    #[must_use]
    pub fn selection(&self, key: &str) -> Option<&CategorySelection> {
        self.selections
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, sel)| sel)
    }

    /// All current selections in assembly order.
    pub fn selections(&self) -> impl Iterator<Item = (&str, &CategorySelection)> {
        let fixed = CategoryKind::ALL.iter().filter_map(|kind| {
            self.selection(kind.key())
                .map(|sel| (kind.key(), sel))
        });
        let extras = self
            .selections
            .iter()
            .filter(|(key, _)| CategoryKind::from_key(key).is_none())
            .map(|(key, sel)| (key.as_str(), sel));
        fixed.chain(extras)
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = separator.into();
    }

    /// Build the final prompt from the current selections.
    #[must_use]
    pub fn assemble(&self) -> String {
        let fragments: Vec<String> = self
            .selections()
            .map(|(_, sel)| format_fragment(sel, &self.separator))
            .filter(|fragment| !fragment.is_empty())
            .collect();
        fragments.join(&self.separator)
    }

    #[must_use]
    pub fn stats(&self) -> PromptStats {
        let prompt = self.assemble();
        PromptStats {
            length: prompt.chars().count(),
            word_count: prompt.split_whitespace().count(),
            categories_used: self
                .selections
                .iter()
                .filter(|(_, sel)| !sel.is_empty())
                .count(),
            mode: self.mode,
        }
    }
}

/// Render one category's fragment: option labels, then custom text, then
/// modifiers. Weight above 1.0 wraps each part in `( )`, below 1.0 in `[ ]`.
fn format_fragment(selection: &CategorySelection, separator: &str) -> String {
    let mut parts: Vec<&str> = selection
        .option_labels
        .iter()
        .map(String::as_str)
        .collect();

    let custom = selection.custom_text.trim();
    if !custom.is_empty() {
        parts.push(custom);
    }
    parts.extend(selection.modifiers.iter().map(String::as_str));

    if parts.is_empty() {
        return String::new();
    }

    let decorated: Vec<String> = if selection.weight.is_emphasized() {
        parts.into_iter().map(|part| format!("({part})")).collect()
    } else if selection.weight.is_deemphasized() {
        parts.into_iter().map(|part| format!("[{part}]")).collect()
    } else {
        parts.into_iter().map(str::to_string).collect()
    };

    decorated.join(separator)
}

#[cfg(test)]
mod tests {
    use promptdeck_types::{CategorySelection, Mode, Weight};

    use super::PromptAssembler;

    fn selection(labels: &[&str], custom: &str, modifiers: &[&str], weight: f64) -> CategorySelection {
        CategorySelection {
            option_ids: labels.iter().map(|l| l.to_lowercase()).collect(),
            option_labels: labels.iter().map(ToString::to_string).collect(),
            custom_text: custom.to_string(),
            modifiers: modifiers.iter().map(ToString::to_string).collect(),
            weight: Weight::new(weight),
        }
    }

    #[test]
    fn empty_assembler_produces_empty_prompt() {
        let assembler = PromptAssembler::new();
        assert_eq!(assembler.assemble(), "");
        assert_eq!(assembler.stats().word_count, 0);
    }

    #[test]
    fn fragments_follow_fixed_category_order() {
        let mut assembler = PromptAssembler::new();
        // Inserted out of order on purpose.
        assembler.set_selection("lighting", selection(&["golden hour"], "", &[], 1.0));
        assembler.set_selection("subject", selection(&["portrait"], "", &[], 1.0));
        assembler.set_selection("style", selection(&["oil painting"], "", &[], 1.0));

        assert_eq!(assembler.assemble(), "portrait, oil painting, golden hour");
    }

    #[test]
    fn unknown_categories_append_after_fixed_ones() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection("palette", selection(&["teal and orange"], "", &[], 1.0));
        assembler.set_selection("subject", selection(&["portrait"], "", &[], 1.0));

        assert_eq!(assembler.assemble(), "portrait, teal and orange");
    }

    #[test]
    fn fragment_orders_labels_custom_then_modifiers() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection(
            "subject",
            selection(&["adult"], "  weathered sailor  ", &["highly detailed"], 1.0),
        );

        assert_eq!(
            assembler.assemble(),
            "adult, weathered sailor, highly detailed"
        );
    }

    #[test]
    fn emphasized_weight_wraps_each_part_in_parens() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection(
            "subject",
            selection(&["portrait"], "", &["sharp focus"], 1.2),
        );

        assert_eq!(assembler.assemble(), "(portrait), (sharp focus)");
    }

    #[test]
    fn deemphasized_weight_wraps_each_part_in_brackets() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection("environment", selection(&["city street"], "", &[], 0.8));

        assert_eq!(assembler.assemble(), "[city street]");
    }

    #[test]
    fn neutral_weight_leaves_parts_bare() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection("style", selection(&["watercolor"], "", &[], 1.0));

        assert_eq!(assembler.assemble(), "watercolor");
    }

    #[test]
    fn empty_selections_are_skipped_between_fragments() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection("subject", selection(&["portrait"], "", &[], 1.0));
        assembler.set_selection("style", selection(&[], "   ", &[], 1.4));
        assembler.set_selection("technical", selection(&["85mm"], "", &[], 1.0));

        assert_eq!(assembler.assemble(), "portrait, 85mm");
    }

    #[test]
    fn custom_separator_applies_within_and_between_fragments() {
        let mut assembler = PromptAssembler::new();
        assembler.set_separator(" | ");
        assembler.set_selection("subject", selection(&["portrait"], "", &["moody"], 1.0));
        assembler.set_selection("style", selection(&["noir"], "", &[], 1.0));

        assert_eq!(assembler.assemble(), "portrait | moody | noir");
    }

    #[test]
    fn replacing_a_selection_overwrites_in_place() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection("subject", selection(&["portrait"], "", &[], 1.0));
        assembler.set_selection("subject", selection(&["landscape"], "", &[], 1.0));

        assert_eq!(assembler.assemble(), "landscape");
        assert_eq!(assembler.stats().categories_used, 1);
    }

    #[test]
    fn stats_reflect_prompt_and_mode() {
        let mut assembler = PromptAssembler::new();
        assembler.set_mode(Mode::Nsfw);
        assembler.set_selection("subject", selection(&["portrait"], "", &["sharp focus"], 1.0));

        let stats = assembler.stats();
        assert_eq!(stats.mode, Mode::Nsfw);
        assert_eq!(stats.word_count, 3);
        assert_eq!(stats.length, "portrait, sharp focus".chars().count());
        assert_eq!(stats.categories_used, 1);
    }

    #[test]
    fn clear_removes_everything() {
        let mut assembler = PromptAssembler::new();
        assembler.set_selection("subject", selection(&["portrait"], "", &[], 1.0));
        assembler.clear();

        assert_eq!(assembler.assemble(), "");
        assert!(assembler.selection("subject").is_none());
    }
}
