//! Per-category editor state: checked options, modifiers, custom text, and
//! the emphasis weight.

use std::collections::HashMap;

use promptdeck_types::{CategorySelection, Mode, Weight};
use promptdeck_core::CategoryCatalog;

use crate::input::DraftInput;

/// Focusable sections inside a category tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Options,
    Modifiers,
    Weight,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::Options, Self::Modifiers, Self::Weight];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Options => "Options",
            Self::Modifiers => "Modifiers",
            Self::Weight => "Weight",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Options => Self::Modifiers,
            Self::Modifiers => Self::Weight,
            Self::Weight => Self::Options,
        }
    }

    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Self::Options => Self::Weight,
            Self::Modifiers => Self::Options,
            Self::Weight => Self::Modifiers,
        }
    }
}

/// Mutable editing state for one category.
#[derive(Debug, Default, Clone)]
pub struct CategoryEditor {
    /// Option ids in the order they were checked.
    checked: Vec<String>,
    /// Modifiers in the order they were checked.
    modifiers: Vec<String>,
    /// Labels carried in by a loaded template, keyed by option id. Consulted
    /// when the live catalog no longer resolves an id, so the saved prompt
    /// keeps rendering even after a catalog change.
    snapshot_labels: HashMap<String, String>,
    pub custom: DraftInput,
    weight: Weight,
    pub options_cursor: usize,
    pub modifiers_cursor: usize,
}

impl CategoryEditor {
    #[must_use]
    pub fn is_checked(&self, option_id: &str) -> bool {
        self.checked.iter().any(|id| id == option_id)
    }

    #[must_use]
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn toggle_option(&mut self, option_id: &str) {
        if let Some(pos) = self.checked.iter().position(|id| id == option_id) {
            self.checked.remove(pos);
        } else {
            self.checked.push(option_id.to_string());
        }
    }

    pub fn toggle_modifier(&mut self, modifier: &str) {
        if let Some(pos) = self.modifiers.iter().position(|m| m == modifier) {
            self.modifiers.remove(pos);
        } else {
            self.modifiers.push(modifier.to_string());
        }
    }

    #[must_use]
    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn weight_up(&mut self) {
        self.weight = self.weight.stepped_up();
    }

    pub fn weight_down(&mut self) {
        self.weight = self.weight.stepped_down();
    }

    /// Drop checked option ids that are not visible in `mode` (used when
    /// switching back to SFW).
    pub fn prune_hidden(&mut self, catalog: &CategoryCatalog, mode: Mode) {
        let visible = catalog.options_for(mode);
        self.checked
            .retain(|id| visible.iter().any(|entry| entry.id == *id));
    }

    /// Snapshot the editor into a selection, resolving labels through the
    /// catalog with the loaded template's labels as fallback. Ids with
    /// neither are kept but contribute no label.
    #[must_use]
    pub fn to_selection(&self, catalog: &CategoryCatalog) -> CategorySelection {
        let option_labels = self
            .checked
            .iter()
            .filter_map(|id| {
                catalog
                    .label_for(id)
                    .map(ToString::to_string)
                    .or_else(|| self.snapshot_labels.get(id).cloned())
            })
            .collect();
        CategorySelection {
            option_ids: self.checked.clone(),
            option_labels,
            custom_text: self.custom.text().to_string(),
            modifiers: self.modifiers.clone(),
            weight: self.weight,
        }
    }

    /// Restore editor state from a saved selection (template load).
    ///
    /// Saved labels pair with ids in order; they were written that way by
    /// `to_selection` when the template was saved.
    pub fn apply_selection(&mut self, selection: &CategorySelection) {
        self.checked = selection.option_ids.clone();
        self.snapshot_labels = selection
            .option_ids
            .iter()
            .cloned()
            .zip(selection.option_labels.iter().cloned())
            .collect();
        self.modifiers = selection.modifiers.clone();
        self.custom.set_text(selection.custom_text.clone());
        self.weight = selection.weight;
        self.options_cursor = 0;
        self.modifiers_cursor = 0;
    }

    pub fn clear(&mut self) {
        self.checked.clear();
        self.snapshot_labels.clear();
        self.modifiers.clear();
        self.custom.clear();
        self.weight = Weight::default();
        self.options_cursor = 0;
        self.modifiers_cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use promptdeck_core::CatalogSet;
    use promptdeck_types::{CategoryKind, CategorySelection, Mode, Weight};

    use super::{CategoryEditor, Section};

    #[test]
    fn section_cycle_is_closed() {
        for section in Section::ALL {
            assert_eq!(section.next().prev(), section);
        }
    }

    #[test]
    fn toggle_option_checks_and_unchecks() {
        let mut editor = CategoryEditor::default();
        editor.toggle_option("portrait");
        assert!(editor.is_checked("portrait"));
        editor.toggle_option("portrait");
        assert!(!editor.is_checked("portrait"));
    }

    #[test]
    fn selection_resolves_labels_from_catalog() {
        let catalogs = CatalogSet::builtin();
        let catalog = catalogs.get(CategoryKind::Subject);

        let mut editor = CategoryEditor::default();
        editor.toggle_option("portrait");
        editor.toggle_option("unknown_id");
        editor.toggle_modifier("candid");

        let selection = editor.to_selection(catalog);
        assert_eq!(selection.option_ids, ["portrait", "unknown_id"]);
        assert_eq!(selection.option_labels, ["portrait"]);
        assert_eq!(selection.modifiers, ["candid"]);
    }

    #[test]
    fn prune_hidden_removes_nsfw_ids_in_sfw_mode() {
        let catalogs = CatalogSet::builtin();
        let catalog = catalogs.get(CategoryKind::Subject);

        let mut editor = CategoryEditor::default();
        editor.toggle_option("portrait");
        editor.toggle_option("artistic_nude");

        editor.prune_hidden(catalog, Mode::Sfw);
        assert!(editor.is_checked("portrait"));
        assert!(!editor.is_checked("artistic_nude"));

        // In NSFW mode nothing would have been pruned.
        let mut editor = CategoryEditor::default();
        editor.toggle_option("artistic_nude");
        editor.prune_hidden(catalog, Mode::Nsfw);
        assert!(editor.is_checked("artistic_nude"));
    }

    #[test]
    fn retired_option_keeps_its_saved_label() {
        let catalogs = CatalogSet::builtin();
        let catalog = catalogs.get(CategoryKind::Subject);

        let saved = CategorySelection {
            option_ids: vec!["retired_option".to_string(), "portrait".to_string()],
            option_labels: vec!["retired label".to_string(), "portrait".to_string()],
            custom_text: String::new(),
            modifiers: Vec::new(),
            weight: Weight::default(),
        };

        let mut editor = CategoryEditor::default();
        editor.apply_selection(&saved);

        let selection = editor.to_selection(catalog);
        assert_eq!(selection.option_labels, ["retired label", "portrait"]);

        // Clearing the editor drops the carried labels too.
        editor.clear();
        editor.toggle_option("retired_option");
        assert!(editor.to_selection(catalog).option_labels.is_empty());
    }

    #[test]
    fn apply_selection_round_trips_through_editor() {
        let catalogs = CatalogSet::builtin();
        let catalog = catalogs.get(CategoryKind::Lighting);

        let mut editor = CategoryEditor::default();
        editor.toggle_option("golden_hour");
        editor.custom.set_text("soft haze");
        editor.weight_up();
        editor.weight_up();

        let selection = editor.to_selection(catalog);

        let mut restored = CategoryEditor::default();
        restored.apply_selection(&selection);
        assert!(restored.is_checked("golden_hour"));
        assert_eq!(restored.custom.text(), "soft haze");
        assert_eq!(restored.weight(), Weight::new(1.2));
    }

    #[test]
    fn clear_resets_everything() {
        let mut editor = CategoryEditor::default();
        editor.toggle_option("portrait");
        editor.toggle_modifier("candid");
        editor.custom.set_text("x");
        editor.weight_down();

        editor.clear();
        assert!(!editor.is_checked("portrait"));
        assert!(!editor.has_modifier("candid"));
        assert_eq!(editor.custom.text(), "");
        assert_eq!(editor.weight(), Weight::default());
    }
}
