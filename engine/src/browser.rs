//! Template browser overlay state.

use promptdeck_core::{TemplateFilter, TemplateStore};
use promptdeck_types::Template;

use crate::input::DraftInput;

/// State behind the templates overlay: the scanned entries, a cursor, and a
/// live name/tag filter.
#[derive(Debug, Default)]
pub struct TemplateBrowser {
    entries: Vec<Template>,
    cursor: usize,
    pub filter: DraftInput,
    pub filter_active: bool,
}

impl TemplateBrowser {
    /// Re-scan the store. Keeps the cursor in range.
    pub fn refresh(&mut self, store: &TemplateStore) {
        self.entries = store.list(TemplateFilter::default());
        self.clamp_cursor();
    }

    /// Entries matching the filter string against name and tags.
    #[must_use]
    pub fn visible(&self) -> Vec<&Template> {
        let needle = self.filter.text().trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|template| {
                template.name.to_lowercase().contains(&needle)
                    || template
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            })
            .collect()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Template> {
        self.visible().get(self.cursor).copied()
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let len = self.visible().len();
        if len > 0 && self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    /// Call after the filter text changes.
    pub fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use promptdeck_types::{Mode, Template, TemplateId};

    use super::TemplateBrowser;

    fn template(name: &str, tags: &[&str]) -> Template {
        Template {
            id: TemplateId::generate(),
            name: name.to_string(),
            description: String::new(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            mode: Mode::Sfw,
            categories: BTreeMap::new(),
            generated_prompt: String::new(),
            tags: tags.iter().map(ToString::to_string).collect(),
        }
    }

    fn browser_with(entries: Vec<Template>) -> TemplateBrowser {
        let mut browser = TemplateBrowser::default();
        browser.entries = entries;
        browser
    }

    #[test]
    fn filter_matches_name_and_tags() {
        let mut browser = browser_with(vec![
            template("Moody portrait", &["noir"]),
            template("Sunny landscape", &["outdoors"]),
        ]);

        browser.filter.set_text("noir");
        let visible = browser.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Moody portrait");

        browser.filter.set_text("LANDSCAPE");
        assert_eq!(browser.visible().len(), 1);
    }

    #[test]
    fn cursor_clamps_when_filter_shrinks_list() {
        let mut browser = browser_with(vec![
            template("alpha", &[]),
            template("beta", &[]),
            template("gamma", &[]),
        ]);
        browser.move_down();
        browser.move_down();
        assert_eq!(browser.cursor(), 2);

        browser.filter.set_text("alpha");
        browser.clamp_cursor();
        assert_eq!(browser.cursor(), 0);
        assert_eq!(browser.selected().map(|t| t.name.as_str()), Some("alpha"));
    }

    #[test]
    fn move_down_stops_at_last_entry() {
        let mut browser = browser_with(vec![template("only", &[])]);
        browser.move_down();
        browser.move_down();
        assert_eq!(browser.cursor(), 0);
    }

    #[test]
    fn selected_none_when_empty() {
        let browser = TemplateBrowser::default();
        assert!(browser.selected().is_none());
    }
}
