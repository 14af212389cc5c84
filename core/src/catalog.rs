//! Category option catalogs.
//!
//! Each category ships with a built-in catalog embedded at compile time.
//! Users can override a category by dropping a `<key>.json` file into the
//! data directory; a file that fails to parse logs a warning and the
//! built-in catalog stays in effect.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use promptdeck_types::{CategoryKind, Mode};

/// One checkable option in a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionEntry {
    pub id: String,
    pub label: String,
}

/// Options and modifiers available for one category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryCatalog {
    #[serde(default)]
    sfw_options: Vec<OptionEntry>,
    #[serde(default)]
    nsfw_options: Vec<OptionEntry>,
    #[serde(default)]
    common_modifiers: Vec<String>,
}

impl CategoryCatalog {
    /// Options visible in the given mode. NSFW mode shows the SFW options
    /// followed by the NSFW-only ones.
    #[must_use]
    pub fn options_for(&self, mode: Mode) -> Vec<&OptionEntry> {
        match mode {
            Mode::Sfw => self.sfw_options.iter().collect(),
            Mode::Nsfw => self.sfw_options.iter().chain(&self.nsfw_options).collect(),
        }
    }

    #[must_use]
    pub fn common_modifiers(&self) -> &[String] {
        &self.common_modifiers
    }

    /// Resolve an option id to its display label, searching both option sets.
    #[must_use]
    pub fn label_for(&self, id: &str) -> Option<&str> {
        self.sfw_options
            .iter()
            .chain(&self.nsfw_options)
            .find(|entry| entry.id == id)
            .map(|entry| entry.label.as_str())
    }
}

/// Built-in catalog JSON, one asset per category.
fn builtin_json(kind: CategoryKind) -> &'static str {
    match kind {
        CategoryKind::Subject => include_str!("../assets/categories/subject.json"),
        CategoryKind::Style => include_str!("../assets/categories/style.json"),
        CategoryKind::Composition => include_str!("../assets/categories/composition.json"),
        CategoryKind::Environment => include_str!("../assets/categories/environment.json"),
        CategoryKind::Lighting => include_str!("../assets/categories/lighting.json"),
        CategoryKind::Technical => include_str!("../assets/categories/technical.json"),
    }
}

/// The full set of per-category catalogs.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    catalogs: HashMap<CategoryKind, CategoryCatalog>,
}

impl CatalogSet {
    /// Catalogs from the embedded assets only.
    #[must_use]
    pub fn builtin() -> Self {
        let catalogs = CategoryKind::ALL
            .into_iter()
            .map(|kind| {
                let catalog = serde_json::from_str(builtin_json(kind))
                    .expect("embedded category catalog is valid JSON");
                (kind, catalog)
            })
            .collect();
        Self { catalogs }
    }

    /// Built-in catalogs with per-category overrides from `dir`, if present.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let mut set = Self::builtin();
        for kind in CategoryKind::ALL {
            let path = dir.join(format!("{}.json", kind.key()));
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(raw) => match serde_json::from_str::<CategoryCatalog>(&raw) {
                    Ok(catalog) => {
                        set.catalogs.insert(kind, catalog);
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            "Ignoring unparseable catalog override: {e}"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        "Failed to read catalog override: {e}"
                    );
                }
            }
        }
        set
    }

    #[must_use]
    pub fn get(&self, kind: CategoryKind) -> &CategoryCatalog {
        &self.catalogs[&kind]
    }
}
