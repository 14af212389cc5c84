//! Template persistence: UUID-keyed JSON files with linear directory scans.
//!
//! One template per file, named `<id>.json`. Writes are atomic; reads that
//! hit a corrupt file log a warning and skip it. Last write wins - there is
//! deliberately no locking for this single-user tool.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use promptdeck_types::{CategorySelection, Mode, NonEmptyString, Template, TemplateId};

use crate::atomic_write::atomic_write;

#[derive(Debug, Error)]
pub enum TemplateStoreError {
    #[error("failed to create templates directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid template: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("template {id} not found")]
    NotFound { id: TemplateId },
}

/// Everything needed to save a new template.
#[derive(Debug, Clone)]
pub struct TemplateDraft {
    pub name: NonEmptyString,
    pub description: String,
    pub mode: Mode,
    pub categories: BTreeMap<String, CategorySelection>,
    pub generated_prompt: String,
    pub tags: Vec<String>,
}

/// Optional criteria for [`TemplateStore::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateFilter<'a> {
    pub mode: Option<Mode>,
    pub tag: Option<&'a str>,
}

/// Partial update applied by [`TemplateStore::update`]. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    pub name: Option<NonEmptyString>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, TemplateStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| TemplateStoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: TemplateId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn write_template(&self, template: &Template) -> Result<(), TemplateStoreError> {
        let path = self.path_for(template.id);
        let json = serde_json::to_vec_pretty(template).map_err(|source| {
            TemplateStoreError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        atomic_write(&path, &json).map_err(|source| TemplateStoreError::Write { path, source })
    }

    /// Save a new template, returning its freshly generated id.
    pub fn save(&self, draft: TemplateDraft) -> Result<TemplateId, TemplateStoreError> {
        let id = TemplateId::generate();
        let template = Template {
            id,
            name: draft.name.into_inner(),
            description: draft.description,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            mode: draft.mode,
            categories: draft.categories,
            generated_prompt: draft.generated_prompt,
            tags: draft.tags,
        };
        self.write_template(&template)?;
        Ok(id)
    }

    /// Load a template by id. Missing or corrupt files yield `None` (corrupt
    /// files additionally log a warning).
    #[must_use]
    pub fn load(&self, id: TemplateId) -> Option<Template> {
        let path = self.path_for(id);
        if !path.exists() {
            return None;
        }
        Self::read_template(&path)
    }

    fn read_template(path: &Path) -> Option<Template> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read template: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(template) => Some(template),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Skipping corrupt template: {e}");
                None
            }
        }
    }

    /// List templates matching `filter`, newest first.
    #[must_use]
    pub fn list(&self, filter: TemplateFilter<'_>) -> Vec<Template> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), "Failed to scan templates: {e}");
                return Vec::new();
            }
        };

        let mut templates: Vec<Template> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| Self::read_template(&path))
            .filter(|template| filter.mode.is_none_or(|mode| template.mode == mode))
            .filter(|template| filter.tag.is_none_or(|tag| template.has_tag(tag)))
            .collect();

        // RFC 3339 with a fixed precision sorts lexicographically.
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        templates
    }

    /// Delete a template. Returns false if it did not exist or the file
    /// could not be removed.
    pub fn delete(&self, id: TemplateId) -> bool {
        let path = self.path_for(id);
        if !path.exists() {
            return false;
        }
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to delete template: {e}");
                false
            }
        }
    }

    /// Apply a partial update to an existing template (load, modify,
    /// rewrite - last write wins).
    pub fn update(&self, id: TemplateId, update: TemplateUpdate) -> bool {
        let Some(mut template) = self.load(id) else {
            return false;
        };
        if let Some(name) = update.name {
            template.name = name.into_inner();
        }
        if let Some(description) = update.description {
            template.description = description;
        }
        if let Some(tags) = update.tags {
            template.tags = tags;
        }
        match self.write_template(&template) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to update template {id}: {e}");
                false
            }
        }
    }

    /// Copy a template's JSON to an arbitrary path outside the store.
    pub fn export(&self, id: TemplateId, dest: &Path) -> Result<(), TemplateStoreError> {
        let template = self
            .load(id)
            .ok_or(TemplateStoreError::NotFound { id })?;
        let json =
            serde_json::to_vec_pretty(&template).map_err(|source| TemplateStoreError::Parse {
                path: dest.to_path_buf(),
                source,
            })?;
        atomic_write(dest, &json).map_err(|source| TemplateStoreError::Write {
            path: dest.to_path_buf(),
            source,
        })
    }

    /// Import a template file into the store under a fresh id. The source
    /// file's id is never reused.
    pub fn import(&self, src: &Path) -> Result<TemplateId, TemplateStoreError> {
        let raw = fs::read_to_string(src).map_err(|source| TemplateStoreError::Read {
            path: src.to_path_buf(),
            source,
        })?;
        let mut template: Template =
            serde_json::from_str(&raw).map_err(|source| TemplateStoreError::Parse {
                path: src.to_path_buf(),
                source,
            })?;
        template.id = TemplateId::generate();
        self.write_template(&template)?;
        Ok(template.id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use promptdeck_types::{
        CategorySelection, Mode, NonEmptyString, Template, TemplateId, Weight,
    };

    use super::{TemplateDraft, TemplateFilter, TemplateStore, TemplateUpdate};

    fn draft(name: &str, mode: Mode, tags: &[&str]) -> TemplateDraft {
        let mut categories = BTreeMap::new();
        categories.insert(
            "subject".to_string(),
            CategorySelection {
                option_ids: vec!["portrait".to_string()],
                option_labels: vec!["portrait".to_string()],
                custom_text: String::new(),
                modifiers: vec!["highly detailed".to_string()],
                weight: Weight::new(1.2),
            },
        );
        TemplateDraft {
            name: NonEmptyString::new(name).expect("test name"),
            description: "test template".to_string(),
            mode,
            categories,
            generated_prompt: "(portrait), (highly detailed)".to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
        }
    }

    fn write_raw(store: &TemplateStore, name: &str, created_at: &str, mode: Mode, tags: &[&str]) -> TemplateId {
        let id = TemplateId::generate();
        let template = Template {
            id,
            name: name.to_string(),
            description: String::new(),
            created_at: created_at.to_string(),
            mode,
            categories: BTreeMap::new(),
            generated_prompt: String::new(),
            tags: tags.iter().map(ToString::to_string).collect(),
        };
        let json = serde_json::to_vec_pretty(&template).expect("serialize");
        fs::write(store.dir().join(format!("{id}.json")), json).expect("write");
        id
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path().join("templates")).expect("open");

        let id = store.save(draft("moody portrait", Mode::Sfw, &["portrait"])).expect("save");
        let loaded = store.load(id).expect("load");

        assert_eq!(loaded.id, id);
        assert_eq!(loaded.name, "moody portrait");
        assert_eq!(loaded.mode, Mode::Sfw);
        assert_eq!(loaded.categories.len(), 1);
        assert_eq!(loaded.generated_prompt, "(portrait), (highly detailed)");
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path()).expect("open");
        assert!(store.load(TemplateId::generate()).is_none());
    }

    #[test]
    fn list_sorts_newest_first_and_skips_corrupt_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path()).expect("open");

        write_raw(&store, "oldest", "2025-01-01T00:00:00Z", Mode::Sfw, &[]);
        write_raw(&store, "newest", "2025-06-01T00:00:00Z", Mode::Sfw, &[]);
        write_raw(&store, "middle", "2025-03-01T00:00:00Z", Mode::Sfw, &[]);
        fs::write(dir.path().join("broken.json"), "{oops").expect("write corrupt");
        fs::write(dir.path().join("notes.txt"), "not a template").expect("write stray");

        let names: Vec<String> = store
            .list(TemplateFilter::default())
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["newest", "middle", "oldest"]);
    }

    #[test]
    fn list_filters_by_mode_and_tag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path()).expect("open");

        write_raw(&store, "sfw-portrait", "2025-01-01T00:00:00Z", Mode::Sfw, &["portrait"]);
        write_raw(&store, "nsfw-portrait", "2025-01-02T00:00:00Z", Mode::Nsfw, &["portrait"]);
        write_raw(&store, "sfw-landscape", "2025-01-03T00:00:00Z", Mode::Sfw, &["landscape"]);

        let sfw = store.list(TemplateFilter {
            mode: Some(Mode::Sfw),
            tag: None,
        });
        assert_eq!(sfw.len(), 2);

        let portraits = store.list(TemplateFilter {
            mode: None,
            tag: Some("portrait"),
        });
        assert_eq!(portraits.len(), 2);

        let sfw_portraits = store.list(TemplateFilter {
            mode: Some(Mode::Sfw),
            tag: Some("portrait"),
        });
        assert_eq!(sfw_portraits.len(), 1);
        assert_eq!(sfw_portraits[0].name, "sfw-portrait");
    }

    #[test]
    fn delete_removes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path()).expect("open");

        let id = store.save(draft("short lived", Mode::Sfw, &[])).expect("save");
        assert!(store.delete(id));
        assert!(store.load(id).is_none());
        assert!(!store.delete(id), "second delete reports false");
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path()).expect("open");

        let id = store.save(draft("before", Mode::Sfw, &["old"])).expect("save");
        let ok = store.update(
            id,
            TemplateUpdate {
                name: Some(NonEmptyString::new("after").expect("name")),
                description: None,
                tags: Some(vec!["new".to_string()]),
            },
        );
        assert!(ok);

        let loaded = store.load(id).expect("load");
        assert_eq!(loaded.name, "after");
        assert_eq!(loaded.description, "test template");
        assert_eq!(loaded.tags, ["new"]);
    }

    #[test]
    fn update_missing_template_reports_false() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path()).expect("open");
        assert!(!store.update(TemplateId::generate(), TemplateUpdate::default()));
    }

    #[test]
    fn export_then_import_rekeys_the_template() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path().join("templates")).expect("open");

        let id = store.save(draft("shared", Mode::Nsfw, &["shared"])).expect("save");
        let export_path = dir.path().join("shared.json");
        store.export(id, &export_path).expect("export");

        let imported = store.import(&export_path).expect("import");
        assert_ne!(imported, id, "import must generate a fresh id");

        let loaded = store.load(imported).expect("load imported");
        assert_eq!(loaded.name, "shared");
        assert_eq!(loaded.mode, Mode::Nsfw);
        assert_eq!(loaded.id, imported);
    }

    #[test]
    fn import_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::open(dir.path()).expect("open");

        let src = dir.path().join("garbage.json");
        fs::write(&src, "not json at all").expect("write");
        assert!(store.import(&src).is_err());
    }
}
