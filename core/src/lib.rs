//! Core logic for promptdeck - prompt assembly and on-disk stores.
//!
//! No TUI dependencies live here. Everything is synchronous: the stores are
//! single-user, last-write-wins JSON blobs.

mod atomic_write;
mod catalog;
mod prompt;
mod settings;
mod templates;

pub use atomic_write::atomic_write;
pub use catalog::{CatalogSet, CategoryCatalog, OptionEntry};
pub use prompt::PromptAssembler;
pub use settings::{SettingsError, SettingsStore};
pub use templates::{
    TemplateDraft, TemplateFilter, TemplateStore, TemplateStoreError, TemplateUpdate,
};
