//! Application state machine for promptdeck.
//!
//! This crate contains the App state without TUI dependencies: category
//! editors, the prompt assembler, template and settings stores, input modes,
//! and command processing. The TUI crate renders this state and feeds key
//! events back into it.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::Value;

pub use promptdeck_core::{
    CatalogSet, CategoryCatalog, OptionEntry, PromptAssembler, SettingsStore, TemplateDraft,
    TemplateFilter, TemplateStore, TemplateUpdate,
};
pub use promptdeck_types::{
    CategoryKind, CategorySelection, Mode, NonEmptyString, PromptStats, Template, TemplateId,
    Weight, truncate_with_ellipsis,
};

mod browser;
mod commands;
mod editor;
mod input;

pub use browser::TemplateBrowser;
pub use commands::{CommandSpec, command_help_summary, command_specs};
pub use editor::{CategoryEditor, Section};
pub use input::{DraftInput, InputMode};

use commands::Command;

// ============================================================================
// Paths
// ============================================================================

/// Where promptdeck keeps its state on disk.
///
/// Defaults to `~/.promptdeck`; `PROMPTDECK_HOME` overrides it (useful for
/// tests and portable setups).
#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    #[must_use]
    pub fn resolve() -> Self {
        if let Ok(dir) = env::var("PROMPTDECK_HOME") {
            return Self::from_dir(dir);
        }
        let data_dir = dirs::home_dir()
            .map(|home| home.join(".promptdeck"))
            .unwrap_or_else(|| PathBuf::from(".promptdeck"));
        Self { data_dir }
    }

    #[must_use]
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn templates_dir(&self) -> PathBuf {
        self.data_dir.join("templates")
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    #[must_use]
    pub fn categories_dir(&self) -> PathBuf {
        self.data_dir.join("categories")
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

// ============================================================================
// Status line
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone)]
struct StatusLine {
    text: String,
    severity: StatusSeverity,
    set_at: Instant,
}

const STATUS_TTL: Duration = Duration::from_secs(5);

/// UI toggles sourced from settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    assembler: PromptAssembler,
    catalogs: CatalogSet,
    templates: TemplateStore,
    settings: SettingsStore,
    editors: [CategoryEditor; 6],
    active_category: usize,
    section: Section,
    input: InputMode,
    command_draft: DraftInput,
    save_draft: DraftInput,
    browser: TemplateBrowser,
    // Created on first copy; kept so the clipboard contents outlive the call
    // on platforms where the selection is tied to the owning handle.
    clipboard: Option<arboard::Clipboard>,
    recent: Vec<Template>,
    preview: String,
    stats: PromptStats,
    status: Option<StatusLine>,
    should_quit: bool,
}

impl App {
    pub fn new(paths: &AppPaths) -> anyhow::Result<Self> {
        let settings = SettingsStore::open(paths.settings_file());
        let catalogs = CatalogSet::load(&paths.categories_dir());
        let templates = TemplateStore::open(paths.templates_dir())?;

        let mut assembler = PromptAssembler::new();
        let mode = settings
            .get_str("prompt.default_mode", "SFW")
            .parse()
            .unwrap_or_default();
        assembler.set_mode(mode);
        assembler.set_separator(settings.get_str("prompt.separator", ", ").to_string());

        let stats = assembler.stats();
        let mut app = Self {
            assembler,
            catalogs,
            templates,
            settings,
            editors: Default::default(),
            active_category: 0,
            section: Section::default(),
            input: InputMode::default(),
            command_draft: DraftInput::default(),
            save_draft: DraftInput::default(),
            browser: TemplateBrowser::default(),
            clipboard: None,
            recent: Vec::new(),
            preview: String::new(),
            stats,
            status: None,
            should_quit: false,
        };
        app.refresh_recent();
        app.set_status("Ready");
        Ok(app)
    }

    /// Advance time-based state (status expiry).
    pub fn tick(&mut self) {
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.set_at.elapsed() > STATUS_TTL)
        {
            self.status = None;
        }
    }

    // ------------------------------------------------------------------
    // Read accessors for rendering
    // ------------------------------------------------------------------

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.input
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.assembler.mode()
    }

    #[must_use]
    pub fn active_category(&self) -> CategoryKind {
        CategoryKind::ALL[self.active_category]
    }

    #[must_use]
    pub fn active_category_index(&self) -> usize {
        self.active_category
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn preview(&self) -> &str {
        &self.preview
    }

    #[must_use]
    pub fn stats(&self) -> PromptStats {
        self.stats
    }

    /// True when the assembled prompt exceeds `prompt.max_prompt_length`.
    #[must_use]
    pub fn prompt_over_limit(&self) -> bool {
        let max = self.settings.get_u64("prompt.max_prompt_length", 1000) as usize;
        self.stats.length > max
    }

    #[must_use]
    pub fn status(&self) -> Option<(&str, StatusSeverity)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.severity))
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        UiOptions {
            ascii_only: self.settings.get_bool("ui.ascii_only", false),
            high_contrast: self.settings.get_bool("ui.high_contrast", false),
            reduced_motion: self.settings.get_bool("ui.reduced_motion", false),
        }
    }

    #[must_use]
    pub fn editor(&self, kind: CategoryKind) -> &CategoryEditor {
        &self.editors[Self::index_of(kind)]
    }

    /// Options visible for the active category, with checked flags.
    #[must_use]
    pub fn visible_options(&self) -> Vec<(&OptionEntry, bool)> {
        let kind = self.active_category();
        let editor = self.editor(kind);
        self.catalogs
            .get(kind)
            .options_for(self.assembler.mode())
            .into_iter()
            .map(|entry| (entry, editor.is_checked(&entry.id)))
            .collect()
    }

    /// Modifiers for the active category, with checked flags.
    #[must_use]
    pub fn visible_modifiers(&self) -> Vec<(&str, bool)> {
        let kind = self.active_category();
        let editor = self.editor(kind);
        self.catalogs
            .get(kind)
            .common_modifiers()
            .iter()
            .map(|modifier| (modifier.as_str(), editor.has_modifier(modifier)))
            .collect()
    }

    #[must_use]
    pub fn command_draft(&self) -> &DraftInput {
        &self.command_draft
    }

    #[must_use]
    pub fn save_draft(&self) -> &DraftInput {
        &self.save_draft
    }

    #[must_use]
    pub fn browser(&self) -> &TemplateBrowser {
        &self.browser
    }

    /// Most recent templates for the side panel, capped by
    /// `templates.max_recent`.
    #[must_use]
    pub fn recent_templates(&self) -> &[Template] {
        &self.recent
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    // ------------------------------------------------------------------
    // Status helpers
    // ------------------------------------------------------------------

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            severity: StatusSeverity::Info,
            set_at: Instant::now(),
        });
    }

    pub fn set_status_warning(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            severity: StatusSeverity::Warning,
            set_at: Instant::now(),
        });
    }

    // ------------------------------------------------------------------
    // Category navigation and editing (Normal mode)
    // ------------------------------------------------------------------

    pub fn next_category(&mut self) {
        self.active_category = (self.active_category + 1) % CategoryKind::ALL.len();
        self.section = Section::Options;
    }

    pub fn prev_category(&mut self) {
        let len = CategoryKind::ALL.len();
        self.active_category = (self.active_category + len - 1) % len;
        self.section = Section::Options;
    }

    pub fn select_category(&mut self, index: usize) {
        if index < CategoryKind::ALL.len() {
            self.active_category = index;
            self.section = Section::Options;
        }
    }

    pub fn next_section(&mut self) {
        self.section = self.section.next();
    }

    pub fn prev_section(&mut self) {
        self.section = self.section.prev();
    }

    pub fn cursor_up(&mut self) {
        let section = self.section;
        let editor = self.active_editor_mut();
        match section {
            Section::Options => editor.options_cursor = editor.options_cursor.saturating_sub(1),
            Section::Modifiers => {
                editor.modifiers_cursor = editor.modifiers_cursor.saturating_sub(1);
            }
            Section::Weight => {}
        }
    }

    pub fn cursor_down(&mut self) {
        let options_len = self.visible_options().len();
        let modifiers_len = self.visible_modifiers().len();
        let section = self.section;
        let editor = self.active_editor_mut();
        match section {
            Section::Options => {
                if options_len > 0 && editor.options_cursor + 1 < options_len {
                    editor.options_cursor += 1;
                }
            }
            Section::Modifiers => {
                if modifiers_len > 0 && editor.modifiers_cursor + 1 < modifiers_len {
                    editor.modifiers_cursor += 1;
                }
            }
            Section::Weight => {}
        }
    }

    /// Toggle the checkbox under the cursor in the focused section.
    pub fn toggle_current(&mut self) {
        match self.section {
            Section::Options => {
                let cursor = self.editor(self.active_category()).options_cursor;
                let id = self
                    .visible_options()
                    .get(cursor)
                    .map(|(entry, _)| entry.id.clone());
                if let Some(id) = id {
                    self.active_editor_mut().toggle_option(&id);
                    self.sync_active();
                }
            }
            Section::Modifiers => {
                let cursor = self.editor(self.active_category()).modifiers_cursor;
                let modifier = self
                    .visible_modifiers()
                    .get(cursor)
                    .map(|(modifier, _)| (*modifier).to_string());
                if let Some(modifier) = modifier {
                    self.active_editor_mut().toggle_modifier(&modifier);
                    self.sync_active();
                }
            }
            Section::Weight => {}
        }
    }

    pub fn weight_up(&mut self) {
        self.active_editor_mut().weight_up();
        self.sync_active();
    }

    pub fn weight_down(&mut self) {
        self.active_editor_mut().weight_down();
        self.sync_active();
    }

    /// Flip between SFW and NSFW. Dropping back to SFW prunes any checked
    /// options that are no longer visible.
    pub fn toggle_mode(&mut self) {
        let mode = self.assembler.mode().toggled();
        self.assembler.set_mode(mode);
        if mode == Mode::Sfw {
            for kind in CategoryKind::ALL {
                self.editors[Self::index_of(kind)].prune_hidden(self.catalogs.get(kind), mode);
            }
        }
        // Cursors may now point past the end of a shorter option list.
        for kind in CategoryKind::ALL {
            let visible = self
                .catalogs
                .get(kind)
                .options_for(mode)
                .len()
                .saturating_sub(1);
            let editor = &mut self.editors[Self::index_of(kind)];
            editor.options_cursor = editor.options_cursor.min(visible);
        }
        self.sync_all();
        self.set_status(format!("Switched to {mode} mode"));
    }

    pub fn clear_all(&mut self) {
        for editor in &mut self.editors {
            editor.clear();
        }
        self.assembler.clear();
        self.refresh_preview();
        self.set_status("All selections cleared");
    }

    // ------------------------------------------------------------------
    // Insert mode (custom text)
    // ------------------------------------------------------------------

    pub fn begin_insert(&mut self) {
        self.input = InputMode::Insert;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.active_editor_mut().custom.enter_char(ch);
        self.sync_active();
    }

    pub fn insert_text(&mut self, text: &str) {
        self.active_editor_mut().custom.enter_text(text);
        self.sync_active();
    }

    pub fn insert_backspace(&mut self) {
        self.active_editor_mut().custom.delete_char();
        self.sync_active();
    }

    pub fn insert_delete_forward(&mut self) {
        self.active_editor_mut().custom.delete_char_forward();
        self.sync_active();
    }

    pub fn insert_delete_word(&mut self) {
        self.active_editor_mut().custom.delete_word_backwards();
        self.sync_active();
    }

    pub fn insert_cursor_left(&mut self) {
        self.active_editor_mut().custom.move_cursor_left();
    }

    pub fn insert_cursor_right(&mut self) {
        self.active_editor_mut().custom.move_cursor_right();
    }

    pub fn leave_insert(&mut self) {
        self.input = InputMode::Normal;
    }

    // ------------------------------------------------------------------
    // Command mode
    // ------------------------------------------------------------------

    pub fn begin_command(&mut self) {
        self.command_draft.clear();
        self.input = InputMode::Command;
    }

    pub fn command_char(&mut self, ch: char) {
        self.command_draft.enter_char(ch);
    }

    pub fn command_backspace(&mut self) {
        self.command_draft.delete_char();
    }

    pub fn cancel_command(&mut self) {
        self.command_draft.clear();
        self.input = InputMode::Normal;
    }

    pub fn submit_command(&mut self) {
        let raw = self.command_draft.take_text();
        self.input = InputMode::Normal;
        self.run_command(&raw);
    }

    pub fn run_command(&mut self, raw: &str) {
        match Command::parse(raw) {
            Command::Quit => self.should_quit = true,
            Command::Clear => self.clear_all(),
            Command::Copy => self.copy_prompt(),
            Command::Mode(Some(mode)) => {
                if mode != self.assembler.mode() {
                    self.toggle_mode();
                }
            }
            Command::Mode(None) => self.set_status_warning("Usage: mode <sfw|nsfw>"),
            Command::Save(Some(name)) => self.save_template_named(&name),
            Command::Save(None) => self.set_status_warning("Usage: save <name>"),
            Command::Export(Some(path)) => self.export_prompt(&path),
            Command::Export(None) => self.set_status_warning("Usage: export <path>"),
            Command::Import(Some(path)) => self.import_template(&path),
            Command::Import(None) => self.set_status_warning("Usage: import <path>"),
            Command::Set { key, value } => self.apply_setting(&key, value),
            Command::Help => self.set_status(command_help_summary()),
            Command::Unknown(cmd) => {
                self.set_status_warning(format!("Unknown command: {cmd}"));
            }
            Command::Empty => {}
        }
    }

    // ------------------------------------------------------------------
    // Save-template modal
    // ------------------------------------------------------------------

    pub fn begin_save_template(&mut self) {
        if self.preview.trim().is_empty() {
            self.set_status_warning("No prompt to save - make some selections first");
            return;
        }
        self.save_draft.clear();
        self.input = InputMode::SaveTemplate;
    }

    pub fn save_char(&mut self, ch: char) {
        self.save_draft.enter_char(ch);
    }

    pub fn save_backspace(&mut self) {
        self.save_draft.delete_char();
    }

    pub fn cancel_save(&mut self) {
        self.save_draft.clear();
        self.input = InputMode::Normal;
    }

    pub fn confirm_save(&mut self) {
        let name = self.save_draft.take_text();
        self.input = InputMode::Normal;
        self.save_template_named(&name);
    }

    fn save_template_named(&mut self, name: &str) {
        if self.preview.trim().is_empty() {
            self.set_status_warning("No prompt to save - make some selections first");
            return;
        }
        let Ok(name) = NonEmptyString::new(name) else {
            self.set_status_warning("Template name must not be empty");
            return;
        };

        let categories: BTreeMap<String, CategorySelection> = self
            .assembler
            .selections()
            .filter(|(_, sel)| !sel.is_empty())
            .map(|(key, sel)| (key.to_string(), sel.clone()))
            .collect();

        let draft = TemplateDraft {
            name: name.clone(),
            description: String::new(),
            mode: self.assembler.mode(),
            categories,
            generated_prompt: self.preview.clone(),
            tags: Vec::new(),
        };

        match self.templates.save(draft) {
            Ok(id) => {
                tracing::info!(%id, name = name.as_str(), "Template saved");
                self.refresh_recent();
                self.set_status(format!("Template '{name}' saved"));
            }
            Err(e) => {
                tracing::warn!("Failed to save template: {e}");
                self.set_status_warning(format!("Failed to save template: {e}"));
            }
        }
    }

    // ------------------------------------------------------------------
    // Template browser
    // ------------------------------------------------------------------

    pub fn open_templates(&mut self) {
        self.browser.refresh(&self.templates);
        if self.browser.is_empty() {
            self.set_status("No templates saved yet");
            return;
        }
        self.input = InputMode::Templates;
    }

    pub fn close_templates(&mut self) {
        self.browser.filter.clear();
        self.browser.filter_active = false;
        self.input = InputMode::Normal;
    }

    pub fn browser_mut(&mut self) -> &mut TemplateBrowser {
        &mut self.browser
    }

    pub fn load_selected_template(&mut self) {
        let Some(template) = self.browser.selected().cloned() else {
            return;
        };
        self.close_templates();
        self.apply_template(&template);
    }

    pub fn delete_selected_template(&mut self) {
        let Some(template) = self.browser.selected().cloned() else {
            return;
        };
        if self.templates.delete(template.id) {
            self.set_status(format!("Deleted template '{}'", template.name));
        } else {
            self.set_status_warning(format!("Failed to delete template '{}'", template.name));
        }
        self.refresh_recent();
        self.browser.refresh(&self.templates);
        if self.browser.is_empty() {
            self.close_templates();
        }
    }

    /// Restore the full selection state captured in a template.
    pub fn apply_template(&mut self, template: &Template) {
        for editor in &mut self.editors {
            editor.clear();
        }
        self.assembler.clear();
        self.assembler.set_mode(template.mode);

        for (key, selection) in &template.categories {
            if let Some(kind) = CategoryKind::from_key(key) {
                self.editors[Self::index_of(kind)].apply_selection(selection);
            } else {
                // Categories this build does not know about still render.
                self.assembler.set_selection(key.clone(), selection.clone());
            }
        }
        self.sync_all();
        self.set_status(format!("Template '{}' loaded", template.name));
    }

    // ------------------------------------------------------------------
    // Clipboard / export / import
    // ------------------------------------------------------------------

    pub fn copy_prompt(&mut self) {
        if self.preview.trim().is_empty() {
            self.set_status("No prompt to copy");
            return;
        }
        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    tracing::warn!("Clipboard unavailable: {e}");
                    self.set_status_warning(format!("Clipboard unavailable: {e}"));
                    return;
                }
            }
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };
        match clipboard.set_text(self.preview.clone()) {
            Ok(()) => self.set_status("Prompt copied to clipboard"),
            Err(e) => {
                tracing::warn!("Clipboard write failed: {e}");
                self.set_status_warning(format!("Clipboard write failed: {e}"));
                // A stale handle can outlive its display connection; retry
                // with a fresh one on the next copy.
                self.clipboard = None;
            }
        }
    }

    pub fn export_prompt(&mut self, path: &Path) {
        if self.preview.trim().is_empty() {
            self.set_status_warning("No prompt to export");
            return;
        }
        match promptdeck_core::atomic_write(path, self.preview.as_bytes()) {
            Ok(()) => self.set_status(format!("Prompt exported to {}", path.display())),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Prompt export failed: {e}");
                self.set_status_warning(format!("Export failed: {e}"));
            }
        }
    }

    pub fn import_template(&mut self, path: &Path) {
        match self.templates.import(path) {
            Ok(id) => {
                tracing::info!(%id, "Template imported");
                self.refresh_recent();
                self.set_status(format!("Template imported as {id}"));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Template import failed: {e}");
                self.set_status_warning(format!("Import failed: {e}"));
            }
        }
    }

    fn apply_setting(&mut self, key: &str, value: Value) {
        // Apply live side effects before persisting.
        if key == "prompt.separator" {
            if let Some(separator) = value.as_str() {
                self.assembler.set_separator(separator.to_string());
                self.refresh_preview();
            }
        }
        match self.settings.set(key, value) {
            Ok(()) => self.set_status(format!("Set {key}")),
            Err(e) => {
                tracing::warn!("Failed to persist setting {key}: {e}");
                self.set_status_warning(format!("Failed to save setting: {e}"));
            }
        }
    }

    // ------------------------------------------------------------------
    // Internal plumbing
    // ------------------------------------------------------------------

    fn index_of(kind: CategoryKind) -> usize {
        CategoryKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0)
    }

    fn active_editor_mut(&mut self) -> &mut CategoryEditor {
        &mut self.editors[self.active_category]
    }

    /// Push the active category's editor state into the assembler and
    /// refresh the preview.
    fn sync_active(&mut self) {
        self.sync_category(self.active_category());
        self.refresh_preview();
    }

    fn sync_all(&mut self) {
        for kind in CategoryKind::ALL {
            self.sync_category(kind);
        }
        self.refresh_preview();
    }

    fn sync_category(&mut self, kind: CategoryKind) {
        let selection = self.editors[Self::index_of(kind)].to_selection(self.catalogs.get(kind));
        if selection.is_empty() {
            self.assembler.remove_selection(kind.key());
        } else {
            self.assembler.set_selection(kind.key(), selection);
        }
    }

    fn refresh_preview(&mut self) {
        self.preview = self.assembler.assemble();
        self.stats = self.assembler.stats();
    }

    fn refresh_recent(&mut self) {
        let max = self.settings.get_u64("templates.max_recent", 10) as usize;
        let mut entries = self.templates.list(TemplateFilter::default());
        entries.truncate(max);
        self.recent = entries;
    }
}
