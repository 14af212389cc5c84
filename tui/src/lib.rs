//! TUI rendering for promptdeck using ratatui.

mod input;
mod theme;

pub use input::handle_events;
pub use theme::{Glyphs, Palette, glyphs, palette, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use promptdeck_engine::{
    App, CategoryKind, DraftInput, InputMode, Section, StatusSeverity, command_specs,
    truncate_with_ellipsis,
};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Category tabs + description
            Constraint::Min(8),    // Editor panels
            Constraint::Length(6), // Prompt preview
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_tabs(frame, app, chunks[0], &palette);
    draw_editor(frame, app, chunks[1], &palette, &glyphs);
    draw_preview(frame, app, chunks[2], &palette);
    draw_status_bar(frame, app, chunks[3], &palette);

    match app.input_mode() {
        InputMode::Command => draw_command_palette(frame, app, &palette),
        InputMode::SaveTemplate => draw_save_modal(frame, app, &palette),
        InputMode::Templates => draw_templates_overlay(frame, app, &palette, &glyphs),
        InputMode::Normal | InputMode::Insert => {}
    }
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let mut spans: Vec<Span> = Vec::new();
    for (index, kind) in CategoryKind::ALL.into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(palette.bg_border)));
        }
        let style = if index == app.active_category_index() {
            styles::tab_active(palette)
        } else {
            styles::tab_inactive(palette)
        };
        spans.push(Span::styled(format!("{} {}", index + 1, kind.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    let description = Paragraph::new(app.active_category().description())
        .style(Style::default().fg(palette.text_muted));
    frame.render_widget(description, rows[1]);
}

fn draw_editor(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Options
            Constraint::Length(3), // Custom text
            Constraint::Length(3), // Weight
        ])
        .split(columns[0]);

    draw_options(frame, app, left[0], palette, glyphs);
    draw_custom_text(frame, app, left[1], palette);
    draw_weight(frame, app, left[2], palette, glyphs);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(7)])
        .split(columns[1]);

    draw_modifiers(frame, app, right[0], palette, glyphs);
    draw_recent_templates(frame, app, right[1], palette, glyphs);
}

fn section_block<'a>(
    title: &'a str,
    focused: bool,
    palette: &Palette,
) -> Block<'a> {
    let border_style = if focused {
        styles::section_focused(palette)
    } else {
        Style::default().fg(palette.bg_border)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .style(Style::default().bg(palette.bg_panel))
}

fn draw_options(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let focused = app.section() == Section::Options;
    let block = section_block("Options", focused, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = app.editor(app.active_category()).options_cursor;
    let entries = app.visible_options();

    // Keep the cursor row on screen in cramped terminals.
    let visible_rows = inner.height as usize;
    let scroll = cursor.saturating_sub(visible_rows.saturating_sub(1));

    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible_rows)
        .map(|(index, &(entry, checked))| {
            let marker = if checked { glyphs.checked } else { glyphs.unchecked };
            let pointer = if focused && index == cursor {
                glyphs.selected
            } else {
                " "
            };
            let style = if checked {
                Style::default().fg(palette.success)
            } else if focused && index == cursor {
                Style::default().fg(palette.text_primary)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            Line::from(vec![
                Span::styled(format!("{pointer} "), styles::key_highlight(palette)),
                Span::styled(format!("{marker} {}", entry.label), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_modifiers(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let focused = app.section() == Section::Modifiers;
    let block = section_block("Modifiers", focused, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = app.editor(app.active_category()).modifiers_cursor;
    let lines: Vec<Line> = app
        .visible_modifiers()
        .iter()
        .enumerate()
        .take(inner.height as usize)
        .map(|(index, &(modifier, checked))| {
            let marker = if checked { glyphs.checked } else { glyphs.unchecked };
            let pointer = if focused && index == cursor {
                glyphs.selected
            } else {
                " "
            };
            let style = if checked {
                Style::default().fg(palette.success)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            Line::from(vec![
                Span::styled(format!("{pointer} "), styles::key_highlight(palette)),
                Span::styled(format!("{marker} {modifier}"), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_custom_text(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let editing = app.input_mode() == InputMode::Insert;
    let block = section_block("Custom text (i to edit)", editing, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let draft = &app.editor(app.active_category()).custom;
    let style = if draft.text().is_empty() && !editing {
        Style::default().fg(palette.text_muted)
    } else {
        Style::default().fg(palette.text_primary)
    };
    let shown = if draft.text().is_empty() && !editing {
        "e.g. wearing a red scarf"
    } else {
        draft.text()
    };
    frame.render_widget(Paragraph::new(shown).style(style), inner);

    if editing {
        set_draft_cursor(frame, draft, inner);
    }
}

fn draw_weight(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let focused = app.section() == Section::Weight;
    let weight = app.editor(app.active_category()).weight();
    let block = section_block("Weight (+/-)", focused, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Thumb position along a fixed-width track, 0.1 at the left edge.
    let track_width = (inner.width as usize).saturating_sub(8).max(10);
    let span = promptdeck_engine::Weight::MAX - promptdeck_engine::Weight::MIN;
    let ratio = (weight.value() - promptdeck_engine::Weight::MIN) / span;
    let thumb = ((track_width.saturating_sub(1)) as f64 * ratio).round() as usize;

    let mut track = String::new();
    for index in 0..track_width {
        if index == thumb {
            track.push_str(glyphs.gauge_thumb);
        } else {
            track.push_str(glyphs.gauge_track);
        }
    }

    let value_style = if weight.is_emphasized() {
        Style::default().fg(palette.peach)
    } else if weight.is_deemphasized() {
        Style::default().fg(palette.blue)
    } else {
        Style::default().fg(palette.text_secondary)
    };

    let line = Line::from(vec![
        Span::styled(track, Style::default().fg(palette.primary_dim)),
        Span::raw(" "),
        Span::styled(format!("x{weight}"), value_style.add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn draw_recent_templates(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = section_block("Recent templates (t)", false, palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.recent_templates().is_empty() {
        let empty = Paragraph::new("No templates yet - :save <name>")
            .style(Style::default().fg(palette.text_muted));
        frame.render_widget(empty, inner);
        return;
    }

    let width = (inner.width as usize).saturating_sub(4);
    let lines: Vec<Line> = app
        .recent_templates()
        .iter()
        .take(inner.height as usize)
        .map(|template| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", glyphs.bullet),
                    Style::default().fg(palette.primary_dim),
                ),
                Span::styled(
                    truncate_with_ellipsis(&template.name, width),
                    Style::default().fg(palette.text_secondary),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_preview(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let stats = app.stats();
    let count_style = if app.prompt_over_limit() {
        Style::default().fg(palette.error).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.text_muted)
    };
    let title = Line::from(vec![
        Span::styled("Prompt ", Style::default().fg(palette.text_primary)),
        Span::styled(
            format!(
                "({} chars, {} words, {} categories)",
                stats.length, stats.word_count, stats.categories_used
            ),
            count_style,
        ),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let body = if app.preview().is_empty() {
        Paragraph::new("Select options to build your prompt")
            .style(Style::default().fg(palette.text_muted))
    } else {
        Paragraph::new(app.preview())
            .style(Style::default().fg(palette.text_primary))
            .wrap(Wrap { trim: true })
    };
    frame.render_widget(body, inner);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let (badge_text, badge_style) = match app.input_mode() {
        InputMode::Normal => (" NORMAL ", styles::mode_normal(palette)),
        InputMode::Insert => (" INSERT ", styles::mode_insert(palette)),
        InputMode::Command => (" COMMAND ", styles::mode_command(palette)),
        InputMode::SaveTemplate => (" SAVE ", styles::mode_overlay(palette)),
        InputMode::Templates => (" TEMPLATES ", styles::mode_overlay(palette)),
    };

    let mode_style = if app.mode() == promptdeck_engine::Mode::Nsfw {
        Style::default().fg(palette.red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.green)
    };

    let mut spans = vec![
        Span::styled(badge_text, badge_style),
        Span::raw(" "),
        Span::styled(format!(" {} ", app.mode()), mode_style),
        Span::raw("  "),
    ];

    if let Some((text, severity)) = app.status() {
        let style = match severity {
            StatusSeverity::Info => Style::default().fg(palette.text_secondary),
            StatusSeverity::Warning => Style::default().fg(palette.warning),
        };
        spans.push(Span::styled(text, style));
    } else {
        spans.push(Span::styled(
            "Space toggle  Tab section  \u{2190}\u{2192} category  m mode  c copy  : command",
            styles::key_hint(palette),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ============================================================================
// Overlays
// ============================================================================

fn draw_command_palette(frame: &mut Frame, app: &App, palette: &Palette) {
    let specs = command_specs();
    let height = (specs.len() + 4).min(frame.area().height as usize) as u16;
    let area = centered_rect(frame.area(), 60, height);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title("Command")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.yellow))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_popup));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let draft = app.command_draft();
    let prompt = Line::from(vec![
        Span::styled(":", styles::key_highlight(palette)),
        Span::styled(draft.text(), Style::default().fg(palette.text_primary)),
    ]);
    frame.render_widget(Paragraph::new(prompt), rows[0]);
    set_cursor_after(frame, draft, rows[0], 1);

    let typed = draft.text().trim();
    let lines: Vec<Line> = specs
        .iter()
        .filter(|spec| typed.is_empty() || spec.palette_label.starts_with(typed))
        .map(|spec| {
            Line::from(vec![
                Span::styled(
                    format!("{:<20}", spec.palette_label),
                    Style::default().fg(palette.accent),
                ),
                Span::styled(spec.description, Style::default().fg(palette.text_muted)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows[1]);
}

fn draw_save_modal(frame: &mut Frame, app: &App, palette: &Palette) {
    let area = centered_rect(frame.area(), 50, 5);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title("Save template")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_popup));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(
        Paragraph::new("Template name:").style(Style::default().fg(palette.text_secondary)),
        rows[0],
    );
    let draft = app.save_draft();
    frame.render_widget(
        Paragraph::new(draft.text()).style(Style::default().fg(palette.text_primary)),
        rows[1],
    );
    set_draft_cursor(frame, draft, rows[1]);
    frame.render_widget(
        Paragraph::new("Enter save  Esc cancel").style(styles::key_hint(palette)),
        rows[2],
    );
}

fn draw_templates_overlay(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let area = centered_rect(frame.area(), 70, frame.area().height.saturating_sub(6));
    frame.render_widget(Clear, area);

    let browser = app.browser();
    let block = Block::default()
        .title("Templates")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.primary))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_popup));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filter
            Constraint::Min(1),    // List
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    let filter_style = if browser.filter_active {
        Style::default().fg(palette.text_primary)
    } else {
        Style::default().fg(palette.text_muted)
    };
    let filter = Line::from(vec![
        Span::styled("/ ", styles::key_highlight(palette)),
        Span::styled(browser.filter.text(), filter_style),
    ]);
    frame.render_widget(Paragraph::new(filter), rows[0]);
    if browser.filter_active {
        set_cursor_after(frame, &browser.filter, rows[0], 2);
    }

    let visible = browser.visible();
    let cursor = browser.cursor();
    let visible_rows = rows[1].height as usize;
    let scroll = cursor.saturating_sub(visible_rows.saturating_sub(1));
    let name_width = (rows[1].width as usize).saturating_sub(30).max(12);

    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible_rows)
        .map(|(index, template)| {
            let pointer = if index == cursor { glyphs.selected } else { " " };
            let name_style = if index == cursor {
                Style::default()
                    .fg(palette.text_primary)
                    .bg(palette.bg_highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            let date = template.created_at.get(..10).unwrap_or("");
            let mode_style = if template.mode == promptdeck_engine::Mode::Nsfw {
                Style::default().fg(palette.red)
            } else {
                Style::default().fg(palette.green)
            };
            Line::from(vec![
                Span::styled(format!("{pointer} "), styles::key_highlight(palette)),
                Span::styled(
                    format!("{:<name_width$}", truncate_with_ellipsis(&template.name, name_width)),
                    name_style,
                ),
                Span::styled(format!(" {:<4}", template.mode), mode_style),
                Span::styled(format!(" {date}"), Style::default().fg(palette.text_muted)),
            ])
        })
        .collect();

    if lines.is_empty() {
        frame.render_widget(
            Paragraph::new("No templates match").style(Style::default().fg(palette.text_muted)),
            rows[1],
        );
    } else {
        frame.render_widget(Paragraph::new(lines), rows[1]);
    }

    frame.render_widget(
        Paragraph::new("Enter load  d delete  / filter  Esc close")
            .style(styles::key_hint(palette))
            .alignment(Alignment::Center),
        rows[2],
    );
}

// ============================================================================
// Helpers
// ============================================================================

/// A centered rect of the given width percentage and fixed height.
fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

/// Display width of the draft text up to the cursor grapheme.
fn cursor_column(draft: &DraftInput) -> u16 {
    draft
        .text()
        .graphemes(true)
        .take(draft.cursor())
        .map(UnicodeWidthStr::width)
        .sum::<usize>() as u16
}

fn set_draft_cursor(frame: &mut Frame, draft: &DraftInput, area: Rect) {
    set_cursor_after(frame, draft, area, 0);
}

fn set_cursor_after(frame: &mut Frame, draft: &DraftInput, area: Rect, prefix: u16) {
    let x = (area.x + prefix + cursor_column(draft)).min(area.right().saturating_sub(1));
    frame.set_cursor_position((x, area.y));
}
