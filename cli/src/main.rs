//! promptdeck CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`promptdeck_engine`] (application state) and
//! [`promptdeck_tui`] (rendering), providing RAII-based terminal management
//! with guaranteed cleanup.
//!
//! ```text
//! main() -> TerminalSession::new() -> run_app() -> App + TUI
//! ```
//!
//! # Event Loop
//!
//! A simple synchronous loop:
//!
//! 1. Render frame
//! 2. Poll for input (25ms timeout) and apply it to the app
//! 3. Advance application state (`app.tick()`)
//! 4. Check for quit

use anyhow::Result;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use promptdeck_engine::{App, AppPaths};
use promptdeck_tui::{draw, handle_events};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25);

fn init_tracing(paths: &AppPaths) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_log_file(paths);

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // If we can't open a log file, prefer "no logs" over corrupting the TUI
    // by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file(paths: &AppPaths) -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let candidates = log_file_candidates(paths);
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates(paths: &AppPaths) -> Vec<PathBuf> {
    vec![
        // Primary: <data dir>/logs/promptdeck.log
        paths.logs_dir().join("promptdeck.log"),
        // Fallback: ./.promptdeck/logs/promptdeck.log (useful in constrained
        // environments)
        PathBuf::from(".promptdeck").join("logs").join("promptdeck.log"),
    ]
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Manages raw mode, bracketed paste, and the alternate screen. On drop, all
/// terminal state is restored, ensuring the terminal remains usable even
/// after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let _ = execute!(out, DisableBracketedPaste);
            return Err(err.into());
        }

        let backend = CrosstermBackend::new(out);
        let terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let mut out = stdout();
                let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

fn run_app(session: &mut TerminalSession, app: &mut App) -> Result<()> {
    loop {
        session.terminal.draw(|frame| draw(frame, app))?;
        handle_events(app, INPUT_POLL_TIMEOUT)?;
        app.tick();
        if app.should_quit() {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    let paths = AppPaths::resolve();
    init_tracing(&paths);

    let mut app = App::new(&paths)?;

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session, &mut app)
    };

    if let Err(err) = &result {
        eprintln!("Error: {err:?}");
    }
    result
}
