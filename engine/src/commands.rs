//! Command processing for the App.
//!
//! Handles `:`-commands such as :save, :mode, :export.

use std::path::PathBuf;

use serde_json::Value;

use promptdeck_types::Mode;

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub palette_label: &'static str,
    pub description: &'static str,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        palette_label: "q, quit",
        description: "Exit the application",
    },
    CommandSpec {
        palette_label: "clear",
        description: "Clear all selections",
    },
    CommandSpec {
        palette_label: "copy",
        description: "Copy the assembled prompt to the clipboard",
    },
    CommandSpec {
        palette_label: "mode <sfw|nsfw>",
        description: "Switch content mode",
    },
    CommandSpec {
        palette_label: "save <name>",
        description: "Save the current selections as a template",
    },
    CommandSpec {
        palette_label: "export <path>",
        description: "Write the assembled prompt to a text file",
    },
    CommandSpec {
        palette_label: "import <path>",
        description: "Import a template file into the store",
    },
    CommandSpec {
        palette_label: "set <key> <value>",
        description: "Set a settings value by dotted path",
    },
    CommandSpec {
        palette_label: "help",
        description: "Show available commands",
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

#[must_use]
pub fn command_help_summary() -> String {
    let labels: Vec<&str> = COMMAND_SPECS
        .iter()
        .map(|spec| spec.palette_label.split(',').next().unwrap_or(""))
        .map(str::trim)
        .collect();
    format!("Commands: :{}", labels.join(", :"))
}

/// Parsed command with typed arguments.
#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    Quit,
    Clear,
    Copy,
    Mode(Option<Mode>),
    Save(Option<String>),
    Export(Option<PathBuf>),
    Import(Option<PathBuf>),
    Set { key: String, value: Value },
    Help,
    Unknown(String),
    Empty,
}

impl Command {
    /// Parse a raw command line into a typed Command.
    pub(crate) fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (head, rest) = match raw.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (raw, ""),
        };

        match head {
            "" => Command::Empty,
            "q" | "quit" => Command::Quit,
            "clear" => Command::Clear,
            "copy" => Command::Copy,
            "mode" => {
                if rest.is_empty() {
                    Command::Mode(None)
                } else {
                    Command::Mode(rest.parse().ok())
                }
            }
            "save" => {
                if rest.is_empty() {
                    Command::Save(None)
                } else {
                    Command::Save(Some(rest.to_string()))
                }
            }
            "export" => {
                if rest.is_empty() {
                    Command::Export(None)
                } else {
                    Command::Export(Some(PathBuf::from(rest)))
                }
            }
            "import" => {
                if rest.is_empty() {
                    Command::Import(None)
                } else {
                    Command::Import(Some(PathBuf::from(rest)))
                }
            }
            "set" => match rest.split_once(char::is_whitespace) {
                Some((key, value)) if !key.is_empty() => Command::Set {
                    key: key.to_string(),
                    value: parse_setting_value(value.trim()),
                },
                _ => Command::Unknown("set".to_string()),
            },
            "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Interpret a settings value: JSON if it parses, bare string otherwise.
fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use promptdeck_types::Mode;
    use serde_json::json;

    use super::{Command, command_help_summary};

    #[test]
    fn parses_quit_aliases() {
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("quit"), Command::Quit);
    }

    #[test]
    fn parses_mode_argument() {
        assert_eq!(Command::parse("mode nsfw"), Command::Mode(Some(Mode::Nsfw)));
        assert_eq!(Command::parse("mode SFW"), Command::Mode(Some(Mode::Sfw)));
        assert_eq!(Command::parse("mode"), Command::Mode(None));
        assert_eq!(Command::parse("mode spicy"), Command::Mode(None));
    }

    #[test]
    fn save_keeps_spaces_in_name() {
        assert_eq!(
            Command::parse("save moody portrait v2"),
            Command::Save(Some("moody portrait v2".to_string()))
        );
        assert_eq!(Command::parse("save"), Command::Save(None));
    }

    #[test]
    fn export_takes_a_path() {
        assert_eq!(
            Command::parse("export /tmp/prompt.txt"),
            Command::Export(Some(PathBuf::from("/tmp/prompt.txt")))
        );
    }

    #[test]
    fn set_parses_json_values_with_string_fallback() {
        assert_eq!(
            Command::parse("set ui.high_contrast true"),
            Command::Set {
                key: "ui.high_contrast".to_string(),
                value: json!(true),
            }
        );
        assert_eq!(
            Command::parse("set prompt.separator  |  "),
            Command::Set {
                key: "prompt.separator".to_string(),
                value: json!("|"),
            }
        );
        assert_eq!(Command::parse("set lonely"), Command::Unknown("set".to_string()));
    }

    #[test]
    fn unknown_and_empty() {
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("frobnicate"), Command::Unknown("frobnicate".to_string()));
    }

    #[test]
    fn help_summary_lists_primary_labels() {
        let summary = command_help_summary();
        assert!(summary.contains(":q"));
        assert!(summary.contains(":save"));
        assert!(summary.contains(":set"));
    }
}
