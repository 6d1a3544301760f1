//! Command parsing for the command line

use super::navigation::{Level, Tab};
use crate::curriculum::NodeId;

/// Parsed command from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quit the application: :q or :quit
    Quit,
    /// Show help: :help or :h
    Help,
    /// Jump to a node by id: :grade 3, :subject 12, :unit 40, :lesson 401
    Select(Level, NodeId),
    /// Switch lesson tab: :tab objectives
    Tab(Tab),
    /// Download the current subject's textbook: :pdf
    Pdf,
    /// Fetch the navigation tree again: :reload
    Reload,
    /// Send a chat message directly: :ask <question>
    Ask(String),
    /// Load a preset prompt into the chat input: :preset 2
    Preset(usize),
    /// Start a new conversation: :clear
    Clear,
    /// Clear message: (empty command)
    Nop,
}

/// Result of parsing a command
#[derive(Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// Successfully parsed command
    Ok(Command),
    /// Unknown command
    UnknownCommand(String),
    /// Command needs an argument
    MissingArgument(String),
    /// Argument could not be understood
    InvalidArgument { command: String, argument: String },
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim();

    if input.is_empty() {
        return ParseResult::Ok(Command::Nop);
    }

    // Split into command and arguments
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim()).unwrap_or("");
    let cmd_lower = cmd.to_lowercase();

    let invalid = || ParseResult::InvalidArgument {
        command: cmd_lower.clone(),
        argument: args.to_string(),
    };

    if let Some(level) = Level::parse(&cmd_lower) {
        if args.is_empty() {
            return ParseResult::MissingArgument(level.to_string());
        }
        return match args.parse::<NodeId>() {
            Ok(id) => ParseResult::Ok(Command::Select(level, id)),
            Err(_) => invalid(),
        };
    }

    match cmd_lower.as_str() {
        "quit" | "q" => ParseResult::Ok(Command::Quit),
        "help" | "h" | "?" => ParseResult::Ok(Command::Help),
        "tab" | "t" => {
            if args.is_empty() {
                ParseResult::MissingArgument("tab".to_string())
            } else {
                Tab::parse(args).map(|tab| ParseResult::Ok(Command::Tab(tab))).unwrap_or_else(invalid)
            }
        }
        "pdf" | "textbook" => ParseResult::Ok(Command::Pdf),
        "reload" | "r" => ParseResult::Ok(Command::Reload),
        "ask" => {
            if args.is_empty() {
                ParseResult::MissingArgument("ask".to_string())
            } else {
                ParseResult::Ok(Command::Ask(args.to_string()))
            }
        }
        "preset" | "p" => {
            if args.is_empty() {
                return ParseResult::MissingArgument("preset".to_string());
            }
            match args.parse::<usize>() {
                Ok(n) if n >= 1 => ParseResult::Ok(Command::Preset(n - 1)),
                _ => invalid(),
            }
        }
        "clear" => ParseResult::Ok(Command::Clear),
        _ => ParseResult::UnknownCommand(cmd.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_quit_command() {
        assert_eq!(parse_command("q"), ParseResult::Ok(Command::Quit));
        assert_eq!(parse_command("quit"), ParseResult::Ok(Command::Quit));
        assert_eq!(parse_command("Q"), ParseResult::Ok(Command::Quit));
    }

    #[test]
    fn parse_help_command() {
        assert_eq!(parse_command("help"), ParseResult::Ok(Command::Help));
        assert_eq!(parse_command("?"), ParseResult::Ok(Command::Help));
    }

    #[test]
    fn parse_level_selection() {
        assert_eq!(parse_command("grade 3"), ParseResult::Ok(Command::Select(Level::Grade, 3)));
        assert_eq!(parse_command("lesson 401"), ParseResult::Ok(Command::Select(Level::Lesson, 401)));
        assert_eq!(parse_command("الوحدة 7"), ParseResult::Ok(Command::Select(Level::Unit, 7)));
    }

    #[test]
    fn parse_level_bad_id() {
        assert!(matches!(parse_command("subject abc"), ParseResult::InvalidArgument { .. }));
        assert!(matches!(parse_command("unit"), ParseResult::MissingArgument(_)));
    }

    #[test]
    fn parse_tab_command() {
        assert_eq!(parse_command("tab objectives"), ParseResult::Ok(Command::Tab(Tab::Objectives)));
        assert_eq!(parse_command("t pdf"), ParseResult::Ok(Command::Tab(Tab::Textbook)));
        assert!(matches!(parse_command("tab nope"), ParseResult::InvalidArgument { .. }));
    }

    #[test]
    fn parse_ask_keeps_text() {
        assert_eq!(
            parse_command("ask ما هو المبتدأ؟"),
            ParseResult::Ok(Command::Ask("ما هو المبتدأ؟".into()))
        );
        assert!(matches!(parse_command("ask"), ParseResult::MissingArgument(_)));
    }

    #[test]
    fn parse_preset_is_one_based() {
        assert_eq!(parse_command("preset 1"), ParseResult::Ok(Command::Preset(0)));
        assert!(matches!(parse_command("preset 0"), ParseResult::InvalidArgument { .. }));
    }

    #[test]
    fn parse_unknown_command() {
        assert!(matches!(parse_command("unknown"), ParseResult::UnknownCommand(_)));
    }

    #[test]
    fn parse_empty_is_nop() {
        assert_eq!(parse_command(""), ParseResult::Ok(Command::Nop));
        assert_eq!(parse_command("   "), ParseResult::Ok(Command::Nop));
    }
}
