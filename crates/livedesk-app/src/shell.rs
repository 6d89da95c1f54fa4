//! Commands typed on stdin.

use livedesk_common::WindowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Ask the active console to pull its peer's buffer.
    Load,
    /// Push an editor's buffer to its peer.
    Send(WindowId),
    Focus(WindowId),
    /// Print an editor buffer or a frame transcript.
    Show(WindowId),
    Quit,
    /// Anything else is a line for the active console.
    Line(String),
    /// A `:` command that could not be understood.
    Invalid(String),
}

impl ShellCommand {
    pub fn parse(input: &str) -> Self {
        let Some(rest) = input.strip_prefix(':') else {
            return ShellCommand::Line(input.to_string());
        };
        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next().map(WindowId::from);
        let extra = words.next().is_some();

        match (name, arg, extra) {
            ("load", None, false) => ShellCommand::Load,
            ("quit" | "q", None, false) => ShellCommand::Quit,
            ("send", Some(id), false) => ShellCommand::Send(id),
            ("focus", Some(id), false) => ShellCommand::Focus(id),
            ("show", Some(id), false) => ShellCommand::Show(id),
            _ => ShellCommand::Invalid(input.to_string()),
        }
    }
}

pub const HELP: &str = "\
commands:
  :load          pull the peer buffer into the active console
  :send <id>     push an editor buffer to its target
  :focus <id>    focus a window
  :show <id>     print an editor buffer or frame transcript
  :quit          clean up and exit
anything else is evaluated in the active console (prefix & to expand)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_console_line() {
        assert_eq!(
            ShellCommand::parse("&let x = 1"),
            ShellCommand::Line("&let x = 1".into())
        );
        assert_eq!(ShellCommand::parse(""), ShellCommand::Line(String::new()));
    }

    #[test]
    fn colon_commands() {
        assert_eq!(ShellCommand::parse(":load"), ShellCommand::Load);
        assert_eq!(ShellCommand::parse(":q"), ShellCommand::Quit);
        assert_eq!(
            ShellCommand::parse(":send editor"),
            ShellCommand::Send(WindowId::from("editor"))
        );
        assert_eq!(
            ShellCommand::parse(":show  frame "),
            ShellCommand::Show(WindowId::from("frame"))
        );
    }

    #[test]
    fn malformed_commands_are_invalid() {
        assert!(matches!(ShellCommand::parse(":send"), ShellCommand::Invalid(_)));
        assert!(matches!(ShellCommand::parse(":load now"), ShellCommand::Invalid(_)));
        assert!(matches!(ShellCommand::parse(":reticulate"), ShellCommand::Invalid(_)));
    }
}
