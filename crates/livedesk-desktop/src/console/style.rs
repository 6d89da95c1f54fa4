//! ANSI styling for console output.

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// 256-colour foreground from a 6x6x6 cube coordinate.
fn cube(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;5;{}m", 16 + 36 * r + 6 * g + b)
}

/// 256-colour foreground from the 24-step grayscale ramp.
fn gray(step: u8) -> String {
    format!("\x1b[38;5;{}m", 232 + step)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Style {
    Error,
    Success,
    Value,
    Log,
}

impl Style {
    fn prefix(self) -> String {
        match self {
            Style::Error => format!("{RESET}{BOLD}\x1b[31m"),
            Style::Success => format!("{RESET}{BOLD}{}", cube(1, 0, 1)),
            Style::Value => format!("{RESET}{}", cube(0, 1, 0)),
            Style::Log => format!("{RESET}{}", cube(0, 0, 0)),
        }
    }

    pub(crate) fn paint(self, text: &str) -> String {
        format!("{}{text}{RESET}", self.prefix())
    }
}

/// The prompt in gray, leaving typed input bold.
pub(crate) fn prompt(text: &str) -> String {
    format!("{RESET}{}{text}{BOLD}{}", gray(15), cube(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_and_resets() {
        assert_eq!(Style::Error.paint("boom"), "\x1b[0m\x1b[1m\x1b[31mboom\x1b[0m");
        assert_eq!(Style::Value.paint("2"), "\x1b[0m\x1b[38;5;22m2\x1b[0m");
        assert_eq!(
            Style::Success.paint("ok"),
            "\x1b[0m\x1b[1m\x1b[38;5;53mok\x1b[0m"
        );
    }

    #[test]
    fn prompt_is_gray_then_bold() {
        assert_eq!(prompt("λ "), "\x1b[0m\x1b[38;5;247mλ \x1b[1m\x1b[38;5;16m");
    }
}
