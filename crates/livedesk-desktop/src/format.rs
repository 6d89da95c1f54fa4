//! Location-aware rendering of compile errors.
//!
//! ```text
//! At line 2, column 4:
//!
//! let = 2
//!     ^
//!     |
//!   expected a name after `let`, found `=`
//! ```

use livedesk_common::{CompileError, Location};
use unicode_width::UnicodeWidthStr;

/// An error position resolved against its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// 1-based.
    pub row: usize,
    /// 0-based, in characters.
    pub column: usize,
    /// Full text of the offending line, without its terminator.
    pub line: String,
}

/// Resolve a location to row, column and line text.
///
/// Cursor offsets past the end of input clamp to the end. Explicit lines are
/// 1-based; a line beyond the input resolves to empty text.
pub fn resolve(location: &Location) -> Resolved {
    match location {
        Location::Cursor { input, offset } => {
            let chars: Vec<char> = input.chars().collect();
            let at = (*offset).min(chars.len());
            let start = chars[..at]
                .iter()
                .rposition(|c| *c == '\n')
                .map_or(0, |i| i + 1);
            let end = chars[at..]
                .iter()
                .position(|c| *c == '\n')
                .map_or(chars.len(), |i| at + i);
            let row = 1 + chars[..at].iter().filter(|c| **c == '\n').count();
            Resolved {
                row,
                column: at - start,
                line: strip_cr(chars[start..end].iter().collect()),
            }
        }
        Location::LineColumn {
            input,
            line,
            column,
        } => Resolved {
            row: *line,
            column: *column,
            line: input
                .split('\n')
                .nth(line.saturating_sub(1))
                .map(|l| strip_cr(l.to_string()))
                .unwrap_or_default(),
        },
    }
}

fn strip_cr(mut line: String) -> String {
    if line.ends_with('\r') {
        line.pop();
    }
    line
}

/// Render `error` for a display `width` columns wide.
///
/// Errors without a location render as their bare message.
pub fn format_error(error: &CompileError, width: usize) -> String {
    match &error.location {
        Some(location) => format_resolved(&error.message, &resolve(location), width),
        None => error.message.clone(),
    }
}

/// The pure core: identical input always yields identical output.
pub fn format_resolved(message: &str, at: &Resolved, width: usize) -> String {
    let pad = " ".repeat(at.column);
    let mut out = format!("At line {}, column {}:\n\n", at.row, at.column);
    if !at.line.trim().is_empty() {
        out.push_str(&at.line);
        out.push('\n');
        out.push_str(&pad);
        out.push_str("^\n");
        out.push_str(&pad);
        out.push_str("|\n");
    }
    let indent = " ".repeat(at.column.min(2));
    out.push_str(&wrap(message, width.saturating_sub(2), &indent));
    out.push('\n');
    out
}

/// Greedy word wrap to `width` display columns, each line prefixed by
/// `indent`. Words wider than `width` are kept whole on their own line.
pub fn wrap(text: &str, width: usize, indent: &str) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let w = word.width();
        if !current.is_empty() && current_width + 1 + w > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += w;
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
        .iter()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_cursor_on_first_line() {
        let at = resolve(&Location::Cursor {
            input: "1 + ".into(),
            offset: 4,
        });
        assert_eq!(
            at,
            Resolved {
                row: 1,
                column: 4,
                line: "1 + ".into()
            }
        );
    }

    #[test]
    fn resolves_cursor_on_later_line() {
        let at = resolve(&Location::Cursor {
            input: "let a = 1\nlet = 2\nlet b = 3".into(),
            offset: 14,
        });
        assert_eq!(at.row, 2);
        assert_eq!(at.column, 4);
        assert_eq!(at.line, "let = 2");
    }

    #[test]
    fn cursor_counts_chars() {
        let at = resolve(&Location::Cursor {
            input: "\"λ\" ?".into(),
            offset: 4,
        });
        assert_eq!(at.column, 4);
        assert_eq!(at.line, "\"λ\" ?");
    }

    #[test]
    fn cursor_past_end_clamps() {
        let at = resolve(&Location::Cursor {
            input: "ab\ncd".into(),
            offset: 99,
        });
        assert_eq!((at.row, at.column, at.line.as_str()), (2, 2, "cd"));
    }

    #[test]
    fn cursor_on_newline_belongs_to_the_line_it_ends() {
        let at = resolve(&Location::Cursor {
            input: "ab\ncd".into(),
            offset: 2,
        });
        assert_eq!((at.row, at.column, at.line.as_str()), (1, 2, "ab"));
    }

    #[test]
    fn resolves_explicit_line_column() {
        let at = resolve(&Location::LineColumn {
            input: "one\r\ntwo\nthree".into(),
            line: 1,
            column: 2,
        });
        assert_eq!((at.row, at.column, at.line.as_str()), (1, 2, "one"));

        let at = resolve(&Location::LineColumn {
            input: "one".into(),
            line: 7,
            column: 0,
        });
        assert_eq!(at.line, "");
    }

    #[test]
    fn formats_with_caret_and_bar() {
        let err = CompileError::at_offset("expected an expression", "1 +", 3);
        assert_eq!(
            format_error(&err, 80),
            "At line 1, column 3:\n\n1 +\n   ^\n   |\n  expected an expression\n"
        );
    }

    #[test]
    fn blank_line_has_no_caret_or_bar() {
        let err = CompileError::at_line("unexpected end of input", "x\n   \ny", 2, 1);
        let out = format_error(&err, 80);
        assert_eq!(out, "At line 2, column 1:\n\n unexpected end of input\n");
        assert!(!out.contains('^'));
        assert!(!out.contains('|'));
    }

    #[test]
    fn indent_is_capped_at_two() {
        let at = Resolved {
            row: 1,
            column: 0,
            line: "x".into(),
        };
        assert!(format_resolved("m", &at, 80).ends_with("^\n|\nm\n"));

        let at = Resolved {
            row: 1,
            column: 9,
            line: "let x = ?".into(),
        };
        assert!(format_resolved("m", &at, 80).ends_with("|\n  m\n"));
    }

    #[test]
    fn formatting_is_deterministic() {
        let err = CompileError::at_offset("expected `then`, found end of input", "if x", 4);
        assert_eq!(format_error(&err, 12), format_error(&err, 12));
    }

    #[test]
    fn message_wraps_to_width_minus_two() {
        let at = Resolved {
            row: 1,
            column: 4,
            line: "    ".into(),
        };
        let out = format_resolved("aaa bbb ccc ddd", &at, 11);
        assert_eq!(out, "At line 1, column 4:\n\n  aaa bbb\n  ccc ddd\n");
    }

    #[test]
    fn bare_error_is_just_the_message() {
        assert_eq!(format_error(&CompileError::bare("boom"), 80), "boom");
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        assert_eq!(wrap("a verylongword b", 5, ""), "a\nverylongword\nb");
    }

    #[test]
    fn wrap_counts_display_width() {
        // Each CJK character is two columns wide.
        assert_eq!(wrap("漢字 ab", 5, ""), "漢字\nab");
        assert_eq!(wrap("", 10, "  "), "");
    }
}
