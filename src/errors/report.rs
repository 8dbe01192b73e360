//! Rendering of diagnostics for the terminal.
//!
//! ```text
//! error[UndefinedVariable]: undefined variable 'x'
//! -> main.og:3
//!   |
//! 3 | int y = x;
//!   |         ^
//! ```

use std::fmt::Write;

use super::errors::Diagnostic;

/// Finds the line containing `offset`.
///
/// Returns the 1-based line number, the line text without its terminator and the
/// column of `offset` inside that line. Offsets past the end land on the last line.
pub fn line_at_offset(text: &str, offset: usize) -> (usize, String, usize) {
    let mut start = 0;
    let mut line_number = 1;
    let mut last = (1, String::new(), 0);

    for line in text.split_inclusive('\n') {
        let end = start + line.len();
        let trimmed = line.trim_end_matches(['\n', '\r']);

        if (start..end).contains(&offset) {
            return (line_number, trimmed.to_string(), (offset - start).min(trimmed.len()));
        }

        last = (line_number, trimmed.to_string(), trimmed.len());
        start = end;
        line_number += 1;
    }

    if text.ends_with('\n') {
        (line_number, String::new(), 0)
    } else {
        last
    }
}

/// Renders one diagnostic against the text of the source it points into.
pub fn render(diagnostic: &Diagnostic, text: &str) -> String {
    let mut out = String::new();
    let level = if diagnostic.is_warning {
        "warning"
    } else {
        "error"
    };

    let _ = writeln!(
        out,
        "{}[{}]: {}",
        level,
        diagnostic.get_error_name(),
        diagnostic.message()
    );
    if let Some(template) = &diagnostic.template {
        let _ = writeln!(out, "  while evaluating template {}", template);
    }

    let start = diagnostic.span.start.0 as usize;
    let (line, line_text, column) = line_at_offset(text, start);
    let _ = writeln!(out, "-> {}:{}", diagnostic.span.file(), line);

    let line_string = line.to_string();
    let padding = line_string.len() + 2;
    let _ = writeln!(out, "{:>padding$}", "|");
    let _ = writeln!(out, "{} | {}", line_string, line_text);

    // The underline stops at the end of the first line of a multi-line span.
    let available = line_text.len().saturating_sub(column);
    let carets = diagnostic.span.len().min(available).max(1);
    let _ = writeln!(
        out,
        "{:>padding$} {}{}",
        "|",
        " ".repeat(column),
        "^".repeat(carets)
    );

    out
}
