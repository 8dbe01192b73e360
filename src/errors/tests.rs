//! Unit tests for error handling.
//!
//! This module contains tests for diagnostic kinds, the sink and terminal rendering.

use std::rc::Rc;

use super::errors::{Diagnostic, Diagnostics, ErrorImpl, OdefError};
use super::report::{line_at_offset, render};
use crate::Span;

fn span(start: usize, end: usize) -> Span {
    Span::new(start, end, &Rc::new("test.og".to_string()))
}

#[test]
fn test_error_name() {
    let diagnostic = Diagnostic::error(ErrorImpl::UnexpectedCharacter { character: '#' }, span(0, 1));

    assert_eq!(diagnostic.get_error_name(), "UnexpectedCharacter");
    assert_eq!(diagnostic.message(), "unexpected character '#'");
    assert!(!diagnostic.is_warning);
}

#[test]
fn test_expected_token_message() {
    let error = ErrorImpl::ExpectedToken {
        expected: "symbol ';' to end statement".to_string(),
        found: "<eof>".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "expected symbol ';' to end statement, found <eof>"
    );
}

#[test]
fn test_overload_messages() {
    let undefined = ErrorImpl::UndefinedOperator {
        operator: "[]".to_string(),
    };
    let no_match = ErrorImpl::NoMatchingOverload {
        operator: "+".to_string(),
    };

    assert_eq!(undefined.to_string(), "undefined member operator[]");
    assert_eq!(
        no_match.to_string(),
        "no overload of member operator+ matches the given parameters"
    );
}

#[test]
fn test_warnings_are_not_errors() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.push(Diagnostic::warning(ErrorImpl::DuplicateVariable, span(0, 1)));

    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().count(), 1);

    diagnostics.error(ErrorImpl::ExpectedLvalue, span(2, 3));
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.errors().count(), 1);
}

#[test]
fn test_truncate_drops_newest() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.error(ErrorImpl::UnfinishedString, span(0, 1));
    diagnostics.error(ErrorImpl::MissingSemicolon, span(1, 2));
    diagnostics.truncate(1);

    assert_eq!(diagnostics.messages(), vec!["unfinished string".to_string()]);
}

#[test]
fn test_line_at_offset() {
    let text = "Hello, world!\nfoo\nbar\nTesting { }\n";

    let (line_number, line, column) = line_at_offset(text, 10);
    assert_eq!(line_number, 1);
    assert_eq!(line, "Hello, world!");
    assert_eq!(column, 10);

    let (line_number, line, column) = line_at_offset(text, 30);
    assert_eq!(line_number, 4);
    assert_eq!(line, "Testing { }");
    assert_eq!(column, 8);
}

#[test]
fn test_line_at_offset_past_end() {
    let (line_number, line, column) = line_at_offset("abc", 99);
    assert_eq!(line_number, 1);
    assert_eq!(line, "abc");
    assert_eq!(column, 3);

    let (line_number, _, column) = line_at_offset("", 0);
    assert_eq!(line_number, 1);
    assert_eq!(column, 0);
}

#[test]
fn test_render_underlines_span() {
    let text = "int x = 1;\nint y = z;\n";
    let diagnostic = Diagnostic::error(
        ErrorImpl::UndefinedVariable {
            name: "z".to_string(),
        },
        span(19, 20),
    );

    let rendered = render(&diagnostic, text);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "error[UndefinedVariable]: undefined variable 'z'");
    assert_eq!(lines[1], "-> test.og:2");
    assert_eq!(lines[3], "2 | int y = z;");
    assert_eq!(lines[4], "  |         ^");
}

#[test]
fn test_render_template_context() {
    let diagnostic = Diagnostic::warning(ErrorImpl::DuplicateVariable, span(0, 3))
        .with_template(Some("box<int>".to_string()));

    let rendered = render(&diagnostic, "abc");

    assert!(rendered.starts_with("warning[DuplicateVariable]"));
    assert!(rendered.contains("while evaluating template box<int>"));
    assert!(rendered.contains("^^^"));
}

#[test]
fn test_odef_error_display() {
    assert_eq!(
        OdefError::TooShort { len: 3 }.to_string(),
        "definition file is 3 bytes, shorter than its 12 byte header"
    );
    assert_eq!(
        OdefError::InvalidFlag { value: 7 }.to_string(),
        "definition file contains an invalid flag byte 0x07"
    );
}
