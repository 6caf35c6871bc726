//! Parse diagnostics.

use std::fmt;

use cssparser::{BasicParseErrorKind, ParseError, ParseErrorKind, SourceLocation};

/// Category of a parse diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Malformed rule structure (missing block, bad condition).
    Syntax,
    /// Malformed selector; the rule was dropped.
    InvalidSelector,
    /// Malformed declaration; the declaration was dropped.
    InvalidDeclaration,
    /// Well-formed CSS outside the supported subset; it was skipped.
    Unsupported,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax error"),
            Self::InvalidSelector => write!(f, "invalid selector"),
            Self::InvalidDeclaration => write!(f, "invalid declaration"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A problem found while parsing, with its location.
///
/// Diagnostics never abort a parse: the offending declaration or rule is
/// dropped and parsing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub kind: DiagnosticKind,
    /// The error message describing what went wrong.
    pub message: String,
    /// Line number where the error occurred (1-indexed).
    pub line: u32,
    /// Column number where the error occurred (1-indexed).
    pub column: u32,
}

impl ParseDiagnostic {
    /// Create a new diagnostic with the given message and location.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}: {}", self.kind, self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseDiagnostic {}

/// Error produced by the sub-parsers before it is placed in context.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SyntaxError {
    pub unsupported: bool,
    pub message: String,
}

impl SyntaxError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            unsupported: false,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self {
            unsupported: true,
            message: message.into(),
        }
    }

    /// Unwrap a cssparser error carrying a `SyntaxError`.
    pub fn from_parse_error(error: ParseError<'_, SyntaxError>) -> Self {
        match error.kind {
            ParseErrorKind::Custom(error) => error,
            ParseErrorKind::Basic(kind) => Self::invalid(describe_basic(&kind)),
        }
    }

    /// The diagnostic kind, using `context` for ordinary syntax errors.
    pub fn kind_in(&self, context: DiagnosticKind) -> DiagnosticKind {
        if self.unsupported {
            DiagnosticKind::Unsupported
        } else {
            context
        }
    }
}

fn describe_basic(kind: &BasicParseErrorKind<'_>) -> String {
    match kind {
        BasicParseErrorKind::UnexpectedToken(token) => format!("unexpected token {:?}", token),
        BasicParseErrorKind::EndOfInput => "unexpected end of input".to_string(),
        other => format!("{:?}", other),
    }
}

/// Collects diagnostics and mirrors them to the log.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    pub items: Vec<ParseDiagnostic>,
}

impl Diagnostics {
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>, location: SourceLocation) {
        let diagnostic = ParseDiagnostic::new(kind, message, location.line + 1, location.column);
        tracing::warn!(target: "native_css::parser", "CSS {}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn report_error(&mut self, error: SyntaxError, context: DiagnosticKind, location: SourceLocation) {
        let kind = error.kind_in(context);
        self.report(kind, error.message, location);
    }
}
