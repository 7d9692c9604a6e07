//! Diagnostics raised by the generator, plus terminal rendering.

use std::fmt;
use colored::Colorize;
use serde::Serialize;

use crate::syntax::{SyntaxTree, TextSpan};

/// Location in a declaration tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub span: TextSpan,
    /// 1-based, present when the tree carried its source text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip)]
    pub source_line: Option<String>,
}

impl Location {
    pub fn in_tree(tree: &SyntaxTree, span: TextSpan) -> Self {
        let (line, column) = match tree.line_column(span.start) {
            Some((l, c)) => (Some(l), Some(c)),
            None => (None, None),
        };
        Self {
            path: tree.path.clone(),
            span,
            line,
            column,
            source_line: tree.line_text(span.start).map(str::to_string),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{}:{}:{}", self.path, line, column),
            _ => write!(f, "{}@{}..{}", self.path, self.span.start, self.span.end()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "{}", "error".red().bold()),
        }
    }
}

/// Static description of one kind of diagnostic. `{0}` in the message format
/// is replaced by the single argument given to [`DiagnosticDescriptor::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: String,
    pub message_format: String,
    pub severity: Severity,
}

impl DiagnosticDescriptor {
    pub fn create(&self, location: Location, argument: &str) -> Diagnostic {
        Diagnostic {
            code: self.id.to_string(),
            severity: self.severity,
            message: self.message_format.replace("{0}", argument),
            title: self.title.clone(),
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    /// Rule summary, rendered as a note
    pub title: String,
    pub location: Location,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // error[EG0001]: message
        writeln!(f, "{}[{}]: {}", self.severity, self.code.cyan(), self.message)?;

        let loc = &self.location;
        let gutter = loc.line.map(|l| l.to_string().len()).unwrap_or(1);
        let padding = " ".repeat(gutter);
        writeln!(f, "{}--> {}", padding, loc.to_string().blue())?;

        if let (Some(line), Some(column), Some(source)) = (loc.line, loc.column, &loc.source_line) {
            writeln!(f, "{} {}", padding, "|".blue())?;
            writeln!(f, "{} {} {}", line.to_string().blue().bold(), "|".blue(), source)?;
            // tabs in the prefix are kept so the carets line up with the source
            let indent: String = source
                .chars()
                .take(column.saturating_sub(1))
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            let underline = "^".repeat(loc.span.length.max(1));
            writeln!(f, "{} {} {}{}", padding, "|".blue(), indent, underline.red().bold())?;
        }
        writeln!(f, "{} {} {}: {}", padding, "=".blue(), "note".bold(), self.title)
    }
}

/// Diagnostic ids
pub mod codes {
    pub const INCORRECT_NAMESPACE: &str = "EG0001";
}
