use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use thiserror::Error;

/// A half-open range of character offsets into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

/// A problem found while parsing. The parser collects these and keeps going.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl SyntaxError {
    pub fn new(span: Span, message: String) -> Self {
        Self {
            span,
            message,
            help: None,
        }
    }

    pub fn with_help(span: Span, message: String, help: String) -> Self {
        Self {
            span,
            message,
            help: Some(help),
        }
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", "Syntax Error".fg(Color::Yellow), self.message))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(Color::Yellow),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        let _ = report_builder
            .finish()
            .eprint((filename, Source::from(source)));
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Conditions that a well-formed program never reaches.
///
/// Runtime failures a user can cause are `Object::Error` values, not this.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("no evaluator for incomplete {0}")]
    IncompleteNode(&'static str),
}
