use std::fmt::{Display, Formatter};

use cursor::Line;
use itertools::Itertools;

/// Where on its line a diagnostic points.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Unknown,
    End,
    Lexeme(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Unknown => Ok(()),
            Location::End => write!(f, " at end"),
            Location::Lexeme(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

/// Something a diagnostic can be attached to, usually a token.
pub trait Anchor {
    fn line(&self) -> Line;
    fn location(&self) -> Location;
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct LoxError {
    pub line: Line,
    pub location: Location,
    pub message: String,
}

impl LoxError {
    pub fn new(line: Line, message: impl ToString) -> Self {
        Self { line, location: Location::Unknown, message: message.to_string() }
    }

    pub fn at(anchor: &impl Anchor, message: impl ToString) -> Self {
        Self { line: anchor.line(), location: anchor.location(), message: message.to_string() }
    }
}

#[derive(thiserror::Error, Debug, Default, Clone, PartialEq)]
pub struct LoxErrors(pub Vec<LoxError>);

impl From<LoxError> for LoxErrors {
    fn from(e: LoxError) -> Self {
        Self(vec![e])
    }
}

impl std::ops::Deref for LoxErrors {
    type Target = Vec<LoxError>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for LoxErrors {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

/// Collects the diagnostics of one run. Reporting never unwinds; callers
/// check [`Reporter::had_error`] to decide whether to keep going.
#[derive(Debug, Default)]
pub struct Reporter {
    errors: LoxErrors,
    runtime_error: Option<(Line, String)>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, line: Line, message: impl ToString) {
        self.report(LoxError::new(line, message));
    }

    pub fn error_at(&mut self, anchor: &impl Anchor, message: impl ToString) {
        self.report(LoxError::at(anchor, message));
    }

    pub fn report(&mut self, error: LoxError) {
        log::debug!("Reported: {error}");
        self.errors.0.push(error);
    }

    pub fn runtime_error(&mut self, line: Line, message: impl ToString) {
        let message = message.to_string();
        log::debug!("Reported runtime error on line {line}: {message}");
        self.runtime_error = Some((line, message));
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.runtime_error.is_some()
    }

    pub fn errors(&self) -> &LoxErrors {
        &self.errors
    }

    pub fn take_errors(&mut self) -> LoxErrors {
        std::mem::take(&mut self.errors)
    }

    /// Forget everything reported so far, e.g. between two REPL lines.
    pub fn reset(&mut self) {
        self.errors.0.clear();
        self.runtime_error = None;
    }
}
