//! Diagnostic values.
//!
//! Errors are data, not control flow: every phase appends diagnostics to
//! the document it is working on and keeps going with error nodes. Only
//! the CLI driver converts "has errors" into an exit code.

use serde::Serialize;

use crate::span::{Location, Range};

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Hint,
    Information,
}

/// Extra classification a client can use for rendering (e.g. fading out
/// unused code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticTag {
    Unnecessary,
    Deprecated,
}

/// A secondary note pointing at a related location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedNote {
    pub message: String,
    pub location: Location,
}

/// A single diagnostic: severity, message, primary range, optional related
/// notes and tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    pub related: Vec<RelatedNote>,
    pub tag: Option<DiagnosticTag>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, range: Range) -> Self {
        Self {
            severity,
            message: message.into(),
            range,
            related: Vec::new(),
            tag: None,
        }
    }

    pub fn error(message: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Error, message, range)
    }

    pub fn warning(message: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Warning, message, range)
    }

    pub fn with_related(mut self, message: impl Into<String>, location: Location) -> Self {
        self.related.push(RelatedNote { message: message.into(), location });
        self
    }

    pub fn with_tag(mut self, tag: DiagnosticTag) -> Self {
        self.tag = Some(tag);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DocumentId;
    use crate::span::Position;

    #[test]
    fn builders_attach_notes_and_tags() {
        let range = Range::at(Position::new(1, 2));
        let diagnostic = Diagnostic::warning("unused local variable", range)
            .with_tag(DiagnosticTag::Unnecessary)
            .with_related("declared here", Location { document: DocumentId(0), range });
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.tag, Some(DiagnosticTag::Unnecessary));
        assert_eq!(diagnostic.related.len(), 1);
    }
}
