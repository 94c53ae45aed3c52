//! The document database.
//!
//! A [`Database`] owns the string pool and every open document for the
//! lifetime of a compilation. Phases receive `&mut Database` and write
//! diagnostics, semantic tokens, and reference annotations through it;
//! tree arenas are phase state and live with the phase that produces them.

use serde::Serialize;

use crate::diagnostic::{Diagnostic, Severity};
use crate::intern::Interner;
use crate::span::{edit_text, Location, Range};
use crate::token::TokenKind;

/// Index of a document in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentId(pub u32);

/// Classification handed to a semantic-token client.
///
/// The parser pushes a coarse kind for every token it consumes; the
/// resolver upgrades names once it knows what they refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SemanticTokenKind {
    Number,
    String,
    Comment,
    Variable,
    Keyword,
    Operator,
    Function,
    Type,
    EnumMember,
    Module,
    Parameter,
}

impl SemanticTokenKind {
    /// The coarse classification of a token kind, before resolution.
    /// Returns `None` for tokens that get no color.
    pub fn of_token(kind: TokenKind) -> Option<SemanticTokenKind> {
        use TokenKind::*;
        match kind {
            IntLiteral | FloatLiteral | BoolLiteral => Some(SemanticTokenKind::Number),
            StrLiteral | UnterminatedString => Some(SemanticTokenKind::String),
            UnterminatedComment => Some(SemanticTokenKind::Comment),
            CharLiteral => Some(SemanticTokenKind::String),
            Lower | Upper => Some(SemanticTokenKind::Variable),
            Let | Mut | Immut | If | Else | Elif | For | In | While | Loop | Continue
            | Break | Match | Ret | Discard | Fn | As | Enum | Struct | Concept | Impl
            | Alias | Import | Export | Module | Sizeof | Typeof | Where | Dyn | Macro
            | Global | Defer => Some(SemanticTokenKind::Keyword),
            Dot | Comma | Colon | Semicolon | ColonColon | Amp | Star | Plus | Question
            | Bang | Eq | Pipe | Backslash | LArrow | RArrow | LParen | RParen | LBrace
            | RBrace | LBracket | RBracket | Underscore | Op => Some(SemanticTokenKind::Operator),
            Eof | InvalidCharacter => None,
        }
    }
}

/// A colored region of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SemanticToken {
    pub range: Range,
    pub kind: SemanticTokenKind,
}

/// A resolved name usage: the range of the usage and the location of the
/// definition it refers to. Consumed by go-to-definition and references.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceAnnotation {
    pub range: Range,
    pub target: Location,
}

/// One open source document plus everything the pipeline has derived
/// from it so far.
#[derive(Debug)]
pub struct Document {
    pub path: String,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    pub semantic_tokens: Vec<SemanticToken>,
    pub references: Vec<ReferenceAnnotation>,
}

impl Document {
    fn new(path: String, text: String) -> Self {
        Self {
            path,
            text,
            diagnostics: Vec::new(),
            semantic_tokens: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Apply a text edit and drop all derived state; the caller re-runs
    /// the pipeline when it next needs answers.
    pub fn edit(&mut self, range: Range, replacement: &str) {
        edit_text(&mut self.text, range, replacement);
        self.diagnostics.clear();
        self.semantic_tokens.clear();
        self.references.clear();
    }

    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }
}

/// Owns the string pool and documents for one compilation.
#[derive(Debug, Default)]
pub struct Database {
    pub interner: Interner,
    documents: Vec<Document>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document and return its id.
    pub fn add_document(&mut self, path: impl Into<String>, text: impl Into<String>) -> DocumentId {
        let id = DocumentId(self.documents.len() as u32);
        self.documents.push(Document::new(path.into(), text.into()));
        id
    }

    /// Find a previously registered document by path.
    pub fn find_document(&self, path: &str) -> Option<DocumentId> {
        self.documents
            .iter()
            .position(|document| document.path == path)
            .map(|index| DocumentId(index as u32))
    }

    /// Register a document under the `[test]` path. Test helper.
    pub fn test_document(&mut self, text: impl Into<String>) -> DocumentId {
        self.add_document("[test]", text)
    }

    pub fn document(&self, id: DocumentId) -> &Document {
        &self.documents[id.0 as usize]
    }

    pub fn document_mut(&mut self, id: DocumentId) -> &mut Document {
        &mut self.documents[id.0 as usize]
    }

    /// Append a diagnostic to a document.
    pub fn emit(&mut self, id: DocumentId, diagnostic: Diagnostic) {
        self.document_mut(id).diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Position, Range};

    #[test]
    fn find_document_by_path() {
        let mut db = Database::new();
        let a = db.add_document("path A", "content A");
        let b = db.add_document("path B", "content B");
        let c = db.add_document("path C", "content C");

        assert_eq!(db.find_document("path A"), Some(a));
        assert_eq!(db.find_document("path B"), Some(b));
        assert_eq!(db.find_document("path C"), Some(c));
        assert_eq!(db.find_document("path D"), None);
    }

    #[test]
    fn edit_clears_derived_state() {
        let mut db = Database::new();
        let id = db.test_document("lo");
        let range = Range::at(Position::new(0, 0));
        db.emit(id, Diagnostic::error("boom", range));
        assert!(db.document(id).has_errors());

        db.document_mut(id).edit(range, "hel");
        assert_eq!(db.document(id).text, "hello");
        assert!(db.document(id).diagnostics.is_empty());
    }

    #[test]
    fn semantic_token_mapping() {
        assert_eq!(
            SemanticTokenKind::of_token(TokenKind::IntLiteral),
            Some(SemanticTokenKind::Number)
        );
        assert_eq!(
            SemanticTokenKind::of_token(TokenKind::UnterminatedString),
            Some(SemanticTokenKind::String)
        );
        assert_eq!(
            SemanticTokenKind::of_token(TokenKind::UnterminatedComment),
            Some(SemanticTokenKind::Comment)
        );
        assert_eq!(SemanticTokenKind::of_token(TokenKind::InvalidCharacter), None);
        assert_eq!(SemanticTokenKind::of_token(TokenKind::Eof), None);
    }
}
