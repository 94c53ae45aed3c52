//! Shared types for the Rill compiler.
//!
//! This crate is the ambient dependency of every phase: source positions
//! and ranges, the token alphabet, string interning, diagnostics, and the
//! document database that owns them all.

pub mod db;
pub mod diagnostic;
pub mod intern;
pub mod span;
pub mod token;

pub use db::{Database, Document, DocumentId, ReferenceAnnotation, SemanticToken, SemanticTokenKind};
pub use diagnostic::{Diagnostic, DiagnosticTag, RelatedNote, Severity};
pub use intern::{Interner, StringId};
pub use span::{byte_offset, byte_range, edit_text, text_range, LineIndex, Location, Position, Range};
pub use token::{keyword_from_str, Token, TokenKind};
