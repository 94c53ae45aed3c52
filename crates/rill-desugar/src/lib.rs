//! Rill desugarer: a pure, bottom-up CST → AST rewriter.
//!
//! Replaces sugared constructs with canonical forms while preserving the
//! source range of every node:
//!
//! - `while c { b }`        → `loop { if c { b } else break () }`
//! - `while let p = e { b }`→ `loop { match e { p -> { b } _ -> break () } }`
//! - `if c { t }`           → `if c { t } else ()`
//! - `if let p = e { t }`   → `match e { p -> { t } _ -> () }`
//! - `discard e`            → `{ let _ = e; () }`
//! - `fn f() = e`           → `fn f() { e }`
//! - `let a, b = e`         → `let (a, b) = e`
//! - match case `p, q -> e` → `(p, q) -> e`
//! - operator chains        → left-associative trees by precedence class
//!
//! Paren nodes and token-presence fields are erased; trivia never reaches
//! the AST.

pub mod ast;
mod definitions;
pub mod display;
mod expressions;
mod patterns;
mod types;

use rill_common::db::DocumentId;
use rill_common::diagnostic::Diagnostic;
use rill_common::intern::Interner;
use rill_common::span::{LineIndex, Range};
use rill_parser::cst::{SyntaxNode, SyntaxToken};

use ast::{AstArena, Expression, ExpressionKind, Name, Pattern, PatternKind};

/// Rewrites CST nodes of one document into AST nodes.
///
/// The desugarer appends into a caller-owned arena so a document's
/// definitions can share one arena across separate desugaring calls, the
/// way the collection phase drives it. Diagnostics accumulate here and
/// are drained by the caller into the document.
pub struct Desugarer<'a> {
    pub interner: &'a mut Interner,
    pub arena: &'a mut AstArena,
    pub document: DocumentId,
    text: String,
    line_index: LineIndex,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Desugarer<'a> {
    pub fn new(
        interner: &'a mut Interner,
        arena: &'a mut AstArena,
        document: DocumentId,
        text: &str,
    ) -> Self {
        Self {
            interner,
            arena,
            document,
            text: text.to_owned(),
            line_index: LineIndex::new(text),
            diagnostics: Vec::new(),
        }
    }

    /// Drain accumulated diagnostics; the caller appends them to the
    /// document.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // ── Shared helpers ─────────────────────────────────────────────────

    /// The source range of a node. A node carries the trivia attached to
    /// its first token, so the range starts at the first real token.
    pub(crate) fn range_of(&self, node: &SyntaxNode) -> Range {
        let start = node
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() != rill_parser::SyntaxKind::TRIVIA)
            .map(|token| token.text_range().start())
            .unwrap_or_else(|| node.text_range().start());
        let text_range = node.text_range();
        self.line_index
            .range_at(&self.text, start.into(), text_range.end().into())
    }

    pub(crate) fn token_range(&self, token: &SyntaxToken) -> Range {
        let text_range = token.text_range();
        self.line_index
            .range_at(&self.text, text_range.start().into(), text_range.end().into())
    }

    /// The source range of a node, public for the collection phase that
    /// drives desugaring.
    pub fn range_of_node(&self, node: &SyntaxNode) -> Range {
        self.range_of(node)
    }

    /// Intern a name token. Public for the collection phase.
    pub fn name(&mut self, token: &SyntaxToken) -> Name {
        let text = token.text();
        Name {
            id: self.interner.intern(text),
            is_upper: text.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
            range: self.token_range(token),
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, range: Range) {
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    pub(crate) fn unit(&mut self, range: Range) -> ast::ExpressionId {
        self.arena.alloc_expression(Expression {
            kind: ExpressionKind::Tuple(Vec::new()),
            range,
        })
    }

    pub(crate) fn error_expression(&mut self, range: Range) -> ast::ExpressionId {
        self.arena.alloc_expression(Expression {
            kind: ExpressionKind::Error,
            range,
        })
    }

    pub(crate) fn wildcard_pattern(&mut self, range: Range) -> ast::PatternId {
        self.arena.alloc_pattern(Pattern {
            kind: PatternKind::Wildcard,
            range,
        })
    }

    // ── Literal evaluation ─────────────────────────────────────────────

    /// Evaluate an integer literal: decimal with an optional exponent
    /// (`5e3` is 5000), or hexadecimal after `0x`. Underscores separate.
    /// Returns `None` (with a diagnostic) when the digits do not form a
    /// value, e.g. the greedy lexeme `0hello`.
    pub(crate) fn integer_value(&mut self, text: &str, range: Range) -> Option<u64> {
        let digits: String = text.chars().filter(|&c| c != '_').collect();

        let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16).ok()
        } else if let Some((mantissa, exponent)) = digits.split_once(['e', 'E']) {
            let mantissa: Option<u64> = mantissa.parse().ok();
            let exponent: Option<u32> = exponent.parse().ok();
            mantissa.zip(exponent).and_then(|(mantissa, exponent)| {
                10u64.checked_pow(exponent).and_then(|scale| mantissa.checked_mul(scale))
            })
        } else {
            digits.parse().ok()
        };

        if value.is_none() {
            self.error(format!("invalid integer literal '{text}'"), range);
        }
        value
    }

    pub(crate) fn floating_value(&mut self, text: &str, range: Range) -> Option<f64> {
        let digits: String = text.chars().filter(|&c| c != '_').collect();
        let value = digits.parse().ok();
        if value.is_none() {
            self.error(format!("invalid floating-point literal '{text}'"), range);
        }
        value
    }

    /// Decode one escape sequence character (the character after `\`).
    pub(crate) fn escape_value(&mut self, c: char, range: Range) -> Option<char> {
        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '0' => Some('\0'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => {
                self.error(format!("unrecognized escape sequence '\\{c}'"), range);
                None
            }
        }
    }

    pub(crate) fn character_value(&mut self, text: &str, range: Range) -> Option<char> {
        let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut chars = inner.chars();
        let value = match chars.next()? {
            '\\' => self.escape_value(chars.next()?, range)?,
            c => c,
        };
        if chars.next().is_some() {
            self.error("character literal contains more than one character", range);
            return None;
        }
        Some(value)
    }

    pub(crate) fn string_value(&mut self, text: &str, range: Range) -> String {
        let inner = text
            .strip_prefix('"')
            .map(|rest| rest.strip_suffix('"').unwrap_or(rest))
            .unwrap_or(text);
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                value.push(c);
                continue;
            }
            match chars.next() {
                Some(escaped) => {
                    if let Some(decoded) = self.escape_value(escaped, range) {
                        value.push(decoded);
                    }
                }
                None => break,
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_common::db::Database;
    use rill_common::span::Position;

    fn desugarer_parts() -> (Interner, AstArena) {
        (Interner::new(), AstArena::new())
    }

    fn test_range() -> Range {
        Range::at(Position::new(0, 0))
    }

    #[test]
    fn integer_values() {
        let mut db = Database::new();
        let id = db.test_document("");
        let (mut interner, mut arena) = desugarer_parts();
        let mut desugarer = Desugarer::new(&mut interner, &mut arena, id, "");

        assert_eq!(desugarer.integer_value("50", test_range()), Some(50));
        assert_eq!(desugarer.integer_value("5e3", test_range()), Some(5000));
        assert_eq!(desugarer.integer_value("0xdead_beef", test_range()), Some(0xdead_beef));
        assert_eq!(desugarer.integer_value("1_000", test_range()), Some(1000));
        assert!(desugarer.diagnostics.is_empty());

        assert_eq!(desugarer.integer_value("0hello", test_range()), None);
        assert_eq!(desugarer.diagnostics.len(), 1);
    }

    #[test]
    fn character_values() {
        let mut db = Database::new();
        let id = db.test_document("");
        let (mut interner, mut arena) = desugarer_parts();
        let mut desugarer = Desugarer::new(&mut interner, &mut arena, id, "");

        assert_eq!(desugarer.character_value("'x'", test_range()), Some('x'));
        assert_eq!(desugarer.character_value("'\\n'", test_range()), Some('\n'));
        assert_eq!(desugarer.character_value("'\\''", test_range()), Some('\''));
        assert!(desugarer.diagnostics.is_empty());
    }

    #[test]
    fn string_values_decode_escapes() {
        let mut db = Database::new();
        let id = db.test_document("");
        let (mut interner, mut arena) = desugarer_parts();
        let mut desugarer = Desugarer::new(&mut interner, &mut arena, id, "");

        assert_eq!(
            desugarer.string_value("\"a\\tb\\n\"", test_range()),
            "a\tb\n"
        );
        assert!(desugarer.diagnostics.is_empty());
    }
}
