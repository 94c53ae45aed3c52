//! Event-based parser for Rill.
//!
//! The parser consumes the lexer's token stream and produces events
//! (Open/Close/Advance) that are later converted into a rowan green tree,
//! decoupling parsing logic from tree construction.
//!
//! # Architecture
//!
//! 1. Grammar functions call `open()` to start a node, `advance()` to
//!    consume tokens, and `close()` to finish a node with its actual kind.
//! 2. Events are collected into a flat `Vec<Event>`.
//! 3. `build_tree()` converts events into a rowan `GreenNode`, emitting
//!    each token's preceding trivia as a `TRIVIA` leaf so the tree text
//!    reproduces the source exactly.
//!
//! `open_before()` enables wrapping a previously completed node (e.g.
//! turning a path into `call_expr(path, arg_list)`) via the "forward
//! parent" technique.
//!
//! # Backtracking
//!
//! A grammar function that may decline without consuming anything takes a
//! [`Checkpoint`] at entry and calls `restore()` before returning `None`.
//! Restoring rewinds the token position, the event list, and the error
//! list, so a non-committing parser has no observable effect.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod patterns;
pub(crate) mod types;

use rill_common::diagnostic::Diagnostic;
use rill_common::span::Range;
use rill_common::token::{Token, TokenKind};

use crate::syntax_kind::SyntaxKind;

/// A parser event, later replayed into a rowan green tree.
#[derive(Debug)]
enum Event {
    /// Start a new CST node. The kind is initially TOMBSTONE and gets
    /// patched by `close()` with the real node kind.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    /// Finish the current CST node.
    Close,
    /// Consume the current token (with its trivia) into the tree.
    Advance,
}

/// An opaque marker for a started but not-yet-closed CST node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// An opaque marker for a completed CST node, usable with `open_before()`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

/// A snapshot of parser progress for backtracking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    events: usize,
    errors: usize,
}

pub(crate) struct Parser<'src> {
    /// All tokens from the lexer, ending with `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Collected parser events.
    events: Vec<Event>,
    /// Original source text, for token lexemes.
    source: &'src str,
    /// Collected parse errors.
    errors: Vec<Diagnostic>,
    /// Whether a `Path { … }` struct initializer may start here. Cleared
    /// while parsing the condition of `if`/`while`/`for`, where a brace
    /// opens the body instead.
    pub(crate) struct_init_allowed: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
            struct_init_allowed: true,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// The kind of the current token. `Eof` past the end.
    pub(crate) fn current(&self) -> TokenKind {
        self.nth(0)
    }

    /// The kind of the token `n` ahead of the current one.
    pub(crate) fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    /// The lexeme of the current token.
    pub(crate) fn current_text(&self) -> &str {
        self.tokens
            .get(self.pos)
            .map_or("", |token| token.text(self.source))
    }

    /// The (line, column) range of the current token.
    pub(crate) fn current_range(&self) -> Range {
        match self.tokens.get(self.pos) {
            Some(token) => token.range,
            None => self
                .tokens
                .last()
                .map_or(Range::at(Default::default()), |token| Range::at(token.range.stop)),
        }
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current())
    }

    // ── Node management ────────────────────────────────────────────────

    /// Start a new CST node. The returned marker must be passed to
    /// `close()` to finish it.
    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened { index: self.events.len() };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a new CST node *before* a previously completed node, making
    /// the completed node its first child.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = MarkOpened { index: self.events.len() };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    /// Close a CST node, patching its Open event with the actual kind.
    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open { kind: slot, .. } = &mut self.events[m.index] {
            *slot = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Token consumption ──────────────────────────────────────────────

    /// Consume the current token into the tree.
    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Consume the current token wrapped in an ERROR_NODE, recording an
    /// error message.
    pub(crate) fn advance_with_error(&mut self, message: &str) {
        self.error(message);
        self.advance_error_node();
    }

    /// Consume the current token wrapped in an ERROR_NODE. Used when the
    /// error has already been reported.
    pub(crate) fn advance_error_node(&mut self) {
        let m = self.open();
        self.advance();
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    /// If the current token matches, consume it and return true.
    /// Otherwise report `expected <kind>, but found <current>`.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.expected(kind.description());
        false
    }

    /// If the current token matches, consume it and return true.
    /// No error otherwise.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Errors and recovery ────────────────────────────────────────────

    /// Record a parse error at the current token.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(Diagnostic::error(message, range));
    }

    /// Record `expected <what>, but found <current token>`.
    pub(crate) fn expected(&mut self, what: &str) {
        let found = self.current().description();
        self.error(format!("expected {what}, but found {found}"));
    }

    /// Skip tokens (wrapped in an ERROR_NODE) until one of `kinds` or end
    /// of input. Used after a committed parser reported an error.
    pub(crate) fn recover_until(&mut self, kinds: &[TokenKind]) {
        if self.at_any(kinds) || self.at(TokenKind::Eof) {
            return;
        }
        let m = self.open();
        while !self.at_any(kinds) && !self.at(TokenKind::Eof) {
            self.advance();
        }
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    // ── Backtracking ───────────────────────────────────────────────────

    /// Snapshot the parser state. Restoring erases every token, event,
    /// and error recorded since.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            events: self.events.len(),
            errors: self.errors.len(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.events.truncate(checkpoint.events);
        self.errors.truncate(checkpoint.errors);
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert collected events into a rowan `GreenNode` plus errors.
    ///
    /// Each Advance emits the token's trivia as a `TRIVIA` leaf followed
    /// by the lexeme itself, so `SyntaxNode::text()` equals the source.
    /// Forward-parent chains from `open_before()` are unfolded so wrapper
    /// nodes open outermost-first.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<Diagnostic>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos: usize = 0;
        let mut forward_parents: Vec<(usize, SyntaxKind)> = Vec::new();

        let mut i = 0;
        while i < self.events.len() {
            match self.events[i] {
                Event::Open { kind, forward_parent } => {
                    if forward_parent.is_some() {
                        forward_parents.clear();
                        let mut current = i;
                        loop {
                            let (fk, fp) = match self.events[current] {
                                Event::Open { kind, forward_parent } => (kind, forward_parent),
                                _ => unreachable!("forward parent must point at an Open event"),
                            };
                            forward_parents.push((current, fk));
                            match fp {
                                Some(next) => current = next,
                                None => break,
                            }
                        }
                        // Tombstone the wrapper Opens so they are skipped
                        // when the scan reaches them.
                        for &(index, _) in forward_parents.iter().skip(1) {
                            if let Event::Open { kind, forward_parent } = &mut self.events[index] {
                                *kind = SyntaxKind::TOMBSTONE;
                                *forward_parent = None;
                            }
                        }
                        if let Event::Open { forward_parent, .. } = &mut self.events[i] {
                            *forward_parent = None;
                        }
                        for &(_, fk) in forward_parents.iter().rev() {
                            if fk != SyntaxKind::TOMBSTONE {
                                builder.start_node(rowan::SyntaxKind(fk as u16));
                            }
                        }
                    } else if kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(kind as u16));
                    }
                }
                Event::Close => {
                    builder.finish_node();
                }
                Event::Advance => {
                    if token_pos < self.tokens.len() {
                        let token = &self.tokens[token_pos];
                        let trivia = token.trivia(self.source);
                        if !trivia.is_empty() {
                            builder.token(rowan::SyntaxKind(SyntaxKind::TRIVIA as u16), trivia);
                        }
                        let kind = SyntaxKind::from(token.kind);
                        builder.token(rowan::SyntaxKind(kind as u16), token.text(self.source));
                        token_pos += 1;
                    }
                }
            }
            i += 1;
        }

        (builder.finish(), self.errors)
    }
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a complete source file: definitions until end of input, with
/// recovery at definition keywords and semicolons.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();

    loop {
        while p.eat(TokenKind::Semicolon) {}
        if p.at(TokenKind::Eof) {
            break;
        }
        items::parse_definition(p);
    }

    p.advance(); // Eof, carrying any trailing trivia.
    p.close(root, SyntaxKind::SOURCE_FILE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_lexer::Lexer;

    #[test]
    fn build_tree_preserves_source_text() {
        let source = "let x = 5";
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens, source);

        let root = parser.open();
        let binding = parser.open();
        parser.advance(); // let
        parser.advance(); // x
        parser.advance(); // =
        parser.advance(); // 5
        parser.close(binding, SyntaxKind::LET_EXPR);
        parser.advance(); // Eof
        parser.close(root, SyntaxKind::SOURCE_FILE);

        let (green, errors) = parser.build_tree();
        assert!(errors.is_empty());

        let root = crate::cst::SyntaxNode::new_root(green);
        assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
        // Trivia leaves restore the whitespace between tokens.
        assert_eq!(root.text().to_string(), source);

        let children: Vec<_> = root.children().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), SyntaxKind::LET_EXPR);
    }

    #[test]
    fn open_before_wraps_completed_node() {
        let source = "f(42)";
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens, source);

        let root = parser.open();
        let name = parser.open();
        parser.advance(); // f
        let name_closed = parser.close(name, SyntaxKind::PATH_EXPR);

        let call = parser.open_before(name_closed);
        parser.advance(); // (
        parser.advance(); // 42
        parser.advance(); // )
        parser.close(call, SyntaxKind::CALL_EXPR);

        parser.advance(); // Eof
        parser.close(root, SyntaxKind::SOURCE_FILE);

        let (green, errors) = parser.build_tree();
        assert!(errors.is_empty());

        let root = crate::cst::SyntaxNode::new_root(green);
        let call = root.children().next().unwrap();
        assert_eq!(call.kind(), SyntaxKind::CALL_EXPR);
        assert_eq!(call.children().next().unwrap().kind(), SyntaxKind::PATH_EXPR);
    }

    #[test]
    fn restore_discards_tokens_events_and_errors() {
        let source = "let x";
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens, source);

        let checkpoint = parser.checkpoint();
        let m = parser.open();
        parser.advance();
        parser.error("speculative failure");
        parser.close(m, SyntaxKind::ERROR_NODE);
        parser.restore(checkpoint);

        assert_eq!(parser.current(), TokenKind::Let);
        assert!(parser.errors.is_empty());
        assert!(parser.events.is_empty());
    }

    #[test]
    fn expect_reports_expected_but_found() {
        let source = "let x";
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens, source);

        assert!(parser.expect(TokenKind::Let));
        assert!(!parser.expect(TokenKind::Let));
        assert_eq!(parser.errors.len(), 1);
        assert_eq!(
            parser.errors[0].message,
            "expected a keyword, but found an uncapitalized identifier"
        );
    }
}
