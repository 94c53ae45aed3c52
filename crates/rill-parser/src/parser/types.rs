//! Type grammar: paths, tuples, slices, arrays, function types,
//! references, pointers, `typeof`, and the wildcard type.

use rill_common::token::TokenKind;

use super::{MarkClosed, Parser};
use crate::syntax_kind::SyntaxKind;

/// Parse a type. Reports an error and returns `None` if the current token
/// cannot begin one; the caller decides how to recover.
pub(crate) fn parse_type(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        TokenKind::LParen => Some(parse_tuple_type(p)),
        TokenKind::LBracket => Some(parse_slice_or_array_type(p)),
        TokenKind::Fn => Some(parse_fn_type(p)),
        TokenKind::Amp => Some(parse_ref_or_ptr_type(p, TokenKind::Amp, SyntaxKind::REF_TYPE)),
        TokenKind::Star => Some(parse_ref_or_ptr_type(p, TokenKind::Star, SyntaxKind::PTR_TYPE)),
        TokenKind::Underscore => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::WILDCARD_TYPE))
        }
        TokenKind::Typeof => {
            // `typeof(x)` alone, or the root of a longer path.
            let typeof_type = parse_typeof_type(p);
            if p.at(TokenKind::ColonColon) {
                let path = p.open_before(typeof_type);
                parse_path_segments_after_root(p);
                let path = p.close(path, SyntaxKind::PATH);
                let m = p.open_before(path);
                Some(p.close(m, SyntaxKind::PATH_TYPE))
            } else {
                Some(typeof_type)
            }
        }
        TokenKind::Lower | TokenKind::Upper | TokenKind::Global => {
            let m = p.open();
            parse_path(p);
            Some(p.close(m, SyntaxKind::PATH_TYPE))
        }
        _ => {
            p.expected("a type");
            None
        }
    }
}

/// `()` | `(T)` | `(T, U, …)`. A single element without a trailing comma
/// is plain grouping; the desugarer erases the paren node.
fn parse_tuple_type(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // (
    while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
        if parse_type(p).is_none() {
            break;
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen);
    p.close(m, SyntaxKind::TUPLE_TYPE)
}

/// `[T]` (slice) or `[T; length]` (array).
fn parse_slice_or_array_type(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // [
    parse_type(p);
    let kind = if p.eat(TokenKind::Semicolon) {
        super::expressions::expr(p);
        SyntaxKind::ARRAY_TYPE
    } else {
        SyntaxKind::SLICE_TYPE
    };
    p.expect(TokenKind::RBracket);
    p.close(m, kind)
}

/// `fn(T, U): R`.
fn parse_fn_type(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // fn
    p.expect(TokenKind::LParen);
    while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
        if parse_type(p).is_none() {
            break;
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen);
    let annotation = p.open();
    p.expect(TokenKind::Colon);
    parse_type(p);
    p.close(annotation, SyntaxKind::TYPE_ANNOTATION);
    p.close(m, SyntaxKind::FN_TYPE)
}

/// `&[mutability] T` or `*[mutability] T`.
fn parse_ref_or_ptr_type(p: &mut Parser, sigil: TokenKind, kind: SyntaxKind) -> MarkClosed {
    let m = p.open();
    debug_assert!(p.at(sigil));
    p.advance();
    parse_mutability_opt(p);
    parse_type(p);
    p.close(m, kind)
}

/// `typeof(expr)`.
pub(crate) fn parse_typeof_type(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // typeof
    p.expect(TokenKind::LParen);
    let saved = p.struct_init_allowed;
    p.struct_init_allowed = true;
    super::expressions::expr(p);
    p.struct_init_allowed = saved;
    p.expect(TokenKind::RParen);
    p.close(m, SyntaxKind::TYPEOF_TYPE)
}

/// Optional mutability: `mut`, `immut`, or a lower-case mutability
/// parameter name. A lower name followed by `::` is the start of the
/// referenced type's path instead, so it is left alone.
pub(crate) fn parse_mutability_opt(p: &mut Parser) -> bool {
    match p.current() {
        TokenKind::Mut | TokenKind::Immut => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::MUTABILITY);
            true
        }
        TokenKind::Lower if p.nth(1) != TokenKind::ColonColon => {
            let m = p.open();
            p.advance();
            p.close(m, SyntaxKind::MUTABILITY);
            true
        }
        _ => false,
    }
}

// ── Paths ──────────────────────────────────────────────────────────────

/// Parse a path: `[global::] segment (:: segment)*`, where each segment is
/// a name with an optional `[…]` template argument list. `typeof`-rooted
/// paths are handled by the callers that allow them.
pub(crate) fn parse_path(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    if p.at(TokenKind::Global) {
        p.advance();
        p.expect(TokenKind::ColonColon);
    }
    parse_path_segment(p);
    while p.at(TokenKind::ColonColon) {
        p.advance();
        parse_path_segment(p);
    }
    p.close(m, SyntaxKind::PATH)
}

/// Continue a path after an already-parsed root: `(:: segment)+`.
pub(crate) fn parse_path_segments_after_root(p: &mut Parser) {
    while p.at(TokenKind::ColonColon) {
        p.advance();
        parse_path_segment(p);
    }
}

fn parse_path_segment(p: &mut Parser) {
    let m = p.open();
    match p.current() {
        TokenKind::Lower | TokenKind::Upper => p.advance(),
        _ => p.expected("an identifier"),
    }
    if p.at(TokenKind::LBracket) {
        parse_template_arg_list(p);
    }
    p.close(m, SyntaxKind::PATH_SEGMENT);
}

/// `[…]` template arguments: types and mutabilities, comma-separated,
/// possibly empty.
pub(crate) fn parse_template_arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // [
    while !p.at(TokenKind::RBracket) && !p.at(TokenKind::Eof) {
        match p.current() {
            TokenKind::Mut | TokenKind::Immut => {
                let arg = p.open();
                p.advance();
                p.close(arg, SyntaxKind::MUTABILITY);
            }
            _ => {
                if parse_type(p).is_none() {
                    break;
                }
            }
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RBracket);
    p.close(m, SyntaxKind::TEMPLATE_ARG_LIST);
}
