//! Pattern grammar: literals, names, wildcards, tuples, constructors,
//! slices, aliases, and guards.

use rill_common::token::TokenKind;

use super::{MarkClosed, Parser};
use crate::syntax_kind::SyntaxKind;

/// Parse a pattern, including trailing `as` aliases and `if` guards.
pub(crate) fn parse_pattern(p: &mut Parser) -> Option<MarkClosed> {
    let mut pattern = parse_pattern_inner(p)?;

    // `pattern as [mut] name` binds the whole matched value.
    if p.at(TokenKind::As) {
        let m = p.open_before(pattern);
        p.advance(); // as
        p.eat(TokenKind::Mut);
        p.expect(TokenKind::Lower);
        pattern = p.close(m, SyntaxKind::ALIAS_PAT);
    }

    // `pattern if expr` guards the arm.
    if p.at(TokenKind::If) {
        let m = p.open_before(pattern);
        p.advance(); // if
        super::expressions::expr(p);
        pattern = p.close(m, SyntaxKind::GUARD_PAT);
    }

    Some(pattern)
}

fn parse_pattern_inner(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        TokenKind::IntLiteral
        | TokenKind::FloatLiteral
        | TokenKind::StrLiteral
        | TokenKind::CharLiteral
        | TokenKind::BoolLiteral => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::LITERAL_PAT))
        }

        TokenKind::Underscore => {
            let m = p.open();
            p.advance();
            Some(p.close(m, SyntaxKind::WILDCARD_PAT))
        }

        TokenKind::Mut | TokenKind::Immut => {
            let m = p.open();
            p.advance(); // mut / immut
            p.expect(TokenKind::Lower);
            Some(p.close(m, SyntaxKind::NAME_PAT))
        }

        // A lower name alone binds; followed by `::` it starts a
        // constructor path (`m::Enum::ctor`).
        TokenKind::Lower => {
            if p.nth(1) == TokenKind::ColonColon {
                Some(parse_constructor_pattern(p))
            } else {
                let m = p.open();
                p.advance();
                Some(p.close(m, SyntaxKind::NAME_PAT))
            }
        }

        TokenKind::Upper | TokenKind::Global => Some(parse_constructor_pattern(p)),

        // Abbreviated constructor: `::ctor(args)` resolves against the
        // matched type's enumeration.
        TokenKind::ColonColon => {
            let m = p.open();
            p.advance(); // ::
            p.expect(TokenKind::Lower);
            if p.at(TokenKind::LParen) {
                parse_pattern_arg_list(p);
            }
            Some(p.close(m, SyntaxKind::CTOR_PAT))
        }

        TokenKind::LParen => {
            let m = p.open();
            p.advance(); // (
            while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
                if parse_pattern(p).is_none() {
                    break;
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RParen);
            Some(p.close(m, SyntaxKind::TUPLE_PAT))
        }

        TokenKind::LBracket => {
            let m = p.open();
            p.advance(); // [
            while !p.at(TokenKind::RBracket) && !p.at(TokenKind::Eof) {
                if parse_pattern(p).is_none() {
                    break;
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RBracket);
            Some(p.close(m, SyntaxKind::SLICE_PAT))
        }

        _ => {
            p.expected("a pattern");
            None
        }
    }
}

/// `Path::ctor` with an optional parenthesized argument list.
fn parse_constructor_pattern(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    super::types::parse_path(p);
    if p.at(TokenKind::LParen) {
        parse_pattern_arg_list(p);
    }
    p.close(m, SyntaxKind::CTOR_PAT)
}

fn parse_pattern_arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
        if parse_pattern(p).is_none() {
            break;
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen);
    p.close(m, SyntaxKind::PAT_ARG_LIST);
}
