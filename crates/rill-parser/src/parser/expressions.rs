//! Expression grammar.
//!
//! Operator chains are kept flat in the CST: `a * b + c` parses to one
//! `OPERATOR_CHAIN_EXPR` with three operands and two operator tokens.
//! Precedence classes are applied by the desugarer, which keeps the tree
//! lossless and the parser free of precedence tables.

use rill_common::token::TokenKind;

use super::{MarkClosed, Parser};
use crate::syntax_kind::SyntaxKind;

/// Tokens that can begin an expression.
pub(crate) const EXPR_FIRST: &[TokenKind] = &[
    TokenKind::IntLiteral,
    TokenKind::FloatLiteral,
    TokenKind::StrLiteral,
    TokenKind::CharLiteral,
    TokenKind::BoolLiteral,
    TokenKind::Lower,
    TokenKind::Upper,
    TokenKind::Underscore,
    TokenKind::Global,
    TokenKind::Typeof,
    TokenKind::LParen,
    TokenKind::LBracket,
    TokenKind::LBrace,
    TokenKind::Amp,
    TokenKind::Star,
    TokenKind::If,
    TokenKind::Match,
    TokenKind::Loop,
    TokenKind::While,
    TokenKind::For,
    TokenKind::Break,
    TokenKind::Continue,
    TokenKind::Ret,
    TokenKind::Discard,
    TokenKind::Defer,
    TokenKind::Let,
    TokenKind::Sizeof,
];

fn at_expr_start(p: &Parser) -> bool {
    p.at_any(EXPR_FIRST)
}

fn is_chain_operator(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Op | TokenKind::Star | TokenKind::Plus)
}

/// Parse an expression. Reports an error and returns `None` if the
/// current token cannot begin one.
pub(crate) fn expr(p: &mut Parser) -> Option<MarkClosed> {
    let lhs = operand(p)?;

    if !is_chain_operator(p.current()) {
        return Some(lhs);
    }

    let m = p.open_before(lhs);
    while is_chain_operator(p.current()) {
        p.advance(); // operator
        if operand(p).is_none() {
            break;
        }
    }
    Some(p.close(m, SyntaxKind::OPERATOR_CHAIN_EXPR))
}

/// Parse an expression, wrapping the offending token in an error node if
/// there is none. For positions where an expression is mandatory.
pub(crate) fn expr_required(p: &mut Parser) {
    if expr(p).is_none() && !p.at(TokenKind::Eof) {
        p.advance_error_node();
    }
}

/// Parse an expression with struct initializers disabled, for the
/// condition/scrutinee positions where `{` opens the body instead.
fn expr_no_struct(p: &mut Parser) -> Option<MarkClosed> {
    let saved = p.struct_init_allowed;
    p.struct_init_allowed = false;
    let result = expr(p);
    p.struct_init_allowed = saved;
    result
}

// ── Operands: atoms plus postfix operators ─────────────────────────────

fn operand(p: &mut Parser) -> Option<MarkClosed> {
    let (mut lhs, mut is_path) = atom(p)?;

    loop {
        match p.current() {
            TokenKind::LParen => {
                let m = p.open_before(lhs);
                parse_arg_list(p);
                lhs = p.close(m, SyntaxKind::CALL_EXPR);
            }
            TokenKind::Dot => {
                lhs = parse_dot_postfix(p, lhs);
            }
            TokenKind::As => {
                let m = p.open_before(lhs);
                p.advance(); // as
                super::types::parse_type(p);
                lhs = p.close(m, SyntaxKind::CAST_EXPR);
            }
            TokenKind::Colon => {
                let m = p.open_before(lhs);
                p.advance(); // :
                super::types::parse_type(p);
                lhs = p.close(m, SyntaxKind::ASCRIPTION_EXPR);
            }
            TokenKind::LBrace if is_path && p.struct_init_allowed => {
                let m = p.open_before(lhs);
                parse_struct_init_fields(p);
                lhs = p.close(m, SyntaxKind::STRUCT_INIT_EXPR);
            }
            _ => break,
        }
        is_path = false;
    }

    Some(lhs)
}

/// `.name`, `.0`, `.name[T…](args)`, or `.[index]` after a receiver.
fn parse_dot_postfix(p: &mut Parser, lhs: MarkClosed) -> MarkClosed {
    let m = p.open_before(lhs);
    p.advance(); // .
    match p.current() {
        TokenKind::Lower => {
            let is_method_call = matches!(p.nth(1), TokenKind::LParen | TokenKind::LBracket);
            let name = p.open();
            p.advance();
            p.close(name, SyntaxKind::NAME);
            if is_method_call {
                if p.at(TokenKind::LBracket) {
                    super::types::parse_template_arg_list(p);
                }
                if p.at(TokenKind::LParen) {
                    parse_arg_list(p);
                } else {
                    p.expected("an argument list");
                }
                p.close(m, SyntaxKind::METHOD_CALL_EXPR)
            } else {
                p.close(m, SyntaxKind::FIELD_EXPR)
            }
        }
        TokenKind::IntLiteral => {
            p.advance();
            p.close(m, SyntaxKind::FIELD_EXPR)
        }
        TokenKind::LBracket => {
            p.advance(); // [
            let saved = p.struct_init_allowed;
            p.struct_init_allowed = true;
            expr_required(p);
            p.struct_init_allowed = saved;
            p.expect(TokenKind::RBracket);
            p.close(m, SyntaxKind::INDEX_EXPR)
        }
        _ => {
            p.expected("a member name");
            p.close(m, SyntaxKind::FIELD_EXPR)
        }
    }
}

/// `(expr, …)` call arguments.
fn parse_arg_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // (
    let saved = p.struct_init_allowed;
    p.struct_init_allowed = true;
    while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
        if expr(p).is_none() {
            break;
        }
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.struct_init_allowed = saved;
    p.expect(TokenKind::RParen);
    p.close(m, SyntaxKind::ARG_LIST);
}

/// `{ field = expr, … }` after a path.
fn parse_struct_init_fields(p: &mut Parser) {
    p.advance(); // {
    let saved = p.struct_init_allowed;
    p.struct_init_allowed = true;
    while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
        let field = p.open();
        if !p.expect(TokenKind::Lower) {
            p.close(field, SyntaxKind::ERROR_NODE);
            p.recover_until(&[TokenKind::Comma, TokenKind::RBrace]);
            if !p.eat(TokenKind::Comma) {
                break;
            }
            continue;
        }
        p.expect(TokenKind::Eq);
        expr_required(p);
        p.close(field, SyntaxKind::STRUCT_INIT_FIELD);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.struct_init_allowed = saved;
    p.expect(TokenKind::RBrace);
}

// ── Atoms ──────────────────────────────────────────────────────────────

/// Parse an atomic expression. The boolean is true when the atom is a
/// plain path, which is the only thing a struct initializer may follow.
fn atom(p: &mut Parser) -> Option<(MarkClosed, bool)> {
    match p.current() {
        TokenKind::IntLiteral
        | TokenKind::FloatLiteral
        | TokenKind::StrLiteral
        | TokenKind::CharLiteral
        | TokenKind::BoolLiteral => {
            let m = p.open();
            p.advance();
            Some((p.close(m, SyntaxKind::LITERAL), false))
        }

        TokenKind::Lower | TokenKind::Upper | TokenKind::Global => {
            let m = p.open();
            super::types::parse_path(p);
            Some((p.close(m, SyntaxKind::PATH_EXPR), true))
        }

        // `typeof(x)` or `typeof(x)::T`, usable as a struct initializer
        // head.
        TokenKind::Typeof => {
            let m = p.open();
            let path = p.open();
            super::types::parse_typeof_type(p);
            super::types::parse_path_segments_after_root(p);
            p.close(path, SyntaxKind::PATH);
            Some((p.close(m, SyntaxKind::PATH_EXPR), true))
        }

        TokenKind::Amp => {
            let m = p.open();
            p.advance(); // &
            if p.at(TokenKind::Mut) || p.at(TokenKind::Immut) {
                let mutability = p.open();
                p.advance();
                p.close(mutability, SyntaxKind::MUTABILITY);
            }
            if operand(p).is_none() {
                // error already reported by the inner atom
            }
            Some((p.close(m, SyntaxKind::REF_EXPR), false))
        }

        TokenKind::Star => {
            let m = p.open();
            p.advance(); // *
            let _ = operand(p);
            Some((p.close(m, SyntaxKind::DEREF_EXPR), false))
        }

        TokenKind::LParen => {
            let m = p.open();
            p.advance(); // (
            let saved = p.struct_init_allowed;
            p.struct_init_allowed = true;
            while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
                if expr(p).is_none() {
                    break;
                }
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.struct_init_allowed = saved;
            p.expect(TokenKind::RParen);
            Some((p.close(m, SyntaxKind::TUPLE_EXPR), false))
        }

        // Array literal with semicolon-separated elements: `[a; b; c]`.
        TokenKind::LBracket => {
            let m = p.open();
            p.advance(); // [
            let saved = p.struct_init_allowed;
            p.struct_init_allowed = true;
            while !p.at(TokenKind::RBracket) && !p.at(TokenKind::Eof) {
                if expr(p).is_none() {
                    break;
                }
                if !p.eat(TokenKind::Semicolon) {
                    break;
                }
            }
            p.struct_init_allowed = saved;
            p.expect(TokenKind::RBracket);
            Some((p.close(m, SyntaxKind::ARRAY_EXPR), false))
        }

        TokenKind::LBrace => parse_block(p).map(|m| (m, false)),

        TokenKind::If => Some((parse_if(p), false)),
        TokenKind::Match => Some((parse_match(p), false)),
        TokenKind::Loop => {
            let m = p.open();
            p.advance();
            parse_block_required(p);
            Some((p.close(m, SyntaxKind::LOOP_EXPR), false))
        }
        TokenKind::While => {
            let m = p.open();
            p.advance();
            parse_condition(p);
            parse_block_required(p);
            Some((p.close(m, SyntaxKind::WHILE_EXPR), false))
        }
        TokenKind::For => {
            let m = p.open();
            p.advance(); // for
            if super::patterns::parse_pattern(p).is_none() && !p.at(TokenKind::Eof) {
                p.advance_error_node();
            }
            p.expect(TokenKind::In);
            if expr_no_struct(p).is_none() && !p.at(TokenKind::Eof) {
                p.advance_error_node();
            }
            parse_block_required(p);
            Some((p.close(m, SyntaxKind::FOR_EXPR), false))
        }

        TokenKind::Break => {
            let m = p.open();
            p.advance();
            if at_expr_start(p) {
                expr(p);
            }
            Some((p.close(m, SyntaxKind::BREAK_EXPR), false))
        }
        TokenKind::Continue => {
            let m = p.open();
            p.advance();
            Some((p.close(m, SyntaxKind::CONTINUE_EXPR), false))
        }
        TokenKind::Ret => {
            let m = p.open();
            p.advance();
            if at_expr_start(p) {
                expr(p);
            }
            Some((p.close(m, SyntaxKind::RET_EXPR), false))
        }
        TokenKind::Discard => {
            let m = p.open();
            p.advance();
            expr_required(p);
            Some((p.close(m, SyntaxKind::DISCARD_EXPR), false))
        }
        TokenKind::Defer => {
            let m = p.open();
            p.advance();
            expr_required(p);
            Some((p.close(m, SyntaxKind::DEFER_EXPR), false))
        }

        TokenKind::Let => Some((parse_let(p), false)),

        TokenKind::Sizeof => {
            let m = p.open();
            p.advance(); // sizeof
            p.expect(TokenKind::LParen);
            super::types::parse_type(p);
            p.expect(TokenKind::RParen);
            Some((p.close(m, SyntaxKind::SIZEOF_EXPR), false))
        }

        _ => {
            p.expected("an expression");
            None
        }
    }
}

// ── Compound expressions ───────────────────────────────────────────────

/// `{ stmt; …; tail }`.
pub(crate) fn parse_block(p: &mut Parser) -> Option<MarkClosed> {
    if !p.at(TokenKind::LBrace) {
        p.expected("a block");
        return None;
    }
    let m = p.open();
    p.advance(); // {
    let saved = p.struct_init_allowed;
    p.struct_init_allowed = true;
    loop {
        while p.eat(TokenKind::Semicolon) {}
        if p.at(TokenKind::RBrace) || p.at(TokenKind::Eof) {
            break;
        }
        if expr(p).is_none() {
            p.advance_error_node();
            continue;
        }
        if !p.at(TokenKind::Semicolon) && !p.at(TokenKind::RBrace) {
            p.expected("a ';'");
            p.recover_until(&[TokenKind::Semicolon, TokenKind::RBrace]);
        }
    }
    p.struct_init_allowed = saved;
    p.expect(TokenKind::RBrace);
    Some(p.close(m, SyntaxKind::BLOCK_EXPR))
}

fn parse_block_required(p: &mut Parser) {
    let _ = parse_block(p);
}

/// An `if`/`elif`/`while` condition: `let pattern = expr` or a plain
/// expression, struct initializers disabled either way.
fn parse_condition(p: &mut Parser) {
    if p.at(TokenKind::Let) {
        let m = p.open();
        p.advance(); // let
        if super::patterns::parse_pattern(p).is_none() && !p.at(TokenKind::Eof) {
            p.advance_error_node();
        }
        p.expect(TokenKind::Eq);
        if expr_no_struct(p).is_none() && !p.at(TokenKind::Eof) {
            p.advance_error_node();
        }
        p.close(m, SyntaxKind::LET_CONDITION);
    } else if expr_no_struct(p).is_none() && !p.at(TokenKind::Eof) {
        p.advance_error_node();
    }
}

/// `if cond { … } (elif cond { … })* (else { … })?`.
fn parse_if(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // if
    parse_condition(p);
    parse_block_required(p);
    while p.at(TokenKind::Elif) {
        let branch = p.open();
        p.advance(); // elif
        parse_condition(p);
        parse_block_required(p);
        p.close(branch, SyntaxKind::ELIF_BRANCH);
    }
    if p.at(TokenKind::Else) {
        let branch = p.open();
        p.advance(); // else
        parse_block_required(p);
        p.close(branch, SyntaxKind::ELSE_BRANCH);
    }
    p.close(m, SyntaxKind::IF_EXPR)
}

/// `match scrutinee { pattern(, pattern)* -> expr … }`.
fn parse_match(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // match
    if expr_no_struct(p).is_none() && !p.at(TokenKind::Eof) {
        p.advance_error_node();
    }
    p.expect(TokenKind::LBrace);
    let saved = p.struct_init_allowed;
    p.struct_init_allowed = true;
    while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
        let arm = p.open();
        if super::patterns::parse_pattern(p).is_none() {
            p.advance();
            p.close(arm, SyntaxKind::ERROR_NODE);
            continue;
        }
        while p.eat(TokenKind::Comma) {
            if super::patterns::parse_pattern(p).is_none() {
                break;
            }
        }
        p.expect(TokenKind::RArrow);
        expr_required(p);
        p.close(arm, SyntaxKind::MATCH_ARM);
    }
    p.struct_init_allowed = saved;
    p.expect(TokenKind::RBrace);
    p.close(m, SyntaxKind::MATCH_EXPR)
}

/// `let pattern(, pattern)* [: Type] = expr`. Multiple comma-separated
/// patterns are sugar for a tuple pattern.
fn parse_let(p: &mut Parser) -> MarkClosed {
    let m = p.open();
    p.advance(); // let
    if super::patterns::parse_pattern(p).is_none() && !p.at(TokenKind::Eof) {
        p.advance_error_node();
    }
    while p.eat(TokenKind::Comma) {
        if super::patterns::parse_pattern(p).is_none() {
            break;
        }
    }
    if p.at(TokenKind::Colon) {
        let annotation = p.open();
        p.advance(); // :
        super::types::parse_type(p);
        p.close(annotation, SyntaxKind::TYPE_ANNOTATION);
    }
    p.expect(TokenKind::Eq);
    expr_required(p);
    p.close(m, SyntaxKind::LET_EXPR)
}
