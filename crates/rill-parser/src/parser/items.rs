//! Definition grammar: functions, structs, enums, concepts, impl blocks,
//! aliases, modules, and imports.

use rill_common::token::TokenKind;

use super::Parser;
use crate::syntax_kind::SyntaxKind;

/// Tokens a failed definition recovers to.
const DEFINITION_RECOVERY: &[TokenKind] = &[
    TokenKind::Fn,
    TokenKind::Struct,
    TokenKind::Enum,
    TokenKind::Concept,
    TokenKind::Impl,
    TokenKind::Alias,
    TokenKind::Module,
    TokenKind::Import,
    TokenKind::Export,
    TokenKind::Semicolon,
    TokenKind::RBrace,
];

/// Parse one top-level (or module-level) definition, with recovery.
pub(crate) fn parse_definition(p: &mut Parser) {
    let m = p.open();
    p.eat(TokenKind::Export);

    match p.current() {
        TokenKind::Fn => parse_fn_def(p, m),
        TokenKind::Struct => parse_struct_def(p, m),
        TokenKind::Enum => parse_enum_def(p, m),
        TokenKind::Concept => parse_concept_def(p, m),
        TokenKind::Impl => parse_impl_def(p, m),
        TokenKind::Alias => parse_alias_def(p, m),
        TokenKind::Module => parse_module_def(p, m),
        TokenKind::Import => parse_import_decl(p, m),
        _ => {
            p.expected("a definition");
            if !p.at(TokenKind::Eof) {
                p.advance();
            }
            p.close(m, SyntaxKind::ERROR_NODE);
            p.recover_until(DEFINITION_RECOVERY);
        }
    }
}

/// The defining name of an item. `lower` selects the value namespace
/// (functions, modules), upper-case the type namespace.
fn parse_name(p: &mut Parser, kind: TokenKind) {
    let m = p.open();
    if !p.eat(kind) {
        p.expected(kind.description());
    }
    p.close(m, SyntaxKind::NAME);
}

/// `fn name[T…](params) [: Ret] (= expr | { … })`.
fn parse_fn_def(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // fn
    parse_name(p, TokenKind::Lower);
    if p.at(TokenKind::LBracket) {
        parse_template_param_list(p);
    }
    parse_param_list(p);
    if p.at(TokenKind::Colon) {
        parse_type_annotation(p);
    }
    match p.current() {
        TokenKind::Eq => {
            p.advance(); // =
            super::expressions::expr_required(p);
        }
        TokenKind::LBrace => {
            super::expressions::parse_block(p);
        }
        _ => {
            p.expected("a function body");
            p.recover_until(DEFINITION_RECOVERY);
        }
    }
    p.close(m, SyntaxKind::FN_DEF);
}

/// `fn name[T…](params) [: Ret]` inside a concept, no body.
fn parse_fn_signature(p: &mut Parser) {
    let m = p.open();
    p.advance(); // fn
    parse_name(p, TokenKind::Lower);
    if p.at(TokenKind::LBracket) {
        parse_template_param_list(p);
    }
    parse_param_list(p);
    if p.at(TokenKind::Colon) {
        parse_type_annotation(p);
    }
    p.eat(TokenKind::Semicolon);
    p.close(m, SyntaxKind::FN_SIGNATURE);
}

/// `struct Name[T…] = field: Type, …`.
fn parse_struct_def(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // struct
    parse_name(p, TokenKind::Upper);
    if p.at(TokenKind::LBracket) {
        parse_template_param_list(p);
    }
    if p.expect(TokenKind::Eq) {
        parse_field(p);
        while p.eat(TokenKind::Comma) {
            parse_field(p);
        }
    } else {
        p.recover_until(DEFINITION_RECOVERY);
    }
    p.close(m, SyntaxKind::STRUCT_DEF);
}

fn parse_field(p: &mut Parser) {
    let m = p.open();
    if !p.eat(TokenKind::Lower) {
        p.expected("a field name");
        p.close(m, SyntaxKind::ERROR_NODE);
        p.recover_until(DEFINITION_RECOVERY);
        return;
    }
    parse_type_annotation(p);
    p.close(m, SyntaxKind::FIELD);
}

/// `enum Name[T…] = ctor | ctor(T, …) | …`.
fn parse_enum_def(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // enum
    parse_name(p, TokenKind::Upper);
    if p.at(TokenKind::LBracket) {
        parse_template_param_list(p);
    }
    if p.expect(TokenKind::Eq) {
        parse_constructor(p);
        while p.eat(TokenKind::Pipe) {
            parse_constructor(p);
        }
    } else {
        p.recover_until(DEFINITION_RECOVERY);
    }
    p.close(m, SyntaxKind::ENUM_DEF);
}

fn parse_constructor(p: &mut Parser) {
    let m = p.open();
    if !p.eat(TokenKind::Lower) {
        p.expected("a constructor name");
        p.close(m, SyntaxKind::ERROR_NODE);
        p.recover_until(DEFINITION_RECOVERY);
        return;
    }
    if p.at(TokenKind::LParen) {
        let tuple = p.open();
        p.advance(); // (
        while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
            if super::types::parse_type(p).is_none() {
                break;
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen);
        p.close(tuple, SyntaxKind::CTOR_TUPLE);
    }
    p.close(m, SyntaxKind::CONSTRUCTOR);
}

/// `concept Name[T…] { fn signature; … }`.
fn parse_concept_def(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // concept
    parse_name(p, TokenKind::Upper);
    if p.at(TokenKind::LBracket) {
        parse_template_param_list(p);
    }
    if p.expect(TokenKind::LBrace) {
        loop {
            while p.eat(TokenKind::Semicolon) {}
            if p.at(TokenKind::RBrace) || p.at(TokenKind::Eof) {
                break;
            }
            if p.at(TokenKind::Fn) {
                parse_fn_signature(p);
            } else {
                p.advance_with_error("expected a function signature");
            }
        }
        p.expect(TokenKind::RBrace);
    }
    p.close(m, SyntaxKind::CONCEPT_DEF);
}

/// `impl[T…] SelfType { fn … }`.
fn parse_impl_def(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // impl
    if p.at(TokenKind::LBracket) {
        parse_template_param_list(p);
    }
    super::types::parse_type(p);
    if p.expect(TokenKind::LBrace) {
        loop {
            while p.eat(TokenKind::Semicolon) {}
            if p.at(TokenKind::RBrace) || p.at(TokenKind::Eof) {
                break;
            }
            if p.at(TokenKind::Fn) || (p.at(TokenKind::Export) && p.nth(1) == TokenKind::Fn) {
                let fn_mark = p.open();
                p.eat(TokenKind::Export);
                parse_fn_def(p, fn_mark);
            } else {
                p.advance_with_error("expected a function definition");
            }
        }
        p.expect(TokenKind::RBrace);
    }
    p.close(m, SyntaxKind::IMPL_DEF);
}

/// `alias Name[T…] = Type`.
fn parse_alias_def(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // alias
    parse_name(p, TokenKind::Upper);
    if p.at(TokenKind::LBracket) {
        parse_template_param_list(p);
    }
    if p.expect(TokenKind::Eq) {
        super::types::parse_type(p);
    } else {
        p.recover_until(DEFINITION_RECOVERY);
    }
    p.close(m, SyntaxKind::ALIAS_DEF);
}

/// `module name { definitions }`.
fn parse_module_def(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // module
    parse_name(p, TokenKind::Lower);
    if p.expect(TokenKind::LBrace) {
        loop {
            while p.eat(TokenKind::Semicolon) {}
            if p.at(TokenKind::RBrace) || p.at(TokenKind::Eof) {
                break;
            }
            parse_definition(p);
        }
        p.expect(TokenKind::RBrace);
    }
    p.close(m, SyntaxKind::MODULE_DEF);
}

/// `import a::b::c`.
fn parse_import_decl(p: &mut Parser, m: super::MarkOpened) {
    p.advance(); // import
    super::types::parse_path(p);
    p.close(m, SyntaxKind::IMPORT_DECL);
}

/// `[T, U: Concept + Concept2, m: mut]` template parameters.
fn parse_template_param_list(p: &mut Parser) {
    let m = p.open();
    p.advance(); // [
    while !p.at(TokenKind::RBracket) && !p.at(TokenKind::Eof) {
        parse_template_param(p);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RBracket);
    p.close(m, SyntaxKind::TEMPLATE_PARAM_LIST);
}

/// A type parameter `T` with optional `: Bound + Bound` concept bounds,
/// or a mutability parameter `m: mut`.
fn parse_template_param(p: &mut Parser) {
    let m = p.open();
    match p.current() {
        TokenKind::Upper => {
            p.advance();
            if p.eat(TokenKind::Colon) {
                super::types::parse_path(p);
                while p.eat(TokenKind::Plus) {
                    super::types::parse_path(p);
                }
            }
        }
        TokenKind::Lower => {
            p.advance();
            p.expect(TokenKind::Colon);
            if !p.eat(TokenKind::Mut) {
                p.expected("the `mut` keyword");
            }
        }
        _ => {
            p.expected("a template parameter");
            if !p.at(TokenKind::RBracket) && !p.at(TokenKind::Eof) {
                p.advance();
            }
        }
    }
    p.close(m, SyntaxKind::TEMPLATE_PARAM);
}

/// `(name: Type = default, …)` function parameters.
fn parse_param_list(p: &mut Parser) {
    let m = p.open();
    if !p.eat(TokenKind::LParen) {
        p.expected("a parameter list");
        p.close(m, SyntaxKind::PARAM_LIST);
        return;
    }
    while !p.at(TokenKind::RParen) && !p.at(TokenKind::Eof) {
        parse_param(p);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen);
    p.close(m, SyntaxKind::PARAM_LIST);
}

fn parse_param(p: &mut Parser) {
    let m = p.open();
    p.eat(TokenKind::Mut);
    if !p.eat(TokenKind::Lower) {
        p.expected("a parameter name");
        p.close(m, SyntaxKind::ERROR_NODE);
        p.recover_until(&[TokenKind::Comma, TokenKind::RParen, TokenKind::Eof]);
        return;
    }
    if p.at(TokenKind::Colon) {
        parse_type_annotation(p);
    }
    if p.at(TokenKind::Eq) {
        let default = p.open();
        p.advance(); // =
        super::expressions::expr_required(p);
        p.close(default, SyntaxKind::DEFAULT_ARG);
    }
    p.close(m, SyntaxKind::PARAM);
}

/// `: Type`, preserving the colon token.
fn parse_type_annotation(p: &mut Parser) {
    let m = p.open();
    p.expect(TokenKind::Colon);
    super::types::parse_type(p);
    p.close(m, SyntaxKind::TYPE_ANNOTATION);
}
