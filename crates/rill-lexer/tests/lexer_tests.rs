//! Integration tests for the Rill lexer: trivia attachment, source
//! tiling, and position tracking.

use rill_common::span::Position;
use rill_common::token::TokenKind;
use rill_lexer::Lexer;

/// Render a token stream as `(trivia kind)` pairs, the shape the trivia
/// guarantees are easiest to read in.
fn trivia_pairs(source: &str) -> Vec<(String, TokenKind)> {
    Lexer::tokenize(source)
        .iter()
        .map(|token| (token.trivia(source).to_owned(), token.kind))
        .collect()
}

#[test]
fn whitespace_trivia_attaches_to_following_token() {
    assert_eq!(
        trivia_pairs("\ta\nb  \t  c"),
        vec![
            ("\t".to_owned(), TokenKind::Lower),
            ("\n".to_owned(), TokenKind::Lower),
            ("  \t  ".to_owned(), TokenKind::Lower),
            ("".to_owned(), TokenKind::Eof),
        ]
    );

    assert_eq!(
        trivia_pairs(" \t \n "),
        vec![(" \t \n ".to_owned(), TokenKind::Eof)]
    );
}

#[test]
fn line_comment_trivia() {
    assert_eq!(
        trivia_pairs(" a // b \n c // d"),
        vec![
            (" ".to_owned(), TokenKind::Lower),
            (" // b \n ".to_owned(), TokenKind::Lower),
            (" // d".to_owned(), TokenKind::Eof),
        ]
    );
}

#[test]
fn nested_block_comment_trivia() {
    let source = ". /* , /*::*/! */ in /**/ / //";
    let tokens = Lexer::tokenize(source);
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Dot, TokenKind::In, TokenKind::Op, TokenKind::Eof]
    );
    assert_eq!(tokens[1].trivia(source), " /* , /*::*/! */ ");
    assert_eq!(tokens[2].trivia(source), " /**/ ");
    assert_eq!(tokens[3].trivia(source), " //");
}

#[test]
fn block_comments_respect_string_quotes() {
    // A string inside a comment hides `*/`, and a string outside hides
    // `/*`.
    let source = r#"/* "" */ . /* "*/" */ . "/* /*" . /* /* "*/"*/ */ ."#;
    let kinds: Vec<_> = Lexer::tokenize(source).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Dot,
            TokenKind::Dot,
            TokenKind::StrLiteral,
            TokenKind::Dot,
            TokenKind::Dot,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn token_stream_tiles_the_source() {
    let source = "fn f(a: I32): I32 {\n    // add\n    let x = a + 1;\n    x /* done */\n}\n";
    let tokens = Lexer::tokenize(source);
    let mut rebuilt = String::new();
    for token in &tokens {
        rebuilt.push_str(token.trivia(source));
        rebuilt.push_str(token.text(source));
    }
    assert_eq!(rebuilt, source);
}

#[test]
fn tiling_holds_with_lexical_errors() {
    let source = "let x = \"oops";
    let tokens = Lexer::tokenize(source);
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    let mut rebuilt = String::new();
    for token in &tokens {
        rebuilt.push_str(token.trivia(source));
        rebuilt.push_str(token.text(source));
    }
    assert_eq!(rebuilt, source);
}

#[test]
fn ranges_track_lines_and_columns() {
    let tokens = Lexer::tokenize("let x =\n  42");
    // `42` is on line 1, columns 2..4.
    let int = tokens
        .iter()
        .find(|t| t.kind == TokenKind::IntLiteral)
        .unwrap();
    assert_eq!(int.range.start, Position::new(1, 2));
    assert_eq!(int.range.stop, Position::new(1, 4));
}

#[test]
fn unterminated_comment_carries_its_range() {
    let source = "x /* never closed";
    let tokens = Lexer::tokenize(source);
    let error = tokens
        .iter()
        .find(|t| t.kind == TokenKind::UnterminatedComment)
        .unwrap();
    assert_eq!(error.text(source), "/* never closed");
    assert_eq!(error.trivia(source), " ");
}
