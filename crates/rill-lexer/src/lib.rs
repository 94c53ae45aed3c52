//! Rill lexer -- restartable, trivia-preserving tokenizer.
//!
//! The lexer is a state machine over the source text: byte position,
//! (line, column) position, and a one-token memory used for tuple-field
//! access. Each call to [`Lexer::next_token`] consumes leading trivia
//! (whitespace, line comments, nestable block comments), then greedily
//! matches the longest token. Trivia is never dropped: it is attached to
//! the token that follows it, so the token stream tiles the source text
//! exactly.
//!
//! Lexical errors (unterminated comments and strings, malformed character
//! literals, bytes that start no token) become designated error tokens
//! carrying their range; the lexer itself never fails.

mod cursor;

use cursor::Cursor;
use rill_common::span::Range;
use rill_common::token::{keyword_from_str, Token, TokenKind};

/// Characters that may form free operators. A maximal run of these is an
/// operator token unless it spells one of the reserved punctuation tokens.
const OPERATOR_CHARS: &str = "!#$%&*+-/:<=>?@\\^|~";

fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(c)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The Rill lexer.
///
/// Implements `Iterator<Item = Token>` for convenience; the iterator ends
/// after the first `Eof` token. [`Lexer::next_token`] itself is total and
/// keeps returning `Eof` tokens at end of input, so a parser can hold a
/// lexer and pull tokens on demand.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    source: &'src str,
    /// Whether the previous token was `.`; a numeric literal directly
    /// after a dot never takes a fractional part, so `x.0.0` is two
    /// tuple-field accesses rather than a float.
    after_dot: bool,
    /// Whether the `Iterator` impl has already yielded `Eof`.
    emitted_eof: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            source,
            after_dot: false,
            emitted_eof: false,
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`,
    /// including the final `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        let trivia_start = self.cursor.pos();

        if let Some(error) = self.consume_trivia(trivia_start) {
            self.after_dot = false;
            return error;
        }

        let start = self.cursor.pos();
        let start_position = self.cursor.position();

        let kind = match self.cursor.peek() {
            None => TokenKind::Eof,
            Some(c) => match c {
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                ',' => self.single(TokenKind::Comma),
                ';' => self.single(TokenKind::Semicolon),
                '.' => self.single(TokenKind::Dot),
                '0'..='9' => self.lex_number(),
                '"' => self.lex_string(),
                '\'' => self.lex_character(),
                c if c.is_ascii_uppercase() => self.lex_upper(start),
                c if is_ident_start(c) => self.lex_lower(start),
                c if is_operator_char(c) => self.lex_operator(start),
                _ => {
                    self.cursor.advance();
                    TokenKind::InvalidCharacter
                }
            },
        };

        self.after_dot = kind == TokenKind::Dot;
        self.make_token(kind, trivia_start, start, start_position)
    }

    fn make_token(
        &self,
        kind: TokenKind,
        trivia_start: u32,
        start: u32,
        start_position: rill_common::span::Position,
    ) -> Token {
        Token {
            kind,
            start,
            length: self.cursor.pos() - start,
            trivia_start,
            range: Range::new(start_position, self.cursor.position()),
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    // ── Trivia ─────────────────────────────────────────────────────────

    /// Consume whitespace and comments. Returns an error token if a block
    /// comment is left unterminated; the comment then becomes the token
    /// itself rather than trivia.
    fn consume_trivia(&mut self, trivia_start: u32) -> Option<Token> {
        loop {
            self.cursor
                .eat_while(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r');

            if self.cursor.starts_with("//") {
                self.cursor.eat_while(|c| c != '\n');
                continue;
            }

            if self.cursor.starts_with("/*") {
                let start = self.cursor.pos();
                let start_position = self.cursor.position();
                if !self.consume_block_comment() {
                    return Some(self.make_token(
                        TokenKind::UnterminatedComment,
                        trivia_start,
                        start,
                        start_position,
                    ));
                }
                continue;
            }

            return None;
        }
    }

    /// Consume a nestable `/* ... */` comment. A string literal inside a
    /// comment hides any `/*` or `*/` it contains, so commented-out code
    /// with strings stays balanced. Returns `false` if the input ends
    /// before every opener is matched.
    fn consume_block_comment(&mut self) -> bool {
        self.cursor.advance(); // /
        self.cursor.advance(); // *
        let mut depth: u32 = 1;
        while depth != 0 {
            if self.cursor.starts_with("/*") {
                self.cursor.advance();
                self.cursor.advance();
                depth += 1;
            } else if self.cursor.starts_with("*/") {
                self.cursor.advance();
                self.cursor.advance();
                depth -= 1;
            } else if self.cursor.peek() == Some('"') {
                self.cursor.advance();
                self.cursor.eat_while(|c| c != '"');
                if self.cursor.advance().is_none() {
                    return false;
                }
            } else if self.cursor.advance().is_none() {
                return false;
            }
        }
        true
    }

    // ── Numbers ────────────────────────────────────────────────────────

    /// Lex a numeric literal.
    ///
    /// The integer part is a greedy alphanumeric run, so `0x0` and `2e2`
    /// are single integer tokens; whether the digits actually form a valid
    /// value is checked when the literal is evaluated. A `.` begins a
    /// fraction (making the token a float) unless the previous token was a
    /// dot or the character after the `.` starts an identifier, which
    /// keeps `x.0.0` and `5.abs()` working.
    fn lex_number(&mut self) -> TokenKind {
        self.cursor.eat_while(is_ident_continue);

        let fraction_follows = self.cursor.peek() == Some('.')
            && !self.after_dot
            && !self
                .cursor
                .peek_next()
                .is_some_and(|c| is_ident_start(c) || c.is_ascii_uppercase() || c == '.');

        if !fraction_follows {
            return TokenKind::IntLiteral;
        }

        self.cursor.advance(); // .
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        // Exponent after the fraction: e / E, optional sign, digits.
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let digits_follow = match self.cursor.peek_next() {
                Some('+' | '-') => true,
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if digits_follow {
                self.cursor.advance(); // e
                if matches!(self.cursor.peek(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
        }

        TokenKind::FloatLiteral
    }

    // ── Strings and characters ─────────────────────────────────────────

    fn lex_string(&mut self) -> TokenKind {
        self.cursor.advance(); // "
        loop {
            match self.cursor.peek() {
                None => return TokenKind::UnterminatedString,
                Some('"') => {
                    self.cursor.advance();
                    return TokenKind::StrLiteral;
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn lex_character(&mut self) -> TokenKind {
        self.cursor.advance(); // '
        match self.cursor.peek() {
            None | Some('\'') => {
                // Empty or immediately closed: malformed.
                self.cursor.advance();
                return TokenKind::InvalidCharacter;
            }
            Some('\\') => {
                self.cursor.advance();
                self.cursor.advance();
            }
            Some(_) => {
                self.cursor.advance();
            }
        }
        if self.cursor.peek() == Some('\'') {
            self.cursor.advance();
            TokenKind::CharLiteral
        } else {
            TokenKind::InvalidCharacter
        }
    }

    // ── Names ──────────────────────────────────────────────────────────

    fn lex_lower(&mut self, start: u32) -> TokenKind {
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        if text.bytes().all(|b| b == b'_') {
            return TokenKind::Underscore;
        }
        match text {
            "true" | "false" => TokenKind::BoolLiteral,
            _ => keyword_from_str(text).unwrap_or(TokenKind::Lower),
        }
    }

    fn lex_upper(&mut self, _start: u32) -> TokenKind {
        self.cursor.eat_while(is_ident_continue);
        TokenKind::Upper
    }

    // ── Operators ──────────────────────────────────────────────────────

    /// Lex a maximal operator run, stopping before a comment opener, and
    /// map reserved spellings to their punctuation tokens.
    fn lex_operator(&mut self, start: u32) -> TokenKind {
        while let Some(c) = self.cursor.peek() {
            if !is_operator_char(c) || self.cursor.starts_with("//") || self.cursor.starts_with("/*")
            {
                break;
            }
            self.cursor.advance();
        }
        match self.cursor.slice(start, self.cursor.pos()) {
            ":" => TokenKind::Colon,
            "::" => TokenKind::ColonColon,
            "&" => TokenKind::Amp,
            "*" => TokenKind::Star,
            "+" => TokenKind::Plus,
            "?" => TokenKind::Question,
            "!" => TokenKind::Bang,
            "=" => TokenKind::Eq,
            "|" => TokenKind::Pipe,
            "\\" => TokenKind::Backslash,
            "<-" => TokenKind::LArrow,
            "->" => TokenKind::RArrow,
            _ => TokenKind::Op,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_simple_binding() {
        assert_eq!(
            kinds("let x = 42"),
            vec![
                TokenKind::Let,
                TokenKind::Lower,
                TokenKind::Eq,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_shadow_identifiers() {
        assert_eq!(kinds("while"), vec![TokenKind::While, TokenKind::Eof]);
        assert_eq!(kinds("whiles"), vec![TokenKind::Lower, TokenKind::Eof]);
    }

    #[test]
    fn bool_literals_are_not_keywords() {
        assert_eq!(
            kinds("true false"),
            vec![TokenKind::BoolLiteral, TokenKind::BoolLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn underscore_and_lower_names() {
        assert_eq!(kinds("_"), vec![TokenKind::Underscore, TokenKind::Eof]);
        assert_eq!(kinds("____"), vec![TokenKind::Underscore, TokenKind::Eof]);
        assert_eq!(kinds("_x"), vec![TokenKind::Lower, TokenKind::Eof]);
        assert_eq!(kinds("Vector"), vec![TokenKind::Upper, TokenKind::Eof]);
    }

    #[test]
    fn reserved_operators_and_free_operators() {
        assert_eq!(
            kinds("x :: y"),
            vec![TokenKind::Lower, TokenKind::ColonColon, TokenKind::Lower, TokenKind::Eof]
        );
        assert_eq!(
            kinds("-- %?% <$> ** @#"),
            vec![
                TokenKind::Op,
                TokenKind::Op,
                TokenKind::Op,
                TokenKind::Op,
                TokenKind::Op,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("-> <- & &&"),
            vec![
                TokenKind::RArrow,
                TokenKind::LArrow,
                TokenKind::Amp,
                TokenKind::Op,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(
            kinds("10. 1.1 2.2e2 0x0.0"),
            vec![
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds(".1 2e2 0x0 10"),
            vec![
                TokenKind::Dot,
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("0.3e-5"),
            vec![TokenKind::FloatLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn tuple_field_access_is_not_a_float() {
        assert_eq!(
            kinds("x.0"),
            vec![TokenKind::Lower, TokenKind::Dot, TokenKind::IntLiteral, TokenKind::Eof]
        );
        assert_eq!(
            kinds("x.0.0"),
            vec![
                TokenKind::Lower,
                TokenKind::Dot,
                TokenKind::IntLiteral,
                TokenKind::Dot,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds(".0.0, 0.0"),
            vec![
                TokenKind::Dot,
                TokenKind::IntLiteral,
                TokenKind::Dot,
                TokenKind::IntLiteral,
                TokenKind::Comma,
                TokenKind::FloatLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_and_character_literals() {
        assert_eq!(kinds("\"hello\""), vec![TokenKind::StrLiteral, TokenKind::Eof]);
        assert_eq!(
            kinds("\"a\\\"b\""),
            vec![TokenKind::StrLiteral, TokenKind::Eof]
        );
        assert_eq!(kinds("'x'"), vec![TokenKind::CharLiteral, TokenKind::Eof]);
        assert_eq!(kinds("'\\n'"), vec![TokenKind::CharLiteral, TokenKind::Eof]);
    }

    #[test]
    fn error_tokens() {
        assert_eq!(
            kinds("\"abc"),
            vec![TokenKind::UnterminatedString, TokenKind::Eof]
        );
        assert_eq!(
            kinds("/* /*"),
            vec![TokenKind::UnterminatedComment, TokenKind::Eof]
        );
        assert_eq!(
            kinds("''"),
            vec![TokenKind::InvalidCharacter, TokenKind::Eof]
        );
        assert_eq!(
            kinds("\u{00A7}"),
            vec![TokenKind::InvalidCharacter, TokenKind::Eof]
        );
    }

    #[test]
    fn spans_are_accurate() {
        let tokens = Lexer::tokenize("let x = 42");
        assert_eq!((tokens[0].start, tokens[0].length), (0, 3));
        assert_eq!((tokens[1].start, tokens[1].length), (4, 1));
        assert_eq!((tokens[2].start, tokens[2].length), (6, 1));
        assert_eq!((tokens[3].start, tokens[3].length), (8, 2));
    }

    #[test]
    fn restartable_at_end_of_input() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Lower);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
