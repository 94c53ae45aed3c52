use serde::Serialize;

use crate::span::Range;

/// A token produced by the Rill lexer.
///
/// The lexeme is `start..start + length` in the document text, and the
/// whitespace and comments preceding it (its trivia) are
/// `trivia_start..start`. Trivia is always attached to the *following*
/// token, so concatenating `trivia ++ lexeme` over a token stream
/// reproduces the document exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the lexeme in the document text.
    pub start: u32,
    /// Byte length of the lexeme.
    pub length: u32,
    /// Byte offset where this token's preceding trivia begins.
    pub trivia_start: u32,
    /// (line, column) range of the lexeme.
    pub range: Range,
}

impl Token {
    /// The lexeme text.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start as usize..(self.start + self.length) as usize]
    }

    /// The whitespace and comments attached in front of this token.
    pub fn trivia<'src>(&self, source: &'src str) -> &'src str {
        &source[self.trivia_start as usize..self.start as usize]
    }
}

/// Every kind of token in the Rill language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Keywords (32) ──────────────────────────────────────────────────
    Let,
    Mut,
    Immut,
    If,
    Else,
    Elif,
    For,
    In,
    While,
    Loop,
    Continue,
    Break,
    Match,
    Ret,
    Discard,
    Fn,
    As,
    Enum,
    Struct,
    Concept,
    Impl,
    Alias,
    Import,
    Export,
    Module,
    Sizeof,
    Typeof,
    Where,
    Dyn,
    Macro,
    Global,
    Defer,

    // ── Punctuation and reserved operators (21) ────────────────────────
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `::`
    ColonColon,
    /// `&`
    Amp,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Question,
    /// `!`
    Bang,
    /// `=`
    Eq,
    /// `|`
    Pipe,
    /// `\`
    Backslash,
    /// `<-`
    LArrow,
    /// `->`
    RArrow,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    // ── Names (4) ──────────────────────────────────────────────────────
    /// A run of underscores with no other characters, e.g. `_` or `___`.
    Underscore,
    /// Uncapitalized identifier, e.g. `foo`, `my_var`.
    Lower,
    /// Capitalized identifier, e.g. `Vector`, `T`.
    Upper,
    /// Free operator, e.g. `<$>`, `**`, `:=`.
    Op,

    // ── Literals (5) ───────────────────────────────────────────────────
    IntLiteral,
    FloatLiteral,
    StrLiteral,
    CharLiteral,
    BoolLiteral,

    // ── Special (4) ────────────────────────────────────────────────────
    /// End of input. Emitted forever once the lexer runs out of text.
    Eof,
    /// `/*` with no matching `*/` before end of input.
    UnterminatedComment,
    /// `"` with no closing quote before end of input.
    UnterminatedString,
    /// A malformed character literal or a byte that starts no token.
    InvalidCharacter,
}

impl TokenKind {
    /// Human-readable description used in "expected X, but found Y"
    /// parse errors.
    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            Let | Mut | Immut | If | Else | Elif | For | In | While | Loop | Continue
            | Break | Match | Ret | Discard | Fn | As | Enum | Struct | Concept | Impl
            | Alias | Import | Export | Module | Sizeof | Typeof | Where | Dyn | Macro
            | Global | Defer => "a keyword",
            Dot => "a '.'",
            Comma => "a ','",
            Colon => "a ':'",
            Semicolon => "a ';'",
            ColonColon => "a '::'",
            Amp => "a '&'",
            Star => "a '*'",
            Plus => "a '+'",
            Question => "a '?'",
            Bang => "a '!'",
            Eq => "a '='",
            Pipe => "a '|'",
            Backslash => "a '\\'",
            LArrow => "a '<-'",
            RArrow => "a '->'",
            LParen => "a '('",
            RParen => "a ')'",
            LBrace => "a '{'",
            RBrace => "a '}'",
            LBracket => "a '['",
            RBracket => "a ']'",
            Underscore => "a wildcard",
            Lower => "an uncapitalized identifier",
            Upper => "a capitalized identifier",
            Op => "an operator",
            IntLiteral => "an integer literal",
            FloatLiteral => "a floating-point literal",
            StrLiteral => "a string literal",
            CharLiteral => "a character literal",
            BoolLiteral => "a boolean literal",
            Eof => "the end of input",
            UnterminatedComment => "an unterminated comment",
            UnterminatedString => "an unterminated string",
            InvalidCharacter => "an invalid character",
        }
    }
}

/// Look up a keyword from its spelling.
///
/// Returns `Some(TokenKind)` if the string is a Rill keyword, `None`
/// otherwise. The lexer calls this after scanning an identifier-shaped
/// lexeme, so keywords shadow identifiers.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "let" => Some(TokenKind::Let),
        "mut" => Some(TokenKind::Mut),
        "immut" => Some(TokenKind::Immut),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "elif" => Some(TokenKind::Elif),
        "for" => Some(TokenKind::For),
        "in" => Some(TokenKind::In),
        "while" => Some(TokenKind::While),
        "loop" => Some(TokenKind::Loop),
        "continue" => Some(TokenKind::Continue),
        "break" => Some(TokenKind::Break),
        "match" => Some(TokenKind::Match),
        "ret" => Some(TokenKind::Ret),
        "discard" => Some(TokenKind::Discard),
        "fn" => Some(TokenKind::Fn),
        "as" => Some(TokenKind::As),
        "enum" => Some(TokenKind::Enum),
        "struct" => Some(TokenKind::Struct),
        "concept" => Some(TokenKind::Concept),
        "impl" => Some(TokenKind::Impl),
        "alias" => Some(TokenKind::Alias),
        "import" => Some(TokenKind::Import),
        "export" => Some(TokenKind::Export),
        "module" => Some(TokenKind::Module),
        "sizeof" => Some(TokenKind::Sizeof),
        "typeof" => Some(TokenKind::Typeof),
        "where" => Some(TokenKind::Where),
        "dyn" => Some(TokenKind::Dyn),
        "macro" => Some(TokenKind::Macro),
        "global" => Some(TokenKind::Global),
        "defer" => Some(TokenKind::Defer),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{Position, Range};

    #[test]
    fn keyword_from_str_recognizes_all_keywords() {
        let keywords = [
            "let", "mut", "immut", "if", "else", "elif", "for", "in", "while", "loop",
            "continue", "break", "match", "ret", "discard", "fn", "as", "enum", "struct",
            "concept", "impl", "alias", "import", "export", "module", "sizeof", "typeof",
            "where", "dyn", "macro", "global", "defer",
        ];
        for keyword in keywords {
            assert!(
                keyword_from_str(keyword).is_some(),
                "keyword_from_str({keyword:?}) should recognize the keyword"
            );
        }
        assert_eq!(keywords.len(), 32, "must test all 32 keywords");
    }

    #[test]
    fn keyword_from_str_rejects_non_keywords() {
        assert_eq!(keyword_from_str("foo"), None);
        assert_eq!(keyword_from_str(""), None);
        assert_eq!(keyword_from_str("Let"), None); // case-sensitive
        // true/false are boolean literals, not keywords
        assert_eq!(keyword_from_str("true"), None);
        assert_eq!(keyword_from_str("false"), None);
    }

    #[test]
    fn token_text_and_trivia_slices() {
        let source = "  let";
        let token = Token {
            kind: TokenKind::Let,
            start: 2,
            length: 3,
            trivia_start: 0,
            range: Range::new(Position::new(0, 2), Position::new(0, 5)),
        };
        assert_eq!(token.text(source), "let");
        assert_eq!(token.trivia(source), "  ");
    }
}
