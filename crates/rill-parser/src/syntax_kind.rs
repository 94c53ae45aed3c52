//! SyntaxKind enum for the Rill CST.
//!
//! A superset of `TokenKind` (mapped to SCREAMING_SNAKE_CASE leaves, plus
//! the `TRIVIA` leaf that carries whitespace and comments) and composite
//! node kinds produced by the parser. The first two values are sentinels
//! used by the event-based parser.

use rill_common::token::TokenKind;

/// Every kind of syntax element in the Rill CST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for incomplete/unfinished parser events.
    TOMBSTONE = 0,
    /// Wrapper for tokens/nodes that couldn't be parsed.
    ERROR_NODE = 1,

    // ── Trivia leaf ────────────────────────────────────────────────────
    /// Whitespace and comments, re-emitted in front of the token they are
    /// attached to so the tree reproduces the source byte for byte.
    TRIVIA,

    // ── Keyword leaves (32) ────────────────────────────────────────────
    LET_KW,
    MUT_KW,
    IMMUT_KW,
    IF_KW,
    ELSE_KW,
    ELIF_KW,
    FOR_KW,
    IN_KW,
    WHILE_KW,
    LOOP_KW,
    CONTINUE_KW,
    BREAK_KW,
    MATCH_KW,
    RET_KW,
    DISCARD_KW,
    FN_KW,
    AS_KW,
    ENUM_KW,
    STRUCT_KW,
    CONCEPT_KW,
    IMPL_KW,
    ALIAS_KW,
    IMPORT_KW,
    EXPORT_KW,
    MODULE_KW,
    SIZEOF_KW,
    TYPEOF_KW,
    WHERE_KW,
    DYN_KW,
    MACRO_KW,
    GLOBAL_KW,
    DEFER_KW,

    // ── Punctuation leaves (21) ────────────────────────────────────────
    DOT,
    COMMA,
    COLON,
    SEMICOLON,
    COLON_COLON,
    AMP,
    STAR,
    PLUS,
    QUESTION,
    BANG,
    EQ,
    PIPE,
    BACKSLASH,
    L_ARROW,
    R_ARROW,
    L_PAREN,
    R_PAREN,
    L_BRACE,
    R_BRACE,
    L_BRACKET,
    R_BRACKET,

    // ── Name leaves (4) ────────────────────────────────────────────────
    UNDERSCORE,
    LOWER_NAME,
    UPPER_NAME,
    OPERATOR,

    // ── Literal leaves (5) ─────────────────────────────────────────────
    INT_LITERAL,
    FLOAT_LITERAL,
    STR_LITERAL,
    CHAR_LITERAL,
    BOOL_LITERAL,

    // ── Special leaves (4) ─────────────────────────────────────────────
    EOF,
    UNTERMINATED_COMMENT,
    UNTERMINATED_STRING,
    INVALID_CHARACTER,

    // ── Root ───────────────────────────────────────────────────────────
    SOURCE_FILE,

    // ── Definitions ────────────────────────────────────────────────────
    FN_DEF,
    STRUCT_DEF,
    ENUM_DEF,
    CONCEPT_DEF,
    IMPL_DEF,
    ALIAS_DEF,
    MODULE_DEF,
    IMPORT_DECL,
    /// Body-less function signature inside a concept.
    FN_SIGNATURE,

    // ── Definition pieces ──────────────────────────────────────────────
    NAME,
    TEMPLATE_PARAM_LIST,
    TEMPLATE_PARAM,
    PARAM_LIST,
    PARAM,
    /// `= expr` after a parameter; stored so presence is preserved.
    DEFAULT_ARG,
    /// `: Type` after a parameter, binding, or parameter list.
    TYPE_ANNOTATION,
    FIELD,
    CONSTRUCTOR,
    /// `(T, U)` payload of an enum constructor.
    CTOR_TUPLE,
    MUTABILITY,

    // ── Paths ──────────────────────────────────────────────────────────
    PATH,
    PATH_SEGMENT,
    TEMPLATE_ARG_LIST,

    // ── Types ──────────────────────────────────────────────────────────
    PATH_TYPE,
    TUPLE_TYPE,
    SLICE_TYPE,
    ARRAY_TYPE,
    FN_TYPE,
    REF_TYPE,
    PTR_TYPE,
    TYPEOF_TYPE,
    WILDCARD_TYPE,

    // ── Expressions ────────────────────────────────────────────────────
    LITERAL,
    PATH_EXPR,
    TUPLE_EXPR,
    ARRAY_EXPR,
    BLOCK_EXPR,
    IF_EXPR,
    ELIF_BRANCH,
    ELSE_BRANCH,
    /// `let pat = expr` head of an `if let` / `while let`.
    LET_CONDITION,
    MATCH_EXPR,
    MATCH_ARM,
    LOOP_EXPR,
    WHILE_EXPR,
    FOR_EXPR,
    BREAK_EXPR,
    CONTINUE_EXPR,
    RET_EXPR,
    DISCARD_EXPR,
    DEFER_EXPR,
    LET_EXPR,
    CALL_EXPR,
    ARG_LIST,
    METHOD_CALL_EXPR,
    FIELD_EXPR,
    INDEX_EXPR,
    STRUCT_INIT_EXPR,
    STRUCT_INIT_FIELD,
    REF_EXPR,
    DEREF_EXPR,
    CAST_EXPR,
    ASCRIPTION_EXPR,
    SIZEOF_EXPR,
    /// A flat `operand (operator operand)*` sequence. Operator precedence
    /// is applied by the desugarer, not the parser, so the CST keeps the
    /// chain exactly as written.
    OPERATOR_CHAIN_EXPR,

    // ── Patterns ───────────────────────────────────────────────────────
    WILDCARD_PAT,
    NAME_PAT,
    LITERAL_PAT,
    TUPLE_PAT,
    CTOR_PAT,
    PAT_ARG_LIST,
    SLICE_PAT,
    ALIAS_PAT,
    GUARD_PAT,
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> SyntaxKind {
        match kind {
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::Mut => SyntaxKind::MUT_KW,
            TokenKind::Immut => SyntaxKind::IMMUT_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::Elif => SyntaxKind::ELIF_KW,
            TokenKind::For => SyntaxKind::FOR_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::While => SyntaxKind::WHILE_KW,
            TokenKind::Loop => SyntaxKind::LOOP_KW,
            TokenKind::Continue => SyntaxKind::CONTINUE_KW,
            TokenKind::Break => SyntaxKind::BREAK_KW,
            TokenKind::Match => SyntaxKind::MATCH_KW,
            TokenKind::Ret => SyntaxKind::RET_KW,
            TokenKind::Discard => SyntaxKind::DISCARD_KW,
            TokenKind::Fn => SyntaxKind::FN_KW,
            TokenKind::As => SyntaxKind::AS_KW,
            TokenKind::Enum => SyntaxKind::ENUM_KW,
            TokenKind::Struct => SyntaxKind::STRUCT_KW,
            TokenKind::Concept => SyntaxKind::CONCEPT_KW,
            TokenKind::Impl => SyntaxKind::IMPL_KW,
            TokenKind::Alias => SyntaxKind::ALIAS_KW,
            TokenKind::Import => SyntaxKind::IMPORT_KW,
            TokenKind::Export => SyntaxKind::EXPORT_KW,
            TokenKind::Module => SyntaxKind::MODULE_KW,
            TokenKind::Sizeof => SyntaxKind::SIZEOF_KW,
            TokenKind::Typeof => SyntaxKind::TYPEOF_KW,
            TokenKind::Where => SyntaxKind::WHERE_KW,
            TokenKind::Dyn => SyntaxKind::DYN_KW,
            TokenKind::Macro => SyntaxKind::MACRO_KW,
            TokenKind::Global => SyntaxKind::GLOBAL_KW,
            TokenKind::Defer => SyntaxKind::DEFER_KW,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            TokenKind::ColonColon => SyntaxKind::COLON_COLON,
            TokenKind::Amp => SyntaxKind::AMP,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Question => SyntaxKind::QUESTION,
            TokenKind::Bang => SyntaxKind::BANG,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::Backslash => SyntaxKind::BACKSLASH,
            TokenKind::LArrow => SyntaxKind::L_ARROW,
            TokenKind::RArrow => SyntaxKind::R_ARROW,
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::Underscore => SyntaxKind::UNDERSCORE,
            TokenKind::Lower => SyntaxKind::LOWER_NAME,
            TokenKind::Upper => SyntaxKind::UPPER_NAME,
            TokenKind::Op => SyntaxKind::OPERATOR,
            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::FloatLiteral => SyntaxKind::FLOAT_LITERAL,
            TokenKind::StrLiteral => SyntaxKind::STR_LITERAL,
            TokenKind::CharLiteral => SyntaxKind::CHAR_LITERAL,
            TokenKind::BoolLiteral => SyntaxKind::BOOL_LITERAL,
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::UnterminatedComment => SyntaxKind::UNTERMINATED_COMMENT,
            TokenKind::UnterminatedString => SyntaxKind::UNTERMINATED_STRING,
            TokenKind::InvalidCharacter => SyntaxKind::INVALID_CHARACTER,
        }
    }
}

impl SyntaxKind {
    /// Whether this kind is a literal leaf.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::INT_LITERAL
                | SyntaxKind::FLOAT_LITERAL
                | SyntaxKind::STR_LITERAL
                | SyntaxKind::CHAR_LITERAL
                | SyntaxKind::BOOL_LITERAL
        )
    }

    /// Whether this kind can appear as a binary operator inside an
    /// operator chain.
    pub fn is_chain_operator(self) -> bool {
        matches!(self, SyntaxKind::OPERATOR | SyntaxKind::STAR | SyntaxKind::PLUS)
    }
}
