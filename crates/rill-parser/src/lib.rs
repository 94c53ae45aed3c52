//! Rill parser: recursive descent parser producing a rowan-based CST.
//!
//! Transforms the token stream from `rill-lexer` into a lossless concrete
//! syntax tree. Every token and every piece of trivia appears in the tree,
//! so `SyntaxNode::text()` reproduces the document exactly and downstream
//! tooling (formatter, language queries) can work from the same tree.

pub mod cst;
pub mod nodes;
mod parser;
pub mod syntax_kind;

use rill_common::db::{Database, DocumentId, SemanticToken, SemanticTokenKind};
use rill_common::diagnostic::Diagnostic;
use rill_lexer::Lexer;

pub use cst::{RillLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use syntax_kind::SyntaxKind;

/// Result of parsing a Rill source file: the green tree (immutable,
/// cheap to clone) and the parse errors.
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<Diagnostic>,
}

impl Parse {
    /// Build the syntax tree root from the green node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The typed root of the tree.
    pub fn source_file(&self) -> nodes::item::SourceFile {
        use nodes::AstNode;
        nodes::item::SourceFile::cast(self.syntax()).expect("the parser always emits SOURCE_FILE")
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a Rill source file into a CST.
pub fn parse(source: &str) -> Parse {
    let tokens = Lexer::tokenize(source);
    let mut parser = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut parser);
    let (green, errors) = parser.build_tree();
    Parse { green, errors }
}

/// Parse a registered document: runs [`parse`] on its text, appends the
/// parse errors to the document's diagnostics, and pushes a coarse
/// semantic-token hint for every token. The resolver upgrades name tokens
/// later once it knows what they refer to.
pub fn parse_document(db: &mut Database, id: DocumentId) -> Parse {
    let text = db.document(id).text.clone();
    let result = parse(&text);

    let document = db.document_mut(id);
    document.diagnostics.extend(result.errors.iter().cloned());
    for token in Lexer::tokenize(&text) {
        if let Some(kind) = SemanticTokenKind::of_token(token.kind) {
            document
                .semantic_tokens
                .push(SemanticToken { range: token.range, kind });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_document_pushes_semantic_tokens() {
        let mut db = Database::new();
        let id = db.test_document("fn f() = 1");
        let result = parse_document(&mut db, id);
        assert!(result.ok(), "unexpected errors: {:?}", result.errors());

        let kinds: Vec<_> = db
            .document(id)
            .semantic_tokens
            .iter()
            .map(|token| token.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SemanticTokenKind::Keyword,  // fn
                SemanticTokenKind::Variable, // f
                SemanticTokenKind::Operator, // (
                SemanticTokenKind::Operator, // )
                SemanticTokenKind::Operator, // =
                SemanticTokenKind::Number,   // 1
            ]
        );
    }
}
