//! Typed wrappers for pattern nodes.

use super::ty::Path;
use super::{ast_node, child_node, child_nodes, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

ast_node!(WildcardPat, WILDCARD_PAT);
ast_node!(NamePat, NAME_PAT);
ast_node!(LiteralPat, LITERAL_PAT);
ast_node!(TuplePat, TUPLE_PAT);
ast_node!(CtorPat, CTOR_PAT);
ast_node!(PatArgList, PAT_ARG_LIST);
ast_node!(SlicePat, SLICE_PAT);
ast_node!(AliasPat, ALIAS_PAT);
ast_node!(GuardPat, GUARD_PAT);

/// Any pattern node.
#[derive(Debug, Clone)]
pub enum Pattern {
    Wildcard(WildcardPat),
    Name(NamePat),
    Literal(LiteralPat),
    Tuple(TuplePat),
    Ctor(CtorPat),
    Slice(SlicePat),
    Alias(AliasPat),
    Guard(GuardPat),
}

impl AstNode for Pattern {
    fn cast(node: SyntaxNode) -> Option<Self> {
        let pattern = match node.kind() {
            SyntaxKind::WILDCARD_PAT => Pattern::Wildcard(WildcardPat { syntax: node }),
            SyntaxKind::NAME_PAT => Pattern::Name(NamePat { syntax: node }),
            SyntaxKind::LITERAL_PAT => Pattern::Literal(LiteralPat { syntax: node }),
            SyntaxKind::TUPLE_PAT => Pattern::Tuple(TuplePat { syntax: node }),
            SyntaxKind::CTOR_PAT => Pattern::Ctor(CtorPat { syntax: node }),
            SyntaxKind::SLICE_PAT => Pattern::Slice(SlicePat { syntax: node }),
            SyntaxKind::ALIAS_PAT => Pattern::Alias(AliasPat { syntax: node }),
            SyntaxKind::GUARD_PAT => Pattern::Guard(GuardPat { syntax: node }),
            _ => return None,
        };
        Some(pattern)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Pattern::Wildcard(it) => it.syntax(),
            Pattern::Name(it) => it.syntax(),
            Pattern::Literal(it) => it.syntax(),
            Pattern::Tuple(it) => it.syntax(),
            Pattern::Ctor(it) => it.syntax(),
            Pattern::Slice(it) => it.syntax(),
            Pattern::Alias(it) => it.syntax(),
            Pattern::Guard(it) => it.syntax(),
        }
    }
}

impl NamePat {
    pub fn is_mut(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::MUT_KW).is_some()
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_NAME)
    }
}

impl LiteralPat {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|it| {
                matches!(
                    it.kind(),
                    SyntaxKind::INT_LITERAL
                        | SyntaxKind::FLOAT_LITERAL
                        | SyntaxKind::STR_LITERAL
                        | SyntaxKind::CHAR_LITERAL
                        | SyntaxKind::BOOL_LITERAL
                )
            })
    }
}

impl TuplePat {
    pub fn elements(&self) -> impl Iterator<Item = Pattern> + '_ {
        child_nodes(&self.syntax)
    }

    /// A single element with no comma is plain grouping rather than a
    /// one-tuple.
    pub fn is_grouping(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::COMMA).is_none() && self.elements().count() == 1
    }
}

impl CtorPat {
    /// The constructor path. `None` for abbreviated `::ctor` patterns.
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }

    /// The bare constructor name of an abbreviated `::ctor` pattern.
    pub fn abbreviated_name(&self) -> Option<SyntaxToken> {
        if self.path().is_some() {
            return None;
        }
        child_token(&self.syntax, SyntaxKind::LOWER_NAME)
    }

    pub fn args(&self) -> Option<PatArgList> {
        child_node(&self.syntax)
    }
}

impl PatArgList {
    pub fn patterns(&self) -> impl Iterator<Item = Pattern> + '_ {
        child_nodes(&self.syntax)
    }
}

impl SlicePat {
    pub fn elements(&self) -> impl Iterator<Item = Pattern> + '_ {
        child_nodes(&self.syntax)
    }
}

impl AliasPat {
    pub fn pattern(&self) -> Option<Pattern> {
        child_node(&self.syntax)
    }

    pub fn is_mut(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::MUT_KW).is_some()
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_NAME)
    }
}

impl GuardPat {
    pub fn pattern(&self) -> Option<Pattern> {
        child_node(&self.syntax)
    }

    pub fn condition(&self) -> Option<super::expr::Expr> {
        child_node(&self.syntax)
    }
}
