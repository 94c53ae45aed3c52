//! Typed node layer on top of the rowan CST.
//!
//! Zero-cost wrappers around `SyntaxNode` with typed accessor methods,
//! following the rust-analyzer pattern: each wrapper is a newtype whose
//! `cast()` is a single kind check, and accessors walk the tree directly.
//! The desugarer consumes the CST exclusively through this layer.

pub mod expr;
pub mod item;
pub mod pat;
pub mod ty;

use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// Trait for typed wrappers over a rowan `SyntaxNode`.
pub trait AstNode: Sized {
    /// Try to cast a generic node into this typed wrapper.
    fn cast(node: SyntaxNode) -> Option<Self>;

    /// The underlying node.
    fn syntax(&self) -> &SyntaxNode;
}

/// Generate the wrapper struct and `AstNode` impl for a single node kind.
macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub(crate) syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == SyntaxKind::$kind {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

pub(crate) use ast_node;

/// First child node castable to `N`.
pub fn child_node<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// All child nodes castable to `N`.
pub fn child_nodes<'a, N: AstNode + 'a>(parent: &'a SyntaxNode) -> impl Iterator<Item = N> + 'a {
    parent.children().filter_map(N::cast)
}

/// First child token of the given kind.
pub fn child_token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| it.kind() == kind)
}

/// First child token matching any of the given kinds.
pub fn child_token_any(parent: &SyntaxNode, kinds: &[SyntaxKind]) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| kinds.contains(&it.kind()))
}

/// The name token inside a `NAME` child.
pub fn name_token(parent: &SyntaxNode) -> Option<SyntaxToken> {
    let name = parent.children().find(|it| it.kind() == SyntaxKind::NAME)?;
    child_token_any(&name, &[SyntaxKind::LOWER_NAME, SyntaxKind::UPPER_NAME])
}
