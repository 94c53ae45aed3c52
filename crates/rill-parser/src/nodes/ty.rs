//! Typed wrappers for type nodes and paths.

use super::{ast_node, child_node, child_nodes, child_token, child_token_any, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

ast_node!(PathType, PATH_TYPE);
ast_node!(TupleType, TUPLE_TYPE);
ast_node!(SliceType, SLICE_TYPE);
ast_node!(ArrayType, ARRAY_TYPE);
ast_node!(FnType, FN_TYPE);
ast_node!(RefType, REF_TYPE);
ast_node!(PtrType, PTR_TYPE);
ast_node!(TypeofType, TYPEOF_TYPE);
ast_node!(WildcardType, WILDCARD_TYPE);
ast_node!(Path, PATH);
ast_node!(PathSegment, PATH_SEGMENT);
ast_node!(TemplateArgList, TEMPLATE_ARG_LIST);
ast_node!(Mutability, MUTABILITY);
ast_node!(TypeAnnotation, TYPE_ANNOTATION);

/// Any type node.
#[derive(Debug, Clone)]
pub enum Type {
    Path(PathType),
    Tuple(TupleType),
    Slice(SliceType),
    Array(ArrayType),
    Fn(FnType),
    Ref(RefType),
    Ptr(PtrType),
    Typeof(TypeofType),
    Wildcard(WildcardType),
}

impl AstNode for Type {
    fn cast(node: SyntaxNode) -> Option<Self> {
        let ty = match node.kind() {
            SyntaxKind::PATH_TYPE => Type::Path(PathType { syntax: node }),
            SyntaxKind::TUPLE_TYPE => Type::Tuple(TupleType { syntax: node }),
            SyntaxKind::SLICE_TYPE => Type::Slice(SliceType { syntax: node }),
            SyntaxKind::ARRAY_TYPE => Type::Array(ArrayType { syntax: node }),
            SyntaxKind::FN_TYPE => Type::Fn(FnType { syntax: node }),
            SyntaxKind::REF_TYPE => Type::Ref(RefType { syntax: node }),
            SyntaxKind::PTR_TYPE => Type::Ptr(PtrType { syntax: node }),
            SyntaxKind::TYPEOF_TYPE => Type::Typeof(TypeofType { syntax: node }),
            SyntaxKind::WILDCARD_TYPE => Type::Wildcard(WildcardType { syntax: node }),
            _ => return None,
        };
        Some(ty)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Type::Path(it) => it.syntax(),
            Type::Tuple(it) => it.syntax(),
            Type::Slice(it) => it.syntax(),
            Type::Array(it) => it.syntax(),
            Type::Fn(it) => it.syntax(),
            Type::Ref(it) => it.syntax(),
            Type::Ptr(it) => it.syntax(),
            Type::Typeof(it) => it.syntax(),
            Type::Wildcard(it) => it.syntax(),
        }
    }
}

impl PathType {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }
}

impl TupleType {
    pub fn elements(&self) -> impl Iterator<Item = Type> + '_ {
        child_nodes(&self.syntax)
    }

    /// A single element with no comma is plain grouping rather than a
    /// one-tuple.
    pub fn is_grouping(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::COMMA).is_none() && self.elements().count() == 1
    }
}

impl SliceType {
    pub fn element(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl ArrayType {
    pub fn element(&self) -> Option<Type> {
        child_node(&self.syntax)
    }

    pub fn length(&self) -> Option<super::expr::Expr> {
        child_node(&self.syntax)
    }
}

impl FnType {
    /// Parameter types, in order. The return type lives inside the
    /// trailing `TYPE_ANNOTATION` child and is not included here.
    pub fn param_types(&self) -> impl Iterator<Item = Type> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn return_annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }
}

impl RefType {
    pub fn mutability(&self) -> Option<Mutability> {
        child_node(&self.syntax)
    }

    pub fn referee(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl PtrType {
    pub fn mutability(&self) -> Option<Mutability> {
        child_node(&self.syntax)
    }

    pub fn pointee(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl TypeofType {
    pub fn expr(&self) -> Option<super::expr::Expr> {
        child_node(&self.syntax)
    }
}

impl TypeAnnotation {
    pub fn ty(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl Path {
    /// Whether the path starts with `global::`.
    pub fn is_global(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::GLOBAL_KW).is_some()
    }

    /// The `typeof(…)` root, if the path is rooted in one.
    pub fn typeof_root(&self) -> Option<TypeofType> {
        child_node(&self.syntax)
    }

    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        child_nodes(&self.syntax)
    }
}

impl PathSegment {
    /// The segment's name token (`LOWER_NAME` or `UPPER_NAME`).
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token_any(&self.syntax, &[SyntaxKind::LOWER_NAME, SyntaxKind::UPPER_NAME])
    }

    pub fn template_args(&self) -> Option<TemplateArgList> {
        child_node(&self.syntax)
    }
}

/// A template argument: a type or a mutability.
#[derive(Debug, Clone)]
pub enum TemplateArg {
    Type(Type),
    Mutability(Mutability),
}

impl TemplateArgList {
    pub fn args(&self) -> impl Iterator<Item = TemplateArg> + '_ {
        self.syntax.children().filter_map(|node| {
            if let Some(mutability) = Mutability::cast(node.clone()) {
                return Some(TemplateArg::Mutability(mutability));
            }
            Type::cast(node).map(TemplateArg::Type)
        })
    }
}

impl Mutability {
    /// The underlying token: `mut`, `immut`, or a lower-case parameter
    /// name.
    pub fn token(&self) -> Option<SyntaxToken> {
        child_token_any(
            &self.syntax,
            &[SyntaxKind::MUT_KW, SyntaxKind::IMMUT_KW, SyntaxKind::LOWER_NAME],
        )
    }
}
