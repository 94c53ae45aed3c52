//! Typed wrappers for definition nodes.

use super::expr::{BlockExpr, Expr};
use super::ty::{Path, Type, TypeAnnotation};
use super::{ast_node, child_node, child_nodes, child_token, name_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

ast_node!(SourceFile, SOURCE_FILE);
ast_node!(FnDef, FN_DEF);
ast_node!(FnSignature, FN_SIGNATURE);
ast_node!(StructDef, STRUCT_DEF);
ast_node!(EnumDef, ENUM_DEF);
ast_node!(ConceptDef, CONCEPT_DEF);
ast_node!(ImplDef, IMPL_DEF);
ast_node!(AliasDef, ALIAS_DEF);
ast_node!(ModuleDef, MODULE_DEF);
ast_node!(ImportDecl, IMPORT_DECL);
ast_node!(TemplateParamList, TEMPLATE_PARAM_LIST);
ast_node!(TemplateParam, TEMPLATE_PARAM);
ast_node!(ParamList, PARAM_LIST);
ast_node!(Param, PARAM);
ast_node!(DefaultArg, DEFAULT_ARG);
ast_node!(Field, FIELD);
ast_node!(Constructor, CONSTRUCTOR);
ast_node!(CtorTuple, CTOR_TUPLE);

/// Any top-level (or module-level) definition.
#[derive(Debug, Clone)]
pub enum Definition {
    Fn(FnDef),
    Struct(StructDef),
    Enum(EnumDef),
    Concept(ConceptDef),
    Impl(ImplDef),
    Alias(AliasDef),
    Module(ModuleDef),
    Import(ImportDecl),
}

impl AstNode for Definition {
    fn cast(node: SyntaxNode) -> Option<Self> {
        let definition = match node.kind() {
            SyntaxKind::FN_DEF => Definition::Fn(FnDef { syntax: node }),
            SyntaxKind::STRUCT_DEF => Definition::Struct(StructDef { syntax: node }),
            SyntaxKind::ENUM_DEF => Definition::Enum(EnumDef { syntax: node }),
            SyntaxKind::CONCEPT_DEF => Definition::Concept(ConceptDef { syntax: node }),
            SyntaxKind::IMPL_DEF => Definition::Impl(ImplDef { syntax: node }),
            SyntaxKind::ALIAS_DEF => Definition::Alias(AliasDef { syntax: node }),
            SyntaxKind::MODULE_DEF => Definition::Module(ModuleDef { syntax: node }),
            SyntaxKind::IMPORT_DECL => Definition::Import(ImportDecl { syntax: node }),
            _ => return None,
        };
        Some(definition)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Definition::Fn(it) => it.syntax(),
            Definition::Struct(it) => it.syntax(),
            Definition::Enum(it) => it.syntax(),
            Definition::Concept(it) => it.syntax(),
            Definition::Impl(it) => it.syntax(),
            Definition::Alias(it) => it.syntax(),
            Definition::Module(it) => it.syntax(),
            Definition::Import(it) => it.syntax(),
        }
    }
}

impl SourceFile {
    pub fn definitions(&self) -> impl Iterator<Item = Definition> + '_ {
        child_nodes(&self.syntax)
    }
}

fn is_export(node: &SyntaxNode) -> bool {
    child_token(node, SyntaxKind::EXPORT_KW).is_some()
}

impl FnDef {
    pub fn is_export(&self) -> bool {
        is_export(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn template_params(&self) -> Option<TemplateParamList> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    /// The declared return type, if annotated.
    pub fn return_annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    /// The body: a block for `fn f() { … }`, any expression for
    /// `fn f() = expr`. The desugarer normalizes both to block form.
    pub fn body(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl FnSignature {
    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn template_params(&self) -> Option<TemplateParamList> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn return_annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }
}

impl StructDef {
    pub fn is_export(&self) -> bool {
        is_export(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn template_params(&self) -> Option<TemplateParamList> {
        child_node(&self.syntax)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        child_nodes(&self.syntax)
    }
}

impl Field {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_NAME)
    }

    pub fn annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }
}

impl EnumDef {
    pub fn is_export(&self) -> bool {
        is_export(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn template_params(&self) -> Option<TemplateParamList> {
        child_node(&self.syntax)
    }

    pub fn constructors(&self) -> impl Iterator<Item = Constructor> + '_ {
        child_nodes(&self.syntax)
    }
}

impl Constructor {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_NAME)
    }

    pub fn tuple(&self) -> Option<CtorTuple> {
        child_node(&self.syntax)
    }
}

impl CtorTuple {
    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        child_nodes(&self.syntax)
    }
}

impl ConceptDef {
    pub fn is_export(&self) -> bool {
        is_export(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn template_params(&self) -> Option<TemplateParamList> {
        child_node(&self.syntax)
    }

    pub fn signatures(&self) -> impl Iterator<Item = FnSignature> + '_ {
        child_nodes(&self.syntax)
    }
}

impl ImplDef {
    pub fn template_params(&self) -> Option<TemplateParamList> {
        child_node(&self.syntax)
    }

    pub fn self_type(&self) -> Option<Type> {
        child_node(&self.syntax)
    }

    pub fn functions(&self) -> impl Iterator<Item = FnDef> + '_ {
        child_nodes(&self.syntax)
    }
}

impl AliasDef {
    pub fn is_export(&self) -> bool {
        is_export(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn template_params(&self) -> Option<TemplateParamList> {
        child_node(&self.syntax)
    }

    pub fn ty(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl ModuleDef {
    pub fn is_export(&self) -> bool {
        is_export(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn definitions(&self) -> impl Iterator<Item = Definition> + '_ {
        child_nodes(&self.syntax)
    }
}

impl ImportDecl {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }
}

impl TemplateParamList {
    pub fn params(&self) -> impl Iterator<Item = TemplateParam> + '_ {
        child_nodes(&self.syntax)
    }
}

impl TemplateParam {
    /// The parameter name: upper-case for type parameters, lower-case for
    /// mutability parameters.
    pub fn name(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|it| matches!(it.kind(), SyntaxKind::UPPER_NAME | SyntaxKind::LOWER_NAME))
    }

    /// Whether this is a mutability parameter (`m: mut`).
    pub fn is_mutability(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::MUT_KW).is_some()
    }

    /// Concept bounds on a type parameter.
    pub fn bounds(&self) -> impl Iterator<Item = Path> + '_ {
        child_nodes(&self.syntax)
    }
}

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        child_nodes(&self.syntax)
    }
}

impl Param {
    pub fn is_mut(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::MUT_KW).is_some()
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_NAME)
    }

    pub fn annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    pub fn default_arg(&self) -> Option<DefaultArg> {
        child_node(&self.syntax)
    }
}

impl DefaultArg {
    pub fn value(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl BlockExpr {
    /// Convenience used by desugaring of function bodies.
    pub fn is_empty(&self) -> bool {
        self.elements().next().is_none()
    }
}
