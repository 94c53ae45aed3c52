//! Typed wrappers for expression nodes.

use super::ty::{Mutability, Path, TemplateArgList, Type, TypeAnnotation};
use super::{ast_node, child_node, child_nodes, child_token, name_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

ast_node!(Literal, LITERAL);
ast_node!(PathExpr, PATH_EXPR);
ast_node!(TupleExpr, TUPLE_EXPR);
ast_node!(ArrayExpr, ARRAY_EXPR);
ast_node!(BlockExpr, BLOCK_EXPR);
ast_node!(IfExpr, IF_EXPR);
ast_node!(ElifBranch, ELIF_BRANCH);
ast_node!(ElseBranch, ELSE_BRANCH);
ast_node!(LetCondition, LET_CONDITION);
ast_node!(MatchExpr, MATCH_EXPR);
ast_node!(MatchArm, MATCH_ARM);
ast_node!(LoopExpr, LOOP_EXPR);
ast_node!(WhileExpr, WHILE_EXPR);
ast_node!(ForExpr, FOR_EXPR);
ast_node!(BreakExpr, BREAK_EXPR);
ast_node!(ContinueExpr, CONTINUE_EXPR);
ast_node!(RetExpr, RET_EXPR);
ast_node!(DiscardExpr, DISCARD_EXPR);
ast_node!(DeferExpr, DEFER_EXPR);
ast_node!(LetExpr, LET_EXPR);
ast_node!(CallExpr, CALL_EXPR);
ast_node!(ArgList, ARG_LIST);
ast_node!(MethodCallExpr, METHOD_CALL_EXPR);
ast_node!(FieldExpr, FIELD_EXPR);
ast_node!(IndexExpr, INDEX_EXPR);
ast_node!(StructInitExpr, STRUCT_INIT_EXPR);
ast_node!(StructInitField, STRUCT_INIT_FIELD);
ast_node!(RefExpr, REF_EXPR);
ast_node!(DerefExpr, DEREF_EXPR);
ast_node!(CastExpr, CAST_EXPR);
ast_node!(AscriptionExpr, ASCRIPTION_EXPR);
ast_node!(SizeofExpr, SIZEOF_EXPR);
ast_node!(OperatorChainExpr, OPERATOR_CHAIN_EXPR);

/// Any expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Path(PathExpr),
    Tuple(TupleExpr),
    Array(ArrayExpr),
    Block(BlockExpr),
    If(IfExpr),
    Match(MatchExpr),
    Loop(LoopExpr),
    While(WhileExpr),
    For(ForExpr),
    Break(BreakExpr),
    Continue(ContinueExpr),
    Ret(RetExpr),
    Discard(DiscardExpr),
    Defer(DeferExpr),
    Let(LetExpr),
    Call(CallExpr),
    MethodCall(MethodCallExpr),
    Field(FieldExpr),
    Index(IndexExpr),
    StructInit(StructInitExpr),
    Ref(RefExpr),
    Deref(DerefExpr),
    Cast(CastExpr),
    Ascription(AscriptionExpr),
    Sizeof(SizeofExpr),
    OperatorChain(OperatorChainExpr),
}

impl AstNode for Expr {
    fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::LITERAL => Expr::Literal(Literal { syntax: node }),
            SyntaxKind::PATH_EXPR => Expr::Path(PathExpr { syntax: node }),
            SyntaxKind::TUPLE_EXPR => Expr::Tuple(TupleExpr { syntax: node }),
            SyntaxKind::ARRAY_EXPR => Expr::Array(ArrayExpr { syntax: node }),
            SyntaxKind::BLOCK_EXPR => Expr::Block(BlockExpr { syntax: node }),
            SyntaxKind::IF_EXPR => Expr::If(IfExpr { syntax: node }),
            SyntaxKind::MATCH_EXPR => Expr::Match(MatchExpr { syntax: node }),
            SyntaxKind::LOOP_EXPR => Expr::Loop(LoopExpr { syntax: node }),
            SyntaxKind::WHILE_EXPR => Expr::While(WhileExpr { syntax: node }),
            SyntaxKind::FOR_EXPR => Expr::For(ForExpr { syntax: node }),
            SyntaxKind::BREAK_EXPR => Expr::Break(BreakExpr { syntax: node }),
            SyntaxKind::CONTINUE_EXPR => Expr::Continue(ContinueExpr { syntax: node }),
            SyntaxKind::RET_EXPR => Expr::Ret(RetExpr { syntax: node }),
            SyntaxKind::DISCARD_EXPR => Expr::Discard(DiscardExpr { syntax: node }),
            SyntaxKind::DEFER_EXPR => Expr::Defer(DeferExpr { syntax: node }),
            SyntaxKind::LET_EXPR => Expr::Let(LetExpr { syntax: node }),
            SyntaxKind::CALL_EXPR => Expr::Call(CallExpr { syntax: node }),
            SyntaxKind::METHOD_CALL_EXPR => Expr::MethodCall(MethodCallExpr { syntax: node }),
            SyntaxKind::FIELD_EXPR => Expr::Field(FieldExpr { syntax: node }),
            SyntaxKind::INDEX_EXPR => Expr::Index(IndexExpr { syntax: node }),
            SyntaxKind::STRUCT_INIT_EXPR => Expr::StructInit(StructInitExpr { syntax: node }),
            SyntaxKind::REF_EXPR => Expr::Ref(RefExpr { syntax: node }),
            SyntaxKind::DEREF_EXPR => Expr::Deref(DerefExpr { syntax: node }),
            SyntaxKind::CAST_EXPR => Expr::Cast(CastExpr { syntax: node }),
            SyntaxKind::ASCRIPTION_EXPR => Expr::Ascription(AscriptionExpr { syntax: node }),
            SyntaxKind::SIZEOF_EXPR => Expr::Sizeof(SizeofExpr { syntax: node }),
            SyntaxKind::OPERATOR_CHAIN_EXPR => {
                Expr::OperatorChain(OperatorChainExpr { syntax: node })
            }
            _ => return None,
        };
        Some(expr)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(it) => it.syntax(),
            Expr::Path(it) => it.syntax(),
            Expr::Tuple(it) => it.syntax(),
            Expr::Array(it) => it.syntax(),
            Expr::Block(it) => it.syntax(),
            Expr::If(it) => it.syntax(),
            Expr::Match(it) => it.syntax(),
            Expr::Loop(it) => it.syntax(),
            Expr::While(it) => it.syntax(),
            Expr::For(it) => it.syntax(),
            Expr::Break(it) => it.syntax(),
            Expr::Continue(it) => it.syntax(),
            Expr::Ret(it) => it.syntax(),
            Expr::Discard(it) => it.syntax(),
            Expr::Defer(it) => it.syntax(),
            Expr::Let(it) => it.syntax(),
            Expr::Call(it) => it.syntax(),
            Expr::MethodCall(it) => it.syntax(),
            Expr::Field(it) => it.syntax(),
            Expr::Index(it) => it.syntax(),
            Expr::StructInit(it) => it.syntax(),
            Expr::Ref(it) => it.syntax(),
            Expr::Deref(it) => it.syntax(),
            Expr::Cast(it) => it.syntax(),
            Expr::Ascription(it) => it.syntax(),
            Expr::Sizeof(it) => it.syntax(),
            Expr::OperatorChain(it) => it.syntax(),
        }
    }
}

impl Literal {
    /// The literal token itself.
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

impl PathExpr {
    pub fn path(&self) -> Option<Path> {
        child_node(&self.syntax)
    }
}

impl TupleExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        child_nodes(&self.syntax)
    }

    /// A single element with no comma is plain grouping rather than a
    /// one-tuple.
    pub fn is_grouping(&self) -> bool {
        child_token(&self.syntax, SyntaxKind::COMMA).is_none()
            && self.elements().count() == 1
    }
}

impl ArrayExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        child_nodes(&self.syntax)
    }
}

impl BlockExpr {
    /// The expressions in the block, statements and tail alike.
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        child_nodes(&self.syntax)
    }

    /// True when the final expression is terminated by `;`, which makes
    /// the block's value unit.
    pub fn has_trailing_semicolon(&self) -> bool {
        let Some(last) = self.syntax.children().last() else {
            return false;
        };
        let mut element = last.next_sibling_or_token();
        while let Some(it) = element {
            match it.kind() {
                SyntaxKind::SEMICOLON => return true,
                SyntaxKind::TRIVIA => element = it.next_sibling_or_token(),
                _ => return false,
            }
        }
        false
    }
}

/// The condition of an `if`/`elif`/`while`: either a `let` binding
/// condition or a boolean expression.
#[derive(Debug, Clone)]
pub enum Condition {
    Let(LetCondition),
    Expr(Expr),
}

fn condition_of(node: &SyntaxNode) -> Option<Condition> {
    let first = node.children().next()?;
    if let Some(let_condition) = LetCondition::cast(first.clone()) {
        return Some(Condition::Let(let_condition));
    }
    Expr::cast(first).map(Condition::Expr)
}

impl IfExpr {
    pub fn condition(&self) -> Option<Condition> {
        condition_of(&self.syntax)
    }

    /// The `then` block: the first block after the condition.
    pub fn then_block(&self) -> Option<BlockExpr> {
        child_nodes::<BlockExpr>(&self.syntax)
            .find(|block| Some(block.syntax.clone()) != self.syntax.children().next())
    }

    pub fn elif_branches(&self) -> impl Iterator<Item = ElifBranch> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn else_branch(&self) -> Option<ElseBranch> {
        child_node(&self.syntax)
    }
}

impl ElifBranch {
    pub fn condition(&self) -> Option<Condition> {
        condition_of(&self.syntax)
    }

    pub fn block(&self) -> Option<BlockExpr> {
        child_nodes::<BlockExpr>(&self.syntax)
            .find(|block| Some(block.syntax.clone()) != self.syntax.children().next())
    }
}

impl ElseBranch {
    pub fn block(&self) -> Option<BlockExpr> {
        child_node(&self.syntax)
    }
}

impl LetCondition {
    pub fn pattern(&self) -> Option<super::pat::Pattern> {
        child_node(&self.syntax)
    }

    pub fn expr(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl MatchExpr {
    pub fn scrutinee(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }

    pub fn arms(&self) -> impl Iterator<Item = MatchArm> + '_ {
        child_nodes(&self.syntax)
    }
}

impl MatchArm {
    /// The arm's patterns; more than one is sugar for a tuple pattern.
    pub fn patterns(&self) -> impl Iterator<Item = super::pat::Pattern> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn value(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl LoopExpr {
    pub fn body(&self) -> Option<BlockExpr> {
        child_node(&self.syntax)
    }
}

impl WhileExpr {
    pub fn condition(&self) -> Option<Condition> {
        condition_of(&self.syntax)
    }

    pub fn body(&self) -> Option<BlockExpr> {
        child_nodes::<BlockExpr>(&self.syntax)
            .find(|block| Some(block.syntax.clone()) != self.syntax.children().next())
    }
}

impl ForExpr {
    pub fn pattern(&self) -> Option<super::pat::Pattern> {
        child_node(&self.syntax)
    }

    pub fn iterable(&self) -> Option<Expr> {
        child_nodes::<Expr>(&self.syntax)
            .find(|expr| !matches!(expr, Expr::Block(_)))
            .or_else(|| child_node(&self.syntax))
    }

    pub fn body(&self) -> Option<BlockExpr> {
        child_nodes::<BlockExpr>(&self.syntax).last()
    }
}

impl BreakExpr {
    pub fn value(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl RetExpr {
    pub fn value(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl DiscardExpr {
    pub fn value(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl DeferExpr {
    pub fn value(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl LetExpr {
    /// The bound patterns; more than one is sugar for a tuple pattern.
    pub fn patterns(&self) -> impl Iterator<Item = super::pat::Pattern> + '_ {
        child_nodes(&self.syntax)
    }

    pub fn annotation(&self) -> Option<TypeAnnotation> {
        child_node(&self.syntax)
    }

    pub fn initializer(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }
}

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        child_nodes(&self.syntax)
    }
}

impl MethodCallExpr {
    pub fn receiver(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn template_args(&self) -> Option<TemplateArgList> {
        child_node(&self.syntax)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }
}

impl FieldExpr {
    pub fn receiver(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }

    /// The field name for named access (`x.f`).
    pub fn name(&self) -> Option<SyntaxToken> {
        name_token(&self.syntax)
    }

    /// The index token for tuple access (`x.0`).
    pub fn index_token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::INT_LITERAL)
    }
}

impl IndexExpr {
    pub fn receiver(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }

    pub fn index(&self) -> Option<Expr> {
        child_nodes::<Expr>(&self.syntax).nth(1)
    }
}

impl StructInitExpr {
    pub fn path_expr(&self) -> Option<PathExpr> {
        child_node(&self.syntax)
    }

    pub fn fields(&self) -> impl Iterator<Item = StructInitField> + '_ {
        child_nodes(&self.syntax)
    }
}

impl StructInitField {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::LOWER_NAME)
    }

    pub fn value(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl RefExpr {
    pub fn mutability(&self) -> Option<Mutability> {
        child_node(&self.syntax)
    }

    pub fn operand(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl DerefExpr {
    pub fn operand(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }
}

impl CastExpr {
    pub fn operand(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }

    pub fn target(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl AscriptionExpr {
    pub fn operand(&self) -> Option<Expr> {
        child_node(&self.syntax)
    }

    pub fn ascribed(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl SizeofExpr {
    pub fn ty(&self) -> Option<Type> {
        child_node(&self.syntax)
    }
}

impl OperatorChainExpr {
    /// Operands and operator tokens in source order:
    /// `(operands, operators)` with `operands.len() == operators.len() + 1`
    /// for well-formed chains.
    pub fn parts(&self) -> (Vec<Expr>, Vec<SyntaxToken>) {
        let operands = child_nodes(&self.syntax).collect();
        let operators = self
            .syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|it| {
                matches!(
                    it.kind(),
                    SyntaxKind::OPERATOR | SyntaxKind::STAR | SyntaxKind::PLUS
                )
            })
            .collect();
        (operands, operators)
    }
}
