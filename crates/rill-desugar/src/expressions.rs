//! Expression desugaring.

use rill_common::span::Range;
use rill_parser::nodes::expr as cst;
use rill_parser::nodes::ty::{Mutability as CstMutability, Path as CstPath, TemplateArg};
use rill_parser::syntax_kind::SyntaxKind;
use rill_parser::nodes::AstNode;

use crate::ast::{
    Expression, ExpressionId, ExpressionKind, MatchArm, Mutability, MutabilityKind, Name, Path,
    PathSegment, TemplateArgument,
};
use crate::Desugarer;

impl Desugarer<'_> {
    pub fn desugar_expression(&mut self, expr: &cst::Expr) -> ExpressionId {
        let range = self.range_of(expr.syntax());
        let kind = match expr {
            cst::Expr::Literal(literal) => self.desugar_literal(literal, range),

            cst::Expr::Path(path_expr) => match path_expr.path() {
                Some(path) => ExpressionKind::Path(self.desugar_path(&path)),
                None => ExpressionKind::Error,
            },

            cst::Expr::Tuple(tuple) => {
                if tuple.is_grouping() {
                    let inner = tuple.elements().next().expect("grouping has one element");
                    return self.desugar_expression(&inner);
                }
                let elements = tuple
                    .elements()
                    .map(|element| self.desugar_expression(&element))
                    .collect();
                ExpressionKind::Tuple(elements)
            }

            cst::Expr::Array(array) => {
                let elements = array
                    .elements()
                    .map(|element| self.desugar_expression(&element))
                    .collect();
                ExpressionKind::Array(elements)
            }

            cst::Expr::Block(block) => return self.desugar_block(block),

            cst::Expr::If(if_expr) => return self.desugar_if(if_expr, range),

            cst::Expr::Match(match_expr) => {
                let scrutinee = self.desugar_opt_expression(match_expr.scrutinee(), range);
                let arms = match_expr
                    .arms()
                    .map(|arm| self.desugar_match_arm(&arm))
                    .collect();
                ExpressionKind::Match { scrutinee, arms }
            }

            cst::Expr::Loop(loop_expr) => {
                let body = match loop_expr.body() {
                    Some(block) => self.desugar_block(&block),
                    None => self.error_expression(range),
                };
                ExpressionKind::Loop { body }
            }

            cst::Expr::While(while_expr) => return self.desugar_while(while_expr, range),

            cst::Expr::For(for_expr) => {
                // No canonical rewrite exists for `for`; keep the tree
                // well formed with an error node.
                self.error("for loops are not supported", range);
                let _ = for_expr;
                ExpressionKind::Error
            }

            cst::Expr::Break(break_expr) => {
                let value = match break_expr.value() {
                    Some(value) => self.desugar_expression(&value),
                    None => self.unit(range),
                };
                ExpressionKind::Break { value }
            }

            cst::Expr::Continue(_) => ExpressionKind::Continue,

            cst::Expr::Ret(ret) => ExpressionKind::Ret {
                value: ret.value().map(|value| self.desugar_expression(&value)),
            },

            cst::Expr::Discard(discard) => {
                // `discard e` → `{ let _ = e; () }`
                let initializer = self.desugar_opt_expression(discard.value(), range);
                let pattern = self.wildcard_pattern(range);
                let binding = self.arena.alloc_expression(Expression {
                    kind: ExpressionKind::Let {
                        pattern,
                        annotation: None,
                        initializer,
                    },
                    range,
                });
                let result = self.unit(range);
                ExpressionKind::Block {
                    statements: vec![binding],
                    result,
                }
            }

            cst::Expr::Defer(_) => {
                self.error("defer expressions are not supported", range);
                ExpressionKind::Error
            }

            cst::Expr::Let(let_expr) => {
                let pattern = self.desugar_pattern_list(let_expr.patterns(), range);
                let annotation = let_expr
                    .annotation()
                    .and_then(|annotation| annotation.ty())
                    .map(|ty| self.desugar_type(&ty));
                let initializer = self.desugar_opt_expression(let_expr.initializer(), range);
                ExpressionKind::Let {
                    pattern,
                    annotation,
                    initializer,
                }
            }

            cst::Expr::Call(call) => {
                let callee = self.desugar_opt_expression(call.callee(), range);
                let arguments = match call.arg_list() {
                    Some(args) => args
                        .args()
                        .map(|argument| self.desugar_expression(&argument))
                        .collect(),
                    None => Vec::new(),
                };
                ExpressionKind::Call { callee, arguments }
            }

            cst::Expr::MethodCall(method_call) => {
                let receiver = self.desugar_opt_expression(method_call.receiver(), range);
                let Some(name_token) = method_call.name() else {
                    return self.error_expression(range);
                };
                let name = self.name(&name_token);
                let template_arguments = method_call
                    .template_args()
                    .map(|args| self.desugar_template_arguments(&args));
                let arguments = match method_call.arg_list() {
                    Some(args) => args
                        .args()
                        .map(|argument| self.desugar_expression(&argument))
                        .collect(),
                    None => Vec::new(),
                };
                ExpressionKind::MethodCall {
                    receiver,
                    name,
                    template_arguments,
                    arguments,
                }
            }

            cst::Expr::Field(field) => {
                let receiver = self.desugar_opt_expression(field.receiver(), range);
                if let Some(name_token) = field.name() {
                    let name = self.name(&name_token);
                    ExpressionKind::FieldAccess { receiver, name }
                } else if let Some(index_token) = field.index_token() {
                    let index_range = self.token_range(&index_token);
                    let index = self
                        .integer_value(index_token.text(), index_range)
                        .map_or(0, |value| value as u32);
                    ExpressionKind::TupleFieldAccess {
                        receiver,
                        index,
                        index_range,
                    }
                } else {
                    ExpressionKind::Error
                }
            }

            cst::Expr::Index(index_expr) => {
                let receiver = self.desugar_opt_expression(index_expr.receiver(), range);
                let index = self.desugar_opt_expression(index_expr.index(), range);
                ExpressionKind::IndexAccess { receiver, index }
            }

            cst::Expr::StructInit(init) => {
                let Some(path) = init.path_expr().and_then(|path_expr| path_expr.path()) else {
                    return self.error_expression(range);
                };
                let path = self.desugar_path(&path);
                let fields = init
                    .fields()
                    .filter_map(|field| {
                        let name_token = field.name()?;
                        let name = self.name(&name_token);
                        let value = self.desugar_opt_expression(field.value(), name.range);
                        Some((name, value))
                    })
                    .collect();
                ExpressionKind::StructInitializer { path, fields }
            }

            cst::Expr::Ref(ref_expr) => {
                let mutability = self.desugar_mutability(ref_expr.mutability(), range);
                let operand = self.desugar_opt_expression(ref_expr.operand(), range);
                ExpressionKind::Reference { mutability, operand }
            }

            cst::Expr::Deref(deref) => {
                let operand = self.desugar_opt_expression(deref.operand(), range);
                ExpressionKind::Dereference { operand }
            }

            cst::Expr::Cast(cast) => {
                let operand = self.desugar_opt_expression(cast.operand(), range);
                let target = self.desugar_opt_type(cast.target(), range);
                ExpressionKind::Cast { operand, target }
            }

            cst::Expr::Ascription(ascription) => {
                let operand = self.desugar_opt_expression(ascription.operand(), range);
                let ascribed = self.desugar_opt_type(ascription.ascribed(), range);
                ExpressionKind::Ascription { operand, ascribed }
            }

            cst::Expr::Sizeof(sizeof) => {
                let inspected = self.desugar_opt_type(sizeof.ty(), range);
                ExpressionKind::Sizeof { inspected }
            }

            cst::Expr::OperatorChain(chain) => return self.desugar_operator_chain(chain, range),
        };
        self.arena.alloc_expression(Expression { kind, range })
    }

    pub(crate) fn desugar_opt_expression(
        &mut self,
        expr: Option<cst::Expr>,
        fallback: Range,
    ) -> ExpressionId {
        match expr {
            Some(expr) => self.desugar_expression(&expr),
            None => self.error_expression(fallback),
        }
    }

    fn desugar_literal(&mut self, literal: &cst::Literal, range: Range) -> ExpressionKind {
        let Some(token) = literal.token() else {
            return ExpressionKind::Error;
        };
        let text = token.text();
        match token.kind() {
            SyntaxKind::INT_LITERAL => match self.integer_value(text, range) {
                Some(value) => ExpressionKind::IntegerLiteral(value),
                None => ExpressionKind::Error,
            },
            SyntaxKind::FLOAT_LITERAL => match self.floating_value(text, range) {
                Some(value) => ExpressionKind::FloatingLiteral(value),
                None => ExpressionKind::Error,
            },
            SyntaxKind::BOOL_LITERAL => ExpressionKind::BooleanLiteral(text == "true"),
            SyntaxKind::STR_LITERAL => {
                let value = self.string_value(text, range);
                ExpressionKind::StringLiteral(self.interner.intern(&value))
            }
            SyntaxKind::CHAR_LITERAL => match self.character_value(text, range) {
                Some(value) => ExpressionKind::CharacterLiteral(value),
                None => ExpressionKind::Error,
            },
            _ => ExpressionKind::Error,
        }
    }

    /// `{ s1; …; tail }` with an explicit unit result when the tail is
    /// missing or terminated by `;`.
    pub fn desugar_block(&mut self, block: &cst::BlockExpr) -> ExpressionId {
        let range = self.range_of(block.syntax());
        let mut statements: Vec<ExpressionId> = block
            .elements()
            .map(|element| self.desugar_expression(&element))
            .collect();
        let result = if statements.is_empty() || block.has_trailing_semicolon() {
            self.unit(range)
        } else {
            statements.pop().expect("non-empty statement list")
        };
        self.arena.alloc_expression(Expression {
            kind: ExpressionKind::Block { statements, result },
            range,
        })
    }

    // ── Conditionals ───────────────────────────────────────────────────

    /// `if`/`elif`/`else` chains become nested two-way conditionals;
    /// `if let` becomes a match. A missing else-branch becomes `()`.
    fn desugar_if(&mut self, if_expr: &cst::IfExpr, range: Range) -> ExpressionId {
        let mut else_expr = match if_expr.else_branch().and_then(|branch| branch.block()) {
            Some(block) => self.desugar_block(&block),
            None => self.unit(range),
        };

        let branches: Vec<_> = if_expr.elif_branches().collect();
        for branch in branches.iter().rev() {
            let branch_range = self.range_of(branch.syntax());
            else_expr =
                self.desugar_branch(branch.condition(), branch.block(), else_expr, branch_range);
        }

        self.desugar_branch(if_expr.condition(), if_expr.then_block(), else_expr, range)
    }

    /// One `cond { then } else …` step: a conditional for an expression
    /// condition, a match for a `let` condition.
    fn desugar_branch(
        &mut self,
        condition: Option<cst::Condition>,
        block: Option<cst::BlockExpr>,
        else_expr: ExpressionId,
        range: Range,
    ) -> ExpressionId {
        let true_branch = match block {
            Some(block) => self.desugar_block(&block),
            None => self.error_expression(range),
        };
        let kind = match condition {
            Some(cst::Condition::Expr(condition)) => {
                let condition = self.desugar_expression(&condition);
                ExpressionKind::Conditional {
                    condition,
                    true_branch,
                    false_branch: else_expr,
                }
            }
            Some(cst::Condition::Let(let_condition)) => {
                let scrutinee = self.desugar_opt_expression(let_condition.expr(), range);
                let pattern = match let_condition.pattern() {
                    Some(pattern) => self.desugar_pattern(&pattern),
                    None => self.wildcard_pattern(range),
                };
                let wildcard = self.wildcard_pattern(range);
                ExpressionKind::Match {
                    scrutinee,
                    arms: vec![
                        MatchArm { pattern, expression: true_branch },
                        MatchArm { pattern: wildcard, expression: else_expr },
                    ],
                }
            }
            None => {
                let condition = self.error_expression(range);
                ExpressionKind::Conditional {
                    condition,
                    true_branch,
                    false_branch: else_expr,
                }
            }
        };
        self.arena.alloc_expression(Expression { kind, range })
    }

    /// `while c { b }` → `loop { if c { b } else break () }`;
    /// `while let p = e { b }` → `loop { match e { p -> { b } _ -> break () } }`.
    fn desugar_while(&mut self, while_expr: &cst::WhileExpr, range: Range) -> ExpressionId {
        let body = match while_expr.body() {
            Some(block) => self.desugar_block(&block),
            None => self.error_expression(range),
        };
        let break_value = self.unit(range);
        let break_expr = self.arena.alloc_expression(Expression {
            kind: ExpressionKind::Break { value: break_value },
            range,
        });

        let step = match while_expr.condition() {
            Some(cst::Condition::Expr(condition)) => {
                let condition = self.desugar_expression(&condition);
                ExpressionKind::Conditional {
                    condition,
                    true_branch: body,
                    false_branch: break_expr,
                }
            }
            Some(cst::Condition::Let(let_condition)) => {
                let scrutinee = self.desugar_opt_expression(let_condition.expr(), range);
                let pattern = match let_condition.pattern() {
                    Some(pattern) => self.desugar_pattern(&pattern),
                    None => self.wildcard_pattern(range),
                };
                let wildcard = self.wildcard_pattern(range);
                ExpressionKind::Match {
                    scrutinee,
                    arms: vec![
                        MatchArm { pattern, expression: body },
                        MatchArm { pattern: wildcard, expression: break_expr },
                    ],
                }
            }
            None => {
                let condition = self.error_expression(range);
                ExpressionKind::Conditional {
                    condition,
                    true_branch: body,
                    false_branch: break_expr,
                }
            }
        };
        let step = self.arena.alloc_expression(Expression { kind: step, range });
        let loop_body = self.arena.alloc_expression(Expression {
            kind: ExpressionKind::Block { statements: Vec::new(), result: step },
            range,
        });
        self.arena.alloc_expression(Expression {
            kind: ExpressionKind::Loop { body: loop_body },
            range,
        })
    }

    fn desugar_match_arm(&mut self, arm: &cst::MatchArm) -> MatchArm {
        let range = self.range_of(arm.syntax());
        let pattern = self.desugar_pattern_list(arm.patterns(), range);
        let expression = self.desugar_opt_expression(arm.value(), range);
        MatchArm { pattern, expression }
    }

    // ── Operator chains ────────────────────────────────────────────────

    /// Shape a flat operator chain into a left-associative tree by
    /// precedence class (loosest first): unrecognized operators, then
    /// assignment, logical, ordering, equality-like, additive,
    /// multiplicative. Classification is by exact spelling.
    fn desugar_operator_chain(
        &mut self,
        chain: &cst::OperatorChainExpr,
        range: Range,
    ) -> ExpressionId {
        let (operands, operators) = chain.parts();
        if operands.is_empty() {
            return self.error_expression(range);
        }

        let operands: Vec<(ExpressionId, Range)> = operands
            .iter()
            .map(|operand| {
                let operand_range = self.range_of(operand.syntax());
                (self.desugar_expression(operand), operand_range)
            })
            .collect();
        let mut operators: Vec<Name> = operators.iter().map(|token| self.name(token)).collect();
        // A malformed chain (recovered parse) may miss a trailing
        // operand; drop the dangling operator.
        operators.truncate(operands.len().saturating_sub(1));

        self.build_operator_tree(&operands, &operators).0
    }

    fn build_operator_tree(
        &mut self,
        operands: &[(ExpressionId, Range)],
        operators: &[Name],
    ) -> (ExpressionId, Range) {
        if operators.is_empty() {
            return operands[0];
        }

        // Split at the loosest operator; rightmost on ties, which makes
        // same-class applications left-associative.
        let lowest = operators
            .iter()
            .map(|operator| precedence_of(self.interner.lookup(operator.id)))
            .min()
            .expect("at least one operator");
        let split = operators
            .iter()
            .rposition(|operator| precedence_of(self.interner.lookup(operator.id)) == lowest)
            .expect("an operator with the minimum precedence exists");

        let (left, left_range) =
            self.build_operator_tree(&operands[..=split], &operators[..split]);
        let (right, right_range) =
            self.build_operator_tree(&operands[split + 1..], &operators[split + 1..]);
        let range = left_range.merge(right_range);
        let id = self.arena.alloc_expression(Expression {
            kind: ExpressionKind::BinaryOperatorInvocation {
                operator: operators[split],
                left,
                right,
            },
            range,
        });
        (id, range)
    }

    // ── Paths and mutabilities ─────────────────────────────────────────

    pub(crate) fn desugar_path(&mut self, path: &CstPath) -> Path {
        let range = self.range_of(path.syntax());
        let typeof_root = path
            .typeof_root()
            .map(|root| self.desugar_opt_expression(root.expr(), range));
        let segments = path
            .segments()
            .filter_map(|segment| {
                let name_token = segment.name()?;
                let name = self.name(&name_token);
                let template_arguments = segment
                    .template_args()
                    .map(|args| self.desugar_template_arguments(&args));
                Some(PathSegment { name, template_arguments })
            })
            .collect();
        Path {
            is_global: path.is_global(),
            typeof_root,
            segments,
            range,
        }
    }

    pub(crate) fn desugar_template_arguments(
        &mut self,
        args: &rill_parser::nodes::ty::TemplateArgList,
    ) -> Vec<TemplateArgument> {
        args.args()
            .map(|arg| match arg {
                TemplateArg::Type(ty) => TemplateArgument::Type(self.desugar_type(&ty)),
                TemplateArg::Mutability(mutability) => {
                    TemplateArgument::Mutability(self.desugar_mutability_node(&mutability))
                }
            })
            .collect()
    }

    pub(crate) fn desugar_mutability_node(&mut self, node: &CstMutability) -> Mutability {
        let range = self.range_of(node.syntax());
        let kind = match node.token() {
            Some(token) => match token.kind() {
                SyntaxKind::MUT_KW => MutabilityKind::Constant { is_mutable: true },
                SyntaxKind::IMMUT_KW => MutabilityKind::Constant { is_mutable: false },
                _ => MutabilityKind::Parameterized(self.name(&token)),
            },
            None => MutabilityKind::Constant { is_mutable: false },
        };
        Mutability { kind, range }
    }

    /// An optional mutability node; absence means `immut`.
    pub(crate) fn desugar_mutability(
        &mut self,
        node: Option<CstMutability>,
        range: Range,
    ) -> Mutability {
        match node {
            Some(node) => self.desugar_mutability_node(&node),
            None => Mutability {
                kind: MutabilityKind::Constant { is_mutable: false },
                range,
            },
        }
    }
}

/// Binding class of a binary operator, loosest (0) to tightest.
fn precedence_of(operator: &str) -> u8 {
    match operator {
        ":=" | "+=" | "-=" | "*=" | "/=" | "%=" => 1,
        "&&" | "||" => 2,
        "<" | "<=" | ">=" | ">" => 3,
        "?=" | "!=" => 4,
        "+" | "-" => 5,
        "*" | "/" | "%" => 6,
        _ => 0,
    }
}
