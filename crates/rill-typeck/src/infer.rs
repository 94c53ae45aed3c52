//! Expression and pattern inference.
//!
//! Each AST expression resolves in a scope/environment pair and produces
//! a HIR expression with an attached type id. Inference is depth-first
//! in AST order, and unifications solve variables immediately on first
//! match -- there is no deferred constraint queue.

use rill_common::db::{Database, DocumentId, SemanticTokenKind};
use rill_common::diagnostic::Diagnostic;
use rill_common::span::{Location, Range};
use rill_desugar::ast;
use rustc_hash::FxHashMap;

use crate::hir::{self, IntegerType, TypeId, TypeVariant};
use crate::resolve::ValueTarget;
use crate::scope::{Scope, VariableBind};
use crate::symbol::{
    EnumerationId, FunctionId, ImplementationId, LowerInfo, LowerVariant, ResolvedConstructor,
    ResolvedConstructorBody, ResolvedTemplateParameter, Symbol,
};
use crate::unify::TypeVariableKind;
use crate::{Analysis, EnvironmentId};

/// Inference context for one body: the declared return type for `ret`,
/// and the result-type stack of enclosing loops for `break`.
pub(crate) struct BodyContext {
    pub return_type: TypeId,
    pub loop_types: Vec<TypeId>,
}

impl BodyContext {
    pub fn new(return_type: TypeId) -> Self {
        Self { return_type, loop_types: Vec::new() }
    }

    /// A context for expressions outside any function body (`typeof`
    /// operands, default arguments). `ret` unifies against the error
    /// type there, which never reports.
    pub fn detached(document: DocumentId, analysis: &mut Analysis) -> Self {
        let error = analysis.alloc_type(
            document,
            TypeVariant::Error,
            Range::at(Default::default()),
        );
        Self { return_type: error, loop_types: Vec::new() }
    }
}

impl Analysis {
    pub(crate) fn infer_expression(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        id: ast::ExpressionId,
    ) -> hir::ExpressionId {
        let node = self.state(document).ast.expression(id).clone();
        let range = node.range;

        let (kind, ty) = match node.kind {
            ast::ExpressionKind::Error => {
                let error = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Error, error)
            }

            ast::ExpressionKind::IntegerLiteral(value) => {
                let ty = self.fresh_type(document, TypeVariableKind::Integral, range);
                (hir::ExpressionKind::IntegerLiteral(value), ty)
            }
            ast::ExpressionKind::FloatingLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::Floating, range);
                (hir::ExpressionKind::FloatingLiteral(value), ty)
            }
            ast::ExpressionKind::BooleanLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::Boolean, range);
                (hir::ExpressionKind::BooleanLiteral(value), ty)
            }
            ast::ExpressionKind::StringLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::String, range);
                (hir::ExpressionKind::StringLiteral(value), ty)
            }
            ast::ExpressionKind::CharacterLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::Character, range);
                (hir::ExpressionKind::CharacterLiteral(value), ty)
            }

            ast::ExpressionKind::Path(path) => {
                return self.infer_path_expression(db, document, scope, environment, &path, range);
            }

            ast::ExpressionKind::Tuple(elements) => {
                let elements: Vec<_> = elements
                    .into_iter()
                    .map(|element| {
                        self.infer_expression(db, document, scope, environment, body, element)
                    })
                    .collect();
                let types = elements
                    .iter()
                    .map(|&element| self.state(document).hir.expression(element).ty)
                    .collect();
                let ty = self.alloc_type(document, TypeVariant::Tuple(types), range);
                (hir::ExpressionKind::Tuple(elements), ty)
            }

            ast::ExpressionKind::Array(elements) => {
                let element_type = self.fresh_type(document, TypeVariableKind::General, range);
                let elements: Vec<_> = elements
                    .into_iter()
                    .map(|element| {
                        let element =
                            self.infer_expression(db, document, scope, environment, body, element);
                        let ty = self.state(document).hir.expression(element).ty;
                        let element_range = self.state(document).hir.expression(element).range;
                        self.unify(db, document, element_type, ty, element_range);
                        element
                    })
                    .collect();
                let length = Some(elements.len() as u64);
                let ty = self.alloc_type(
                    document,
                    TypeVariant::Array { element: element_type, length },
                    range,
                );
                (hir::ExpressionKind::Array(elements), ty)
            }

            ast::ExpressionKind::Block { statements, result } => {
                scope.push_frame();
                let statements: Vec<_> = statements
                    .into_iter()
                    .map(|statement| {
                        self.infer_expression(db, document, scope, environment, body, statement)
                    })
                    .collect();
                let result = self.infer_expression(db, document, scope, environment, body, result);
                let mut warnings = Vec::new();
                scope.pop_frame(&db.interner, &mut warnings);
                db.document_mut(document).diagnostics.extend(warnings);
                let ty = self.state(document).hir.expression(result).ty;
                (hir::ExpressionKind::Block { statements, result }, ty)
            }

            ast::ExpressionKind::Conditional { condition, true_branch, false_branch } => {
                let condition =
                    self.infer_expression(db, document, scope, environment, body, condition);
                let boolean = self.alloc_type(document, TypeVariant::Boolean, range);
                let condition_ty = self.state(document).hir.expression(condition).ty;
                let condition_range = self.state(document).hir.expression(condition).range;
                self.unify(db, document, boolean, condition_ty, condition_range);

                let true_branch =
                    self.infer_expression(db, document, scope, environment, body, true_branch);
                let false_branch =
                    self.infer_expression(db, document, scope, environment, body, false_branch);
                let true_ty = self.state(document).hir.expression(true_branch).ty;
                let false_ty = self.state(document).hir.expression(false_branch).ty;
                self.unify(db, document, true_ty, false_ty, range);
                (
                    hir::ExpressionKind::Conditional { condition, true_branch, false_branch },
                    true_ty,
                )
            }

            ast::ExpressionKind::Match { scrutinee, arms } => {
                let scrutinee =
                    self.infer_expression(db, document, scope, environment, body, scrutinee);
                let scrutinee_ty = self.state(document).hir.expression(scrutinee).ty;
                let result_type = self.fresh_type(document, TypeVariableKind::General, range);

                let mut hir_arms = Vec::new();
                for arm in arms {
                    scope.push_frame();
                    let pattern = self.infer_pattern(
                        db,
                        document,
                        scope,
                        environment,
                        body,
                        Some(scrutinee_ty),
                        arm.pattern,
                    );
                    let pattern_ty = self.state(document).hir.pattern(pattern).ty;
                    let pattern_range = self.state(document).hir.pattern(pattern).range;
                    self.unify(db, document, scrutinee_ty, pattern_ty, pattern_range);

                    let expression =
                        self.infer_expression(db, document, scope, environment, body, arm.expression);
                    let expression_ty = self.state(document).hir.expression(expression).ty;
                    let expression_range = self.state(document).hir.expression(expression).range;
                    self.unify(db, document, result_type, expression_ty, expression_range);

                    let mut warnings = Vec::new();
                    scope.pop_frame(&db.interner, &mut warnings);
                    db.document_mut(document).diagnostics.extend(warnings);
                    hir_arms.push(hir::MatchArm { pattern, expression });
                }
                (hir::ExpressionKind::Match { scrutinee, arms: hir_arms }, result_type)
            }

            ast::ExpressionKind::Loop { body: loop_body } => {
                // The loop's type is the common type of its breaks.
                let result_type = self.fresh_type(document, TypeVariableKind::General, range);
                body.loop_types.push(result_type);
                let loop_body =
                    self.infer_expression(db, document, scope, environment, body, loop_body);
                body.loop_types.pop();
                (hir::ExpressionKind::Loop { body: loop_body }, result_type)
            }

            ast::ExpressionKind::Break { value } => {
                let value = self.infer_expression(db, document, scope, environment, body, value);
                let value_ty = self.state(document).hir.expression(value).ty;
                match body.loop_types.last().copied() {
                    Some(loop_type) => {
                        self.unify(db, document, loop_type, value_ty, range);
                    }
                    None => {
                        db.emit(
                            document,
                            Diagnostic::error("`break` outside of a loop", range),
                        );
                    }
                }
                // The break itself never yields; its own type unifies
                // with anything, like the error type does.
                let ty = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Break { value }, ty)
            }

            ast::ExpressionKind::Continue => {
                if body.loop_types.is_empty() {
                    db.emit(
                        document,
                        Diagnostic::error("`continue` outside of a loop", range),
                    );
                }
                let ty = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Continue, ty)
            }

            ast::ExpressionKind::Ret { value } => {
                let value = value.map(|value| {
                    self.infer_expression(db, document, scope, environment, body, value)
                });
                let value_ty = match value {
                    Some(value) => self.state(document).hir.expression(value).ty,
                    None => self.alloc_type(document, TypeVariant::Tuple(Vec::new()), range),
                };
                self.unify(db, document, body.return_type, value_ty, range);
                let ty = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Ret { value }, ty)
            }

            ast::ExpressionKind::Call { callee, arguments } => {
                return self.infer_call(
                    db, document, scope, environment, body, callee, arguments, range,
                );
            }

            ast::ExpressionKind::MethodCall { receiver, name, template_arguments, arguments } => {
                return self.infer_method_call(
                    db,
                    document,
                    scope,
                    environment,
                    body,
                    receiver,
                    name,
                    template_arguments,
                    arguments,
                    range,
                );
            }

            ast::ExpressionKind::FieldAccess { receiver, name } => {
                return self.infer_field_access(
                    db, document, scope, environment, body, receiver, name, range,
                );
            }

            ast::ExpressionKind::TupleFieldAccess { receiver, index, index_range } => {
                let receiver =
                    self.infer_expression(db, document, scope, environment, body, receiver);
                let receiver_ty = self.state(document).hir.expression(receiver).ty;
                let state = self.state(document);
                let flattened = state.inference.flatten(&state.hir, receiver_ty);
                let ty = match state.hir.ty(flattened).variant.clone() {
                    TypeVariant::Tuple(elements) => match elements.get(index as usize) {
                        Some(&element) => element,
                        None => {
                            db.emit(
                                document,
                                Diagnostic::error(
                                    format!("no field {index} on the tuple"),
                                    index_range,
                                ),
                            );
                            self.alloc_type(document, TypeVariant::Error, range)
                        }
                    },
                    TypeVariant::Error => self.alloc_type(document, TypeVariant::Error, range),
                    _ => {
                        let found = self.type_string(db, document, receiver_ty);
                        db.emit(
                            document,
                            Diagnostic::error(
                                format!("tuple field access on non-tuple type {found}"),
                                index_range,
                            ),
                        );
                        self.alloc_type(document, TypeVariant::Error, range)
                    }
                };
                (hir::ExpressionKind::TupleFieldAccess { receiver, index }, ty)
            }

            ast::ExpressionKind::IndexAccess { receiver, index } => {
                let receiver =
                    self.infer_expression(db, document, scope, environment, body, receiver);
                let index = self.infer_expression(db, document, scope, environment, body, index);
                let index_ty = self.state(document).hir.expression(index).ty;
                let index_range = self.state(document).hir.expression(index).range;
                let u64_type =
                    self.alloc_type(document, TypeVariant::Integer(IntegerType::U64), index_range);
                self.unify(db, document, u64_type, index_ty, index_range);

                let receiver_ty = self.state(document).hir.expression(receiver).ty;
                let state = self.state(document);
                let flattened = state.inference.flatten(&state.hir, receiver_ty);
                let ty = match state.hir.ty(flattened).variant.clone() {
                    TypeVariant::Array { element, .. } | TypeVariant::Slice { element } => element,
                    TypeVariant::Error => self.alloc_type(document, TypeVariant::Error, range),
                    _ => {
                        let found = self.type_string(db, document, receiver_ty);
                        db.emit(
                            document,
                            Diagnostic::error(
                                format!("index access on non-array type {found}"),
                                range,
                            ),
                        );
                        self.alloc_type(document, TypeVariant::Error, range)
                    }
                };
                (hir::ExpressionKind::IndexAccess { receiver, index }, ty)
            }

            ast::ExpressionKind::StructInitializer { path, fields } => {
                return self.infer_struct_initializer(
                    db, document, scope, environment, body, &path, fields, range,
                );
            }

            ast::ExpressionKind::BinaryOperatorInvocation { operator, left, right } => {
                return self.infer_binary_operator(
                    db, document, scope, environment, body, operator, left, right, range,
                );
            }

            ast::ExpressionKind::Reference { mutability, operand } => {
                let mutability = self.resolve_mutability(db, document, scope, &mutability);
                let operand =
                    self.infer_expression(db, document, scope, environment, body, operand);
                let operand_ty = self.state(document).hir.expression(operand).ty;
                let ty = self.alloc_type(
                    document,
                    TypeVariant::Reference { referee: operand_ty, mutability },
                    range,
                );
                (hir::ExpressionKind::Reference { mutability, operand }, ty)
            }

            ast::ExpressionKind::Dereference { operand } => {
                let operand =
                    self.infer_expression(db, document, scope, environment, body, operand);
                let operand_ty = self.state(document).hir.expression(operand).ty;
                let state = self.state(document);
                let flattened = state.inference.flatten(&state.hir, operand_ty);
                let ty = match state.hir.ty(flattened).variant.clone() {
                    TypeVariant::Reference { referee, .. } => referee,
                    TypeVariant::Pointer { pointee, .. } => pointee,
                    TypeVariant::Error => self.alloc_type(document, TypeVariant::Error, range),
                    _ => {
                        let found = self.type_string(db, document, operand_ty);
                        db.emit(
                            document,
                            Diagnostic::error(
                                format!("cannot dereference a value of type {found}"),
                                range,
                            ),
                        );
                        self.alloc_type(document, TypeVariant::Error, range)
                    }
                };
                (hir::ExpressionKind::Dereference { operand }, ty)
            }

            ast::ExpressionKind::Cast { operand, target } => {
                // Conversions are unchecked: the expression takes the
                // target type.
                let operand =
                    self.infer_expression(db, document, scope, environment, body, operand);
                let ty = self.resolve_type(db, document, scope, environment, target);
                (hir::ExpressionKind::Cast { operand }, ty)
            }

            ast::ExpressionKind::Ascription { operand, ascribed } => {
                // Ascription is transparent: after unifying, the operand
                // node already carries the ascribed type.
                let operand =
                    self.infer_expression(db, document, scope, environment, body, operand);
                let ty = self.resolve_type(db, document, scope, environment, ascribed);
                let operand_ty = self.state(document).hir.expression(operand).ty;
                self.unify(db, document, ty, operand_ty, range);
                return operand;
            }

            ast::ExpressionKind::Sizeof { inspected } => {
                let inspected = self.resolve_type(db, document, scope, environment, inspected);
                let ty = self.alloc_type(document, TypeVariant::Integer(IntegerType::U64), range);
                (hir::ExpressionKind::Sizeof { inspected }, ty)
            }

            ast::ExpressionKind::Let { pattern, annotation, initializer } => {
                let initializer =
                    self.infer_expression(db, document, scope, environment, body, initializer);
                let initializer_ty = self.state(document).hir.expression(initializer).ty;
                if let Some(annotation) = annotation {
                    let annotated = self.resolve_type(db, document, scope, environment, annotation);
                    let initializer_range = self.state(document).hir.expression(initializer).range;
                    self.unify(db, document, annotated, initializer_ty, initializer_range);
                }
                let pattern = self.infer_pattern(
                    db,
                    document,
                    scope,
                    environment,
                    body,
                    Some(initializer_ty),
                    pattern,
                );
                let pattern_ty = self.state(document).hir.pattern(pattern).ty;
                let pattern_range = self.state(document).hir.pattern(pattern).range;
                self.unify(db, document, pattern_ty, initializer_ty, pattern_range);
                let ty = self.alloc_type(document, TypeVariant::Tuple(Vec::new()), range);
                (hir::ExpressionKind::Let { pattern, initializer }, ty)
            }
        };

        self.state(document)
            .hir
            .alloc_expression(hir::Expression { kind, ty, range })
    }

    // ── Paths ──────────────────────────────────────────────────────────

    fn infer_path_expression(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        path: &ast::Path,
        range: Range,
    ) -> hir::ExpressionId {
        let target = self.resolve_value_path(db, document, scope, environment, path);
        let (kind, ty) = match target {
            ValueTarget::Local { tag, name, ty } => {
                (hir::ExpressionKind::LocalVariableReference { tag, name }, ty)
            }
            ValueTarget::Function(function) => {
                self.resolve_function(db, document, function);
                let ty = self.instantiated_function_type(document, function, range);
                (hir::ExpressionKind::FunctionReference { function }, ty)
            }
            ValueTarget::Constructor { enumeration, index, template_arguments } => {
                let ty = self.constructor_type(
                    db,
                    document,
                    enumeration,
                    index,
                    template_arguments,
                    range,
                );
                (
                    hir::ExpressionKind::ConstructorReference { enumeration, constructor: index },
                    ty,
                )
            }
            ValueTarget::Error => {
                let error = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Error, error)
            }
        };
        self.state(document)
            .hir
            .alloc_expression(hir::Expression { kind, ty, range })
    }

    /// Resolve a value-namespace path: scope chain first, then the
    /// environment chain.
    pub(crate) fn resolve_value_path(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        path: &ast::Path,
    ) -> ValueTarget {
        let Some((env, use_chain)) =
            self.resolve_path_prefix(db, document, scope, environment, path)
        else {
            return ValueTarget::Error;
        };
        let Some(segment) = path.segments.last() else {
            return ValueTarget::Error;
        };
        let segment = segment.clone();
        let name = segment.name;

        if name.is_upper {
            let text = db.interner.lookup(name.id).to_owned();
            db.emit(
                document,
                Diagnostic::error(
                    format!("`{text}` is a type and cannot be used as a value"),
                    name.range,
                ),
            );
            return ValueTarget::Error;
        }

        if use_chain {
            if let Some(bind) = scope.find_variable(name.id) {
                let (tag, ty, bind_range) = (bind.tag, bind.ty, bind.range);
                self.record_reference(
                    db,
                    document,
                    name.range,
                    Symbol::LocalVariable(tag),
                    Location { document, range: bind_range },
                    SemanticTokenKind::Variable,
                );
                return ValueTarget::Local { tag, name: name.id, ty };
            }
        }

        let info = if use_chain {
            self.lookup_lower(env, name.id)
        } else {
            self.environments[env.0 as usize].lower.get(&name.id).copied()
        };

        match info {
            Some(LowerInfo { variant: LowerVariant::Function(id), .. }) => {
                let location = Location {
                    document: self.functions[id.0 as usize].document,
                    range: self.functions[id.0 as usize].name.range,
                };
                self.record_reference(
                    db,
                    document,
                    name.range,
                    Symbol::Function(id),
                    location,
                    SemanticTokenKind::Function,
                );
                ValueTarget::Function(id)
            }
            Some(LowerInfo { variant: LowerVariant::Constructor { enumeration, index }, .. }) => {
                self.ensure_enumeration(db, document, enumeration);
                let location = Location {
                    document: self.enumerations[enumeration.0 as usize].document,
                    range: self.enumerations[enumeration.0 as usize].name.range,
                };
                self.record_reference(
                    db,
                    document,
                    name.range,
                    Symbol::Enumeration(enumeration),
                    location,
                    SemanticTokenKind::EnumMember,
                );
                // Explicit template arguments ride on the enum segment:
                // `Option[I32]::some`.
                let template_arguments = self.enum_segment_arguments(
                    db, document, scope, environment, path, enumeration,
                );
                ValueTarget::Constructor { enumeration, index, template_arguments }
            }
            Some(LowerInfo { variant: LowerVariant::Module(_), .. }) => {
                let text = db.interner.lookup(name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(
                        format!("`{text}` is a module and cannot be used as a value"),
                        name.range,
                    ),
                );
                ValueTarget::Error
            }
            None => {
                let text = db.interner.lookup(name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(format!("`{text}` is not defined here"), name.range),
                );
                ValueTarget::Error
            }
        }
    }

    /// Template arguments written on the enumeration segment of a
    /// constructor path.
    fn enum_segment_arguments(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        path: &ast::Path,
        enumeration: EnumerationId,
    ) -> Option<Vec<TypeId>> {
        let prefix_len = path.segments.len().checked_sub(2)?;
        let segment = &path.segments[prefix_len];
        segment.template_arguments.as_ref()?;
        let range = segment.name.range;
        Some(self.resolve_enum_template_arguments(
            db,
            document,
            scope,
            environment,
            enumeration,
            segment,
            range,
        ))
    }

    // ── References to generic definitions ──────────────────────────────

    /// A function reference's type: the signature's function type with
    /// fresh variables substituted for its template parameters.
    fn instantiated_function_type(
        &mut self,
        document: DocumentId,
        function: FunctionId,
        range: Range,
    ) -> TypeId {
        let Some(signature) = self.functions[function.0 as usize].signature.clone() else {
            return self.alloc_type(document, TypeVariant::Error, range);
        };
        // Cross-document references copy the type into this document's
        // arena first.
        let source = self.functions[function.0 as usize].document;
        let function_type = if source == document {
            signature.function_type
        } else {
            self.import_type(source, document, signature.function_type)
        };
        let (substitution, mutability_substitution) = self.fresh_substitution(
            document,
            &signature.template_parameters,
            range,
        );
        let state = self.state(document);
        state.inference.instantiate_with(
            &mut state.hir,
            &substitution,
            &mutability_substitution,
            function_type,
        )
    }

    pub(crate) fn fresh_substitution(
        &mut self,
        document: DocumentId,
        parameters: &[ResolvedTemplateParameter],
        range: Range,
    ) -> (
        FxHashMap<hir::LocalTypeTag, TypeId>,
        FxHashMap<hir::LocalMutabilityTag, hir::MutabilityId>,
    ) {
        let mut substitution = FxHashMap::default();
        let mut mutability_substitution = FxHashMap::default();
        for parameter in parameters {
            match parameter {
                ResolvedTemplateParameter::Type { tag, .. } => {
                    let fresh = self.fresh_type(document, TypeVariableKind::General, range);
                    substitution.insert(*tag, fresh);
                }
                ResolvedTemplateParameter::Mutability { tag, .. } => {
                    let fresh = self.fresh_mutability(document, range);
                    mutability_substitution.insert(*tag, fresh);
                }
            }
        }
        (substitution, mutability_substitution)
    }

    /// An enumeration constructor's type at a use site: the enum type
    /// for unit constructors, a function type for tuple constructors.
    pub(crate) fn constructor_type(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        enumeration: EnumerationId,
        index: usize,
        explicit_arguments: Option<Vec<TypeId>>,
        range: Range,
    ) -> TypeId {
        self.ensure_enumeration(db, document, enumeration);
        let Some(resolved) = self.enumerations[enumeration.0 as usize].resolved.clone() else {
            return self.alloc_type(document, TypeVariant::Error, range);
        };
        let source = self.enumerations[enumeration.0 as usize].document;

        // Build the substitution from the enum's template parameters to
        // either the explicit arguments or fresh variables.
        let mut substitution = FxHashMap::default();
        let mut explicit = explicit_arguments.into_iter().flatten();
        let mut argument_types = Vec::new();
        for parameter in &resolved.template_parameters {
            if let ResolvedTemplateParameter::Type { tag, .. } = parameter {
                let ty = explicit.next().unwrap_or_else(|| {
                    self.fresh_type(document, TypeVariableKind::General, range)
                });
                substitution.insert(*tag, ty);
                argument_types.push(ty);
            }
        }

        let self_type = self.alloc_type(
            document,
            TypeVariant::Enumeration { enumeration, template_arguments: argument_types },
            range,
        );

        match resolved.constructors.get(index).map(|ctor| ctor.body.clone()) {
            Some(ResolvedConstructorBody::Unit) | None => self_type,
            Some(ResolvedConstructorBody::Tuple(fields)) => {
                let parameters: Vec<_> = fields
                    .into_iter()
                    .map(|field| {
                        let field = if source == document {
                            field
                        } else {
                            self.import_type(source, document, field)
                        };
                        let state = self.state(document);
                        state.inference.instantiate(&mut state.hir, &substitution, field)
                    })
                    .collect();
                self.alloc_type(
                    document,
                    TypeVariant::Function { parameters, ret: self_type },
                    range,
                )
            }
            Some(ResolvedConstructorBody::Struct(_)) => {
                let name = self.enumerations[enumeration.0 as usize].name;
                let text = db.interner.lookup(name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(
                        format!("`{text}` has named fields; use a struct initializer"),
                        range,
                    ),
                );
                self.alloc_type(document, TypeVariant::Error, range)
            }
        }
    }

    // ── Calls ──────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn infer_call(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        callee: ast::ExpressionId,
        arguments: Vec<ast::ExpressionId>,
        range: Range,
    ) -> hir::ExpressionId {
        let callee = self.infer_expression(db, document, scope, environment, body, callee);
        let arguments: Vec<_> = arguments
            .into_iter()
            .map(|argument| self.infer_expression(db, document, scope, environment, body, argument))
            .collect();

        let callee_ty = self.state(document).hir.expression(callee).ty;
        let state = self.state(document);
        let flattened = state.inference.flatten(&state.hir, callee_ty);
        let ty = match state.hir.ty(flattened).variant.clone() {
            TypeVariant::Function { parameters, ret } => {
                if parameters.len() != arguments.len() {
                    db.emit(
                        document,
                        Diagnostic::error(
                            format!(
                                "wrong number of arguments: expected {}, found {}",
                                parameters.len(),
                                arguments.len()
                            ),
                            range,
                        ),
                    );
                } else {
                    for (&argument, parameter) in arguments.iter().zip(parameters) {
                        let argument_ty = self.state(document).hir.expression(argument).ty;
                        let argument_range = self.state(document).hir.expression(argument).range;
                        self.unify(db, document, parameter, argument_ty, argument_range);
                    }
                }
                ret
            }
            TypeVariant::Error => {
                let error = self.alloc_type(document, TypeVariant::Error, range);
                self.poison_arguments(db, document, &arguments, error, range);
                error
            }
            _ => {
                let found = self.type_string(db, document, callee_ty);
                db.emit(
                    document,
                    Diagnostic::error(format!("cannot call a value of type {found}"), range),
                );
                let error = self.alloc_type(document, TypeVariant::Error, range);
                self.poison_arguments(db, document, &arguments, error, range);
                error
            }
        };

        self.state(document).hir.alloc_expression(hir::Expression {
            kind: hir::ExpressionKind::Call { callee, arguments },
            ty,
            range,
        })
    }

    /// After a failed call resolution, solve the arguments' free
    /// variables with the error type so they do not surface as spurious
    /// "type annotation required" reports.
    fn poison_arguments(
        &mut self,
        db: &Database,
        document: DocumentId,
        arguments: &[hir::ExpressionId],
        error: TypeId,
        range: Range,
    ) {
        for &argument in arguments {
            let ty = self.state(document).hir.expression(argument).ty;
            self.unify(db, document, error, ty, range);
        }
    }

    // ── Method lookup (linear over implementation blocks) ──────────────

    #[allow(clippy::too_many_arguments)]
    fn infer_method_call(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        receiver: ast::ExpressionId,
        name: ast::Name,
        template_arguments: Option<Vec<ast::TemplateArgument>>,
        arguments: Vec<ast::ExpressionId>,
        range: Range,
    ) -> hir::ExpressionId {
        let receiver = self.infer_expression(db, document, scope, environment, body, receiver);
        let receiver_ty = self.state(document).hir.expression(receiver).ty;

        let arguments: Vec<_> = arguments
            .into_iter()
            .map(|argument| self.infer_expression(db, document, scope, environment, body, argument))
            .collect();

        let Some((implementation, function)) =
            self.lookup_method(db, document, receiver_ty, name)
        else {
            let error = self.alloc_type(document, TypeVariant::Error, range);
            self.poison_arguments(db, document, &arguments, error, range);
            return self.state(document).hir.alloc_expression(hir::Expression {
                kind: hir::ExpressionKind::Error,
                ty: error,
                range,
            });
        };

        // Commit: instantiate the impl header, tie the receiver to the
        // self type, then apply the function signature.
        self.resolve_function(db, document, function);
        let Some(signature) = self.functions[function.0 as usize].signature.clone() else {
            let error = self.alloc_type(document, TypeVariant::Error, range);
            return self.state(document).hir.alloc_expression(hir::Expression {
                kind: hir::ExpressionKind::Error,
                ty: error,
                range,
            });
        };
        let resolved_impl = self.implementations[implementation.0 as usize]
            .resolved
            .clone()
            .expect("impl header resolved during lookup");

        let (mut substitution, mut mutability_substitution) =
            self.fresh_substitution(document, &resolved_impl.template_parameters, range);

        // Function-level template parameters: explicit arguments win.
        let explicit: Vec<_> = template_arguments
            .iter()
            .flatten()
            .filter_map(|argument| match argument {
                ast::TemplateArgument::Type(ty) => {
                    Some(self.resolve_type(db, document, scope, environment, *ty))
                }
                ast::TemplateArgument::Mutability(_) => None,
            })
            .collect();
        let mut explicit = explicit.into_iter();
        for parameter in &signature.template_parameters {
            match parameter {
                ResolvedTemplateParameter::Type { tag, .. } => {
                    let ty = explicit.next().unwrap_or_else(|| {
                        self.fresh_type(document, TypeVariableKind::General, range)
                    });
                    substitution.insert(*tag, ty);
                }
                ResolvedTemplateParameter::Mutability { tag, .. } => {
                    let fresh = self.fresh_mutability(document, range);
                    mutability_substitution.insert(*tag, fresh);
                }
            }
        }

        let instantiate = |analysis: &mut Analysis, ty: TypeId| {
            let state = analysis.state(document);
            state.inference.instantiate_with(
                &mut state.hir,
                &substitution,
                &mutability_substitution,
                ty,
            )
        };

        let self_type = instantiate(self, resolved_impl.self_type);
        let receiver_range = self.state(document).hir.expression(receiver).range;
        self.unify(db, document, self_type, receiver_ty, receiver_range);

        // Unify the explicit arguments against the parameters after the
        // self parameter.
        let parameters: Vec<_> = signature
            .parameters
            .iter()
            .map(|parameter| instantiate(self, parameter.ty))
            .collect();
        let expected = parameters.len().saturating_sub(1);
        if arguments.len() != expected {
            db.emit(
                document,
                Diagnostic::error(
                    format!(
                        "wrong number of arguments: expected {expected}, found {}",
                        arguments.len()
                    ),
                    range,
                ),
            );
        } else {
            if let Some(&self_parameter) = parameters.first() {
                self.unify(db, document, self_parameter, receiver_ty, receiver_range);
            }
            for (&argument, &parameter) in arguments.iter().zip(parameters.iter().skip(1)) {
                let argument_ty = self.state(document).hir.expression(argument).ty;
                let argument_range = self.state(document).hir.expression(argument).range;
                self.unify(db, document, parameter, argument_ty, argument_range);
            }
        }
        let ty = instantiate(self, signature.return_type);

        let location = Location {
            document: self.functions[function.0 as usize].document,
            range: self.functions[function.0 as usize].name.range,
        };
        self.record_reference(
            db,
            document,
            name.range,
            Symbol::Function(function),
            location,
            SemanticTokenKind::Function,
        );

        // A resolved method call is an ordinary call whose callee is the
        // found function.
        let function_type = self.instantiated_function_type(document, function, range);
        let callee = self.state(document).hir.alloc_expression(hir::Expression {
            kind: hir::ExpressionKind::FunctionReference { function },
            ty: function_type,
            range: name.range,
        });
        let mut all_arguments = vec![receiver];
        all_arguments.extend(arguments);
        self.state(document).hir.alloc_expression(hir::Expression {
            kind: hir::ExpressionKind::Call { callee, arguments: all_arguments },
            ty,
            range,
        })
    }

    /// Linear search over this document's implementation blocks: every
    /// impl whose declared self type peek-unifies with the receiver is a
    /// candidate. Zero candidates and two-or-more are both errors.
    fn lookup_method(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        receiver: TypeId,
        name: ast::Name,
    ) -> Option<(ImplementationId, FunctionId)> {
        let mut found: Option<(ImplementationId, FunctionId)> = None;
        let mut ambiguous: Option<(FunctionId, FunctionId)> = None;

        for index in 0..self.implementations.len() {
            if self.implementations[index].document != document {
                continue;
            }
            let implementation = ImplementationId(index as u32);
            let Some(&function) = self.implementations[index]
                .functions
                .iter()
                .find(|&&function| self.functions[function.0 as usize].name.id == name.id)
            else {
                continue;
            };

            self.ensure_implementation_header(db, document, implementation);
            let Some(resolved) = self.implementations[index].resolved.clone() else {
                continue;
            };

            // Peek: try the self type without committing on the caller.
            // The snapshot precedes the fresh substitution so rollback
            // also retracts the probe's variables.
            let snapshot = self.state(document).inference.peek();
            let (substitution, mutability_substitution) =
                self.fresh_substitution(document, &resolved.template_parameters, name.range);
            let state = self.state(document);
            let candidate_self = state.inference.instantiate_with(
                &mut state.hir,
                &substitution,
                &mutability_substitution,
                resolved.self_type,
            );
            let matches = state.inference.unify(
                &mut state.hir,
                &db.interner,
                candidate_self,
                receiver,
                name.range,
            );
            state.inference.rollback(snapshot);

            if matches {
                match found {
                    None => found = Some((implementation, function)),
                    Some((_, first)) => {
                        ambiguous.get_or_insert((first, function));
                    }
                }
            }
        }

        let text = db.interner.lookup(name.id).to_owned();
        if let Some((first, second)) = ambiguous {
            let first_info = &self.functions[first.0 as usize];
            let first_location =
                Location { document: first_info.document, range: first_info.name.range };
            let second_info = &self.functions[second.0 as usize];
            let second_location =
                Location { document: second_info.document, range: second_info.name.range };
            db.emit(
                document,
                Diagnostic::error(format!("ambiguous method `{text}`"), name.range)
                    .with_related("could be referring to this", first_location)
                    .with_related("or this", second_location),
            );
            return None;
        }

        if found.is_none() {
            let receiver_string = self.type_string(db, document, receiver);
            db.emit(
                document,
                Diagnostic::error(
                    format!("no method `{text}` found for type {receiver_string}"),
                    name.range,
                ),
            );
        }
        found
    }

    // ── Field access and struct initializers ───────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn infer_field_access(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        receiver: ast::ExpressionId,
        name: ast::Name,
        range: Range,
    ) -> hir::ExpressionId {
        let receiver = self.infer_expression(db, document, scope, environment, body, receiver);
        let receiver_ty = self.state(document).hir.expression(receiver).ty;

        let state = self.state(document);
        let flattened = state.inference.flatten(&state.hir, receiver_ty);
        let variant = state.hir.ty(flattened).variant.clone();

        let (kind, ty) = match variant {
            TypeVariant::Enumeration { enumeration, template_arguments } => {
                match self.struct_field(db, document, enumeration, &template_arguments, name) {
                    Some((index, field_type)) => (
                        hir::ExpressionKind::FieldAccess { receiver, field: index },
                        field_type,
                    ),
                    None => {
                        let error = self.alloc_type(document, TypeVariant::Error, range);
                        (hir::ExpressionKind::Error, error)
                    }
                }
            }
            TypeVariant::Error => {
                let error = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Error, error)
            }
            TypeVariant::Variable(_) => {
                db.emit(
                    document,
                    Diagnostic::error(
                        "type annotation required to access a field of this expression",
                        range,
                    ),
                );
                let error = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Error, error)
            }
            _ => {
                let found = self.type_string(db, document, receiver_ty);
                let text = db.interner.lookup(name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(
                        format!("no field `{text}` on type {found}"),
                        name.range,
                    ),
                );
                let error = self.alloc_type(document, TypeVariant::Error, range);
                (hir::ExpressionKind::Error, error)
            }
        };

        self.state(document)
            .hir
            .alloc_expression(hir::Expression { kind, ty, range })
    }

    /// Look up a named field on a struct-like enumeration (exactly one
    /// struct-bodied constructor), substituting the receiver's template
    /// arguments into the field's type.
    fn struct_field(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        enumeration: EnumerationId,
        template_arguments: &[TypeId],
        name: ast::Name,
    ) -> Option<(usize, TypeId)> {
        self.ensure_enumeration(db, document, enumeration);
        let resolved = self.enumerations[enumeration.0 as usize].resolved.clone()?;
        let enum_name = self.enumerations[enumeration.0 as usize].name;
        let source = self.enumerations[enumeration.0 as usize].document;

        let [constructor] = resolved.constructors.as_slice() else {
            let text = db.interner.lookup(enum_name.id).to_owned();
            db.emit(
                document,
                Diagnostic::error(
                    format!("`{text}` is not a struct; fields cannot be accessed on it"),
                    name.range,
                ),
            );
            return None;
        };
        let ResolvedConstructorBody::Struct(fields) = &constructor.body else {
            let text = db.interner.lookup(enum_name.id).to_owned();
            db.emit(
                document,
                Diagnostic::error(
                    format!("`{text}` has no named fields"),
                    name.range,
                ),
            );
            return None;
        };

        let Some(index) = fields.iter().position(|&(field, _)| field == name.id) else {
            let text = db.interner.lookup(name.id).to_owned();
            let enum_text = db.interner.lookup(enum_name.id).to_owned();
            db.emit(
                document,
                Diagnostic::error(
                    format!("no field `{text}` on `{enum_text}`"),
                    name.range,
                ),
            );
            return None;
        };
        let field_type = fields[index].1;
        let field_type = if source == document {
            field_type
        } else {
            self.import_type(source, document, field_type)
        };

        let mut substitution = FxHashMap::default();
        let mut arguments = template_arguments.iter().copied();
        for parameter in &resolved.template_parameters {
            if let ResolvedTemplateParameter::Type { tag, .. } = parameter {
                if let Some(argument) = arguments.next() {
                    substitution.insert(*tag, argument);
                }
            }
        }
        let state = self.state(document);
        let instantiated = state.inference.instantiate(&mut state.hir, &substitution, field_type);
        Some((index, instantiated))
    }

    #[allow(clippy::too_many_arguments)]
    fn infer_struct_initializer(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        path: &ast::Path,
        fields: Vec<(ast::Name, ast::ExpressionId)>,
        range: Range,
    ) -> hir::ExpressionId {
        let ty = self.resolve_type_path(db, document, scope, environment, path, range);
        let state = self.state(document);
        let flattened = state.inference.flatten(&state.hir, ty);
        let TypeVariant::Enumeration { enumeration, template_arguments } =
            state.hir.ty(flattened).variant.clone()
        else {
            if !matches!(state.hir.ty(flattened).variant, TypeVariant::Error) {
                db.emit(
                    document,
                    Diagnostic::error("struct initializers require a struct type", range),
                );
            }
            let error = self.alloc_type(document, TypeVariant::Error, range);
            return self.state(document).hir.alloc_expression(hir::Expression {
                kind: hir::ExpressionKind::Error,
                ty: error,
                range,
            });
        };

        // Infer every field value first so diagnostics stay in source
        // order, then match them against the declaration.
        let mut values = Vec::new();
        for (name, value) in fields {
            let value = self.infer_expression(db, document, scope, environment, body, value);
            values.push((name, value));
        }

        let Some(resolved) = self.enumerations[enumeration.0 as usize].resolved.clone() else {
            let error = self.alloc_type(document, TypeVariant::Error, range);
            return self.state(document).hir.alloc_expression(hir::Expression {
                kind: hir::ExpressionKind::Error,
                ty: error,
                range,
            });
        };
        let enum_name = self.enumerations[enumeration.0 as usize].name;
        let declared = match resolved.constructors.as_slice() {
            [ResolvedConstructor { body: ResolvedConstructorBody::Struct(fields), .. }] => {
                fields.clone()
            }
            _ => {
                let text = db.interner.lookup(enum_name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(format!("`{text}` is not a struct"), range),
                );
                let error = self.alloc_type(document, TypeVariant::Error, range);
                return self.state(document).hir.alloc_expression(hir::Expression {
                    kind: hir::ExpressionKind::Error,
                    ty: error,
                    range,
                });
            }
        };

        let mut substitution = FxHashMap::default();
        let mut arguments = template_arguments.iter().copied();
        for parameter in &resolved.template_parameters {
            if let ResolvedTemplateParameter::Type { tag, .. } = parameter {
                if let Some(argument) = arguments.next() {
                    substitution.insert(*tag, argument);
                }
            }
        }

        let mut ordered = vec![None; declared.len()];
        for (name, value) in values {
            match declared.iter().position(|&(field, _)| field == name.id) {
                Some(index) => {
                    let field_type = declared[index].1;
                    let state = self.state(document);
                    let expected =
                        state.inference.instantiate(&mut state.hir, &substitution, field_type);
                    let value_ty = self.state(document).hir.expression(value).ty;
                    self.unify(db, document, expected, value_ty, name.range);
                    if ordered[index].replace(value).is_some() {
                        let text = db.interner.lookup(name.id).to_owned();
                        db.emit(
                            document,
                            Diagnostic::error(
                                format!("field `{text}` is initialized twice"),
                                name.range,
                            ),
                        );
                    }
                }
                None => {
                    let text = db.interner.lookup(name.id).to_owned();
                    let enum_text = db.interner.lookup(enum_name.id).to_owned();
                    db.emit(
                        document,
                        Diagnostic::error(
                            format!("no field `{text}` on `{enum_text}`"),
                            name.range,
                        ),
                    );
                }
            }
        }

        let mut complete = Vec::new();
        for (index, slot) in ordered.into_iter().enumerate() {
            match slot {
                Some(value) => complete.push(value),
                None => {
                    let text = db.interner.lookup(declared[index].0).to_owned();
                    db.emit(
                        document,
                        Diagnostic::error(format!("missing field `{text}`"), range),
                    );
                }
            }
        }

        self.state(document).hir.alloc_expression(hir::Expression {
            kind: hir::ExpressionKind::StructInitializer { enumeration, fields: complete },
            ty,
            range,
        })
    }

    // ── Operators ──────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn infer_binary_operator(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        operator: ast::Name,
        left: ast::ExpressionId,
        right: ast::ExpressionId,
        range: Range,
    ) -> hir::ExpressionId {
        let left = self.infer_expression(db, document, scope, environment, body, left);
        let right = self.infer_expression(db, document, scope, environment, body, right);
        let left_ty = self.state(document).hir.expression(left).ty;
        let right_ty = self.state(document).hir.expression(right).ty;

        let operator_text = db.interner.lookup(operator.id).to_owned();
        let ty = match operator_text.as_str() {
            "+" | "-" | "*" | "/" | "%" => {
                self.unify(db, document, left_ty, right_ty, range);
                left_ty
            }
            "<" | "<=" | ">=" | ">" | "?=" | "!=" => {
                self.unify(db, document, left_ty, right_ty, range);
                self.alloc_type(document, TypeVariant::Boolean, range)
            }
            "&&" | "||" => {
                let boolean = self.alloc_type(document, TypeVariant::Boolean, range);
                self.unify(db, document, boolean, left_ty, range);
                self.unify(db, document, boolean, right_ty, range);
                boolean
            }
            ":=" | "+=" | "-=" | "*=" | "/=" | "%=" => {
                self.unify(db, document, left_ty, right_ty, range);
                self.alloc_type(document, TypeVariant::Tuple(Vec::new()), range)
            }
            _ => {
                db.emit(
                    document,
                    Diagnostic::error(
                        format!("unknown operator `{operator_text}`"),
                        operator.range,
                    ),
                );
                self.alloc_type(document, TypeVariant::Error, range)
            }
        };

        // An operator application is a call in the HIR; the built-in
        // operators have no definition to point at, so the callee slot
        // is an anonymous function-typed node.
        let operator_type = self.alloc_type(
            document,
            TypeVariant::Function { parameters: vec![left_ty, right_ty], ret: ty },
            operator.range,
        );
        let callee = self.state(document).hir.alloc_expression(hir::Expression {
            kind: hir::ExpressionKind::Error,
            ty: operator_type,
            range: operator.range,
        });
        self.state(document).hir.alloc_expression(hir::Expression {
            kind: hir::ExpressionKind::Call { callee, arguments: vec![left, right] },
            ty,
            range,
        })
    }

    // ── Patterns ───────────────────────────────────────────────────────

    /// Infer a pattern: it assigns a type to itself by structure, and
    /// binding patterns introduce variables into the enclosing scope.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn infer_pattern(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        expected: Option<TypeId>,
        id: ast::PatternId,
    ) -> hir::PatternId {
        let node = self.state(document).ast.pattern(id).clone();
        let range = node.range;

        let (kind, ty) = match node.kind {
            ast::PatternKind::Wildcard => {
                let ty = self.fresh_type(document, TypeVariableKind::General, range);
                (hir::PatternKind::Wildcard, ty)
            }

            ast::PatternKind::Name { name, mutability } => {
                let mutability = self.resolve_mutability(db, document, scope, &mutability);
                let ty = self.fresh_type(document, TypeVariableKind::General, range);
                let tag = self.state(document).inference.fresh_variable_tag();
                scope.bind_variable(
                    &db.interner,
                    VariableBind {
                        name: name.id,
                        range: name.range,
                        ty,
                        mutability,
                        tag,
                        used: false,
                    },
                );
                (hir::PatternKind::Binding { name: name.id, tag, mutability }, ty)
            }

            ast::PatternKind::IntegerLiteral(value) => {
                let ty = self.fresh_type(document, TypeVariableKind::Integral, range);
                (hir::PatternKind::IntegerLiteral(value), ty)
            }
            ast::PatternKind::FloatingLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::Floating, range);
                (hir::PatternKind::FloatingLiteral(value), ty)
            }
            ast::PatternKind::BooleanLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::Boolean, range);
                (hir::PatternKind::BooleanLiteral(value), ty)
            }
            ast::PatternKind::StringLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::String, range);
                (hir::PatternKind::StringLiteral(value), ty)
            }
            ast::PatternKind::CharacterLiteral(value) => {
                let ty = self.alloc_type(document, TypeVariant::Character, range);
                (hir::PatternKind::CharacterLiteral(value), ty)
            }

            ast::PatternKind::Tuple(elements) => {
                let elements: Vec<_> = elements
                    .into_iter()
                    .map(|element| {
                        self.infer_pattern(db, document, scope, environment, body, None, element)
                    })
                    .collect();
                let types = elements
                    .iter()
                    .map(|&element| self.state(document).hir.pattern(element).ty)
                    .collect();
                let ty = self.alloc_type(document, TypeVariant::Tuple(types), range);
                (hir::PatternKind::Tuple(elements), ty)
            }

            ast::PatternKind::Constructor { path, arguments } => {
                return self.infer_constructor_pattern(
                    db, document, scope, environment, body, expected, path, arguments, range,
                );
            }

            ast::PatternKind::Slice(elements) => {
                let element_type = self.fresh_type(document, TypeVariableKind::General, range);
                let elements: Vec<_> = elements
                    .into_iter()
                    .map(|element| {
                        let element = self.infer_pattern(
                            db, document, scope, environment, body, None, element,
                        );
                        let ty = self.state(document).hir.pattern(element).ty;
                        let element_range = self.state(document).hir.pattern(element).range;
                        self.unify(db, document, element_type, ty, element_range);
                        element
                    })
                    .collect();
                let ty =
                    self.alloc_type(document, TypeVariant::Slice { element: element_type }, range);
                (hir::PatternKind::Slice(elements), ty)
            }

            ast::PatternKind::Alias { pattern, name, mutability } => {
                let pattern = self.infer_pattern(
                    db, document, scope, environment, body, expected, pattern,
                );
                let ty = self.state(document).hir.pattern(pattern).ty;
                let mutability = self.resolve_mutability(db, document, scope, &mutability);
                let tag = self.state(document).inference.fresh_variable_tag();
                scope.bind_variable(
                    &db.interner,
                    VariableBind {
                        name: name.id,
                        range: name.range,
                        ty,
                        mutability,
                        tag,
                        used: false,
                    },
                );
                (hir::PatternKind::Alias { pattern, name: name.id, tag, mutability }, ty)
            }

            ast::PatternKind::Guarded { pattern, guard } => {
                let pattern = self.infer_pattern(
                    db, document, scope, environment, body, expected, pattern,
                );
                let ty = self.state(document).hir.pattern(pattern).ty;
                let guard = self.infer_expression(db, document, scope, environment, body, guard);
                let guard_ty = self.state(document).hir.expression(guard).ty;
                let guard_range = self.state(document).hir.expression(guard).range;
                let boolean = self.alloc_type(document, TypeVariant::Boolean, guard_range);
                self.unify(db, document, boolean, guard_ty, guard_range);
                (hir::PatternKind::Guarded { pattern, guard }, ty)
            }
        };

        self.state(document)
            .hir
            .alloc_pattern(hir::Pattern { kind, ty, range })
    }

    #[allow(clippy::too_many_arguments)]
    fn infer_constructor_pattern(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        body: &mut BodyContext,
        expected: Option<TypeId>,
        path: ast::ConstructorPath,
        arguments: Vec<ast::PatternId>,
        range: Range,
    ) -> hir::PatternId {
        let target = match path {
            ast::ConstructorPath::Full(path) => {
                self.resolve_value_path(db, document, scope, environment, &path)
            }
            // `::ctor` re-scopes into the expected type's enumeration.
            ast::ConstructorPath::Abbreviated(name) => {
                let resolved = expected.and_then(|expected| {
                    let state = self.state(document);
                    let flattened = state.inference.flatten(&state.hir, expected);
                    match state.hir.ty(flattened).variant.clone() {
                        TypeVariant::Enumeration { enumeration, .. } => Some(enumeration),
                        _ => None,
                    }
                });
                match resolved {
                    Some(enumeration) => {
                        let env = self.enumerations[enumeration.0 as usize].environment;
                        match self.environments[env.0 as usize].lower.get(&name.id).copied() {
                            Some(LowerInfo {
                                variant: LowerVariant::Constructor { enumeration, index },
                                ..
                            }) => ValueTarget::Constructor {
                                enumeration,
                                index,
                                template_arguments: None,
                            },
                            _ => {
                                let text = db.interner.lookup(name.id).to_owned();
                                db.emit(
                                    document,
                                    Diagnostic::error(
                                        format!("no constructor `{text}` on the matched type"),
                                        name.range,
                                    ),
                                );
                                ValueTarget::Error
                            }
                        }
                    }
                    None => {
                        db.emit(
                            document,
                            Diagnostic::error(
                                "cannot infer the enumeration of this abbreviated constructor",
                                name.range,
                            ),
                        );
                        ValueTarget::Error
                    }
                }
            }
        };

        let ValueTarget::Constructor { enumeration, index, template_arguments } = target else {
            if !matches!(target, ValueTarget::Error) {
                db.emit(
                    document,
                    Diagnostic::error("pattern paths must name an enumeration constructor", range),
                );
            }
            let error = self.alloc_type(document, TypeVariant::Error, range);
            return self
                .state(document)
                .hir
                .alloc_pattern(hir::Pattern { kind: hir::PatternKind::Error, ty: error, range });
        };

        // Instantiate the constructor, then unify sub-patterns against
        // its field types.
        let constructor_type =
            self.constructor_type(db, document, enumeration, index, template_arguments, range);
        let state = self.state(document);
        let flattened = state.inference.flatten(&state.hir, constructor_type);
        let (field_types, self_type) = match state.hir.ty(flattened).variant.clone() {
            TypeVariant::Function { parameters, ret } => (parameters, ret),
            _ => (Vec::new(), constructor_type),
        };

        if arguments.len() != field_types.len() {
            db.emit(
                document,
                Diagnostic::error(
                    format!(
                        "wrong number of constructor arguments: expected {}, found {}",
                        field_types.len(),
                        arguments.len()
                    ),
                    range,
                ),
            );
        }

        let arguments: Vec<_> = arguments
            .into_iter()
            .enumerate()
            .map(|(position, argument)| {
                let expected_field = field_types.get(position).copied();
                let argument = self.infer_pattern(
                    db, document, scope, environment, body, expected_field, argument,
                );
                if let Some(expected_field) = expected_field {
                    let ty = self.state(document).hir.pattern(argument).ty;
                    let argument_range = self.state(document).hir.pattern(argument).range;
                    self.unify(db, document, expected_field, ty, argument_range);
                }
                argument
            })
            .collect();

        self.state(document).hir.alloc_pattern(hir::Pattern {
            kind: hir::PatternKind::Constructor { enumeration, constructor: index, arguments },
            ty: self_type,
            range,
        })
    }

    // ── Helpers ────────────────────────────────────────────────────────

    pub(crate) fn type_string(
        &mut self,
        db: &Database,
        document: DocumentId,
        ty: TypeId,
    ) -> String {
        let state = self.state(document);
        state.inference.type_string(&state.hir, &db.interner, ty)
    }
}
