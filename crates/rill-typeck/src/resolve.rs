//! The resolve phase: definitions, types, mutabilities, and paths.
//!
//! Resolution is on-demand: referencing a function forces its signature
//! (and, transitively, its body) to resolve; re-entering a definition
//! that is already resolving reports a cycle and yields the error type.

use rill_common::db::{Database, DocumentId, SemanticTokenKind};
use rill_common::diagnostic::Diagnostic;
use rill_common::intern::StringId;
use rill_common::span::{Location, Range};
use rill_desugar::ast;
use rustc_hash::FxHashMap;

use crate::hir::{
    IntegerType, LocalMutabilityTag, LocalTypeTag, MutabilityId, MutabilityVariant, TypeId,
    TypeVariant,
};
use crate::scope::{MutabilityBind, Scope, TypeBind};
use crate::symbol::{
    AliasId, ConceptId, DefinitionVariant, EnumerationId, EnvironmentId, FunctionId, LowerInfo,
    LowerVariant, ResolvedConstructor, ResolvedConstructorBody, ResolvedEnumeration,
    ResolvedImplementation, ResolvedParameter, ResolvedSignature, ResolvedTemplateParameter,
    Symbol, UpperInfo, UpperVariant,
};
use crate::unify::TypeVariableKind;
use crate::Analysis;

/// What a value-namespace path resolved to.
#[derive(Debug, Clone)]
pub(crate) enum ValueTarget {
    Local {
        tag: crate::hir::LocalVariableTag,
        name: StringId,
        ty: TypeId,
    },
    Function(FunctionId),
    Constructor {
        enumeration: EnumerationId,
        index: usize,
        template_arguments: Option<Vec<TypeId>>,
    },
    Error,
}

impl Analysis {
    // ── Document-level driving ─────────────────────────────────────────

    /// Resolve every definition collected into a document, in collection
    /// order.
    pub fn resolve_document(&mut self, db: &mut Database, document: DocumentId) {
        self.resolving_documents.push(document);
        let root = self.state(document).root_environment;
        self.resolve_environment_definitions(db, document, root);
        self.resolving_documents.pop();

        let diagnostics = std::mem::take(&mut self.state(document).inference.diagnostics);
        db.document_mut(document).diagnostics.extend(diagnostics);
    }

    fn resolve_environment_definitions(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        environment: EnvironmentId,
    ) {
        let definitions = self.environments[environment.0 as usize].in_order.clone();
        for definition in definitions {
            match definition {
                DefinitionVariant::Function(id) => self.resolve_function(db, document, id),
                DefinitionVariant::Enumeration(id) => {
                    self.ensure_enumeration(db, document, id);
                }
                DefinitionVariant::Concept(id) => self.resolve_concept(db, document, id),
                DefinitionVariant::Alias(id) => {
                    self.ensure_alias(db, document, id);
                }
                DefinitionVariant::Module(id) => {
                    let module_env = self.modules[id.0 as usize].environment;
                    if self.modules[id.0 as usize].document == document {
                        self.resolve_environment_definitions(db, document, module_env);
                    }
                }
                DefinitionVariant::Implementation(id) => {
                    self.resolve_implementation(db, document, id);
                }
            }
        }
    }

    // ── Functions ──────────────────────────────────────────────────────

    /// Resolve a function's signature and body. Safe to call repeatedly;
    /// a recursive reference mid-resolution sees the cached signature.
    pub fn resolve_function(&mut self, db: &mut Database, _caller: DocumentId, id: FunctionId) {
        // Diagnostics and state belong to the defining document, not the
        // document that triggered resolution.
        let document = self.functions[id.0 as usize].document;

        if self.functions[id.0 as usize].body.is_some() {
            return;
        }
        if self.functions[id.0 as usize].currently_resolving {
            if self.functions[id.0 as usize].signature.is_none() {
                let name = self.functions[id.0 as usize].name;
                let text = db.interner.lookup(name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(format!("cyclic definition of `{text}`"), name.range),
                );
                let error_signature = self.error_signature(document, name.range);
                self.functions[id.0 as usize].signature = Some(error_signature);
            }
            return;
        }
        self.functions[id.0 as usize].currently_resolving = true;

        let function = self.functions[id.0 as usize].ast.clone();
        let environment = self.functions[id.0 as usize].environment;
        let implementation = self.functions[id.0 as usize].implementation;

        let variables_before = self.state(document).inference.type_variable_count();
        let mut scope = Scope::new();

        // Methods see their impl block's template parameters and self
        // type; the impl header owns the tags.
        let self_type = implementation.and_then(|impl_id| {
            self.ensure_implementation_header(db, document, impl_id);
            let resolved = self.implementations[impl_id.0 as usize].resolved.clone()?;
            self.bind_resolved_template_parameters(db, &mut scope, &resolved.template_parameters, true);
            Some(resolved.self_type)
        });

        let template_parameters =
            self.resolve_template_parameters(db, document, &mut scope, environment, &function.template_parameters);

        let self_name = db.interner.intern("self");
        let mut parameters = Vec::new();
        for parameter in &function.parameters {
            let is_self = parameter.name.id == self_name;
            let ty = match parameter.annotation {
                Some(annotation) => {
                    self.resolve_type(db, document, &mut scope, environment, annotation)
                }
                None => match (is_self, self_type) {
                    (true, Some(self_type)) => self_type,
                    _ => self.fresh_type(document, TypeVariableKind::General, parameter.name.range),
                },
            };
            if let Some(default) = parameter.default {
                let mut body_ctx = crate::infer::BodyContext::detached(document, self);
                let default_expression =
                    self.infer_expression(db, document, &mut scope, environment, &mut body_ctx, default);
                let default_type = self.state(document).hir.expression(default_expression).ty;
                self.unify(db, document, ty, default_type, parameter.name.range);
            }
            let state = self.state(document);
            let tag = state.inference.fresh_variable_tag();
            let mutability = state.hir.alloc_mutability(
                MutabilityVariant::Constant { is_mutable: parameter.is_mutable },
                parameter.name.range,
            );
            scope.bind_variable(
                &db.interner,
                crate::scope::VariableBind {
                    name: parameter.name.id,
                    range: parameter.name.range,
                    ty,
                    mutability,
                    tag,
                    // `self` is implicitly used by method dispatch.
                    used: is_self,
                },
            );
            parameters.push(ResolvedParameter {
                name: parameter.name,
                tag,
                mutability,
                ty,
                has_default: parameter.default.is_some(),
            });
        }

        let return_type = match function.return_type {
            Some(annotation) => self.resolve_type(db, document, &mut scope, environment, annotation),
            None => self.fresh_type(document, TypeVariableKind::General, function.name.range),
        };
        let parameter_types: Vec<_> = parameters.iter().map(|parameter| parameter.ty).collect();
        let function_type = self.alloc_type(
            document,
            TypeVariant::Function { parameters: parameter_types, ret: return_type },
            function.name.range,
        );

        // Cache the signature before touching the body so recursive
        // references resolve against it.
        self.functions[id.0 as usize].signature = Some(ResolvedSignature {
            template_parameters,
            parameters,
            return_type,
            function_type,
        });

        let mut body_ctx = crate::infer::BodyContext::new(return_type);
        let body =
            self.infer_expression(db, document, &mut scope, environment, &mut body_ctx, function.body);
        let body_type = self.state(document).hir.expression(body).ty;
        let body_range = self.state(document).hir.expression(body).range;
        self.unify(db, document, return_type, body_type, body_range);
        self.functions[id.0 as usize].body = Some(body);

        // End of inference: every variable born during this definition
        // must have solved.
        self.report_unsolved_variables(db, document, variables_before);

        let mut warnings = Vec::new();
        scope.pop_frame(&db.interner, &mut warnings);
        db.document_mut(document).diagnostics.extend(warnings);

        self.functions[id.0 as usize].currently_resolving = false;
    }

    /// After a definition finishes, any variable created for it that is
    /// still unsolved needs an annotation. One report per equivalence
    /// class.
    fn report_unsolved_variables(&mut self, db: &mut Database, document: DocumentId, from: u32) {
        let state = self.state(document);
        let until = state.inference.type_variable_count();
        for index in from..until {
            let variable = crate::hir::TypeVariableId(index);
            if !state.inference.is_unsolved(variable) {
                continue;
            }
            let root = state.inference.root(variable);
            if !state.inference.mark_reported(root) {
                continue;
            }
            let range = state.inference.type_variable_origin(variable);
            db.emit(
                document,
                Diagnostic::error("type annotation required", range),
            );
        }
    }

    fn error_signature(&mut self, document: DocumentId, range: Range) -> ResolvedSignature {
        let error = self.alloc_type(document, TypeVariant::Error, range);
        ResolvedSignature {
            template_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: error,
            function_type: error,
        }
    }

    // ── Enumerations ───────────────────────────────────────────────────

    /// Resolve an enumeration's constructors and self type.
    pub(crate) fn ensure_enumeration(
        &mut self,
        db: &mut Database,
        _current: DocumentId,
        id: EnumerationId,
    ) {
        if self.enumerations[id.0 as usize].resolved.is_some() {
            return;
        }
        let document = self.enumerations[id.0 as usize].document;
        if self.enumerations[id.0 as usize].currently_resolving {
            let name = self.enumerations[id.0 as usize].name;
            let text = db.interner.lookup(name.id).to_owned();
            db.emit(
                document,
                Diagnostic::error(format!("cyclic definition of `{text}`"), name.range),
            );
            return;
        }
        self.enumerations[id.0 as usize].currently_resolving = true;

        let enumeration = self.enumerations[id.0 as usize].ast.clone();
        let environment = self.enumerations[id.0 as usize].parent_environment;
        let name = self.enumerations[id.0 as usize].name;

        let mut scope = Scope::new();
        let template_parameters = self.resolve_template_parameters(
            db,
            document,
            &mut scope,
            environment,
            &enumeration.template_parameters,
        );
        let template_argument_types: Vec<_> = template_parameters
            .iter()
            .filter_map(|parameter| match parameter {
                ResolvedTemplateParameter::Type { ty, .. } => Some(*ty),
                ResolvedTemplateParameter::Mutability { .. } => None,
            })
            .collect();
        let self_type = self.alloc_type(
            document,
            TypeVariant::Enumeration { enumeration: id, template_arguments: template_argument_types },
            name.range,
        );
        self.state(document)
            .inference
            .register_enumeration_name(id, name.id);

        let mut constructors = Vec::new();
        for constructor in &enumeration.constructors {
            let body = match &constructor.body {
                ast::ConstructorBody::Unit => ResolvedConstructorBody::Unit,
                ast::ConstructorBody::Tuple(types) => ResolvedConstructorBody::Tuple(
                    types
                        .iter()
                        .map(|&ty| self.resolve_type(db, document, &mut scope, environment, ty))
                        .collect(),
                ),
                ast::ConstructorBody::Struct(fields) => ResolvedConstructorBody::Struct(
                    fields
                        .iter()
                        .map(|&(field_name, ty)| {
                            let ty = self.resolve_type(db, document, &mut scope, environment, ty);
                            (field_name.id, ty)
                        })
                        .collect(),
                ),
            };
            constructors.push(ResolvedConstructor { name: constructor.name, body });
        }

        self.enumerations[id.0 as usize].resolved = Some(ResolvedEnumeration {
            template_parameters,
            constructors,
            self_type,
        });
        self.enumerations[id.0 as usize].currently_resolving = false;

        let mut warnings = Vec::new();
        scope.pop_frame(&db.interner, &mut warnings);
        db.document_mut(document).diagnostics.extend(warnings);
    }

    // ── Aliases ────────────────────────────────────────────────────────

    /// Resolve an alias's target type. A cycle reports once and poisons
    /// the alias with the error type.
    pub(crate) fn ensure_alias(&mut self, db: &mut Database, _current: DocumentId, id: AliasId) {
        if self.aliases[id.0 as usize].aliased.is_some() {
            return;
        }
        let document = self.aliases[id.0 as usize].document;
        let name = self.aliases[id.0 as usize].name;
        if self.aliases[id.0 as usize].currently_resolving {
            let text = db.interner.lookup(name.id).to_owned();
            db.emit(
                document,
                Diagnostic::error(format!("cyclic type alias `{text}`"), name.range),
            );
            let error = self.alloc_type(document, TypeVariant::Error, name.range);
            self.aliases[id.0 as usize].aliased = Some(error);
            return;
        }
        self.aliases[id.0 as usize].currently_resolving = true;

        let alias = self.aliases[id.0 as usize].ast.clone();
        let environment = self.aliases[id.0 as usize].environment;
        let mut scope = Scope::new();
        let template_parameters = self.resolve_template_parameters(
            db,
            document,
            &mut scope,
            environment,
            &alias.template_parameters,
        );
        let aliased = self.resolve_type(db, document, &mut scope, environment, alias.aliased);

        // The cycle path may have poisoned the alias already.
        if self.aliases[id.0 as usize].aliased.is_none() {
            self.aliases[id.0 as usize].aliased = Some(aliased);
            self.aliases[id.0 as usize].template_parameters = Some(template_parameters);
        }
        self.aliases[id.0 as usize].currently_resolving = false;

        let mut warnings = Vec::new();
        scope.pop_frame(&db.interner, &mut warnings);
        db.document_mut(document).diagnostics.extend(warnings);
    }

    // ── Concepts ───────────────────────────────────────────────────────

    pub(crate) fn resolve_concept(&mut self, db: &mut Database, document: DocumentId, id: ConceptId) {
        if self.concepts[id.0 as usize].resolved || self.concepts[id.0 as usize].currently_resolving
        {
            return;
        }
        self.concepts[id.0 as usize].currently_resolving = true;
        let concept = self.concepts[id.0 as usize].ast.clone();
        let environment = self.concepts[id.0 as usize].environment;

        let mut scope = Scope::new();
        self.resolve_template_parameters(db, document, &mut scope, environment, &concept.template_parameters);
        for signature in &concept.signatures {
            scope.push_frame();
            self.resolve_template_parameters(db, document, &mut scope, environment, &signature.template_parameters);
            for parameter in &signature.parameters {
                if let Some(annotation) = parameter.annotation {
                    self.resolve_type(db, document, &mut scope, environment, annotation);
                }
            }
            if let Some(return_type) = signature.return_type {
                self.resolve_type(db, document, &mut scope, environment, return_type);
            }
            let mut warnings = Vec::new();
            scope.pop_frame(&db.interner, &mut warnings);
            db.document_mut(document).diagnostics.extend(warnings);
        }

        self.concepts[id.0 as usize].resolved = true;
        self.concepts[id.0 as usize].currently_resolving = false;
    }

    // ── Implementations ────────────────────────────────────────────────

    /// Resolve an impl block's header (template parameters + self type)
    /// if it has not resolved yet.
    pub(crate) fn ensure_implementation_header(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        id: crate::symbol::ImplementationId,
    ) {
        if self.implementations[id.0 as usize].resolved.is_some()
            || self.implementations[id.0 as usize].currently_resolving
        {
            return;
        }
        self.implementations[id.0 as usize].currently_resolving = true;
        let environment = self.implementations[id.0 as usize].environment;
        let template_parameters = self.implementations[id.0 as usize].template_parameters.clone();
        let self_type_ast = self.implementations[id.0 as usize].self_type_ast;

        let mut scope = Scope::new();
        let template_parameters =
            self.resolve_template_parameters(db, document, &mut scope, environment, &template_parameters);
        let self_type = self.resolve_type(db, document, &mut scope, environment, self_type_ast);

        self.implementations[id.0 as usize].resolved =
            Some(ResolvedImplementation { template_parameters, self_type });
        self.implementations[id.0 as usize].currently_resolving = false;
    }

    pub(crate) fn resolve_implementation(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        id: crate::symbol::ImplementationId,
    ) {
        self.ensure_implementation_header(db, document, id);
        let functions = self.implementations[id.0 as usize].functions.clone();
        for function in functions {
            self.resolve_function(db, document, function);
        }
    }

    // ── Template parameters ────────────────────────────────────────────

    pub(crate) fn resolve_template_parameters(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        parameters: &[ast::TemplateParameter],
    ) -> Vec<ResolvedTemplateParameter> {
        parameters
            .iter()
            .map(|parameter| match &parameter.kind {
                ast::TemplateParameterKind::Type { bounds } => {
                    let bounds = bounds
                        .iter()
                        .filter_map(|bound| {
                            self.resolve_concept_bound(db, document, environment, bound)
                        })
                        .collect();
                    let state = self.state(document);
                    let tag = state.inference.fresh_type_tag();
                    let ty = state.hir.alloc_type(
                        TypeVariant::TemplateParameter { tag, name: parameter.name.id },
                        parameter.name.range,
                    );
                    scope.bind_type(
                        &db.interner,
                        TypeBind {
                            name: parameter.name.id,
                            range: parameter.name.range,
                            ty,
                            tag,
                            used: false,
                        },
                    );
                    ResolvedTemplateParameter::Type { name: parameter.name, tag, ty, bounds }
                }
                ast::TemplateParameterKind::Mutability => {
                    let state = self.state(document);
                    let tag = state.inference.fresh_mutability_tag();
                    let mutability = state.hir.alloc_mutability(
                        MutabilityVariant::Parameterized { tag, name: parameter.name.id },
                        parameter.name.range,
                    );
                    scope.bind_mutability(
                        &db.interner,
                        MutabilityBind {
                            name: parameter.name.id,
                            range: parameter.name.range,
                            mutability,
                            tag,
                            used: false,
                        },
                    );
                    ResolvedTemplateParameter::Mutability { name: parameter.name, tag, mutability }
                }
            })
            .collect()
    }

    /// Bind already-resolved template parameters (an impl header's) into
    /// a scope, keeping their original tags.
    pub(crate) fn bind_resolved_template_parameters(
        &mut self,
        db: &Database,
        scope: &mut Scope,
        parameters: &[ResolvedTemplateParameter],
        pre_used: bool,
    ) {
        for parameter in parameters {
            match parameter {
                ResolvedTemplateParameter::Type { name, tag, ty, .. } => scope.bind_type(
                    &db.interner,
                    TypeBind {
                        name: name.id,
                        range: name.range,
                        ty: *ty,
                        tag: *tag,
                        used: pre_used,
                    },
                ),
                ResolvedTemplateParameter::Mutability { name, tag, mutability } => scope
                    .bind_mutability(
                        &db.interner,
                        MutabilityBind {
                            name: name.id,
                            range: name.range,
                            mutability: *mutability,
                            tag: *tag,
                            used: pre_used,
                        },
                    ),
            }
        }
    }

    fn resolve_concept_bound(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        environment: EnvironmentId,
        bound: &ast::Path,
    ) -> Option<ConceptId> {
        let last = bound.segments.last()?;
        match self.lookup_upper(environment, last.name.id) {
            Some(UpperInfo { variant: UpperVariant::Concept(id), name }) => {
                self.record_reference(
                    db,
                    document,
                    last.name.range,
                    Symbol::Concept(id),
                    Location { document: self.concepts[id.0 as usize].document, range: name.range },
                    SemanticTokenKind::Type,
                );
                Some(id)
            }
            _ => {
                let text = db.interner.lookup(last.name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(format!("`{text}` is not a concept"), last.name.range),
                );
                None
            }
        }
    }

    // ── Types ──────────────────────────────────────────────────────────

    pub(crate) fn resolve_type(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        id: ast::TypeId,
    ) -> TypeId {
        let node = self.state(document).ast.ty(id).clone();
        let range = node.range;
        match node.kind {
            ast::TypeKind::Error => self.alloc_type(document, TypeVariant::Error, range),
            ast::TypeKind::Wildcard => {
                self.fresh_type(document, TypeVariableKind::General, range)
            }
            ast::TypeKind::Tuple(elements) => {
                let elements = elements
                    .into_iter()
                    .map(|element| self.resolve_type(db, document, scope, environment, element))
                    .collect();
                self.alloc_type(document, TypeVariant::Tuple(elements), range)
            }
            ast::TypeKind::Slice { element } => {
                let element = self.resolve_type(db, document, scope, environment, element);
                self.alloc_type(document, TypeVariant::Slice { element }, range)
            }
            ast::TypeKind::Array { element, length } => {
                let element = self.resolve_type(db, document, scope, environment, element);
                let length = self.array_length(db, document, length);
                self.alloc_type(document, TypeVariant::Array { element, length }, range)
            }
            ast::TypeKind::Function { parameters, ret } => {
                let parameters = parameters
                    .into_iter()
                    .map(|parameter| self.resolve_type(db, document, scope, environment, parameter))
                    .collect();
                let ret = self.resolve_type(db, document, scope, environment, ret);
                self.alloc_type(document, TypeVariant::Function { parameters, ret }, range)
            }
            ast::TypeKind::Reference { mutability, referee } => {
                let mutability = self.resolve_mutability(db, document, scope, &mutability);
                let referee = self.resolve_type(db, document, scope, environment, referee);
                self.alloc_type(document, TypeVariant::Reference { referee, mutability }, range)
            }
            ast::TypeKind::Pointer { mutability, pointee } => {
                let mutability = self.resolve_mutability(db, document, scope, &mutability);
                let pointee = self.resolve_type(db, document, scope, environment, pointee);
                self.alloc_type(document, TypeVariant::Pointer { pointee, mutability }, range)
            }
            ast::TypeKind::Typeof { inspected } => {
                // Resolve in a fresh child scope; the scope is discarded
                // after producing the type.
                scope.push_frame();
                let mut body_ctx = crate::infer::BodyContext::detached(document, self);
                let expression =
                    self.infer_expression(db, document, scope, environment, &mut body_ctx, inspected);
                let mut warnings = Vec::new();
                scope.pop_frame(&db.interner, &mut warnings);
                db.document_mut(document).diagnostics.extend(warnings);
                self.state(document).hir.expression(expression).ty
            }
            ast::TypeKind::Path(path) => {
                self.resolve_type_path(db, document, scope, environment, &path, range)
            }
        }
    }

    /// Evaluate an array length annotation. Only literal lengths become
    /// known constants; anything else leaves the length unknown, and
    /// unknown lengths unify with everything.
    fn array_length(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        length: ast::ExpressionId,
    ) -> Option<u64> {
        let node = self.state(document).ast.expression(length).clone();
        match node.kind {
            ast::ExpressionKind::IntegerLiteral(value) => Some(value),
            _ => {
                db.emit(
                    document,
                    Diagnostic::error("array length must be an integer literal", node.range),
                );
                None
            }
        }
    }

    pub(crate) fn resolve_mutability(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        mutability: &ast::Mutability,
    ) -> MutabilityId {
        match mutability.kind {
            ast::MutabilityKind::Constant { is_mutable } => self
                .state(document)
                .hir
                .alloc_mutability(MutabilityVariant::Constant { is_mutable }, mutability.range),
            ast::MutabilityKind::Parameterized(name) => match scope.find_mutability(name.id) {
                Some(bind) => {
                    let (mutability_id, tag, bind_range) = (bind.mutability, bind.tag, bind.range);
                    self.record_reference(
                        db,
                        document,
                        name.range,
                        Symbol::LocalMutability(tag),
                        Location { document, range: bind_range },
                        SemanticTokenKind::Parameter,
                    );
                    mutability_id
                }
                None => {
                    let text = db.interner.lookup(name.id).to_owned();
                    db.emit(
                        document,
                        Diagnostic::error(
                            format!("no mutability binding named `{text}` in scope"),
                            name.range,
                        ),
                    );
                    self.state(document)
                        .hir
                        .alloc_mutability(MutabilityVariant::Error, mutability.range)
                }
            },
        }
    }

    // ── Paths ──────────────────────────────────────────────────────────

    /// Walk the environment chain for a value-namespace name.
    pub(crate) fn lookup_lower(&self, environment: EnvironmentId, name: StringId) -> Option<LowerInfo> {
        let mut current = Some(environment);
        while let Some(env_id) = current {
            let env = &self.environments[env_id.0 as usize];
            if let Some(info) = env.lower.get(&name) {
                return Some(*info);
            }
            current = env.parent;
        }
        None
    }

    /// Walk the environment chain for a type-namespace name.
    pub(crate) fn lookup_upper(&self, environment: EnvironmentId, name: StringId) -> Option<UpperInfo> {
        let mut current = Some(environment);
        while let Some(env_id) = current {
            let env = &self.environments[env_id.0 as usize];
            if let Some(info) = env.upper.get(&name) {
                return Some(*info);
            }
            current = env.parent;
        }
        None
    }

    /// Resolve every segment but the last to an environment: modules and
    /// enumerations re-scope; anything else is an error. Returns the
    /// environment the final segment should be looked up in, and whether
    /// the chain-walk applies (false after any qualifier).
    pub(crate) fn resolve_path_prefix(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        path: &ast::Path,
    ) -> Option<(EnvironmentId, bool)> {
        let mut env = environment;
        let mut chain = true;

        if path.is_global {
            env = self.state(document).root_environment;
            chain = false;
        }

        if let Some(inspected) = path.typeof_root {
            let mut body_ctx = crate::infer::BodyContext::detached(document, self);
            scope.push_frame();
            let expression =
                self.infer_expression(db, document, scope, environment, &mut body_ctx, inspected);
            let mut warnings = Vec::new();
            scope.pop_frame(&db.interner, &mut warnings);
            db.document_mut(document).diagnostics.extend(warnings);

            let ty = self.state(document).hir.expression(expression).ty;
            let state = self.state(document);
            let flattened = state.inference.flatten(&state.hir, ty);
            match state.hir.ty(flattened).variant.clone() {
                TypeVariant::Enumeration { enumeration, .. } => {
                    env = self.enumerations[enumeration.0 as usize].environment;
                    chain = false;
                }
                _ => {
                    db.emit(
                        document,
                        Diagnostic::error(
                            "`typeof` path roots must name an enumeration or struct type",
                            path.range,
                        ),
                    );
                    return None;
                }
            }
        }

        let prefix_len = path.segments.len().saturating_sub(1);
        for (index, segment) in path.segments[..prefix_len].iter().enumerate() {
            let first = index == 0 && chain;
            env = self.resolve_segment_to_environment(db, document, scope, env, segment, first)?;
            chain = false;
        }
        Some((env, chain && prefix_len == 0))
    }

    fn resolve_segment_to_environment(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        segment: &ast::PathSegment,
        use_chain: bool,
    ) -> Option<EnvironmentId> {
        let name = segment.name;
        if name.is_upper {
            // A type-level qualifier: an enumeration (its constructors)
            // or an alias of one.
            let info = if use_chain {
                // Template parameters shadow; they have no environment.
                if scope.find_type(name.id).is_some() {
                    let text = db.interner.lookup(name.id).to_owned();
                    db.emit(
                        document,
                        Diagnostic::error(
                            format!("template parameter `{text}` cannot qualify a path"),
                            name.range,
                        ),
                    );
                    return None;
                }
                self.lookup_upper(environment, name.id)
            } else {
                self.environments[environment.0 as usize].upper.get(&name.id).copied()
            };
            match info {
                Some(UpperInfo { variant: UpperVariant::Enumeration(id), .. }) => {
                    self.record_enumeration_reference(db, document, name.range, id);
                    Some(self.enumerations[id.0 as usize].environment)
                }
                Some(UpperInfo { variant: UpperVariant::Alias(id), .. }) => {
                    self.ensure_alias(db, document, id);
                    let aliased = self.aliases[id.0 as usize].aliased.expect("alias resolved");
                    let state = self.state(document);
                    let flattened = state.inference.flatten(&state.hir, aliased);
                    match state.hir.ty(flattened).variant.clone() {
                        TypeVariant::Enumeration { enumeration, .. } => {
                            Some(self.enumerations[enumeration.0 as usize].environment)
                        }
                        _ => {
                            let text = db.interner.lookup(name.id).to_owned();
                            db.emit(
                                document,
                                Diagnostic::error(
                                    format!("`{text}` does not name an enumeration"),
                                    name.range,
                                ),
                            );
                            None
                        }
                    }
                }
                _ => {
                    let text = db.interner.lookup(name.id).to_owned();
                    db.emit(
                        document,
                        Diagnostic::error(format!("`{text}` is not defined here"), name.range),
                    );
                    None
                }
            }
        } else {
            let info = if use_chain {
                self.lookup_lower(environment, name.id)
            } else {
                self.environments[environment.0 as usize].lower.get(&name.id).copied()
            };
            match info {
                Some(LowerInfo { variant: LowerVariant::Module(id), .. }) => {
                    let module = &self.modules[id.0 as usize];
                    let target = module.environment;
                    let location =
                        Location { document: module.document, range: module.name.range };
                    self.record_reference(
                        db,
                        document,
                        name.range,
                        Symbol::Module(id),
                        location,
                        SemanticTokenKind::Module,
                    );
                    Some(target)
                }
                Some(_) => {
                    let text = db.interner.lookup(name.id).to_owned();
                    db.emit(
                        document,
                        Diagnostic::error(
                            format!("`{text}` is not a module and cannot qualify a path"),
                            name.range,
                        ),
                    );
                    None
                }
                None => {
                    let text = db.interner.lookup(name.id).to_owned();
                    db.emit(
                        document,
                        Diagnostic::error(format!("`{text}` is not defined here"), name.range),
                    );
                    None
                }
            }
        }
    }

    /// Resolve a type-namespace path to a type.
    pub(crate) fn resolve_type_path(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        path: &ast::Path,
        range: Range,
    ) -> TypeId {
        let Some((env, use_chain)) = self.resolve_path_prefix(db, document, scope, environment, path)
        else {
            return self.alloc_type(document, TypeVariant::Error, range);
        };
        let Some(segment) = path.segments.last() else {
            return self.alloc_type(document, TypeVariant::Error, range);
        };
        let segment = segment.clone();
        let name = segment.name;

        if !name.is_upper {
            let text = db.interner.lookup(name.id).to_owned();
            db.emit(
                document,
                Diagnostic::error(format!("`{text}` cannot name a type"), name.range),
            );
            return self.alloc_type(document, TypeVariant::Error, range);
        }

        // Scope chain first: template parameters.
        if use_chain {
            if let Some(bind) = scope.find_type(name.id) {
                let (ty, tag, bind_range) = (bind.ty, bind.tag, bind.range);
                self.record_reference(
                    db,
                    document,
                    name.range,
                    Symbol::LocalType(tag),
                    Location { document, range: bind_range },
                    SemanticTokenKind::Type,
                );
                return ty;
            }
        }

        let info = if use_chain {
            self.lookup_upper(env, name.id)
        } else {
            self.environments[env.0 as usize].upper.get(&name.id).copied()
        };

        match info {
            Some(UpperInfo { variant: UpperVariant::Enumeration(id), .. }) => {
                self.ensure_enumeration(db, document, id);
                self.record_enumeration_reference(db, document, name.range, id);
                let arguments = self.resolve_enum_template_arguments(
                    db, document, scope, environment, id, &segment, range,
                );
                self.alloc_type(
                    document,
                    TypeVariant::Enumeration { enumeration: id, template_arguments: arguments },
                    range,
                )
            }
            Some(UpperInfo { variant: UpperVariant::Alias(id), .. }) => {
                self.ensure_alias(db, document, id);
                let info_location = Location {
                    document: self.aliases[id.0 as usize].document,
                    range: self.aliases[id.0 as usize].name.range,
                };
                self.record_reference(
                    db,
                    document,
                    name.range,
                    Symbol::Alias(id),
                    info_location,
                    SemanticTokenKind::Type,
                );
                let aliased = self.aliases[id.0 as usize].aliased.expect("alias resolved");
                self.instantiate_alias(db, document, scope, environment, id, aliased, &segment, range)
            }
            Some(UpperInfo { variant: UpperVariant::Concept(_), .. }) => {
                let text = db.interner.lookup(name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(
                        format!("`{text}` is a concept, which is not usable as a type"),
                        name.range,
                    ),
                );
                self.alloc_type(document, TypeVariant::Error, range)
            }
            None => {
                // Built-in primitive typenames live at the bottom of the
                // upper namespace.
                if use_chain {
                    if let Some(ty) = self.builtin_type(db, document, name.id, range) {
                        return ty;
                    }
                }
                let text = db.interner.lookup(name.id).to_owned();
                db.emit(
                    document,
                    Diagnostic::error(format!("`{text}` is not defined here"), name.range),
                );
                self.alloc_type(document, TypeVariant::Error, range)
            }
        }
    }

    fn builtin_type(
        &mut self,
        db: &Database,
        document: DocumentId,
        name: StringId,
        range: Range,
    ) -> Option<TypeId> {
        let variant = match db.interner.lookup(name) {
            "Float" => TypeVariant::Floating,
            "Char" => TypeVariant::Character,
            "Bool" => TypeVariant::Boolean,
            "String" => TypeVariant::String,
            other => TypeVariant::Integer(IntegerType::from_name(other)?),
        };
        Some(self.alloc_type(document, variant, range))
    }

    /// Template arguments for an enumeration reference: explicit
    /// arguments must match the parameter count; absent arguments become
    /// fresh variables, letting inference fill them in.
    pub(crate) fn resolve_enum_template_arguments(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        id: EnumerationId,
        segment: &ast::PathSegment,
        range: Range,
    ) -> Vec<TypeId> {
        let parameter_count = self.enumerations[id.0 as usize]
            .resolved
            .as_ref()
            .map_or(0, |resolved| {
                resolved
                    .template_parameters
                    .iter()
                    .filter(|parameter| {
                        matches!(parameter, ResolvedTemplateParameter::Type { .. })
                    })
                    .count()
            });

        match &segment.template_arguments {
            Some(arguments) => {
                let resolved: Vec<_> = arguments
                    .iter()
                    .filter_map(|argument| match argument {
                        ast::TemplateArgument::Type(ty) => {
                            Some(self.resolve_type(db, document, scope, environment, *ty))
                        }
                        ast::TemplateArgument::Mutability(_) => None,
                    })
                    .collect();
                if resolved.len() != parameter_count {
                    db.emit(
                        document,
                        Diagnostic::error(
                            format!(
                                "wrong number of template arguments: expected {parameter_count}, found {}",
                                resolved.len()
                            ),
                            range,
                        ),
                    );
                }
                resolved
            }
            None => (0..parameter_count)
                .map(|_| self.fresh_type(document, TypeVariableKind::General, range))
                .collect(),
        }
    }

    fn instantiate_alias(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        scope: &mut Scope,
        environment: EnvironmentId,
        id: AliasId,
        aliased: TypeId,
        segment: &ast::PathSegment,
        range: Range,
    ) -> TypeId {
        let parameters = self.aliases[id.0 as usize].template_parameters.clone().unwrap_or_default();
        if parameters.is_empty() {
            return aliased;
        }
        let mut substitution = FxHashMap::default();
        let mut mutability_substitution = FxHashMap::default();
        let explicit: Vec<_> = match &segment.template_arguments {
            Some(arguments) => arguments
                .iter()
                .filter_map(|argument| match argument {
                    ast::TemplateArgument::Type(ty) => {
                        Some(self.resolve_type(db, document, scope, environment, *ty))
                    }
                    ast::TemplateArgument::Mutability(_) => None,
                })
                .collect(),
            None => Vec::new(),
        };
        let mut explicit = explicit.into_iter();
        for parameter in &parameters {
            match parameter {
                ResolvedTemplateParameter::Type { tag, .. } => {
                    let ty = explicit.next().unwrap_or_else(|| {
                        self.fresh_type(document, TypeVariableKind::General, range)
                    });
                    substitution.insert(*tag, ty);
                }
                ResolvedTemplateParameter::Mutability { tag, .. } => {
                    let mutability = self.fresh_mutability(document, range);
                    mutability_substitution.insert(*tag, mutability);
                }
            }
        }
        let state = self.state(document);
        state
            .inference
            .instantiate_with(&mut state.hir, &substitution, &mutability_substitution, aliased)
    }

    fn record_enumeration_reference(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        range: Range,
        id: EnumerationId,
    ) {
        let location = Location {
            document: self.enumerations[id.0 as usize].document,
            range: self.enumerations[id.0 as usize].name.range,
        };
        self.record_reference(
            db,
            document,
            range,
            Symbol::Enumeration(id),
            location,
            SemanticTokenKind::Type,
        );
    }

    // ── Small shared helpers ───────────────────────────────────────────

    pub(crate) fn state(&mut self, document: DocumentId) -> &mut crate::DocumentState {
        self.documents
            .get_mut(&document)
            .expect("document must be collected before resolution")
    }

    pub(crate) fn alloc_type(
        &mut self,
        document: DocumentId,
        variant: TypeVariant,
        range: Range,
    ) -> TypeId {
        self.state(document).hir.alloc_type(variant, range)
    }

    pub(crate) fn fresh_type(
        &mut self,
        document: DocumentId,
        kind: TypeVariableKind,
        range: Range,
    ) -> TypeId {
        let state = self.state(document);
        state.inference.fresh_type_variable(&mut state.hir, kind, range)
    }

    pub(crate) fn fresh_mutability(&mut self, document: DocumentId, range: Range) -> MutabilityId {
        let state = self.state(document);
        state.inference.fresh_mutability_variable(&mut state.hir, range)
    }

    pub(crate) fn unify(
        &mut self,
        db: &Database,
        document: DocumentId,
        a: TypeId,
        b: TypeId,
        range: Range,
    ) -> bool {
        let state = self.state(document);
        state.inference.unify(&mut state.hir, &db.interner, a, b, range)
    }

    pub(crate) fn record_reference(
        &mut self,
        db: &mut Database,
        document: DocumentId,
        range: Range,
        symbol: Symbol,
        target: Location,
        semantic: SemanticTokenKind,
    ) {
        self.state(document).symbols.push(symbol);
        let doc = db.document_mut(document);
        doc.references
            .push(rill_common::db::ReferenceAnnotation { range, target });
        doc.semantic_tokens
            .push(rill_common::db::SemanticToken { range, kind: semantic });
    }

    // ── Cross-document types ───────────────────────────────────────────

    /// Copy a resolved type from one document's arena into another's.
    /// Needed when an imported definition's signature is used: type ids
    /// are only meaningful within their owning arena.
    pub(crate) fn import_type(
        &mut self,
        from: DocumentId,
        to: DocumentId,
        id: TypeId,
    ) -> TypeId {
        let frozen = self.freeze_type(from, id);
        let range = self.state(from).hir.ty(id).range;
        self.thaw_type(to, &frozen, range)
    }

    fn freeze_type(&mut self, document: DocumentId, id: TypeId) -> FrozenType {
        let state = self.state(document);
        let id = state.inference.flatten(&state.hir, id);
        let variant = state.hir.ty(id).variant.clone();
        match variant {
            TypeVariant::Error => FrozenType::Error,
            // An unsolved variable in a finished signature has already
            // been reported as needing an annotation.
            TypeVariant::Variable(_) => FrozenType::Error,
            TypeVariant::Integer(integer) => FrozenType::Integer(integer),
            TypeVariant::Floating => FrozenType::Floating,
            TypeVariant::Character => FrozenType::Character,
            TypeVariant::Boolean => FrozenType::Boolean,
            TypeVariant::String => FrozenType::String,
            TypeVariant::Array { element, length } => FrozenType::Array {
                element: Box::new(self.freeze_type(document, element)),
                length,
            },
            TypeVariant::Slice { element } => FrozenType::Slice {
                element: Box::new(self.freeze_type(document, element)),
            },
            TypeVariant::Reference { referee, mutability } => FrozenType::Reference {
                referee: Box::new(self.freeze_type(document, referee)),
                mutability: self.freeze_mutability(document, mutability),
            },
            TypeVariant::Pointer { pointee, mutability } => FrozenType::Pointer {
                pointee: Box::new(self.freeze_type(document, pointee)),
                mutability: self.freeze_mutability(document, mutability),
            },
            TypeVariant::Tuple(elements) => FrozenType::Tuple(
                elements
                    .into_iter()
                    .map(|element| self.freeze_type(document, element))
                    .collect(),
            ),
            TypeVariant::Function { parameters, ret } => FrozenType::Function {
                parameters: parameters
                    .into_iter()
                    .map(|parameter| self.freeze_type(document, parameter))
                    .collect(),
                ret: Box::new(self.freeze_type(document, ret)),
            },
            TypeVariant::Enumeration { enumeration, template_arguments } => {
                FrozenType::Enumeration {
                    enumeration,
                    template_arguments: template_arguments
                        .into_iter()
                        .map(|argument| self.freeze_type(document, argument))
                        .collect(),
                }
            }
            TypeVariant::TemplateParameter { tag, name } => {
                FrozenType::TemplateParameter { tag, name }
            }
        }
    }

    fn freeze_mutability(&mut self, document: DocumentId, id: MutabilityId) -> FrozenMutability {
        let state = self.state(document);
        let id = state.inference.flatten_mutability(&state.hir, id);
        match state.hir.mutability(id).variant.clone() {
            MutabilityVariant::Constant { is_mutable } => {
                FrozenMutability::Constant { is_mutable }
            }
            MutabilityVariant::Parameterized { tag, name } => {
                FrozenMutability::Parameterized { tag, name }
            }
            MutabilityVariant::Error | MutabilityVariant::Variable(_) => FrozenMutability::Error,
        }
    }

    fn thaw_type(&mut self, document: DocumentId, frozen: &FrozenType, range: Range) -> TypeId {
        let variant = match frozen {
            FrozenType::Error => TypeVariant::Error,
            FrozenType::Integer(integer) => TypeVariant::Integer(*integer),
            FrozenType::Floating => TypeVariant::Floating,
            FrozenType::Character => TypeVariant::Character,
            FrozenType::Boolean => TypeVariant::Boolean,
            FrozenType::String => TypeVariant::String,
            FrozenType::Array { element, length } => TypeVariant::Array {
                element: self.thaw_type(document, element, range),
                length: *length,
            },
            FrozenType::Slice { element } => TypeVariant::Slice {
                element: self.thaw_type(document, element, range),
            },
            FrozenType::Reference { referee, mutability } => TypeVariant::Reference {
                referee: self.thaw_type(document, referee, range),
                mutability: self.thaw_mutability(document, mutability, range),
            },
            FrozenType::Pointer { pointee, mutability } => TypeVariant::Pointer {
                pointee: self.thaw_type(document, pointee, range),
                mutability: self.thaw_mutability(document, mutability, range),
            },
            FrozenType::Tuple(elements) => TypeVariant::Tuple(
                elements
                    .iter()
                    .map(|element| self.thaw_type(document, element, range))
                    .collect(),
            ),
            FrozenType::Function { parameters, ret } => TypeVariant::Function {
                parameters: parameters
                    .iter()
                    .map(|parameter| self.thaw_type(document, parameter, range))
                    .collect(),
                ret: self.thaw_type(document, ret, range),
            },
            FrozenType::Enumeration { enumeration, template_arguments } => {
                let name = self.enumerations[enumeration.0 as usize].name.id;
                self.state(document)
                    .inference
                    .register_enumeration_name(*enumeration, name);
                TypeVariant::Enumeration {
                    enumeration: *enumeration,
                    template_arguments: template_arguments
                        .iter()
                        .map(|argument| self.thaw_type(document, argument, range))
                        .collect(),
                }
            }
            FrozenType::TemplateParameter { tag, name } => {
                TypeVariant::TemplateParameter { tag: *tag, name: *name }
            }
        };
        self.alloc_type(document, variant, range)
    }

    fn thaw_mutability(
        &mut self,
        document: DocumentId,
        frozen: &FrozenMutability,
        range: Range,
    ) -> MutabilityId {
        let variant = match frozen {
            FrozenMutability::Error => MutabilityVariant::Error,
            FrozenMutability::Constant { is_mutable } => {
                MutabilityVariant::Constant { is_mutable: *is_mutable }
            }
            FrozenMutability::Parameterized { tag, name } => {
                MutabilityVariant::Parameterized { tag: *tag, name: *name }
            }
        };
        self.state(document).hir.alloc_mutability(variant, range)
    }
}

/// An arena-independent snapshot of a resolved type, used to move types
/// between documents.
enum FrozenType {
    Error,
    Integer(IntegerType),
    Floating,
    Character,
    Boolean,
    String,
    Array { element: Box<FrozenType>, length: Option<u64> },
    Slice { element: Box<FrozenType> },
    Reference { referee: Box<FrozenType>, mutability: FrozenMutability },
    Pointer { pointee: Box<FrozenType>, mutability: FrozenMutability },
    Tuple(Vec<FrozenType>),
    Function { parameters: Vec<FrozenType>, ret: Box<FrozenType> },
    Enumeration { enumeration: EnumerationId, template_arguments: Vec<FrozenType> },
    TemplateParameter { tag: LocalTypeTag, name: StringId },
}

enum FrozenMutability {
    Error,
    Constant { is_mutable: bool },
    Parameterized { tag: LocalMutabilityTag, name: StringId },
}
