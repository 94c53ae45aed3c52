//! The collection phase.
//!
//! Walks a document's top-level CST definitions, desugars each into the
//! document's AST arena, and records names in the owning environment.
//! Bodies are not resolved here; that happens on demand in source order
//! during the resolve phase.

use rill_common::db::{Database, DocumentId};
use rill_common::diagnostic::Diagnostic;
use rill_common::span::{Location, Range};
use rill_desugar::{ast, Desugarer};
use rill_parser::nodes::item::Definition;
use rill_parser::nodes::AstNode;

use crate::symbol::{
    DefinitionVariant, EnumerationId, EnumerationInfo, Environment, EnvironmentId, FunctionId,
    FunctionInfo, ImplementationId, ImplementationInfo, LowerInfo, LowerVariant, ModuleInfo,
    UpperInfo, UpperVariant,
};
use crate::{Analysis, DocumentState};

/// An `import a::b` waiting for the collaborator hook, processed after
/// the desugarer releases its borrow of the interner.
struct PendingImport {
    environment: EnvironmentId,
    segments: Vec<String>,
    range: Range,
}

impl Analysis {
    /// Collect a document: parse, desugar its definitions, and build its
    /// environment tree. Idempotent per document.
    pub fn collect_document(&mut self, db: &mut Database, document: DocumentId) -> EnvironmentId {
        if let Some(state) = self.documents.get(&document) {
            return state.root_environment;
        }

        let parse = rill_parser::parse_document(db, document);
        let text = db.document(document).text.clone();

        let root_environment = self.new_environment(None, document);
        let mut ast_arena = ast::AstArena::new();
        let mut pending_imports = Vec::new();

        {
            let mut desugarer = Desugarer::new(&mut db.interner, &mut ast_arena, document, &text);
            let mut diagnostics = Vec::new();
            for definition in parse.source_file().definitions() {
                self.collect_definition(
                    &mut desugarer,
                    &mut diagnostics,
                    document,
                    root_environment,
                    &definition,
                    &mut pending_imports,
                );
            }
            diagnostics.extend(desugarer.take_diagnostics());
            drop(desugarer);
            db.document_mut(document).diagnostics.extend(diagnostics);
        }

        self.documents.insert(
            document,
            DocumentState::new(document, ast_arena, root_environment),
        );

        for import in pending_imports {
            self.process_import(db, document, import);
        }

        root_environment
    }

    fn collect_definition(
        &mut self,
        desugarer: &mut Desugarer,
        diagnostics: &mut Vec<Diagnostic>,
        document: DocumentId,
        environment: EnvironmentId,
        definition: &Definition,
        pending_imports: &mut Vec<PendingImport>,
    ) {
        match definition {
            Definition::Fn(def) => {
                let function = desugarer.desugar_function(def);
                let name = function.name;
                let id = FunctionId(self.functions.len() as u32);
                self.functions.push(FunctionInfo {
                    name,
                    environment,
                    document,
                    ast: function,
                    implementation: None,
                    signature: None,
                    body: None,
                    currently_resolving: false,
                });
                self.add_lower(
                    desugarer,
                    diagnostics,
                    environment,
                    LowerInfo { name, variant: LowerVariant::Function(id) },
                );
                self.environments[environment.0 as usize]
                    .in_order
                    .push(DefinitionVariant::Function(id));
            }

            Definition::Struct(def) => {
                let enumeration = desugarer.desugar_struct(def);
                self.collect_enumeration(desugarer, diagnostics, document, environment, enumeration);
            }

            Definition::Enum(def) => {
                let enumeration = desugarer.desugar_enum(def);
                self.collect_enumeration(desugarer, diagnostics, document, environment, enumeration);
            }

            Definition::Concept(def) => {
                let concept = desugarer.desugar_concept(def);
                let name = concept.name;
                let id = crate::symbol::ConceptId(self.concepts.len() as u32);
                self.concepts.push(crate::symbol::ConceptInfo {
                    name,
                    environment,
                    document,
                    ast: concept,
                    resolved: false,
                    currently_resolving: false,
                });
                self.add_upper(
                    desugarer,
                    diagnostics,
                    environment,
                    UpperInfo { name, variant: UpperVariant::Concept(id) },
                );
                self.environments[environment.0 as usize]
                    .in_order
                    .push(DefinitionVariant::Concept(id));
            }

            Definition::Alias(def) => {
                let alias = desugarer.desugar_alias(def);
                let name = alias.name;
                let id = crate::symbol::AliasId(self.aliases.len() as u32);
                self.aliases.push(crate::symbol::AliasInfo {
                    name,
                    environment,
                    document,
                    ast: alias,
                    template_parameters: None,
                    aliased: None,
                    currently_resolving: false,
                });
                self.add_upper(
                    desugarer,
                    diagnostics,
                    environment,
                    UpperInfo { name, variant: UpperVariant::Alias(id) },
                );
                self.environments[environment.0 as usize]
                    .in_order
                    .push(DefinitionVariant::Alias(id));
            }

            Definition::Module(def) => {
                let Some(name_token) = def.name() else {
                    return;
                };
                let name = desugarer.name(&name_token);
                let child = self.new_environment(Some(environment), document);
                let id = crate::symbol::ModuleId(self.modules.len() as u32);
                self.modules.push(ModuleInfo { name, environment: child, document });
                self.add_lower(
                    desugarer,
                    diagnostics,
                    environment,
                    LowerInfo { name, variant: LowerVariant::Module(id) },
                );
                self.environments[environment.0 as usize]
                    .in_order
                    .push(DefinitionVariant::Module(id));
                for inner in def.definitions() {
                    self.collect_definition(
                        desugarer,
                        diagnostics,
                        document,
                        child,
                        &inner,
                        pending_imports,
                    );
                }
            }

            Definition::Impl(def) => {
                let implementation = desugarer.desugar_implementation(def);
                let impl_id = ImplementationId(self.implementations.len() as u32);
                let mut function_ids = Vec::new();
                for function in &implementation.functions {
                    let id = FunctionId(self.functions.len() as u32);
                    self.functions.push(FunctionInfo {
                        name: function.name,
                        environment,
                        document,
                        ast: function.clone(),
                        implementation: Some(impl_id),
                        signature: None,
                        body: None,
                        currently_resolving: false,
                    });
                    function_ids.push(id);
                }
                self.implementations.push(ImplementationInfo {
                    environment,
                    document,
                    template_parameters: implementation.template_parameters,
                    self_type_ast: implementation.self_type,
                    functions: function_ids,
                    resolved: None,
                    currently_resolving: false,
                });
                self.environments[environment.0 as usize]
                    .in_order
                    .push(DefinitionVariant::Implementation(impl_id));
            }

            Definition::Import(def) => {
                let Some(path) = def.path() else {
                    return;
                };
                let range = desugarer.range_of_node(path.syntax());
                let segments = path
                    .segments()
                    .filter_map(|segment| segment.name())
                    .map(|token| token.text().to_owned())
                    .collect();
                pending_imports.push(PendingImport { environment, segments, range });
            }
        }
    }

    fn collect_enumeration(
        &mut self,
        desugarer: &mut Desugarer,
        diagnostics: &mut Vec<Diagnostic>,
        document: DocumentId,
        parent_environment: EnvironmentId,
        enumeration: ast::Enumeration,
    ) {
        let name = enumeration.name;
        let id = EnumerationId(self.enumerations.len() as u32);

        // The enumeration's own environment names its constructors.
        let environment = self.new_environment(Some(parent_environment), document);
        for (index, constructor) in enumeration.constructors.iter().enumerate() {
            self.add_lower(
                desugarer,
                diagnostics,
                environment,
                LowerInfo {
                    name: constructor.name,
                    variant: LowerVariant::Constructor { enumeration: id, index },
                },
            );
        }

        self.enumerations.push(EnumerationInfo {
            name,
            environment,
            parent_environment,
            document,
            ast: enumeration,
            resolved: None,
            currently_resolving: false,
        });
        self.add_upper(
            desugarer,
            diagnostics,
            parent_environment,
            UpperInfo { name, variant: UpperVariant::Enumeration(id) },
        );
        self.environments[parent_environment.0 as usize]
            .in_order
            .push(DefinitionVariant::Enumeration(id));
    }

    fn process_import(&mut self, db: &mut Database, document: DocumentId, import: PendingImport) {
        let Some(mut importer) = self.importer.take() else {
            db.emit(
                document,
                Diagnostic::error("no import resolver is configured", import.range),
            );
            return;
        };
        let target = importer.resolve(db, &import.segments);
        self.importer = Some(importer);

        let Some(target) = target else {
            db.emit(
                document,
                Diagnostic::error(
                    format!("unresolved import `{}`", import.segments.join("::")),
                    import.range,
                ),
            );
            return;
        };

        if self.resolving_documents.contains(&target) {
            db.emit(
                document,
                Diagnostic::error("circular module import", import.range),
            );
            return;
        }

        // Fully check the imported document so its symbols carry
        // resolved signatures by the time this document uses them.
        let target_root = self.check_document(db, target);

        let Some(last) = import.segments.last() else {
            return;
        };
        let name = ast::Name {
            id: db.interner.intern(last),
            is_upper: false,
            range: import.range,
        };
        let id = crate::symbol::ModuleId(self.modules.len() as u32);
        self.modules.push(ModuleInfo {
            name,
            environment: target_root,
            document: target,
        });
        let environment = &mut self.environments[import.environment.0 as usize];
        if environment.lower.contains_key(&name.id) {
            db.emit(
                document,
                Diagnostic::error(format!("duplicate definition of `{last}`"), import.range),
            );
            return;
        }
        environment
            .lower
            .insert(name.id, LowerInfo { name, variant: LowerVariant::Module(id) });
    }

    // ── Environment helpers ────────────────────────────────────────────

    pub(crate) fn new_environment(
        &mut self,
        parent: Option<EnvironmentId>,
        document: DocumentId,
    ) -> EnvironmentId {
        let id = EnvironmentId(self.environments.len() as u32);
        self.environments.push(Environment {
            parent,
            document: Some(document),
            ..Environment::default()
        });
        id
    }

    /// Insert a value-namespace name, reporting a duplicate definition
    /// when the environment already binds it.
    fn add_lower(
        &mut self,
        desugarer: &Desugarer,
        diagnostics: &mut Vec<Diagnostic>,
        environment: EnvironmentId,
        info: LowerInfo,
    ) {
        let env = &mut self.environments[environment.0 as usize];
        if let Some(existing) = env.lower.get(&info.name.id) {
            let text = desugarer.interner.lookup(info.name.id);
            diagnostics.push(
                Diagnostic::error(format!("duplicate definition of `{text}`"), info.name.range)
                    .with_related(
                        "first defined here",
                        Location { document: desugarer.document, range: existing.name.range },
                    ),
            );
            return;
        }
        env.lower.insert(info.name.id, info);
    }

    fn add_upper(
        &mut self,
        desugarer: &Desugarer,
        diagnostics: &mut Vec<Diagnostic>,
        environment: EnvironmentId,
        info: UpperInfo,
    ) {
        let env = &mut self.environments[environment.0 as usize];
        if let Some(existing) = env.upper.get(&info.name.id) {
            let text = desugarer.interner.lookup(info.name.id);
            diagnostics.push(
                Diagnostic::error(format!("duplicate definition of `{text}`"), info.name.range)
                    .with_related(
                        "first defined here",
                        Location { document: desugarer.document, range: existing.name.range },
                    ),
            );
            return;
        }
        env.upper.insert(info.name.id, info);
    }
}
