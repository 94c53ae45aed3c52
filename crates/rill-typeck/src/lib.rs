//! Rill name resolution and type inference.
//!
//! Two phases per document. **Collect** walks the top-level CST,
//! desugars each definition, and records names in environments.
//! **Resolve** processes collected symbols in order, on demand:
//! signatures, then bodies, producing a typed HIR through a classical
//! unification-based inference engine. Errors are values throughout;
//! every failure yields a diagnostic plus an error node and resolution
//! continues.

pub mod hir;
pub mod query;
pub mod scope;
pub mod symbol;
pub mod unify;

mod collect;
mod infer;
mod resolve;

use rill_common::db::{Database, DocumentId};
use rill_desugar::ast::AstArena;
use rustc_hash::FxHashMap;

use hir::HirArena;
use symbol::{
    AliasInfo, ConceptInfo, EnumerationInfo, Environment, FunctionInfo, ImplementationInfo,
    ModuleInfo, Symbol,
};
use unify::InferenceState;

pub use query::DocumentSymbol;
pub use symbol::EnvironmentId;

/// Collaborator hook: maps an import path to a registered document.
/// The core recurses into the resolved document's environment; cycles
/// are broken by the resolver, not the hook.
pub trait ImportResolver {
    fn resolve(&mut self, db: &mut Database, segments: &[String]) -> Option<DocumentId>;
}

/// Phase state for one document: its AST and HIR arenas, inference
/// state, symbol table, and root environment. Arenas are grow-only for
/// the analysis lifetime; ids are never invalidated.
pub struct DocumentState {
    pub ast: AstArena,
    pub hir: HirArena,
    pub inference: InferenceState,
    pub symbols: Vec<Symbol>,
    pub root_environment: EnvironmentId,
}

impl DocumentState {
    pub(crate) fn new(document: DocumentId, ast: AstArena, root_environment: EnvironmentId) -> Self {
        Self {
            ast,
            hir: HirArena::new(),
            inference: InferenceState::new(document),
            symbols: Vec::new(),
            root_environment,
        }
    }
}

/// The analysis database: definition info tables, environments, and
/// per-document phase state, shared across every document of one
/// compilation.
#[derive(Default)]
pub struct Analysis {
    pub functions: Vec<FunctionInfo>,
    pub enumerations: Vec<EnumerationInfo>,
    pub concepts: Vec<ConceptInfo>,
    pub aliases: Vec<AliasInfo>,
    pub modules: Vec<ModuleInfo>,
    pub implementations: Vec<ImplementationInfo>,
    pub environments: Vec<Environment>,
    pub documents: FxHashMap<DocumentId, DocumentState>,
    importer: Option<Box<dyn ImportResolver>>,
    /// Documents currently being checked, for circular-import detection.
    resolving_documents: Vec<DocumentId>,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_importer(importer: Box<dyn ImportResolver>) -> Self {
        Self { importer: Some(importer), ..Self::default() }
    }

    /// Run the full pipeline on a document: collect, then resolve every
    /// definition in source order. Returns the document's root
    /// environment.
    pub fn check_document(&mut self, db: &mut Database, document: DocumentId) -> EnvironmentId {
        // Re-entry through a cyclic import chain: the import resolver
        // has already reported it, so just hand back what exists.
        if self.resolving_documents.contains(&document) {
            if let Some(state) = self.documents.get(&document) {
                return state.root_environment;
            }
        }
        self.resolving_documents.push(document);
        let root = self.collect_document(db, document);
        self.resolve_document(db, document);
        self.resolving_documents.pop();
        root
    }
}

/// Convenience entry point: register and fully check a single source
/// text, returning the analysis and the document id.
pub fn check_source(db: &mut Database, path: &str, text: &str) -> (Analysis, DocumentId) {
    let document = db.add_document(path, text);
    let mut analysis = Analysis::new();
    analysis.check_document(db, document);
    (analysis, document)
}
