//! Symbols, definition info tables, and environments.
//!
//! Environments and definition infos form cyclic graphs (a module's
//! environment names the module, which names its environment); all links
//! are indices into arenas owned by [`Analysis`](crate::Analysis), so the
//! cycles need no ownership gymnastics.

use rill_common::db::DocumentId;
use rill_common::intern::StringId;
use rill_desugar::ast;
use rustc_hash::FxHashMap;

use crate::hir::{
    LocalMutabilityTag, LocalTypeTag, LocalVariableTag, MutabilityId, TypeId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumerationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConceptId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AliasId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImplementationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentId(pub u32);

/// A resolved named entity. Stored in the document's symbol table; every
/// resolved path reference records one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Error,
    Function(FunctionId),
    Enumeration(EnumerationId),
    Concept(ConceptId),
    Alias(AliasId),
    Module(ModuleId),
    LocalVariable(LocalVariableTag),
    LocalMutability(LocalMutabilityTag),
    LocalType(LocalTypeTag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

// ── Resolved definition shapes ─────────────────────────────────────────

/// A template parameter after resolution: its fresh tag plus what kind of
/// placeholder it binds.
#[derive(Debug, Clone)]
pub enum ResolvedTemplateParameter {
    Type {
        name: ast::Name,
        tag: LocalTypeTag,
        /// The `TemplateParameter` type node for this parameter.
        ty: TypeId,
        bounds: Vec<ConceptId>,
    },
    Mutability {
        name: ast::Name,
        tag: LocalMutabilityTag,
        mutability: MutabilityId,
    },
}

#[derive(Debug, Clone)]
pub struct ResolvedParameter {
    pub name: ast::Name,
    pub tag: LocalVariableTag,
    pub mutability: MutabilityId,
    pub ty: TypeId,
    pub has_default: bool,
}

/// A function signature with every type resolved.
#[derive(Debug, Clone)]
pub struct ResolvedSignature {
    pub template_parameters: Vec<ResolvedTemplateParameter>,
    pub parameters: Vec<ResolvedParameter>,
    pub return_type: TypeId,
    pub function_type: TypeId,
}

#[derive(Debug, Clone)]
pub enum ResolvedConstructorBody {
    Unit,
    Tuple(Vec<TypeId>),
    Struct(Vec<(StringId, TypeId)>),
}

#[derive(Debug, Clone)]
pub struct ResolvedConstructor {
    pub name: ast::Name,
    pub body: ResolvedConstructorBody,
}

#[derive(Debug, Clone)]
pub struct ResolvedEnumeration {
    pub template_parameters: Vec<ResolvedTemplateParameter>,
    pub constructors: Vec<ResolvedConstructor>,
    /// The enumeration applied to its own template parameters.
    pub self_type: TypeId,
}

// ── Definition infos ───────────────────────────────────────────────────

/// Shared per-definition bookkeeping: where it was collected and whether
/// resolution has entered it (the cycle-breaking flag).
#[derive(Debug)]
pub struct FunctionInfo {
    pub name: ast::Name,
    pub environment: EnvironmentId,
    pub document: DocumentId,
    pub ast: ast::Function,
    /// The implementation block the function belongs to, for methods.
    pub implementation: Option<ImplementationId>,
    pub signature: Option<ResolvedSignature>,
    pub body: Option<crate::hir::ExpressionId>,
    pub currently_resolving: bool,
}

#[derive(Debug)]
pub struct EnumerationInfo {
    pub name: ast::Name,
    /// The enumeration's own environment: constructors by lower name.
    pub environment: EnvironmentId,
    /// The environment the enumeration was defined in.
    pub parent_environment: EnvironmentId,
    pub document: DocumentId,
    pub ast: ast::Enumeration,
    pub resolved: Option<ResolvedEnumeration>,
    pub currently_resolving: bool,
}

#[derive(Debug)]
pub struct ConceptInfo {
    pub name: ast::Name,
    pub environment: EnvironmentId,
    pub document: DocumentId,
    pub ast: ast::Concept,
    pub resolved: bool,
    pub currently_resolving: bool,
}

#[derive(Debug)]
pub struct AliasInfo {
    pub name: ast::Name,
    pub environment: EnvironmentId,
    pub document: DocumentId,
    pub ast: ast::Alias,
    pub template_parameters: Option<Vec<ResolvedTemplateParameter>>,
    pub aliased: Option<TypeId>,
    pub currently_resolving: bool,
}

#[derive(Debug)]
pub struct ModuleInfo {
    pub name: ast::Name,
    /// The module's own environment.
    pub environment: EnvironmentId,
    pub document: DocumentId,
}

#[derive(Debug)]
pub struct ImplementationInfo {
    pub environment: EnvironmentId,
    pub document: DocumentId,
    pub template_parameters: Vec<ast::TemplateParameter>,
    pub self_type_ast: rill_desugar::ast::TypeId,
    pub functions: Vec<FunctionId>,
    /// Resolved impl header: template parameters and self type.
    pub resolved: Option<ResolvedImplementation>,
    pub currently_resolving: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedImplementation {
    pub template_parameters: Vec<ResolvedTemplateParameter>,
    pub self_type: TypeId,
}

// ── Environments ───────────────────────────────────────────────────────

/// A lower-case (value namespace) environment entry.
#[derive(Debug, Clone, Copy)]
pub enum LowerVariant {
    Function(FunctionId),
    Module(ModuleId),
    /// An enumeration constructor, named inside the enum's environment.
    Constructor {
        enumeration: EnumerationId,
        index: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct LowerInfo {
    pub name: ast::Name,
    pub variant: LowerVariant,
}

/// An upper-case (type namespace) environment entry.
#[derive(Debug, Clone, Copy)]
pub enum UpperVariant {
    Enumeration(EnumerationId),
    Concept(ConceptId),
    Alias(AliasId),
}

#[derive(Debug, Clone, Copy)]
pub struct UpperInfo {
    pub name: ast::Name,
    pub variant: UpperVariant,
}

/// A collected definition, in source order.
#[derive(Debug, Clone, Copy)]
pub enum DefinitionVariant {
    Function(FunctionId),
    Enumeration(EnumerationId),
    Concept(ConceptId),
    Alias(AliasId),
    Module(ModuleId),
    Implementation(ImplementationId),
}

/// A module-like container: name maps split by casing, the in-order list
/// for deterministic iteration, and the enclosing environment.
#[derive(Debug, Default)]
pub struct Environment {
    pub lower: FxHashMap<StringId, LowerInfo>,
    pub upper: FxHashMap<StringId, UpperInfo>,
    pub in_order: Vec<DefinitionVariant>,
    pub parent: Option<EnvironmentId>,
    pub document: Option<DocumentId>,
}
