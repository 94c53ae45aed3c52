//! The abstract syntax tree.
//!
//! Arena-allocated: nodes refer to children by typed indices into
//! append-only vectors, never by pointer. Syntactic sugar is gone by the
//! time a node lands here -- no `elif`, no `while`, no `discard`, no
//! implicit tuple bindings -- but every node keeps the source range of
//! the construct it came from, so diagnostics in later phases point at
//! real code.

use rill_common::intern::StringId;
use rill_common::span::Range;

/// Index of an expression in the AST arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpressionId(pub u32);

/// Index of a pattern in the AST arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub u32);

/// Index of a type in the AST arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Append-only storage for one document's AST. Ids are stable for the
/// arena's lifetime.
#[derive(Debug, Default)]
pub struct AstArena {
    expressions: Vec<Expression>,
    patterns: Vec<Pattern>,
    types: Vec<Type>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expression(&mut self, expression: Expression) -> ExpressionId {
        let id = ExpressionId(self.expressions.len() as u32);
        self.expressions.push(expression);
        id
    }

    pub fn alloc_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId(self.patterns.len() as u32);
        self.patterns.push(pattern);
        id
    }

    pub fn alloc_type(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn expression(&self, id: ExpressionId) -> &Expression {
        &self.expressions[id.0 as usize]
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.0 as usize]
    }

    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }
}

/// An identifier with its casing and range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name {
    pub id: StringId,
    pub is_upper: bool,
    pub range: Range,
}

/// Concrete or parameterized mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutabilityKind {
    /// `mut` or `immut` (the default when unwritten).
    Constant { is_mutable: bool },
    /// A mutability template parameter mentioned by name.
    Parameterized(Name),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutability {
    pub kind: MutabilityKind,
    pub range: Range,
}

/// A `::`-separated path, optionally rooted at `global` or a `typeof`.
#[derive(Debug, Clone)]
pub struct Path {
    pub is_global: bool,
    pub typeof_root: Option<ExpressionId>,
    pub segments: Vec<PathSegment>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct PathSegment {
    pub name: Name,
    pub template_arguments: Option<Vec<TemplateArgument>>,
}

#[derive(Debug, Clone)]
pub enum TemplateArgument {
    Type(TypeId),
    Mutability(Mutability),
}

// ── Expressions ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: PatternId,
    pub expression: ExpressionId,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    /// Produced for unparseable or unsupported constructs; a diagnostic
    /// has already been emitted.
    Error,
    IntegerLiteral(u64),
    FloatingLiteral(f64),
    BooleanLiteral(bool),
    StringLiteral(StringId),
    CharacterLiteral(char),
    Path(Path),
    /// `()` is the empty tuple.
    Tuple(Vec<ExpressionId>),
    Array(Vec<ExpressionId>),
    Block {
        statements: Vec<ExpressionId>,
        result: ExpressionId,
    },
    /// `if` with both branches present; the desugarer supplies a unit
    /// else-branch when the source omitted it.
    Conditional {
        condition: ExpressionId,
        true_branch: ExpressionId,
        false_branch: ExpressionId,
    },
    Match {
        scrutinee: ExpressionId,
        arms: Vec<MatchArm>,
    },
    Loop {
        body: ExpressionId,
    },
    Break {
        value: ExpressionId,
    },
    Continue,
    Ret {
        value: Option<ExpressionId>,
    },
    Call {
        callee: ExpressionId,
        arguments: Vec<ExpressionId>,
    },
    /// `receiver.name(args)`; the callee is resolved during inference
    /// against the receiver's type.
    MethodCall {
        receiver: ExpressionId,
        name: Name,
        template_arguments: Option<Vec<TemplateArgument>>,
        arguments: Vec<ExpressionId>,
    },
    FieldAccess {
        receiver: ExpressionId,
        name: Name,
    },
    TupleFieldAccess {
        receiver: ExpressionId,
        index: u32,
        index_range: Range,
    },
    IndexAccess {
        receiver: ExpressionId,
        index: ExpressionId,
    },
    StructInitializer {
        path: Path,
        fields: Vec<(Name, ExpressionId)>,
    },
    /// One application of a binary operator; chains have been shaped into
    /// left-associative trees by precedence class.
    BinaryOperatorInvocation {
        operator: Name,
        left: ExpressionId,
        right: ExpressionId,
    },
    Reference {
        mutability: Mutability,
        operand: ExpressionId,
    },
    Dereference {
        operand: ExpressionId,
    },
    Cast {
        operand: ExpressionId,
        target: TypeId,
    },
    Ascription {
        operand: ExpressionId,
        ascribed: TypeId,
    },
    Sizeof {
        inspected: TypeId,
    },
    Let {
        pattern: PatternId,
        annotation: Option<TypeId>,
        initializer: ExpressionId,
    },
}

// ── Patterns ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub range: Range,
}

/// The path of a constructor pattern: a full path or the abbreviated
/// `::ctor` form resolved against the matched type.
#[derive(Debug, Clone)]
pub enum ConstructorPath {
    Full(Path),
    Abbreviated(Name),
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    Wildcard,
    Name {
        name: Name,
        mutability: Mutability,
    },
    IntegerLiteral(u64),
    FloatingLiteral(f64),
    BooleanLiteral(bool),
    StringLiteral(StringId),
    CharacterLiteral(char),
    Tuple(Vec<PatternId>),
    Constructor {
        path: ConstructorPath,
        arguments: Vec<PatternId>,
    },
    Slice(Vec<PatternId>),
    Alias {
        pattern: PatternId,
        name: Name,
        mutability: Mutability,
    },
    Guarded {
        pattern: PatternId,
        guard: ExpressionId,
    },
}

// ── Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Type {
    pub kind: TypeKind,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Produced for unparseable types; resolves to the error type.
    Error,
    /// `_`, standing for a fresh inference variable.
    Wildcard,
    Path(Path),
    Tuple(Vec<TypeId>),
    Slice {
        element: TypeId,
    },
    Array {
        element: TypeId,
        length: ExpressionId,
    },
    Function {
        parameters: Vec<TypeId>,
        ret: TypeId,
    },
    Reference {
        mutability: Mutability,
        referee: TypeId,
    },
    Pointer {
        mutability: Mutability,
        pointee: TypeId,
    },
    Typeof {
        inspected: ExpressionId,
    },
}

// ── Definitions ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum TemplateParameterKind {
    Type { bounds: Vec<Path> },
    Mutability,
}

#[derive(Debug, Clone)]
pub struct TemplateParameter {
    pub name: Name,
    pub kind: TemplateParameterKind,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Name,
    pub is_mutable: bool,
    pub annotation: Option<TypeId>,
    pub default: Option<ExpressionId>,
}

/// A function definition with its body normalized to block form.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeId>,
    pub body: ExpressionId,
    pub range: Range,
}

/// A body-less function signature inside a concept.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeId>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub enum ConstructorBody {
    Unit,
    Tuple(Vec<TypeId>),
    Struct(Vec<(Name, TypeId)>),
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: Name,
    pub body: ConstructorBody,
}

/// An enumeration. `struct` definitions desugar to an enumeration with a
/// single struct-bodied constructor of the same name (lower-cased
/// spelling aside, field access keys on this shape).
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub constructors: Vec<Constructor>,
    pub is_struct: bool,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Concept {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub signatures: Vec<FunctionSignature>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Alias {
    pub name: Name,
    pub template_parameters: Vec<TemplateParameter>,
    pub aliased: TypeId,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct Implementation {
    pub template_parameters: Vec<TemplateParameter>,
    pub self_type: TypeId,
    pub functions: Vec<Function>,
    pub range: Range,
}
