//! The high-level IR.
//!
//! Every expression, pattern, and type carries a `TypeId` and a `Range`.
//! Paths have been resolved to definition ids, every local binding has a
//! fresh tag so shadowed names stay distinct, and unification variables
//! appear only while inference is running -- a finished definition
//! flattens to concrete types or template parameter references.

use rill_common::intern::StringId;
use rill_common::span::Range;

use crate::symbol::{EnumerationId, FunctionId};

/// Index of an expression in the HIR arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpressionId(pub u32);

/// Index of a pattern in the HIR arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub u32);

/// Index of a type in the HIR arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// Index of a mutability in the HIR arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutabilityId(pub u32);

/// Tag distinguishing a local variable binding from any shadowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalVariableTag(pub u32);

/// Tag of a local type binding (a template parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalTypeTag(pub u32);

/// Tag of a local mutability binding (a mutability template parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalMutabilityTag(pub u32);

/// A type unification variable; the cell itself lives in the inference
/// state's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVariableId(pub u32);

/// A mutability unification variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutabilityVariableId(pub u32);

/// The built-in integer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntegerType {
    pub fn name(self) -> &'static str {
        match self {
            IntegerType::I8 => "I8",
            IntegerType::I16 => "I16",
            IntegerType::I32 => "I32",
            IntegerType::I64 => "I64",
            IntegerType::U8 => "U8",
            IntegerType::U16 => "U16",
            IntegerType::U32 => "U32",
            IntegerType::U64 => "U64",
        }
    }

    pub fn from_name(name: &str) -> Option<IntegerType> {
        match name {
            "I8" => Some(IntegerType::I8),
            "I16" => Some(IntegerType::I16),
            "I32" => Some(IntegerType::I32),
            "I64" => Some(IntegerType::I64),
            "U8" => Some(IntegerType::U8),
            "U16" => Some(IntegerType::U16),
            "U32" => Some(IntegerType::U32),
            "U64" => Some(IntegerType::U64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeVariant {
    /// Poison type: unifies with everything silently.
    Error,
    Integer(IntegerType),
    Floating,
    Character,
    Boolean,
    String,
    /// `[T; n]`. The length is `None` when it could not be evaluated to
    /// a constant; unknown lengths unify with anything.
    Array {
        element: TypeId,
        length: Option<u64>,
    },
    Slice {
        element: TypeId,
    },
    Reference {
        referee: TypeId,
        mutability: MutabilityId,
    },
    Pointer {
        pointee: TypeId,
        mutability: MutabilityId,
    },
    /// `()` is the empty tuple.
    Tuple(Vec<TypeId>),
    Function {
        parameters: Vec<TypeId>,
        ret: TypeId,
    },
    Enumeration {
        enumeration: EnumerationId,
        template_arguments: Vec<TypeId>,
    },
    /// A named template parameter; never solved, only substituted on
    /// instantiation.
    TemplateParameter {
        tag: LocalTypeTag,
        name: StringId,
    },
    Variable(TypeVariableId),
}

#[derive(Debug, Clone)]
pub struct Type {
    pub variant: TypeVariant,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutabilityVariant {
    Error,
    Constant { is_mutable: bool },
    Parameterized { tag: LocalMutabilityTag, name: StringId },
    Variable(MutabilityVariableId),
}

#[derive(Debug, Clone)]
pub struct Mutability {
    pub variant: MutabilityVariant,
    pub range: Range,
}

// ── Expressions ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub ty: TypeId,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
    pub pattern: PatternId,
    pub expression: ExpressionId,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Error,
    IntegerLiteral(u64),
    FloatingLiteral(f64),
    BooleanLiteral(bool),
    StringLiteral(StringId),
    CharacterLiteral(char),
    Tuple(Vec<ExpressionId>),
    Array(Vec<ExpressionId>),
    Block {
        statements: Vec<ExpressionId>,
        result: ExpressionId,
    },
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
    /// A reference to a local, disambiguated from shadowing by its tag.
    LocalVariableReference {
        tag: LocalVariableTag,
        name: StringId,
    },
    FunctionReference {
        function: FunctionId,
    },
    /// An enumeration constructor used as a value or callee.
    ConstructorReference {
        enumeration: EnumerationId,
        constructor: usize,
    },
    Call {
        callee: ExpressionId,
        arguments: Vec<ExpressionId>,
    },
    /// A struct build with field values in declaration order.
    StructInitializer {
        enumeration: EnumerationId,
        fields: Vec<ExpressionId>,
    },
    FieldAccess {
        receiver: ExpressionId,
        field: usize,
    },
    TupleFieldAccess {
        receiver: ExpressionId,
        index: u32,
    },
    IndexAccess {
        receiver: ExpressionId,
        index: ExpressionId,
    },
    Reference {
        mutability: MutabilityId,
        operand: ExpressionId,
    },
    Dereference {
        operand: ExpressionId,
    },
    /// An unchecked conversion; the node's type is the cast target.
    Cast {
        operand: ExpressionId,
    },
    Sizeof {
        inspected: TypeId,
    },
    Let {
        pattern: PatternId,
        initializer: ExpressionId,
    },
}

// ── Patterns ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Pattern {
    pub kind: PatternKind,
    pub ty: TypeId,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    Error,
    Wildcard,
    Binding {
        name: StringId,
        tag: LocalVariableTag,
        mutability: MutabilityId,
    },
    IntegerLiteral(u64),
    FloatingLiteral(f64),
    BooleanLiteral(bool),
    StringLiteral(StringId),
    CharacterLiteral(char),
    Tuple(Vec<PatternId>),
    Constructor {
        enumeration: EnumerationId,
        constructor: usize,
        arguments: Vec<PatternId>,
    },
    Slice(Vec<PatternId>),
    Alias {
        pattern: PatternId,
        name: StringId,
        tag: LocalVariableTag,
        mutability: MutabilityId,
    },
    Guarded {
        pattern: PatternId,
        guard: ExpressionId,
    },
}

// ── Arena ──────────────────────────────────────────────────────────────

/// Append-only storage for one document's HIR. Ids are never
/// invalidated; unification cells live in the inference state, not here.
#[derive(Debug, Default)]
pub struct HirArena {
    expressions: Vec<Expression>,
    patterns: Vec<Pattern>,
    types: Vec<Type>,
    mutabilities: Vec<Mutability>,
}

impl HirArena {
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

    pub fn alloc_type(&mut self, variant: TypeVariant, range: Range) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(Type { variant, range });
        id
    }

    pub fn alloc_mutability(&mut self, variant: MutabilityVariant, range: Range) -> MutabilityId {
        let id = MutabilityId(self.mutabilities.len() as u32);
        self.mutabilities.push(Mutability { variant, range });
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

    pub fn mutability(&self, id: MutabilityId) -> &Mutability {
        &self.mutabilities[id.0 as usize]
    }

    pub fn expression_count(&self) -> usize {
        self.expressions.len()
    }
}
