//! The unification engine.
//!
//! Type and mutability unification variables are two-state cells --
//! unsolved (with a kind) or solved with a type id -- held in `ena`
//! union-find tables. Variables are created during inference, solve
//! exactly once, and "flattening" a type id walks solved links to the
//! ultimate representative. A snapshot/rollback pair gives the
//! non-committing "peek" unification that method lookup relies on.

use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use rill_common::db::DocumentId;
use rill_common::diagnostic::Diagnostic;
use rill_common::intern::Interner;
use rill_common::span::Range;
use rustc_hash::FxHashMap;

use crate::hir::{
    HirArena, LocalMutabilityTag, LocalTypeTag, LocalVariableTag, MutabilityId,
    MutabilityVariableId, MutabilityVariant, TypeId, TypeVariableId, TypeVariant,
};

/// What a type variable may solve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeVariableKind {
    General,
    /// Unifies only with built-in integer types and other integral
    /// variables. Produced by integer literals.
    Integral,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeVariableValue {
    Unsolved { kind: TypeVariableKind },
    Solved { solution: TypeId },
}

impl UnifyValue for TypeVariableValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, NoError> {
        Ok(match (a, b) {
            (solved @ TypeVariableValue::Solved { .. }, _) => solved.clone(),
            (_, solved @ TypeVariableValue::Solved { .. }) => solved.clone(),
            (
                TypeVariableValue::Unsolved { kind: a },
                TypeVariableValue::Unsolved { kind: b },
            ) => {
                // Integral taints the joined class.
                let kind = if *a == TypeVariableKind::Integral || *b == TypeVariableKind::Integral
                {
                    TypeVariableKind::Integral
                } else {
                    TypeVariableKind::General
                };
                TypeVariableValue::Unsolved { kind }
            }
        })
    }
}

impl UnifyKey for TypeVariableId {
    type Value = TypeVariableValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TypeVariableId(u)
    }

    fn tag() -> &'static str {
        "TypeVariableId"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutabilityVariableValue {
    Unsolved,
    Solved { solution: MutabilityId },
}

impl UnifyValue for MutabilityVariableValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, NoError> {
        Ok(match (a, b) {
            (solved @ MutabilityVariableValue::Solved { .. }, _) => solved.clone(),
            (_, solved @ MutabilityVariableValue::Solved { .. }) => solved.clone(),
            _ => MutabilityVariableValue::Unsolved,
        })
    }
}

impl UnifyKey for MutabilityVariableId {
    type Value = MutabilityVariableValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        MutabilityVariableId(u)
    }

    fn tag() -> &'static str {
        "MutabilityVariableId"
    }
}

/// A reversible mark for peek unification.
pub struct PeekSnapshot {
    types: ena::unify::Snapshot<ena::unify::InPlace<TypeVariableId>>,
    mutabilities: ena::unify::Snapshot<ena::unify::InPlace<MutabilityVariableId>>,
    /// Rolling back retracts keys created since the snapshot, so the
    /// origins vector shrinks with them.
    type_variable_origins: usize,
    diagnostics: usize,
}

/// Per-document inference state: the unification tables, the fresh-tag
/// source, and the diagnostics the unifier produced.
pub struct InferenceState {
    pub document: DocumentId,
    types: InPlaceUnificationTable<TypeVariableId>,
    mutabilities: InPlaceUnificationTable<MutabilityVariableId>,
    /// Origin range of each type variable, indexed by its id. Used to
    /// place "type annotation required" diagnostics.
    type_variable_origins: Vec<Range>,
    /// Display names of enumerations this document's types mention,
    /// registered as they resolve.
    enumeration_names: FxHashMap<crate::symbol::EnumerationId, rill_common::intern::StringId>,
    /// Equivalence-class roots already reported as "type annotation
    /// required". On-demand resolution nests end-of-inference sweeps, so
    /// the set lives here rather than per sweep.
    reported_unsolved: rustc_hash::FxHashSet<TypeVariableId>,
    /// Monotone counter shared by every fresh local tag.
    next_tag: u32,
    pub diagnostics: Vec<Diagnostic>,
}

impl InferenceState {
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            types: InPlaceUnificationTable::new(),
            mutabilities: InPlaceUnificationTable::new(),
            type_variable_origins: Vec::new(),
            enumeration_names: FxHashMap::default(),
            reported_unsolved: rustc_hash::FxHashSet::default(),
            next_tag: 0,
            diagnostics: Vec::new(),
        }
    }

    // ── Fresh variables and tags ───────────────────────────────────────

    pub fn fresh_type_variable(
        &mut self,
        arena: &mut HirArena,
        kind: TypeVariableKind,
        range: Range,
    ) -> TypeId {
        let variable = self.types.new_key(TypeVariableValue::Unsolved { kind });
        debug_assert_eq!(variable.0 as usize, self.type_variable_origins.len());
        self.type_variable_origins.push(range);
        arena.alloc_type(TypeVariant::Variable(variable), range)
    }

    pub fn fresh_mutability_variable(
        &mut self,
        arena: &mut HirArena,
        range: Range,
    ) -> MutabilityId {
        let variable = self.mutabilities.new_key(MutabilityVariableValue::Unsolved);
        arena.alloc_mutability(MutabilityVariant::Variable(variable), range)
    }

    pub fn fresh_variable_tag(&mut self) -> LocalVariableTag {
        self.next_tag += 1;
        LocalVariableTag(self.next_tag)
    }

    pub fn fresh_type_tag(&mut self) -> LocalTypeTag {
        self.next_tag += 1;
        LocalTypeTag(self.next_tag)
    }

    pub fn fresh_mutability_tag(&mut self) -> LocalMutabilityTag {
        self.next_tag += 1;
        LocalMutabilityTag(self.next_tag)
    }

    pub fn type_variable_count(&self) -> u32 {
        self.type_variable_origins.len() as u32
    }

    /// Record an enumeration's display name for diagnostics.
    pub fn register_enumeration_name(
        &mut self,
        enumeration: crate::symbol::EnumerationId,
        name: rill_common::intern::StringId,
    ) {
        self.enumeration_names.insert(enumeration, name);
    }

    pub fn type_variable_origin(&self, variable: TypeVariableId) -> Range {
        self.type_variable_origins[variable.0 as usize]
    }

    /// Whether a variable is still unsolved (its equivalence class has no
    /// solution).
    pub fn is_unsolved(&mut self, variable: TypeVariableId) -> bool {
        matches!(self.types.probe_value(variable), TypeVariableValue::Unsolved { .. })
    }

    /// Root representative of a variable's equivalence class.
    pub fn root(&mut self, variable: TypeVariableId) -> TypeVariableId {
        self.types.find(variable)
    }

    /// Mark an unsolved root as reported. Returns `false` when a
    /// previous sweep already reported it.
    pub fn mark_reported(&mut self, root: TypeVariableId) -> bool {
        self.reported_unsolved.insert(root)
    }

    // ── Flattening ─────────────────────────────────────────────────────

    /// Walk `Solved` links to the ultimate representative of a type id.
    /// Unsolved variables flatten to themselves.
    pub fn flatten(&mut self, arena: &HirArena, id: TypeId) -> TypeId {
        let mut current = id;
        loop {
            let TypeVariant::Variable(variable) = arena.ty(current).variant else {
                return current;
            };
            match self.types.probe_value(variable) {
                TypeVariableValue::Solved { solution } => current = solution,
                TypeVariableValue::Unsolved { .. } => return current,
            }
        }
    }

    pub fn flatten_mutability(&mut self, arena: &HirArena, id: MutabilityId) -> MutabilityId {
        let mut current = id;
        loop {
            let MutabilityVariant::Variable(variable) = arena.mutability(current).variant else {
                return current;
            };
            match self.mutabilities.probe_value(variable) {
                MutabilityVariableValue::Solved { solution } => current = solution,
                MutabilityVariableValue::Unsolved => return current,
            }
        }
    }

    // ── Occurs check ───────────────────────────────────────────────────

    /// Whether `variable` occurs anywhere inside `ty`, walking element
    /// types of arrays, slices, references, pointers, tuples, function
    /// types, and enumeration template arguments.
    pub fn occurs_in(&mut self, arena: &HirArena, variable: TypeVariableId, ty: TypeId) -> bool {
        let ty = self.flatten(arena, ty);
        match arena.ty(ty).variant.clone() {
            TypeVariant::Variable(other) => self.types.unioned(variable, other),
            TypeVariant::Array { element, .. } => self.occurs_in(arena, variable, element),
            TypeVariant::Slice { element } => self.occurs_in(arena, variable, element),
            TypeVariant::Reference { referee, .. } => self.occurs_in(arena, variable, referee),
            TypeVariant::Pointer { pointee, .. } => self.occurs_in(arena, variable, pointee),
            TypeVariant::Tuple(elements) => elements
                .into_iter()
                .any(|element| self.occurs_in(arena, variable, element)),
            TypeVariant::Function { parameters, ret } => {
                self.occurs_in(arena, variable, ret)
                    || parameters
                        .into_iter()
                        .any(|parameter| self.occurs_in(arena, variable, parameter))
            }
            TypeVariant::Enumeration { template_arguments, .. } => template_arguments
                .into_iter()
                .any(|argument| self.occurs_in(arena, variable, argument)),
            TypeVariant::Error
            | TypeVariant::Integer(_)
            | TypeVariant::Floating
            | TypeVariant::Character
            | TypeVariant::Boolean
            | TypeVariant::String
            | TypeVariant::TemplateParameter { .. } => false,
        }
    }

    // ── Unification ────────────────────────────────────────────────────

    /// Unify two types. On mismatch a diagnostic is recorded and `false`
    /// returned; the caller gives the offending expression the error
    /// type and resolution continues.
    pub fn unify(
        &mut self,
        arena: &mut HirArena,
        interner: &Interner,
        a: TypeId,
        b: TypeId,
        range: Range,
    ) -> bool {
        let a = self.flatten(arena, a);
        let b = self.flatten(arena, b);
        let variant_a = arena.ty(a).variant.clone();
        let variant_b = arena.ty(b).variant.clone();

        match (variant_a, variant_b) {
            (TypeVariant::Variable(v1), TypeVariant::Variable(v2)) => {
                if !self.types.unioned(v1, v2) {
                    self.types
                        .unify_var_var(v1, v2)
                        .expect("joining two unsolved variables cannot fail");
                }
                true
            }

            (TypeVariant::Variable(variable), _) => {
                self.solve_variable(arena, interner, variable, b, range)
            }
            (_, TypeVariant::Variable(variable)) => {
                self.solve_variable(arena, interner, variable, a, range)
            }

            (TypeVariant::Error, _) | (_, TypeVariant::Error) => true,

            (TypeVariant::Integer(x), TypeVariant::Integer(y)) if x == y => true,
            (TypeVariant::Floating, TypeVariant::Floating) => true,
            (TypeVariant::Character, TypeVariant::Character) => true,
            (TypeVariant::Boolean, TypeVariant::Boolean) => true,
            (TypeVariant::String, TypeVariant::String) => true,

            (
                TypeVariant::Array { element: e1, length: l1 },
                TypeVariant::Array { element: e2, length: l2 },
            ) => {
                if let (Some(l1), Some(l2)) = (l1, l2) {
                    if l1 != l2 {
                        self.mismatch(arena, interner, a, b, range);
                        return false;
                    }
                }
                self.unify(arena, interner, e1, e2, range)
            }

            (TypeVariant::Slice { element: e1 }, TypeVariant::Slice { element: e2 }) => {
                self.unify(arena, interner, e1, e2, range)
            }

            (
                TypeVariant::Reference { referee: r1, mutability: m1 },
                TypeVariant::Reference { referee: r2, mutability: m2 },
            ) => {
                let mutability_ok = self.unify_mutability(arena, m1, m2, range);
                self.unify(arena, interner, r1, r2, range) && mutability_ok
            }

            (
                TypeVariant::Pointer { pointee: p1, mutability: m1 },
                TypeVariant::Pointer { pointee: p2, mutability: m2 },
            ) => {
                let mutability_ok = self.unify_mutability(arena, m1, m2, range);
                self.unify(arena, interner, p1, p2, range) && mutability_ok
            }

            (TypeVariant::Tuple(e1), TypeVariant::Tuple(e2)) => {
                if e1.len() != e2.len() {
                    self.mismatch(arena, interner, a, b, range);
                    return false;
                }
                let mut ok = true;
                for (x, y) in e1.into_iter().zip(e2) {
                    ok &= self.unify(arena, interner, x, y, range);
                }
                ok
            }

            (
                TypeVariant::Function { parameters: p1, ret: r1 },
                TypeVariant::Function { parameters: p2, ret: r2 },
            ) => {
                if p1.len() != p2.len() {
                    self.mismatch(arena, interner, a, b, range);
                    return false;
                }
                let mut ok = true;
                for (x, y) in p1.into_iter().zip(p2) {
                    ok &= self.unify(arena, interner, x, y, range);
                }
                ok & self.unify(arena, interner, r1, r2, range)
            }

            (
                TypeVariant::Enumeration { enumeration: id1, template_arguments: a1 },
                TypeVariant::Enumeration { enumeration: id2, template_arguments: a2 },
            ) => {
                if id1 != id2 || a1.len() != a2.len() {
                    self.mismatch(arena, interner, a, b, range);
                    return false;
                }
                let mut ok = true;
                for (x, y) in a1.into_iter().zip(a2) {
                    ok &= self.unify(arena, interner, x, y, range);
                }
                ok
            }

            (
                TypeVariant::TemplateParameter { tag: t1, .. },
                TypeVariant::TemplateParameter { tag: t2, .. },
            ) if t1 == t2 => true,

            _ => {
                self.mismatch(arena, interner, a, b, range);
                false
            }
        }
    }

    /// Solve an unsolved variable with a flattened non-variable type,
    /// enforcing the occurs check and the integral-kind restriction.
    fn solve_variable(
        &mut self,
        arena: &mut HirArena,
        interner: &Interner,
        variable: TypeVariableId,
        solution: TypeId,
        range: Range,
    ) -> bool {
        let kind = match self.types.probe_value(variable) {
            TypeVariableValue::Unsolved { kind } => kind,
            TypeVariableValue::Solved { .. } => {
                unreachable!("flattening never exposes a solved variable")
            }
        };

        if kind == TypeVariableKind::Integral
            && !matches!(
                arena.ty(solution).variant,
                TypeVariant::Integer(_) | TypeVariant::Error
            )
        {
            let found = self.type_string(arena, interner, solution);
            self.diagnostics.push(Diagnostic::error(
                format!("expected an integer type, found {found}"),
                range,
            ));
            self.solve_with_error(arena, variable, range);
            return false;
        }

        if self.occurs_in(arena, variable, solution) {
            let found = self.type_string(arena, interner, solution);
            self.diagnostics.push(Diagnostic::error(
                format!("cannot construct the infinite type {found}"),
                range,
            ));
            self.solve_with_error(arena, variable, range);
            return false;
        }

        self.types
            .unify_var_value(variable, TypeVariableValue::Solved { solution })
            .expect("solving an unsolved variable cannot fail");
        true
    }

    /// Poison a variable with the error type after a failed solve.
    fn solve_with_error(&mut self, arena: &mut HirArena, variable: TypeVariableId, range: Range) {
        let error = arena.alloc_type(TypeVariant::Error, range);
        self.types
            .unify_var_value(variable, TypeVariableValue::Solved { solution: error })
            .expect("poisoning an unsolved variable cannot fail");
    }

    fn mismatch(
        &mut self,
        arena: &mut HirArena,
        interner: &Interner,
        a: TypeId,
        b: TypeId,
        range: Range,
    ) {
        let expected = self.type_string(arena, interner, a);
        let found = self.type_string(arena, interner, b);
        self.diagnostics.push(Diagnostic::error(
            format!("mismatched types: expected {expected}, found {found}"),
            range,
        ));
    }

    /// Unify two mutabilities.
    pub fn unify_mutability(
        &mut self,
        arena: &mut HirArena,
        a: MutabilityId,
        b: MutabilityId,
        range: Range,
    ) -> bool {
        let a = self.flatten_mutability(arena, a);
        let b = self.flatten_mutability(arena, b);
        let variant_a = arena.mutability(a).variant.clone();
        let variant_b = arena.mutability(b).variant.clone();

        match (variant_a, variant_b) {
            (MutabilityVariant::Variable(v1), MutabilityVariant::Variable(v2)) => {
                if !self.mutabilities.unioned(v1, v2) {
                    self.mutabilities
                        .unify_var_var(v1, v2)
                        .expect("joining two unsolved variables cannot fail");
                }
                true
            }
            (MutabilityVariant::Variable(variable), _) => {
                self.mutabilities
                    .unify_var_value(variable, MutabilityVariableValue::Solved { solution: b })
                    .expect("solving an unsolved variable cannot fail");
                true
            }
            (_, MutabilityVariant::Variable(variable)) => {
                self.mutabilities
                    .unify_var_value(variable, MutabilityVariableValue::Solved { solution: a })
                    .expect("solving an unsolved variable cannot fail");
                true
            }
            (MutabilityVariant::Error, _) | (_, MutabilityVariant::Error) => true,
            (
                MutabilityVariant::Constant { is_mutable: x },
                MutabilityVariant::Constant { is_mutable: y },
            ) => {
                if x == y {
                    true
                } else {
                    self.diagnostics.push(Diagnostic::error(
                        format!(
                            "mutability mismatch: expected {}, found {}",
                            if x { "mut" } else { "immut" },
                            if y { "mut" } else { "immut" },
                        ),
                        range,
                    ));
                    false
                }
            }
            (
                MutabilityVariant::Parameterized { tag: t1, .. },
                MutabilityVariant::Parameterized { tag: t2, .. },
            ) if t1 == t2 => true,
            _ => {
                self.diagnostics
                    .push(Diagnostic::error("mutability mismatch", range));
                false
            }
        }
    }

    // ── Peek unification ───────────────────────────────────────────────

    /// Start a reversible unification. Method lookup probes candidate
    /// self types this way without committing anything on the caller.
    pub fn peek(&mut self) -> PeekSnapshot {
        PeekSnapshot {
            types: self.types.snapshot(),
            mutabilities: self.mutabilities.snapshot(),
            type_variable_origins: self.type_variable_origins.len(),
            diagnostics: self.diagnostics.len(),
        }
    }

    pub fn rollback(&mut self, snapshot: PeekSnapshot) {
        self.types.rollback_to(snapshot.types);
        self.mutabilities.rollback_to(snapshot.mutabilities);
        self.type_variable_origins
            .truncate(snapshot.type_variable_origins);
        self.diagnostics.truncate(snapshot.diagnostics);
    }

    pub fn commit(&mut self, snapshot: PeekSnapshot) {
        self.types.commit(snapshot.types);
        self.mutabilities.commit(snapshot.mutabilities);
    }

    // ── Instantiation ──────────────────────────────────────────────────

    /// Replace template parameter references with the mapped types,
    /// rebuilding compound nodes as needed. Used when a generic
    /// definition is referenced.
    pub fn instantiate(
        &mut self,
        arena: &mut HirArena,
        substitution: &FxHashMap<LocalTypeTag, TypeId>,
        id: TypeId,
    ) -> TypeId {
        self.instantiate_with(arena, substitution, &FxHashMap::default(), id)
    }

    /// [`instantiate`](Self::instantiate), additionally substituting
    /// mutability template parameters.
    pub fn instantiate_with(
        &mut self,
        arena: &mut HirArena,
        substitution: &FxHashMap<LocalTypeTag, TypeId>,
        mutability_substitution: &FxHashMap<LocalMutabilityTag, MutabilityId>,
        id: TypeId,
    ) -> TypeId {
        if substitution.is_empty() && mutability_substitution.is_empty() {
            return id;
        }
        let id = self.flatten(arena, id);
        let range = arena.ty(id).range;
        let substitute_mutability = |arena: &HirArena, mutability: MutabilityId| {
            match arena.mutability(mutability).variant {
                MutabilityVariant::Parameterized { tag, .. } => mutability_substitution
                    .get(&tag)
                    .copied()
                    .unwrap_or(mutability),
                _ => mutability,
            }
        };
        match arena.ty(id).variant.clone() {
            TypeVariant::TemplateParameter { tag, .. } => {
                substitution.get(&tag).copied().unwrap_or(id)
            }
            TypeVariant::Array { element, length } => {
                let element =
                    self.instantiate_with(arena, substitution, mutability_substitution, element);
                arena.alloc_type(TypeVariant::Array { element, length }, range)
            }
            TypeVariant::Slice { element } => {
                let element =
                    self.instantiate_with(arena, substitution, mutability_substitution, element);
                arena.alloc_type(TypeVariant::Slice { element }, range)
            }
            TypeVariant::Reference { referee, mutability } => {
                let referee =
                    self.instantiate_with(arena, substitution, mutability_substitution, referee);
                let mutability = substitute_mutability(arena, mutability);
                arena.alloc_type(TypeVariant::Reference { referee, mutability }, range)
            }
            TypeVariant::Pointer { pointee, mutability } => {
                let pointee =
                    self.instantiate_with(arena, substitution, mutability_substitution, pointee);
                let mutability = substitute_mutability(arena, mutability);
                arena.alloc_type(TypeVariant::Pointer { pointee, mutability }, range)
            }
            TypeVariant::Tuple(elements) => {
                let elements = elements
                    .into_iter()
                    .map(|element| {
                        self.instantiate_with(arena, substitution, mutability_substitution, element)
                    })
                    .collect();
                arena.alloc_type(TypeVariant::Tuple(elements), range)
            }
            TypeVariant::Function { parameters, ret } => {
                let parameters = parameters
                    .into_iter()
                    .map(|parameter| {
                        self.instantiate_with(arena, substitution, mutability_substitution, parameter)
                    })
                    .collect();
                let ret = self.instantiate_with(arena, substitution, mutability_substitution, ret);
                arena.alloc_type(TypeVariant::Function { parameters, ret }, range)
            }
            TypeVariant::Enumeration { enumeration, template_arguments } => {
                let template_arguments = template_arguments
                    .into_iter()
                    .map(|argument| {
                        self.instantiate_with(arena, substitution, mutability_substitution, argument)
                    })
                    .collect();
                arena.alloc_type(
                    TypeVariant::Enumeration { enumeration, template_arguments },
                    range,
                )
            }
            TypeVariant::Error
            | TypeVariant::Integer(_)
            | TypeVariant::Floating
            | TypeVariant::Character
            | TypeVariant::Boolean
            | TypeVariant::String
            | TypeVariant::Variable(_) => id,
        }
    }

    // ── Display ────────────────────────────────────────────────────────

    /// Render a type for diagnostics, flattening as it goes.
    pub fn type_string(&mut self, arena: &HirArena, interner: &Interner, id: TypeId) -> String {
        let id = self.flatten(arena, id);
        match arena.ty(id).variant.clone() {
            TypeVariant::Error => "<error>".into(),
            TypeVariant::Integer(integer) => integer.name().into(),
            TypeVariant::Floating => "Float".into(),
            TypeVariant::Character => "Char".into(),
            TypeVariant::Boolean => "Bool".into(),
            TypeVariant::String => "String".into(),
            TypeVariant::Array { element, length } => {
                let element = self.type_string(arena, interner, element);
                match length {
                    Some(length) => format!("[{element}; {length}]"),
                    None => format!("[{element}; _]"),
                }
            }
            TypeVariant::Slice { element } => {
                format!("[{}]", self.type_string(arena, interner, element))
            }
            TypeVariant::Reference { referee, .. } => {
                format!("&{}", self.type_string(arena, interner, referee))
            }
            TypeVariant::Pointer { pointee, .. } => {
                format!("*{}", self.type_string(arena, interner, pointee))
            }
            TypeVariant::Tuple(elements) => {
                let elements: Vec<_> = elements
                    .into_iter()
                    .map(|element| self.type_string(arena, interner, element))
                    .collect();
                format!("({})", elements.join(", "))
            }
            TypeVariant::Function { parameters, ret } => {
                let parameters: Vec<_> = parameters
                    .into_iter()
                    .map(|parameter| self.type_string(arena, interner, parameter))
                    .collect();
                let ret = self.type_string(arena, interner, ret);
                format!("fn({}): {}", parameters.join(", "), ret)
            }
            TypeVariant::Enumeration { enumeration, template_arguments } => {
                let name = match self.enumeration_names.get(&enumeration) {
                    Some(&name) => interner.lookup(name).to_owned(),
                    None => "<enumeration>".to_owned(),
                };
                if template_arguments.is_empty() {
                    name
                } else {
                    let arguments: Vec<_> = template_arguments
                        .into_iter()
                        .map(|argument| self.type_string(arena, interner, argument))
                        .collect();
                    format!("{name}[{}]", arguments.join(", "))
                }
            }
            TypeVariant::TemplateParameter { name, .. } => interner.lookup(name).into(),
            TypeVariant::Variable(variable) => match self.types.probe_value(variable) {
                TypeVariableValue::Unsolved { kind: TypeVariableKind::Integral } => {
                    "{integer}".into()
                }
                _ => "_".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_common::span::Position;

    fn range() -> Range {
        Range::at(Position::new(0, 0))
    }

    fn state() -> (InferenceState, HirArena, Interner) {
        (
            InferenceState::new(DocumentId(0)),
            HirArena::new(),
            Interner::new(),
        )
    }

    #[test]
    fn unify_variable_with_concrete() {
        let (mut state, mut arena, interner) = state();
        let variable = state.fresh_type_variable(&mut arena, TypeVariableKind::General, range());
        let boolean = arena.alloc_type(TypeVariant::Boolean, range());

        assert!(state.unify(&mut arena, &interner, variable, boolean, range()));
        let flattened = state.flatten(&arena, variable);
        assert_eq!(arena.ty(flattened).variant, TypeVariant::Boolean);
    }

    #[test]
    fn unify_two_variables_then_solve() {
        let (mut state, mut arena, interner) = state();
        let a = state.fresh_type_variable(&mut arena, TypeVariableKind::General, range());
        let b = state.fresh_type_variable(&mut arena, TypeVariableKind::General, range());
        assert!(state.unify(&mut arena, &interner, a, b, range()));

        let string = arena.alloc_type(TypeVariant::String, range());
        assert!(state.unify(&mut arena, &interner, a, string, range()));

        let flattened = state.flatten(&arena, b);
        assert_eq!(arena.ty(flattened).variant, TypeVariant::String);
    }

    #[test]
    fn unify_mismatch_reports_and_continues() {
        let (mut state, mut arena, interner) = state();
        let boolean = arena.alloc_type(TypeVariant::Boolean, range());
        let string = arena.alloc_type(TypeVariant::String, range());

        assert!(!state.unify(&mut arena, &interner, boolean, string, range()));
        assert_eq!(state.diagnostics.len(), 1);
        assert!(state.diagnostics[0]
            .message
            .contains("mismatched types: expected Bool, found String"));
    }

    #[test]
    fn integral_variable_rejects_non_integer() {
        let (mut state, mut arena, interner) = state();
        let variable = state.fresh_type_variable(&mut arena, TypeVariableKind::Integral, range());
        let boolean = arena.alloc_type(TypeVariant::Boolean, range());

        assert!(!state.unify(&mut arena, &interner, variable, boolean, range()));
        assert!(state.diagnostics[0].message.contains("expected an integer type"));

        // The variable is poisoned with the error type.
        let flattened = state.flatten(&arena, variable);
        assert_eq!(arena.ty(flattened).variant, TypeVariant::Error);
    }

    #[test]
    fn integral_variable_accepts_integer() {
        let (mut state, mut arena, interner) = state();
        let variable = state.fresh_type_variable(&mut arena, TypeVariableKind::Integral, range());
        let i32_type = arena.alloc_type(
            TypeVariant::Integer(crate::hir::IntegerType::I32),
            range(),
        );
        assert!(state.unify(&mut arena, &interner, variable, i32_type, range()));
    }

    #[test]
    fn occurs_check_solves_with_error_type() {
        let (mut state, mut arena, interner) = state();
        let variable = state.fresh_type_variable(&mut arena, TypeVariableKind::General, range());
        let tuple = arena.alloc_type(TypeVariant::Tuple(vec![variable]), range());

        assert!(!state.unify(&mut arena, &interner, variable, tuple, range()));
        assert!(state.diagnostics[0].message.contains("infinite type"));

        let flattened = state.flatten(&arena, variable);
        assert_eq!(arena.ty(flattened).variant, TypeVariant::Error);
    }

    #[test]
    fn peek_unification_rolls_back() {
        let (mut state, mut arena, interner) = state();
        let variable = state.fresh_type_variable(&mut arena, TypeVariableKind::General, range());
        let boolean = arena.alloc_type(TypeVariant::Boolean, range());

        let snapshot = state.peek();
        assert!(state.unify(&mut arena, &interner, variable, boolean, range()));
        state.rollback(snapshot);

        // The variable is unsolved again.
        let flattened = state.flatten(&arena, variable);
        assert!(matches!(arena.ty(flattened).variant, TypeVariant::Variable(_)));
    }

    #[test]
    fn template_parameters_are_not_variables() {
        let (mut state, mut arena, mut interner) = state();
        let name = interner.intern("T");
        let tag = state.fresh_type_tag();
        let parameter =
            arena.alloc_type(TypeVariant::TemplateParameter { tag, name }, range());
        let boolean = arena.alloc_type(TypeVariant::Boolean, range());

        // A template parameter unifies only with itself.
        assert!(state.unify(&mut arena, &interner, parameter, parameter, range()));
        assert!(!state.unify(&mut arena, &interner, parameter, boolean, range()));
    }

    #[test]
    fn instantiate_substitutes_template_parameters() {
        let (mut state, mut arena, mut interner) = state();
        let name = interner.intern("T");
        let tag = state.fresh_type_tag();
        let parameter =
            arena.alloc_type(TypeVariant::TemplateParameter { tag, name }, range());
        let tuple = arena.alloc_type(TypeVariant::Tuple(vec![parameter, parameter]), range());

        let boolean = arena.alloc_type(TypeVariant::Boolean, range());
        let mut substitution = FxHashMap::default();
        substitution.insert(tag, boolean);

        let instantiated = state.instantiate(&mut arena, &substitution, tuple);
        let TypeVariant::Tuple(elements) = arena.ty(instantiated).variant.clone() else {
            panic!("expected a tuple");
        };
        assert_eq!(arena.ty(elements[0]).variant, TypeVariant::Boolean);
        assert_eq!(arena.ty(elements[1]).variant, TypeVariant::Boolean);
    }
}
