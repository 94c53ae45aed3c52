//! Lexical scopes.
//!
//! A scope is the body-local counterpart of an environment: ordered
//! binding maps for local variables, local types (template parameters),
//! and local mutabilities, organized as a stack of frames. Lookups walk
//! the frames innermost-first; the resolver falls back to the
//! environment chain when a name is not bound here.
//!
//! Frames are transient: one is pushed per block or signature, and
//! popping it reports the unused bindings it held. Bindings whose name
//! starts with `_` are born used.

use rill_common::diagnostic::{Diagnostic, DiagnosticTag};
use rill_common::intern::{Interner, StringId};
use rill_common::span::Range;

use crate::hir::{
    LocalMutabilityTag, LocalTypeTag, LocalVariableTag, MutabilityId, TypeId,
};

#[derive(Debug, Clone)]
pub struct VariableBind {
    pub name: StringId,
    pub range: Range,
    pub ty: TypeId,
    pub mutability: MutabilityId,
    pub tag: LocalVariableTag,
    pub used: bool,
}

#[derive(Debug, Clone)]
pub struct TypeBind {
    pub name: StringId,
    pub range: Range,
    pub ty: TypeId,
    pub tag: LocalTypeTag,
    pub used: bool,
}

#[derive(Debug, Clone)]
pub struct MutabilityBind {
    pub name: StringId,
    pub range: Range,
    pub mutability: MutabilityId,
    pub tag: LocalMutabilityTag,
    pub used: bool,
}

/// One lexical frame. Bindings are kept in insertion order so unused
/// warnings come out deterministically.
#[derive(Debug, Default)]
struct Frame {
    variables: Vec<VariableBind>,
    types: Vec<TypeBind>,
    mutabilities: Vec<MutabilityBind>,
}

/// A stack of frames forming the scope chain of one signature or body.
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Scope {
    /// A scope with one root frame.
    pub fn new() -> Self {
        Scope { frames: vec![Frame::default()] }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost frame, reporting a warning for each binding that
    /// was never mentioned.
    pub fn pop_frame(&mut self, interner: &Interner, diagnostics: &mut Vec<Diagnostic>) {
        let frame = self.frames.pop().expect("scope must have a frame to pop");
        for bind in &frame.variables {
            if !bind.used {
                unused_warning(interner, diagnostics, "variable", bind.name, bind.range);
            }
        }
        for bind in &frame.types {
            if !bind.used {
                unused_warning(interner, diagnostics, "type binding", bind.name, bind.range);
            }
        }
        for bind in &frame.mutabilities {
            if !bind.used {
                unused_warning(interner, diagnostics, "mutability binding", bind.name, bind.range);
            }
        }
    }

    // ── Binding ────────────────────────────────────────────────────────

    /// Bind a variable in the innermost frame. Rebinding shadows; a name
    /// starting with `_` is marked used up front so it never warns.
    pub fn bind_variable(&mut self, interner: &Interner, mut bind: VariableBind) {
        bind.used |= interner.lookup(bind.name).starts_with('_');
        self.frames
            .last_mut()
            .expect("scope must have a frame")
            .variables
            .push(bind);
    }

    pub fn bind_type(&mut self, interner: &Interner, mut bind: TypeBind) {
        bind.used |= interner.lookup(bind.name).starts_with('_');
        self.frames
            .last_mut()
            .expect("scope must have a frame")
            .types
            .push(bind);
    }

    pub fn bind_mutability(&mut self, interner: &Interner, mut bind: MutabilityBind) {
        bind.used |= interner.lookup(bind.name).starts_with('_');
        self.frames
            .last_mut()
            .expect("scope must have a frame")
            .mutabilities
            .push(bind);
    }

    // ── Lookup ─────────────────────────────────────────────────────────

    /// Find a variable, innermost binding first, marking it used.
    pub fn find_variable(&mut self, name: StringId) -> Option<&VariableBind> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(bind) = frame.variables.iter_mut().rev().find(|bind| bind.name == name) {
                bind.used = true;
                return Some(&*bind);
            }
        }
        None
    }

    pub fn find_type(&mut self, name: StringId) -> Option<&TypeBind> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(bind) = frame.types.iter_mut().rev().find(|bind| bind.name == name) {
                bind.used = true;
                return Some(&*bind);
            }
        }
        None
    }

    pub fn find_mutability(&mut self, name: StringId) -> Option<&MutabilityBind> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(bind) = frame.mutabilities.iter_mut().rev().find(|bind| bind.name == name)
            {
                bind.used = true;
                return Some(&*bind);
            }
        }
        None
    }
}

fn unused_warning(
    interner: &Interner,
    diagnostics: &mut Vec<Diagnostic>,
    description: &str,
    name: StringId,
    range: Range,
) {
    let name = interner.lookup(name);
    diagnostics.push(
        Diagnostic::warning(
            format!("unused {description} `{name}`; prefix it with an underscore to silence"),
            range,
        )
        .with_tag(DiagnosticTag::Unnecessary),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_common::span::Position;

    fn bind(name: StringId) -> VariableBind {
        VariableBind {
            name,
            range: Range::at(Position::new(0, 0)),
            ty: TypeId(0),
            mutability: MutabilityId(0),
            tag: LocalVariableTag(0),
            used: false,
        }
    }

    #[test]
    fn shadowing_finds_innermost() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut scope = Scope::new();

        let mut outer = bind(x);
        outer.tag = LocalVariableTag(1);
        scope.bind_variable(&interner, outer);

        scope.push_frame();
        let mut inner = bind(x);
        inner.tag = LocalVariableTag(2);
        scope.bind_variable(&interner, inner);

        assert_eq!(scope.find_variable(x).unwrap().tag, LocalVariableTag(2));

        let mut diagnostics = Vec::new();
        scope.pop_frame(&interner, &mut diagnostics);
        assert!(diagnostics.is_empty(), "the inner binding was used");

        assert_eq!(scope.find_variable(x).unwrap().tag, LocalVariableTag(1));
    }

    #[test]
    fn unused_binding_warns_on_pop() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut scope = Scope::new();
        scope.bind_variable(&interner, bind(x));

        let mut diagnostics = Vec::new();
        scope.pop_frame(&interner, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unused variable `x`"));
    }

    #[test]
    fn underscore_bindings_never_warn() {
        let mut interner = Interner::new();
        let name = interner.intern("_y");
        let mut scope = Scope::new();
        scope.bind_variable(&interner, bind(name));

        let mut diagnostics = Vec::new();
        scope.pop_frame(&interner, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn lookup_marks_used() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut scope = Scope::new();
        scope.bind_variable(&interner, bind(x));
        scope.find_variable(x);

        let mut diagnostics = Vec::new();
        scope.pop_frame(&interner, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }
}
