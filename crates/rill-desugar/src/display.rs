//! AST rendering.
//!
//! Renders the desugared tree back to a single-line textual form, used by
//! the `ast` dump command and by the desugarer's own tests, which compare
//! rendered text against expected canonical forms.

use rill_common::intern::Interner;

use crate::ast::{
    Alias, AstArena, Concept, Constructor, ConstructorBody, ConstructorPath, Enumeration,
    ExpressionId, ExpressionKind, Function, FunctionSignature, Implementation, Mutability,
    MutabilityKind, Name, Parameter, Path, PatternId, PatternKind, TemplateArgument,
    TemplateParameter, TemplateParameterKind, TypeId, TypeKind,
};

/// Renders AST nodes; borrows the arena the nodes live in and the
/// interner their names point into.
pub struct Displayer<'a> {
    pub arena: &'a AstArena,
    pub interner: &'a Interner,
}

impl<'a> Displayer<'a> {
    pub fn new(arena: &'a AstArena, interner: &'a Interner) -> Self {
        Self { arena, interner }
    }

    pub fn expression(&self, id: ExpressionId) -> String {
        let mut out = String::new();
        self.write_expression(&mut out, id);
        out
    }

    pub fn pattern(&self, id: PatternId) -> String {
        let mut out = String::new();
        self.write_pattern(&mut out, id);
        out
    }

    pub fn ty(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id);
        out
    }

    // ── Definitions ────────────────────────────────────────────────────

    pub fn function(&self, function: &Function) -> String {
        let mut out = String::from("fn ");
        out.push_str(self.name_text(function.name));
        self.write_template_parameters(&mut out, &function.template_parameters);
        out.push('(');
        for (index, parameter) in function.parameters.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_parameter(&mut out, parameter);
        }
        out.push(')');
        if let Some(return_type) = function.return_type {
            out.push_str(": ");
            self.write_type(&mut out, return_type);
        }
        out.push(' ');
        self.write_expression(&mut out, function.body);
        out
    }

    pub fn enumeration(&self, enumeration: &Enumeration) -> String {
        let mut out = String::from(if enumeration.is_struct { "struct " } else { "enum " });
        out.push_str(self.name_text(enumeration.name));
        self.write_template_parameters(&mut out, &enumeration.template_parameters);
        out.push_str(" =");
        if enumeration.is_struct {
            if let Some(Constructor { body: ConstructorBody::Struct(fields), .. }) =
                enumeration.constructors.first()
            {
                for (index, (name, ty)) in fields.iter().enumerate() {
                    out.push_str(if index == 0 { " " } else { ", " });
                    out.push_str(self.name_text(*name));
                    out.push_str(": ");
                    self.write_type(&mut out, *ty);
                }
            }
            return out;
        }
        for (index, constructor) in enumeration.constructors.iter().enumerate() {
            out.push_str(if index == 0 { " " } else { " | " });
            out.push_str(self.name_text(constructor.name));
            if let ConstructorBody::Tuple(types) = &constructor.body {
                out.push('(');
                for (index, ty) in types.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(&mut out, *ty);
                }
                out.push(')');
            }
        }
        out
    }

    pub fn alias(&self, alias: &Alias) -> String {
        let mut out = String::from("alias ");
        out.push_str(self.name_text(alias.name));
        self.write_template_parameters(&mut out, &alias.template_parameters);
        out.push_str(" = ");
        self.write_type(&mut out, alias.aliased);
        out
    }

    pub fn concept(&self, concept: &Concept) -> String {
        let mut out = String::from("concept ");
        out.push_str(self.name_text(concept.name));
        self.write_template_parameters(&mut out, &concept.template_parameters);
        out.push_str(" {");
        for signature in &concept.signatures {
            out.push(' ');
            self.write_signature(&mut out, signature);
        }
        out.push_str(" }");
        out
    }

    pub fn implementation(&self, implementation: &Implementation) -> String {
        let mut out = String::from("impl");
        self.write_template_parameters(&mut out, &implementation.template_parameters);
        out.push(' ');
        self.write_type(&mut out, implementation.self_type);
        out.push_str(" {");
        for function in &implementation.functions {
            out.push(' ');
            out.push_str(&self.function(function));
        }
        out.push_str(" }");
        out
    }

    fn write_signature(&self, out: &mut String, signature: &FunctionSignature) {
        out.push_str("fn ");
        out.push_str(self.name_text(signature.name));
        self.write_template_parameters(out, &signature.template_parameters);
        out.push('(');
        for (index, parameter) in signature.parameters.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_parameter(out, parameter);
        }
        out.push(')');
        if let Some(return_type) = signature.return_type {
            out.push_str(": ");
            self.write_type(out, return_type);
        }
    }

    fn write_parameter(&self, out: &mut String, parameter: &Parameter) {
        if parameter.is_mutable {
            out.push_str("mut ");
        }
        out.push_str(self.name_text(parameter.name));
        if let Some(annotation) = parameter.annotation {
            out.push_str(": ");
            self.write_type(out, annotation);
        }
        if let Some(default) = parameter.default {
            out.push_str(" = ");
            self.write_expression(out, default);
        }
    }

    fn write_template_parameters(&self, out: &mut String, parameters: &[TemplateParameter]) {
        if parameters.is_empty() {
            return;
        }
        out.push('[');
        for (index, parameter) in parameters.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            out.push_str(self.name_text(parameter.name));
            match &parameter.kind {
                TemplateParameterKind::Mutability => out.push_str(": mut"),
                TemplateParameterKind::Type { bounds } => {
                    for (index, bound) in bounds.iter().enumerate() {
                        out.push_str(if index == 0 { ": " } else { " + " });
                        self.write_path(out, bound);
                    }
                }
            }
        }
        out.push(']');
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn write_expression(&self, out: &mut String, id: ExpressionId) {
        match &self.arena.expression(id).kind {
            ExpressionKind::Error => out.push_str("<error>"),
            ExpressionKind::IntegerLiteral(value) => out.push_str(&value.to_string()),
            ExpressionKind::FloatingLiteral(value) => out.push_str(&value.to_string()),
            ExpressionKind::BooleanLiteral(value) => out.push_str(&value.to_string()),
            ExpressionKind::StringLiteral(id) => {
                out.push('"');
                out.push_str(self.interner.lookup(*id));
                out.push('"');
            }
            ExpressionKind::CharacterLiteral(value) => {
                out.push('\'');
                out.push(*value);
                out.push('\'');
            }
            ExpressionKind::Path(path) => self.write_path(out, path),
            ExpressionKind::Tuple(elements) => {
                out.push('(');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_expression(out, *element);
                }
                out.push(')');
            }
            ExpressionKind::Array(elements) => {
                out.push('[');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        out.push_str("; ");
                    }
                    self.write_expression(out, *element);
                }
                out.push(']');
            }
            ExpressionKind::Block { statements, result } => {
                out.push('{');
                for statement in statements {
                    out.push(' ');
                    self.write_expression(out, *statement);
                    out.push(';');
                }
                out.push(' ');
                self.write_expression(out, *result);
                out.push_str(" }");
            }
            ExpressionKind::Conditional { condition, true_branch, false_branch } => {
                out.push_str("if ");
                self.write_expression(out, *condition);
                out.push(' ');
                self.write_expression(out, *true_branch);
                out.push_str(" else ");
                self.write_expression(out, *false_branch);
            }
            ExpressionKind::Match { scrutinee, arms } => {
                out.push_str("match ");
                self.write_expression(out, *scrutinee);
                out.push_str(" {");
                for arm in arms {
                    out.push(' ');
                    self.write_pattern(out, arm.pattern);
                    out.push_str(" -> ");
                    self.write_expression(out, arm.expression);
                }
                out.push_str(" }");
            }
            ExpressionKind::Loop { body } => {
                out.push_str("loop ");
                self.write_expression(out, *body);
            }
            ExpressionKind::Break { value } => {
                out.push_str("break ");
                self.write_expression(out, *value);
            }
            ExpressionKind::Continue => out.push_str("continue"),
            ExpressionKind::Ret { value } => {
                out.push_str("ret");
                if let Some(value) = value {
                    out.push(' ');
                    self.write_expression(out, *value);
                }
            }
            ExpressionKind::Call { callee, arguments } => {
                self.write_expression(out, *callee);
                out.push('(');
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_expression(out, *argument);
                }
                out.push(')');
            }
            ExpressionKind::MethodCall { receiver, name, template_arguments, arguments } => {
                self.write_expression(out, *receiver);
                out.push('.');
                out.push_str(self.name_text(*name));
                if let Some(template_arguments) = template_arguments {
                    self.write_template_arguments(out, template_arguments);
                }
                out.push('(');
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_expression(out, *argument);
                }
                out.push(')');
            }
            ExpressionKind::FieldAccess { receiver, name } => {
                self.write_expression(out, *receiver);
                out.push('.');
                out.push_str(self.name_text(*name));
            }
            ExpressionKind::TupleFieldAccess { receiver, index, .. } => {
                self.write_expression(out, *receiver);
                out.push('.');
                out.push_str(&index.to_string());
            }
            ExpressionKind::IndexAccess { receiver, index } => {
                self.write_expression(out, *receiver);
                out.push_str(".[");
                self.write_expression(out, *index);
                out.push(']');
            }
            ExpressionKind::StructInitializer { path, fields } => {
                self.write_path(out, path);
                out.push_str(" {");
                for (index, (name, value)) in fields.iter().enumerate() {
                    out.push_str(if index == 0 { " " } else { ", " });
                    out.push_str(self.name_text(*name));
                    out.push_str(" = ");
                    self.write_expression(out, *value);
                }
                out.push_str(" }");
            }
            ExpressionKind::BinaryOperatorInvocation { operator, left, right } => {
                out.push('(');
                self.write_expression(out, *left);
                out.push(' ');
                out.push_str(self.name_text(*operator));
                out.push(' ');
                self.write_expression(out, *right);
                out.push(')');
            }
            ExpressionKind::Reference { mutability, operand } => {
                out.push('&');
                self.write_mutability_prefix(out, *mutability);
                self.write_expression(out, *operand);
            }
            ExpressionKind::Dereference { operand } => {
                out.push('*');
                self.write_expression(out, *operand);
            }
            ExpressionKind::Cast { operand, target } => {
                self.write_expression(out, *operand);
                out.push_str(" as ");
                self.write_type(out, *target);
            }
            ExpressionKind::Ascription { operand, ascribed } => {
                self.write_expression(out, *operand);
                out.push_str(": ");
                self.write_type(out, *ascribed);
            }
            ExpressionKind::Sizeof { inspected } => {
                out.push_str("sizeof(");
                self.write_type(out, *inspected);
                out.push(')');
            }
            ExpressionKind::Let { pattern, annotation, initializer } => {
                out.push_str("let ");
                self.write_pattern(out, *pattern);
                if let Some(annotation) = annotation {
                    out.push_str(": ");
                    self.write_type(out, *annotation);
                }
                out.push_str(" = ");
                self.write_expression(out, *initializer);
            }
        }
    }

    // ── Patterns ───────────────────────────────────────────────────────

    fn write_pattern(&self, out: &mut String, id: PatternId) {
        match &self.arena.pattern(id).kind {
            PatternKind::Wildcard => out.push('_'),
            PatternKind::Name { name, mutability } => {
                // Binding mutability is always rendered, the default
                // included: `immut x` / `mut x`.
                self.write_mutability(out, *mutability);
                out.push(' ');
                out.push_str(self.name_text(*name));
            }
            PatternKind::IntegerLiteral(value) => out.push_str(&value.to_string()),
            PatternKind::FloatingLiteral(value) => out.push_str(&value.to_string()),
            PatternKind::BooleanLiteral(value) => out.push_str(&value.to_string()),
            PatternKind::StringLiteral(id) => {
                out.push('"');
                out.push_str(self.interner.lookup(*id));
                out.push('"');
            }
            PatternKind::CharacterLiteral(value) => {
                out.push('\'');
                out.push(*value);
                out.push('\'');
            }
            PatternKind::Tuple(elements) => {
                out.push('(');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_pattern(out, *element);
                }
                out.push(')');
            }
            PatternKind::Constructor { path, arguments } => {
                match path {
                    ConstructorPath::Full(path) => self.write_path(out, path),
                    ConstructorPath::Abbreviated(name) => {
                        out.push_str("::");
                        out.push_str(self.name_text(*name));
                    }
                }
                if !arguments.is_empty() {
                    out.push('(');
                    for (index, argument) in arguments.iter().enumerate() {
                        if index > 0 {
                            out.push_str(", ");
                        }
                        self.write_pattern(out, *argument);
                    }
                    out.push(')');
                }
            }
            PatternKind::Slice(elements) => {
                out.push('[');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_pattern(out, *element);
                }
                out.push(']');
            }
            PatternKind::Alias { pattern, name, mutability } => {
                self.write_pattern(out, *pattern);
                out.push_str(" as ");
                self.write_mutability(out, *mutability);
                out.push(' ');
                out.push_str(self.name_text(*name));
            }
            PatternKind::Guarded { pattern, guard } => {
                self.write_pattern(out, *pattern);
                out.push_str(" if ");
                self.write_expression(out, *guard);
            }
        }
    }

    // ── Types ──────────────────────────────────────────────────────────

    fn write_type(&self, out: &mut String, id: TypeId) {
        match &self.arena.ty(id).kind {
            TypeKind::Error => out.push_str("<error>"),
            TypeKind::Wildcard => out.push('_'),
            TypeKind::Path(path) => self.write_path(out, path),
            TypeKind::Tuple(elements) => {
                out.push('(');
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, *element);
                }
                out.push(')');
            }
            TypeKind::Slice { element } => {
                out.push('[');
                self.write_type(out, *element);
                out.push(']');
            }
            TypeKind::Array { element, length } => {
                out.push('[');
                self.write_type(out, *element);
                out.push_str("; ");
                self.write_expression(out, *length);
                out.push(']');
            }
            TypeKind::Function { parameters, ret } => {
                out.push_str("fn(");
                for (index, parameter) in parameters.iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, *parameter);
                }
                out.push_str("): ");
                self.write_type(out, *ret);
            }
            TypeKind::Reference { mutability, referee } => {
                out.push('&');
                self.write_mutability_prefix(out, *mutability);
                self.write_type(out, *referee);
            }
            TypeKind::Pointer { mutability, pointee } => {
                out.push('*');
                self.write_mutability_prefix(out, *mutability);
                self.write_type(out, *pointee);
            }
            TypeKind::Typeof { inspected } => {
                out.push_str("typeof(");
                self.write_expression(out, *inspected);
                out.push(')');
            }
        }
    }

    // ── Shared ─────────────────────────────────────────────────────────

    fn write_path(&self, out: &mut String, path: &Path) {
        if path.is_global {
            out.push_str("global::");
        }
        if let Some(inspected) = path.typeof_root {
            out.push_str("typeof(");
            self.write_expression(out, inspected);
            out.push(')');
            if !path.segments.is_empty() {
                out.push_str("::");
            }
        }
        for (index, segment) in path.segments.iter().enumerate() {
            if index > 0 {
                out.push_str("::");
            }
            out.push_str(self.name_text(segment.name));
            if let Some(template_arguments) = &segment.template_arguments {
                self.write_template_arguments(out, template_arguments);
            }
        }
    }

    fn write_template_arguments(&self, out: &mut String, arguments: &[TemplateArgument]) {
        out.push('[');
        for (index, argument) in arguments.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            match argument {
                TemplateArgument::Type(ty) => self.write_type(out, *ty),
                TemplateArgument::Mutability(mutability) => {
                    self.write_mutability(out, *mutability)
                }
            }
        }
        out.push(']');
    }

    /// `mut ` / parameter-name-plus-space; the immutable default writes
    /// nothing. Used where absence means `immut` (references, pointers).
    fn write_mutability_prefix(&self, out: &mut String, mutability: Mutability) {
        match mutability.kind {
            MutabilityKind::Constant { is_mutable: false } => {}
            MutabilityKind::Constant { is_mutable: true } => out.push_str("mut "),
            MutabilityKind::Parameterized(name) => {
                out.push_str(self.name_text(name));
                out.push(' ');
            }
        }
    }

    /// Explicit mutability spelling: `mut` or `immut` or the parameter
    /// name. Used for binding patterns, which always render it.
    fn write_mutability(&self, out: &mut String, mutability: Mutability) {
        match mutability.kind {
            MutabilityKind::Constant { is_mutable: true } => out.push_str("mut"),
            MutabilityKind::Constant { is_mutable: false } => out.push_str("immut"),
            MutabilityKind::Parameterized(name) => out.push_str(self.name_text(name)),
        }
    }

    fn name_text(&self, name: Name) -> &'a str {
        self.interner.lookup(name.id)
    }
}
