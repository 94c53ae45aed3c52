//! Pattern desugaring.

use rill_common::span::Range;
use rill_parser::nodes::pat as cst;
use rill_parser::nodes::AstNode;
use rill_parser::syntax_kind::SyntaxKind;

use crate::ast::{ConstructorPath, Mutability, MutabilityKind, Pattern, PatternId, PatternKind};
use crate::Desugarer;

impl Desugarer<'_> {
    pub fn desugar_pattern(&mut self, pattern: &cst::Pattern) -> PatternId {
        let range = self.range_of(pattern.syntax());
        let kind = match pattern {
            cst::Pattern::Wildcard(_) => PatternKind::Wildcard,

            cst::Pattern::Name(name_pat) => {
                let Some(name_token) = name_pat.name() else {
                    return self.wildcard_pattern(range);
                };
                let name = self.name(&name_token);
                PatternKind::Name {
                    name,
                    mutability: Mutability {
                        kind: MutabilityKind::Constant { is_mutable: name_pat.is_mut() },
                        range,
                    },
                }
            }

            cst::Pattern::Literal(literal) => {
                let Some(token) = literal.token() else {
                    return self.wildcard_pattern(range);
                };
                let text = token.text();
                match token.kind() {
                    SyntaxKind::INT_LITERAL => match self.integer_value(text, range) {
                        Some(value) => PatternKind::IntegerLiteral(value),
                        None => PatternKind::Wildcard,
                    },
                    SyntaxKind::FLOAT_LITERAL => match self.floating_value(text, range) {
                        Some(value) => PatternKind::FloatingLiteral(value),
                        None => PatternKind::Wildcard,
                    },
                    SyntaxKind::BOOL_LITERAL => PatternKind::BooleanLiteral(text == "true"),
                    SyntaxKind::STR_LITERAL => {
                        let value = self.string_value(text, range);
                        PatternKind::StringLiteral(self.interner.intern(&value))
                    }
                    SyntaxKind::CHAR_LITERAL => match self.character_value(text, range) {
                        Some(value) => PatternKind::CharacterLiteral(value),
                        None => PatternKind::Wildcard,
                    },
                    _ => PatternKind::Wildcard,
                }
            }

            cst::Pattern::Tuple(tuple) => {
                if tuple.is_grouping() {
                    let inner = tuple.elements().next().expect("grouping has one element");
                    return self.desugar_pattern(&inner);
                }
                let elements = tuple
                    .elements()
                    .map(|element| self.desugar_pattern(&element))
                    .collect();
                PatternKind::Tuple(elements)
            }

            cst::Pattern::Ctor(ctor) => {
                let path = if let Some(path) = ctor.path() {
                    ConstructorPath::Full(self.desugar_path(&path))
                } else if let Some(name_token) = ctor.abbreviated_name() {
                    let name = self.name(&name_token);
                    ConstructorPath::Abbreviated(name)
                } else {
                    return self.wildcard_pattern(range);
                };
                let arguments = match ctor.args() {
                    Some(args) => args
                        .patterns()
                        .map(|argument| self.desugar_pattern(&argument))
                        .collect(),
                    None => Vec::new(),
                };
                PatternKind::Constructor { path, arguments }
            }

            cst::Pattern::Slice(slice) => {
                let elements = slice
                    .elements()
                    .map(|element| self.desugar_pattern(&element))
                    .collect();
                PatternKind::Slice(elements)
            }

            cst::Pattern::Alias(alias) => {
                let inner = match alias.pattern() {
                    Some(inner) => self.desugar_pattern(&inner),
                    None => self.wildcard_pattern(range),
                };
                let Some(name_token) = alias.name() else {
                    return inner;
                };
                let name = self.name(&name_token);
                PatternKind::Alias {
                    pattern: inner,
                    name,
                    mutability: Mutability {
                        kind: MutabilityKind::Constant { is_mutable: alias.is_mut() },
                        range,
                    },
                }
            }

            cst::Pattern::Guard(guard) => {
                let inner = match guard.pattern() {
                    Some(inner) => self.desugar_pattern(&inner),
                    None => self.wildcard_pattern(range),
                };
                let condition = self.desugar_opt_expression(guard.condition(), range);
                PatternKind::Guarded { pattern: inner, guard: condition }
            }
        };
        self.arena.alloc_pattern(Pattern { kind, range })
    }

    /// One or more comma-separated patterns; more than one becomes a
    /// tuple pattern (`let a, b = …` and match case `p, q -> …`).
    pub(crate) fn desugar_pattern_list(
        &mut self,
        patterns: impl Iterator<Item = cst::Pattern>,
        fallback: Range,
    ) -> PatternId {
        let desugared: Vec<(PatternId, Range)> = patterns
            .map(|pattern| {
                let range = self.range_of(pattern.syntax());
                (self.desugar_pattern(&pattern), range)
            })
            .collect();
        match desugared.len() {
            0 => self.wildcard_pattern(fallback),
            1 => desugared[0].0,
            _ => {
                let range = desugared
                    .iter()
                    .map(|&(_, range)| range)
                    .reduce(Range::merge)
                    .expect("at least two patterns");
                let elements = desugared.iter().map(|&(id, _)| id).collect();
                self.arena.alloc_pattern(Pattern {
                    kind: PatternKind::Tuple(elements),
                    range,
                })
            }
        }
    }
}
