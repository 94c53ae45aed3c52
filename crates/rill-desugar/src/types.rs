//! Type desugaring.

use rill_common::span::Range;
use rill_parser::nodes::ty as cst;
use rill_parser::nodes::AstNode;

use crate::ast::{Type, TypeId, TypeKind};
use crate::Desugarer;

impl Desugarer<'_> {
    pub fn desugar_type(&mut self, ty: &cst::Type) -> TypeId {
        let range = self.range_of(ty.syntax());
        let kind = match ty {
            cst::Type::Path(path_type) => match path_type.path() {
                Some(path) => TypeKind::Path(self.desugar_path(&path)),
                None => TypeKind::Error,
            },

            cst::Type::Tuple(tuple) => {
                if tuple.is_grouping() {
                    let inner = tuple.elements().next().expect("grouping has one element");
                    return self.desugar_type(&inner);
                }
                let elements = tuple
                    .elements()
                    .map(|element| self.desugar_type(&element))
                    .collect();
                TypeKind::Tuple(elements)
            }

            cst::Type::Slice(slice) => {
                let element = self.desugar_opt_type(slice.element(), range);
                TypeKind::Slice { element }
            }

            cst::Type::Array(array) => {
                let element = self.desugar_opt_type(array.element(), range);
                let length = self.desugar_opt_expression(array.length(), range);
                TypeKind::Array { element, length }
            }

            cst::Type::Fn(fn_type) => {
                let parameters = fn_type
                    .param_types()
                    .map(|parameter| self.desugar_type(&parameter))
                    .collect();
                let ret = self.desugar_opt_type(
                    fn_type.return_annotation().and_then(|annotation| annotation.ty()),
                    range,
                );
                TypeKind::Function { parameters, ret }
            }

            cst::Type::Ref(ref_type) => {
                let mutability = self.desugar_mutability(ref_type.mutability(), range);
                let referee = self.desugar_opt_type(ref_type.referee(), range);
                TypeKind::Reference { mutability, referee }
            }

            cst::Type::Ptr(ptr_type) => {
                let mutability = self.desugar_mutability(ptr_type.mutability(), range);
                let pointee = self.desugar_opt_type(ptr_type.pointee(), range);
                TypeKind::Pointer { mutability, pointee }
            }

            cst::Type::Typeof(typeof_type) => {
                let inspected = self.desugar_opt_expression(typeof_type.expr(), range);
                TypeKind::Typeof { inspected }
            }

            cst::Type::Wildcard(_) => TypeKind::Wildcard,
        };
        self.arena.alloc_type(Type { kind, range })
    }

    pub(crate) fn desugar_opt_type(&mut self, ty: Option<cst::Type>, fallback: Range) -> TypeId {
        match ty {
            Some(ty) => self.desugar_type(&ty),
            None => self.arena.alloc_type(Type {
                kind: TypeKind::Error,
                range: fallback,
            }),
        }
    }
}
