//! Definition desugaring: functions, structs, enums, concepts, aliases,
//! and implementation blocks. Module and import definitions carry no
//! sugar and are consumed directly from the CST by the collection phase.

use rill_common::span::Range;
use rill_parser::nodes::expr::Expr;
use rill_parser::nodes::item as cst;
use rill_parser::nodes::AstNode;

use crate::ast::{
    Alias, Concept, Constructor, ConstructorBody, Enumeration, Expression, ExpressionKind,
    Function, FunctionSignature, Implementation, Name, Parameter, TemplateParameter,
    TemplateParameterKind,
};
use crate::Desugarer;

impl Desugarer<'_> {
    pub fn desugar_function(&mut self, def: &cst::FnDef) -> Function {
        let range = self.range_of(def.syntax());
        let name = self.definition_name(def.name(), range);
        let template_parameters = self.desugar_template_parameters(def.template_params());
        let parameters = self.desugar_parameters(def.param_list());
        let return_type = def
            .return_annotation()
            .and_then(|annotation| annotation.ty())
            .map(|ty| self.desugar_type(&ty));
        let body = self.desugar_function_body(def.body(), range);
        Function {
            name,
            template_parameters,
            parameters,
            return_type,
            body,
            range,
        }
    }

    /// Normalize `= expr`, `= { … }`, and `{ … }` bodies to block form.
    fn desugar_function_body(
        &mut self,
        body: Option<Expr>,
        range: Range,
    ) -> crate::ast::ExpressionId {
        match body {
            Some(Expr::Block(block)) => self.desugar_block(&block),
            Some(expr) => {
                let expr_range = self.range_of(expr.syntax());
                let result = self.desugar_expression(&expr);
                self.arena.alloc_expression(Expression {
                    kind: ExpressionKind::Block {
                        statements: Vec::new(),
                        result,
                    },
                    range: expr_range,
                })
            }
            None => self.error_expression(range),
        }
    }

    /// A `struct` is an enumeration with one struct-bodied constructor
    /// carrying the struct's own name.
    pub fn desugar_struct(&mut self, def: &cst::StructDef) -> Enumeration {
        let range = self.range_of(def.syntax());
        let name = self.definition_name(def.name(), range);
        let template_parameters = self.desugar_template_parameters(def.template_params());
        let fields = def
            .fields()
            .filter_map(|field| {
                let name_token = field.name()?;
                let field_name = self.name(&name_token);
                let ty = self.desugar_opt_type(
                    field.annotation().and_then(|annotation| annotation.ty()),
                    field_name.range,
                );
                Some((field_name, ty))
            })
            .collect();
        Enumeration {
            name,
            template_parameters,
            constructors: vec![Constructor {
                name,
                body: ConstructorBody::Struct(fields),
            }],
            is_struct: true,
            range,
        }
    }

    pub fn desugar_enum(&mut self, def: &cst::EnumDef) -> Enumeration {
        let range = self.range_of(def.syntax());
        let name = self.definition_name(def.name(), range);
        let template_parameters = self.desugar_template_parameters(def.template_params());
        let constructors = def
            .constructors()
            .filter_map(|constructor| {
                let name_token = constructor.name()?;
                let ctor_name = self.name(&name_token);
                let body = match constructor.tuple() {
                    Some(tuple) => ConstructorBody::Tuple(
                        tuple.types().map(|ty| self.desugar_type(&ty)).collect(),
                    ),
                    None => ConstructorBody::Unit,
                };
                Some(Constructor { name: ctor_name, body })
            })
            .collect();
        Enumeration {
            name,
            template_parameters,
            constructors,
            is_struct: false,
            range,
        }
    }

    pub fn desugar_concept(&mut self, def: &cst::ConceptDef) -> Concept {
        let range = self.range_of(def.syntax());
        let name = self.definition_name(def.name(), range);
        let template_parameters = self.desugar_template_parameters(def.template_params());
        let signatures = def
            .signatures()
            .map(|signature| self.desugar_signature(&signature))
            .collect();
        Concept {
            name,
            template_parameters,
            signatures,
            range,
        }
    }

    fn desugar_signature(&mut self, signature: &cst::FnSignature) -> FunctionSignature {
        let range = self.range_of(signature.syntax());
        let name = self.definition_name(signature.name(), range);
        let template_parameters = self.desugar_template_parameters(signature.template_params());
        let parameters = self.desugar_parameters(signature.param_list());
        let return_type = signature
            .return_annotation()
            .and_then(|annotation| annotation.ty())
            .map(|ty| self.desugar_type(&ty));
        FunctionSignature {
            name,
            template_parameters,
            parameters,
            return_type,
            range,
        }
    }

    pub fn desugar_alias(&mut self, def: &cst::AliasDef) -> Alias {
        let range = self.range_of(def.syntax());
        let name = self.definition_name(def.name(), range);
        let template_parameters = self.desugar_template_parameters(def.template_params());
        let aliased = self.desugar_opt_type(def.ty(), range);
        Alias {
            name,
            template_parameters,
            aliased,
            range,
        }
    }

    pub fn desugar_implementation(&mut self, def: &cst::ImplDef) -> Implementation {
        let range = self.range_of(def.syntax());
        let template_parameters = self.desugar_template_parameters(def.template_params());
        let self_type = self.desugar_opt_type(def.self_type(), range);
        let functions = def
            .functions()
            .map(|function| self.desugar_function(&function))
            .collect();
        Implementation {
            template_parameters,
            self_type,
            functions,
            range,
        }
    }

    // ── Shared pieces ──────────────────────────────────────────────────

    fn definition_name(
        &mut self,
        token: Option<rill_parser::cst::SyntaxToken>,
        fallback: Range,
    ) -> Name {
        match token {
            Some(token) => self.name(&token),
            // The parser already reported the missing name.
            None => Name {
                id: self.interner.intern(""),
                is_upper: false,
                range: fallback,
            },
        }
    }

    pub(crate) fn desugar_template_parameters(
        &mut self,
        list: Option<cst::TemplateParamList>,
    ) -> Vec<TemplateParameter> {
        let Some(list) = list else {
            return Vec::new();
        };
        list.params()
            .filter_map(|parameter| {
                let name_token = parameter.name()?;
                let name = self.name(&name_token);
                let kind = if parameter.is_mutability() {
                    TemplateParameterKind::Mutability
                } else {
                    TemplateParameterKind::Type {
                        bounds: parameter
                            .bounds()
                            .map(|bound| self.desugar_path(&bound))
                            .collect(),
                    }
                };
                Some(TemplateParameter { name, kind })
            })
            .collect()
    }

    fn desugar_parameters(&mut self, list: Option<cst::ParamList>) -> Vec<Parameter> {
        let Some(list) = list else {
            return Vec::new();
        };
        list.params()
            .filter_map(|parameter| {
                let name_token = parameter.name()?;
                let name = self.name(&name_token);
                let annotation = parameter
                    .annotation()
                    .and_then(|annotation| annotation.ty())
                    .map(|ty| self.desugar_type(&ty));
                let default = parameter
                    .default_arg()
                    .and_then(|default| default.value())
                    .map(|value| self.desugar_expression(&value));
                Some(Parameter {
                    name,
                    is_mutable: parameter.is_mut(),
                    annotation,
                    default,
                })
            })
            .collect()
    }
}
