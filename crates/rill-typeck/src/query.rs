//! Language-query surface.
//!
//! Thin readers over the reference sink and the info tables, consumed by
//! an editor front-end. The JSON-RPC plumbing lives with the caller;
//! these functions take a document id and return plain data.

use rill_common::db::{Database, DocumentId};
use rill_common::span::{Location, Position, Range};

use crate::symbol::{DefinitionVariant, EnvironmentId, Symbol};
use crate::Analysis;

/// One entry of the document outline.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: &'static str,
    pub range: Range,
}

fn contains(range: Range, position: Position) -> bool {
    range.start <= position && position < range.stop
}

impl Analysis {
    /// The definitions of a document, in source order, submodules
    /// flattened after their parent.
    pub fn document_symbols(&self, db: &Database, document: DocumentId) -> Vec<DocumentSymbol> {
        let Some(state) = self.documents.get(&document) else {
            return Vec::new();
        };
        let mut symbols = Vec::new();
        self.collect_symbols(db, state.root_environment, &mut symbols);
        symbols
    }

    fn collect_symbols(
        &self,
        db: &Database,
        environment: EnvironmentId,
        out: &mut Vec<DocumentSymbol>,
    ) {
        for definition in &self.environments[environment.0 as usize].in_order {
            match *definition {
                DefinitionVariant::Function(id) => {
                    let info = &self.functions[id.0 as usize];
                    out.push(DocumentSymbol {
                        name: db.interner.lookup(info.name.id).to_owned(),
                        kind: "function",
                        range: info.name.range,
                    });
                }
                DefinitionVariant::Enumeration(id) => {
                    let info = &self.enumerations[id.0 as usize];
                    out.push(DocumentSymbol {
                        name: db.interner.lookup(info.name.id).to_owned(),
                        kind: if info.ast.is_struct { "struct" } else { "enum" },
                        range: info.name.range,
                    });
                }
                DefinitionVariant::Concept(id) => {
                    let info = &self.concepts[id.0 as usize];
                    out.push(DocumentSymbol {
                        name: db.interner.lookup(info.name.id).to_owned(),
                        kind: "concept",
                        range: info.name.range,
                    });
                }
                DefinitionVariant::Alias(id) => {
                    let info = &self.aliases[id.0 as usize];
                    out.push(DocumentSymbol {
                        name: db.interner.lookup(info.name.id).to_owned(),
                        kind: "alias",
                        range: info.name.range,
                    });
                }
                DefinitionVariant::Module(id) => {
                    let info = &self.modules[id.0 as usize];
                    out.push(DocumentSymbol {
                        name: db.interner.lookup(info.name.id).to_owned(),
                        kind: "module",
                        range: info.name.range,
                    });
                    self.collect_symbols(db, info.environment, out);
                }
                DefinitionVariant::Implementation(id) => {
                    let info = &self.implementations[id.0 as usize];
                    for &function in &info.functions {
                        let function = &self.functions[function.0 as usize];
                        out.push(DocumentSymbol {
                            name: db.interner.lookup(function.name.id).to_owned(),
                            kind: "method",
                            range: function.name.range,
                        });
                    }
                }
            }
        }
    }

    /// The definition location of the name under `position`, if a
    /// resolved reference covers it.
    pub fn definition(
        &self,
        db: &Database,
        document: DocumentId,
        position: Position,
    ) -> Option<Location> {
        db.document(document)
            .references
            .iter()
            .find(|reference| contains(reference.range, position))
            .map(|reference| reference.target)
    }

    /// Hover text for the name under `position`.
    pub fn hover(&self, db: &Database, document: DocumentId, position: Position) -> Option<String> {
        let state = self.documents.get(&document)?;
        let index = db
            .document(document)
            .references
            .iter()
            .position(|reference| contains(reference.range, position))?;
        let symbol = state.symbols.get(index)?;
        let text = match *symbol {
            Symbol::Error => return None,
            Symbol::Function(id) => {
                let info = &self.functions[id.0 as usize];
                format!("fn {}", db.interner.lookup(info.name.id))
            }
            Symbol::Enumeration(id) => {
                let info = &self.enumerations[id.0 as usize];
                let keyword = if info.ast.is_struct { "struct" } else { "enum" };
                format!("{keyword} {}", db.interner.lookup(info.name.id))
            }
            Symbol::Concept(id) => {
                format!(
                    "concept {}",
                    db.interner.lookup(self.concepts[id.0 as usize].name.id)
                )
            }
            Symbol::Alias(id) => {
                format!("alias {}", db.interner.lookup(self.aliases[id.0 as usize].name.id))
            }
            Symbol::Module(id) => {
                format!("module {}", db.interner.lookup(self.modules[id.0 as usize].name.id))
            }
            Symbol::LocalVariable(_) => "local variable".to_owned(),
            Symbol::LocalMutability(_) => "mutability parameter".to_owned(),
            Symbol::LocalType(_) => "template parameter".to_owned(),
        };
        Some(text)
    }
}
