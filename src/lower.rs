use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DeclError, Error};
use crate::fold::fold;
use crate::ir::{
    AliasType, ConstDecl, Declaration, Field, Module, Schema, SchemaPath, StructType, TupleType,
    TypeRef, UnionType, Variant,
};
use crate::naming::check_identifier;
use crate::schema::{DeclDoc, FieldDoc, SchemaDoc, TypeDoc};

/// Result of lowering a document: every declaration that passed, plus one
/// failure per declaration that did not.
#[derive(Debug, Clone, Default)]
pub struct Lowered {
    pub schema: Schema,
    pub failures: Vec<DeclError>,
}

/// Lower the document into the typed model. Each declaration is lowered on
/// its own; a bad declaration never hides the others.
pub fn lower_to_ir(doc: &SchemaDoc) -> Lowered {
    let mut symbols = Symbols::default();
    symbols.collect(&SchemaPath::root(), &doc.declarations);

    let mut failures = Vec::new();
    let declarations = lower_module(&symbols, &SchemaPath::root(), &doc.declarations, &mut failures);
    Lowered {
        schema: Schema { declarations },
        failures,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SYMBOLS
// ————————————————————————————————————————————————————————————————————————————

/// Referable types (path → generic count) and the declarations rejected
/// as duplicates, keyed by (module, index in module).
#[derive(Debug, Default)]
struct Symbols {
    types: BTreeMap<SchemaPath, usize>,
    duplicates: BTreeSet<(SchemaPath, usize)>,
}

impl Symbols {
    fn collect(&mut self, module: &SchemaPath, declarations: &[DeclDoc]) {
        let mut seen = BTreeSet::new();
        for (index, decl) in declarations.iter().enumerate() {
            if !seen.insert(decl.name()) {
                self.duplicates.insert((module.clone(), index));
                continue;
            }
            let path = module.child(decl.name());
            if let Some(generics) = decl.type_generics() {
                self.types.insert(path.clone(), generics);
            }
            if let DeclDoc::Module { declarations, .. } = decl {
                self.collect(&path, declarations);
            }
        }
    }

    /// Resolve `name` (possibly `a::b::Name`) relative to `module` first,
    /// then from the root.
    fn resolve(&self, module: &SchemaPath, name: &str) -> Option<(SchemaPath, usize)> {
        let segments: Vec<&str> = name.split("::").collect();
        let mut relative = module.clone();
        for segment in &segments {
            relative = relative.child(segment);
        }
        let absolute = SchemaPath::from_segments(segments);
        [relative, absolute]
            .into_iter()
            .find_map(|path| self.types.get(&path).map(|generics| (path, *generics)))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

fn lower_module(
    symbols: &Symbols,
    module: &SchemaPath,
    declarations: &[DeclDoc],
    failures: &mut Vec<DeclError>,
) -> Vec<Declaration> {
    let mut out = Vec::new();
    for (index, decl) in declarations.iter().enumerate() {
        let path = module.child(decl.name());
        if symbols.duplicates.contains(&(module.clone(), index)) {
            failures.push(DeclError::new(
                path,
                Error::DuplicateDeclaration {
                    name: decl.name().to_owned(),
                },
            ));
            continue;
        }
        match lower_declaration(symbols, module, decl, failures) {
            Ok(lowered) => out.push(lowered),
            Err(error) => {
                tracing::debug!(%path, %error, "declaration rejected while lowering");
                failures.push(DeclError::new(path, error));
            }
        }
    }
    out
}

fn lower_declaration(
    symbols: &Symbols,
    module: &SchemaPath,
    decl: &DeclDoc,
    failures: &mut Vec<DeclError>,
) -> Result<Declaration, Error> {
    match decl {
        DeclDoc::Struct {
            name,
            comment,
            generics,
            fields,
        } => {
            let scope = Scope {
                symbols,
                module,
                generics,
            };
            let fields = scope.lower_fields(fields)?;
            Ok(Declaration::Struct(
                StructType::new(name, generics.clone(), fields)?.with_comment(comment.clone()),
            ))
        }
        DeclDoc::Union {
            name,
            comment,
            generics,
            variants,
        } => {
            let scope = Scope {
                symbols,
                module,
                generics,
            };
            let variants = variants
                .iter()
                .map(|v| {
                    Ok(Variant::new(&v.name, scope.lower_fields(&v.fields)?)?.with_comment(v.comment.clone()))
                })
                .collect::<Result<Vec<_>, Error>>()?;
            Ok(Declaration::Union(
                UnionType::new(name, generics.clone(), variants)?.with_comment(comment.clone()),
            ))
        }
        DeclDoc::Alias { name, comment, target } => {
            check_identifier(name)?;
            let scope = Scope {
                symbols,
                module,
                generics: &[],
            };
            Ok(Declaration::Alias(AliasType {
                name: name.clone(),
                target: scope.lower_type(target)?,
                comment: comment.clone(),
            }))
        }
        DeclDoc::Const {
            name,
            comment,
            ty,
            value,
        } => {
            check_identifier(name)?;
            Ok(Declaration::Const(ConstDecl {
                name: name.clone(),
                value: fold(*ty, value)?,
                comment: comment.clone(),
            }))
        }
        DeclDoc::Module {
            name,
            comment,
            declarations,
        } => {
            check_identifier(name)?;
            let path = module.child(name);
            Ok(Declaration::Module(Module {
                name: name.clone(),
                comment: comment.clone(),
                declarations: lower_module(symbols, &path, declarations, failures),
            }))
        }
    }
}

/// Name-resolution context of a single declaration.
struct Scope<'a> {
    symbols: &'a Symbols,
    module: &'a SchemaPath,
    generics: &'a [String],
}

impl Scope<'_> {
    fn lower_fields(&self, fields: &[FieldDoc]) -> Result<Vec<Field>, Error> {
        fields
            .iter()
            .map(|f| {
                self.lower_type(&f.ty)
                    .map(|ty| Field::new(&f.name, ty).with_comment(f.comment.clone()))
            })
            .collect()
    }

    fn lower_type(&self, ty: &TypeDoc) -> Result<TypeRef, Error> {
        Ok(match ty {
            TypeDoc::Scalar(scalar) => TypeRef::Scalar(*scalar),
            TypeDoc::Tuple(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| self.lower_type(e))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeRef::Tuple(TupleType::new(elements)?)
            }
            TypeDoc::List(item) => TypeRef::List(Box::new(self.lower_type(item)?)),
            TypeDoc::Array(item, len) => TypeRef::Array(Box::new(self.lower_type(item)?), *len),
            TypeDoc::Option(item) => TypeRef::Option(Box::new(self.lower_type(item)?)),
            TypeDoc::Map(key, value) => TypeRef::Map(
                Box::new(self.lower_type(key)?),
                Box::new(self.lower_type(value)?),
            ),
            TypeDoc::HashSet(item) => TypeRef::HashSet(Box::new(self.lower_type(item)?)),
            TypeDoc::Named { name, generics } => {
                let (path, expected) = self
                    .symbols
                    .resolve(self.module, name)
                    .ok_or_else(|| Error::UnknownType { name: name.clone() })?;
                if expected != generics.len() {
                    return Err(Error::GenericArgumentCount {
                        name: name.clone(),
                        expected,
                        found: generics.len(),
                    });
                }
                TypeRef::Named {
                    path,
                    generics: generics
                        .iter()
                        .map(|g| self.lower_type(g))
                        .collect::<Result<Vec<_>, _>>()?,
                }
            }
            TypeDoc::Param(name) => {
                if !self.generics.iter().any(|g| g == name) {
                    return Err(Error::UnknownType { name: name.clone() });
                }
                TypeRef::Param(name.clone())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ScalarType;
    use crate::schema::from_str_with_path;

    fn lower_json(src: &str) -> Lowered {
        let doc: SchemaDoc = from_str_with_path(src).unwrap();
        lower_to_ir(&doc)
    }

    #[test]
    fn resolves_relative_then_absolute_names() {
        let lowered = lower_json(
            r#"{ "declarations": [
                { "kind": "struct", "name": "Id", "fields": [ { "name": "v", "type": "u64" } ] },
                { "kind": "module", "name": "geometry", "declarations": [
                    { "kind": "struct", "name": "Point", "fields": [ { "name": "x", "type": "f64" } ] },
                    { "kind": "struct", "name": "Line", "fields": [
                        { "name": "start", "type": { "named": { "name": "Point" } } },
                        { "name": "id", "type": { "named": { "name": "Id" } } }
                    ] }
                ] }
            ] }"#,
        );
        assert!(lowered.failures.is_empty(), "{:?}", lowered.failures);
        let items = lowered.schema.items();
        let Declaration::Struct(line) = items[2].decl else {
            panic!("expected struct");
        };
        assert_eq!(
            line.fields()[0].ty,
            TypeRef::Named {
                path: SchemaPath::from_segments(["geometry", "Point"]),
                generics: Vec::new(),
            }
        );
        assert_eq!(
            line.fields()[1].ty,
            TypeRef::Named {
                path: SchemaPath::from_segments(["Id"]),
                generics: Vec::new(),
            }
        );
    }

    #[test]
    fn failures_are_isolated_per_declaration() {
        let lowered = lower_json(
            r#"{ "declarations": [
                { "kind": "struct", "name": "Bad", "fields": [
                    { "name": "a", "type": "u8" }, { "name": "a", "type": "u8" } ] },
                { "kind": "struct", "name": "Good", "fields": [ { "name": "a", "type": "u8" } ] },
                { "kind": "struct", "name": "Lonely", "fields": [ { "name": "t", "type": { "tuple": ["u8"] } } ] },
                { "kind": "const", "name": "TOO_BIG", "type": "u8", "value": { "int": "300" } },
                { "kind": "struct", "name": "Good", "fields": [] }
            ] }"#,
        );
        let failed: Vec<_> = lowered
            .failures
            .iter()
            .map(|f| (f.path.to_string(), f.error.clone()))
            .collect();
        assert_eq!(
            failed,
            [
                ("Bad".to_owned(), Error::DuplicateField { field: "a".to_owned() }),
                ("Lonely".to_owned(), Error::InvalidArity { arity: 1 }),
                (
                    "TOO_BIG".to_owned(),
                    Error::Range {
                        ty: ScalarType::U8,
                        literal: "300".to_owned()
                    }
                ),
                ("Good".to_owned(), Error::DuplicateDeclaration { name: "Good".to_owned() }),
            ]
        );
        assert_eq!(lowered.schema.items().len(), 1);
    }

    #[test]
    fn comments_and_collections_are_lowered() {
        let lowered = lower_json(
            r#"{ "declarations": [
                { "kind": "struct", "name": "Grid", "comment": "Cells.", "fields": [
                    { "name": "cells", "type": { "array": ["u8", 9] }, "comment": "Row major." },
                    { "name": "tags", "type": { "hash_set": "string" } } ] },
                { "kind": "const", "name": "SIZE", "comment": "Side length.", "type": "u8", "value": { "int": "3" } }
            ] }"#,
        );
        assert!(lowered.failures.is_empty(), "{:?}", lowered.failures);
        let items = lowered.schema.items();
        let Declaration::Struct(grid) = items[0].decl else {
            panic!("expected struct");
        };
        assert_eq!(grid.comment(), Some("Cells."));
        assert_eq!(grid.fields()[0].comment.as_deref(), Some("Row major."));
        assert_eq!(
            grid.fields()[0].ty,
            TypeRef::Array(Box::new(TypeRef::Scalar(ScalarType::U8)), 9)
        );
        assert_eq!(
            grid.fields()[1].ty,
            TypeRef::HashSet(Box::new(TypeRef::Scalar(ScalarType::String)))
        );
        assert_eq!(items[1].decl.comment(), Some("Side length."));
    }

    #[test]
    fn unknown_names_and_generic_counts() {
        let lowered = lower_json(
            r#"{ "declarations": [
                { "kind": "struct", "name": "Pair", "generics": ["K", "V"], "fields": [
                    { "name": "key", "type": { "param": "K" } },
                    { "name": "value", "type": { "param": "V" } } ] },
                { "kind": "struct", "name": "A", "fields": [ { "name": "x", "type": { "named": { "name": "Missing" } } } ] },
                { "kind": "struct", "name": "B", "fields": [
                    { "name": "x", "type": { "named": { "name": "Pair", "generics": ["u8"] } } } ] },
                { "kind": "struct", "name": "C", "fields": [ { "name": "x", "type": { "param": "T" } } ] }
            ] }"#,
        );
        let errors: Vec<_> = lowered.failures.iter().map(|f| f.error.clone()).collect();
        assert_eq!(
            errors,
            [
                Error::UnknownType { name: "Missing".to_owned() },
                Error::GenericArgumentCount {
                    name: "Pair".to_owned(),
                    expected: 2,
                    found: 1
                },
                Error::UnknownType { name: "T".to_owned() },
            ]
        );
    }
}
