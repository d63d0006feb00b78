//! Emitted-identifier assignment.
//!
//! Every module is one namespace. Declared types and constants claim their
//! names first, in declaration order; union variants are then named flat
//! (`Variant1`) or qualified (`Sample_Variant1`) depending on the policy.
//! Fields of a record and sibling modules get namespaces of their own, so
//! names that only differ in case or separators are caught here instead of
//! by the target compiler. The table is a pure function of the schema and the config, so two runs
//! over the same schema always produce the same names.

use std::collections::{BTreeMap, HashMap, HashSet};

use heck::{ToSnakeCase, ToUpperCamelCase};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::Error;
use crate::ir::{Declaration, Field, Item, Schema, SchemaPath, UnionType};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("identifier pattern compiles"));

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]*$").expect("separator pattern compiles"));

pub fn check_identifier(name: &str) -> Result<(), Error> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            name: name.to_owned(),
        })
    }
}

pub fn is_valid_separator(separator: &str) -> bool {
    SEPARATOR.is_match(separator)
}

// ————————————————————————————————————————————————————————————————————————————
// POLICY
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Variant types keep their own name (`Variant1`).
    Flat,
    /// Variant types are prefixed by their union (`Sample_Variant1`).
    Qualified,
    /// Flat unless that would collide, then qualified.
    #[default]
    Auto,
}

/// How a target language spells declared names.
pub trait Conventions {
    fn type_ident(&self, name: &str) -> String {
        name.to_upper_camel_case()
    }

    fn const_ident(&self, name: &str) -> String;

    fn qualified_ident(&self, owner: &str, variant: &str, separator: &str) -> String {
        format!(
            "{}{separator}{}",
            self.type_ident(owner),
            self.type_ident(variant)
        )
    }

    /// Emitted names of one field, one per namespace it is declared in
    /// (record member, constructor parameter).
    fn field_idents(&self, name: &str) -> Vec<String>;

    /// Emitted name of one module path segment.
    fn module_ident(&self, segment: &str) -> String {
        segment.to_snake_case()
    }
}

/// Emitted names of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclNames {
    pub ident: String,
    /// Variant type names in declared order (unions only).
    pub variants: Vec<String>,
    pub qualified: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NameTable {
    entries: BTreeMap<SchemaPath, Result<DeclNames, Error>>,
    /// Modules whose emitted name clashes with a sibling's.
    modules: BTreeMap<SchemaPath, Error>,
}

impl NameTable {
    /// Assign names for every declaration of `schema`. `reserved` lists
    /// module names already claimed under the root, with the label reported
    /// when a schema module collides with them.
    pub fn build<C: Conventions + ?Sized>(
        schema: &Schema,
        policy: NamingPolicy,
        separator: &str,
        conventions: &C,
        reserved: &[(String, String)],
    ) -> Self {
        let mut modules: IndexMap<SchemaPath, Vec<Item<'_>>> = IndexMap::new();
        for module in schema.modules() {
            modules.insert(module, Vec::new());
        }
        for item in schema.items() {
            modules.entry(item.module.clone()).or_default().push(item);
        }

        // sibling modules share their parent's module namespace
        let mut parents: IndexMap<&[String], Namespace> = IndexMap::new();
        let mut failed_modules = BTreeMap::new();
        for module in modules.keys().filter(|m| !m.is_root()) {
            let namespace = parents.entry(module.module()).or_insert_with(|| {
                Namespace::new(if module.module().is_empty() { reserved } else { &[] })
            });
            let ident = conventions.module_ident(module.name());
            if let Err(error) = namespace.claim(&ident, &module.to_string()) {
                tracing::debug!(%module, %error, "module naming failed");
                failed_modules.insert(module.clone(), error);
            }
        }

        let mut entries = BTreeMap::new();
        for items in modules.values() {
            Namespace::new(&[]).assign(items, policy, separator, conventions, &mut entries);
        }
        Self {
            entries,
            modules: failed_modules,
        }
    }

    pub fn get(&self, path: &SchemaPath) -> Option<&Result<DeclNames, Error>> {
        self.entries.get(path)
    }

    /// Emitted identifier of a successfully named declaration.
    pub fn ident(&self, path: &SchemaPath) -> Option<&str> {
        match self.entries.get(path) {
            Some(Ok(names)) => Some(&names.ident),
            _ => None,
        }
    }

    /// Modules that could not be named, in path order.
    pub fn failed_modules(&self) -> impl Iterator<Item = (&SchemaPath, &Error)> {
        self.modules.iter()
    }

    /// `module` itself or its closest ancestor that could not be named.
    pub fn failed_ancestor(&self, module: &SchemaPath) -> Option<&SchemaPath> {
        let segments = module.segments();
        (1..=segments.len())
            .map(|len| SchemaPath::from_segments(segments[..len].iter().cloned()))
            .find_map(|prefix| self.modules.get_key_value(&prefix).map(|(path, _)| path))
    }
}

/// Claimed identifiers of one namespace, mapped to the label of the claimer.
struct Namespace {
    claims: IndexMap<String, String>,
}

impl Namespace {
    fn new(reserved: &[(String, String)]) -> Self {
        Self {
            claims: reserved.iter().cloned().collect(),
        }
    }

    fn claim(&mut self, ident: &str, owner: &str) -> Result<(), Error> {
        if let Some(taken_by) = self.claims.get(ident) {
            return Err(Error::NamingCollision {
                name: ident.to_owned(),
                taken_by: taken_by.clone(),
            });
        }
        self.claims.insert(ident.to_owned(), owner.to_owned());
        Ok(())
    }

    fn assign<C: Conventions + ?Sized>(
        mut self,
        items: &[Item<'_>],
        policy: NamingPolicy,
        separator: &str,
        conventions: &C,
        entries: &mut BTreeMap<SchemaPath, Result<DeclNames, Error>>,
    ) {
        // 1) declared names first
        let mut unions: Vec<(SchemaPath, &UnionType, String)> = Vec::new();
        for item in items {
            let path = item.path();
            let ident = match item.decl {
                Declaration::Const(c) => conventions.const_ident(&c.name),
                decl => conventions.type_ident(decl.name()),
            };
            if let Err(error) = self.claim(&ident, &path.to_string()) {
                entries.insert(path, Err(error));
                continue;
            }
            match item.decl {
                Declaration::Union(u) => unions.push((path, u, ident)),
                Declaration::Struct(s) => {
                    let result = check_fields(conventions, &path.to_string(), s.fields()).map(|()| {
                        DeclNames {
                            ident,
                            variants: Vec::new(),
                            qualified: false,
                        }
                    });
                    entries.insert(path, result);
                }
                _ => {
                    entries.insert(
                        path,
                        Ok(DeclNames {
                            ident,
                            variants: Vec::new(),
                            qualified: false,
                        }),
                    );
                }
            }
        }

        // 2) occurrence counts of every flat candidate, order independent
        let mut counts: HashMap<String, usize> =
            self.claims.keys().map(|name| (name.clone(), 1)).collect();
        for (_, union, _) in &unions {
            for variant in union.variants() {
                *counts.entry(conventions.type_ident(variant.name())).or_default() += 1;
            }
        }

        // 3) variant names, all-or-nothing per union
        for (path, union, ident) in unions {
            let flat: Vec<String> = union
                .variants()
                .iter()
                .map(|v| conventions.type_ident(v.name()))
                .collect();
            let qualified = match policy {
                NamingPolicy::Flat => false,
                NamingPolicy::Qualified => true,
                NamingPolicy::Auto => flat.iter().any(|name| counts.get(name).copied() != Some(1)),
            };
            let variants: Vec<String> = if qualified {
                union
                    .variants()
                    .iter()
                    .map(|v| conventions.qualified_ident(union.name(), v.name(), separator))
                    .collect()
            } else {
                flat
            };

            let result = union
                .variants()
                .iter()
                .try_for_each(|v| check_fields(conventions, &format!("{path}.{}", v.name()), v.fields()))
                .and_then(|()| self.claim_all(&variants, &path))
                .map(|()| DeclNames {
                    ident,
                    variants,
                    qualified,
                });
            if let Err(error) = &result {
                tracing::debug!(%path, %error, "union naming failed");
            }
            entries.insert(path, result);
        }
    }

    fn claim_all(&mut self, idents: &[String], owner: &SchemaPath) -> Result<(), Error> {
        let owner = owner.to_string();
        let mut local = HashSet::new();
        for ident in idents {
            if let Some(taken_by) = self.claims.get(ident) {
                return Err(Error::NamingCollision {
                    name: ident.clone(),
                    taken_by: taken_by.clone(),
                });
            }
            if !local.insert(ident.as_str()) {
                return Err(Error::NamingCollision {
                    name: ident.clone(),
                    taken_by: owner,
                });
            }
        }
        for ident in idents {
            self.claim(ident, &owner)?;
        }
        Ok(())
    }
}

/// Fields of one record must stay distinct after conversion, in every
/// namespace they are emitted into. `owner` labels the record.
fn check_fields<C: Conventions + ?Sized>(conventions: &C, owner: &str, fields: &[Field]) -> Result<(), Error> {
    let mut namespaces: Vec<Namespace> = Vec::new();
    for field in fields {
        let label = format!("{owner}.{}", field.name);
        for (index, ident) in conventions.field_idents(&field.name).into_iter().enumerate() {
            if namespaces.len() <= index {
                namespaces.resize_with(index + 1, || Namespace::new(&[]));
            }
            namespaces[index].claim(&ident, &label)?;
        }
    }
    Ok(())
}
