// Strongly-typed schema model for codegen. No serde_json::Value here.
//
// Values are immutable once built; constructors enforce the invariants
// (tuple arity, unique fields/variants/generics, used generics).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ordered_float::OrderedFloat;
use serde::Deserialize;

use crate::error::{Error, LiteralKind};
use crate::naming::check_identifier;

// ————————————————————————————————————————————————————————————————————————————
// SCALARS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    String,
    Bytes,
}

impl ScalarType {
    /// Fixed bit width, `None` for variable-length types.
    pub fn bit_width(self) -> Option<u32> {
        match self {
            Self::Bool => Some(1),
            Self::U8 | Self::I8 => Some(8),
            Self::U16 | Self::I16 => Some(16),
            Self::U32 | Self::I32 | Self::F32 => Some(32),
            Self::U64 | Self::I64 | Self::F64 => Some(64),
            Self::U128 | Self::I128 => Some(128),
            Self::String | Self::Bytes => None,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::I128 | Self::F32 | Self::F64
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::U128
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::I128
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PATHS
// ————————————————————————————————————————————————————————————————————————————

/// Fully-qualified location of a declaration: module segments followed by
/// the declaration name, rendered as `geometry::Point`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaPath(Vec<String>);

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Module part of the path (everything but the last segment).
    pub fn module(&self) -> &[String] {
        match self.0.split_last() {
            Some((_, module)) => module,
            None => &[],
        }
    }

    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("::"))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE REFERENCES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Scalar(ScalarType),
    Tuple(TupleType),
    List(Box<TypeRef>),
    /// Fixed-size array of the given length.
    Array(Box<TypeRef>, usize),
    Option(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    HashSet(Box<TypeRef>),
    /// Declared struct, union or alias, resolved to its absolute path.
    Named {
        path: SchemaPath,
        generics: Vec<TypeRef>,
    },
    /// Generic parameter of the enclosing declaration.
    Param(String),
}

/// Kind of a type or declaration, as answered by the shape query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar(ScalarType),
    Tuple(usize),
    List,
    Array(usize),
    Option,
    Map,
    HashSet,
    Named,
    Param,
    Struct,
    Union,
    Alias,
    Const,
    Module,
}

/// Kind plus direct children of a type or declaration.
#[derive(Debug, Clone)]
pub struct Shape<'a> {
    pub kind: Kind,
    pub children: Vec<&'a TypeRef>,
}

impl TypeRef {
    pub fn shape(&self) -> Shape<'_> {
        let (kind, children) = match self {
            Self::Scalar(scalar) => (Kind::Scalar(*scalar), Vec::new()),
            Self::Tuple(tuple) => (Kind::Tuple(tuple.arity()), tuple.elements.iter().collect()),
            Self::List(item) => (Kind::List, vec![&**item]),
            Self::Array(item, len) => (Kind::Array(*len), vec![&**item]),
            Self::Option(item) => (Kind::Option, vec![&**item]),
            Self::Map(key, value) => (Kind::Map, vec![&**key, &**value]),
            Self::HashSet(item) => (Kind::HashSet, vec![&**item]),
            Self::Named { generics, .. } => (Kind::Named, generics.iter().collect()),
            Self::Param(_) => (Kind::Param, Vec::new()),
        };
        Shape { kind, children }
    }

    /// Pre-order walk over this type and every nested type.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypeRef)) {
        visit(self);
        for child in self.shape().children {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleType {
    elements: Vec<TypeRef>,
}

impl TupleType {
    pub fn new(elements: Vec<TypeRef>) -> Result<Self, Error> {
        if elements.len() < 2 {
            return Err(Error::InvalidArity {
                arity: elements.len(),
            });
        }
        Ok(Self { elements })
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[TypeRef] {
        &self.elements
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub comment: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            comment: None,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    name: String,
    generics: Vec<String>,
    fields: Vec<Field>,
    comment: Option<String>,
}

impl StructType {
    pub fn new(
        name: impl Into<String>,
        generics: Vec<String>,
        fields: Vec<Field>,
    ) -> Result<Self, Error> {
        let name = name.into();
        check_identifier(&name)?;
        check_fields(&fields)?;
        check_generics(&generics, fields.iter())?;
        Ok(Self {
            name,
            generics,
            fields,
            comment: None,
        })
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn generics(&self) -> &[String] {
        &self.generics
    }

    /// Fields in declared order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// One alternative of a union; structurally a struct without generics of
/// its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    name: String,
    fields: Vec<Field>,
    comment: Option<String>,
}

impl Variant {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self, Error> {
        let name = name.into();
        check_identifier(&name)?;
        check_fields(&fields)?;
        Ok(Self {
            name,
            fields,
            comment: None,
        })
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Subset of `generics` (in their declared order) this variant uses.
    pub fn used_generics<'a>(&self, generics: &'a [String]) -> Vec<&'a str> {
        let used = params_in(self.fields.iter());
        generics
            .iter()
            .filter(|g| used.contains(g.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Closed set of variants. Nothing outside the definition can add one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    name: String,
    generics: Vec<String>,
    variants: Vec<Variant>,
    comment: Option<String>,
}

impl UnionType {
    pub fn new(
        name: impl Into<String>,
        generics: Vec<String>,
        variants: Vec<Variant>,
    ) -> Result<Self, Error> {
        let name = name.into();
        check_identifier(&name)?;
        let mut seen = BTreeSet::new();
        for variant in &variants {
            if !seen.insert(variant.name.as_str()) {
                return Err(Error::DuplicateVariant {
                    variant: variant.name.clone(),
                });
            }
        }
        check_generics(&generics, variants.iter().flat_map(|v| v.fields.iter()))?;
        Ok(Self {
            name,
            generics,
            variants,
            comment: None,
        })
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn generics(&self) -> &[String] {
        &self.generics
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasType {
    pub name: String,
    pub target: TypeRef,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecl {
    pub name: String,
    pub value: ConstantValue,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub comment: Option<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Struct(StructType),
    Union(UnionType),
    Alias(AliasType),
    Const(ConstDecl),
    Module(Module),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(s) => s.name(),
            Self::Union(u) => u.name(),
            Self::Alias(a) => &a.name,
            Self::Const(c) => &c.name,
            Self::Module(m) => &m.name,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Struct(s) => s.comment(),
            Self::Union(u) => u.comment(),
            Self::Alias(a) => a.comment.as_deref(),
            Self::Const(c) => c.comment.as_deref(),
            Self::Module(m) => m.comment.as_deref(),
        }
    }

    pub fn shape(&self) -> Shape<'_> {
        let (kind, children) = match self {
            Self::Struct(s) => (Kind::Struct, s.fields.iter().map(|f| &f.ty).collect()),
            Self::Union(u) => (
                Kind::Union,
                u.variants
                    .iter()
                    .flat_map(|v| v.fields.iter().map(|f| &f.ty))
                    .collect(),
            ),
            Self::Alias(a) => (Kind::Alias, vec![&a.target]),
            Self::Const(_) => (Kind::Const, Vec::new()),
            Self::Module(_) => (Kind::Module, Vec::new()),
        };
        Shape { kind, children }
    }
}

/// Lowered schema: the root module's declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub declarations: Vec<Declaration>,
}

/// A non-module declaration together with the path of its module.
#[derive(Debug, Clone)]
pub struct Item<'a> {
    pub module: SchemaPath,
    pub decl: &'a Declaration,
}

impl Item<'_> {
    pub fn path(&self) -> SchemaPath {
        self.module.child(self.decl.name())
    }
}

impl Schema {
    /// Every non-module declaration, depth-first in declaration order.
    pub fn items(&self) -> Vec<Item<'_>> {
        fn visit<'a>(module: &SchemaPath, declarations: &'a [Declaration], out: &mut Vec<Item<'a>>) {
            for decl in declarations {
                match decl {
                    Declaration::Module(m) => visit(&module.child(&m.name), &m.declarations, out),
                    _ => out.push(Item {
                        module: module.clone(),
                        decl,
                    }),
                }
            }
        }
        let mut out = Vec::new();
        visit(&SchemaPath::root(), &self.declarations, &mut out);
        out
    }

    /// Comments of every commented module, by module path.
    pub fn module_comments(&self) -> BTreeMap<Vec<String>, String> {
        fn visit(module: &SchemaPath, declarations: &[Declaration], out: &mut BTreeMap<Vec<String>, String>) {
            for decl in declarations {
                if let Declaration::Module(m) = decl {
                    let path = module.child(&m.name);
                    if let Some(comment) = &m.comment {
                        out.insert(path.segments().to_vec(), comment.clone());
                    }
                    visit(&path, &m.declarations, out);
                }
            }
        }
        let mut out = BTreeMap::new();
        visit(&SchemaPath::root(), &self.declarations, &mut out);
        out
    }

    /// Paths of every module, root first.
    pub fn modules(&self) -> Vec<SchemaPath> {
        fn visit(module: SchemaPath, declarations: &[Declaration], out: &mut Vec<SchemaPath>) {
            out.push(module.clone());
            for decl in declarations {
                if let Declaration::Module(m) = decl {
                    visit(module.child(&m.name), &m.declarations, out);
                }
            }
        }
        let mut out = Vec::new();
        visit(SchemaPath::root(), &self.declarations, &mut out);
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTANTS
// ————————————————————————————————————————————————————————————————————————————

/// Literal token as it appears in the abstract schema, before folding.
///
/// Integers stay textual so values past 64 bits survive the JSON layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Bool(bool),
    Int(String),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Self::Bool(_) => LiteralKind::Bool,
            Self::Int(_) => LiteralKind::Int,
            Self::Float(_) => LiteralKind::Float,
            Self::String(_) => LiteralKind::String,
            Self::Bytes(_) => LiteralKind::Bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    Unsigned(u128),
    Signed(i128),
    Float(OrderedFloat<f64>),
    String(String),
    Bytes(Vec<u8>),
}

/// A literal that has been checked against its declared type. Only
/// [`crate::fold`] builds these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstantValue {
    ty: ScalarType,
    value: Value,
}

impl ConstantValue {
    pub(crate) fn new(ty: ScalarType, value: Value) -> Self {
        Self { ty, value }
    }

    pub fn ty(&self) -> ScalarType {
        self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATION HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn check_fields(fields: &[Field]) -> Result<(), Error> {
    let mut seen = BTreeSet::new();
    for field in fields {
        check_identifier(&field.name)?;
        if !seen.insert(field.name.as_str()) {
            return Err(Error::DuplicateField {
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_generics<'a>(
    generics: &[String],
    fields: impl Iterator<Item = &'a Field>,
) -> Result<(), Error> {
    let mut seen = BTreeSet::new();
    for name in generics {
        check_identifier(name)?;
        if !seen.insert(name.as_str()) {
            return Err(Error::DuplicateGeneric { name: name.clone() });
        }
    }
    let used = params_in(fields);
    match generics.iter().find(|g| !used.contains(g.as_str())) {
        Some(name) => Err(Error::UnusedGeneric { name: name.clone() }),
        None => Ok(()),
    }
}

/// Names of every generic parameter referenced by the given fields.
fn params_in<'a>(fields: impl Iterator<Item = &'a Field>) -> BTreeSet<&'a str> {
    let mut used = BTreeSet::new();
    for field in fields {
        field.ty.walk(&mut |ty| {
            if let TypeRef::Param(name) = ty {
                used.insert(name.as_str());
            }
        });
    }
    used
}
