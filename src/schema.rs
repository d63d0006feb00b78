//! Serde model of the already-parsed abstract schema, as handed over by a
//! front end in JSON form.
//!
//! ```json
//! { "declarations": [
//!     { "kind": "struct", "name": "Sample", "fields": [
//!         { "name": "size", "type": { "tuple": ["u32", "u32"] } } ] },
//!     { "kind": "const", "name": "VALUE_U8", "type": "u8", "value": { "int": "1" } }
//! ] }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::LoadError;
use crate::ir::{Literal, ScalarType};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDoc {
    #[serde(default)]
    pub declarations: Vec<DeclDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclDoc {
    Struct {
        name: String,
        #[serde(default)]
        comment: Option<String>,
        #[serde(default)]
        generics: Vec<String>,
        #[serde(default)]
        fields: Vec<FieldDoc>,
    },
    Union {
        name: String,
        #[serde(default)]
        comment: Option<String>,
        #[serde(default)]
        generics: Vec<String>,
        #[serde(default)]
        variants: Vec<VariantDoc>,
    },
    Alias {
        name: String,
        #[serde(default)]
        comment: Option<String>,
        target: TypeDoc,
    },
    Const {
        name: String,
        #[serde(default)]
        comment: Option<String>,
        #[serde(rename = "type")]
        ty: ScalarType,
        value: Literal,
    },
    Module {
        name: String,
        #[serde(default)]
        comment: Option<String>,
        #[serde(default)]
        declarations: Vec<DeclDoc>,
    },
}

impl DeclDoc {
    pub fn name(&self) -> &str {
        match self {
            Self::Struct { name, .. }
            | Self::Union { name, .. }
            | Self::Alias { name, .. }
            | Self::Const { name, .. }
            | Self::Module { name, .. } => name,
        }
    }

    /// Number of generic parameters when this declares a referable type.
    pub fn type_generics(&self) -> Option<usize> {
        match self {
            Self::Struct { generics, .. } | Self::Union { generics, .. } => Some(generics.len()),
            Self::Alias { .. } => Some(0),
            Self::Const { .. } | Self::Module { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDoc,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDoc {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Type reference: `"u32"`, `{ "tuple": [..] }`, `{ "list": .. }`,
/// `{ "array": [item, len] }`, `{ "option": .. }`, `{ "map": [key, value] }`,
/// `{ "hash_set": .. }`,
/// `{ "named": { "name": "geometry::Point", "generics": [..] } }` or
/// `{ "param": "T" }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDoc {
    Tuple(Vec<TypeDoc>),
    List(Box<TypeDoc>),
    Array(Box<TypeDoc>, usize),
    Option(Box<TypeDoc>),
    Map(Box<TypeDoc>, Box<TypeDoc>),
    HashSet(Box<TypeDoc>),
    Named {
        name: String,
        #[serde(default)]
        generics: Vec<TypeDoc>,
    },
    Param(String),
    #[serde(untagged)]
    Scalar(ScalarType),
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError::Json {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError::Json {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn load_schema(path: &Path) -> Result<SchemaDoc, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    from_slice_with_path(&bytes)
}
