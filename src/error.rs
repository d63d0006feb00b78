//! Error kinds raised while lowering, folding, naming and generating.
//!
//! Every schema error is deterministic: the same schema always fails the
//! same way, so nothing here is retried. Failures are attached to the
//! declaration that caused them through [`DeclError`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ir::{ScalarType, SchemaPath};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("tuples need at least 2 elements, found {arity}")]
    InvalidArity { arity: usize },

    #[error("field `{field}` is declared more than once")]
    DuplicateField { field: String },

    #[error("variant `{variant}` is declared more than once")]
    DuplicateVariant { variant: String },

    #[error("generic parameter `{name}` is declared more than once")]
    DuplicateGeneric { name: String },

    #[error("generic parameter `{name}` is never used by any field")]
    UnusedGeneric { name: String },

    #[error("`{name}` is already declared in this module")]
    DuplicateDeclaration { name: String },

    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    #[error("`{name}` takes {expected} generic argument(s) but {found} were given")]
    GenericArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("`{name}` is not a valid identifier")]
    InvalidIdentifier { name: String },

    #[error("literal `{literal}` is out of range for `{ty}`")]
    Range { ty: ScalarType, literal: String },

    #[error("{literal} literal cannot back a `{ty}` value")]
    TypeMismatch { ty: ScalarType, literal: LiteralKind },

    #[error("`{token}` is not a valid integer literal")]
    InvalidLiteral { token: String },

    #[error("tuples with {arity} elements exceed the configured maximum of {max}")]
    UnsupportedArity { arity: usize, max: usize },

    #[error("emitted name `{name}` is already taken by `{taken_by}`")]
    NamingCollision { name: String, taken_by: String },

    #[error("depends on `{name}`, which failed to generate")]
    DependencyFailed { name: String },

    #[error("referring to `{target}` makes module `{module}` part of an import cycle")]
    ImportCycle { module: String, target: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Shape of a literal token, used to report mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Bool,
    Int,
    Float,
    String,
    Bytes,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
        })
    }
}

/// An [`Error`] tied to the fully-qualified schema path of the declaration
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {error}")]
pub struct DeclError {
    pub path: SchemaPath,
    #[source]
    pub error: Error,
}

impl DeclError {
    pub fn new(path: SchemaPath, error: Error) -> Self {
        Self { path, error }
    }
}

/// Why a whole batch produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(Error),

    /// Strict mode stops at the first failing declaration.
    #[error("generation aborted at {0}")]
    Aborted(DeclError),
}

/// Failure to bring a schema document or config file into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("at JSON path {path} → {message}")]
    Json { path: String, message: String },
}
