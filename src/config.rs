//! Generator configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, LoadError};
use crate::naming::{NamingPolicy, is_valid_separator};

/// Target language of the emitted bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    #[default]
    Go,
    Rust,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Joins a union name and a variant name under qualified naming.
    pub namespace_separator: String,

    /// Largest tuple arity a generic declaration is emitted for.
    pub max_tuple_arity: usize,

    pub naming_policy: NamingPolicy,

    /// Abort the whole batch on the first failing declaration.
    pub strict: bool,

    /// Package (Go) or file stem (Rust) of the root module.
    pub package: String,

    pub target: Target,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            namespace_separator: "_".to_owned(),
            max_tuple_arity: 12,
            naming_policy: NamingPolicy::Auto,
            strict: false,
            package: "schema".to_owned(),
            target: Target::Go,
        }
    }
}

impl GenConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_tuple_arity < 2 {
            return Err(Error::InvalidConfig(format!(
                "max_tuple_arity must be at least 2, got {}",
                self.max_tuple_arity
            )));
        }
        if !is_valid_separator(&self.namespace_separator) {
            return Err(Error::InvalidConfig(format!(
                "namespace_separator `{}` may only contain ASCII letters, digits and `_`",
                self.namespace_separator
            )));
        }
        crate::naming::check_identifier(&self.package)
            .map_err(|_| Error::InvalidConfig(format!("package `{}` is not an identifier", self.package)))
    }

    pub fn from_json_str(src: &str) -> Result<Self, LoadError> {
        crate::schema::from_str_with_path(src)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let src = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&src)
    }
}
