//! Typed schema → language bindings.
//!
//! ```text
//! SchemaDoc ─lower─▶ ir::Schema ─(fold constants)─▶ NameTable ─codegen─▶ Output / File
//! ```
//!
//! The library never touches the filesystem past loading its inputs;
//! persisting [`codegen::File`]s is left to the caller (see the binary).

pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod fold;
pub mod ir;
pub mod lower;
pub mod naming;
pub mod schema;

pub use codegen::{Generation, Output};
pub use config::{GenConfig, Target};
pub use error::{BatchError, DeclError, Error, LoadError};
pub use schema::SchemaDoc;

/// Lower `doc` and generate bindings for it in one go.
pub fn generate(doc: &SchemaDoc, config: &GenConfig) -> Result<Generation, BatchError> {
    let lowered = lower::lower_to_ir(doc);
    codegen::generate(&lowered, config)
}
