//! Binding generator: turns the lowered schema into target-language source.
//!
//! Per run the generator builds the name table once, fails every
//! declaration that cannot be emitted (and, transitively, everything that
//! refers to it), plans the tuple arities the survivors use, then renders
//! them. Rendering is a pure function per declaration and runs on the rayon
//! pool; results are collected in declaration order so output is
//! byte-identical across runs.
//!
//! The `TupleN` generics live in a module of their own, [`TUPLES_MODULE`],
//! directly under the root. It imports nothing, so referring to it never
//! closes an import cycle.

pub mod go;
pub mod rust;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use heck::ToUpperCamelCase;
use once_cell::sync::OnceCell;
use rayon::prelude::*;

use crate::config::{GenConfig, Target};
use crate::error::{BatchError, DeclError, Error};
use crate::ir::{
    AliasType, ConstDecl, Declaration, Item, SchemaPath, StructType, TypeRef, UnionType,
};
use crate::lower::Lowered;
use crate::naming::{Conventions, DeclNames, NameTable};

pub use go::GoBackend;
pub use rust::RustBackend;

/// Name of the module holding the `TupleN` generics.
pub const TUPLES_MODULE: &str = "tuples";

/// Module comments keyed by module path (root = empty).
pub type ModuleComments = BTreeMap<Vec<String>, String>;

// ————————————————————————————————————————————————————————————————————————————
// OUTPUT
// ————————————————————————————————————————————————————————————————————————————

/// One emitted identifier and its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub identifier: String,
    /// Schema module the text belongs to (root = empty).
    pub module: Vec<String>,
    pub source: String,
    /// Imports the text needs (Go import paths).
    pub imports: BTreeSet<String>,
}

impl Output {
    pub fn new(identifier: impl Into<String>, module: &[String], source: String) -> Self {
        Self {
            identifier: identifier.into(),
            module: module.to_vec(),
            source,
            imports: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_imports(mut self, imports: impl IntoIterator<Item = String>) -> Self {
        self.imports.extend(imports);
        self
    }
}

/// A file ready to be persisted, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: PathBuf,
    pub contents: String,
}

/// Indentation-aware text buffer the backends write into.
#[derive(Debug, Clone)]
pub struct Codegen {
    buf: String,
    depth: usize,
    unit: &'static str,
}

impl Codegen {
    pub fn new(unit: &'static str) -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            unit,
        }
    }

    /// Write one line at the current depth; an empty line gets no indent.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(self.unit);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// `open`, the body one level deeper, then `close`.
    pub fn block(&mut self, open: impl AsRef<str>, close: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.line(open);
        self.indent(body);
        self.line(close);
    }

    pub fn indent(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    /// One `{prefix} line` per line of `text`; nothing without a comment.
    pub fn comment(&mut self, prefix: &str, text: Option<&str>) {
        for line in text.into_iter().flat_map(str::lines) {
            let line = line.trim_end();
            if line.is_empty() {
                self.line(prefix);
            } else {
                self.line(format!("{prefix} {line}"));
            }
        }
    }

    /// Append already-rendered text, indenting each non-empty line.
    pub fn embed(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

pub(crate) fn header() -> String {
    format!(
        "// Code generated by {} (v{}). DO NOT EDIT.\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}

// ————————————————————————————————————————————————————————————————————————————
// BACKEND
// ————————————————————————————————————————————————————————————————————————————

/// What a backend sees while rendering one declaration.
pub struct RenderCx<'a> {
    pub config: &'a GenConfig,
    pub names: &'a NameTable,
    pub module: &'a [String],
}

impl RenderCx<'_> {
    /// Emitted identifier of a referenced declaration.
    pub fn ident_of(&self, path: &SchemaPath) -> String {
        match self.names.ident(path) {
            Some(ident) => ident.to_owned(),
            // unreachable once dependency failures are propagated
            None => path.name().to_upper_camel_case(),
        }
    }

    pub fn in_root(&self) -> bool {
        self.module.is_empty()
    }
}

pub trait Backend: Conventions + Sync {
    fn target(&self) -> Target;

    fn render_struct(&self, cx: &RenderCx<'_>, s: &StructType, ident: &str) -> Output;

    /// Contract first, then one output per variant in declared order.
    fn render_union(&self, cx: &RenderCx<'_>, u: &UnionType, names: &DeclNames) -> Vec<Output>;

    fn render_alias(&self, cx: &RenderCx<'_>, a: &AliasType, ident: &str) -> Output;

    fn render_const(&self, cx: &RenderCx<'_>, c: &ConstDecl, ident: &str) -> Output;

    fn render_tuple(&self, tuple: &TupleBinding) -> Output;

    /// Whether two modules may not refer to each other (Go packages).
    fn forbids_import_cycles(&self) -> bool {
        false
    }

    /// Group outputs into files.
    fn assemble(&self, config: &GenConfig, outputs: &[Output], comments: &ModuleComments) -> Vec<File>;
}

// ————————————————————————————————————————————————————————————————————————————
// TUPLES
// ————————————————————————————————————————————————————————————————————————————

/// Generic positional record of one arity: `TupleN<T1..TN>` with fields
/// `F1..FN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleBinding {
    pub arity: usize,
    pub type_params: Vec<String>,
    pub fields: Vec<String>,
}

impl TupleBinding {
    fn new(arity: usize) -> Self {
        Self {
            arity,
            type_params: (1..=arity).map(|i| format!("T{i}")).collect(),
            fields: (1..=arity).map(|i| format!("F{i}")).collect(),
        }
    }

    pub fn ident(&self) -> String {
        tuple_ident(self.arity)
    }
}

pub fn tuple_ident(arity: usize) -> String {
    format!("Tuple{arity}")
}

/// Module path of the `TupleN` generics.
pub fn tuples_module() -> Vec<String> {
    vec![TUPLES_MODULE.to_owned()]
}

/// Arity → generic declaration, filled on demand up to the ceiling.
#[derive(Debug, Clone)]
pub struct TupleArena {
    max: usize,
    bindings: BTreeMap<usize, TupleBinding>,
}

impl TupleArena {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            bindings: BTreeMap::new(),
        }
    }

    pub fn check(&self, arity: usize) -> Result<(), Error> {
        if arity < 2 {
            return Err(Error::InvalidArity { arity });
        }
        if arity > self.max {
            return Err(Error::UnsupportedArity {
                arity,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn request(&mut self, arity: usize) -> Result<&TupleBinding, Error> {
        self.check(arity)?;
        Ok(self
            .bindings
            .entry(arity)
            .or_insert_with(|| TupleBinding::new(arity)))
    }

    /// Bindings in ascending arity.
    pub fn bindings(&self) -> impl Iterator<Item = &TupleBinding> {
        self.bindings.values()
    }
}

fn tuple_arities(decl: &Declaration) -> BTreeSet<usize> {
    let mut arities = BTreeSet::new();
    for ty in decl.shape().children {
        ty.walk(&mut |t| {
            if let TypeRef::Tuple(tuple) = t {
                arities.insert(tuple.arity());
            }
        });
    }
    arities
}

fn referenced_paths(decl: &Declaration) -> BTreeSet<&SchemaPath> {
    let mut paths = BTreeSet::new();
    for ty in decl.shape().children {
        ty.walk(&mut |t| {
            if let TypeRef::Named { path, .. } = t {
                paths.insert(path);
            }
        });
    }
    paths
}

// ————————————————————————————————————————————————————————————————————————————
// GENERATOR
// ————————————————————————————————————————————————————————————————————————————

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub outputs: Vec<Output>,
    pub files: Vec<File>,
    /// Declarations that were skipped, in declaration order.
    pub failures: Vec<DeclError>,
}

impl Generation {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Generator<'s, B> {
    lowered: &'s Lowered,
    config: GenConfig,
    backend: B,
    names: OnceCell<NameTable>,
}

type Status<'n> = Result<&'n DeclNames, Error>;

impl<'s, B: Backend> Generator<'s, B> {
    pub fn new(lowered: &'s Lowered, config: GenConfig, backend: B) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            lowered,
            config,
            backend,
            names: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Name table of this run, built on first use and read-only afterwards.
    pub fn names(&self) -> &NameTable {
        self.names.get_or_init(|| {
            let reserved = [(
                self.backend.module_ident(TUPLES_MODULE),
                "tuple generics".to_owned(),
            )];
            NameTable::build(
                &self.lowered.schema,
                self.config.naming_policy,
                &self.config.namespace_separator,
                &self.backend,
                &reserved,
            )
        })
    }

    pub fn generate(&self) -> Result<Generation, BatchError> {
        let items = self.lowered.schema.items();
        let names = self.names();
        let mut arena = TupleArena::new(self.config.max_tuple_arity);

        // 1) per-declaration failures: module naming, arity ceiling, naming
        let mut status: Vec<Status<'_>> = items
            .iter()
            .map(|item| {
                if let Some(module) = names.failed_ancestor(&item.module) {
                    return Err(Error::DependencyFailed {
                        name: module.to_string(),
                    });
                }
                if let Some(error) = tuple_arities(item.decl).into_iter().find_map(|a| arena.check(a).err()) {
                    return Err(error);
                }
                match names.get(&item.path()) {
                    Some(Ok(entry)) => Ok(entry),
                    Some(Err(error)) => Err(error.clone()),
                    None => Err(Error::UnknownType {
                        name: item.path().to_string(),
                    }),
                }
            })
            .collect();

        // 2) anything referring to a failed declaration fails too; a rejected
        // duplicate shares its path with the declaration that stays
        let mut failed: BTreeSet<SchemaPath> = self
            .lowered
            .failures
            .iter()
            .filter(|f| !matches!(f.error, Error::DuplicateDeclaration { .. }))
            .map(|f| f.path.clone())
            .collect();
        propagate(&items, &mut status, &mut failed);

        // 3) packages that would import each other
        if self.backend.forbids_import_cycles() {
            for (index, error) in import_cycles(&items, &status) {
                status[index] = Err(error);
            }
            propagate(&items, &mut status, &mut failed);
        }

        // 4) collect failures; lowering runs first, so its failures lead
        let mut failures: Vec<DeclError> = self.lowered.failures.clone();
        for (module, error) in names.failed_modules() {
            tracing::warn!(%module, %error, "skipping module");
            failures.push(DeclError::new(module.clone(), error.clone()));
        }
        for (item, state) in items.iter().zip(&status) {
            if let Err(error) = state {
                tracing::warn!(path = %item.path(), %error, "skipping declaration");
                failures.push(DeclError::new(item.path(), error.clone()));
            }
        }
        if self.config.strict {
            if let Some(first) = failures.first() {
                return Err(BatchError::Aborted(first.clone()));
            }
        }

        // 5) plan tuple arities from what is left, then render
        let ready: Vec<(&Item<'_>, &DeclNames)> = items
            .iter()
            .zip(&status)
            .filter_map(|(item, state)| state.as_ref().ok().map(|names| (item, *names)))
            .collect();
        for (item, _) in &ready {
            for arity in tuple_arities(item.decl) {
                arena
                    .request(arity)
                    .map_err(|error| BatchError::Aborted(DeclError::new(item.path(), error)))?;
            }
        }
        let rendered: Vec<Vec<Output>> = ready
            .par_iter()
            .map(|(item, decl_names)| self.render_item(item, decl_names))
            .collect();

        let mut outputs: Vec<Output> = arena
            .bindings()
            .map(|tuple| {
                tracing::debug!(arity = tuple.arity, "emitting tuple generic");
                self.backend.render_tuple(tuple)
            })
            .collect();
        outputs.extend(rendered.into_iter().flatten());

        let comments = self.lowered.schema.module_comments();
        let files = self.backend.assemble(&self.config, &outputs, &comments);
        tracing::info!(
            target_lang = ?self.backend.target(),
            outputs = outputs.len(),
            files = files.len(),
            failures = failures.len(),
            "generation finished"
        );
        Ok(Generation {
            outputs,
            files,
            failures,
        })
    }

    fn render_item(&self, item: &Item<'_>, names: &DeclNames) -> Vec<Output> {
        let cx = RenderCx {
            config: &self.config,
            names: self.names(),
            module: item.module.segments(),
        };
        tracing::debug!(path = %item.path(), ident = %names.ident, "rendering declaration");
        match item.decl {
            Declaration::Struct(s) => vec![self.backend.render_struct(&cx, s, &names.ident)],
            Declaration::Union(u) => self.backend.render_union(&cx, u, names),
            Declaration::Alias(a) => vec![self.backend.render_alias(&cx, a, &names.ident)],
            Declaration::Const(c) => vec![self.backend.render_const(&cx, c, &names.ident)],
            Declaration::Module(_) => Vec::new(),
        }
    }
}

/// Fail every declaration that refers to a failed one, until nothing
/// changes.
fn propagate(items: &[Item<'_>], status: &mut [Status<'_>], failed: &mut BTreeSet<SchemaPath>) {
    loop {
        for (item, state) in items.iter().zip(status.iter()) {
            if state.is_err() {
                failed.insert(item.path());
            }
        }
        let mut changed = false;
        for (item, state) in items.iter().zip(status.iter_mut()) {
            if state.is_ok() {
                if let Some(dep) = referenced_paths(item.decl).into_iter().find(|p| failed.contains(*p)) {
                    *state = Err(Error::DependencyFailed {
                        name: dep.to_string(),
                    });
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

/// Ready declarations whose references to another module close a cycle
/// between modules, keyed by item index.
fn import_cycles(items: &[Item<'_>], status: &[Status<'_>]) -> Vec<(usize, Error)> {
    let mut edges: BTreeMap<&[String], BTreeSet<&[String]>> = BTreeMap::new();
    for (item, state) in items.iter().zip(status) {
        if state.is_ok() {
            for path in referenced_paths(item.decl) {
                if path.module() != item.module.segments() {
                    edges.entry(item.module.segments()).or_default().insert(path.module());
                }
            }
        }
    }

    let reaches = |from: &[String], to: &[String]| {
        let mut seen = BTreeSet::new();
        let mut stack = vec![from];
        while let Some(module) = stack.pop() {
            if module == to {
                return true;
            }
            if seen.insert(module) {
                stack.extend(edges.get(module).into_iter().flatten().copied());
            }
        }
        false
    };

    let mut cyclic = Vec::new();
    for (index, (item, state)) in items.iter().zip(status).enumerate() {
        if state.is_err() {
            continue;
        }
        let module = item.module.segments();
        let target = referenced_paths(item.decl)
            .into_iter()
            .find(|path| path.module() != module && reaches(path.module(), module));
        if let Some(target) = target {
            cyclic.push((
                index,
                Error::ImportCycle {
                    module: item.module.to_string(),
                    target: target.to_string(),
                },
            ));
        }
    }
    cyclic
}

/// Generate bindings for a lowered schema with the backend named by
/// `config.target`. Lowering failures are carried into the result.
pub fn generate(lowered: &Lowered, config: &GenConfig) -> Result<Generation, BatchError> {
    match config.target {
        Target::Go => run(lowered, config, GoBackend),
        Target::Rust => run(lowered, config, RustBackend),
    }
}

fn run<B: Backend>(lowered: &Lowered, config: &GenConfig, backend: B) -> Result<Generation, BatchError> {
    Generator::new(lowered, config.clone(), backend)
        .map_err(BatchError::Config)?
        .generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_enforces_the_ceiling() {
        let mut arena = TupleArena::new(3);
        assert_eq!(
            arena.request(4),
            Err(Error::UnsupportedArity { arity: 4, max: 3 })
        );
        let three = arena.request(3).unwrap().clone();
        assert_eq!(three.fields, ["F1", "F2", "F3"]);
        assert_eq!(three.type_params, ["T1", "T2", "T3"]);
        assert_eq!(three.ident(), "Tuple3");
        assert_eq!(arena.request(1), Err(Error::InvalidArity { arity: 1 }));
    }

    #[test]
    fn arena_holds_one_binding_per_arity() {
        let mut arena = TupleArena::new(12);
        for arity in [5, 2, 5, 2, 3] {
            arena.request(arity).unwrap();
        }
        let arities: Vec<_> = arena.bindings().map(|t| t.arity).collect();
        assert_eq!(arities, [2, 3, 5]);
    }

    #[test]
    fn codegen_indents_blocks() {
        let mut cg = Codegen::new("\t");
        cg.block("type A struct {", "}", |cg| {
            cg.line("X int");
            cg.blank();
            cg.line("Y int");
        });
        assert_eq!(cg.into_string(), "type A struct {\n\tX int\n\n\tY int\n}\n");
    }

    #[test]
    fn codegen_prefixes_comment_lines() {
        let mut cg = Codegen::new("    ");
        cg.comment("///", None);
        cg.indent(|cg| cg.comment("///", Some("First.\n\nSecond.  ")));
        assert_eq!(cg.into_string(), "    /// First.\n    ///\n    /// Second.\n");
    }
}
