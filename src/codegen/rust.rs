//! Rust bindings.
//!
//! Unions are enums whose variants wrap one struct each, so matching on the
//! enum is checked for exhaustiveness by the compiler. Everything lands in
//! a single `{package}.rs` with one nested `pub mod` per schema module, plus
//! `pub mod tuples` for the `TupleN` generics.

use std::collections::BTreeMap;
use std::path::PathBuf;

use heck::{ToShoutySnakeCase, ToSnakeCase};

use super::{
    Backend, Codegen, File, ModuleComments, Output, RenderCx, TupleBinding, header, tuple_ident,
    tuples_module,
};
use crate::config::{GenConfig, Target};
use crate::ir::{AliasType, ConstDecl, Field, ScalarType, StructType, TypeRef, UnionType, Value};
use crate::naming::{Conventions, DeclNames};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "try", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "typeof",
    "unsized", "virtual", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "super", "Self"];

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl Conventions for RustBackend {
    fn const_ident(&self, name: &str) -> String {
        name.to_shouty_snake_case()
    }

    fn field_idents(&self, name: &str) -> Vec<String> {
        vec![field_ident(name)]
    }

    fn module_ident(&self, segment: &str) -> String {
        escape(segment.to_snake_case())
    }
}

fn escape(ident: String) -> String {
    if RESERVED.contains(&ident.as_str()) {
        format!("{ident}_")
    } else if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else {
        ident
    }
}

fn field_ident(name: &str) -> String {
    escape(name.to_snake_case())
}

fn generic_list<S: AsRef<str>>(params: &[S]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let params: Vec<&str> = params.iter().map(AsRef::as_ref).collect();
    format!("<{}>", params.join(", "))
}

/// Attributes every emitted type carries.
fn attributes(cg: &mut Codegen, ident: &str) {
    if ident.contains('_') {
        cg.line("#[allow(non_camel_case_types)]");
    }
    cg.line("#[derive(Clone, Debug, PartialEq)]");
}

/// Path from the module being rendered to an item of `target`.
fn relative_path(from: &[String], target: &[String], ident: &str) -> String {
    let common = from.iter().zip(target).take_while(|(a, b)| a == b).count();
    let mut segments: Vec<String> = std::iter::repeat_n("super".to_owned(), from.len() - common).collect();
    segments.extend(target[common..].iter().map(|s| RustBackend.module_ident(s)));
    segments.push(ident.to_owned());
    segments.join("::")
}

fn scalar(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool => "bool",
        ScalarType::U8 => "u8",
        ScalarType::U16 => "u16",
        ScalarType::U32 => "u32",
        ScalarType::U64 => "u64",
        ScalarType::U128 => "u128",
        ScalarType::I8 => "i8",
        ScalarType::I16 => "i16",
        ScalarType::I32 => "i32",
        ScalarType::I64 => "i64",
        ScalarType::I128 => "i128",
        ScalarType::F32 => "f32",
        ScalarType::F64 => "f64",
        ScalarType::String => "String",
        ScalarType::Bytes => "Vec<u8>",
    }
}

fn ty(cx: &RenderCx<'_>, t: &TypeRef) -> String {
    let args = |types: &[TypeRef]| {
        let rendered: Vec<String> = types.iter().map(|t| ty(cx, t)).collect();
        generic_list(&rendered)
    };
    match t {
        TypeRef::Scalar(s) => scalar(*s).to_owned(),
        TypeRef::Tuple(tuple) => format!(
            "{}{}",
            relative_path(cx.module, &tuples_module(), &tuple_ident(tuple.arity())),
            args(tuple.elements())
        ),
        TypeRef::List(item) => format!("Vec<{}>", ty(cx, item)),
        TypeRef::Array(item, len) => format!("[{}; {len}]", ty(cx, item)),
        TypeRef::Option(item) => format!("Option<{}>", ty(cx, item)),
        TypeRef::Map(key, value) => format!(
            "::std::collections::BTreeMap<{}, {}>",
            ty(cx, key),
            ty(cx, value)
        ),
        TypeRef::HashSet(item) => format!("::std::collections::HashSet<{}>", ty(cx, item)),
        TypeRef::Named { path, generics } => format!(
            "{}{}",
            relative_path(cx.module, path.module(), &cx.ident_of(path)),
            args(generics)
        ),
        TypeRef::Param(name) => name.clone(),
    }
}

/// A rendered field: emitted name, type and doc comment.
struct FieldLine<'a> {
    name: String,
    ty: String,
    comment: Option<&'a str>,
}

/// `pub struct X {..}` plus `impl X { pub fn new(..) -> Self }`.
fn record(cg: &mut Codegen, ident: &str, generics: &[&str], fields: &[FieldLine<'_>], comment: Option<&str>) {
    let params = generic_list(generics);
    cg.comment("///", comment);
    attributes(cg, ident);
    if fields.is_empty() {
        cg.line(format!("pub struct {ident}{params} {{}}"));
    } else {
        cg.block(format!("pub struct {ident}{params} {{"), "}", |cg| {
            for field in fields {
                cg.comment("///", field.comment);
                cg.line(format!("pub {}: {},", field.name, field.ty));
            }
        });
    }
    cg.blank();

    let args: Vec<String> = fields.iter().map(|f| format!("{}: {}", f.name, f.ty)).collect();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    cg.block(format!("impl{params} {ident}{params} {{"), "}", |cg| {
        cg.line("#[must_use]");
        cg.block(format!("pub fn new({}) -> Self {{", args.join(", ")), "}", |cg| {
            if names.is_empty() {
                cg.line("Self {}");
            } else {
                cg.line(format!("Self {{ {} }}", names.join(", ")));
            }
        });
    });
}

fn fields<'a>(cx: &RenderCx<'_>, fields: &'a [Field]) -> Vec<FieldLine<'a>> {
    fields
        .iter()
        .map(|f| FieldLine {
            name: field_ident(&f.name),
            ty: ty(cx, &f.ty),
            comment: f.comment.as_deref(),
        })
        .collect()
}

fn literal(value: &Value, scalar: ScalarType) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Unsigned(n) => n.to_string(),
        Value::Signed(n) => n.to_string(),
        Value::Float(f) if scalar == ScalarType::F32 => format!("{:?}", f.into_inner() as f32),
        Value::Float(f) => format!("{:?}", f.into_inner()),
        Value::String(s) => format!("{s:?}"),
        Value::Bytes(bytes) => {
            let bytes: Vec<String> = bytes.iter().map(u8::to_string).collect();
            format!("&[{}]", bytes.join(", "))
        }
    }
}

impl Backend for RustBackend {
    fn target(&self) -> Target {
        Target::Rust
    }

    fn render_struct(&self, cx: &RenderCx<'_>, s: &StructType, ident: &str) -> Output {
        let mut cg = Codegen::new(INDENT);
        let generics: Vec<&str> = s.generics().iter().map(String::as_str).collect();
        record(&mut cg, ident, &generics, &fields(cx, s.fields()), s.comment());
        Output::new(ident, cx.module, cg.into_string())
    }

    fn render_union(&self, cx: &RenderCx<'_>, u: &UnionType, names: &DeclNames) -> Vec<Output> {
        let ident = names.ident.as_str();
        let params = generic_list(u.generics());
        let cases: Vec<(String, String)> = u
            .variants()
            .iter()
            .zip(&names.variants)
            .map(|(variant, variant_ident)| {
                let args = generic_list(&variant.used_generics(u.generics()));
                (self.type_ident(variant.name()), format!("{variant_ident}{args}"))
            })
            .collect();

        let mut cg = Codegen::new(INDENT);
        cg.comment("///", u.comment());
        attributes(&mut cg, ident);
        if cases.is_empty() {
            cg.line(format!("pub enum {ident}{params} {{}}"));
        } else {
            cg.block(format!("pub enum {ident}{params} {{"), "}", |cg| {
                for (case, payload) in &cases {
                    cg.line(format!("{case}({payload}),"));
                }
            });
        }
        for (case, payload) in &cases {
            cg.blank();
            cg.block(format!("impl{params} From<{payload}> for {ident}{params} {{"), "}", |cg| {
                cg.block(format!("fn from(value: {payload}) -> Self {{"), "}", |cg| {
                    cg.line(format!("Self::{case}(value)"));
                });
            });
        }

        let mut outputs = vec![Output::new(ident, cx.module, cg.into_string())];
        for (variant, variant_ident) in u.variants().iter().zip(&names.variants) {
            let mut cg = Codegen::new(INDENT);
            let used = variant.used_generics(u.generics());
            record(&mut cg, variant_ident, &used, &fields(cx, variant.fields()), variant.comment());
            outputs.push(Output::new(variant_ident, cx.module, cg.into_string()));
        }
        outputs
    }

    fn render_alias(&self, cx: &RenderCx<'_>, a: &AliasType, ident: &str) -> Output {
        let mut cg = Codegen::new(INDENT);
        cg.comment("///", a.comment.as_deref());
        if ident.contains('_') {
            cg.line("#[allow(non_camel_case_types)]");
        }
        cg.line(format!("pub type {ident} = {};", ty(cx, &a.target)));
        Output::new(ident, cx.module, cg.into_string())
    }

    fn render_const(&self, cx: &RenderCx<'_>, c: &ConstDecl, ident: &str) -> Output {
        let ty = match c.value.ty() {
            ScalarType::String => "&str",
            ScalarType::Bytes => "&[u8]",
            other => scalar(other),
        };
        let mut cg = Codegen::new(INDENT);
        cg.comment("///", c.comment.as_deref());
        cg.line(format!(
            "pub const {ident}: {ty} = {};",
            literal(c.value.value(), c.value.ty())
        ));
        Output::new(ident, cx.module, cg.into_string())
    }

    fn render_tuple(&self, tuple: &TupleBinding) -> Output {
        let ident = tuple.ident();
        let generics: Vec<&str> = tuple.type_params.iter().map(String::as_str).collect();
        let fields: Vec<FieldLine<'_>> = tuple
            .fields
            .iter()
            .zip(&tuple.type_params)
            .map(|(field, param)| FieldLine {
                name: field.to_ascii_lowercase(),
                ty: param.clone(),
                comment: None,
            })
            .collect();
        let mut cg = Codegen::new(INDENT);
        record(&mut cg, &ident, &generics, &fields, None);
        Output::new(ident, &tuples_module(), cg.into_string())
    }

    fn assemble(&self, config: &GenConfig, outputs: &[Output], comments: &ModuleComments) -> Vec<File> {
        let mut root = ModNode::default();
        for output in outputs {
            let mut node = &mut root;
            for segment in &output.module {
                node = node.children.entry(segment.as_str()).or_default();
            }
            node.outputs.push(output);
        }

        let mut cg = Codegen::new(INDENT);
        cg.embed(&header());
        root.render(&mut cg, &mut Vec::new(), comments, true);
        vec![File {
            path: PathBuf::from(format!("{}.rs", config.package)),
            contents: cg.into_string(),
        }]
    }
}

#[derive(Default)]
struct ModNode<'a> {
    outputs: Vec<&'a Output>,
    children: BTreeMap<&'a str, ModNode<'a>>,
}

impl ModNode<'_> {
    /// `path`: schema path of this node. `spaced`: separate the first item
    /// from what precedes it.
    fn render(&self, cg: &mut Codegen, path: &mut Vec<String>, comments: &ModuleComments, mut spaced: bool) {
        for output in &self.outputs {
            if spaced {
                cg.blank();
            }
            spaced = true;
            cg.embed(&output.source);
        }
        for (name, child) in &self.children {
            if spaced {
                cg.blank();
            }
            spaced = true;
            path.push((*name).to_owned());
            cg.comment("///", comments.get(path.as_slice()).map(String::as_str));
            cg.block(format!("pub mod {} {{", RustBackend.module_ident(name)), "}", |cg| {
                child.render(cg, path, comments, false);
            });
            path.pop();
        }
    }
}
