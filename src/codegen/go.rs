//! Go bindings.
//!
//! Unions become an interface with an unexported marker method, so only
//! types declared in the same package can implement it. Each module is one
//! package; the root package is `config.package` and the `TupleN` generics
//! sit in the leaf package `{package}/tuples`. Go rejects packages that
//! import each other, so this backend asks the generator to fail
//! declarations that would close such a cycle.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use heck::{ToLowerCamelCase, ToUpperCamelCase};

use super::{
    Backend, Codegen, File, ModuleComments, Output, RenderCx, TupleBinding, header, tuple_ident,
    tuples_module,
};
use crate::config::{GenConfig, Target};
use crate::ir::{AliasType, ConstDecl, Field, ScalarType, StructType, TypeRef, UnionType, Value};
use crate::naming::{Conventions, DeclNames};

const BIG: &str = "math/big";

const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for",
    "func", "go", "goto", "if", "import", "interface", "map", "package", "range", "return",
    "select", "struct", "switch", "type", "var",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct GoBackend;

impl Conventions for GoBackend {
    fn const_ident(&self, name: &str) -> String {
        name.to_upper_camel_case()
    }

    fn field_idents(&self, name: &str) -> Vec<String> {
        vec![member(name), param(name)]
    }

    fn module_ident(&self, segment: &str) -> String {
        escape(segment.to_ascii_lowercase())
    }
}

fn escape(ident: String) -> String {
    if KEYWORDS.contains(&ident.as_str()) {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Exported member name of a field.
fn member(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Constructor parameter name of a field.
fn param(name: &str) -> String {
    escape(name.to_lower_camel_case())
}

fn package_name(module: &[String], config: &GenConfig) -> String {
    match module.last() {
        Some(segment) => GoBackend.module_ident(segment),
        None => config.package.clone(),
    }
}

fn import_path(module: &[String], config: &GenConfig) -> String {
    std::iter::once(config.package.clone())
        .chain(module.iter().map(|s| GoBackend.module_ident(s)))
        .collect::<Vec<_>>()
        .join("/")
}

/// `[T1 any, T2 any]`, empty without parameters.
fn type_params<S: AsRef<str>>(params: &[S]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let params: Vec<String> = params.iter().map(|p| format!("{} any", p.as_ref())).collect();
    format!("[{}]", params.join(", "))
}

/// `[T1, T2]`, empty without parameters.
fn type_args<S: AsRef<str>>(params: &[S]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let params: Vec<&str> = params.iter().map(AsRef::as_ref).collect();
    format!("[{}]", params.join(", "))
}

/// Type expressions of one output, together with the imports they pull in.
struct Types<'a, 'c> {
    cx: &'a RenderCx<'c>,
    imports: BTreeSet<String>,
}

impl<'a, 'c> Types<'a, 'c> {
    fn new(cx: &'a RenderCx<'c>) -> Self {
        Self {
            cx,
            imports: BTreeSet::new(),
        }
    }

    fn scalar(&mut self, scalar: ScalarType) -> &'static str {
        match scalar {
            ScalarType::Bool => "bool",
            ScalarType::U8 => "uint8",
            ScalarType::U16 => "uint16",
            ScalarType::U32 => "uint32",
            ScalarType::U64 => "uint64",
            ScalarType::I8 => "int8",
            ScalarType::I16 => "int16",
            ScalarType::I32 => "int32",
            ScalarType::I64 => "int64",
            ScalarType::U128 | ScalarType::I128 => {
                self.imports.insert(BIG.to_owned());
                "*big.Int"
            }
            ScalarType::F32 => "float32",
            ScalarType::F64 => "float64",
            ScalarType::String => "string",
            ScalarType::Bytes => "[]byte",
        }
    }

    /// Qualifier for a name living in `module`, empty for the current package.
    fn qualifier(&mut self, module: &[String]) -> String {
        if module == self.cx.module {
            return String::new();
        }
        self.imports.insert(import_path(module, self.cx.config));
        format!("{}.", package_name(module, self.cx.config))
    }

    fn args(&mut self, types: &[TypeRef]) -> String {
        let rendered: Vec<String> = types.iter().map(|t| self.ty(t)).collect();
        type_args(&rendered)
    }

    fn ty(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Scalar(scalar) => self.scalar(*scalar).to_owned(),
            TypeRef::Tuple(tuple) => {
                let qualifier = self.qualifier(&tuples_module());
                let args = self.args(tuple.elements());
                format!("{qualifier}{}{args}", tuple_ident(tuple.arity()))
            }
            TypeRef::List(item) => format!("[]{}", self.ty(item)),
            TypeRef::Array(item, len) => format!("[{len}]{}", self.ty(item)),
            TypeRef::Option(item) => format!("*{}", self.ty(item)),
            TypeRef::Map(key, value) => format!("map[{}]{}", self.ty(key), self.ty(value)),
            TypeRef::HashSet(item) => format!("map[{}]struct{{}}", self.ty(item)),
            TypeRef::Named { path, generics } => {
                let qualifier = self.qualifier(path.module());
                let args = self.args(generics);
                format!("{qualifier}{}{args}", self.cx.ident_of(path))
            }
            TypeRef::Param(name) => name.clone(),
        }
    }
}

/// `type X struct {..}` plus `func NewX(..) X`.
fn record(
    cg: &mut Codegen,
    types: &mut Types<'_, '_>,
    ident: &str,
    generics: &[&str],
    fields: &[Field],
    comment: Option<&str>,
) {
    let rendered: Vec<(String, String, String)> = fields
        .iter()
        .map(|f| (member(&f.name), param(&f.name), types.ty(&f.ty)))
        .collect();

    cg.comment("//", comment);
    if rendered.is_empty() {
        cg.line(format!("type {ident}{} struct{{}}", type_params(generics)));
    } else {
        cg.block(format!("type {ident}{} struct {{", type_params(generics)), "}", |cg| {
            let width = rendered.iter().map(|(m, _, _)| m.len()).max().unwrap_or_default();
            for (field, (member, _, ty)) in fields.iter().zip(&rendered) {
                cg.comment("//", field.comment.as_deref());
                cg.line(format!("{member:width$} {ty}"));
            }
        });
    }
    cg.blank();

    let params: Vec<String> = rendered.iter().map(|(_, p, ty)| format!("{p} {ty}")).collect();
    let this = format!("{ident}{}", type_args(generics));
    cg.block(
        format!(
            "func New{ident}{}({}) {this} {{",
            type_params(generics),
            params.join(", ")
        ),
        "}",
        |cg| {
            if rendered.is_empty() {
                cg.line(format!("return {this}{{}}"));
                return;
            }
            cg.block(format!("return {this}{{"), "}", |cg| {
                for (member, param, _) in &rendered {
                    cg.line(format!("{member}: {param},"));
                }
            });
        },
    );
}

/// Go source text of a string literal.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn big_int(digits: String, small: bool) -> String {
    if small {
        format!("big.NewInt({digits})")
    } else {
        format!("func() *big.Int {{ v, _ := new(big.Int).SetString(\"{digits}\", 10); return v }}()")
    }
}

impl Backend for GoBackend {
    fn target(&self) -> Target {
        Target::Go
    }

    fn render_struct(&self, cx: &RenderCx<'_>, s: &StructType, ident: &str) -> Output {
        let mut cg = Codegen::new("\t");
        let mut types = Types::new(cx);
        let generics: Vec<&str> = s.generics().iter().map(String::as_str).collect();
        record(&mut cg, &mut types, ident, &generics, s.fields(), s.comment());
        let imports = types.imports;
        Output::new(ident, cx.module, cg.into_string()).with_imports(imports)
    }

    fn render_union(&self, cx: &RenderCx<'_>, u: &UnionType, names: &DeclNames) -> Vec<Output> {
        let ident = names.ident.as_str();
        let marker = format!("is{ident}");
        let generics: Vec<&str> = u.generics().iter().map(String::as_str).collect();
        let result = ["R", "Result", "Out"]
            .into_iter()
            .find(|r| !generics.contains(r))
            .unwrap_or("MatchResult");

        let mut outputs = Vec::with_capacity(u.variants().len() + 1);

        // contract + exhaustive match
        let mut cg = Codegen::new("\t");
        cg.comment("//", u.comment());
        cg.line(format!("// {ident} is sealed: its variants are the types declared with it."));
        cg.block(format!("type {ident}{} interface {{", type_params(&generics)), "}", |cg| {
            cg.line(format!("{marker}()"));
        });
        cg.blank();

        let handlers: Vec<(String, String)> = u
            .variants()
            .iter()
            .zip(&names.variants)
            .map(|(variant, variant_ident)| {
                let args = type_args(&variant.used_generics(u.generics()));
                (format!("on{}", self.type_ident(variant.name())), format!("{variant_ident}{args}"))
            })
            .collect();
        let mut params = vec![format!("value {ident}{}", type_args(&generics))];
        params.extend(handlers.iter().map(|(h, ty)| format!("{h} func({ty}) {result}")));
        let mut match_generics = generics.clone();
        match_generics.push(result);

        cg.line(format!("// Match{ident} calls the handler of the variant held by value."));
        cg.block(
            format!(
                "func Match{ident}{}({}) {result} {{",
                type_params(&match_generics),
                params.join(", ")
            ),
            "}",
            |cg| {
                if handlers.is_empty() {
                    cg.line("_ = value");
                    cg.line(format!("panic(\"unreachable: {ident} has no variants\")"));
                    return;
                }
                cg.line("switch v := value.(type) {");
                for (handler, ty) in &handlers {
                    cg.line(format!("case {ty}:"));
                    cg.indent(|cg| cg.line(format!("return {handler}(v)")));
                }
                cg.line("}");
                cg.line(format!("panic(\"unreachable: {ident} is sealed\")"));
            },
        );
        outputs.push(Output::new(ident, cx.module, cg.into_string()));

        for (variant, variant_ident) in u.variants().iter().zip(&names.variants) {
            let mut cg = Codegen::new("\t");
            let mut types = Types::new(cx);
            let used = variant.used_generics(u.generics());
            record(&mut cg, &mut types, variant_ident, &used, variant.fields(), variant.comment());
            cg.blank();
            cg.line(format!("func ({variant_ident}{}) {marker}() {{}}", type_args(&used)));
            let imports = types.imports;
            outputs.push(Output::new(variant_ident, cx.module, cg.into_string()).with_imports(imports));
        }
        outputs
    }

    fn render_alias(&self, cx: &RenderCx<'_>, a: &AliasType, ident: &str) -> Output {
        let mut types = Types::new(cx);
        let mut cg = Codegen::new("\t");
        cg.comment("//", a.comment.as_deref());
        cg.line(format!("type {ident} = {}", types.ty(&a.target)));
        Output::new(ident, cx.module, cg.into_string()).with_imports(types.imports)
    }

    fn render_const(&self, cx: &RenderCx<'_>, c: &ConstDecl, ident: &str) -> Output {
        let mut types = Types::new(cx);
        let ty = types.scalar(c.value.ty());
        let (keyword, literal) = match c.value.value() {
            Value::Bool(b) => ("const", b.to_string()),
            Value::Unsigned(n) if c.value.ty() == ScalarType::U128 => {
                ("var", big_int(n.to_string(), i64::try_from(*n).is_ok()))
            }
            Value::Signed(n) if c.value.ty() == ScalarType::I128 => {
                ("var", big_int(n.to_string(), i64::try_from(*n).is_ok()))
            }
            Value::Unsigned(n) => ("const", n.to_string()),
            Value::Signed(n) => ("const", n.to_string()),
            Value::Float(f) => ("const", format!("{:?}", f.into_inner())),
            Value::String(s) => ("const", quote(s)),
            Value::Bytes(bytes) => {
                let bytes: Vec<String> = bytes.iter().map(u8::to_string).collect();
                ("var", format!("[]byte{{{}}}", bytes.join(", ")))
            }
        };
        let mut cg = Codegen::new("\t");
        cg.comment("//", c.comment.as_deref());
        cg.line(format!("{keyword} {ident} {ty} = {literal}"));
        Output::new(ident, cx.module, cg.into_string()).with_imports(types.imports)
    }

    fn render_tuple(&self, tuple: &TupleBinding) -> Output {
        let ident = tuple.ident();
        let this = format!("{ident}{}", type_args(&tuple.type_params));
        let params = type_params(&tuple.type_params);

        let mut cg = Codegen::new("\t");
        cg.block(format!("type {ident}{params} struct {{"), "}", |cg| {
            for (field, param) in tuple.fields.iter().zip(&tuple.type_params) {
                cg.line(format!("{field} {param}"));
            }
        });
        cg.blank();
        let args: Vec<String> = tuple
            .fields
            .iter()
            .zip(&tuple.type_params)
            .map(|(field, param)| format!("{} {param}", field.to_ascii_lowercase()))
            .collect();
        cg.block(format!("func New{ident}{params}({}) {this} {{", args.join(", ")), "}", |cg| {
            cg.block(format!("return {this}{{"), "}", |cg| {
                for field in &tuple.fields {
                    cg.line(format!("{field}: {},", field.to_ascii_lowercase()));
                }
            });
        });
        Output::new(ident, &tuples_module(), cg.into_string())
    }

    fn forbids_import_cycles(&self) -> bool {
        true
    }

    fn assemble(&self, config: &GenConfig, outputs: &[Output], comments: &ModuleComments) -> Vec<File> {
        let mut packages: BTreeMap<&[String], Vec<&Output>> = BTreeMap::new();
        for output in outputs {
            packages.entry(output.module.as_slice()).or_default().push(output);
        }

        packages
            .into_iter()
            .map(|(module, outputs)| {
                let package = package_name(module, config);
                let mut path: PathBuf = module.iter().map(|s| self.module_ident(s)).collect();
                path.push(format!("{package}.go"));

                let imports: BTreeSet<&str> = outputs
                    .iter()
                    .flat_map(|o| o.imports.iter().map(String::as_str))
                    .collect();

                let mut cg = Codegen::new("\t");
                cg.embed(&header());
                cg.blank();
                cg.comment("//", comments.get(module).map(String::as_str));
                cg.line(format!("package {package}"));
                match imports.len() {
                    0 => {}
                    1 => {
                        cg.blank();
                        for import in &imports {
                            cg.line(format!("import \"{import}\""));
                        }
                    }
                    _ => {
                        cg.blank();
                        cg.block("import (", ")", |cg| {
                            for import in &imports {
                                cg.line(format!("\"{import}\""));
                            }
                        });
                    }
                }
                for output in outputs {
                    cg.blank();
                    cg.embed(&output.source);
                }
                File {
                    path,
                    contents: cg.into_string(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Declaration, Schema, SchemaPath, TupleType, Variant};
    use crate::naming::{NameTable, NamingPolicy};

    fn u(ty: ScalarType) -> TypeRef {
        TypeRef::Scalar(ty)
    }

    fn with_cx<R>(schema: &Schema, f: impl FnOnce(&RenderCx<'_>) -> R) -> R {
        let config = GenConfig::default();
        let names = NameTable::build(schema, NamingPolicy::Auto, "_", &GoBackend, &[]);
        let cx = RenderCx {
            config: &config,
            names: &names,
            module: &[],
        };
        f(&cx)
    }

    #[test]
    fn struct_constructor_follows_field_order() {
        let s = StructType::new(
            "Sample",
            Vec::new(),
            vec![Field::new("field1", u(ScalarType::U32)), Field::new("field2", u(ScalarType::U16))],
        )
        .unwrap();
        let out = with_cx(&Schema::default(), |cx| GoBackend.render_struct(cx, &s, "Sample"));
        assert_eq!(
            out.source,
            "type Sample struct {\n\
             \tField1 uint32\n\
             \tField2 uint16\n\
             }\n\
             \n\
             func NewSample(field1 uint32, field2 uint16) Sample {\n\
             \treturn Sample{\n\
             \t\tField1: field1,\n\
             \t\tField2: field2,\n\
             \t}\n\
             }\n"
        );
        assert!(out.imports.is_empty());
    }

    #[test]
    fn keywords_are_escaped_in_parameters() {
        let s = StructType::new("Token", Vec::new(), vec![Field::new("type", u(ScalarType::String))]).unwrap();
        let out = with_cx(&Schema::default(), |cx| GoBackend.render_struct(cx, &s, "Token"));
        assert!(out.source.contains("func NewToken(type_ string) Token {"), "{}", out.source);
        assert!(out.source.contains("Type: type_,"));
    }

    #[test]
    fn union_is_sealed_and_matched_exhaustively() {
        let variants = vec![
            Variant::new("Variant1", vec![Field::new("f1", u(ScalarType::U32))]).unwrap(),
            Variant::new("Variant2", vec![Field::new("field1", u(ScalarType::I64))]).unwrap(),
        ];
        let union = UnionType::new("Sample", Vec::new(), variants).unwrap();
        let schema = Schema {
            declarations: vec![Declaration::Union(union.clone())],
        };
        let outputs = with_cx(&schema, |cx| {
            let names = cx.names.get(&SchemaPath::from_segments(["Sample"])).cloned().unwrap().unwrap();
            GoBackend.render_union(cx, &union, &names)
        });
        let idents: Vec<_> = outputs.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(idents, ["Sample", "Variant1", "Variant2"]);

        let contract = &outputs[0].source;
        assert!(contract.contains("type Sample interface {\n\tisSample()\n}"));
        assert!(contract.contains(
            "func MatchSample[R any](value Sample, onVariant1 func(Variant1) R, onVariant2 func(Variant2) R) R {"
        ));
        assert!(contract.contains("\tcase Variant1:\n\t\treturn onVariant1(v)\n"));
        assert!(contract.contains("\tcase Variant2:\n\t\treturn onVariant2(v)\n"));
        assert!(contract.contains("panic(\"unreachable: Sample is sealed\")"));

        assert!(outputs[1].source.ends_with("func (Variant1) isSample() {}\n"));
        assert!(outputs[2].source.contains("func NewVariant2(field1 int64) Variant2 {"));
    }

    #[test]
    fn empty_union_still_has_a_match() {
        let union = UnionType::new("Never", Vec::new(), Vec::new()).unwrap();
        let names = DeclNames {
            ident: "Never".to_owned(),
            variants: Vec::new(),
            qualified: false,
        };
        let outputs = with_cx(&Schema::default(), |cx| GoBackend.render_union(cx, &union, &names));
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].source.contains("func MatchNever[R any](value Never) R {\n\t_ = value\n"));
    }

    #[test]
    fn constants_follow_their_type() {
        let cases = [
            (ScalarType::U8, Value::Unsigned(1), "const ValueU8 uint8 = 1\n"),
            (ScalarType::I64, Value::Signed(-4), "const ValueU8 int64 = -4\n"),
            (ScalarType::String, Value::String("a\"b".to_owned()), "const ValueU8 string = \"a\\\"b\"\n"),
            (ScalarType::Bytes, Value::Bytes(vec![1, 2, 3]), "var ValueU8 []byte = []byte{1, 2, 3}\n"),
            (ScalarType::U128, Value::Unsigned(5), "var ValueU8 *big.Int = big.NewInt(5)\n"),
        ];
        for (ty, value, expected) in cases {
            let c = ConstDecl {
                name: "VALUE_U8".to_owned(),
                value: crate::ir::ConstantValue::new(ty, value),
                comment: None,
            };
            let out = with_cx(&Schema::default(), |cx| GoBackend.render_const(cx, &c, "ValueU8"));
            assert_eq!(out.source, expected);
        }
    }

    #[test]
    fn wide_constants_use_set_string() {
        let c = ConstDecl {
            name: "MAX".to_owned(),
            value: crate::ir::ConstantValue::new(ScalarType::U128, Value::Unsigned(u128::MAX)),
            comment: Some("Largest u128.".to_owned()),
        };
        let out = with_cx(&Schema::default(), |cx| GoBackend.render_const(cx, &c, "Max"));
        assert!(out.source.starts_with("// Largest u128.\nvar Max *big.Int = func() *big.Int {"));
        assert!(out.source.contains(&format!("SetString(\"{}\", 10)", u128::MAX)));
        assert!(out.imports.contains(BIG));
    }

    #[test]
    fn tuples_have_positional_fields() {
        let out = GoBackend.render_tuple(&TupleBinding {
            arity: 3,
            type_params: vec!["T1".into(), "T2".into(), "T3".into()],
            fields: vec!["F1".into(), "F2".into(), "F3".into()],
        });
        assert!(out.source.starts_with("type Tuple3[T1 any, T2 any, T3 any] struct {\n\tF1 T1\n\tF2 T2\n\tF3 T3\n}\n"));
        assert!(out.source.contains("func NewTuple3[T1 any, T2 any, T3 any](f1 T1, f2 T2, f3 T3) Tuple3[T1, T2, T3] {"));

        assert_eq!(out.module, ["tuples"]);

        let size = TypeRef::Tuple(TupleType::new(vec![u(ScalarType::U32), u(ScalarType::U32)]).unwrap());
        let (rendered, imports) = with_cx(&Schema::default(), |cx| {
            let mut types = Types::new(cx);
            (types.ty(&size), types.imports)
        });
        assert_eq!(rendered, "tuples.Tuple2[uint32, uint32]");
        assert_eq!(imports.into_iter().collect::<Vec<_>>(), ["schema/tuples"]);
    }

    #[test]
    fn arrays_and_sets() {
        let ty = TypeRef::Array(Box::new(TypeRef::HashSet(Box::new(u(ScalarType::String)))), 4);
        let rendered = with_cx(&Schema::default(), |cx| Types::new(cx).ty(&ty));
        assert_eq!(rendered, "[4]map[string]struct{}");
    }

    #[test]
    fn comments_precede_what_they_document() {
        let s = StructType::new(
            "Point",
            Vec::new(),
            vec![
                Field::new("x", u(ScalarType::F64)).with_comment(Some("Horizontal.".to_owned())),
                Field::new("y", u(ScalarType::F64)),
            ],
        )
        .unwrap()
        .with_comment(Some("A point.\n\nIn 2D.".to_owned()));
        let out = with_cx(&Schema::default(), |cx| GoBackend.render_struct(cx, &s, "Point"));
        assert!(
            out.source.starts_with(
                "// A point.\n//\n// In 2D.\ntype Point struct {\n\t// Horizontal.\n\tX float64\n\tY float64\n}\n"
            ),
            "{}",
            out.source
        );
    }

    #[test]
    fn module_names_are_lowercase_packages() {
        assert_eq!(GoBackend.module_ident("Geometry"), "geometry");
        assert_eq!(GoBackend.module_ident("type"), "type_");
        assert_eq!(GoBackend.field_idents("a_b"), ["AB", "aB"]);
        assert_eq!(GoBackend.field_idents("range"), ["Range", "range_"]);
    }

    #[test]
    fn assembles_one_file_per_package() {
        let config = GenConfig::default();
        let outputs = vec![
            Output::new("Max", &[], "var Max *big.Int = big.NewInt(1)\n".to_owned())
                .with_imports([BIG.to_owned()]),
            Output::new("Point", &["geometry".to_owned()], "type Point struct{}\n".to_owned()),
        ];
        let comments = ModuleComments::from([(vec!["geometry".to_owned()], "Shapes.".to_owned())]);
        let files = GoBackend.assemble(&config, &outputs, &comments);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, PathBuf::from("schema.go"));
        assert!(files[0].contents.starts_with("// Code generated by schema-bindgen"));
        assert!(files[0].contents.contains("\npackage schema\n\nimport \"math/big\"\n\nvar Max"));
        assert_eq!(files[1].path, PathBuf::from("geometry/geometry.go"));
        assert!(files[1].contents.contains("\n// Shapes.\npackage geometry\n"));
    }
}
