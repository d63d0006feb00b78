//! CLI: schema documents → (check | generated bindings on disk)
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::codegen::Generation;
use crate::config::{GenConfig, Target};
use crate::error::{BatchError, DeclError};
use crate::naming::NamingPolicy;
use crate::schema::{SchemaDoc, load_schema};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate target-language bindings (structs, sealed unions, constants, tuples) from typed schemas
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    /// log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate schemas and report every failing declaration
    Check(CheckCmd),
    /// generate bindings into an output directory
    Generate(GenerateCmd),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more schema documents (JSON). May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    target: Option<Target>,

    #[arg(long, value_enum)]
    naming: Option<NamingPolicy>,

    /// joins union and variant names under qualified naming
    #[arg(long)]
    separator: Option<String>,

    #[arg(long)]
    max_tuple_arity: Option<usize>,

    /// Go package / Rust file stem of the root module
    #[arg(long)]
    package: Option<String>,

    /// abort on the first failing declaration
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckCmd {
    #[command(flatten)]
    input_settings: InputSettings,
}

#[derive(clap::Parser, Debug)]
struct GenerateCmd {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory
    #[arg(short, long)]
    out: PathBuf,

    /// debugging: print the parsed command and exit
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn gen_config(&self) -> anyhow::Result<GenConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => GenConfig::load(path)?,
            None => GenConfig::default(),
        };
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(naming) = self.naming {
            config.naming_policy = naming;
        }
        if let Some(separator) = self.separator.as_ref() {
            config.namespace_separator = separator.clone();
        }
        if let Some(max) = self.max_tuple_arity {
            config.max_tuple_arity = max;
        }
        if let Some(package) = self.package.as_ref() {
            config.package = package.clone();
        }
        config.strict |= self.strict;
        config.validate()?;
        Ok(config)
    }

    /// Run every input through the generator, one batch per document.
    fn load_process(
        &self,
        config: &GenConfig,
        mut apply: impl FnMut(&Path, Generation) -> anyhow::Result<()>,
    ) -> anyhow::Result<usize> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut failures = 0;
        for source_path in source_paths {
            let doc: SchemaDoc = load_schema(&source_path)
                .with_context(|| format!("failed to load schema ({})", source_path.display()))?;
            match crate::generate(&doc, config) {
                Ok(generation) => {
                    report(&source_path, &generation.failures);
                    failures += generation.failures.len();
                    apply(&source_path, generation)?;
                }
                Err(BatchError::Aborted(error)) => {
                    report(&source_path, std::slice::from_ref(&error));
                    bail!("strict mode: {} aborted", source_path.display());
                }
                Err(error @ BatchError::Config(_)) => return Err(error.into()),
            }
        }
        Ok(failures)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> ExitCode {
        match self.execute() {
            Ok(0) => ExitCode::SUCCESS,
            Ok(failures) => {
                eprintln!("{} {failures} declaration(s) failed", "error:".red().bold());
                ExitCode::FAILURE
            }
            Err(error) => {
                eprintln!("{} {error:#}", "error:".red().bold());
                ExitCode::FAILURE
            }
        }
    }

    /// Number of failed declarations across all inputs.
    fn execute(&self) -> anyhow::Result<usize> {
        match &self.cmd {
            Command::Check(target) => {
                let config = target.input_settings.gen_config()?;
                target.input_settings.load_process(&config, |path, generation| {
                    if generation.is_clean() {
                        eprintln!("{} {}", "ok".green().bold(), path.display());
                    }
                    Ok(())
                })
            }
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(0);
                }
                let config = target.input_settings.gen_config()?;
                target.input_settings.load_process(&config, |_, generation| {
                    for file in &generation.files {
                        let out = target.out.join(&file.path);
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)
                                .with_context(|| format!("failed to create {}", parent.display()))?;
                        }
                        std::fs::write(&out, &file.contents)
                            .with_context(|| format!("failed to write {}", out.display()))?;
                        eprintln!("{} {}", "wrote".green().bold(), out.display());
                    }
                    Ok(())
                })
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn report(source_path: &Path, failures: &[DeclError]) {
    for failure in failures {
        eprintln!(
            "{} {} {}: {}",
            "failed".red().bold(),
            source_path.display().to_string().dimmed(),
            failure.path.to_string().yellow(),
            failure.error,
        );
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = Vec::new();
            for entry in glob::glob(pattern)? {
                matched.push(entry?);
            }
            if matched.is_empty() {
                bail!("glob pattern matched no files: {pattern}");
            }
            // glob order follows the filesystem; keep runs reproducible
            matched.sort();
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_config_file() {
        let cli = CommandLineInterface::try_parse_from([
            "schema-bindgen",
            "generate",
            "--input",
            "a.json",
            "--out",
            "gen",
            "--target",
            "rust",
            "--naming",
            "qualified",
            "--separator",
            "",
            "--max-tuple-arity",
            "3",
            "--strict",
        ])
        .unwrap();
        let Command::Generate(cmd) = &cli.cmd else {
            panic!("expected generate");
        };
        let config = cmd.input_settings.gen_config().unwrap();
        assert_eq!(config.target, Target::Rust);
        assert_eq!(config.naming_policy, NamingPolicy::Qualified);
        assert_eq!(config.namespace_separator, "");
        assert_eq!(config.max_tuple_arity, 3);
        assert!(config.strict);
        assert_eq!(config.package, "schema");
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let cli = CommandLineInterface::try_parse_from([
            "schema-bindgen",
            "check",
            "-i",
            "a.json",
            "--max-tuple-arity",
            "1",
        ])
        .unwrap();
        let Command::Check(cmd) = &cli.cmd else {
            panic!("expected check");
        };
        assert!(cmd.input_settings.gen_config().is_err());
    }

    #[test]
    fn literal_paths_pass_through() {
        let paths = resolve_file_path_patterns(["schemas/a.json", "b.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("schemas/a.json"), PathBuf::from("b.json")]);
    }
}
