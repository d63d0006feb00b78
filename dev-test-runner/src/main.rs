//! Regenerates every fixture twice per target and fails on any byte
//! difference between the two runs.
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use colored::Colorize;
use schema_bindgen::config::{GenConfig, Target};
use schema_bindgen::schema::load_schema;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
}

fn render(path: &Path, target: Target) -> anyhow::Result<Vec<(PathBuf, String)>> {
    let doc = load_schema(path)?;
    let config = GenConfig {
        target,
        ..GenConfig::default()
    };
    let generation = schema_bindgen::generate(&doc, &config)?;
    if !generation.is_clean() {
        bail!("{} declaration(s) failed", generation.failures.len());
    }
    Ok(generation
        .files
        .into_iter()
        .map(|file| (file.path, file.contents))
        .collect())
}

fn main() -> anyhow::Result<()> {
    let pattern = fixtures_dir().join("*.json");
    let pattern = pattern.to_string_lossy();
    let mut fixtures = glob::glob(&pattern)
        .context("invalid fixture pattern")?
        .collect::<Result<Vec<_>, _>>()?;
    fixtures.sort();
    if fixtures.is_empty() {
        bail!("no fixtures found under {pattern}");
    }

    let mut failed = 0;
    for fixture in &fixtures {
        for target in [Target::Go, Target::Rust] {
            let label = format!("{} ({target:?})", fixture.display());
            let outcome = render(fixture, target).and_then(|first| {
                let second = render(fixture, target)?;
                if first != second {
                    bail!("output differs between runs");
                }
                Ok(first.len())
            });
            match outcome {
                Ok(files) => eprintln!("{} {label}: {files} file(s)", "✅".green()),
                Err(error) => {
                    failed += 1;
                    eprintln!("{} {label}: {error:#}", "❌".red());
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} fixture run(s) failed");
    }
    Ok(())
}
