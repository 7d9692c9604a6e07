//! Minimal CLI: load declaration snapshots → (generate | scan)
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, Args};

use inheritance_gen::{Compilation, GeneratedArtifact, GeneratorConfig, InheritanceGenerator};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// find types deriving from a root type, check their namespace, and emit a C# name table
#[derive(Parser, Debug)]
#[command(name = "inheritance-gen")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// run the generator and print the generated source
    Generate(GenerateOut),
    /// run the generator and print the name table and diagnostics as JSON
    Scan(ScanOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more declaration snapshots (JSON). May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// generator settings (.json); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// metadata name of the root type (e.g. Experiments.Parent)
    #[arg(long)]
    root_type: Option<String>,

    /// required outer namespace segment
    #[arg(long)]
    root_namespace: Option<String>,

    /// required inner namespace segment
    #[arg(long)]
    child_namespace: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .cs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ScanOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_config(&self) -> Result<GeneratorConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(root_type) = &self.root_type {
            config.root_type = root_type.clone();
        }
        if let Some(root_namespace) = &self.root_namespace {
            config.root_namespace = root_namespace.clone();
        }
        if let Some(child_namespace) = &self.child_namespace {
            config.child_namespace = child_namespace.clone();
        }
        Ok(config)
    }

    fn load_compilation(&self) -> Result<Compilation> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut trees = Vec::new();
        for source_path in source_paths {
            let loaded = inheritance_gen::path_de::load_trees(&source_path)?;
            tracing::debug!(path = %source_path.display(), trees = loaded.len(), "loaded snapshot");
            trees.extend(loaded);
        }
        Compilation::new(trees).context("declaration snapshot is not a valid compilation")
    }

    fn generate(&self) -> Result<GeneratedArtifact> {
        let generator = InheritanceGenerator::new(self.load_config()?)?;
        let compilation = self.load_compilation()?;
        Ok(generator.run(&compilation))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    /// `Ok(true)` when the pass reported errors.
    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(false)
                }

                let artifact = target.input_settings.generate()?;
                for diagnostic in &artifact.diagnostics {
                    eprintln!("{diagnostic}");
                }
                let text = artifact
                    .sources
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                write_output(target.out.as_ref(), &text)?;
                Ok(artifact.has_errors())
            }
            Command::Scan(target) => {
                let artifact = target.input_settings.generate()?;
                let report = serde_json::json!({
                    "entries": artifact.entries,
                    "diagnostics": artifact.diagnostics,
                });
                let report_src = serde_json::to_string_pretty(&report)?;
                write_output(target.out.as_ref(), &report_src)?;
                Ok(artifact.has_errors())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Sorted so tree order, and therefore output order, is reproducible
            let mut matched = Vec::new();
            for entry in glob::glob(pattern)? {
                matched.push(entry?);
            }
            if matched.is_empty() {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
