use std::path::Path;

use inheritance_gen::path_de::load_trees;
use inheritance_gen::{CancellationToken, Compilation, GeneratorConfig, InheritanceGenerator};

fn compilation() -> Compilation {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/program.json");
    Compilation::new(load_trees(&fixture).unwrap()).unwrap()
}

#[test]
fn program_generates_expected_table() {
    let generator = InheritanceGenerator::new(GeneratorConfig::default()).unwrap();
    let artifact = generator.run(&compilation());

    let expected = "\
// <auto-generated/>
using System;

namespace Experiments
{
\tpublic class Stats
\t{
\t\tpublic static string Alpha = \"Experiments\";
\t\tpublic static bool Alpha_IsChild = false;
\t\tpublic static string Beta = \"Experiments.Child\";
\t\tpublic static bool Beta_IsChild = true;
\t}
}
";
    assert_eq!(artifact.source("GeneratedCode"), Some(expected));

    assert_eq!(artifact.diagnostics.len(), 1);
    let alpha = &artifact.diagnostics[0];
    assert_eq!(alpha.code, "EG0001");
    assert_eq!(
        alpha.message,
        "The Type 'Alpha' must be defined in the namespace 'Experiments.Child'; otherwise code generation will not function properly"
    );
    assert_eq!(alpha.location.to_string(), "Experiments/Program.cs:14:24");
}

#[test]
fn program_is_idempotent() {
    let generator = InheritanceGenerator::new(GeneratorConfig::default()).unwrap();
    let model = compilation();
    let token = CancellationToken::new();
    let first = generator.run_with_cancellation(&model, &token).unwrap();
    let second = generator.run_with_cancellation(&compilation(), &token).unwrap();
    assert_eq!(first.sources, second.sources);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn program_without_root_is_silent() {
    let config = GeneratorConfig { root_type: "Experiments.Missing".into(), ..GeneratorConfig::default() };
    let artifact = InheritanceGenerator::new(config).unwrap().run(&compilation());
    assert!(artifact.sources.is_empty());
    assert!(artifact.diagnostics.is_empty());
}
