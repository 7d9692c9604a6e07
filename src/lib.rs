//! Inheritance-table source generator.
//!
//! Finds every type deriving from a configured root type, checks that each
//! one lives in the required namespace, and emits a C# name table plus one
//! diagnostic per misplaced type.

pub mod syntax;
pub mod path_de;
pub mod model;
pub mod scanner;
pub mod hierarchy;
pub mod namespace;
pub mod diagnostics;
pub mod emit;
pub mod config;
pub mod generator;

pub use config::GeneratorConfig;
pub use generator::{CancellationToken, GeneratedArtifact, GeneratorError, InheritanceGenerator};
pub use model::Compilation;
