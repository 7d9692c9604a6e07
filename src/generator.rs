//! One generation pass: scan → resolve → validate → emit.
//!
//! All working state lives in a `Pass` value owned by a single invocation,
//! and the artifact is only handed out once every candidate was processed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, GeneratorConfig};
use crate::diagnostics::{Diagnostic, DiagnosticDescriptor, Location};
use crate::emit::{self, Codegen};
use crate::hierarchy;
use crate::model::{Compilation, DeclarationId, TypeId};
use crate::namespace::{NamespacePathBuilder, NamespaceRule};
use crate::scanner::{self, Candidate};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generation pass cancelled")]
    Cancelled,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Cooperative cancellation, checked between candidates.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSource {
    pub hint_name: String,
    pub text: String,
}

/// One row of the name table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub name: String,
    pub namespace: String,
    pub is_child: bool,
    pub depth: usize,             // base links to the root type
    pub declaration: DeclarationId,
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub sources: Vec<GeneratedSource>,
    pub entries: Vec<TableEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedArtifact {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.diagnostics.is_empty()
    }
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
    pub fn source(&self, hint_name: &str) -> Option<&str> {
        self.sources.iter().find(|s| s.hint_name == hint_name).map(|s| s.text.as_str())
    }
}

pub struct InheritanceGenerator {
    config: GeneratorConfig,
    rule: NamespaceRule,
    descriptor: DiagnosticDescriptor,
}

struct Pass<'a> {
    model: &'a Compilation,
    generator: &'a InheritanceGenerator,
    root: TypeId,
    paths: NamespacePathBuilder,
    codegen: Codegen,
    entries: Vec<TableEntry>,
    diagnostics: Vec<Diagnostic>,
    seen_names: HashMap<String, DeclarationId>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InheritanceGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        let rule = config.namespace_rule();
        let descriptor = emit::incorrect_namespace(&rule, &config.root_type);
        Ok(Self { config, rule, descriptor })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Full stateless pass over `model`.
    pub fn run(&self, model: &Compilation) -> GeneratedArtifact {
        self.execute(model, || false).unwrap_or_default()
    }

    pub fn run_with_cancellation(
        &self,
        model: &Compilation,
        token: &CancellationToken,
    ) -> Result<GeneratedArtifact, GeneratorError> {
        self.execute(model, || token.is_cancelled())
            .ok_or(GeneratorError::Cancelled)
    }

    /// `None` when `stop` fired before the pass finished.
    fn execute(&self, model: &Compilation, stop: impl Fn() -> bool) -> Option<GeneratedArtifact> {
        let Some(root) = model.type_by_metadata_name(&self.config.root_type) else {
            tracing::debug!(root_type = %self.config.root_type, "root type not in compilation, nothing to generate");
            return Some(GeneratedArtifact::default());
        };

        let candidates = scanner::scan(model.trees());
        tracing::debug!(candidates = candidates.len(), "scanned declarations");

        let mut pass = Pass {
            model,
            generator: self,
            root,
            paths: NamespacePathBuilder::new(),
            codegen: Codegen::new(&self.config),
            entries: Vec::new(),
            diagnostics: Vec::new(),
            seen_names: HashMap::new(),
        };
        for candidate in candidates {
            if stop() {
                tracing::debug!("pass abandoned");
                return None;
            }
            pass.visit(candidate);
        }
        Some(pass.finish())
    }
}

impl<'a> Pass<'a> {
    fn visit(&mut self, candidate: Candidate<'_>) {
        let name = candidate.declaration.name();
        let Some(symbol) = self.model.declared_symbol(candidate.id) else {
            tracing::warn!(%name, declaration = ?candidate.id, "declaration has no bound symbol");
            return;
        };
        let Some(depth) = hierarchy::depth_below(self.model, symbol, self.root) else {
            tracing::trace!(%name, "not derived from root");
            return;
        };

        let namespace = self.model.type_symbol(symbol).namespace();
        let namespace_path = self.paths.build(self.model, namespace);
        let is_child = self.generator.rule.is_satisfied_by(self.model, Some(namespace));
        let location = match self.model.tree(candidate.id.tree) {
            Some(tree) => Location::in_tree(tree, candidate.declaration.identifier.span),
            None => {
                tracing::warn!(%name, declaration = ?candidate.id, "declaration refers to a tree outside the compilation");
                return;
            }
        };
        tracing::debug!(%name, namespace = %namespace_path, is_child, depth, "derived type");

        // same short name twice produces duplicate members; left as is
        if let Some(previous) = self.seen_names.insert(name.to_string(), candidate.id) {
            tracing::warn!(%name, ?previous, current = ?candidate.id, "short name already emitted");
        }

        self.codegen.emit_entry(name, &namespace_path, is_child);
        if !is_child {
            self.diagnostics.push(self.generator.descriptor.create(location.clone(), name));
        }
        self.entries.push(TableEntry {
            name: name.to_string(),
            namespace: namespace_path,
            is_child,
            depth,
            declaration: candidate.id,
            location,
        });
    }

    fn finish(self) -> GeneratedArtifact {
        tracing::info!(
            entries = self.entries.len(),
            diagnostics = self.diagnostics.len(),
            "generation pass complete"
        );
        GeneratedArtifact {
            sources: vec![GeneratedSource {
                hint_name: self.generator.config.hint_name.clone(),
                text: self.codegen.into_string(),
            }],
            entries: self.entries,
            diagnostics: self.diagnostics,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
