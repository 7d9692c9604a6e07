//! Text emission for the generated name table.
//!
//! Output is a single C# namespace holding one static class:
//!
//! ```text
//! namespace Experiments
//! {
//! 	public class Stats
//! 	{
//! 		public static string Beta = "Experiments.Child";
//! 		public static bool Beta_IsChild = true;
//! 	}
//! }
//! ```
//!
//! Nothing here depends on hash ordering, so identical input gives identical bytes.

use std::fmt::Write as _;

use crate::config::GeneratorConfig;
use crate::diagnostics::{codes, DiagnosticDescriptor, Severity};
use crate::namespace::NamespaceRule;

pub struct Codegen {
    out: String,
}

impl Codegen {
    pub fn new(config: &GeneratorConfig) -> Self {
        let mut out = String::new();
        out.push_str("// <auto-generated/>\n");
        out.push_str("using System;\n\n");
        let _ = writeln!(out, "namespace {}", config.container_namespace);
        out.push_str("{\n");
        let _ = writeln!(out, "\tpublic class {}", config.container_class);
        out.push_str("\t{\n");
        Self { out }
    }

    /// One name-table row plus its flag.
    pub fn emit_entry(&mut self, name: &str, namespace_path: &str, is_child: bool) {
        let _ = writeln!(
            self.out,
            "\t\tpublic static string {} = \"{}\";",
            name,
            escape_string_literal(namespace_path)
        );
        let _ = writeln!(self.out, "\t\tpublic static bool {}_IsChild = {};", name, is_child);
    }

    pub fn into_string(mut self) -> String {
        self.out.push_str("\t}\n");
        self.out.push_str("}\n");
        self.out
    }
}

/// Escapes for a regular (non-verbatim) C# string literal.
pub fn escape_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// EG0001, worded for the configured placement.
pub fn incorrect_namespace(rule: &NamespaceRule, root_type: &str) -> DiagnosticDescriptor {
    let required = rule.qualified();
    let root_name = root_type.rsplit(['.', '+']).next().unwrap_or(root_type);
    DiagnosticDescriptor {
        id: codes::INCORRECT_NAMESPACE,
        title: format!("Types derived from {root_name} must be in the namespace '{required}'"),
        message_format: format!(
            "The Type '{{0}}' must be defined in the namespace '{required}'; otherwise code generation will not function properly"
        ),
        severity: Severity::Error,
    }
}
