//! Namespace chains: dotted path reconstruction and the placement rule.

use crate::model::{Compilation, NamespaceId};

/// Rebuilds `Outer.Inner` paths by walking enclosing namespaces outward.
///
/// The segment buffer is reused between calls and emptied after each one.
#[derive(Debug, Default)]
pub struct NamespacePathBuilder {
    stack: Vec<String>,
}

impl NamespacePathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty string for the global namespace.
    pub fn build(&mut self, model: &Compilation, namespace: NamespaceId) -> String {
        // innermost first
        let mut cursor = Some(namespace);
        while let Some(id) = cursor {
            let symbol = model.namespace(id);
            if symbol.is_global() {
                break;
            }
            self.stack.push(symbol.name().to_string());
            cursor = symbol.parent();
        }

        let mut out = String::new();
        for (i, segment) in self.stack.iter().rev().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(segment);
        }
        self.stack.clear();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Required placement: `<root>.<child>` directly under the global namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRule {
    pub root: String,
    pub child: String,
}

impl NamespaceRule {
    pub fn new(root: impl Into<String>, child: impl Into<String>) -> Self {
        Self { root: root.into(), child: child.into() }
    }

    pub fn qualified(&self) -> String {
        format!("{}.{}", self.root, self.child)
    }

    /// Exactly two levels of nesting: child, then root, then global.
    pub fn is_satisfied_by(&self, model: &Compilation, namespace: Option<NamespaceId>) -> bool {
        let Some(immediate) = namespace.map(|id| model.namespace(id)) else {
            return false;
        };
        if immediate.is_global() || immediate.name() != self.child {
            return false;
        }
        let Some(parent) = immediate.parent().map(|id| model.namespace(id)) else {
            return false;
        };
        if parent.is_global() || parent.name() != self.root {
            return false;
        }
        parent.parent().map(|id| model.namespace(id).is_global()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{namespace, record, tree};
    use serde_json::json;

    fn model() -> Compilation {
        Compilation::new(vec![tree("a.cs", json!([
            record("AtGlobal", &[]),
            namespace("Experiments", json!([
                record("Alpha", &[]),
                namespace("Child", json!([
                    record("Beta", &[]),
                    namespace("Deeper", json!([record("Gamma", &[])])),
                ])),
            ])),
            namespace("Other.Child", json!([record("Delta", &[])])),
            namespace("Outer.Experiments.Child", json!([record("Epsilon", &[])])),
        ]))])
        .unwrap()
    }

    fn ns_of(c: &Compilation, name: &str) -> NamespaceId {
        c.type_symbol(c.type_by_metadata_name(name).unwrap()).namespace()
    }

    #[test]
    fn builds_outermost_first() {
        let c = model();
        let mut b = NamespacePathBuilder::new();
        assert_eq!(b.build(&c, ns_of(&c, "Experiments.Child.Deeper.Gamma")), "Experiments.Child.Deeper");
        assert_eq!(b.build(&c, ns_of(&c, "Experiments.Alpha")), "Experiments");
        assert_eq!(b.build(&c, ns_of(&c, "AtGlobal")), "");
    }

    #[test]
    fn buffer_does_not_leak_between_calls() {
        let c = model();
        let mut b = NamespacePathBuilder::new();
        let first = b.build(&c, ns_of(&c, "Experiments.Child.Beta"));
        assert!(b.is_empty());
        let second = b.build(&c, ns_of(&c, "Other.Child.Delta"));
        assert!(b.is_empty());
        assert_eq!(first, "Experiments.Child");
        assert_eq!(second, "Other.Child");
        assert_eq!(b.build(&c, ns_of(&c, "Experiments.Child.Beta")), first);
    }

    #[test]
    fn rule_requires_exact_two_level_placement() {
        let c = model();
        let rule = NamespaceRule::new("Experiments", "Child");
        assert!(rule.is_satisfied_by(&c, Some(ns_of(&c, "Experiments.Child.Beta"))));
        assert!(!rule.is_satisfied_by(&c, Some(ns_of(&c, "Experiments.Alpha"))));
        assert!(!rule.is_satisfied_by(&c, Some(ns_of(&c, "Experiments.Child.Deeper.Gamma"))));
        assert!(!rule.is_satisfied_by(&c, Some(ns_of(&c, "Other.Child.Delta"))));
        assert!(!rule.is_satisfied_by(&c, Some(ns_of(&c, "Outer.Experiments.Child.Epsilon"))));
        assert!(!rule.is_satisfied_by(&c, Some(ns_of(&c, "AtGlobal"))));
        assert!(!rule.is_satisfied_by(&c, None));
        assert_eq!(rule.qualified(), "Experiments.Child");
    }
}
