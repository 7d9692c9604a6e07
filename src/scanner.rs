//! Syntactic candidate collection.

use crate::model::DeclarationId;
use crate::syntax::{SyntaxNode, SyntaxTree, TypeDeclaration};

/// A type declaration that lists at least one base type. Whether it really
/// derives from anything interesting is decided later, semantically.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub id: DeclarationId,
    pub declaration: &'a TypeDeclaration,
}

/// Candidates of one tree, in pre-order.
pub fn scan_tree(tree_index: usize, tree: &SyntaxTree) -> Vec<Candidate<'_>> {
    let mut out = Vec::new();
    let mut ordinal = 0;
    for node in tree.descendants() {
        match node {
            SyntaxNode::Type(declaration) => {
                if !declaration.base_list.is_empty() {
                    out.push(Candidate {
                        id: DeclarationId { tree: tree_index, ordinal },
                        declaration,
                    });
                }
                ordinal += 1;
            }
            SyntaxNode::Namespace(_) | SyntaxNode::Using(_) | SyntaxNode::Member(_) => {}
        }
    }
    out
}

/// Candidates of every tree, trees in snapshot order.
pub fn scan<'a>(trees: &'a [SyntaxTree]) -> Vec<Candidate<'a>> {
    trees
        .iter()
        .enumerate()
        .flat_map(|(index, tree)| scan_tree(index, tree))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{namespace, record, ty, tree};
    use serde_json::json;

    #[test]
    fn only_declarations_with_base_list() {
        let t = tree("a.cs", json!([
            {"kind": "using", "name": "System"},
            namespace("N", json!([
                record("Plain", &[]),
                record("Derived", &["Plain"]),
                ty("class", "Outer", &[], json!([
                    {"kind": "member", "text": "int x;"},
                    ty("struct", "InnerStruct", &["IEquatable"], json!([])),
                ])),
            ])),
        ]));
        let found = scan_tree(0, &t);
        let got: Vec<(&str, usize)> = found.iter().map(|c| (c.declaration.name(), c.id.ordinal)).collect();
        assert_eq!(got, vec![("Derived", 1), ("InnerStruct", 3)]);
    }

    #[test]
    fn order_is_stable_across_trees() {
        let trees = vec![
            tree("a.cs", json!([record("A", &["X"]), record("B", &["X"])])),
            tree("b.cs", json!([record("C", &["X"])])),
        ];
        let first: Vec<DeclarationId> = scan(&trees).iter().map(|c| c.id).collect();
        let second: Vec<DeclarationId> = scan(&trees).iter().map(|c| c.id).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![
            DeclarationId { tree: 0, ordinal: 0 },
            DeclarationId { tree: 0, ordinal: 1 },
            DeclarationId { tree: 1, ordinal: 0 },
        ]);
    }

    #[test]
    fn empty_tree_has_no_candidates() {
        assert!(scan(&[tree("a.cs", json!([]))]).is_empty());
    }
}
