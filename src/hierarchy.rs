use crate::model::{Compilation, TypeId};

/// Walks `ty`'s base chain looking for `root`.
///
/// The type itself is not its own ancestor. Chains are finite because
/// `Compilation::new` rejects cycles.
pub fn derives_from(model: &Compilation, ty: TypeId, root: TypeId) -> bool {
    depth_below(model, ty, root).is_some()
}

/// Number of base links between `ty` and `root`, if `ty` derives from it.
pub fn depth_below(model: &Compilation, ty: TypeId, root: TypeId) -> Option<usize> {
    let mut depth = 0;
    let mut base = model.type_symbol(ty).base();
    while let Some(id) = base {
        depth += 1;
        if id == root {
            return Some(depth);
        }
        base = model.type_symbol(id).base();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{namespace, record, tree};
    use serde_json::json;

    fn lookup(c: &Compilation, name: &str) -> TypeId {
        c.type_by_metadata_name(name).unwrap()
    }

    #[test]
    fn direct_and_transitive_members() {
        let c = Compilation::new(vec![tree("a.cs", json!([namespace("Experiments", json!([
            record("Parent", &[]),
            record("Alpha", &["Parent"]),
            record("Grand", &["Alpha"]),
            record("Unrelated", &["Other"]),
            record("Other", &[]),
        ]))]))])
        .unwrap();
        let root = lookup(&c, "Experiments.Parent");
        assert!(derives_from(&c, lookup(&c, "Experiments.Alpha"), root));
        assert!(derives_from(&c, lookup(&c, "Experiments.Grand"), root));
        assert!(!derives_from(&c, lookup(&c, "Experiments.Unrelated"), root));
        assert!(!derives_from(&c, root, root));
        assert_eq!(depth_below(&c, lookup(&c, "Experiments.Grand"), root), Some(2));
        assert_eq!(depth_below(&c, lookup(&c, "Experiments.Other"), root), None);
    }

    #[test]
    fn long_chains_do_not_recurse() {
        let mut members = vec![record("T0", &[])];
        for i in 1..5000 {
            let base = format!("T{}", i - 1);
            members.push(record(&format!("T{i}"), &[base.as_str()]));
        }
        let c = Compilation::new(vec![tree("a.cs", json!(members))]).unwrap();
        assert_eq!(depth_below(&c, lookup(&c, "T4999"), lookup(&c, "T0")), Some(4999));
    }
}
