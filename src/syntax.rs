//! Declaration trees handed over by the host front end.
//!
//! Only the node shapes the generator cares about are modelled; everything
//! else inside a type body is an opaque `Member`. Trees are plain data: no
//! parent pointers, no symbol links. Semantic links live in `crate::model`.

use serde::{Deserialize, Serialize};

// ------------------------------- Spans ------------------------------------ //

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub length: usize,
}

impl TextSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

// ------------------------------- Nodes ------------------------------------ //

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub path: String,
    /// Original source text. Only used to turn spans into line/column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub members: Vec<SyntaxNode>,
}

/// Closed set of node kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxNode {
    Namespace(NamespaceDeclaration),
    Using(UsingDirective),
    Type(TypeDeclaration),
    Member(MemberDeclaration),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDeclaration {
    pub name: String,                // may be dotted: `Experiments.Child`
    #[serde(default)]
    pub members: Vec<SyntaxNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsingDirective {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKeyword {
    Class,
    Record,
    Struct,
    Interface,
    Enum,
}

impl TypeKeyword {
    /// Kinds that can name a base class in the first base-list slot.
    pub fn has_base_class(self) -> bool {
        matches!(self, TypeKeyword::Class | TypeKeyword::Record)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub keyword: TypeKeyword,
    pub identifier: Identifier,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub base_list: Vec<TypeReference>,
    #[serde(default)]
    pub members: Vec<SyntaxNode>,
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        &self.identifier.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub text: String,
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReference {
    pub name: String,                // `Parent`, `Experiments.Parent`, `global::Experiments.Parent`
    #[serde(default)]
    pub span: TextSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDeclaration {
    #[serde(default)]
    pub text: String,
}

impl SyntaxNode {
    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Namespace(ns) => &ns.members,
            SyntaxNode::Type(ty) => &ty.members,
            SyntaxNode::Using(_) | SyntaxNode::Member(_) => &[],
        }
    }
}

// ----------------------------- Traversal ---------------------------------- //

impl SyntaxTree {
    /// Every node exactly once, depth-first pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: self.members.iter().rev().collect() }
    }

    /// Type declarations in pre-order. The position in this sequence is the
    /// declaration's ordinal inside its tree.
    pub fn type_declarations(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.descendants().filter_map(|node| match node {
            SyntaxNode::Type(decl) => Some(decl),
            _ => None,
        })
    }

    /// 1-based (line, column) of a byte offset, when the source text is known.
    /// Columns count characters, not bytes.
    pub fn line_column(&self, offset: usize) -> Option<(usize, usize)> {
        let text = self.text.as_deref()?;
        if offset > text.len() {
            return None;
        }
        let before = text.get(..offset)?;
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Some((line, before[line_start..].chars().count() + 1))
    }

    /// The full source line containing `offset`, without its newline.
    pub fn line_text(&self, offset: usize) -> Option<&str> {
        let text = self.text.as_deref()?;
        let before = text.get(..offset)?;
        let start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[start..].find('\n').map(|i| start + i).unwrap_or(text.len());
        Some(text[start..end].trim_end_matches('\r'))
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> SyntaxTree {
        serde_json::from_value(json!({
            "path": "Program.cs",
            "text": "namespace A\n{\n  record R : P {}\n}\n",
            "members": [
                {"kind": "using", "name": "System"},
                {"kind": "namespace", "name": "A", "members": [
                    {"kind": "type", "keyword": "record",
                     "identifier": {"text": "R", "span": {"start": 23, "length": 1}},
                     "base_list": [{"name": "P"}],
                     "members": [
                        {"kind": "member", "text": "int X;"},
                        {"kind": "type", "keyword": "class", "identifier": {"text": "Inner"}}
                     ]},
                    {"kind": "type", "keyword": "struct", "identifier": {"text": "S"}}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn descendants_are_preorder() {
        let t = tree();
        let kinds: Vec<String> = t
            .descendants()
            .map(|n| match n {
                SyntaxNode::Namespace(ns) => format!("ns:{}", ns.name),
                SyntaxNode::Using(u) => format!("using:{}", u.name),
                SyntaxNode::Type(ty) => format!("type:{}", ty.name()),
                SyntaxNode::Member(_) => "member".to_string(),
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["using:System", "ns:A", "type:R", "member", "type:Inner", "type:S"]
        );
    }

    #[test]
    fn type_declarations_skip_other_nodes() {
        let t = tree();
        let names: Vec<&str> = t.type_declarations().map(|d| d.name()).collect();
        assert_eq!(names, vec!["R", "Inner", "S"]);
    }

    #[test]
    fn line_column_from_offset() {
        let t = tree();
        assert_eq!(t.line_column(0), Some((1, 1)));
        assert_eq!(t.line_column(23), Some((3, 10)));
        assert_eq!(t.line_text(23), Some("  record R : P {}"));
        let mut no_text = t.clone();
        no_text.text = None;
        assert_eq!(no_text.line_column(23), None);
    }

    #[test]
    fn columns_count_characters() {
        let t = SyntaxTree { path: "u.cs".into(), text: Some("x\n\u{3bb}\u{3bb} R".into()), members: vec![] };
        // `R` sits at byte 7 but is the fourth character of its line
        assert_eq!(t.line_column(7), Some((2, 4)));
        assert_eq!(t.line_column(3), None);
    }
}
