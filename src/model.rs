//! Compilation model: the semantic view over a set of declaration trees.
//!
//! Namespaces and types live in two arenas and refer to each other by index,
//! so "enclosing namespace" and "base type" are plain ids rather than owned
//! pointers. Partial declarations of the same type are interned into one
//! `TypeSymbol` keyed by (namespace, containing type, short name); every
//! declaration site still keeps its own `DeclarationId`.
//!
//! Binding happens in three steps:
//! 1. declare namespaces and types, tree by tree, pre-order;
//! 2. resolve each class/record's first base-list entry;
//! 3. reject cyclic inheritance, so base chains are finite for every consumer.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::syntax::{SyntaxNode, SyntaxTree, TypeDeclaration, TypeKeyword};

// ------------------------------- Ids -------------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NamespaceId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(usize);

/// A declaration site: tree index plus pre-order ordinal among that tree's
/// type declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclarationId {
    pub tree: usize,
    pub ordinal: usize,
}

impl NamespaceId {
    pub const GLOBAL: NamespaceId = NamespaceId(0);
}

// ------------------------------ Symbols ----------------------------------- //

#[derive(Debug, Clone)]
pub struct NamespaceSymbol {
    name: String,
    parent: Option<NamespaceId>,
    namespaces: IndexMap<String, NamespaceId>,
    types: IndexMap<String, TypeId>,
}

impl NamespaceSymbol {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }
    /// The unnamed root namespace.
    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    name: String,
    keyword: TypeKeyword,
    namespace: NamespaceId,
    containing_type: Option<TypeId>,
    base: Option<TypeId>,
    nested: IndexMap<String, TypeId>,
    declarations: Vec<DeclarationId>,
}

impl TypeSymbol {
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Innermost enclosing namespace. Nested types report their outer type's.
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }
    pub fn containing_type(&self) -> Option<TypeId> {
        self.containing_type
    }
    pub fn base(&self) -> Option<TypeId> {
        self.base
    }
    pub fn declarations(&self) -> &[DeclarationId] {
        &self.declarations
    }
}

// ------------------------------- Errors ----------------------------------- //

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("{tree}: namespace `{name}` has an empty segment")]
    EmptyNamespaceSegment { tree: String, name: String },
    #[error("partial declarations of `{type_name}` disagree on the base type (`{first}` vs `{second}`)")]
    ConflictingBase {
        type_name: String,
        first: String,
        second: String,
    },
    #[error("circular base type dependency involving `{type_name}`")]
    CyclicInheritance { type_name: String },
}

// ----------------------------- Compilation -------------------------------- //

#[derive(Debug, Clone)]
pub struct Compilation {
    trees: Vec<SyntaxTree>,
    namespaces: Vec<NamespaceSymbol>,
    types: Vec<TypeSymbol>,
    declared: Vec<Vec<TypeId>>, // [tree][ordinal] -> symbol
}

/// Lexical position of a base-type reference, captured while declaring.
#[derive(Debug, Clone)]
struct LookupScope {
    namespace: NamespaceId,
    containing_type: Option<TypeId>,
    usings: Vec<(NamespaceId, String)>, // (namespace block declaring it, imported namespace)
}

struct PendingBase {
    ty: TypeId,
    reference: String,
    scope: LookupScope,
}

#[derive(Debug, Clone, Copy)]
enum Entity {
    Namespace(NamespaceId),
    Type(TypeId),
}

impl Compilation {
    pub fn new(trees: Vec<SyntaxTree>) -> Result<Self, ModelError> {
        let mut out = Self {
            trees: Vec::new(),
            namespaces: vec![NamespaceSymbol {
                name: String::new(),
                parent: None,
                namespaces: IndexMap::new(),
                types: IndexMap::new(),
            }],
            types: Vec::new(),
            declared: Vec::with_capacity(trees.len()),
        };

        // 1) declare
        let mut pending = Vec::<PendingBase>::new();
        for (tree_index, tree) in trees.iter().enumerate() {
            let mut ordinals = Vec::new();
            let scope = LookupScope {
                namespace: NamespaceId::GLOBAL,
                containing_type: None,
                usings: Vec::new(),
            };
            out.declare_members(tree, tree_index, &tree.members, &scope, &mut ordinals, &mut pending)?;
            out.declared.push(ordinals);
        }

        // 2) bind bases
        for item in pending {
            out.bind_base(item)?;
        }

        // 3) soundness gate
        out.check_acyclic()?;

        out.trees = trees;
        tracing::debug!(
            trees = out.trees.len(),
            namespaces = out.namespaces.len(),
            types = out.types.len(),
            "compilation bound"
        );
        Ok(out)
    }

    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }
    pub fn tree(&self, index: usize) -> Option<&SyntaxTree> {
        self.trees.get(index)
    }
    pub fn namespace(&self, id: NamespaceId) -> &NamespaceSymbol {
        &self.namespaces[id.0]
    }
    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0]
    }

    /// Symbol a declaration site binds to.
    pub fn declared_symbol(&self, decl: DeclarationId) -> Option<TypeId> {
        self.declared.get(decl.tree)?.get(decl.ordinal).copied()
    }

    /// Dotted namespace path plus `+`-separated nesting: `Experiments.Outer+Inner`.
    pub fn metadata_name(&self, id: TypeId) -> String {
        let mut nesting = vec![self.type_symbol(id).name()];
        let mut cursor = self.type_symbol(id).containing_type;
        while let Some(outer) = cursor {
            nesting.push(self.type_symbol(outer).name());
            cursor = self.type_symbol(outer).containing_type;
        }
        nesting.reverse();
        let nested = nesting.join("+");

        let namespace = self.namespace_name(self.type_symbol(id).namespace);
        if namespace.is_empty() { nested } else { format!("{namespace}.{nested}") }
    }

    /// Fully qualified lookup, e.g. `Experiments.Parent` or `A.Outer+Inner`.
    pub fn type_by_metadata_name(&self, metadata_name: &str) -> Option<TypeId> {
        let mut parts = metadata_name.split('+');
        let head = parts.next()?;
        let segments: Vec<&str> = head.split('.').collect();
        let (type_name, namespace_path) = segments.split_last()?;
        let mut namespace = NamespaceId::GLOBAL;
        for segment in namespace_path {
            namespace = *self.namespace(namespace).namespaces.get(*segment)?;
        }
        let mut ty = *self.namespace(namespace).types.get(*type_name)?;
        for nested in parts {
            ty = *self.type_symbol(ty).nested.get(nested)?;
        }
        Some(ty)
    }

    fn namespace_name(&self, id: NamespaceId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(ns) = cursor {
            let symbol = self.namespace(ns);
            if symbol.is_global() {
                break;
            }
            segments.push(symbol.name());
            cursor = symbol.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    // --------------------------- declare ---------------------------------- //

    fn declare_members(
        &mut self,
        tree: &SyntaxTree,
        tree_index: usize,
        members: &[SyntaxNode],
        outer: &LookupScope,
        ordinals: &mut Vec<TypeId>,
        pending: &mut Vec<PendingBase>,
    ) -> Result<(), ModelError> {
        // usings apply to the whole block they appear in, at that block's level
        let mut scope = outer.clone();
        for node in members {
            if let SyntaxNode::Using(using) = node {
                scope.usings.push((scope.namespace, using.name.clone()));
            }
        }

        for node in members {
            match node {
                SyntaxNode::Namespace(ns) => {
                    let mut id = scope.namespace;
                    for segment in ns.name.split('.').map(str::trim) {
                        if segment.is_empty() {
                            return Err(ModelError::EmptyNamespaceSegment {
                                tree: tree.path.clone(),
                                name: ns.name.clone(),
                            });
                        }
                        id = self.child_namespace(id, segment);
                    }
                    let inner = LookupScope {
                        namespace: id,
                        containing_type: None,
                        usings: scope.usings.clone(),
                    };
                    self.declare_members(tree, tree_index, &ns.members, &inner, ordinals, pending)?;
                }
                SyntaxNode::Type(decl) => {
                    let ty = self.declare_type(decl, &scope, DeclarationId {
                        tree: tree_index,
                        ordinal: ordinals.len(),
                    });
                    ordinals.push(ty);
                    if decl.keyword.has_base_class() {
                        if let Some(first) = decl.base_list.first() {
                            pending.push(PendingBase {
                                ty,
                                reference: first.name.clone(),
                                scope: scope.clone(),
                            });
                        }
                    }
                    let inner = LookupScope {
                        namespace: scope.namespace,
                        containing_type: Some(ty),
                        usings: scope.usings.clone(),
                    };
                    self.declare_members(tree, tree_index, &decl.members, &inner, ordinals, pending)?;
                }
                SyntaxNode::Using(_) | SyntaxNode::Member(_) => {}
            }
        }
        Ok(())
    }

    fn child_namespace(&mut self, parent: NamespaceId, name: &str) -> NamespaceId {
        if let Some(id) = self.namespaces[parent.0].namespaces.get(name) {
            return *id;
        }
        let id = NamespaceId(self.namespaces.len());
        self.namespaces.push(NamespaceSymbol {
            name: name.to_string(),
            parent: Some(parent),
            namespaces: IndexMap::new(),
            types: IndexMap::new(),
        });
        self.namespaces[parent.0].namespaces.insert(name.to_string(), id);
        id
    }

    fn declare_type(&mut self, decl: &TypeDeclaration, scope: &LookupScope, site: DeclarationId) -> TypeId {
        let existing = match scope.containing_type {
            Some(outer) => self.types[outer.0].nested.get(decl.name()),
            None => self.namespaces[scope.namespace.0].types.get(decl.name()),
        };
        if let Some(id) = existing.copied() {
            self.types[id.0].declarations.push(site);
            return id;
        }

        let id = TypeId(self.types.len());
        self.types.push(TypeSymbol {
            name: decl.name().to_string(),
            keyword: decl.keyword,
            namespace: scope.namespace,
            containing_type: scope.containing_type,
            base: None,
            nested: IndexMap::new(),
            declarations: vec![site],
        });
        match scope.containing_type {
            Some(outer) => self.types[outer.0].nested.insert(decl.name().to_string(), id),
            None => self.namespaces[scope.namespace.0].types.insert(decl.name().to_string(), id),
        };
        id
    }

    // ----------------------------- bind ----------------------------------- //

    fn bind_base(&mut self, item: PendingBase) -> Result<(), ModelError> {
        // interfaces and unknown (external) types end the chain here
        let Some(base) = self
            .resolve_type_reference(&item.reference, &item.scope)
            .filter(|id| self.type_symbol(*id).keyword.has_base_class())
        else {
            tracing::trace!(reference = %item.reference, "base reference does not bind to a declared class");
            return Ok(());
        };

        let current = self.types[item.ty.0].base;
        match current {
            Some(previous) if previous != base => Err(ModelError::ConflictingBase {
                type_name: self.metadata_name(item.ty),
                first: self.metadata_name(previous),
                second: self.metadata_name(base),
            }),
            _ => {
                self.types[item.ty.0].base = Some(base);
                Ok(())
            }
        }
    }

    fn resolve_type_reference(&self, reference: &str, scope: &LookupScope) -> Option<TypeId> {
        let (from_global, path) = match reference.trim().strip_prefix("global::") {
            Some(rest) => (true, rest),
            None => (false, reference.trim()),
        };
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        let (first, rest) = segments.split_first()?;
        let start = if from_global {
            self.member(Entity::Namespace(NamespaceId::GLOBAL), first)
        } else {
            self.lookup_simple_name(first, scope)
        }?;
        let found = rest.iter().try_fold(start, |entity, segment| self.member(entity, segment))?;
        match found {
            Entity::Type(id) => Some(id),
            Entity::Namespace(_) => None,
        }
    }

    fn member(&self, entity: Entity, name: &str) -> Option<Entity> {
        match entity {
            Entity::Namespace(ns) => {
                let symbol = self.namespace(ns);
                symbol
                    .types
                    .get(name)
                    .map(|id| Entity::Type(*id))
                    .or_else(|| symbol.namespaces.get(name).map(|id| Entity::Namespace(*id)))
            }
            Entity::Type(ty) => self.type_symbol(ty).nested.get(name).map(|id| Entity::Type(*id)),
        }
    }

    fn lookup_simple_name(&self, name: &str, scope: &LookupScope) -> Option<Entity> {
        // containing types, innermost first
        let mut containing = scope.containing_type;
        while let Some(ty) = containing {
            if let Some(found) = self.member(Entity::Type(ty), name) {
                return Some(found);
            }
            containing = self.type_symbol(ty).containing_type;
        }

        // enclosing namespaces, innermost first; each level's own members,
        // then the usings declared at that level
        let mut namespace = Some(scope.namespace);
        while let Some(ns) = namespace {
            if let Some(found) = self.member(Entity::Namespace(ns), name) {
                return Some(found);
            }
            if let Some(found) = self.imported_type(name, ns, &scope.usings) {
                return Some(found);
            }
            namespace = self.namespace(ns).parent;
        }
        None
    }

    /// using imports bring types (not namespaces) into scope
    fn imported_type(&self, name: &str, level: NamespaceId, usings: &[(NamespaceId, String)]) -> Option<Entity> {
        usings
            .iter()
            .filter(|(declared_in, _)| *declared_in == level)
            .find_map(|(_, using)| {
                let imported = using
                    .split('.')
                    .map(str::trim)
                    .try_fold(NamespaceId::GLOBAL, |ns, segment| {
                        self.namespace(ns).namespaces.get(segment).copied()
                    })?;
                self.namespace(imported).types.get(name).map(|id| Entity::Type(*id))
            })
    }

    // ---------------------------- gate ------------------------------------ //

    fn check_acyclic(&self) -> Result<(), ModelError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark { Unvisited, OnPath, Done }

        let mut marks = vec![Mark::Unvisited; self.types.len()];
        for start in 0..self.types.len() {
            let mut path = Vec::new();
            let mut cursor = Some(TypeId(start));
            while let Some(id) = cursor {
                match marks[id.0] {
                    Mark::Done => break,
                    Mark::OnPath => {
                        return Err(ModelError::CyclicInheritance {
                            type_name: self.metadata_name(id),
                        });
                    }
                    Mark::Unvisited => {
                        marks[id.0] = Mark::OnPath;
                        path.push(id);
                        cursor = self.types[id.0].base;
                    }
                }
            }
            for id in path {
                marks[id.0] = Mark::Done;
            }
        }
        Ok(())
    }
}

// ------------------------------- Tests ------------------------------------ //
