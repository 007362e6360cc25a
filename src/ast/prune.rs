use crate::ast::node::{DeclKind, DeclTree, Node, NodeId, Payload};

/// Operator names that are never exposed across the boundary.
const OPERATOR_NAMES: [&str; 4] = ["new", "delete", "new[]", "delete[]"];

/// Configurable part of the pruning rules: declarations whose source
/// location falls under one of these prefixes are treated as
/// toolchain-internal and dropped.
#[derive(Debug, Clone, Default)]
pub struct PrunePolicy {
    pub internal_prefixes: Vec<String>,
}

impl PrunePolicy {
    pub fn with_prefixes(internal_prefixes: Vec<String>) -> PrunePolicy {
        PrunePolicy { internal_prefixes }
    }

    fn is_internal(&self, loc: &str) -> bool {
        self.internal_prefixes
            .iter()
            .any(|prefix| loc.starts_with(prefix))
    }
}

/// Surviving subtree layout, resolved bottom-up before any copying.
struct Kept {
    id: NodeId,
    children: Vec<Kept>,
}

/// Filter a declaration tree down to the declarations worth binding.
///
/// Pure: the input tree is untouched and the result is a freshly built
/// tree, so the raw view stays available for diagnostics. Dropping a node
/// always drops its whole subtree; grandchildren are never re-parented.
pub fn prune(tree: &DeclTree, policy: &PrunePolicy) -> DeclTree {
    match clean(tree, DeclTree::ROOT, policy) {
        Some(plan) => {
            let mut out = DeclTree::with_root(detach(tree.node(plan.id)));
            for child in &plan.children {
                copy(tree, child, &mut out, DeclTree::ROOT);
            }
            out
        }
        // The translation-unit root matches no drop rule; this arm only
        // fires when pruning a subtree rooted at a droppable node.
        None => DeclTree::with_root(detach(tree.root())),
    }
}

fn clean(tree: &DeclTree, id: NodeId, policy: &PrunePolicy) -> Option<Kept> {
    let node = tree.node(id);

    if let (DeclKind::Namespace, Payload::Token(name)) = (&node.kind, &node.payload) {
        if name == "std" || name.starts_with('_') {
            return None;
        }
    }

    if matches!(node.kind, DeclKind::Function | DeclKind::Typedef) {
        if let Payload::Symbol { name, .. } = &node.payload {
            if name.starts_with('_') || OPERATOR_NAMES.contains(&name.as_str()) {
                return None;
            }
        }
    }

    // Children first. An access-specifier sibling toggles the visibility
    // applied from that point on, itself included; every scope starts
    // public.
    let mut children = Vec::new();
    let mut public = true;
    for &child_id in &node.children {
        let child = tree.node(child_id);
        if child.kind == DeclKind::AccessSpec {
            if let Payload::Token(keyword) = &child.payload {
                match keyword.as_str() {
                    "public" => public = true,
                    "private" | "protected" => public = false,
                    _ => {}
                }
            }
        }
        if !public {
            continue;
        }
        if let Some(kept) = clean(tree, child_id, policy) {
            children.push(kept);
        }
    }

    if node.kind == DeclKind::LinkageSpec && children.is_empty() {
        return None;
    }

    if let Some(loc) = &node.loc {
        if policy.is_internal(loc) {
            return None;
        }
    }

    if matches!(node.kind, DeclKind::Enum | DeclKind::Typedef) {
        return None;
    }

    if node.kind == DeclKind::Record {
        match &node.payload {
            Payload::Opaque => return None,
            Payload::Record { name, .. } if name.starts_with('_') => return None,
            _ => {}
        }
    }

    Some(Kept { id, children })
}

fn copy(tree: &DeclTree, kept: &Kept, out: &mut DeclTree, out_parent: NodeId) {
    let id = out.attach(out_parent, detach(tree.node(kept.id)));
    for child in &kept.children {
        copy(tree, child, out, id);
    }
}

fn detach(node: &Node) -> Node {
    let mut node = node.clone();
    node.parent = None;
    node.children.clear();
    node
}
