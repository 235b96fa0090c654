// 🌳 Tree Assembly - Nested hierarchies from flat self-referential records
//
// Org units and the leadership structure are stored flat, each record
// pointing at its parent. Assembly happens fully in memory from one batch
// of records - never one query per node - and defends against the data
// the storage layer cannot promise: self-parents, orphans, cycles.

use std::collections::{HashMap, HashSet};

use serde_json::{Map as JsonMap, Value};
use tracing::warn;

use crate::language::Language;
use crate::localized::Localize;
use crate::record::{sort_siblings, ContentRecord};

/// Recursion bound for pathological parent chains. Real org structures are
/// a handful of levels deep; anything past this is cyclic or corrupt data.
pub const MAX_TREE_DEPTH: usize = 32;

// ============================================================================
// TREE NODE
// ============================================================================

/// One assembled node: the record plus its ordered children.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub record: ContentRecord,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Total nodes in this subtree, the node itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// Flat index of active nodes, grouped for assembly.
struct Arena {
    by_id: HashMap<String, ContentRecord>,
    children_of: HashMap<String, Vec<String>>,
    roots: Vec<String>,
}

impl Arena {
    fn build(nodes: Vec<ContentRecord>, root_of: Option<&str>) -> Arena {
        let mut by_id: HashMap<String, ContentRecord> = HashMap::new();
        for node in nodes.into_iter().filter(|n| n.is_active) {
            by_id.insert(node.id.clone(), node);
        }

        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut roots: Vec<String> = Vec::new();

        for node in by_id.values() {
            if node.parent_id.as_deref() == Some(node.id.as_str()) {
                // A node cannot be its own parent; drop it entirely
                warn!(id = %node.id, "tree node lists itself as parent, skipping");
                continue;
            }
            match (&node.parent_id, root_of) {
                // Explicit root filter: roots are the children of root_of
                (Some(parent), Some(root)) if parent == root => roots.push(node.id.clone()),
                (None, None) => roots.push(node.id.clone()),
                (Some(parent), _) => {
                    if !by_id.contains_key(parent) {
                        // Orphan: declared parent is missing or inactive
                        warn!(id = %node.id, parent = %parent, "orphan tree node, skipping");
                        continue;
                    }
                    children_of
                        .entry(parent.clone())
                        .or_default()
                        .push(node.id.clone());
                }
                (None, Some(_)) => {}
            }
        }

        Arena {
            by_id,
            children_of,
            roots,
        }
    }

    fn sorted(&self, mut ids: Vec<String>) -> Vec<ContentRecord> {
        let mut records: Vec<ContentRecord> = ids
            .drain(..)
            .filter_map(|id| self.by_id.get(&id).cloned())
            .collect();
        sort_siblings(&mut records);
        records
    }

    fn collect(&self, record: ContentRecord, visited: &mut HashSet<String>, depth: usize) -> TreeNode {
        if depth >= MAX_TREE_DEPTH {
            warn!(id = %record.id, "max tree depth reached, not descending");
            return TreeNode {
                record,
                children: Vec::new(),
            };
        }

        let child_ids = self.children_of.get(&record.id).cloned().unwrap_or_default();
        let mut children = Vec::new();

        for child in self.sorted(child_ids) {
            // Visited set breaks genuine cycles: stop descending, don't crash
            if !visited.insert(child.id.clone()) {
                warn!(id = %child.id, "cycle detected in parent chain, skipping");
                continue;
            }
            children.push(self.collect(child, visited, depth + 1));
        }

        TreeNode { record, children }
    }
}

/// Assemble nested trees from flat records: roots are active nodes with no
/// parent, every sibling list is sorted by `order` then canonical name,
/// inactive nodes and their subtrees never appear.
pub fn assemble(nodes: Vec<ContentRecord>) -> Vec<TreeNode> {
    assemble_trees(nodes, None)
}

/// Assemble subtrees under an explicit root id instead of parentless roots.
pub fn assemble_under(nodes: Vec<ContentRecord>, root_id: &str) -> Vec<TreeNode> {
    assemble_trees(nodes, Some(root_id))
}

fn assemble_trees(nodes: Vec<ContentRecord>, root_of: Option<&str>) -> Vec<TreeNode> {
    let arena = Arena::build(nodes, root_of);
    let mut visited: HashSet<String> = HashSet::new();

    let mut trees = Vec::new();
    for root in arena.sorted(arena.roots.clone()) {
        if !visited.insert(root.id.clone()) {
            continue;
        }
        trees.push(arena.collect(root, &mut visited, 0));
    }
    trees
}

// ============================================================================
// PROJECTION
// ============================================================================

/// Project assembled trees as nested JSON: each node is its localized
/// fields plus a `children` array, empty at the leaves.
pub fn localized_tree_json(trees: &[TreeNode], lang: Language) -> Vec<Value> {
    trees.iter().map(|node| node_json(node, lang)).collect()
}

fn node_json(node: &TreeNode, lang: Language) -> Value {
    let mut out: JsonMap<String, Value> = node.record.localized_json(lang);
    out.insert(
        "children".to_string(),
        Value::Array(localized_tree_json(&node.children, lang)),
    );
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ContentKind;
    use crate::localized::LocalizedField;

    fn unit(name: &str, order: i64) -> ContentRecord {
        ContentRecord::new(ContentKind::OrgUnit)
            .with_field("name", LocalizedField::canonical(name))
            .with_order(order)
    }

    #[test]
    fn test_roots_ordered_and_children_attached() {
        let b = unit("B", 2);
        let a = unit("A", 1);
        let c = unit("C", 1).with_parent(b.id.clone());

        let trees = assemble(vec![b.clone(), a.clone(), c.clone()]);

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].record.id, a.id);
        assert!(trees[0].children.is_empty());
        assert_eq!(trees[1].record.id, b.id);
        assert_eq!(trees[1].children.len(), 1);
        assert_eq!(trees[1].children[0].record.id, c.id);
    }

    #[test]
    fn test_sibling_order_ties_broken_by_name() {
        let root = unit("Root", 0);
        let x = unit("X", 1).with_parent(root.id.clone());
        let m = unit("M", 1).with_parent(root.id.clone());
        let z = unit("Z", 0).with_parent(root.id.clone());

        let trees = assemble(vec![root.clone(), x, m, z]);
        let names: Vec<&str> = trees[0]
            .children
            .iter()
            .map(|c| c.record.canonical_name())
            .collect();
        assert_eq!(names, vec!["Z", "M", "X"]);
    }

    #[test]
    fn test_inactive_nodes_excluded_with_subtree() {
        let root = unit("Root", 0);
        let dead = unit("Dead", 1).with_parent(root.id.clone()).inactive();
        let grandchild = unit("Grandchild", 1).with_parent(dead.id.clone());

        let trees = assemble(vec![root, dead, grandchild]);

        assert_eq!(trees.len(), 1);
        // The inactive child is gone and its grandchild is an orphan
        assert!(trees[0].children.is_empty());
    }

    #[test]
    fn test_self_parent_excluded_not_recursed() {
        let root = unit("Root", 0);
        let mut selfie = unit("Selfie", 1);
        selfie.parent_id = Some(selfie.id.clone());

        let trees = assemble(vec![root, selfie]);

        assert_eq!(trees.len(), 1);
        assert!(trees[0].children.is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut a = unit("A", 1);
        let mut b = unit("B", 2);
        a.parent_id = Some(b.id.clone());
        b.parent_id = Some(a.id.clone());
        let root = unit("Root", 0);

        // Neither cycle member is a root; assembly terminates with just the root
        let trees = assemble(vec![a, b, root]);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].record.canonical_name(), "Root");
    }

    #[test]
    fn test_descent_into_cycle_stops_at_visited_node() {
        // Two-node loop, entered by rooting the assembly inside it
        let mut a = unit("A", 1);
        let mut b = unit("B", 2);
        a.parent_id = Some(b.id.clone());
        b.parent_id = Some(a.id.clone());

        let trees = assemble_under(vec![a.clone(), b.clone()], &a.id);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].record.id, b.id);
        assert_eq!(trees[0].children.len(), 1);
        assert_eq!(trees[0].children[0].record.id, a.id);
        // Descent terminates instead of looping back to b
        assert!(trees[0].children[0].children.is_empty());
    }

    #[test]
    fn test_orphan_excluded() {
        let root = unit("Root", 0);
        let orphan = unit("Orphan", 1).with_parent("no-such-id".to_string());

        let trees = assemble(vec![root, orphan]);
        assert_eq!(trees.len(), 1);
        assert!(trees[0].children.is_empty());
    }

    #[test]
    fn test_assemble_under_explicit_root() {
        let top = unit("Top", 0);
        let child = unit("Child", 1).with_parent(top.id.clone());
        let grandchild = unit("Grandchild", 1).with_parent(child.id.clone());

        let trees = assemble_under(vec![top.clone(), child.clone(), grandchild], &top.id);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].record.id, child.id);
        assert_eq!(trees[0].children.len(), 1);
    }

    #[test]
    fn test_localized_tree_json_shape() {
        let root = ContentRecord::new(ContentKind::OrgUnit)
            .with_field("name", LocalizedField::new("Ректорат", "Rectorate", ""));
        let leaf = unit("Отдел", 1).with_parent(root.id.clone());

        let trees = assemble(vec![root, leaf]);
        let json = localized_tree_json(&trees, Language::En);

        assert_eq!(json.len(), 1);
        assert_eq!(json[0]["name"], "Rectorate");
        let children = json[0]["children"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        // Leaves terminate in empty arrays
        assert_eq!(children[0]["children"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_node_size_and_depth() {
        let root = unit("Root", 0);
        let child = unit("Child", 1).with_parent(root.id.clone());
        let grandchild = unit("Grandchild", 1).with_parent(child.id.clone());

        let trees = assemble(vec![root, child, grandchild]);
        assert_eq!(trees[0].size(), 3);
        assert_eq!(trees[0].depth(), 3);
    }
}
