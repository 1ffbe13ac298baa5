//! Binary tree of color classes, stored as an arena addressed by index.

use std::collections::VecDeque;

use crate::stats::ClassStats;

/// Class identifier written into the label map. Ids are never reused, so a
/// run with `count` colors uses ids `1..=2 * count - 1`.
pub type ClassId = u16;

/// Index of a node inside [`ColorTree`]. Arena order is creation order.
pub type NodeId = usize;

pub const ROOT_CLASS: ClassId = 1;

#[derive(Clone, Debug)]
pub struct ColorNode {
    pub classid: ClassId,
    /// `None` until the statistics engine has scanned the node's pixels.
    pub stats: Option<ClassStats>,
    children: Option<(NodeId, NodeId)>,
    terminal: bool,
}

impl ColorNode {
    fn new(classid: ClassId) -> Self { Self { classid, stats: None, children: None, terminal: false } }

    pub fn children(&self) -> Option<(NodeId, NodeId)> { self.children }
    pub fn is_leaf(&self) -> bool { self.children.is_none() }

    /// A leaf that failed to split and will not be selected again.
    pub fn is_terminal(&self) -> bool { self.terminal }
}

#[derive(Clone, Debug)]
pub struct ColorTree {
    nodes: Vec<ColorNode>,
}

impl Default for ColorTree {
    fn default() -> Self { Self::new() }
}

impl ColorTree {
    /// A tree holding only the root class. Its statistics still need computing.
    pub fn new() -> Self { Self { nodes: vec![ColorNode::new(ROOT_CLASS)] } }

    pub fn root(&self) -> NodeId { 0 }
    pub fn len(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
    pub fn node(&self, id: NodeId) -> &ColorNode { &self.nodes[id] }
    pub fn node_mut(&mut self, id: NodeId) -> &mut ColorNode { &mut self.nodes[id] }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ColorNode)> { self.nodes.iter().enumerate() }

    /// Breadth-first traversal from the root.
    pub fn walk(&self, mut visit: impl FnMut(NodeId, &ColorNode)) {
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id];
            visit(id, node);
            if let Some((left, right)) = node.children {
                queue.push_back(left);
                queue.push_back(right);
            }
        }
    }

    /// One greater than the largest id anywhere in the tree, internal nodes included.
    pub fn next_class_id(&self) -> ClassId {
        let mut max = 0;
        self.walk(|_, node| max = max.max(node.classid));
        max + 1
    }

    /// Leaves in breadth-first order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(|id, node| {
            if node.is_leaf() {
                out.push(id);
            }
        });
        out
    }

    /// The non-terminal leaf whose covariance has the largest eigenvalue.
    ///
    /// A lone root is returned without decomposing anything. Ties keep the
    /// first leaf in traversal order. Leaves without statistics are skipped.
    pub fn max_eigenvalue_leaf(&self) -> Option<NodeId> {
        let root = &self.nodes[self.root()];
        if root.is_leaf() {
            return (!root.terminal).then_some(self.root());
        }

        let mut best: Option<(NodeId, f64)> = None;
        self.walk(|id, node| {
            if !node.is_leaf() || node.terminal {
                return;
            }
            let Some(stats) = node.stats else { return };
            let value = stats.principal_eigenvalue();
            if best.map_or(true, |(_, max)| value > max) {
                best = Some((id, value));
            }
        });
        best.map(|(id, _)| id)
    }

    /// Turns leaf `parent` into an internal node with two fresh children.
    pub(crate) fn attach_children(&mut self, parent: NodeId, left: ClassId, right: ClassId) -> (NodeId, NodeId) {
        debug_assert!(self.nodes[parent].is_leaf(), "class {} already split", self.nodes[parent].classid);
        let l = self.nodes.len();
        self.nodes.push(ColorNode::new(left));
        self.nodes.push(ColorNode::new(right));
        self.nodes[parent].children = Some((l, l + 1));
        (l, l + 1)
    }

    pub(crate) fn mark_terminal(&mut self, id: NodeId) { self.nodes[id].terminal = true; }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{Mat3, Vec3};

    fn stats_with_variance(v: f64) -> ClassStats {
        ClassStats { mean: Vec3::default(), covariance: Mat3::identity().scale(v), pixel_count: 1 }
    }

    #[test]
    fn fresh_tree_is_single_root() {
        let tree = ColorTree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.node(tree.root()).classid, ROOT_CLASS);
        assert_eq!(tree.leaves(), vec![0]);
        assert_eq!(tree.next_class_id(), 2);
        // No statistics yet, but a lone root is still returned.
        assert_eq!(tree.max_eigenvalue_leaf(), Some(0));
    }

    #[test]
    fn next_class_id_counts_internal_nodes() {
        let mut tree = ColorTree::new();
        let (l, _r) = tree.attach_children(0, 2, 3);
        tree.attach_children(l, 4, 5);
        assert_eq!(tree.next_class_id(), 6);
        let ids: Vec<ClassId> = tree.leaves().iter().map(|&id| tree.node(id).classid).collect();
        // Breadth first: 3 is discovered before the children of 2.
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn max_eigenvalue_prefers_first_on_ties_and_skips_terminal() {
        let mut tree = ColorTree::new();
        let (l, r) = tree.attach_children(0, 2, 3);
        tree.node_mut(l).stats = Some(stats_with_variance(0.5));
        tree.node_mut(r).stats = Some(stats_with_variance(0.5));
        assert_eq!(tree.max_eigenvalue_leaf(), Some(l));

        tree.node_mut(r).stats = Some(stats_with_variance(0.75));
        assert_eq!(tree.max_eigenvalue_leaf(), Some(r));

        tree.mark_terminal(r);
        assert_eq!(tree.max_eigenvalue_leaf(), Some(l));
        tree.mark_terminal(l);
        assert_eq!(tree.max_eigenvalue_leaf(), None);
    }
}
