/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::fmt;

use crate::FunctionalUnitId;

/// The index of a node in the search tree.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);
impl NodeId {
    /// The root of every search tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Returns the position of the node in the tree's arena.
    pub fn index(self) -> usize {
        self.0
    }
}
impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// A plan alternative: one functional unit realizing a requirement of its parent's unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) functional_unit: FunctionalUnitId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) visits: u32,
    pub(crate) success_count: u64,
    pub(crate) expanded: bool,
}

impl Node {
    pub(crate) fn new(functional_unit: FunctionalUnitId, parent: Option<NodeId>) -> Self {
        Self {
            functional_unit,
            parent,
            children: Vec::new(),
            visits: 0,
            success_count: 0,
            expanded: false,
        }
    }

    /// Records one visit that yielded `success_count` successful rollouts.
    pub(crate) fn update(&mut self, success_count: u32) {
        self.visits += 1;
        self.success_count += u64::from(success_count);
    }

    /// Returns the functional unit of this alternative
    pub fn functional_unit(&self) -> FunctionalUnitId {
        self.functional_unit
    }

    /// Returns the parent node, None for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the child alternatives, in creation order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the number of visits to this node
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Returns the sum of successful rollouts backpropagated through this node
    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    /// Returns whether expansion already ran on this node
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Returns whether the node has no child yet
    pub fn is_frontier(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_accumulates() {
        let mut node = Node::new(FunctionalUnitId(4), Some(NodeId::ROOT));
        assert!(node.is_frontier());
        node.update(5);
        node.update(0);
        node.update(3);
        assert_eq!(node.visits(), 3);
        assert_eq!(node.success_count(), 8);
        assert_eq!(node.parent(), Some(NodeId::ROOT));
        assert!(!node.is_expanded());
    }
}
