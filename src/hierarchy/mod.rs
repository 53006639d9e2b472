//! Arena tree built from the raw records, carrying aggregate values and,
//! once packed, the circle geometry of every node.

mod parse;

use std::collections::VecDeque;

use tracing::debug;

use crate::error::InvalidDataError;

pub use parse::{RawNode, load_hierarchy};

/// Stable identity of a node for the lifetime of the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct TreeNode {
    pub name: String,
    /// Sum of leaf sizes below this node, or its own size for a leaf.
    pub value: f64,
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Sorted by descending value; ties keep source order.
    pub children: Vec<NodeId>,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Hierarchy {
    // Preorder: every parent sits before its children.
    nodes: Vec<TreeNode>,
}

impl Hierarchy {
    pub fn build(raw: &RawNode) -> Result<Self, InvalidDataError> {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut stack = vec![(raw, None::<NodeId>, 0usize)];

        while let Some((record, parent, depth)) = stack.pop() {
            let leaf_value = Self::validated_size(record)?;
            let children = record.children();
            if !children.is_empty() && record.size.is_some() {
                debug!(name = %record.name, "ignoring size on a node with children");
            }

            let id = NodeId(nodes.len());
            nodes.push(TreeNode {
                name: record.name.clone(),
                value: if children.is_empty() { leaf_value } else { 0.0 },
                depth,
                parent,
                children: Vec::with_capacity(children.len()),
                x: 0.0,
                y: 0.0,
                r: 0.0,
            });
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }

            for child in children.iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }

        for index in (0..nodes.len()).rev() {
            if nodes[index].children.is_empty() {
                continue;
            }
            let mut children = std::mem::take(&mut nodes[index].children);
            children.sort_by(|a, b| nodes[b.0].value.total_cmp(&nodes[a.0].value));
            let value: f64 = children.iter().map(|child| nodes[child.0].value).sum();
            if !value.is_finite() {
                return Err(InvalidDataError::NonFiniteSize {
                    name: nodes[index].name.clone(),
                });
            }
            nodes[index].value = value;
            nodes[index].children = children;
        }

        debug!(
            nodes = nodes.len(),
            total = nodes[0].value,
            "built hierarchy"
        );
        Ok(Self { nodes })
    }

    fn validated_size(record: &RawNode) -> Result<f64, InvalidDataError> {
        let Some(size) = record.size else {
            return Ok(0.0);
        };
        if !size.is_finite() {
            return Err(InvalidDataError::NonFiniteSize {
                name: record.name.clone(),
            });
        }
        if size < 0.0 {
            return Err(InvalidDataError::NegativeSize {
                name: record.name.clone(),
                size,
            });
        }
        Ok(size)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Ids in preorder: parents are always yielded before their children.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Breadth-first from the root, children in sorted order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.node(id).children.iter().copied());
        }
        order
    }

    /// Path from the root down to `id`, both ends included.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }
}
