use crate::data::TreeData;
use crate::geom::Point;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: usize,
    /// Position assigned by the most recent layout pass.
    pub position: Point,
    /// Position at the end of the previous render pass (`x0`/`y0`); entering children grow out
    /// of their parent's previous position.
    pub previous: Point,
}

impl TreeNode {
    fn new(name: String, parent: Option<NodeId>, depth: usize) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            depth,
            position: Point::ORIGIN,
            previous: Point::ORIGIN,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An arena-backed tree of uniquely named nodes.
///
/// Removed nodes leave a tombstone behind so ids handed out earlier never alias a different node.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Option<TreeNode>>,
    root: NodeId,
    len: usize,
}

impl Tree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            slots: vec![Some(TreeNode::new(root_name.into(), None, 0))],
            root: NodeId(0),
            len: 1,
        }
    }

    /// Builds a tree from nested data, rejecting empty and repeated names.
    pub fn from_data(data: &TreeData) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut tree = Tree::new(validated_name(&data.name, &mut seen)?);

        let mut stack: Vec<(NodeId, &TreeData)> = vec![(tree.root, data)];
        while let Some((id, d)) = stack.pop() {
            for child in &d.children {
                let name = validated_name(&child.name, &mut seen)?;
                let child_id = tree.push_child(id, name.to_string());
                stack.push((child_id, child));
            }
        }
        Ok(tree)
    }

    pub fn to_data(&self) -> TreeData {
        fn build(tree: &Tree, id: NodeId) -> TreeData {
            let node = &tree[id];
            TreeData {
                name: node.name.clone(),
                children: node.children.iter().map(|&c| build(tree, c)).collect(),
            }
        }
        build(self, self.root)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &TreeNode {
        &self[self.root]
    }

    pub fn root_node_mut(&mut self) -> &mut TreeNode {
        let root = self.root;
        &mut self[root]
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Breadth-first lookup by exact name; the first match wins.
    ///
    /// The frontier is bounded by the arena size, so a corrupted child list cannot make the
    /// search run forever.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        let mut frontier = VecDeque::from([self.root]);
        let mut budget = self.slots.len();
        while let Some(id) = frontier.pop_front() {
            if budget == 0 {
                break;
            }
            budget -= 1;
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.name == name {
                return Some(id);
            }
            frontier.extend(node.children.iter().copied());
        }
        None
    }

    pub fn find_node(&self, name: &str) -> Result<NodeId> {
        self.get(name).ok_or_else(|| Error::NodeNotFound {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Appends `name` as the last child of the node named `parent`.
    pub fn add_child(&mut self, parent: &str, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        let parent_id = self.find_node(parent)?;
        if self.contains(&name) {
            return Err(Error::DuplicateNode { name });
        }
        let id = self.push_child(parent_id, name);
        tracing::debug!(parent, name = %self[id].name, "added tree node");
        Ok(id)
    }

    /// Detaches the node named `name` from its parent and tombstones its whole subtree.
    ///
    /// Returns the removed nodes in pre-order, the named node first. Each keeps its `parent`
    /// id and last positions.
    pub fn remove(&mut self, name: &str) -> Result<Vec<TreeNode>> {
        let id = self.find_node(name)?;
        let Some(parent_id) = self.parent(id) else {
            return Err(Error::CannotRemoveRoot {
                name: name.to_string(),
            });
        };

        if let Some(parent) = self.node_mut(parent_id) {
            parent.children.retain(|&c| c != id);
        }

        let doomed = self.pre_order_from(id);
        let mut removed = Vec::with_capacity(doomed.len());
        for d in doomed {
            if let Some(node) = self.slots.get_mut(d.0).and_then(Option::take) {
                removed.push(node);
            }
        }
        self.len -= removed.len();
        tracing::debug!(name, removed = removed.len(), "removed tree node");
        Ok(removed)
    }

    /// Live node ids in pre-order (parents before children, siblings in order).
    pub fn pre_order(&self) -> Vec<NodeId> {
        self.pre_order_from(self.root)
    }

    fn pre_order_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Parent/child pairs in pre-order of the parent.
    pub fn links(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = Vec::new();
        for id in self.pre_order() {
            for &child in self.children(id) {
                out.push((id, child));
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId(i), n)))
    }

    fn push_child(&mut self, parent: NodeId, name: String) -> NodeId {
        let depth = self.node(parent).map_or(0, |p| p.depth + 1);
        let id = NodeId(self.slots.len());
        self.slots.push(Some(TreeNode::new(name, Some(parent), depth)));
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        self.len += 1;
        id
    }
}

impl std::ops::Index<NodeId> for Tree {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        match self.node(id) {
            Some(node) => node,
            None => panic!("no live node at {id:?}"),
        }
    }
}

impl std::ops::IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode {
        match self.node_mut(id) {
            Some(node) => node,
            None => panic!("no live node at {id:?}"),
        }
    }
}

fn validated_name<'a>(name: &'a str, seen: &mut HashSet<&'a str>) -> Result<&'a str> {
    if name.is_empty() {
        return Err(Error::InvalidData {
            message: "node names must not be empty".to_string(),
        });
    }
    if !seen.insert(name) {
        return Err(Error::DuplicateNode {
            name: name.to_string(),
        });
    }
    Ok(name)
}
