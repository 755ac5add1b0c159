use super::XPathNode;
use super::tree::{ElementData, ElementVariant, NodeId, NodeTree};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterMode {
    /// Namespaces, attributes and children, building lazy content.
    Full,
    /// Only content that already exists.
    Materialized,
    /// Children only, following schema references.
    Descendants,
}

/// Depth-first pre-order traversal: a node, then its namespace nodes, its
/// attributes and its children.
///
/// Schema elements are visited at most once so cyclic declarations terminate.
pub struct NodeIter {
    tree: NodeTree,
    stack: Vec<NodeId>,
    mode: IterMode,
    visited: HashSet<NodeId>,
}

impl NodeIter {
    fn new(node: &XPathNode, mode: IterMode, with_self: bool) -> Self {
        let mut iter = Self {
            tree: node.tree().clone(),
            stack: Vec::new(),
            mode,
            visited: HashSet::new(),
        };
        if with_self {
            iter.stack.push(node.id());
        } else {
            let children = iter.tree.child_ids(node.id());
            iter.stack.extend(children.into_iter().rev());
        }
        iter
    }

    /// Whether `id` is a schema element, with its reference if it has one.
    fn schema_state(&self, id: NodeId) -> (bool, Option<NodeId>) {
        let state = self.tree.state();
        match state.node(id).element() {
            Some(ElementData {
                variant: ElementVariant::Schema { reference, .. },
                ..
            }) => (true, *reference),
            _ => (false, None),
        }
    }
}

impl Iterator for NodeIter {
    type Item = XPathNode;

    fn next(&mut self) -> Option<XPathNode> {
        loop {
            let mut id = self.stack.pop()?;
            let (is_schema, reference) = self.schema_state(id);
            if is_schema {
                if self.mode == IterMode::Descendants
                    && let Some(target) = reference
                {
                    id = target;
                }
                if !self.visited.insert(id) {
                    continue;
                }
            }

            let is_element = self.tree.state().node(id).element().is_some();
            let mut pending: Vec<NodeId> = Vec::new();
            match self.mode {
                IterMode::Full => {
                    if is_element {
                        pending.extend(self.tree.namespace_ids(id).iter().copied());
                        pending.extend(self.tree.attribute_ids(id).iter().copied());
                    }
                    self.tree.ensure_children(id);
                    pending.extend_from_slice(self.tree.state().node(id).children());
                }
                IterMode::Materialized => {
                    let state = self.tree.state();
                    let record = state.node(id);
                    if let Some(data) = record.element() {
                        for ids in [&data.namespace_nodes, &data.attributes].into_iter().flatten() {
                            pending.extend(ids.iter().copied());
                        }
                    }
                    pending.extend_from_slice(record.children());
                }
                IterMode::Descendants => {
                    self.tree.ensure_children(id);
                    pending.extend_from_slice(self.tree.state().content(id));
                }
            }
            self.stack.extend(pending.into_iter().rev());
            return Some(self.tree.node(id));
        }
    }
}

impl XPathNode {
    /// Every node of the subtree in document order, building lazy content.
    pub fn iter(&self) -> NodeIter {
        NodeIter::new(self, IterMode::Full, true)
    }

    /// Like [`XPathNode::iter`] but without creating any node.
    pub fn iter_lazy(&self) -> NodeIter {
        NodeIter::new(self, IterMode::Materialized, true)
    }

    /// Descendant nodes without namespaces and attributes.
    pub fn iter_descendants(&self, with_self: bool) -> NodeIter {
        NodeIter::new(self, IterMode::Descendants, with_self)
    }
}
