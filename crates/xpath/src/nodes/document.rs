use super::tree::{NodeData, NodeRecord};
use super::{NodeKind, XPathNode};
use crate::error::{Error, ErrorCode};
use crate::etree::{Document, ElementRef, identity};
use std::rc::Rc;

fn missing_root() -> Error {
    Error::from_code(ErrorCode::FOER0000, "Missing document root")
}

impl XPathNode {
    /// Document node of the tree, creating a dummy one for a tree rooted at an element.
    ///
    /// With `replace` the root element is dropped and its children become the
    /// document's children; otherwise the element is wrapped as the only child.
    /// With `as_parent` the document becomes the tree root and the parent of its
    /// children, otherwise the children stay parentless.
    pub fn get_document_node(&self, replace: bool, as_parent: bool) -> Self {
        let tree = self.tree().clone();
        let root = tree.root();
        if root.is_document() {
            return root;
        }
        let root_id = root.id();
        let root_obj = root.foreign();
        let children = if replace {
            tree.child_ids(root_id)
        } else {
            vec![root_id]
        };

        let mut state = tree.state_mut();
        let foreign_children: Vec<ElementRef> = if replace {
            children
                .iter()
                .filter_map(|id| match &state.node(*id).data {
                    NodeData::Element(data) => data.variant.foreign().cloned(),
                    NodeData::Comment { obj } | NodeData::ProcessingInstruction { obj } => {
                        Some(obj.clone())
                    }
                    _ => None,
                })
                .collect()
        } else {
            root_obj.iter().cloned().collect()
        };
        let position = state.node(root_id).position;
        let uri = state.uri.clone();
        let doc_id = state.push(NodeRecord {
            name: None,
            parent: None,
            position: if replace { position } else { position.saturating_sub(1) },
            data: NodeData::Document {
                obj: Rc::new(Document {
                    children: foreign_children,
                    uri,
                }),
                children: children.clone(),
            },
        });
        if replace {
            for child in &children {
                state.node_mut(*child).parent = as_parent.then_some(doc_id);
            }
            if let Some(obj) = &root_obj {
                state.elements.remove(&identity(obj));
            }
        } else if as_parent {
            state.node_mut(root_id).parent = Some(doc_id);
        }
        if as_parent {
            state.root = doc_id;
        }
        drop(state);
        tracing::debug!(replace, as_parent, "created dummy document node");
        tree.node(doc_id)
    }

    /// True when the document cannot be represented by a single element tree.
    pub fn is_extended(&self) -> Result<bool, Error> {
        if !self.is_document() {
            return Ok(false);
        }
        let children = self.children();
        let first = children.first().ok_or_else(missing_root)?;
        Ok(children.len() > 1 || first.kind() != NodeKind::Element)
    }

    /// First element child of a document node.
    pub fn getroot(&self) -> Result<Self, Error> {
        self.children()
            .into_iter()
            .find(XPathNode::is_element)
            .ok_or_else(missing_root)
    }

    /// Node wrapping `obj` in this node's tree.
    pub fn get_element_node(&self, obj: &ElementRef) -> Option<Self> {
        self.tree().get_element_node(obj)
    }
}
