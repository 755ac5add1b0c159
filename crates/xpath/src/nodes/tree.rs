use super::XPathNode;
use crate::etree::{Document, ElementRef, Namespaces, identity};
use crate::schema::{SchemaRef, XsdAttributeRef, XsdElementRef, XsdTypeRef};
use compact_str::CompactString;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub(crate) enum ElementVariant {
    /// Children enumerated when the tree is built.
    Etree(ElementRef),
    /// Children synthesized on first iteration.
    Lazy { obj: ElementRef, built: bool },
    /// A schema element declaration; `reference` points at the canonical node
    /// of a declaration already present in the tree.
    Schema {
        obj: XsdElementRef,
        reference: Option<NodeId>,
    },
}

impl ElementVariant {
    pub(crate) const fn foreign(&self) -> Option<&ElementRef> {
        match self {
            Self::Etree(obj) | Self::Lazy { obj, .. } => Some(obj),
            Self::Schema { .. } => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ElementData {
    pub variant: ElementVariant,
    pub children: Vec<NodeId>,
    pub xsd_type: Option<XsdTypeRef>,
    pub nsmap: Rc<Namespaces>,
    pub namespace_nodes: Option<Rc<[NodeId]>>,
    pub attributes: Option<Rc<[NodeId]>>,
}

#[derive(Debug)]
pub(crate) enum AttributeValue {
    Text(String),
    Schema(XsdAttributeRef),
}

#[derive(Debug)]
pub(crate) enum NodeData {
    Document {
        obj: Rc<Document>,
        children: Vec<NodeId>,
    },
    Element(ElementData),
    Attribute {
        value: AttributeValue,
        xsd_type: Option<XsdTypeRef>,
    },
    Namespace {
        uri: String,
    },
    Text {
        value: String,
    },
    Comment {
        obj: ElementRef,
    },
    ProcessingInstruction {
        obj: ElementRef,
    },
}

#[derive(Debug)]
pub(crate) struct NodeRecord {
    pub name: Option<CompactString>,
    pub parent: Option<NodeId>,
    pub position: usize,
    pub data: NodeData,
}

impl NodeRecord {
    pub(crate) const fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) const fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Child list of documents and elements, empty for leaves.
    pub(crate) fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Document { children, .. } => children,
            NodeData::Element(data) => &data.children,
            _ => &[],
        }
    }
}

pub(crate) struct TreeState {
    pub nodes: Vec<NodeRecord>,
    pub root: NodeId,
    /// Foreign object identity to owning node.
    pub elements: HashMap<*const (), NodeId>,
    pub namespaces: Rc<Namespaces>,
    pub schema: Option<SchemaRef>,
    pub uri: Option<String>,
}

impl TreeState {
    pub(crate) fn new(namespaces: Namespaces, uri: Option<String>) -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId(0),
            elements: HashMap::new(),
            namespaces: Rc::new(namespaces),
            schema: None,
            uri,
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeRecord {
        &mut self.nodes[id.0]
    }

    /// Adds a node to the arena. A node created with a parent is appended to the
    /// parent's children; comments and processing instructions are registered in
    /// the identity map.
    pub(crate) fn push(&mut self, record: NodeRecord) -> NodeId {
        let id = NodeId(self.nodes.len());
        match &record.data {
            NodeData::Comment { obj } | NodeData::ProcessingInstruction { obj } => {
                self.elements.insert(identity(obj), id);
            }
            NodeData::Element(data) => {
                if let Some(obj) = data.variant.foreign() {
                    self.elements.insert(identity(obj), id);
                } else if let ElementVariant::Schema {
                    obj,
                    reference: None,
                } = &data.variant
                {
                    self.elements.insert(identity(obj), id);
                }
            }
            _ => {}
        }
        let parent = record.parent;
        let appends = matches!(
            record.data,
            NodeData::Element(_)
                | NodeData::Text { .. }
                | NodeData::Comment { .. }
                | NodeData::ProcessingInstruction { .. }
        );
        self.nodes.push(record);
        if appends && let Some(parent) = parent {
            match &mut self.node_mut(parent).data {
                NodeData::Document { children, .. } => children.push(id),
                NodeData::Element(data) => data.children.push(id),
                _ => {}
            }
        }
        id
    }

    /// Children of an element, following a schema element's reference.
    pub(crate) fn content(&self, id: NodeId) -> &[NodeId] {
        if let Some(ElementData {
            variant:
                ElementVariant::Schema {
                    reference: Some(target),
                    ..
                },
            ..
        }) = self.node(id).element()
        {
            return self.node(*target).children();
        }
        self.node(id).children()
    }
}

/// Shared state of one connected node tree.
///
/// All nodes of a tree hold a handle to the same `NodeTree`; nodes are never
/// shared across trees.
#[derive(Clone)]
pub struct NodeTree(pub(crate) Rc<RefCell<TreeState>>);

impl NodeTree {
    pub(crate) fn from_state(state: TreeState) -> Self {
        Self(Rc::new(RefCell::new(state)))
    }

    pub(crate) fn state(&self) -> Ref<'_, TreeState> {
        self.0.borrow()
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, TreeState> {
        self.0.borrow_mut()
    }

    pub(crate) fn node(&self, id: NodeId) -> XPathNode {
        XPathNode::new(self.clone(), id)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Document node or root element of the tree.
    pub fn root(&self) -> XPathNode {
        let root = self.state().root;
        self.node(root)
    }

    pub fn uri(&self) -> Option<String> {
        self.state().uri.clone()
    }

    pub fn set_uri(&self, uri: impl Into<String>) {
        self.state_mut().uri = Some(uri.into());
    }

    /// Fallback namespace map for elements without their own.
    pub fn namespaces(&self) -> Rc<Namespaces> {
        self.state().namespaces.clone()
    }

    pub fn schema(&self) -> Option<SchemaRef> {
        self.state().schema.clone()
    }

    /// Number of nodes created so far, lazily built ones included.
    pub fn len(&self) -> usize {
        self.state().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().nodes.is_empty()
    }

    /// Node wrapping the given foreign object, if any.
    pub fn get_element_node(&self, obj: &ElementRef) -> Option<XPathNode> {
        let id = self.state().elements.get(&identity(obj)).copied();
        id.map(|id| self.node(id))
    }

    /// Node wrapping the given schema element declaration, if any.
    pub fn get_schema_node(&self, obj: &XsdElementRef) -> Option<XPathNode> {
        let id = self.state().elements.get(&identity(obj)).copied();
        id.map(|id| self.node(id))
    }
}

impl fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("NodeTree")
            .field("nodes", &state.nodes.len())
            .field("root", &state.root)
            .field("uri", &state.uri)
            .finish_non_exhaustive()
    }
}
