use super::tree::{AttributeValue, ElementData, ElementVariant, NodeData, NodeId, NodeRecord, NodeTree};
use crate::etree::{ElementRef, Namespaces, iter_strings};
use crate::schema::{XsdAttributeRef, XsdElementRef, XsdTypeRef};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The seven XDM node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Namespace,
    Text,
    Comment,
    ProcessingInstruction,
}

impl NodeKind {
    /// Name returned by the `node-kind` accessor.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Element => "element",
            Self::Attribute => "attribute",
            Self::Namespace => "namespace",
            Self::Text => "text",
            Self::Comment => "comment",
            Self::ProcessingInstruction => "processing-instruction",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle on a node of a [`NodeTree`].
#[derive(Clone)]
pub struct XPathNode {
    tree: NodeTree,
    id: NodeId,
}

impl XPathNode {
    pub(crate) const fn new(tree: NodeTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub const fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&NodeRecord) -> R) -> R {
        f(self.tree.state().node(self.id))
    }

    pub fn kind(&self) -> NodeKind {
        self.with(|r| match &r.data {
            NodeData::Document { .. } => NodeKind::Document,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Attribute { .. } => NodeKind::Attribute,
            NodeData::Namespace { .. } => NodeKind::Namespace,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Comment { .. } => NodeKind::Comment,
            NodeData::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
        })
    }

    pub fn node_kind(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    pub fn is_document(&self) -> bool {
        self.kind() == NodeKind::Document
    }

    /// Element wrapping a foreign element, eager or lazy.
    pub fn is_etree_element(&self) -> bool {
        self.with(|r| r.element().is_some_and(|d| d.variant.foreign().is_some()))
    }

    pub fn is_lazy(&self) -> bool {
        self.with(|r| {
            matches!(
                r.element(),
                Some(ElementData {
                    variant: ElementVariant::Lazy { .. },
                    ..
                })
            )
        })
    }

    /// Element built from a schema declaration, or attribute built from a schema attribute.
    pub fn is_schema_node(&self) -> bool {
        self.with(|r| match &r.data {
            NodeData::Element(data) => matches!(data.variant, ElementVariant::Schema { .. }),
            NodeData::Attribute { value, .. } => matches!(value, AttributeValue::Schema(_)),
            _ => false,
        })
    }

    /// Name in extended format. Namespace nodes are named by their prefix,
    /// processing instructions by their target.
    pub fn name(&self) -> Option<String> {
        self.with(|r| r.name.as_ref().map(ToString::to_string))
    }

    pub fn position(&self) -> usize {
        self.with(|r| r.position)
    }

    pub fn parent(&self) -> Option<Self> {
        let parent = self.with(|r| r.parent)?;
        Some(self.tree.node(parent))
    }

    /// Ordered children of a document or element; lazy elements are built here.
    pub fn children(&self) -> Vec<Self> {
        self.tree
            .child_ids(self.id)
            .into_iter()
            .map(|id| self.tree.node(id))
            .collect()
    }

    pub fn namespace_nodes(&self) -> NodeList {
        NodeList {
            tree: self.tree.clone(),
            ids: self.tree.namespace_ids(self.id),
        }
    }

    pub fn attributes(&self) -> NodeList {
        NodeList {
            tree: self.tree.clone(),
            ids: self.tree.attribute_ids(self.id),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<Self> {
        self.attributes()
            .iter()
            .find(|attr| attr.name().as_deref() == Some(name))
    }

    /// Wrapped foreign value of elements, comments and processing instructions.
    pub fn foreign(&self) -> Option<ElementRef> {
        self.with(|r| match &r.data {
            NodeData::Element(data) => data.variant.foreign().cloned(),
            NodeData::Comment { obj } | NodeData::ProcessingInstruction { obj } => {
                Some(obj.clone())
            }
            _ => None,
        })
    }

    pub fn xsd_element(&self) -> Option<XsdElementRef> {
        self.with(|r| match r.element().map(|d| &d.variant) {
            Some(ElementVariant::Schema { obj, .. }) => Some(obj.clone()),
            _ => None,
        })
    }

    pub fn xsd_attribute(&self) -> Option<XsdAttributeRef> {
        self.with(|r| match &r.data {
            NodeData::Attribute {
                value: AttributeValue::Schema(attr),
                ..
            } => Some(attr.clone()),
            _ => None,
        })
    }

    /// Canonical node a repeated schema declaration points to.
    pub fn schema_reference(&self) -> Option<Self> {
        let target = self.with(|r| match r.element().map(|d| &d.variant) {
            Some(ElementVariant::Schema { reference, .. }) => *reference,
            _ => None,
        })?;
        Some(self.tree.node(target))
    }

    pub fn xsd_type(&self) -> Option<XsdTypeRef> {
        self.with(|r| match &r.data {
            NodeData::Element(data) => data.xsd_type.clone(),
            NodeData::Attribute { xsd_type, .. } => xsd_type.clone(),
            _ => None,
        })
    }

    pub(crate) fn set_xsd_type(&self, value: Option<XsdTypeRef>) {
        let mut state = self.tree.state_mut();
        match &mut state.node_mut(self.id).data {
            NodeData::Element(data) => data.xsd_type = value,
            NodeData::Attribute { xsd_type, .. } => *xsd_type = value,
            _ => {}
        }
    }

    /// Namespace map in scope: the element's own, the parent element's for other
    /// nodes, empty at top level.
    pub fn nsmap(&self) -> Rc<Namespaces> {
        let (own, parent) = self.with(|r| (r.element().map(|d| d.nsmap.clone()), r.parent));
        if let Some(nsmap) = own {
            return nsmap;
        }
        match parent {
            Some(parent) => {
                let state = self.tree.state();
                match state.node(parent).element() {
                    Some(data) => data.nsmap.clone(),
                    None => Rc::new(Namespaces::new()),
                }
            }
            None => Rc::new(Namespaces::new()),
        }
    }

    pub fn default_namespace(&self) -> Option<String> {
        self.nsmap().get("").cloned()
    }

    /// Text of a text node, a text attribute or a namespace URI.
    pub fn value(&self) -> Option<String> {
        self.with(|r| match &r.data {
            NodeData::Text { value }
            | NodeData::Attribute {
                value: AttributeValue::Text(value),
                ..
            } => Some(value.clone()),
            NodeData::Namespace { uri } => Some(uri.clone()),
            _ => None,
        })
    }

    /// Namespace URI of a namespace node.
    pub fn namespace_uri(&self) -> Option<String> {
        self.with(|r| match &r.data {
            NodeData::Namespace { uri } => Some(uri.clone()),
            _ => None,
        })
    }

    /// The XDM string value.
    pub fn string_value(&self) -> String {
        match self.kind() {
            NodeKind::Document => self
                .children()
                .iter()
                .filter(|c| matches!(c.kind(), NodeKind::Element | NodeKind::Text))
                .map(Self::string_value)
                .collect(),
            NodeKind::Element => {
                let (obj, xsd_type) =
                    self.with(|r| (r.element().and_then(|d| d.variant.foreign().cloned()), self_type(r)));
                match obj {
                    Some(obj) => {
                        let normalize = xsd_type.as_ref().is_some_and(|t| t.is_element_only());
                        iter_strings(obj.as_ref(), normalize)
                    }
                    None => super::typing::sample_values(xsd_type.as_ref())
                        .first()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                }
            }
            NodeKind::Attribute if self.is_schema_node() => {
                super::typing::sample_values(self.xsd_type().as_ref())
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            }
            NodeKind::Comment | NodeKind::ProcessingInstruction => self
                .foreign()
                .and_then(|obj| obj.text().map(str::to_string))
                .unwrap_or_default(),
            _ => self.value().unwrap_or_default(),
        }
    }

    /// 1-based position of `child` among same-kind siblings, same-named for elements.
    pub fn get_child_position(&self, child: &Self) -> Option<usize> {
        let kind = child.kind();
        let name = child.name();
        let mut position = 0;
        for sibling in self.children() {
            if sibling.kind() != kind || (kind == NodeKind::Element && sibling.name() != name) {
                continue;
            }
            position += 1;
            if sibling == *child {
                return Some(position);
            }
        }
        None
    }

    /// Ancestor-or-self that has no parent.
    pub fn root(&self) -> Self {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }
}

fn self_type(record: &NodeRecord) -> Option<XsdTypeRef> {
    record.element().and_then(|d| d.xsd_type.clone())
}

impl PartialEq for XPathNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tree.ptr_eq(&other.tree)
    }
}

impl Eq for XPathNode {}

impl Hash for XPathNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.tree.0).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for XPathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, position) = self.with(|r| (r.name.clone(), r.position));
        f.debug_struct("XPathNode")
            .field("kind", &self.kind())
            .field("name", &name)
            .field("position", &position)
            .finish()
    }
}

/// Cached namespace or attribute nodes of an element.
///
/// Repeated access to the same element returns lists sharing one allocation,
/// see [`NodeList::ptr_eq`].
#[derive(Clone)]
pub struct NodeList {
    tree: NodeTree,
    ids: Rc<[NodeId]>,
}

impl NodeList {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<XPathNode> {
        self.ids.get(index).map(|id| self.tree.node(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = XPathNode> + '_ {
        self.ids.iter().map(|id| self.tree.node(*id))
    }

    /// True when both lists are the same cached sequence.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.ids, &other.ids)
    }

    pub fn to_vec(&self) -> Vec<XPathNode> {
        self.iter().collect()
    }
}

impl fmt::Debug for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
