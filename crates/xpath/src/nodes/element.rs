//! Element content: namespace and attribute nodes, lazy children and position bookkeeping.

use super::tree::{
    AttributeValue, ElementData, ElementVariant, NodeData, NodeId, NodeRecord, NodeTree, TreeState,
};
use crate::consts::XML_URI;
use crate::etree::{ElementRef, ForeignShape, Namespaces};
use crate::schema::{XsdElementRef, XsdTypeRef};
use compact_str::CompactString;
use std::rc::Rc;

/// Number of namespace nodes of an element: the implicit `xml` binding plus its map.
pub(crate) fn namespace_count(nsmap: &Namespaces) -> usize {
    1 + nsmap.keys().filter(|prefix| *prefix != "xml").count()
}

/// Namespace map in scope for a foreign element given the inherited one.
pub(crate) fn effective_nsmap(obj: &ElementRef, inherited: &Rc<Namespaces>) -> Rc<Namespaces> {
    match obj.nsmap() {
        Some(own) if !own.is_empty() => {
            let mut merged = (**inherited).clone();
            merged.extend(own.iter().map(|(p, u)| (p.clone(), u.clone())));
            Rc::new(merged)
        }
        _ => inherited.clone(),
    }
}

/// Positions taken by an element itself, its namespace nodes and its attributes.
pub(crate) fn head_span(nsmap: &Namespaces, attributes: usize) -> usize {
    1 + namespace_count(nsmap) + attributes
}

/// Positions reserved by a foreign element and its whole content, its own tail excluded.
pub(crate) fn subtree_span(obj: &ElementRef, inherited: &Rc<Namespaces>) -> usize {
    let mut total = 0;
    let mut stack = vec![(obj.clone(), inherited.clone(), true)];
    while let Some((e, parent_ns, is_root)) = stack.pop() {
        if !is_root && e.tail().is_some() {
            total += 1;
        }
        if e.shape() != ForeignShape::Element {
            total += 1;
            continue;
        }
        let nsmap = effective_nsmap(&e, &parent_ns);
        total += head_span(&nsmap, e.attrib().len()) + usize::from(e.text().is_some());
        for child in e.children() {
            stack.push((child.clone(), nsmap.clone(), false));
        }
    }
    total
}

pub(crate) fn element_record(
    obj: &ElementRef,
    parent: Option<NodeId>,
    position: usize,
    nsmap: Rc<Namespaces>,
    lazy: bool,
) -> NodeRecord {
    let variant = if lazy {
        ElementVariant::Lazy {
            obj: obj.clone(),
            built: false,
        }
    } else {
        ElementVariant::Etree(obj.clone())
    };
    NodeRecord {
        name: Some(CompactString::from(obj.tag())),
        parent,
        position,
        data: NodeData::Element(ElementData {
            variant,
            children: Vec::new(),
            xsd_type: None,
            nsmap,
            namespace_nodes: None,
            attributes: None,
        }),
    }
}

pub(crate) fn schema_element_record(
    obj: &XsdElementRef,
    parent: Option<NodeId>,
    position: usize,
    nsmap: Rc<Namespaces>,
    reference: Option<NodeId>,
) -> NodeRecord {
    NodeRecord {
        name: obj.name().map(CompactString::from),
        parent,
        position,
        data: NodeData::Element(ElementData {
            variant: ElementVariant::Schema {
                obj: obj.clone(),
                reference,
            },
            children: Vec::new(),
            xsd_type: obj.xsd_type(),
            nsmap,
            namespace_nodes: None,
            attributes: None,
        }),
    }
}

pub(crate) fn text_record(value: &str, parent: Option<NodeId>, position: usize) -> NodeRecord {
    NodeRecord {
        name: None,
        parent,
        position,
        data: NodeData::Text {
            value: value.to_string(),
        },
    }
}

/// Record for a comment or processing instruction child.
pub(crate) fn leaf_record(obj: &ElementRef, parent: Option<NodeId>, position: usize) -> NodeRecord {
    if obj.shape() == ForeignShape::ProcessingInstruction {
        NodeRecord {
            name: Some(CompactString::from(obj.tag())),
            parent,
            position,
            data: NodeData::ProcessingInstruction { obj: obj.clone() },
        }
    } else {
        NodeRecord {
            name: None,
            parent,
            position,
            data: NodeData::Comment { obj: obj.clone() },
        }
    }
}

/// Appends the nodes for a foreign element's children, starting at `position`.
/// Child elements are added with [`element_record`]; returns the ids of the element
/// children so the caller can descend.
pub(crate) fn push_content(
    state: &mut TreeState,
    parent: NodeId,
    obj: &ElementRef,
    nsmap: &Rc<Namespaces>,
    mut position: usize,
    lazy: bool,
) -> usize {
    if let Some(text) = obj.text() {
        state.push(text_record(text, Some(parent), position));
        position += 1;
    }
    for child in obj.children() {
        if child.shape() == ForeignShape::Element {
            let child_ns = effective_nsmap(child, nsmap);
            let span = subtree_span(child, nsmap);
            state.push(element_record(child, Some(parent), position, child_ns, lazy));
            position += span;
        } else {
            state.push(leaf_record(child, Some(parent), position));
            position += 1;
        }
        if let Some(tail) = child.tail() {
            state.push(text_record(tail, Some(parent), position));
            position += 1;
        }
    }
    position
}

struct AttributeEntry {
    name: CompactString,
    value: AttributeValue,
    xsd_type: Option<XsdTypeRef>,
}

impl NodeTree {
    /// Builds the children of a lazy element on first access. Later calls are no-ops.
    pub(crate) fn ensure_children(&self, id: NodeId) {
        let (obj, nsmap, start) = {
            let state = self.state();
            let record = state.node(id);
            let Some(ElementData {
                variant: ElementVariant::Lazy { obj, built: false },
                nsmap,
                ..
            }) = record.element()
            else {
                return;
            };
            let start = record.position + head_span(nsmap, obj.attrib().len());
            (obj.clone(), nsmap.clone(), start)
        };
        let mut state = self.state_mut();
        if let Some(ElementData {
            variant: ElementVariant::Lazy { built, .. },
            ..
        }) = state.node_mut(id).element_mut()
        {
            *built = true;
        }
        push_content(&mut state, id, &obj, &nsmap, start, true);
        tracing::trace!(
            node = id.get(),
            children = state.node(id).children().len(),
            "materialized lazy element"
        );
    }

    /// Cached namespace nodes of an element, created on first access.
    pub(crate) fn namespace_ids(&self, id: NodeId) -> Rc<[NodeId]> {
        let nsmap = {
            let state = self.state();
            match state.node(id).element() {
                None => return Rc::new([]),
                Some(data) => match &data.namespace_nodes {
                    Some(ids) => return ids.clone(),
                    None => data.nsmap.clone(),
                },
            }
        };
        let mut state = self.state_mut();
        let mut position = state.node(id).position + 1;
        let mut ids = Vec::with_capacity(namespace_count(&nsmap));
        let bindings = std::iter::once(("xml", XML_URI)).chain(
            nsmap
                .iter()
                .filter(|(prefix, _)| prefix.as_str() != "xml")
                .map(|(p, u)| (p.as_str(), u.as_str())),
        );
        for (prefix, uri) in bindings {
            ids.push(state.push(NodeRecord {
                name: (!prefix.is_empty()).then(|| CompactString::from(prefix)),
                parent: Some(id),
                position,
                data: NodeData::Namespace {
                    uri: uri.to_string(),
                },
            }));
            position += 1;
        }
        let ids: Rc<[NodeId]> = ids.into();
        if let Some(data) = state.node_mut(id).element_mut() {
            data.namespace_nodes = Some(ids.clone());
        }
        ids
    }

    /// Cached attribute nodes of an element, created on first access.
    pub(crate) fn attribute_ids(&self, id: NodeId) -> Rc<[NodeId]> {
        let (start, entries) = {
            let state = self.state();
            let record = state.node(id);
            let Some(data) = record.element() else {
                return Rc::new([]);
            };
            if let Some(ids) = &data.attributes {
                return ids.clone();
            }
            let entries: Vec<AttributeEntry> = match &data.variant {
                ElementVariant::Etree(obj) | ElementVariant::Lazy { obj, .. } => obj
                    .attrib()
                    .iter()
                    .map(|(name, value)| AttributeEntry {
                        name: CompactString::from(name.as_str()),
                        value: AttributeValue::Text(value.clone()),
                        xsd_type: None,
                    })
                    .collect(),
                ElementVariant::Schema { obj, .. } => obj
                    .attributes()
                    .into_iter()
                    .map(|attr| AttributeEntry {
                        name: CompactString::from(attr.name()),
                        xsd_type: attr.xsd_type(),
                        value: AttributeValue::Schema(attr),
                    })
                    .collect(),
            };
            (record.position + namespace_count(&data.nsmap) + 1, entries)
        };
        let mut state = self.state_mut();
        let ids: Rc<[NodeId]> = entries
            .into_iter()
            .enumerate()
            .map(|(offset, entry)| {
                state.push(NodeRecord {
                    name: Some(entry.name),
                    parent: Some(id),
                    position: start + offset,
                    data: NodeData::Attribute {
                        value: entry.value,
                        xsd_type: entry.xsd_type,
                    },
                })
            })
            .collect();
        if let Some(data) = state.node_mut(id).element_mut() {
            data.attributes = Some(ids.clone());
        }
        ids
    }

    /// Child ids of a document or element, building lazy children if needed.
    pub(crate) fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.ensure_children(id);
        self.state().content(id).to_vec()
    }
}
