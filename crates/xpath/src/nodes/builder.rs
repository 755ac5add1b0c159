//! Node tree builders.

use super::XPathNode;
use super::element::{
    effective_nsmap, element_record, head_span, leaf_record, schema_element_record, text_record,
};
use super::tree::{NodeData, NodeId, NodeRecord, NodeTree, TreeState};
use crate::etree::{Document, ElementRef, ForeignShape, Namespaces, identity};
use crate::schema::XsdElementRef;
use std::collections::HashMap;
use std::rc::Rc;

/// Options shared by all builders.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Fallback namespace map for elements that carry none.
    pub namespaces: Namespaces,
    pub uri: Option<String>,
}

impl TreeOptions {
    pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// Wraps a foreign element, building every node of the subtree.
pub fn build_node_tree(root: &ElementRef, options: &TreeOptions) -> XPathNode {
    build_element_tree(root, options, false)
}

/// Wraps a foreign element; children are built on first access.
pub fn build_lazy_node_tree(root: &ElementRef, options: &TreeOptions) -> XPathNode {
    build_element_tree(root, options, true)
}

fn build_element_tree(root: &ElementRef, options: &TreeOptions, lazy: bool) -> XPathNode {
    let mut state = TreeState::new(options.namespaces.clone(), options.uri.clone());
    let nsmap = effective_nsmap(root, &state.namespaces);
    let start = 1 + head_span(&nsmap, root.attrib().len());
    let root_id = state.push(element_record(root, None, 1, nsmap, lazy));
    state.root = root_id;
    if !lazy {
        build_eager(&mut state, root_id, root, start);
    }
    tracing::debug!(nodes = state.nodes.len(), lazy, "built node tree");
    NodeTree::from_state(state).node(root_id)
}

/// Wraps a foreign document with its top-level elements, comments and
/// processing instructions.
pub fn build_document_node_tree(document: &Rc<Document>, options: &TreeOptions) -> XPathNode {
    let uri = options.uri.clone().or_else(|| document.uri.clone());
    let mut state = TreeState::new(options.namespaces.clone(), uri);
    let doc_id = state.push(NodeRecord {
        name: None,
        parent: None,
        position: 1,
        data: NodeData::Document {
            obj: document.clone(),
            children: Vec::new(),
        },
    });
    state.root = doc_id;
    let mut position = 2;
    for child in &document.children {
        if child.shape() == ForeignShape::Element {
            let nsmap = effective_nsmap(child, &state.namespaces);
            let head = head_span(&nsmap, child.attrib().len());
            let id = state.push(element_record(child, Some(doc_id), position, nsmap, false));
            position = build_eager(&mut state, id, child, position + head);
        } else {
            state.push(leaf_record(child, Some(doc_id), position));
            position += 1;
        }
        if let Some(tail) = child.tail() {
            state.push(text_record(tail, Some(doc_id), position));
            position += 1;
        }
    }
    tracing::debug!(nodes = state.nodes.len(), "built document node tree");
    NodeTree::from_state(state).node(doc_id)
}

/// Builds the content of an element whose own node already exists, `position`
/// being the first position after its attributes. Returns the next free position.
fn build_eager(state: &mut TreeState, root_id: NodeId, root: &ElementRef, position: usize) -> usize {
    let root_ns = match state.node(root_id).element() {
        Some(data) => data.nsmap.clone(),
        None => state.namespaces.clone(),
    };
    let mut position = text_first(state, root_id, root, position);
    let mut stack: Vec<(NodeId, ElementRef, Rc<Namespaces>, usize)> =
        vec![(root_id, root.clone(), root_ns, 0)];

    while let Some(frame) = stack.last_mut() {
        let parent = frame.0;
        let Some(child) = frame.1.children().get(frame.3).cloned() else {
            if let Some((done, obj, _, _)) = stack.pop()
                && done != root_id
                && let Some(tail) = obj.tail()
                && let Some(up) = state.node(done).parent
            {
                state.push(text_record(tail, Some(up), position));
                position += 1;
            }
            continue;
        };
        frame.3 += 1;
        let parent_ns = frame.2.clone();

        if child.shape() == ForeignShape::Element {
            let nsmap = effective_nsmap(&child, &parent_ns);
            let head = head_span(&nsmap, child.attrib().len());
            let id = state.push(element_record(&child, Some(parent), position, nsmap.clone(), false));
            position = text_first(state, id, &child, position + head);
            stack.push((id, child, nsmap, 0));
        } else {
            state.push(leaf_record(&child, Some(parent), position));
            position += 1;
            if let Some(tail) = child.tail() {
                state.push(text_record(tail, Some(parent), position));
                position += 1;
            }
        }
    }
    position
}

fn text_first(state: &mut TreeState, id: NodeId, obj: &ElementRef, position: usize) -> usize {
    match obj.text() {
        Some(text) => {
            state.push(text_record(text, Some(id), position));
            position + 1
        }
        None => position,
    }
}

/// Wraps a schema element declaration and its nested declarations.
///
/// A declaration met again below itself (or anywhere else in the tree) gets a
/// node pointing at the first one instead of a second expansion.
pub fn build_schema_node_tree(root: &XsdElementRef, options: &TreeOptions) -> XPathNode {
    let mut state = TreeState::new(options.namespaces.clone(), options.uri.clone());
    let nsmap = state.namespaces.clone();
    let root_id = state.push(schema_element_record(root, None, 1, nsmap.clone(), None));
    state.root = root_id;
    let mut position = 1 + head_span(&nsmap, root.attributes().len());

    let mut seen: HashMap<*const (), NodeId> = HashMap::from([(identity(root), root_id)]);
    let mut stack: Vec<(NodeId, Vec<XsdElementRef>, usize)> = vec![(root_id, root.children(), 0)];
    while let Some(frame) = stack.last_mut() {
        let parent = frame.0;
        let Some(child) = frame.1.get(frame.2).cloned() else {
            stack.pop();
            continue;
        };
        frame.2 += 1;
        let head = head_span(&nsmap, child.attributes().len());
        if let Some(&canonical) = seen.get(&identity(&child)) {
            state.push(schema_element_record(&child, Some(parent), position, nsmap.clone(), Some(canonical)));
            position += head;
            continue;
        }
        let id = state.push(schema_element_record(&child, Some(parent), position, nsmap.clone(), None));
        seen.insert(identity(&child), id);
        position += head;
        stack.push((id, child.children(), 0));
    }
    tracing::debug!(nodes = state.nodes.len(), "built schema node tree");
    NodeTree::from_state(state).node(root_id)
}
