//! Schema types bound to tokens while evaluating against schema nodes.

use super::TokenCore;
use crate::atomic::AtomicType;
use crate::consts::is_special_type;
use crate::error::Error;
use crate::nodes::{NodeKind, XPathNode};
use crate::schema::XsdTypeRef;
use crate::sequence::{Item, TypedNode};
use crate::xdm::AtomicValue;
use std::rc::Rc;

impl TokenCore {
    /// Records the type of a schema element or attribute under its name.
    /// A name matched by several declarations keeps every distinct type.
    pub fn add_xsd_type(&self, node: &XPathNode) {
        let (Some(name), Some(xsd_type)) = (node.name(), node.xsd_type()) else {
            return;
        };
        let mut xsd_types = self.xsd_types.borrow_mut();
        let candidates = xsd_types.entry(name).or_default();
        if !candidates.iter().any(|t| Rc::ptr_eq(t, &xsd_type)) {
            candidates.push(xsd_type);
        }
    }

    /// First type bound to `name`.
    pub fn get_xsd_type_by_name(&self, name: &str) -> Option<XsdTypeRef> {
        self.xsd_types().get(name).and_then(|c| c.first().cloned())
    }

    /// Type bound to the name of `item`. With several candidates the first one
    /// the item is valid for wins, else the first one.
    pub fn get_xsd_type(&self, item: &Item) -> Option<XsdTypeRef> {
        let xsd_types = self.xsd_types();
        if xsd_types.is_empty() {
            return None;
        }
        let name = match item {
            Item::Atomic(AtomicValue::String(name)) => name.clone(),
            item => item.as_node().and_then(XPathNode::name)?,
        };
        let candidates = xsd_types.get(&name)?;
        if candidates.len() > 1
            && let Some(node) = item.as_node()
        {
            let valid = match node.kind() {
                NodeKind::Attribute => {
                    let value = node.value().unwrap_or_default();
                    candidates.iter().find(|t| t.is_valid(&value))
                }
                NodeKind::Element => {
                    let text = node
                        .foreign()
                        .and_then(|obj| obj.text().map(str::to_string))
                        .unwrap_or_default();
                    candidates.iter().find(|t| {
                        if t.is_simple() {
                            t.is_valid(&text)
                        } else {
                            t.is_valid_node(node)
                        }
                    })
                }
                _ => None,
            };
            if let Some(xsd_type) = valid {
                return Some(xsd_type.clone());
            }
        }
        candidates.first().cloned()
    }

    /// Binds the type of a schema node matching `name` and returns the node
    /// typed with a sample value of its type.
    pub fn match_xsd_type(&self, node: &XPathNode, name: &str) -> Option<Item> {
        if !node.is_schema_node() || !node.match_name(name, self.parser().default_namespace.as_deref()) {
            return None;
        }
        let xsd_type = node.xsd_type()?;
        self.add_xsd_type(node);
        let value = match xsd_type.name().and_then(AtomicType::from_name) {
            Some(builtin) => builtin.sample_value(),
            None => self
                .parser()
                .schema
                .as_ref()
                .and_then(|schema| schema.get_primitive_type(&xsd_type))
                .as_ref()
                .and_then(|p| p.name())
                .and_then(AtomicType::from_name)
                .map_or_else(|| AtomicValue::untyped("1"), AtomicType::sample_value),
        };
        Some(Item::Typed(TypedNode {
            node: node.clone(),
            values: vec![value],
        }))
    }

    /// Wraps a node in its typed form when the token has a type bound to its name.
    pub fn get_typed_node(&self, item: Item) -> Result<Item, Error> {
        let Item::Node(node) = &item else {
            return Ok(item);
        };
        let Some(xsd_type) = self.get_xsd_type(&item) else {
            return Ok(item);
        };
        let values = match node.kind() {
            NodeKind::Attribute => decode_text(&xsd_type, &node.value().unwrap_or_default()),
            NodeKind::Element if xsd_type.is_simple() || xsd_type.has_simple_content() => {
                let text = node
                    .foreign()
                    .and_then(|obj| obj.text().map(str::to_string))
                    .unwrap_or_default();
                decode_text(&xsd_type, &text)
            }
            NodeKind::Element if xsd_type.has_mixed_content() => {
                Ok(vec![AtomicValue::untyped(node.string_value())])
            }
            NodeKind::Element => Ok(Vec::new()),
            _ => return Ok(item),
        }
        .map_err(|err| {
            self.wrong_sequence_type(Some(&format!(
                "{} node {:?} does not match its schema type: {}",
                node.kind(),
                node.name().unwrap_or_default(),
                err.message
            )))
        })?;
        Ok(Item::Typed(TypedNode {
            node: node.clone(),
            values,
        }))
    }
}

fn decode_text(xsd_type: &XsdTypeRef, text: &str) -> Result<Vec<AtomicValue>, Error> {
    if is_special_type(xsd_type.name()) {
        return Ok(vec![AtomicValue::untyped(text)]);
    }
    xsd_type.decode(text)
}
