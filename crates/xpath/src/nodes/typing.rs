//! Schema typing of node trees and typed values.

use super::{NodeKind, XPathNode, get_expanded_name};
use crate::atomic::AtomicType;
use crate::consts::{
    XSD_ANY_SIMPLE_TYPE, XSD_ANY_TYPE, XSD_IDREF, XSD_IDREFS, XSD_UNTYPED, XSD_UNTYPED_ATOMIC,
    XML_ID, XSI_TYPE, is_special_type,
};
use crate::error::Error;
use crate::schema::{SchemaRef, XsdTypeRef};
use crate::xdm::AtomicValue;
use std::rc::Rc;

/// Representative values of a schema type, used where a schema node stands in
/// for instance data.
pub(crate) fn sample_values(xsd_type: Option<&XsdTypeRef>) -> Vec<AtomicValue> {
    let Some(xsd_type) = xsd_type else {
        return Vec::new();
    };
    if is_special_type(xsd_type.name()) || xsd_type.has_mixed_content() {
        return vec![AtomicValue::untyped("1")];
    }
    if !xsd_type.is_simple() && !xsd_type.has_simple_content() {
        return Vec::new();
    }
    let root = xsd_type.root_type();
    let name = root.as_ref().and_then(|r| r.name()).or_else(|| xsd_type.name());
    vec![name.and_then(AtomicType::from_name).map_or_else(
        || AtomicValue::untyped("1"),
        AtomicType::sample_value,
    )]
}

fn decode_with(xsd_type: &XsdTypeRef, text: &str) -> Result<Vec<AtomicValue>, Error> {
    if is_special_type(xsd_type.name()) {
        return Ok(vec![AtomicValue::untyped(text)]);
    }
    xsd_type.decode(text)
}

impl XPathNode {
    pub fn is_typed(&self) -> bool {
        self.xsd_type().is_some()
    }

    pub fn is_list(&self) -> bool {
        self.xsd_type().is_some_and(|t| t.is_list())
    }

    pub fn is_id(&self) -> bool {
        let key = self.xsd_type().is_some_and(|t| t.is_key());
        match self.kind() {
            NodeKind::Attribute => key || self.name().as_deref() == Some(XML_ID),
            NodeKind::Element => key,
            _ => false,
        }
    }

    pub fn is_idrefs(&self) -> bool {
        let Some(xsd_type) = self.xsd_type() else {
            return false;
        };
        let root = xsd_type.root_type();
        let name = root.as_ref().and_then(|r| r.name()).or_else(|| xsd_type.name());
        matches!(name, Some(XSD_IDREF | XSD_IDREFS))
    }

    /// The `type-name` accessor.
    pub fn type_name(&self) -> Option<String> {
        let xsd_name = self.xsd_type().and_then(|t| t.name().map(str::to_string));
        match self.kind() {
            NodeKind::Element => Some(xsd_name.unwrap_or_else(|| XSD_UNTYPED.to_string())),
            NodeKind::Attribute => Some(xsd_name.unwrap_or_else(|| XSD_UNTYPED_ATOMIC.to_string())),
            NodeKind::Text => Some(XSD_UNTYPED_ATOMIC.to_string()),
            _ => None,
        }
    }

    /// The `typed-value` accessor. Element-only content has no typed value and
    /// yields an empty list.
    pub fn typed_values(&self) -> Result<Vec<AtomicValue>, Error> {
        let xsd_type = self.xsd_type();
        match self.kind() {
            NodeKind::Element | NodeKind::Attribute if self.is_schema_node() => {
                Ok(sample_values(xsd_type.as_ref()))
            }
            NodeKind::Element => {
                let Some(xsd_type) = xsd_type else {
                    return Ok(vec![AtomicValue::untyped(self.string_value())]);
                };
                if is_special_type(xsd_type.name()) || xsd_type.has_mixed_content() {
                    return Ok(vec![AtomicValue::untyped(self.string_value())]);
                }
                if xsd_type.is_element_only() || self.nilled() == Some(true) {
                    return Ok(Vec::new());
                }
                let text = self.foreign().and_then(|obj| obj.text().map(str::to_string));
                decode_with(&xsd_type, text.as_deref().unwrap_or_default())
            }
            NodeKind::Attribute => {
                let text = self.value().unwrap_or_default();
                match xsd_type {
                    Some(xsd_type) => decode_with(&xsd_type, &text),
                    None => Ok(vec![AtomicValue::untyped(text)]),
                }
            }
            NodeKind::Document | NodeKind::Text => {
                Ok(vec![AtomicValue::untyped(self.string_value())])
            }
            NodeKind::Namespace | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                Ok(vec![AtomicValue::string(self.string_value())])
            }
        }
    }

    /// Annotates the tree with types from `schema`.
    ///
    /// Resolution problems on one element (an `xsi:type` that cannot be resolved,
    /// a child with no declared type) clear that element's subtree and the pass
    /// goes on with its siblings.
    pub fn apply_schema(&self, schema: &SchemaRef) {
        match self.kind() {
            NodeKind::Document => {
                for child in self.children().into_iter().filter(XPathNode::is_etree_element) {
                    child.apply_schema(schema);
                }
            }
            NodeKind::Element => {
                if self.is_etree_element() {
                    self.apply_element_schema(schema);
                }
            }
            _ => match self.parent() {
                Some(parent) => parent.apply_schema(schema),
                None if self.kind() == NodeKind::Attribute && !self.is_schema_node() => {
                    let name = self.name().unwrap_or_default();
                    let xsd_type = schema.get_attribute(&name).and_then(|a| a.xsd_type());
                    self.set_xsd_type(xsd_type);
                }
                None => {}
            },
        }
    }

    fn apply_element_schema(&self, schema: &SchemaRef) {
        if let Some(current) = self.tree().schema()
            && Rc::ptr_eq(&current, schema)
            && !schema.is_assertion_based()
        {
            return;
        }
        self.tree().state_mut().schema = Some(schema.clone());

        if !schema.is_fully_valid() {
            tracing::debug!("schema is not fully valid, typing subtree with any types");
            let element_type = schema.get_type(XSD_ANY_TYPE);
            let attribute_type = schema.get_type(XSD_ANY_SIMPLE_TYPE);
            for elem in self.iter_descendants(true).filter(XPathNode::is_etree_element) {
                elem.set_xsd_type(element_type.clone());
                for attr in elem.attributes().iter() {
                    attr.set_xsd_type(attribute_type.clone());
                }
            }
            return;
        }

        let mut xsd_types: Vec<Option<XsdTypeRef>>;
        let start: Vec<XPathNode>;
        if let Some(base) = schema.base_element() {
            let base_type = base.xsd_type();
            self.set_xsd_type(if schema.is_assertion_based() {
                schema.get_type(XSD_ANY_TYPE)
            } else {
                base_type.clone()
            });
            for attr in self.attributes().iter().filter(|a| !a.is_schema_node()) {
                let name = attr.name().unwrap_or_default();
                attr.set_xsd_type(schema.get_attribute_type(&name, base_type.as_ref()));
            }
            xsd_types = vec![base_type];
            start = self.children();
        } else {
            let mut root = self.clone();
            while let Some(parent) = root.parent().filter(XPathNode::is_etree_element) {
                root = parent;
            }
            xsd_types = vec![None];
            start = vec![root];
        }

        let mut frames = vec![start.into_iter()];
        while let Some(frame) = frames.last_mut() {
            let Some(elem) = frame.next() else {
                frames.pop();
                if !frames.is_empty() {
                    xsd_types.pop();
                }
                continue;
            };
            if !elem.is_etree_element() {
                continue;
            }
            let xsi_type = elem
                .foreign()
                .and_then(|obj| obj.get(XSI_TYPE).map(str::to_string));
            let xsd_type = match xsi_type {
                Some(xsi_type) => match get_expanded_name(xsi_type.trim(), &elem.nsmap()) {
                    Ok(type_name) => schema.get_type(&type_name),
                    Err(err) => {
                        tracing::debug!(%err, "unresolved xsi:type, clearing subtree types");
                        elem.clear_types();
                        continue;
                    }
                },
                None => {
                    let name = elem.name().unwrap_or_default();
                    schema.get_child_type(&name, xsd_types.last().and_then(Option::as_ref))
                }
            };
            let Some(xsd_type) = xsd_type else {
                elem.clear_types();
                continue;
            };

            elem.set_xsd_type(Some(xsd_type.clone()));
            for attr in elem.attributes().iter().filter(|a| !a.is_schema_node()) {
                let name = attr.name().unwrap_or_default();
                attr.set_xsd_type(schema.get_attribute_type(&name, Some(&xsd_type)));
            }
            if elem.foreign().is_some_and(|obj| !obj.is_empty()) {
                xsd_types.push(Some(xsd_type));
                frames.push(elem.children().into_iter());
            }
        }
    }

    /// Removes every type annotation of the subtree.
    pub fn clear_types(&self) {
        match self.kind() {
            NodeKind::Document => {
                for child in self.children().into_iter().filter(XPathNode::is_etree_element) {
                    child.clear_types();
                }
            }
            NodeKind::Element => {
                if !self.is_etree_element() {
                    return;
                }
                for elem in self.iter_descendants(true).filter(XPathNode::is_etree_element) {
                    elem.set_xsd_type(None);
                    for attr in elem.attributes().iter() {
                        attr.set_xsd_type(None);
                    }
                }
            }
            _ => match self.parent() {
                Some(parent) => parent.clear_types(),
                None => self.set_xsd_type(None),
            },
        }
    }
}
