//! Interfaces required from a schema system.
//!
//! The crate never validates instances itself. Typing of node trees and tokens
//! goes through a [`SchemaProxy`] that answers name and type lookups; types,
//! elements and attributes are consumed through the traits below.

use crate::atomic::AtomicType;
use crate::error::Error;
use crate::nodes::XPathNode;
use crate::xdm::{AtomicValue, local_name};
use std::fmt;
use std::rc::Rc;

pub type XsdTypeRef = Rc<dyn XsdType>;
pub type XsdElementRef = Rc<dyn XsdElement>;
pub type XsdAttributeRef = Rc<dyn XsdAttribute>;
pub type SchemaRef = Rc<dyn SchemaProxy>;

pub trait XsdType: fmt::Debug {
    /// Type name in extended format, `None` for anonymous types.
    fn name(&self) -> Option<&str>;

    fn local_name(&self) -> Option<&str> {
        self.name().map(local_name)
    }

    fn is_simple(&self) -> bool;

    fn is_list(&self) -> bool {
        false
    }

    fn is_key(&self) -> bool {
        false
    }

    fn is_element_only(&self) -> bool {
        false
    }

    fn has_mixed_content(&self) -> bool {
        false
    }

    fn has_simple_content(&self) -> bool {
        false
    }

    /// The builtin type at the root of the derivation, `None` when it is the type itself.
    fn root_type(&self) -> Option<XsdTypeRef> {
        None
    }

    fn decode(&self, text: &str) -> Result<Vec<AtomicValue>, Error>;

    fn is_valid(&self, text: &str) -> bool {
        self.decode(text).is_ok()
    }

    fn is_valid_node(&self, node: &XPathNode) -> bool {
        self.is_valid(&node.string_value())
    }
}

pub trait XsdElement: fmt::Debug {
    fn name(&self) -> Option<&str>;

    fn xsd_type(&self) -> Option<XsdTypeRef>;

    fn is_matching(&self, name: &str, default_namespace: Option<&str>) -> bool {
        match self.name() {
            None => false,
            Some(own) if name.starts_with('{') => own == name,
            Some(own) => match default_namespace {
                Some(ns) if !ns.is_empty() => own == format!("{{{ns}}}{name}"),
                _ => own == name,
            },
        }
    }

    fn attributes(&self) -> Vec<XsdAttributeRef> {
        Vec::new()
    }

    /// Nested declarations. Recursive content models must hand out the same
    /// shared `Rc` on every call: schema trees detect cycles by identity.
    fn children(&self) -> Vec<XsdElementRef> {
        Vec::new()
    }
}

pub trait XsdAttribute: fmt::Debug {
    fn name(&self) -> &str;

    fn xsd_type(&self) -> Option<XsdTypeRef>;

    fn is_matching(&self, name: &str) -> bool {
        self.name() == name
    }
}

pub trait SchemaProxy: fmt::Debug {
    fn get_type(&self, name: &str) -> Option<XsdTypeRef>;

    fn get_attribute(&self, name: &str) -> Option<XsdAttributeRef>;

    fn get_element(&self, _name: &str) -> Option<XsdElementRef> {
        None
    }

    fn get_child_type(&self, name: &str, parent_type: Option<&XsdTypeRef>) -> Option<XsdTypeRef>;

    fn get_attribute_type(&self, name: &str, element_type: Option<&XsdTypeRef>)
    -> Option<XsdTypeRef>;

    fn get_primitive_type(&self, xsd_type: &XsdTypeRef) -> Option<XsdTypeRef>;

    fn is_fully_valid(&self) -> bool {
        true
    }

    fn is_assertion_based(&self) -> bool {
        false
    }

    /// Element declaration the root is validated against, if the proxy is bound to one.
    fn base_element(&self) -> Option<XsdElementRef> {
        None
    }
}

/// A builtin XSD atomic type decoding through the crate's lexical casts.
#[derive(Debug, Clone)]
pub struct BuiltinType {
    name: String,
    target: AtomicType,
    list: bool,
}

impl BuiltinType {
    pub fn new(name: impl Into<String>, target: AtomicType) -> Self {
        Self {
            name: name.into(),
            target,
            list: false,
        }
    }

    /// A list type whose items are whitespace separated values of `target`.
    pub fn list(name: impl Into<String>, target: AtomicType) -> Self {
        Self {
            list: true,
            ..Self::new(name, target)
        }
    }

    pub const fn target(&self) -> AtomicType {
        self.target
    }
}

impl XsdType for BuiltinType {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn is_simple(&self) -> bool {
        true
    }

    fn is_list(&self) -> bool {
        self.list
    }

    fn is_key(&self) -> bool {
        self.local_name() == Some("ID")
    }

    fn decode(&self, text: &str) -> Result<Vec<AtomicValue>, Error> {
        if self.list {
            text.split_whitespace()
                .map(|s| self.target.cast_str(s))
                .collect()
        } else {
            Ok(vec![self.target.cast_str(text)?])
        }
    }
}
