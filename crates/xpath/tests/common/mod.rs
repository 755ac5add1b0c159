//! Shared fixtures: sample trees and an in-memory schema proxy.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use xpath_xdm::atomic::AtomicType;
use xpath_xdm::consts::XSD_NS;
use xpath_xdm::context::ParserContext;
use xpath_xdm::error::Error;
use xpath_xdm::etree::{ElementRef, elem};
use xpath_xdm::schema::{
    BuiltinType, SchemaProxy, SchemaRef, XsdAttribute, XsdAttributeRef, XsdElement, XsdElementRef,
    XsdType, XsdTypeRef,
};
use xpath_xdm::token::XPathToken;
use xpath_xdm::tokens::{Literal, SequenceExpr};
use xpath_xdm::xdm::AtomicValue;

pub fn xsd(local: &str) -> String {
    format!("{{{XSD_NS}}}{local}")
}

pub fn builtin(local: &str, target: AtomicType) -> XsdTypeRef {
    Rc::new(BuiltinType::new(xsd(local), target))
}

/// `<root><a>1</a><a>2</a></root>`
pub fn two_a() -> ElementRef {
    elem("root")
        .child(elem("a").text("1"))
        .child(elem("a").text("2"))
        .build()
}

/// A complex type with element-only content and attribute declarations.
#[derive(Debug)]
pub struct ComplexType {
    pub name: Option<String>,
    pub mixed: bool,
}

impl XsdType for ComplexType {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn is_simple(&self) -> bool {
        false
    }

    fn is_element_only(&self) -> bool {
        !self.mixed
    }

    fn has_mixed_content(&self) -> bool {
        self.mixed
    }

    fn decode(&self, _text: &str) -> Result<Vec<AtomicValue>, Error> {
        Ok(Vec::new())
    }
}

pub fn complex(name: &str) -> XsdTypeRef {
    Rc::new(ComplexType {
        name: Some(name.to_string()),
        mixed: false,
    })
}

#[derive(Debug)]
pub struct MockAttribute {
    pub name: String,
    pub xsd_type: Option<XsdTypeRef>,
}

impl XsdAttribute for MockAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn xsd_type(&self) -> Option<XsdTypeRef> {
        self.xsd_type.clone()
    }
}

#[derive(Debug)]
pub struct MockElement {
    pub name: String,
    pub xsd_type: Option<XsdTypeRef>,
    pub attributes: Vec<XsdAttributeRef>,
    pub children: RefCell<Vec<XsdElementRef>>,
}

impl MockElement {
    pub fn new(name: &str, xsd_type: Option<XsdTypeRef>) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            xsd_type,
            attributes: Vec::new(),
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn with_attribute(name: &str, xsd_type: Option<XsdTypeRef>, attr: (&str, XsdTypeRef)) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            xsd_type,
            attributes: vec![Rc::new(MockAttribute {
                name: attr.0.to_string(),
                xsd_type: Some(attr.1),
            })],
            children: RefCell::new(Vec::new()),
        })
    }

    pub fn add_child(&self, child: XsdElementRef) {
        self.children.borrow_mut().push(child);
    }
}

impl XsdElement for MockElement {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn xsd_type(&self) -> Option<XsdTypeRef> {
        self.xsd_type.clone()
    }

    fn attributes(&self) -> Vec<XsdAttributeRef> {
        self.attributes.clone()
    }

    fn children(&self) -> Vec<XsdElementRef> {
        self.children.borrow().clone()
    }
}

/// Schema proxy answering from lookup tables.
#[derive(Debug, Default)]
pub struct MockSchema {
    pub types: HashMap<String, XsdTypeRef>,
    /// Element name to type, whatever the parent.
    pub elements: HashMap<String, XsdTypeRef>,
    /// Attribute name to type, whatever the element.
    pub attributes: HashMap<String, XsdTypeRef>,
    pub not_fully_valid: bool,
}

impl MockSchema {
    /// `root` (complex) with `a` children of type `xs:integer` and an `id`
    /// attribute of type `xs:ID`.
    pub fn integers() -> Rc<Self> {
        let mut schema = Self::default();
        let root_type = complex("rootType");
        let integer = builtin("integer", AtomicType::Integer);
        let id = Rc::new(BuiltinType::new(xsd("ID"), AtomicType::String)) as XsdTypeRef;
        let date = builtin("date", AtomicType::Date);
        schema.types.insert("rootType".to_string(), root_type.clone());
        schema.types.insert(xsd("integer"), integer.clone());
        schema.types.insert(xsd("date"), date.clone());
        schema.types.insert(xsd("anyType"), complex(&xsd("anyType")));
        schema.types.insert(
            xsd("anySimpleType"),
            Rc::new(BuiltinType::new(xsd("anySimpleType"), AtomicType::UntypedAtomic)),
        );
        schema.elements.insert("root".to_string(), root_type);
        schema.elements.insert("a".to_string(), integer);
        schema.elements.insert("d".to_string(), date);
        schema.attributes.insert("id".to_string(), id);
        Rc::new(schema)
    }

    pub fn as_ref(self: &Rc<Self>) -> SchemaRef {
        self.clone()
    }
}

impl SchemaProxy for MockSchema {
    fn get_type(&self, name: &str) -> Option<XsdTypeRef> {
        self.types.get(name).cloned()
    }

    fn get_attribute(&self, name: &str) -> Option<XsdAttributeRef> {
        let xsd_type = self.attributes.get(name)?.clone();
        Some(Rc::new(MockAttribute {
            name: name.to_string(),
            xsd_type: Some(xsd_type),
        }))
    }

    fn get_child_type(&self, name: &str, _parent_type: Option<&XsdTypeRef>) -> Option<XsdTypeRef> {
        self.elements.get(name).cloned()
    }

    fn get_attribute_type(&self, name: &str, _element_type: Option<&XsdTypeRef>) -> Option<XsdTypeRef> {
        self.attributes.get(name).cloned()
    }

    fn get_primitive_type(&self, xsd_type: &XsdTypeRef) -> Option<XsdTypeRef> {
        Some(xsd_type.clone())
    }

    fn is_fully_valid(&self) -> bool {
        !self.not_fully_valid
    }
}

pub fn parser() -> Rc<ParserContext> {
    Rc::new(ParserContext::default())
}

pub fn lit(parser: &Rc<ParserContext>, value: impl Into<AtomicValue>) -> Box<dyn XPathToken> {
    Box::new(Literal::new(parser, value))
}

pub fn seq(parser: &Rc<ParserContext>, operands: Vec<Box<dyn XPathToken>>) -> Box<dyn XPathToken> {
    Box::new(SequenceExpr::new(parser, operands))
}
