//! Foreign element tree adapter and a small in-memory implementation.
//!
//! The node tree model only needs a handful of capabilities from the tree it
//! wraps: a tag, optional text and tail text, attributes, ordered children and
//! optionally a namespace map. Comments and processing instructions live in the
//! children list like in ElementTree and are told apart by [`ForeignShape`].
//!
//! ```
//! use xpath_xdm::etree::{elem, comment};
//!
//! // <root id="r">Hello<child/><!--note-->tail</root>
//! let root = elem("root")
//!     .attr("id", "r")
//!     .text("Hello")
//!     .child(elem("child"))
//!     .child(comment("note").tail("tail"))
//!     .build();
//! assert_eq!(root.children().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Prefix to URI map. The default namespace is stored under the empty prefix.
pub type Namespaces = BTreeMap<String, String>;

pub type ElementRef = Rc<dyn ForeignElement>;

/// Shape of a foreign child value, decided once when a node wraps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignShape {
    Element,
    Comment,
    ProcessingInstruction,
}

pub trait ForeignElement: fmt::Debug {
    fn shape(&self) -> ForeignShape {
        ForeignShape::Element
    }
    /// Element tag in extended format, or the target of a processing instruction.
    fn tag(&self) -> &str;
    fn text(&self) -> Option<&str>;
    fn tail(&self) -> Option<&str>;
    fn attrib(&self) -> &[(String, String)];
    fn children(&self) -> &[ElementRef];
    fn nsmap(&self) -> Option<&Namespaces> {
        None
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attrib()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn len(&self) -> usize {
        self.children().len()
    }

    fn is_empty(&self) -> bool {
        self.children().is_empty()
    }
}

/// Identity key of a wrapped foreign value.
pub(crate) fn identity<T: ?Sized>(obj: &Rc<T>) -> *const () {
    Rc::as_ptr(obj).cast::<()>()
}

/// A foreign document: an ordered list of top-level values with at most one element.
#[derive(Debug, Default)]
pub struct Document {
    pub children: Vec<ElementRef>,
    pub uri: Option<String>,
}

impl Document {
    pub fn getroot(&self) -> Option<&ElementRef> {
        self.children
            .iter()
            .find(|c| c.shape() == ForeignShape::Element)
    }
}

#[derive(Debug)]
pub struct Element {
    shape: ForeignShape,
    tag: String,
    text: Option<String>,
    tail: Option<String>,
    attrib: Vec<(String, String)>,
    children: Vec<ElementRef>,
    nsmap: Option<Namespaces>,
}

impl ForeignElement for Element {
    fn shape(&self) -> ForeignShape {
        self.shape
    }
    fn tag(&self) -> &str {
        &self.tag
    }
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
    fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }
    fn attrib(&self) -> &[(String, String)] {
        &self.attrib
    }
    fn children(&self) -> &[ElementRef] {
        &self.children
    }
    fn nsmap(&self) -> Option<&Namespaces> {
        self.nsmap.as_ref()
    }
}

pub struct ElementBuilder {
    inner: Element,
}

impl ElementBuilder {
    fn new(shape: ForeignShape, tag: &str) -> Self {
        Self {
            inner: Element {
                shape,
                tag: tag.to_string(),
                text: None,
                tail: None,
                attrib: Vec::new(),
                children: Vec::new(),
                nsmap: None,
            },
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.inner.attrib.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.inner.text = Some(text.to_string());
        self
    }

    pub fn tail(mut self, tail: &str) -> Self {
        self.inner.tail = Some(tail.to_string());
        self
    }

    /// Declare a namespace on the element. Use an empty prefix for the default namespace.
    pub fn namespace(mut self, prefix: &str, uri: &str) -> Self {
        self.inner
            .nsmap
            .get_or_insert_with(Namespaces::new)
            .insert(prefix.to_string(), uri.to_string());
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.inner.children.push(child.build());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = ElementBuilder>,
    {
        self.inner
            .children
            .extend(children.into_iter().map(ElementBuilder::build));
        self
    }

    pub fn build(self) -> ElementRef {
        Rc::new(self.inner)
    }
}

pub fn elem(tag: &str) -> ElementBuilder {
    ElementBuilder::new(ForeignShape::Element, tag)
}

pub fn comment(text: &str) -> ElementBuilder {
    ElementBuilder::new(ForeignShape::Comment, "").text(text)
}

pub fn pi(target: &str, content: &str) -> ElementBuilder {
    ElementBuilder::new(ForeignShape::ProcessingInstruction, target).text(content)
}

pub struct DocumentBuilder {
    inner: Document,
}

impl DocumentBuilder {
    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.inner.children.push(child.build());
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.inner.uri = Some(uri.to_string());
        self
    }

    pub fn build(self) -> Rc<Document> {
        Rc::new(self.inner)
    }
}

pub fn document() -> DocumentBuilder {
    DocumentBuilder {
        inner: Document::default(),
    }
}

/// Concatenated text content of an element in document order, comments and
/// processing instructions excluded. With `normalize`, whitespace-only
/// segments are dropped.
pub fn iter_strings(elem: &dyn ForeignElement, normalize: bool) -> String {
    let mut out = String::new();
    let mut stack: Vec<(&dyn ForeignElement, bool)> = vec![(elem, true)];
    let keep = |s: &str| !normalize || !s.trim().is_empty();
    while let Some((e, is_element_visit)) = stack.pop() {
        if !is_element_visit {
            if let Some(tail) = e.tail().filter(|t| keep(*t)) {
                out.push_str(tail);
            }
            continue;
        }
        if e.shape() == ForeignShape::Element
            && let Some(text) = e.text().filter(|t| keep(*t))
        {
            out.push_str(text);
        }
        if e.shape() != ForeignShape::Element {
            continue;
        }
        for child in e.children().iter().rev() {
            stack.push((child.as_ref(), false));
            stack.push((child.as_ref(), true));
        }
    }
    out
}
