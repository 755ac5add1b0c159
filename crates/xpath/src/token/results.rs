//! Shaping of evaluation results for callers.

use super::{Label, XPathToken};
use crate::context::XPathContext;
use crate::error::Error;
use crate::nodes::{NodeKind, XPathNode};
use crate::sequence::{Item, TypedNode};
use crate::xdm::AtomicValue;

#[derive(Debug, Clone, PartialEq)]
pub enum ResultItem {
    Atomic(AtomicValue),
    Node(XPathNode),
    Attribute { name: String, value: String },
    Namespace { prefix: String, uri: String },
}

impl ResultItem {
    fn from_item(item: Item) -> Self {
        let node = match item {
            Item::Atomic(value) => return Self::Atomic(value),
            Item::Node(node) | Item::Typed(TypedNode { node, .. }) => node,
        };
        match node.kind() {
            NodeKind::Attribute => Self::Attribute {
                name: node.name().unwrap_or_default(),
                value: node.value().unwrap_or_default(),
            },
            NodeKind::Namespace => Self::Namespace {
                prefix: node.name().unwrap_or_default(),
                uri: node.value().unwrap_or_default(),
            },
            NodeKind::Text => Self::Atomic(AtomicValue::String(node.string_value())),
            _ => Self::Node(node),
        }
    }
}

/// Results of an evaluation: a bare scalar or a materialized sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Results {
    Scalar(AtomicValue),
    Sequence(Vec<ResultItem>),
}

impl Results {
    pub fn as_scalar(&self) -> Option<&AtomicValue> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Sequence(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Sequence(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl dyn XPathToken + '_ {
    /// Selected items converted for callers: attributes and namespaces as name
    /// and value pairs, text nodes as strings.
    pub fn select_results(&self, context: Option<&mut XPathContext>) -> Result<Vec<ResultItem>, Error> {
        self.select(context)
            .map(|item| item.map(ResultItem::from_item))
            .collect()
    }

    /// Results with singleton booleans and numbers collapsed to scalars.
    /// A singleton string collapses only for functions and literals.
    pub fn get_results(&self, context: Option<&mut XPathContext>) -> Result<Results, Error> {
        let mut items = self.select_results(context)?;
        if let [ResultItem::Atomic(value)] = items.as_slice() {
            let label = self.core().label();
            let scalar = matches!(value, AtomicValue::Boolean(_))
                || value.is_numeric()
                || (value.is_string_like()
                    && (label.matches(&Label::Function) || label == Label::Literal));
            if scalar && let Some(ResultItem::Atomic(value)) = items.pop() {
                return Ok(Results::Scalar(value));
            }
        }
        Ok(Results::Sequence(items))
    }
}
