//! Items and values produced by token evaluation.

use crate::nodes::{NodeKind, XPathNode};
use crate::xdm::AtomicValue;

/// A node paired with the values decoded from it by a schema type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedNode {
    pub node: XPathNode,
    pub values: Vec<AtomicValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Node(XPathNode),
    Atomic(AtomicValue),
    Typed(TypedNode),
}

impl Item {
    /// The node of a node or typed node item.
    pub const fn as_node(&self) -> Option<&XPathNode> {
        match self {
            Self::Node(node) | Self::Typed(TypedNode { node, .. }) => Some(node),
            Self::Atomic(_) => None,
        }
    }

    pub const fn as_atomic(&self) -> Option<&AtomicValue> {
        match self {
            Self::Atomic(value) => Some(value),
            _ => None,
        }
    }

    pub fn node_kind(&self) -> Option<NodeKind> {
        self.as_node().map(XPathNode::kind)
    }

    pub fn is_node(&self) -> bool {
        self.as_node().is_some()
    }
}

impl From<XPathNode> for Item {
    fn from(node: XPathNode) -> Self {
        Self::Node(node)
    }
}

impl From<AtomicValue> for Item {
    fn from(value: AtomicValue) -> Self {
        Self::Atomic(value)
    }
}

impl From<TypedNode> for Item {
    fn from(typed: TypedNode) -> Self {
        Self::Typed(typed)
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Self::Atomic(AtomicValue::Boolean(b))
    }
}

impl From<i64> for Item {
    fn from(i: i64) -> Self {
        Self::Atomic(AtomicValue::Integer(i))
    }
}

impl From<f64> for Item {
    fn from(d: f64) -> Self {
        Self::Atomic(AtomicValue::Double(d))
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Self::Atomic(AtomicValue::string(s))
    }
}

/// Result of evaluating a token.
///
/// `Single` is a bare item, `Sequence` a list of items even when it holds
/// only one; the two differ for the effective boolean value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Single(Item),
    Sequence(Vec<Item>),
}

impl Value {
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Sequence(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<&Item> {
        match self {
            Self::Empty => None,
            Self::Single(item) => Some(item),
            Self::Sequence(items) => items.first(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        match self {
            Self::Empty => [].iter(),
            Self::Single(item) => std::slice::from_ref(item).iter(),
            Self::Sequence(items) => items.iter(),
        }
    }

    pub fn into_items(self) -> Vec<Item> {
        match self {
            Self::Empty => Vec::new(),
            Self::Single(item) => vec![item],
            Self::Sequence(items) => items,
        }
    }
}

impl From<Vec<Item>> for Value {
    fn from(items: Vec<Item>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Sequence(items)
        }
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Self::Single(item)
    }
}

impl From<AtomicValue> for Value {
    fn from(value: AtomicValue) -> Self {
        Self::Single(Item::Atomic(value))
    }
}

impl From<XPathNode> for Value {
    fn from(node: XPathNode) -> Self {
        Self::Single(Item::Node(node))
    }
}

impl FromIterator<Item> for Value {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
