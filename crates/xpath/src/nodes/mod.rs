//! XDM node tree over a foreign element tree.
//!
//! Every connected tree is an arena ([`NodeTree`]) shared by all of its nodes.
//! An [`XPathNode`] is a cheap `(tree, index)` handle; parents are indices into
//! the same arena. Positions are reserved when a node is created so document
//! order stays a total order even for lazily built subtrees and for namespace
//! and attribute nodes created on first access.

mod builder;
mod document;
mod element;
mod iter;
mod names;
mod node;
mod tree;
mod typing;

pub use builder::{
    TreeOptions, build_document_node_tree, build_lazy_node_tree, build_node_tree,
    build_schema_node_tree,
};
pub use iter::NodeIter;
pub use names::{get_expanded_name, match_wildcard};
pub use node::{NodeKind, NodeList, XPathNode};
pub use tree::{NodeId, NodeTree};
