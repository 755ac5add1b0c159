pub mod atomic;
pub mod collation;
pub mod consts;
pub mod context;
pub mod error;
pub mod etree;
pub mod nodes;
pub mod schema;
pub mod sequence;
pub mod temporal;
pub mod token;
pub mod tokens;
pub mod xdm;

pub use atomic::AtomicType;
pub use collation::{CollationGuard, CollationRegistry, use_collation};
pub use context::{ParserContext, ParserContextBuilder, XPathContext, XPathContextBuilder, XPathVersion};
pub use error::{Error, ErrorCode, ErrorKind};
pub use etree::{Document, ElementRef, ForeignElement, Namespaces};
pub use nodes::{
    NodeKind, NodeTree, TreeOptions, XPathNode, build_document_node_tree, build_lazy_node_tree,
    build_node_tree, build_schema_node_tree,
};
pub use schema::{SchemaProxy, SchemaRef, XsdAttribute, XsdElement, XsdType};
pub use sequence::{Item, TypedNode, Value};
pub use token::{ArgumentSpec, Label, ResultItem, Results, TokenCore, XPathToken};
pub use xdm::{AtomicValue, ExpandedName, QName};
