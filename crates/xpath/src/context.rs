//! Static (parser) and dynamic (evaluation) contexts.

use crate::collation::CollationRegistry;
use crate::consts::{CODEPOINT_URI, ERR_NS, FNS, XML_URI, XSD_NS, XSI_NS};
use crate::etree::Namespaces;
use crate::nodes::XPathNode;
use crate::schema::SchemaRef;
use crate::sequence::{Item, Value};
use chrono::FixedOffset;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Language level of the parser that built a token tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum XPathVersion {
    V1_0,
    #[default]
    V2_0,
    V3_0,
    V3_1,
}

impl fmt::Display for XPathVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V1_0 => "1.0",
            Self::V2_0 => "2.0",
            Self::V3_0 => "3.0",
            Self::V3_1 => "3.1",
        })
    }
}

/// Parser level settings shared by every token of a tree.
#[derive(Debug, Clone)]
pub struct ParserContext {
    pub namespaces: Namespaces,
    /// XPath 1.0 compatibility mode.
    pub compatibility_mode: bool,
    pub version: XPathVersion,
    pub schema: Option<SchemaRef>,
    pub base_uri: Option<String>,
    /// Default namespace for element names.
    pub default_namespace: Option<String>,
}

impl Default for ParserContext {
    fn default() -> Self {
        let namespaces = [
            ("xml", XML_URI),
            ("xs", XSD_NS),
            ("xsi", XSI_NS),
            ("fn", FNS),
            ("err", ERR_NS),
        ]
        .into_iter()
        .map(|(p, u)| (p.to_string(), u.to_string()))
        .collect();
        Self {
            namespaces,
            compatibility_mode: false,
            version: XPathVersion::default(),
            schema: None,
            base_uri: None,
            default_namespace: None,
        }
    }
}

/// Builder for [`ParserContext`]. The `xml` prefix keeps its fixed binding.
#[derive(Debug, Default)]
pub struct ParserContextBuilder {
    ctx: ParserContext,
}

impl ParserContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let p = prefix.into();
        if p == "xml" {
            return self;
        }
        self.ctx.namespaces.insert(p, uri.into());
        self
    }

    pub fn with_compatibility_mode(mut self, enabled: bool) -> Self {
        self.ctx.compatibility_mode = enabled;
        self
    }

    pub fn with_version(mut self, version: XPathVersion) -> Self {
        self.ctx.version = version;
        self
    }

    pub fn with_schema(mut self, schema: SchemaRef) -> Self {
        self.ctx.schema = Some(schema);
        self
    }

    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.ctx.base_uri = Some(uri.into());
        self
    }

    pub fn with_default_namespace(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_namespace = Some(uri.into());
        self
    }

    pub fn build(self) -> ParserContext {
        self.ctx
    }
}

/// Dynamic evaluation context. Cloning gives an independent copy.
#[derive(Debug, Clone)]
pub struct XPathContext {
    pub root: Option<XPathNode>,
    /// The context item.
    pub item: Option<Item>,
    pub position: usize,
    pub size: usize,
    pub variables: HashMap<String, Value>,
    /// Implicit timezone.
    pub timezone: Option<FixedOffset>,
    pub default_collation: String,
    pub collations: Arc<CollationRegistry>,
    /// Set while evaluating against schema nodes for static typing.
    pub schema_context: bool,
}

impl Default for XPathContext {
    fn default() -> Self {
        Self {
            root: None,
            item: None,
            position: 1,
            size: 1,
            variables: HashMap::new(),
            timezone: None,
            default_collation: CODEPOINT_URI.to_string(),
            collations: Arc::new(CollationRegistry::default()),
            schema_context: false,
        }
    }
}

impl XPathContext {
    /// Context rooted at `root`, which is also the initial context item.
    pub fn new(root: XPathNode) -> Self {
        XPathContextBuilder::new().with_root(root).build()
    }

    /// Context item, falling back to the root node.
    pub fn current(&self) -> Option<Item> {
        self.item
            .clone()
            .or_else(|| self.root.clone().map(Item::Node))
    }
}

#[derive(Debug, Default)]
pub struct XPathContextBuilder {
    ctx: XPathContext,
}

impl XPathContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: XPathNode) -> Self {
        self.ctx.root = Some(root);
        self
    }

    pub fn with_item(mut self, item: impl Into<Item>) -> Self {
        self.ctx.item = Some(item.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ctx.variables.insert(name.into(), value.into());
        self
    }

    /// Implicit timezone as an offset in minutes east of UTC. Out of range offsets are ignored.
    pub fn with_timezone(mut self, offset_minutes: i32) -> Self {
        if let Some(tz) = FixedOffset::east_opt(offset_minutes * 60) {
            self.ctx.timezone = Some(tz);
        }
        self
    }

    pub fn with_default_collation(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_collation = uri.into();
        self
    }

    pub fn with_collations(mut self, reg: Arc<CollationRegistry>) -> Self {
        self.ctx.collations = reg;
        self
    }

    pub fn with_schema_context(mut self, enabled: bool) -> Self {
        self.ctx.schema_context = enabled;
        self
    }

    pub fn build(mut self) -> XPathContext {
        if self.ctx.item.is_none() {
            self.ctx.item = self.ctx.root.clone().map(Item::Node);
        }
        self.ctx
    }
}
