//! Base contract of expression tokens.
//!
//! A token tree is built by a parser outside of this crate. Each token owns a
//! [`TokenCore`] with its symbol, label, child tokens and the parser context,
//! and implements [`XPathToken`]. Only one of `evaluate` and `select` needs to
//! be written by a token: the provided default of each is derived from the
//! other, so a token implementing neither recurses forever.
//!
//! The helpers shared by all tokens (argument fetching, atomization, boolean
//! and string values, comparison data, schema type binding, namespaces, date
//! adjustment and result shaping) are methods of [`TokenCore`], spread over
//! the submodules of this module. The few that need the token's own selection
//! are implemented on `dyn XPathToken`.

mod arguments;
mod comparison;
mod datetime;
mod errors;
mod namespaces;
mod results;
mod schema;
mod values;

pub use arguments::{ArgumentSpec, ordinal};
pub use comparison::{ComparisonOp, compare_atomic};
pub use results::{ResultItem, Results};

use crate::context::{ParserContext, XPathContext};
use crate::error::Error;
use crate::schema::XsdTypeRef;
use crate::sequence::{Item, Value};
use crate::xdm::AtomicValue;
use compact_str::CompactString;
use smallvec::SmallVec;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Lazy sequence of items produced by [`XPathToken::select`].
pub type Selection<'a> = Box<dyn Iterator<Item = Result<Item, Error>> + 'a>;

/// Grammatical class of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Symbol,
    Operator,
    Literal,
    Function,
    ConstructorFunction,
    Axis,
    KindTest,
    SequenceType,
    /// Ambiguous label, narrowed when the token is bound to a namespace.
    Multi(Vec<Label>),
}

impl Label {
    /// True if the label is `other` or is ambiguous and includes it.
    pub fn matches(&self, other: &Self) -> bool {
        match self {
            Self::Multi(labels) => labels.iter().any(|l| l.matches(other)),
            _ => self == other,
        }
    }

    pub const fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol => f.write_str("symbol"),
            Self::Operator => f.write_str("operator"),
            Self::Literal => f.write_str("literal"),
            Self::Function => f.write_str("function"),
            Self::ConstructorFunction => f.write_str("constructor function"),
            Self::Axis => f.write_str("axis"),
            Self::KindTest => f.write_str("kind test"),
            Self::SequenceType => f.write_str("sequence type"),
            Self::Multi(labels) => {
                for (i, label) in labels.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{label}")?;
                }
                Ok(())
            }
        }
    }
}

type XsdTypeCandidates = SmallVec<[XsdTypeRef; 1]>;

/// State shared by every token kind.
pub struct TokenCore {
    symbol: CompactString,
    label: RefCell<Label>,
    value: Option<AtomicValue>,
    children: Vec<Box<dyn XPathToken>>,
    parser: Rc<ParserContext>,
    /// Schema types observed per name while binding against schema nodes.
    xsd_types: RefCell<HashMap<String, XsdTypeCandidates>>,
}

impl TokenCore {
    pub fn new(parser: Rc<ParserContext>, symbol: &str, label: Label) -> Self {
        Self {
            symbol: CompactString::new(symbol),
            label: RefCell::new(label),
            value: None,
            children: Vec::new(),
            parser,
            xsd_types: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_value(mut self, value: impl Into<AtomicValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_child(mut self, child: Box<dyn XPathToken>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Box<dyn XPathToken>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn label(&self) -> Label {
        self.label.borrow().clone()
    }

    pub(crate) fn set_label(&self, label: Label) {
        *self.label.borrow_mut() = label;
    }

    pub const fn value(&self) -> Option<&AtomicValue> {
        self.value.as_ref()
    }

    pub fn parser(&self) -> &ParserContext {
        &self.parser
    }

    pub fn children(&self) -> &[Box<dyn XPathToken>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&dyn XPathToken> {
        self.children.get(index).map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Schema types bound to the token, by name.
    pub fn xsd_types(&self) -> Ref<'_, HashMap<String, XsdTypeCandidates>> {
        self.xsd_types.borrow()
    }

    /// Name carried by a name token or a function token.
    pub fn name(&self) -> Option<String> {
        match &self.value {
            Some(AtomicValue::String(s)) => Some(s.clone()),
            _ if self.symbol != "(name)" => Some(self.symbol.to_string()),
            _ => None,
        }
    }

    /// Expression text rebuilt from the token tree, used in diagnostics.
    pub fn source(&self) -> String {
        let operands: Vec<String> = self.children.iter().map(|c| c.core().source()).collect();
        let label = self.label();
        match (self.symbol.as_str(), operands.as_slice()) {
            ("(name)" | "*", _) => self.name().unwrap_or_default(),
            ("$", _) => format!("${}", self.name().unwrap_or_default()),
            ("/", []) => "/".to_string(),
            ("/", [right]) => format!("/{right}"),
            ("/", [left, right]) => format!("{left}/{right}"),
            (",", _) => format!("({})", operands.join(", ")),
            _ if label == Label::Literal => match &self.value {
                Some(AtomicValue::String(s)) => format!("'{}'", s.replace('\'', "''")),
                Some(AtomicValue::Boolean(b)) => format!("{b}()"),
                Some(value) => value.to_string(),
                None => self.symbol.to_string(),
            },
            (symbol, [left, right]) if label == Label::Operator => {
                format!("{left} {symbol} {right}")
            }
            (symbol, []) if !label.matches(&Label::Function) => symbol.to_string(),
            (symbol, _) => format!("{symbol}({})", operands.join(", ")),
        }
    }

    /// Names of the element tests reachable from this token, left to right.
    pub fn iter_leaf_elements(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_leaf_elements(&mut names);
        names
    }

    fn collect_leaf_elements(&self, names: &mut Vec<String>) {
        match self.symbol.as_str() {
            "(name)" | "*" => names.extend(self.name()),
            "/" | "//" => {
                if let Some(last) = self.children.last() {
                    last.core().collect_leaf_elements(names);
                }
            }
            "[" => {
                if let Some(first) = self.children.first() {
                    first.core().collect_leaf_elements(names);
                }
            }
            _ => {
                for child in &self.children {
                    child.core().collect_leaf_elements(names);
                }
            }
        }
    }
}

impl fmt::Debug for TokenCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TokenCore");
        s.field("symbol", &self.symbol.as_str())
            .field("label", &*self.label.borrow());
        if let Some(value) = &self.value {
            s.field("value", value);
        }
        if !self.children.is_empty() {
            s.field("children", &self.children);
        }
        s.finish()
    }
}

pub trait XPathToken: fmt::Debug {
    fn core(&self) -> &TokenCore;

    /// Evaluates the token into a value. Derived from [`Self::select`] by default.
    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let items = self.select(context).collect::<Result<Vec<_>, _>>()?;
        Ok(Value::from(items))
    }

    /// Yields the items of the token one by one, keeping `context.item` on the
    /// item just yielded. Derived from [`Self::evaluate`] by default.
    fn select<'a>(&'a self, mut context: Option<&'a mut XPathContext>) -> Selection<'a> {
        let value = match self.evaluate(context.as_deref_mut()) {
            Ok(value) => value,
            Err(err) => return Box::new(std::iter::once(Err(err))),
        };
        Box::new(value.into_items().into_iter().map(move |item| {
            if let Some(ctx) = context.as_deref_mut() {
                ctx.item = Some(item.clone());
            }
            Ok(item)
        }))
    }
}

/// Collects the selection of `token` on an independent copy of `context`.
pub(crate) fn select_on_copy(
    token: &dyn XPathToken,
    context: Option<&XPathContext>,
) -> Result<Vec<Item>, Error> {
    let mut local = context.cloned();
    token.select(local.as_mut()).collect()
}
