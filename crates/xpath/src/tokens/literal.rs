use crate::context::{ParserContext, XPathContext};
use crate::error::Error;
use crate::sequence::{Item, Value};
use crate::token::{Label, TokenCore, XPathToken};
use crate::xdm::AtomicValue;
use std::rc::Rc;

#[derive(Debug)]
pub struct Literal {
    core: TokenCore,
}

impl Literal {
    pub fn new(parser: &Rc<ParserContext>, value: impl Into<AtomicValue>) -> Self {
        let value = value.into();
        let symbol = match &value {
            AtomicValue::String(_) => "(string)",
            AtomicValue::Integer(_) => "(integer)",
            AtomicValue::Decimal(_) => "(decimal)",
            AtomicValue::Double(_) | AtomicValue::Float(_) => "(float)",
            _ => "(literal)",
        };
        Self {
            core: TokenCore::new(parser.clone(), symbol, Label::Literal).with_value(value),
        }
    }
}

impl XPathToken for Literal {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, _context: Option<&mut XPathContext>) -> Result<Value, Error> {
        Ok(self
            .core
            .value()
            .cloned()
            .map_or(Value::Empty, |v| Value::Single(Item::Atomic(v))))
    }
}

/// The context item expression `.`.
#[derive(Debug)]
pub struct ContextItem {
    core: TokenCore,
}

impl ContextItem {
    pub fn new(parser: &Rc<ParserContext>) -> Self {
        Self {
            core: TokenCore::new(parser.clone(), ".", Label::Symbol),
        }
    }
}

impl XPathToken for ContextItem {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let ctx = context.ok_or_else(|| self.core.missing_context(None))?;
        let item = ctx
            .current()
            .ok_or_else(|| self.core.missing_context(Some("context item is undefined")))?;
        Ok(Value::Single(self.core.get_typed_node(item)?))
    }
}

/// Variable reference `$name`.
#[derive(Debug)]
pub struct VariableRef {
    core: TokenCore,
}

impl VariableRef {
    pub fn new(parser: &Rc<ParserContext>, name: &str) -> Self {
        Self {
            core: TokenCore::new(parser.clone(), "$", Label::Operator).with_value(name),
        }
    }
}

impl XPathToken for VariableRef {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let ctx = context.ok_or_else(|| self.core.missing_context(None))?;
        let name = self.core.name().unwrap_or_default();
        ctx.variables
            .get(&name)
            .cloned()
            .ok_or_else(|| self.core.missing_name(Some(&format!("unknown variable ${name}"))))
    }
}
