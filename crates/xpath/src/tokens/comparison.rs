use crate::collation::{CodepointCollation, Collation, scoped_collation};
use crate::context::{ParserContext, XPathContext};
use crate::error::Error;
use crate::sequence::{Item, Value};
use crate::token::{ComparisonOp, Label, TokenCore, XPathToken, compare_atomic};
use crate::xdm::AtomicValue;
use std::rc::Rc;
use std::sync::Arc;

/// General comparison (`=`, `!=`, `<`, `<=`, `>`, `>=`): true when any pair
/// of atomized operand items compares true.
#[derive(Debug)]
pub struct GeneralComparison {
    core: TokenCore,
    op: ComparisonOp,
}

impl GeneralComparison {
    pub fn new(
        parser: &Rc<ParserContext>,
        symbol: &str,
        left: Box<dyn XPathToken>,
        right: Box<dyn XPathToken>,
    ) -> Result<Self, Error> {
        let core = TokenCore::new(parser.clone(), symbol, Label::Operator)
            .with_child(left)
            .with_child(right);
        let op = match symbol {
            "=" | "!=" | "<" | "<=" | ">" | ">=" => ComparisonOp::from_symbol(symbol),
            _ => None,
        }
        .ok_or_else(|| core.wrong_syntax(Some(&format!("{symbol:?} is not a general comparison"))))?;
        Ok(Self { core, op })
    }

    pub const fn op(&self) -> ComparisonOp {
        self.op
    }

    /// Collation of an enclosing locale scope, else the default collation of the context.
    fn collation(&self, context: Option<&XPathContext>) -> Result<Arc<dyn Collation>, Error> {
        if let Some(collation) = scoped_collation() {
            return Ok(collation);
        }
        match context {
            Some(ctx) => ctx
                .collations
                .resolve(&ctx.default_collation)
                .map_err(|err| err.with_token(self.core.token_ref())),
            None => Ok(Arc::new(CodepointCollation)),
        }
    }
}

impl XPathToken for GeneralComparison {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let ctx = context.as_deref();
        let pairs = self.core.get_comparison_data(ctx)?;
        let collation = self.collation(ctx)?;
        let timezone = ctx.and_then(|ctx| ctx.timezone);
        let mut result = false;
        for (a, b) in &pairs {
            if compare_atomic(a, b, self.op, collation.as_ref(), timezone)
                .map_err(|err| err.with_token(self.core.token_ref()))?
            {
                result = true;
                break;
            }
        }
        Ok(Value::Single(Item::Atomic(AtomicValue::Boolean(result))))
    }
}
