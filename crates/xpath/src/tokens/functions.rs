use crate::atomic::AtomicType;
use crate::context::{ParserContext, XPathContext};
use crate::error::Error;
use crate::sequence::{Item, Value};
use crate::token::{ArgumentSpec, Label, TokenCore, XPathToken, ordinal, select_on_copy};
use crate::xdm::AtomicValue;
use std::rc::Rc;

fn function_core(
    parser: &Rc<ParserContext>,
    name: &str,
    args: Vec<Box<dyn XPathToken>>,
    min: usize,
    max: usize,
) -> Result<TokenCore, Error> {
    let core = TokenCore::new(parser.clone(), name, Label::Function).with_children(args);
    if core.len() < min || core.len() > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(core.wrong_nargs(Some(&format!(
            "{name}() takes {expected} arguments, {} given",
            core.len()
        ))));
    }
    Ok(core)
}

/// `boolean($arg)`
#[derive(Debug)]
pub struct BooleanFunction {
    core: TokenCore,
}

impl BooleanFunction {
    pub fn new(parser: &Rc<ParserContext>, arg: Box<dyn XPathToken>) -> Result<Self, Error> {
        Ok(Self {
            core: function_core(parser, "boolean", vec![arg], 1, 1)?,
        })
    }
}

impl XPathToken for BooleanFunction {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let Some(arg) = self.core.child(0) else {
            return Err(self.core.wrong_nargs(Some("the 1st argument is missing")));
        };
        let items = select_on_copy(arg, context.as_deref())?;
        let value = self.core.boolean_value(&Value::Sequence(items))?;
        Ok(Value::Single(Item::Atomic(AtomicValue::Boolean(value))))
    }
}

/// `string($arg?)`
#[derive(Debug)]
pub struct StringFunction {
    core: TokenCore,
}

impl StringFunction {
    pub fn new(parser: &Rc<ParserContext>, arg: Option<Box<dyn XPathToken>>) -> Result<Self, Error> {
        Ok(Self {
            core: function_core(parser, "string", arg.into_iter().collect(), 0, 1)?,
        })
    }
}

impl XPathToken for StringFunction {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let item = self
            .core
            .get_argument(context.as_deref(), 0, &ArgumentSpec::context_default())?;
        let value = self.core.string_value(item.as_ref())?;
        Ok(Value::Single(Item::Atomic(AtomicValue::String(value))))
    }
}

/// `number($arg?)`
#[derive(Debug)]
pub struct NumberFunction {
    core: TokenCore,
}

impl NumberFunction {
    pub fn new(parser: &Rc<ParserContext>, arg: Option<Box<dyn XPathToken>>) -> Result<Self, Error> {
        Ok(Self {
            core: function_core(parser, "number", arg.into_iter().collect(), 0, 1)?,
        })
    }
}

impl XPathToken for NumberFunction {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let item = self
            .core
            .get_argument(context.as_deref(), 0, &ArgumentSpec::context_default())?;
        let value = self.core.number_value(item.as_ref());
        Ok(Value::Single(Item::Atomic(AtomicValue::Double(value))))
    }
}

/// `data($arg)`
#[derive(Debug)]
pub struct DataFunction {
    core: TokenCore,
}

impl DataFunction {
    pub fn new(parser: &Rc<ParserContext>, arg: Box<dyn XPathToken>) -> Result<Self, Error> {
        Ok(Self {
            core: function_core(parser, "data", vec![arg], 1, 1)?,
        })
    }
}

impl XPathToken for DataFunction {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let Some(arg) = self.core.child(0) else {
            return Err(self.core.wrong_nargs(Some(&format!(
                "the {} argument is missing",
                ordinal(1)
            ))));
        };
        let mut local = context.as_deref().cloned();
        let values = arg.atomization(local.as_mut())?;
        Ok(values.into_iter().map(Item::Atomic).collect())
    }
}

/// `adjust-dateTime-to-timezone`, `adjust-date-to-timezone` and
/// `adjust-time-to-timezone`, with an optional timezone argument.
#[derive(Debug)]
pub struct AdjustToTimezone {
    core: TokenCore,
    target: AtomicType,
}

impl AdjustToTimezone {
    fn new(
        parser: &Rc<ParserContext>,
        name: &str,
        target: AtomicType,
        args: Vec<Box<dyn XPathToken>>,
    ) -> Result<Self, Error> {
        Ok(Self {
            core: function_core(parser, name, args, 1, 2)?,
            target,
        })
    }

    pub fn date_time(parser: &Rc<ParserContext>, args: Vec<Box<dyn XPathToken>>) -> Result<Self, Error> {
        Self::new(parser, "adjust-dateTime-to-timezone", AtomicType::DateTime, args)
    }

    pub fn date(parser: &Rc<ParserContext>, args: Vec<Box<dyn XPathToken>>) -> Result<Self, Error> {
        Self::new(parser, "adjust-date-to-timezone", AtomicType::Date, args)
    }

    pub fn time(parser: &Rc<ParserContext>, args: Vec<Box<dyn XPathToken>>) -> Result<Self, Error> {
        Self::new(parser, "adjust-time-to-timezone", AtomicType::Time, args)
    }
}

impl XPathToken for AdjustToTimezone {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        Ok(self
            .core
            .adjust_datetime(context.as_deref(), self.target)?
            .map_or(Value::Empty, |v| Value::Single(Item::Atomic(v))))
    }
}
