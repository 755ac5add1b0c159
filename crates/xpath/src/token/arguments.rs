//! Argument fetching and coercion.

use super::TokenCore;
use crate::atomic::AtomicType;
use crate::context::{XPathContext, XPathVersion};
use crate::error::Error;
use crate::sequence::Item;
use crate::xdm::AtomicValue;

/// How a missing, empty or mistyped argument is handled by [`TokenCore::get_argument`].
#[derive(Debug, Clone, Default)]
pub struct ArgumentSpec {
    pub required: bool,
    /// A missing argument defaults to the context item.
    pub default_to_context: bool,
    pub default: Option<Item>,
    pub target: Option<AtomicType>,
}

impl ArgumentSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn context_default() -> Self {
        Self {
            default_to_context: true,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, item: impl Into<Item>) -> Self {
        self.default = Some(item.into());
        self
    }

    pub fn with_target(mut self, target: AtomicType) -> Self {
        self.target = Some(target);
        self
    }
}

/// English ordinal of a 1-based index: `1st`, `2nd`, `3rd`, `11th`...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

impl TokenCore {
    /// Value of the argument at `index`.
    ///
    /// The argument is selected on a copy of the context. More than one item is
    /// an error except in compatibility mode, where the first one is taken.
    pub fn get_argument(
        &self,
        context: Option<&XPathContext>,
        index: usize,
        spec: &ArgumentSpec,
    ) -> Result<Option<Item>, Error> {
        let item = match self.child(index) {
            None if spec.default_to_context => {
                let ctx = context.ok_or_else(|| self.missing_context(None))?;
                ctx.current()
            }
            None if spec.required => {
                return Err(self.wrong_nargs(Some(&format!(
                    "the {} argument is missing",
                    ordinal(index + 1)
                ))));
            }
            None => return Ok(spec.default.clone()),
            Some(token) => {
                let mut local = context.cloned();
                let mut selection = token.select(local.as_mut());
                let first = selection.next().transpose()?;
                if first.is_some()
                    && !self.parser().compatibility_mode
                    && selection.next().transpose()?.is_some()
                {
                    return Err(self.wrong_context_type(Some(
                        "a sequence of more than one item is not allowed as argument",
                    )));
                }
                first
            }
        };

        let Some(item) = item else {
            if spec.required {
                return Err(self.missing_sequence(Some(&format!(
                    "the {} argument is empty",
                    ordinal(index + 1)
                ))));
            }
            return Ok(spec.default.clone());
        };

        match spec.target {
            Some(target) => self.coerce_argument(&item, target).map(|v| Some(Item::Atomic(v))),
            None => Ok(Some(item)),
        }
    }

    fn coerce_argument(&self, item: &Item, target: AtomicType) -> Result<AtomicValue, Error> {
        if let Item::Atomic(value) = item
            && target.is_instance(value)
        {
            return Ok(value.clone());
        }
        let parser = self.parser();
        if parser.compatibility_mode {
            if target.is_string() {
                return self.string_value(Some(item)).map(AtomicValue::String);
            }
            if target.is_float_like() {
                return Ok(AtomicValue::Double(self.number_value(Some(item))));
            }
        }
        if parser.version > XPathVersion::V1_0
            && let Some(value) = self.data_value(item)?
        {
            if let Some(promoted) = target.promote(&value) {
                return Ok(promoted);
            }
            if let AtomicValue::UntypedAtomic(s) = &value {
                return target.cast_str(s).map_err(|err| {
                    self.wrong_context_type(Some(&format!(
                        "cannot cast untyped argument to {target}: {}",
                        err.message
                    )))
                });
            }
            return Err(self.wrong_context_type(Some(&format!(
                "the argument has type {}, expected {target}",
                value.type_name()
            ))));
        }
        Err(self.wrong_context_type(Some(&format!("the argument must be an {target}"))))
    }

    /// Both operands of a binary token, `None` when either is empty.
    ///
    /// Nodes are atomized. A decimal paired with a double is turned into a double.
    pub fn get_operands(
        &self,
        context: Option<&XPathContext>,
        target: Option<AtomicType>,
    ) -> Result<Option<(AtomicValue, AtomicValue)>, Error> {
        let spec = ArgumentSpec {
            target,
            ..ArgumentSpec::default()
        };
        let Some(first) = self.operand(context, 0, &spec)? else {
            return Ok(None);
        };
        let Some(second) = self.operand(context, 1, &spec)? else {
            return Ok(None);
        };
        Ok(Some(match (first, second) {
            (AtomicValue::Decimal(d), other @ AtomicValue::Double(_)) => (AtomicValue::Double(d), other),
            (other @ AtomicValue::Double(_), AtomicValue::Decimal(d)) => (other, AtomicValue::Double(d)),
            pair => pair,
        }))
    }

    fn operand(
        &self,
        context: Option<&XPathContext>,
        index: usize,
        spec: &ArgumentSpec,
    ) -> Result<Option<AtomicValue>, Error> {
        match self.get_argument(context, index, spec)? {
            None => Ok(None),
            Some(Item::Atomic(value)) => Ok(Some(value)),
            Some(item) => self.data_value(&item),
        }
    }
}

