//! Atomization, effective boolean values, string and number values.

use super::{TokenCore, XPathToken};
use crate::atomic::{AtomicType, parse_xsd_double};
use crate::consts::is_special_type;
use crate::context::XPathContext;
use crate::error::{Error, ErrorCode};
use crate::nodes::{NodeKind, XPathNode};
use crate::sequence::{Item, TypedNode, Value};
use crate::xdm::AtomicValue;

impl TokenCore {
    /// Typed value of one item, `None` when the item has no typed value.
    pub fn data_value(&self, item: &Item) -> Result<Option<AtomicValue>, Error> {
        let node = match item {
            Item::Atomic(value) => return Ok(Some(value.clone())),
            Item::Typed(TypedNode { values, .. }) => {
                return match values.as_slice() {
                    [] => Ok(None),
                    [value] => Ok(Some(value.clone())),
                    _ => Err(self.wrong_context_type(Some(
                        "typed value of the node is a sequence of more than one item",
                    ))),
                };
            }
            Item::Node(node) => node,
        };
        if node.is_schema_node() && matches!(node.kind(), NodeKind::Element | NodeKind::Attribute) {
            return self.schema_node_value(node).map(Some);
        }
        match node.kind() {
            NodeKind::Namespace | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                return Ok(Some(AtomicValue::string(node.string_value())));
            }
            _ => {}
        }
        let mut values = node
            .typed_values()
            .map_err(|err| self.error(ErrorCode::FOTY0012, Some(&err.message)))?;
        match values.len() {
            0 => Ok(None),
            1 => Ok(values.pop()),
            _ => Err(self.wrong_context_type(Some(
                "typed value of the node is a sequence of more than one item",
            ))),
        }
    }

    /// Atomizes every item of a value.
    pub fn atomize_value(&self, value: &Value) -> Result<Vec<AtomicValue>, Error> {
        value.iter().map(|item| self.atomize_item(item)).collect()
    }

    fn atomize_item(&self, item: &Item) -> Result<AtomicValue, Error> {
        self.data_value(item)?.ok_or_else(|| {
            self.error(
                ErrorCode::FOTY0012,
                Some(&format!("{} has no typed value", describe(item))),
            )
        })
    }

    /// Effective boolean value.
    pub fn boolean_value(&self, value: &Value) -> Result<bool, Error> {
        match value {
            Value::Empty => Ok(false),
            Value::Sequence(items) => match items.as_slice() {
                [] => Ok(false),
                [first, ..] if first.is_node() => Ok(true),
                [Item::Atomic(value)] => self.atomic_boolean_value(value),
                _ => Err(self.wrong_type(Some(
                    "effective boolean value is not defined for a sequence of two or \
                     more items starting with an atomic value",
                ))),
            },
            Value::Single(Item::Atomic(value)) => self.atomic_boolean_value(value),
            Value::Single(item) => match item.node_kind() {
                Some(NodeKind::Element | NodeKind::Attribute | NodeKind::Namespace) => {
                    Err(self.wrong_type(Some(&format!(
                        "effective boolean value is not defined for a bare {}",
                        describe(item)
                    ))))
                }
                _ => Ok(true),
            },
        }
    }

    fn atomic_boolean_value(&self, value: &AtomicValue) -> Result<bool, Error> {
        match value {
            AtomicValue::Boolean(b) => Ok(*b),
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) | AtomicValue::AnyUri(s) => {
                Ok(!s.is_empty())
            }
            AtomicValue::Integer(i) => Ok(*i != 0),
            v if v.is_numeric() => Ok(v.as_f64().is_some_and(|d| d != 0.0 && !d.is_nan())),
            v => Err(self.wrong_type(Some(&format!(
                "effective boolean value is not defined for {}",
                v.type_name()
            )))),
        }
    }

    /// String value of an item, the empty string for no item.
    pub fn string_value(&self, item: Option<&Item>) -> Result<String, Error> {
        match item {
            None => Ok(String::new()),
            Some(Item::Atomic(value)) => Ok(value.to_string()),
            Some(item) => {
                let Some(node) = item.as_node() else {
                    return Ok(String::new());
                };
                if node.is_schema_node()
                    && matches!(node.kind(), NodeKind::Element | NodeKind::Attribute)
                {
                    return Ok(self.schema_node_value(node)?.to_string());
                }
                Ok(node.string_value())
            }
        }
    }

    /// Number value of an item. Unparsable input gives NaN, never an error.
    pub fn number_value(&self, item: Option<&Item>) -> f64 {
        match item {
            Some(Item::Atomic(AtomicValue::Boolean(b))) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Some(Item::Atomic(value)) if value.is_numeric() => value.as_f64().unwrap_or(f64::NAN),
            _ => self
                .string_value(item)
                .ok()
                .and_then(|s| parse_xsd_double(s.trim()))
                .unwrap_or(f64::NAN),
        }
    }

    /// Value standing for a schema element or attribute: a sample of its type.
    pub fn schema_node_value(&self, node: &XPathNode) -> Result<AtomicValue, Error> {
        if !node.is_schema_node() {
            return Err(match self.parser().schema {
                None => self.missing_schema(None),
                Some(_) => self.wrong_type(Some(&format!("{} is not a schema node", node.kind()))),
            });
        }
        let Some(xsd_type) = node.xsd_type() else {
            return Ok(AtomicValue::untyped(""));
        };
        if let Some(builtin) = xsd_type.name().and_then(AtomicType::from_name) {
            return Ok(builtin.sample_value());
        }
        if is_special_type(xsd_type.name()) {
            return Ok(AtomicValue::untyped("1"));
        }
        if xsd_type.is_simple() || xsd_type.has_simple_content() {
            let schema = self
                .parser()
                .schema
                .as_ref()
                .ok_or_else(|| self.missing_schema(None))?;
            let primitive = schema.get_primitive_type(&xsd_type);
            return Ok(primitive
                .as_ref()
                .and_then(|p| p.name())
                .and_then(AtomicType::from_name)
                .map_or_else(|| AtomicValue::untyped("1"), AtomicType::sample_value));
        }
        Ok(AtomicValue::untyped(""))
    }
}

fn describe(item: &Item) -> String {
    match item.node_kind() {
        Some(kind) => format!("{kind} node"),
        None => "atomic value".to_string(),
    }
}

impl dyn XPathToken + '_ {
    /// Atomized items of the token's selection.
    pub fn atomization(&self, context: Option<&mut XPathContext>) -> Result<Vec<AtomicValue>, Error> {
        let core = self.core();
        self.select(context)
            .map(|item| core.atomize_item(&item?))
            .collect()
    }

    /// The single atomized operand of the token, `None` for an empty operand.
    ///
    /// Strings are decoded with the schema type bound to the context item when
    /// the token carries schema type bindings.
    pub fn get_atomized_operand(
        &self,
        mut context: Option<&mut XPathContext>,
    ) -> Result<Option<AtomicValue>, Error> {
        let core = self.core();
        let mut values = self.atomization(context.as_deref_mut())?;
        let value = match values.len() {
            0 => return Ok(None),
            1 => values.pop(),
            _ => {
                return Err(core.wrong_context_type(Some(
                    "atomized operand is a sequence of length greater than one",
                )));
            }
        };
        let Some(value) = value else {
            return Ok(None);
        };
        let value = match value {
            AtomicValue::UntypedAtomic(s) => AtomicValue::String(s),
            v => v,
        };
        let schema_context = context.as_ref().is_some_and(|ctx| ctx.schema_context);
        if schema_context || core.xsd_types().is_empty() {
            return Ok(Some(value));
        }
        let AtomicValue::String(text) = &value else {
            return Ok(Some(value));
        };
        let item = context.as_ref().and_then(|ctx| ctx.item.clone());
        let Some(xsd_type) = item.as_ref().and_then(|item| core.get_xsd_type(item)) else {
            return Ok(Some(value));
        };
        if is_special_type(xsd_type.name()) {
            return Ok(Some(AtomicValue::untyped(text.clone())));
        }
        let mut decoded = xsd_type.decode(text).map_err(|err| {
            core.wrong_context_type(Some(&format!("cannot decode operand: {}", err.message)))
        })?;
        if decoded.len() == 1 {
            Ok(decoded.pop())
        } else {
            Err(core.wrong_context_type(Some(
                "atomized operand is a sequence of length greater than one",
            )))
        }
    }
}
