//! Atomic value comparison and general comparison operand pairs.

use super::TokenCore;
use crate::atomic::{AtomicType, parse_xsd_double};
use crate::collation::Collation;
use crate::context::XPathContext;
use crate::error::{Error, ErrorCode};
use crate::sequence::{Item, Value};
use crate::xdm::AtomicValue;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use core::cmp::Ordering;
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    /// Operator of a general (`=`) or value (`eq`) comparison symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" | "eq" => Self::Eq,
            "!=" | "ne" => Self::Ne,
            "<" | "lt" => Self::Lt,
            "<=" | "le" => Self::Le,
            ">" | "gt" => Self::Gt,
            ">=" | "ge" => Self::Ge,
            _ => return None,
        })
    }

    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
        }
    }
}

fn atomic_type_of(value: &AtomicValue) -> AtomicType {
    match value {
        AtomicValue::Boolean(_) => AtomicType::Boolean,
        AtomicValue::String(_) => AtomicType::String,
        AtomicValue::UntypedAtomic(_) => AtomicType::UntypedAtomic,
        AtomicValue::AnyUri(_) => AtomicType::AnyUri,
        AtomicValue::Integer(_) => AtomicType::Integer,
        AtomicValue::Decimal(_) => AtomicType::Decimal,
        AtomicValue::Double(_) => AtomicType::Double,
        AtomicValue::Float(_) => AtomicType::Float,
        AtomicValue::QName { .. } => AtomicType::QName,
        AtomicValue::DateTime { .. } => AtomicType::DateTime,
        AtomicValue::Date { .. } => AtomicType::Date,
        AtomicValue::Time { .. } => AtomicType::Time,
        AtomicValue::DayTimeDuration(_) => AtomicType::DayTimeDuration,
        AtomicValue::YearMonthDuration(_) => AtomicType::YearMonthDuration,
    }
}

/// Casts an untyped operand for comparison with `other`: to double against a
/// number, to string against a string or another untyped value, otherwise to
/// the type of `other`.
fn normalize_untyped(s: &str, other: &AtomicValue) -> Result<AtomicValue, Error> {
    match other {
        o if o.is_numeric() => parse_xsd_double(s.trim())
            .map(AtomicValue::Double)
            .ok_or_else(|| Error::from_code(ErrorCode::FORG0001, "invalid numeric literal")),
        o if o.is_string_like() => Ok(AtomicValue::String(s.to_string())),
        o => atomic_type_of(o).cast_str(s),
    }
}

fn instant(value: NaiveDateTime, tz: Option<FixedOffset>, implicit: Option<FixedOffset>) -> NaiveDateTime {
    let offset = tz.or(implicit).map_or(0, |tz| tz.local_minus_utc());
    value - chrono::Duration::seconds(i64::from(offset))
}

/// Compares two atomic values with XPath value comparison rules.
///
/// Strings compare with `collation`. Dates and times without a timezone take
/// `implicit_timezone`, or UTC when there is none.
pub fn compare_atomic(
    a: &AtomicValue,
    b: &AtomicValue,
    op: ComparisonOp,
    collation: &dyn Collation,
    implicit_timezone: Option<FixedOffset>,
) -> Result<bool, Error> {
    use AtomicValue as V;

    let (a, b) = match (a, b) {
        (V::UntypedAtomic(sa), V::UntypedAtomic(sb)) => (V::String(sa.clone()), V::String(sb.clone())),
        (V::UntypedAtomic(s), other) => (normalize_untyped(s, other)?, other.clone()),
        (other, V::UntypedAtomic(s)) => (other.clone(), normalize_untyped(s, other)?),
        _ => (a.clone(), b.clone()),
    };

    if let (V::Boolean(x), V::Boolean(y)) = (&a, &b) {
        if op.is_ordering() {
            return Err(Error::from_code(ErrorCode::XPTY0004, "relational op on boolean"));
        }
        return Ok(op.holds(x.cmp(y)));
    }

    if a.is_string_like() && b.is_string_like() {
        let (ls, rs) = (a.to_string(), b.to_string());
        return Ok(match op {
            ComparisonOp::Eq => collation.key(&ls) == collation.key(&rs),
            ComparisonOp::Ne => collation.key(&ls) != collation.key(&rs),
            _ => op.holds(collation.compare(&ls, &rs)),
        });
    }

    if let (V::QName { ns_uri: nsa, local: la, .. }, V::QName { ns_uri: nsb, local: lb, .. }) = (&a, &b) {
        return match op {
            ComparisonOp::Eq => Ok(nsa == nsb && la == lb),
            ComparisonOp::Ne => Ok(nsa != nsb || la != lb),
            _ => Err(Error::from_code(ErrorCode::XPTY0004, "relational op on QName")),
        };
    }

    if let (Some(ln), Some(rn)) = (a.as_f64(), b.as_f64()) {
        if ln.is_nan() || rn.is_nan() {
            return Ok(op == ComparisonOp::Ne);
        }
        return Ok(ln.partial_cmp(&rn).is_some_and(|ord| op.holds(ord)));
    }

    let midnight = NaiveTime::MIN;
    let ord = match (&a, &b) {
        (V::DateTime { value: va, tz: ta }, V::DateTime { value: vb, tz: tb }) => {
            instant(*va, *ta, implicit_timezone).cmp(&instant(*vb, *tb, implicit_timezone))
        }
        (V::Date { date: da, tz: ta }, V::Date { date: db, tz: tb }) => instant(
            da.and_time(midnight),
            *ta,
            implicit_timezone,
        )
        .cmp(&instant(db.and_time(midnight), *tb, implicit_timezone)),
        (V::Time { time: ta, tz: tza }, V::Time { time: tb, tz: tzb }) => {
            let base = NaiveDate::from_ymd_opt(1972, 12, 31).unwrap_or_default();
            instant(base.and_time(*ta), *tza, implicit_timezone)
                .cmp(&instant(base.and_time(*tb), *tzb, implicit_timezone))
        }
        (V::YearMonthDuration(ma), V::YearMonthDuration(mb)) => ma.cmp(mb),
        (V::DayTimeDuration(sa), V::DayTimeDuration(sb)) => sa.cmp(sb),
        _ => {
            return Err(Error::from_code(
                ErrorCode::XPTY0004,
                format!(
                    "incomparable atomic types {} and {}",
                    a.type_name(),
                    b.type_name()
                ),
            ));
        }
    };
    Ok(op.holds(ord))
}

impl TokenCore {
    /// Operand pairs of a general comparison.
    ///
    /// Each operand is evaluated on its own copy of the context. In
    /// compatibility mode a boolean operand turns the other one into its
    /// boolean value, and ordering operators compare numbers.
    pub fn get_comparison_data(
        &self,
        context: Option<&XPathContext>,
    ) -> Result<Vec<(AtomicValue, AtomicValue)>, Error> {
        let (Some(left), Some(right)) = (self.child(0), self.child(1)) else {
            return Err(self.wrong_nargs(Some("a comparison needs two operands")));
        };
        let first = left.evaluate(context.cloned().as_mut())?;
        let second = right.evaluate(context.cloned().as_mut())?;

        if self.parser().compatibility_mode {
            if let Some(b) = single_boolean(&first) {
                let other = self.boolean_value(&sequence_of(second))?;
                return Ok(vec![(AtomicValue::Boolean(b), AtomicValue::Boolean(other))]);
            }
            if let Some(b) = single_boolean(&second) {
                if first.is_empty() {
                    return Ok(Vec::new());
                }
                let other = self.boolean_value(&sequence_of(first))?;
                return Ok(vec![(AtomicValue::Boolean(other), AtomicValue::Boolean(b))]);
            }
            if ComparisonOp::from_symbol(self.symbol()).is_some_and(ComparisonOp::is_ordering) {
                return Ok(first
                    .iter()
                    .cartesian_product(second.iter())
                    .map(|(x, y)| {
                        (
                            AtomicValue::Double(self.number_value(Some(x))),
                            AtomicValue::Double(self.number_value(Some(y))),
                        )
                    })
                    .collect());
            }
        }

        let left_values = self.atomize_value(&first)?;
        let right_values = self.atomize_value(&second)?;
        Ok(left_values
            .into_iter()
            .cartesian_product(right_values)
            .collect())
    }
}

fn single_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Single(Item::Atomic(AtomicValue::Boolean(b))) => Some(*b),
        Value::Sequence(items) => match items.as_slice() {
            [Item::Atomic(AtomicValue::Boolean(b))] => Some(*b),
            _ => None,
        },
        _ => None,
    }
}

fn sequence_of(value: Value) -> Value {
    match value {
        Value::Single(item) => Value::Sequence(vec![item]),
        other => other,
    }
}
