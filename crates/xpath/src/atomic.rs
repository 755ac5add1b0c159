//! Target atomic types for argument coercion and schema sample values.

use crate::consts::XSD_NS;
use crate::error::{Error, ErrorCode};
use crate::temporal;
use crate::xdm::{AtomicValue, split_extended};
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicType {
    AnyAtomic,
    UntypedAtomic,
    String,
    Boolean,
    /// Any of integer, decimal, float or double.
    Numeric,
    Integer,
    Decimal,
    Float,
    Double,
    AnyUri,
    QName,
    DateTime,
    Date,
    Time,
    DayTimeDuration,
    YearMonthDuration,
}

impl AtomicType {
    /// Resolves a builtin XSD type from its local name (`integer`, `dateTime`, ...).
    pub fn from_local_name(local: &str) -> Option<Self> {
        Some(match local {
            "anyAtomicType" => Self::AnyAtomic,
            "untypedAtomic" => Self::UntypedAtomic,
            "string" | "normalizedString" | "token" | "language" | "Name" | "NCName" | "NMTOKEN"
            | "ID" | "IDREF" | "ENTITY" => Self::String,
            "boolean" => Self::Boolean,
            "integer" | "long" | "int" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "nonPositiveInteger" | "negativeInteger" | "unsignedLong"
            | "unsignedInt" | "unsignedShort" | "unsignedByte" => Self::Integer,
            "decimal" => Self::Decimal,
            "float" => Self::Float,
            "double" => Self::Double,
            "anyURI" => Self::AnyUri,
            "QName" => Self::QName,
            "dateTime" => Self::DateTime,
            "date" => Self::Date,
            "time" => Self::Time,
            "dayTimeDuration" => Self::DayTimeDuration,
            "yearMonthDuration" => Self::YearMonthDuration,
            _ => return None,
        })
    }

    /// Resolves a builtin type from an extended name in the XSD namespace.
    pub fn from_name(name: &str) -> Option<Self> {
        match split_extended(name).ok()? {
            (Some(ns), local) if ns == XSD_NS => Self::from_local_name(local),
            _ => None,
        }
    }

    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Numeric | Self::Integer | Self::Decimal | Self::Float | Self::Double
        )
    }

    /// Targets that XPath 1.0 compatibility mode coerces with `number()`.
    pub const fn is_float_like(self) -> bool {
        matches!(self, Self::Numeric | Self::Float | Self::Double)
    }

    /// True if the value is an instance of this type, without promotion.
    pub fn is_instance(self, value: &AtomicValue) -> bool {
        match (self, value) {
            (Self::AnyAtomic, _)
            | (Self::UntypedAtomic, AtomicValue::UntypedAtomic(_))
            | (Self::String, AtomicValue::String(_))
            | (Self::Boolean, AtomicValue::Boolean(_))
            | (Self::Integer, AtomicValue::Integer(_))
            | (Self::Decimal, AtomicValue::Decimal(_) | AtomicValue::Integer(_))
            | (Self::Float, AtomicValue::Float(_))
            | (Self::Double, AtomicValue::Double(_))
            | (Self::AnyUri, AtomicValue::AnyUri(_))
            | (Self::QName, AtomicValue::QName { .. })
            | (Self::DateTime, AtomicValue::DateTime { .. })
            | (Self::Date, AtomicValue::Date { .. })
            | (Self::Time, AtomicValue::Time { .. })
            | (Self::DayTimeDuration, AtomicValue::DayTimeDuration(_))
            | (Self::YearMonthDuration, AtomicValue::YearMonthDuration(_)) => true,
            (Self::Numeric, v) => v.is_numeric(),
            _ => false,
        }
    }

    /// Applies numeric and URI type promotion. Returns `None` when no promotion applies.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn promote(self, value: &AtomicValue) -> Option<AtomicValue> {
        if self.is_instance(value) {
            return Some(value.clone());
        }
        match (self, value) {
            (Self::Float, AtomicValue::Integer(i)) => Some(AtomicValue::Float(*i as f32)),
            (Self::Float, AtomicValue::Decimal(d)) => Some(AtomicValue::Float(*d as f32)),
            (Self::Double, v) if v.is_numeric() => v.as_f64().map(AtomicValue::Double),
            (Self::String, AtomicValue::AnyUri(s)) => Some(AtomicValue::String(s.clone())),
            _ => None,
        }
    }

    /// Casts a lexical form into this type.
    #[allow(clippy::cast_possible_truncation)]
    pub fn cast_str(self, s: &str) -> Result<AtomicValue, Error> {
        let invalid = || {
            Error::from_code(
                ErrorCode::FORG0001,
                format!("invalid lexical value {s:?} for {self}"),
            )
        };
        let trimmed = s.trim();
        Ok(match self {
            Self::AnyAtomic | Self::UntypedAtomic => AtomicValue::UntypedAtomic(s.to_string()),
            Self::String => AtomicValue::String(s.to_string()),
            Self::AnyUri => AtomicValue::AnyUri(trimmed.to_string()),
            Self::Boolean => match trimmed {
                "true" | "1" => AtomicValue::Boolean(true),
                "false" | "0" => AtomicValue::Boolean(false),
                _ => return Err(invalid()),
            },
            Self::Integer => AtomicValue::Integer(trimmed.parse().map_err(|_| invalid())?),
            Self::Decimal => {
                if trimmed.contains(['e', 'E']) || trimmed.is_empty() {
                    return Err(invalid());
                }
                AtomicValue::Decimal(trimmed.parse().map_err(|_| invalid())?)
            }
            Self::Double | Self::Numeric => AtomicValue::Double(parse_xsd_double(trimmed).ok_or_else(invalid)?),
            Self::Float => AtomicValue::Float(parse_xsd_double(trimmed).ok_or_else(invalid)? as f32),
            Self::QName => {
                let (prefix, local) = match trimmed.split_once(':') {
                    Some((p, l)) => (Some(p.to_string()), l.to_string()),
                    None => (None, trimmed.to_string()),
                };
                if local.is_empty() {
                    return Err(invalid());
                }
                AtomicValue::QName {
                    ns_uri: None,
                    prefix,
                    local,
                }
            }
            Self::DateTime => {
                let (value, tz) = temporal::parse_date_time(trimmed).ok_or_else(invalid)?;
                AtomicValue::DateTime { value, tz }
            }
            Self::Date => {
                let (date, tz) = temporal::parse_date(trimmed).ok_or_else(invalid)?;
                AtomicValue::Date { date, tz }
            }
            Self::Time => {
                let (time, tz) = temporal::parse_time(trimmed).ok_or_else(invalid)?;
                AtomicValue::Time { time, tz }
            }
            Self::DayTimeDuration => {
                AtomicValue::DayTimeDuration(temporal::parse_day_time_duration(trimmed).ok_or_else(invalid)?)
            }
            Self::YearMonthDuration => {
                AtomicValue::YearMonthDuration(temporal::parse_year_month_duration(trimmed).ok_or_else(invalid)?)
            }
        })
    }

    /// A representative value of the type, used when evaluating against schema nodes.
    pub fn sample_value(self) -> AtomicValue {
        use chrono::{NaiveDate, NaiveTime};
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        match self {
            Self::AnyAtomic | Self::UntypedAtomic => AtomicValue::untyped("1"),
            Self::String => AtomicValue::string("  alpha\t"),
            Self::Boolean => AtomicValue::Boolean(true),
            Self::Numeric | Self::Integer => AtomicValue::Integer(1),
            Self::Decimal => AtomicValue::Decimal(1.0),
            Self::Float => AtomicValue::Float(1.0),
            Self::Double => AtomicValue::Double(1.0),
            Self::AnyUri => AtomicValue::AnyUri("https://example.com".to_string()),
            Self::QName => AtomicValue::QName {
                ns_uri: Some(XSD_NS.to_string()),
                prefix: Some("xs".to_string()),
                local: "element".to_string(),
            },
            Self::DateTime => AtomicValue::DateTime {
                value: date.and_time(noon),
                tz: None,
            },
            Self::Date => AtomicValue::Date { date, tz: None },
            Self::Time => AtomicValue::Time { time: noon, tz: None },
            Self::DayTimeDuration => AtomicValue::DayTimeDuration(86400),
            Self::YearMonthDuration => AtomicValue::YearMonthDuration(14),
        }
    }
}

impl fmt::Display for AtomicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AnyAtomic => "xs:anyAtomicType",
            Self::UntypedAtomic => "xs:untypedAtomic",
            Self::String => "xs:string",
            Self::Boolean => "xs:boolean",
            Self::Numeric => "xs:numeric",
            Self::Integer => "xs:integer",
            Self::Decimal => "xs:decimal",
            Self::Float => "xs:float",
            Self::Double => "xs:double",
            Self::AnyUri => "xs:anyURI",
            Self::QName => "xs:QName",
            Self::DateTime => "xs:dateTime",
            Self::Date => "xs:date",
            Self::Time => "xs:time",
            Self::DayTimeDuration => "xs:dayTimeDuration",
            Self::YearMonthDuration => "xs:yearMonthDuration",
        })
    }
}

/// Parses the XSD lexical space of `xs:double` (`INF`, `-INF`, `NaN` and decimal/exponent forms).
pub fn parse_xsd_double(s: &str) -> Option<f64> {
    match s {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ if s.is_empty() || s.contains(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            None
        }
        _ => s.parse().ok(),
    }
}
