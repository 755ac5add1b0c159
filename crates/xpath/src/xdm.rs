use crate::error::{Error, ErrorCode};
use crate::temporal;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    /// Parses a name in extended format (`{uri}local`) or a plain local name.
    pub fn parse(name: &str) -> Result<Self, Error> {
        match split_extended(name)? {
            (Some(ns), local) => Ok(Self::new(Some(ns.to_string()), local)),
            (None, local) => Ok(Self::new(None, local)),
        }
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) if !ns.is_empty() => write!(f, "{{{ns}}}{}", self.local),
            _ => f.write_str(&self.local),
        }
    }
}

/// Splits `{uri}local` into its parts. A `{` without matching `}` is a value error.
pub fn split_extended(name: &str) -> Result<(Option<&str>, &str), Error> {
    let Some(rest) = name.strip_prefix('{') else {
        return Ok((None, name));
    };
    match rest.split_once('}') {
        Some((ns, local)) if !local.contains('}') => Ok((Some(ns), local)),
        _ => Err(Error::from_code(
            ErrorCode::FOCA0002,
            format!("invalid name format {name:?}"),
        )),
    }
}

/// Local part of a name in extended format.
pub fn local_name(name: &str) -> &str {
    match name.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
        Some((_, local)) => local,
        None => name.rsplit_once(':').map_or(name, |(_, local)| local),
    }
}

/// Prefixed node name resolved against in-scope namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn expanded(&self) -> ExpandedName {
        ExpandedName::new(self.ns_uri.clone(), self.local.clone())
    }

    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(p) if !p.is_empty() => format!("{p}:{}", self.local),
            _ => self.local.clone(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// Atomic values of the XDM type universe handled by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicValue {
    Boolean(bool),
    String(String),
    UntypedAtomic(String),
    AnyUri(String),
    Integer(i64),
    Decimal(f64),
    Double(f64),
    Float(f32),
    QName {
        ns_uri: Option<String>,
        prefix: Option<String>,
        local: String,
    },
    DateTime {
        value: NaiveDateTime,
        tz: Option<FixedOffset>,
    },
    Date {
        date: NaiveDate,
        tz: Option<FixedOffset>,
    },
    Time {
        time: NaiveTime,
        tz: Option<FixedOffset>,
    },
    /// Total seconds.
    DayTimeDuration(i64),
    /// Total months.
    YearMonthDuration(i32),
}

impl AtomicValue {
    pub fn untyped(s: impl Into<String>) -> Self {
        Self::UntypedAtomic(s.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer(_) | Self::Decimal(_) | Self::Double(_) | Self::Float(_)
        )
    }

    /// String, untypedAtomic and anyURI share the string value space.
    pub const fn is_string_like(&self) -> bool {
        matches!(self, Self::String(_) | Self::UntypedAtomic(_) | Self::AnyUri(_))
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Decimal(d) | Self::Double(d) => Some(*d),
            Self::Float(f) => Some(f64::from(*f)),
            _ => None,
        }
    }

    pub fn timezone(&self) -> Option<FixedOffset> {
        match self {
            Self::DateTime { tz, .. } | Self::Date { tz, .. } | Self::Time { tz, .. } => *tz,
            _ => None,
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "xs:boolean",
            Self::String(_) => "xs:string",
            Self::UntypedAtomic(_) => "xs:untypedAtomic",
            Self::AnyUri(_) => "xs:anyURI",
            Self::Integer(_) => "xs:integer",
            Self::Decimal(_) => "xs:decimal",
            Self::Double(_) => "xs:double",
            Self::Float(_) => "xs:float",
            Self::QName { .. } => "xs:QName",
            Self::DateTime { .. } => "xs:dateTime",
            Self::Date { .. } => "xs:date",
            Self::Time { .. } => "xs:time",
            Self::DayTimeDuration(_) => "xs:dayTimeDuration",
            Self::YearMonthDuration(_) => "xs:yearMonthDuration",
        }
    }
}

fn format_double(f: &mut fmt::Formatter<'_>, d: f64) -> fmt::Result {
    if d.is_nan() {
        f.write_str("NaN")
    } else if d.is_infinite() {
        f.write_str(if d > 0.0 { "INF" } else { "-INF" })
    } else if d == 0.0 {
        f.write_str(if d.is_sign_negative() { "-0" } else { "0" })
    } else if d.fract() == 0.0 && d.abs() < 1e15 {
        write!(f, "{d:.0}")
    } else {
        write!(f, "{d}")
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::String(s) | Self::UntypedAtomic(s) | Self::AnyUri(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) | Self::Double(d) => format_double(f, *d),
            Self::Float(x) => format_double(f, f64::from(*x)),
            Self::QName { prefix, local, .. } => match prefix {
                Some(p) if !p.is_empty() => write!(f, "{p}:{local}"),
                _ => f.write_str(local),
            },
            Self::DateTime { value, tz } => f.write_str(&temporal::format_date_time(*value, *tz)),
            Self::Date { date, tz } => f.write_str(&temporal::format_date(*date, *tz)),
            Self::Time { time, tz } => f.write_str(&temporal::format_time(*time, *tz)),
            Self::DayTimeDuration(secs) => f.write_str(&temporal::format_day_time_duration(*secs)),
            Self::YearMonthDuration(months) => {
                f.write_str(&temporal::format_year_month_duration(*months))
            }
        }
    }
}

impl From<bool> for AtomicValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for AtomicValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for AtomicValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<&str> for AtomicValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AtomicValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
