//! Error taxonomy shared by the node tree model and the token engine.
//!
//! Every error carries one W3C error code (`err:XPTY0004` and friends). Codes are
//! grouped into a small set of [`ErrorKind`]s so callers can branch on the class of
//! failure without matching individual codes.

use crate::consts::ERR_NS;
use crate::xdm::ExpandedName;
use compact_str::CompactString;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed expression construct.
    Syntax,
    /// Unresolvable QName, prefix or type name.
    Name,
    /// Wrong dynamic type, failed cast or wrong cardinality.
    Type,
    /// Malformed literal or invalid collation.
    Value,
    /// Missing context or schema where one is required.
    MissingContext,
    /// Duration or date/time arithmetic out of range.
    Overflow,
    Runtime,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    XPST0001, // schema required
    XPDY0002, // context item undefined
    XPST0003, // syntax error
    XPTY0004, // type error
    XPST0005, // empty sequence not allowed
    XPST0008, // undeclared name
    XPST0010, // unsupported axis
    XPST0017, // wrong function arity
    XPTY0018, // mixed nodes and atomics in a last step
    XPTY0019, // atomic intermediate step result
    XPTY0020, // axis step context is not a node
    XPDY0050, // treat / sequence type mismatch
    XPST0051, // unknown atomic type
    XPST0080, // invalid cast target
    XPST0081, // unknown namespace prefix
    FOCA0002, // invalid lexical value
    FOCH0002, // unsupported collation
    FODT0003, // invalid timezone value
    FOAR0002, // numeric or temporal overflow
    FONS0004, // no namespace for prefix
    FORG0001, // invalid value for cast
    FORG0006, // invalid argument type
    FOTY0012, // argument node has no typed value
    FOER0000, // unidentified error
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 24] = [
        Self::XPST0001,
        Self::XPDY0002,
        Self::XPST0003,
        Self::XPTY0004,
        Self::XPST0005,
        Self::XPST0008,
        Self::XPST0010,
        Self::XPST0017,
        Self::XPTY0018,
        Self::XPTY0019,
        Self::XPTY0020,
        Self::XPDY0050,
        Self::XPST0051,
        Self::XPST0080,
        Self::XPST0081,
        Self::FOCA0002,
        Self::FOCH0002,
        Self::FODT0003,
        Self::FOAR0002,
        Self::FONS0004,
        Self::FORG0001,
        Self::FORG0006,
        Self::FOTY0012,
        Self::FOER0000,
    ];

    pub const fn local(self) -> &'static str {
        match self {
            Self::XPST0001 => "XPST0001",
            Self::XPDY0002 => "XPDY0002",
            Self::XPST0003 => "XPST0003",
            Self::XPTY0004 => "XPTY0004",
            Self::XPST0005 => "XPST0005",
            Self::XPST0008 => "XPST0008",
            Self::XPST0010 => "XPST0010",
            Self::XPST0017 => "XPST0017",
            Self::XPTY0018 => "XPTY0018",
            Self::XPTY0019 => "XPTY0019",
            Self::XPTY0020 => "XPTY0020",
            Self::XPDY0050 => "XPDY0050",
            Self::XPST0051 => "XPST0051",
            Self::XPST0080 => "XPST0080",
            Self::XPST0081 => "XPST0081",
            Self::FOCA0002 => "FOCA0002",
            Self::FOCH0002 => "FOCH0002",
            Self::FODT0003 => "FODT0003",
            Self::FOAR0002 => "FOAR0002",
            Self::FONS0004 => "FONS0004",
            Self::FORG0001 => "FORG0001",
            Self::FORG0006 => "FORG0006",
            Self::FOTY0012 => "FOTY0012",
            Self::FOER0000 => "FOER0000",
        }
    }

    /// Returns the QName of the code in the `xqt-errors` namespace.
    pub fn qname(self) -> ExpandedName {
        ExpandedName::new(Some(ERR_NS.to_string()), self.local())
    }

    /// Parses a bare or `err:`-prefixed code, e.g. `"XPTY0004"` or `"err:XPTY0004"`.
    pub fn from_code(s: &str) -> Option<Self> {
        let local = s.strip_prefix("err:").unwrap_or(s);
        Self::ALL.into_iter().find(|c| c.local() == local)
    }

    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::XPST0003 => ErrorKind::Syntax,
            Self::XPST0008
            | Self::XPST0010
            | Self::XPST0051
            | Self::XPST0080
            | Self::XPST0081
            | Self::FONS0004 => ErrorKind::Name,
            Self::XPTY0004
            | Self::XPST0005
            | Self::XPST0017
            | Self::XPTY0018
            | Self::XPTY0019
            | Self::XPTY0020
            | Self::XPDY0050
            | Self::FORG0006
            | Self::FOTY0012 => ErrorKind::Type,
            Self::FOCA0002 | Self::FOCH0002 | Self::FODT0003 | Self::FORG0001 => ErrorKind::Value,
            Self::XPST0001 | Self::XPDY0002 => ErrorKind::MissingContext,
            Self::FOAR0002 => ErrorKind::Overflow,
            Self::FOER0000 => ErrorKind::Runtime,
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Self::XPST0001 => "schema required but not available",
            Self::XPDY0002 => "dynamic context required for evaluate",
            Self::XPST0003 => "invalid XPath expression",
            Self::XPTY0004 => "type is not appropriate for the context",
            Self::XPST0005 => "a not empty sequence required",
            Self::XPST0008 => "name not found",
            Self::XPST0010 => "axis not found",
            Self::XPST0017 => "wrong number of arguments",
            Self::XPTY0018 => "step result contains both nodes and atomic values",
            Self::XPTY0019 => "intermediate step contains an atomic value",
            Self::XPTY0020 => "context item is not a node",
            Self::XPDY0050 => "type does not match sequence type",
            Self::XPST0051 => "unknown atomic type",
            Self::XPST0080 => "target type cannot be xs:NOTATION or xs:anyAtomicType",
            Self::XPST0081 => "unknown namespace",
            Self::FOCA0002 => "invalid lexical value",
            Self::FOCH0002 => "unsupported collation",
            Self::FODT0003 => "invalid timezone value",
            Self::FOAR0002 => "numeric operation overflow/underflow",
            Self::FONS0004 => "no namespace found for prefix",
            Self::FORG0001 => "invalid value for cast/constructor",
            Self::FORG0006 => "invalid argument type",
            Self::FOTY0012 => "argument node does not have a typed value",
            Self::FOER0000 => "unidentified error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "err:{}", self.local())
    }
}

/// Token that raised an error: symbol, label and expression text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRef {
    pub symbol: CompactString,
    pub label: CompactString,
    /// Expression text of the token and its operands.
    pub source: CompactString,
}

impl fmt::Display for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.symbol.as_str(), self.label)?;
        if self.source != self.symbol {
            write!(f, " in {:?}", self.source.as_str())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub token: Option<TokenRef>,
}

impl Error {
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            token: None,
        }
    }

    /// Error with the code's default message.
    pub fn new(code: ErrorCode) -> Self {
        Self::from_code(code, code.default_message())
    }

    pub fn with_token(mut self, token: TokenRef) -> Self {
        self.token = Some(token);
        self
    }

    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn format_code(&self) -> String {
        self.code.to_string()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "error: {} ({}) at {}", self.message, self.format_code(), token),
            None => write!(f, "error: {} ({})", self.message, self.format_code()),
        }
    }
}
