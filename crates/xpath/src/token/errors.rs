//! Named error constructors of tokens.

use super::TokenCore;
use crate::consts::ERR_NS;
use crate::error::{Error, ErrorCode, TokenRef};
use compact_str::{CompactString, ToCompactString};

macro_rules! error_accessors {
    ($($(#[$meta:meta])* $name:ident => $code:ident),* $(,)?) => {
        impl TokenCore {
            $(
                $(#[$meta])*
                pub fn $name(&self, message: Option<&str>) -> Error {
                    self.error(ErrorCode::$code, message)
                }
            )*
        }
    };
}

error_accessors! {
    missing_context => XPDY0002,
    wrong_context_type => XPTY0004,
    missing_sequence => XPST0005,
    wrong_sequence_type => XPDY0050,
    unknown_atomic_type => XPST0051,
    unknown_namespace => XPST0081,
    wrong_syntax => XPST0003,
    wrong_value => FOCA0002,
    wrong_type => FORG0006,
    missing_schema => XPST0001,
    missing_name => XPST0008,
    missing_axis => XPST0010,
    wrong_nargs => XPST0017,
    wrong_step_result => XPTY0018,
    wrong_intermediate_step_result => XPTY0019,
    /// Context item of an axis step is not a node.
    wrong_axis_argument => XPTY0020,
    wrong_target_type => XPST0080,
}

impl TokenCore {
    pub fn token_ref(&self) -> TokenRef {
        TokenRef {
            symbol: CompactString::new(self.symbol()),
            label: self.label().to_compact_string(),
            source: CompactString::from(self.source()),
        }
    }

    /// Error with `code` raised by this token, with the code's default message
    /// unless one is given.
    pub fn error(&self, code: ErrorCode, message: Option<&str>) -> Error {
        let err = match message {
            Some(msg) => Error::from_code(code, msg),
            None => Error::new(code),
        };
        err.with_token(self.token_ref())
    }

    /// Error from a code in QName form: `err:XPTY0004`, `{ns}XPTY0004` or a
    /// bare code. The prefix must be bound to the error namespace.
    pub fn error_from_str(&self, code: &str, message: Option<&str>) -> Error {
        let local = if let Some(rest) = code.strip_prefix("Q{").or_else(|| code.strip_prefix('{')) {
            match rest.split_once('}') {
                Some((ns, local)) if ns == ERR_NS => local,
                _ => {
                    return self.wrong_context_type(Some(&format!(
                        "{code:?} is not an XPath error code"
                    )));
                }
            }
        } else if let Some((prefix, local)) = code.split_once(':') {
            match self.parser().namespaces.get(prefix) {
                Some(ns) if ns == ERR_NS => local,
                Some(_) => {
                    return self.wrong_context_type(Some(&format!(
                        "{prefix:?} is not the prefix of the XPath error namespace"
                    )));
                }
                None => {
                    return self.wrong_context_type(Some(&format!(
                        "unbound error code prefix {prefix:?}"
                    )));
                }
            }
        } else {
            code
        };
        match ErrorCode::from_code(local) {
            Some(code) => self.error(code, message),
            None => self.wrong_context_type(Some(&format!("unknown error code {code:?}"))),
        }
    }
}
