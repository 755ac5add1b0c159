use super::{Label, TokenCore};
use crate::consts::{FNS, XSD_NS};
use crate::error::{Error, ErrorCode};
use url::Url;

impl TokenCore {
    /// Binds the token to `namespace`, checking that a qualified name is
    /// allowed in the token's position. An ambiguous label is narrowed to a
    /// function for the functions namespace and to a constructor for the XSD
    /// namespace.
    pub fn bind_namespace(&self, namespace: &str) -> Result<(), Error> {
        let label = self.label();
        let is_name = matches!(self.symbol(), "(name)" | "*");
        let is_function = label.matches(&Label::Function);
        let is_constructor = label.matches(&Label::ConstructorFunction);

        if !is_name && !is_function && !is_constructor {
            return Err(self.wrong_syntax(Some(&format!(
                "{:?} cannot be bound to a namespace",
                self.symbol()
            ))));
        }
        if namespace == FNS {
            if !is_function {
                return Err(self.wrong_syntax(Some("a function call expected")));
            }
            if label.is_multi() {
                self.set_label(Label::Function);
            }
        } else if namespace == XSD_NS {
            if !is_name && !is_constructor {
                return Err(self.wrong_syntax(Some(
                    "a name, a wildcard or a constructor function expected",
                )));
            }
            if label.is_multi() {
                self.set_label(Label::ConstructorFunction);
            }
        }
        Ok(())
    }

    /// URI bound to `prefix` in the parser namespaces.
    pub fn get_namespace(&self, prefix: &str) -> Result<String, Error> {
        self.parser()
            .namespaces
            .get(prefix)
            .cloned()
            .ok_or_else(|| {
                self.error(
                    ErrorCode::FONS0004,
                    Some(&format!("No namespace found for prefix {prefix:?}")),
                )
            })
    }

    /// `uri` resolved against the static base URI when it is relative.
    pub fn get_absolute_uri(&self, uri: &str) -> Result<String, Error> {
        if Url::parse(uri).is_ok() {
            return Ok(uri.to_string());
        }
        let Some(base) = self.parser().base_uri.as_deref() else {
            return Ok(uri.to_string());
        };
        Url::parse(base)
            .and_then(|base| base.join(uri))
            .map(String::from)
            .map_err(|err| self.wrong_value(Some(&format!("cannot resolve {uri:?}: {err}"))))
    }
}
