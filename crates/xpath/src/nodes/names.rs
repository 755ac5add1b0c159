//! Node names, name tests, canonical paths and base URIs.

use super::{NodeKind, XPathNode};
use crate::consts::{FNS, XML_BASE, XML_URI, XSI_NIL};
use crate::error::{Error, ErrorCode};
use crate::etree::Namespaces;
use crate::xdm::{QName, local_name, split_extended};

/// Matches a name in extended format against a wildcard name test:
/// `*`, `*:*`, `*:local`, `prefix:*` resolved to `{ns}*`, `Q{ns}*` and `{}*`.
pub fn match_wildcard(name: Option<&str>, wildcard: &str) -> bool {
    let Some(name) = name else {
        return false;
    };
    if wildcard == "*" || wildcard == "*:*" {
        return true;
    }
    if let Some(local) = wildcard.strip_prefix("*:") {
        return local_name(name) == local;
    }
    let wildcard = wildcard.strip_prefix('Q').filter(|w| w.starts_with('{')).unwrap_or(wildcard);
    let Some(ns) = wildcard.strip_prefix('{').and_then(|w| w.strip_suffix("}*")) else {
        return false;
    };
    match split_extended(name) {
        Ok((Some(own), _)) => own == ns,
        Ok((None, _)) => ns.is_empty(),
        Err(_) => false,
    }
}

/// Resolves a prefixed name (`p:local`) to extended format using `namespaces`.
/// Unprefixed names take the default namespace, if any.
pub fn get_expanded_name(qname: &str, namespaces: &Namespaces) -> Result<String, Error> {
    if qname.starts_with('{') {
        split_extended(qname)?;
        return Ok(qname.to_string());
    }
    match qname.split_once(':') {
        Some((prefix, local)) => {
            let uri = if prefix == "xml" {
                Some(XML_URI)
            } else {
                namespaces.get(prefix).map(String::as_str)
            };
            uri.map(|uri| format!("{{{uri}}}{local}")).ok_or_else(|| {
                Error::from_code(
                    ErrorCode::FONS0004,
                    format!("no namespace found for prefix {prefix:?}"),
                )
            })
        }
        None => Ok(match namespaces.get("") {
            Some(uri) if !uri.is_empty() => format!("{{{uri}}}{qname}"),
            _ => qname.to_string(),
        }),
    }
}

fn missing_prefix(uri: &str) -> Error {
    Error::from_code(
        ErrorCode::FONS0004,
        format!("no prefix found for namespace {uri:?}"),
    )
}

fn prefix_for<'a>(uri: &str, nsmap: &'a Namespaces) -> Option<&'a str> {
    if uri == XML_URI {
        return Some("xml");
    }
    nsmap
        .iter()
        .filter(|(_, u)| *u == uri)
        .map(|(p, _)| p.as_str())
        .min_by_key(|p| p.is_empty())
}

fn uri_qualified(name: Option<&str>) -> String {
    match name {
        None | Some("") => "*".to_string(),
        Some(name) if name.starts_with('{') => format!("Q{name}"),
        Some(name) => format!("Q{{}}{name}"),
    }
}

impl XPathNode {
    /// The node name resolved to a prefixed QName through the namespaces in scope.
    pub fn node_name(&self) -> Result<Option<QName>, Error> {
        let Some(name) = self.name() else {
            return Ok(None);
        };
        if matches!(self.kind(), NodeKind::Namespace | NodeKind::ProcessingInstruction) {
            return Ok(Some(QName {
                prefix: None,
                local: name,
                ns_uri: None,
            }));
        }
        let (ns, local) = split_extended(&name)?;
        let Some(ns) = ns.filter(|ns| !ns.is_empty()) else {
            return Ok(Some(QName {
                prefix: None,
                local: local.to_string(),
                ns_uri: None,
            }));
        };
        let nsmap = self.nsmap();
        let prefix = prefix_for(ns, &nsmap).ok_or_else(|| missing_prefix(ns))?;
        Ok(Some(QName {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            local: local.to_string(),
            ns_uri: Some(ns.to_string()),
        }))
    }

    /// Name test against an element or attribute name. `name` may be a wildcard,
    /// an extended name or a local name qualified by `default_namespace`.
    /// An empty name only matches unnamed nodes.
    pub fn match_name(&self, name: &str, default_namespace: Option<&str>) -> bool {
        let own = self.name();
        if name.contains('*') {
            return match_wildcard(own.as_deref(), name);
        }
        if name.is_empty() {
            return own.is_none();
        }
        if let Some(decl) = self.xsd_element() {
            return decl.is_matching(name, default_namespace);
        }
        if let Some(attr) = self.xsd_attribute() {
            return attr.is_matching(name);
        }
        match default_namespace {
            Some(ns) if self.is_element() && !ns.is_empty() && !name.starts_with('{') => {
                own.is_some_and(|own| own == format!("{{{ns}}}{name}"))
            }
            _ => own.as_deref() == Some(name),
        }
    }

    /// XPath 3.0 canonical path with `Q{uri}local` names.
    pub fn path(&self) -> String {
        let parent = self.parent();
        let parent_path = || match &parent {
            Some(p) if p.is_element() => p.path(),
            _ => String::new(),
        };
        let position = || {
            parent
                .as_ref()
                .and_then(|p| p.get_child_position(self))
                .unwrap_or(1)
        };
        match self.kind() {
            NodeKind::Document => "/".to_string(),
            NodeKind::Element => format!(
                "{}/{}[{}]",
                parent_path(),
                uri_qualified(self.name().as_deref()),
                position()
            ),
            NodeKind::Attribute => {
                format!("{}/@{}", parent_path(), uri_qualified(self.name().as_deref()))
            }
            NodeKind::Namespace => {
                let step = match self.name() {
                    Some(prefix) => format!("namespace::{prefix}"),
                    None => format!("namespace::*[Q{{{FNS}}}local-name()=\"\"]"),
                };
                format!("{}/{step}", parent_path())
            }
            NodeKind::Text => format!("{}/text()[{}]", parent_path(), position()),
            NodeKind::Comment => format!("{}/comment()[{}]", parent_path(), position()),
            NodeKind::ProcessingInstruction => format!(
                "{}/processing-instruction({})[{}]",
                parent_path(),
                self.name().unwrap_or_default(),
                position()
            ),
        }
    }

    /// Canonical path with `{uri}local` names and bare local names for no namespace.
    pub fn extended_path(&self) -> String {
        self.path().replace("Q{}", "").replace("Q{", "{")
    }

    /// Canonical path with prefixed names, resolved through the namespaces in scope.
    pub fn qname_path(&self) -> Result<String, Error> {
        let path = self.path();
        let nsmap = self.nsmap();
        let mut out = String::with_capacity(path.len());
        let mut rest = path.as_str();
        while let Some(start) = rest.find("Q{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                Error::from_code(ErrorCode::FOCA0002, format!("invalid path {path:?}"))
            })?;
            let uri = &after[..end];
            if !uri.is_empty() {
                let prefix = match prefix_for(uri, &nsmap) {
                    Some(prefix) => prefix,
                    None if uri == FNS => "fn",
                    None => return Err(missing_prefix(uri)),
                };
                if !prefix.is_empty() {
                    out.push_str(prefix);
                    out.push(':');
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Base URI from `xml:base` attributes joined up the ancestor chain.
    pub fn base_uri(&self) -> Option<String> {
        match self.kind() {
            NodeKind::Document => self.tree().uri(),
            NodeKind::Namespace => None,
            NodeKind::Element => {
                let own = self
                    .foreign()
                    .and_then(|obj| obj.get(XML_BASE).map(|v| v.trim().to_string()));
                let inherited = match self.parent() {
                    Some(parent) => parent.base_uri(),
                    None => self.tree().uri(),
                };
                match (own, inherited) {
                    (Some(own), Some(base)) => Some(join_uri(&base, &own)),
                    (own, base) => own.or(base),
                }
            }
            _ => self.parent().and_then(|p| p.base_uri()),
        }
    }

    /// URI of a document node, when it is absolute.
    pub fn document_uri(&self) -> Option<String> {
        if !self.is_document() {
            return None;
        }
        self.tree()
            .uri()
            .filter(|uri| url::Url::parse(uri).is_ok())
    }

    /// The `nilled` accessor; `None` for nodes other than elements.
    pub fn nilled(&self) -> Option<bool> {
        if !self.is_element() {
            return None;
        }
        Some(self.foreign().is_some_and(|obj| {
            obj.get(XSI_NIL)
                .is_some_and(|v| matches!(v.trim(), "true" | "1"))
        }))
    }
}

fn join_uri(base: &str, relative: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(relative))
        .map_or_else(|_| relative.to_string(), String::from)
}
