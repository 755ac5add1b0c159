//! Namespace URIs, reserved names and collation URIs shared across the crate.

pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const FNS: &str = "http://www.w3.org/2005/xpath-functions";
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";

pub const XML_BASE: &str = "{http://www.w3.org/XML/1998/namespace}base";
pub const XML_ID: &str = "{http://www.w3.org/XML/1998/namespace}id";
pub const XSI_TYPE: &str = "{http://www.w3.org/2001/XMLSchema-instance}type";
pub const XSI_NIL: &str = "{http://www.w3.org/2001/XMLSchema-instance}nil";

pub const XSD_ANY_TYPE: &str = "{http://www.w3.org/2001/XMLSchema}anyType";
pub const XSD_ANY_SIMPLE_TYPE: &str = "{http://www.w3.org/2001/XMLSchema}anySimpleType";
pub const XSD_ANY_ATOMIC_TYPE: &str = "{http://www.w3.org/2001/XMLSchema}anyAtomicType";
pub const XSD_UNTYPED: &str = "{http://www.w3.org/2001/XMLSchema}untyped";
pub const XSD_UNTYPED_ATOMIC: &str = "{http://www.w3.org/2001/XMLSchema}untypedAtomic";
pub const XSD_IDREF: &str = "{http://www.w3.org/2001/XMLSchema}IDREF";
pub const XSD_IDREFS: &str = "{http://www.w3.org/2001/XMLSchema}IDREFS";

/// Types whose values are never decoded, only carried as untyped atomics.
pub const XSD_SPECIAL_TYPES: [&str; 3] = [XSD_ANY_TYPE, XSD_ANY_SIMPLE_TYPE, XSD_ANY_ATOMIC_TYPE];

pub const CODEPOINT_URI: &str = "http://www.w3.org/2005/xpath-functions/collation/codepoint";
pub const SIMPLE_CASE_URI: &str = "urn:xpath-xdm:collation:simple-case";
pub const SIMPLE_ACCENT_URI: &str = "urn:xpath-xdm:collation:simple-accent";
pub const SIMPLE_CASE_ACCENT_URI: &str = "urn:xpath-xdm:collation:simple-case-accent";

pub(crate) fn is_special_type(name: Option<&str>) -> bool {
    name.is_some_and(|n| XSD_SPECIAL_TYPES.contains(&n))
}
