use rstest::rstest;
use xpath_xdm::consts::XML_URI;
use xpath_xdm::etree::{Namespaces, elem, pi};
use xpath_xdm::nodes::{get_expanded_name, match_wildcard};
use xpath_xdm::{ErrorCode, ErrorKind, TreeOptions, build_node_tree};

const NS: &str = "http://example.com/ns";

#[rstest]
#[case("*", true)]
#[case("*:*", true)]
#[case("*:foo", true)]
#[case("*:bar", false)]
#[case("{http://example.com/ns}*", true)]
#[case("Q{http://example.com/ns}*", true)]
#[case("{other}*", false)]
#[case("{}*", false)]
fn wildcard_tests_on_a_namespaced_element(#[case] test: &str, #[case] expected: bool) {
    let obj = elem(&format!("{{{NS}}}foo")).build();
    let node = build_node_tree(&obj, &TreeOptions::default());
    assert_eq!(node.match_name(test, Some(NS)), expected, "{test}");
}

#[rstest]
fn empty_namespace_wildcard() {
    assert!(match_wildcard(Some("foo"), "{}*"));
    assert!(match_wildcard(Some("foo"), "Q{}*"));
    assert!(!match_wildcard(Some("{x}foo"), "{}*"));
    assert!(!match_wildcard(None, "*"));
    assert!(!match_wildcard(Some("foo"), "foo"));
}

#[rstest]
#[case("{http://example.com/ns}foo", None, true)]
#[case("foo", Some(NS), true)]
#[case("foo", None, false)]
#[case("foo", Some(""), false)]
#[case("bar", Some(NS), false)]
fn names_with_default_namespace(
    #[case] test: &str,
    #[case] default_namespace: Option<&str>,
    #[case] expected: bool,
) {
    let obj = elem(&format!("{{{NS}}}foo")).build();
    let node = build_node_tree(&obj, &TreeOptions::default());
    assert_eq!(node.match_name(test, default_namespace), expected);
}

#[rstest]
#[case::plain("id", Some(NS), true)]
#[case::without_default("id", None, true)]
#[case::qualified("{http://example.com/ns}id", Some(NS), false)]
#[case::namespaced_attribute("{http://example.com/ns}lang", Some(NS), true)]
#[case::unqualified_test_for_namespaced_attribute("lang", Some(NS), false)]
fn default_namespace_does_not_apply_to_attributes(
    #[case] test: &str,
    #[case] default_namespace: Option<&str>,
    #[case] expected: bool,
) {
    let obj = elem("root")
        .attr("id", "1")
        .attr(&format!("{{{NS}}}lang"), "en")
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let matched = root
        .attributes()
        .iter()
        .any(|attr| attr.match_name(test, default_namespace));
    assert_eq!(matched, expected, "{test}");
}

#[rstest]
fn empty_name_matches_unnamed_nodes_only() {
    let obj = elem("root").text("x").build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let text = root.children()[0].clone();
    assert!(text.match_name("", None));
    assert!(!root.match_name("", None));
    assert!(root.match_name("root", None));
}

#[rstest]
fn expanded_names() {
    let mut namespaces = Namespaces::new();
    namespaces.insert("p".to_string(), NS.to_string());
    assert_eq!(get_expanded_name("p:a", &namespaces).unwrap(), format!("{{{NS}}}a"));
    assert_eq!(get_expanded_name("xml:lang", &namespaces).unwrap(), format!("{{{XML_URI}}}lang"));
    assert_eq!(get_expanded_name("a", &namespaces).unwrap(), "a");
    assert_eq!(get_expanded_name("{x}a", &namespaces).unwrap(), "{x}a");

    let err = get_expanded_name("q:a", &namespaces).unwrap_err();
    assert_eq!(err.code, ErrorCode::FONS0004);
    assert_eq!(err.kind(), ErrorKind::Name);

    namespaces.insert(String::new(), "http://example.com/default".to_string());
    assert_eq!(get_expanded_name("a", &namespaces).unwrap(), "{http://example.com/default}a");
    assert_eq!(get_expanded_name("{bad", &namespaces).unwrap_err().code, ErrorCode::FOCA0002);
}

#[rstest]
fn node_names_resolve_prefixes() {
    let obj = elem(&format!("{{{NS}}}foo"))
        .namespace("ex", NS)
        .attr("plain", "1")
        .child(pi("target", "x"))
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let name = root.node_name().unwrap().unwrap();
    assert_eq!(name.prefix.as_deref(), Some("ex"));
    assert_eq!(name.local, "foo");
    assert_eq!(name.ns_uri.as_deref(), Some(NS));
    assert_eq!(name.to_string(), "ex:foo");

    let attr = root.attribute("plain").unwrap();
    assert_eq!(attr.node_name().unwrap().unwrap().qualified(), "plain");

    let target = root.children()[0].clone();
    assert_eq!(target.node_name().unwrap().unwrap().local, "target");

    let xml = root.namespace_nodes().get(0).unwrap();
    assert_eq!(xml.node_name().unwrap().unwrap().local, "xml");
}

#[rstest]
fn default_namespace_gives_unprefixed_name() {
    let obj = elem(&format!("{{{NS}}}foo")).namespace("", NS).build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let name = root.node_name().unwrap().unwrap();
    assert_eq!(name.prefix, None);
    assert_eq!(name.ns_uri.as_deref(), Some(NS));
    assert_eq!(root.default_namespace().as_deref(), Some(NS));
}

#[rstest]
fn unmapped_namespace_is_a_name_error() {
    let obj = elem("{http://example.com/unmapped}foo").build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    assert_eq!(root.node_name().unwrap_err().code, ErrorCode::FONS0004);
    assert!(root.qname_path().is_err());
}

#[rstest]
fn malformed_name_is_a_value_error() {
    let obj = elem("{broken").build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let err = root.node_name().unwrap_err();
    assert_eq!(err.code, ErrorCode::FOCA0002);
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[rstest]
fn text_nodes_have_no_name() {
    let obj = elem("root").text("x").build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    assert_eq!(root.children()[0].node_name().unwrap(), None);
}
