mod common;

use common::two_a;
use rstest::rstest;
use xpath_xdm::consts::{XML_BASE, XML_URI, XSI_NIL};
use xpath_xdm::etree::{comment, document, elem, pi};
use xpath_xdm::{NodeKind, TreeOptions, XPathNode, build_document_node_tree, build_lazy_node_tree, build_node_tree};

fn positions(nodes: impl Iterator<Item = XPathNode>) -> Vec<usize> {
    nodes.map(|n| n.position()).collect()
}

fn is_strictly_increasing(values: &[usize]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

#[rstest]
fn two_children_have_increasing_positions() {
    let root = build_node_tree(&two_a(), &TreeOptions::default());
    let children = root.children();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c.name().as_deref() == Some("a")));
    assert!(children[0].position() < children[1].position());
    assert_eq!(root.get_child_position(&children[0]), Some(1));
    assert_eq!(root.get_child_position(&children[1]), Some(2));
}

#[rstest]
fn root_layout() {
    let root = build_node_tree(&two_a(), &TreeOptions::default());
    assert_eq!(root.position(), 1);
    let ns = root.namespace_nodes();
    assert_eq!(ns.len(), 1);
    let xml = ns.get(0).unwrap();
    assert_eq!(xml.position(), 2);
    assert_eq!(xml.name().as_deref(), Some("xml"));
    assert_eq!(xml.value().as_deref(), Some(XML_URI));
    // a, then its xml namespace node, then its text
    let first = root.children()[0].clone();
    assert_eq!(first.position(), 3);
    assert_eq!(first.children()[0].position(), 5);
    assert_eq!(root.children()[1].position(), 6);
}

#[rstest]
fn attribute_positions_follow_namespace_nodes() {
    let obj = elem("e")
        .namespace("p", "http://example.com/p")
        .attr("x", "1")
        .attr("y", "2")
        .build();
    let node = build_node_tree(&obj, &TreeOptions::default());
    let p = node.position();
    let attrs = node.attributes();
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs.get(0).unwrap().position(), p + 2 + 1);
    assert_eq!(attrs.get(1).unwrap().position(), p + 2 + 2);
    assert_eq!(node.namespace_nodes().len(), 2);
}

#[rstest]
fn document_order_is_a_total_order() {
    let obj = elem("root")
        .namespace("", "http://example.com/default")
        .attr("id", "r")
        .text("head")
        .child(elem("a").attr("k", "v").text("1").tail("between"))
        .child(comment("note").tail("after"))
        .child(pi("target", "data"))
        .child(elem("b").child(elem("c").attr("z", "0")))
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let all = positions(root.iter());
    assert!(is_strictly_increasing(&all), "{all:?}");
    // Repeated traversal does not renumber anything.
    assert_eq!(all, positions(root.iter()));
}

#[rstest]
fn lazy_tree_matches_eager_positions() {
    let obj = elem("root")
        .attr("id", "r")
        .child(elem("a").text("1").tail("t"))
        .child(elem("b").namespace("q", "http://example.com/q").child(elem("c").attr("x", "y")))
        .child(comment("c"))
        .build();
    let eager = build_node_tree(&obj, &TreeOptions::default());
    let lazy = build_lazy_node_tree(&obj, &TreeOptions::default());
    let eager_positions = positions(eager.iter());
    let lazy_positions = positions(lazy.iter());
    assert_eq!(eager_positions, lazy_positions);
    assert!(is_strictly_increasing(&lazy_positions));
}

#[rstest]
fn lazy_children_are_built_once() {
    let lazy = build_lazy_node_tree(&two_a(), &TreeOptions::default());
    assert!(lazy.is_lazy());
    assert_eq!(lazy.iter_lazy().count(), 1);
    let first = lazy.children();
    assert_eq!(lazy.iter_lazy().count(), 3);
    let second = lazy.children();
    assert_eq!(first, second);
    assert_eq!(lazy.tree().len(), 3);
}

#[rstest]
fn iter_lazy_does_not_create_nodes() {
    let root = build_node_tree(&two_a(), &TreeOptions::default());
    let before = root.tree().len();
    let visited = root.iter_lazy().count();
    assert_eq!(root.tree().len(), before);
    assert_eq!(visited, before);
    let full = root.iter().count();
    assert!(full > visited);
}

#[rstest]
fn cached_attribute_and_namespace_lists() {
    let obj = elem("e").attr("a", "1").build();
    let node = build_node_tree(&obj, &TreeOptions::default());
    assert!(node.attributes().ptr_eq(&node.attributes()));
    assert!(node.namespace_nodes().ptr_eq(&node.namespace_nodes()));
    let attr = node.attribute("a").unwrap();
    assert_eq!(attr.parent(), Some(node.clone()));
    assert_eq!(attr.value().as_deref(), Some("1"));
}

#[rstest]
fn string_values() {
    let obj = elem("root")
        .text("Hello")
        .child(elem("child").text("x").tail("tail"))
        .child(comment("note").tail("end"))
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    assert_eq!(root.string_value(), "Helloxtailend");
    let kinds: Vec<NodeKind> = root.children().iter().map(XPathNode::kind).collect();
    assert_eq!(
        kinds,
        [NodeKind::Text, NodeKind::Element, NodeKind::Text, NodeKind::Comment, NodeKind::Text]
    );
    assert_eq!(root.children()[3].string_value(), "note");
    assert_eq!(root.children()[3].node_kind(), "comment");
}

#[rstest]
fn processing_instruction_is_named_by_target() {
    let obj = elem("root").child(pi("xml-stylesheet", "href='s.css'")).build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let node = root.children()[0].clone();
    assert_eq!(node.kind(), NodeKind::ProcessingInstruction);
    assert_eq!(node.name().as_deref(), Some("xml-stylesheet"));
    assert_eq!(node.string_value(), "href='s.css'");
    assert_eq!(node.path(), "/Q{}root[1]/processing-instruction(xml-stylesheet)[1]");
}

#[rstest]
fn canonical_paths() {
    let obj = elem("root")
        .child(elem("a").attr("id", "1"))
        .child(elem("{http://example.com/ns}a").text("x"))
        .child(elem("a"))
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default().with_namespace("ex", "http://example.com/ns"));
    let children = root.children();
    assert_eq!(root.path(), "/Q{}root[1]");
    assert_eq!(children[2].path(), "/Q{}root[1]/Q{}a[2]");
    assert_eq!(children[1].path(), "/Q{}root[1]/Q{http://example.com/ns}a[1]");
    assert_eq!(children[1].extended_path(), "/root[1]/{http://example.com/ns}a[1]");
    assert_eq!(children[1].qname_path().unwrap(), "/root[1]/ex:a[1]");
    let id = children[0].attribute("id").unwrap();
    assert_eq!(id.path(), "/Q{}root[1]/Q{}a[1]/@Q{}id");
    assert_eq!(
        children[1].children()[0].path(),
        "/Q{}root[1]/Q{http://example.com/ns}a[1]/text()[1]"
    );
}

#[rstest]
fn document_tree_children() {
    let doc = document()
        .child(comment("before"))
        .child(elem("root").child(elem("a")))
        .uri("http://example.com/doc.xml")
        .build();
    let node = build_document_node_tree(&doc, &TreeOptions::default());
    assert!(node.is_document());
    assert_eq!(node.position(), 1);
    assert_eq!(node.children().len(), 2);
    assert!(node.is_extended().unwrap());
    let root = node.getroot().unwrap();
    assert_eq!(root.name().as_deref(), Some("root"));
    assert_eq!(root.parent(), Some(node.clone()));
    assert_eq!(node.document_uri().as_deref(), Some("http://example.com/doc.xml"));
    assert_eq!(node.path(), "/");
    assert!(is_strictly_increasing(&positions(node.iter())));
}

#[rstest]
fn single_element_document_is_not_extended() {
    let doc = document().child(elem("root")).build();
    let node = build_document_node_tree(&doc, &TreeOptions::default());
    assert!(!node.is_extended().unwrap());
    assert_eq!(node.document_uri(), None);
}

#[rstest]
fn empty_document_has_no_root() {
    let doc = document().build();
    let node = build_document_node_tree(&doc, &TreeOptions::default());
    assert_eq!(node.getroot().unwrap_err().code.local(), "FOER0000");
    assert!(node.is_extended().is_err());
}

#[rstest]
#[case::wrapped(false, 1)]
#[case::replaced(true, 2)]
fn dummy_document_node(#[case] replace: bool, #[case] children: usize) {
    let root = build_node_tree(&two_a(), &TreeOptions::default());
    let doc = root.get_document_node(replace, true);
    assert!(doc.is_document());
    assert_eq!(doc.children().len(), children);
    assert_eq!(root.tree().root(), doc);
    for child in doc.children() {
        assert_eq!(child.parent(), Some(doc.clone()));
    }
    // An existing document node is returned as it is.
    assert_eq!(doc.get_document_node(replace, true), doc);
}

#[rstest]
fn dummy_document_without_reparenting() {
    let root = build_node_tree(&two_a(), &TreeOptions::default());
    let doc = root.get_document_node(false, false);
    assert!(doc.is_document());
    assert_eq!(root.parent(), None);
    assert_eq!(doc.children(), vec![root.clone()]);
    assert!(doc.position() < root.position());
}

#[rstest]
fn element_node_lookup_by_identity() {
    let obj = two_a();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let child = obj.children()[1].clone();
    let node = root.get_element_node(&child).unwrap();
    assert_eq!(node, root.children()[1]);
    let foreign = elem("a").text("2").build();
    assert!(root.get_element_node(&foreign).is_none());
}

#[rstest]
fn base_and_document_uris() {
    let obj = elem("root")
        .attr(XML_BASE, "sub/")
        .child(elem("a"))
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default().with_uri("http://example.com/dir/doc.xml"));
    assert_eq!(root.base_uri().as_deref(), Some("http://example.com/dir/sub/"));
    assert_eq!(root.children()[0].base_uri().as_deref(), Some("http://example.com/dir/sub/"));
    assert_eq!(root.namespace_nodes().get(0).unwrap().base_uri(), None);
    assert_eq!(root.document_uri(), None);
}

#[rstest]
#[case("true", Some(true))]
#[case(" 1 ", Some(true))]
#[case("false", Some(false))]
fn nilled_elements(#[case] value: &str, #[case] expected: Option<bool>) {
    let obj = elem("root").attr(XSI_NIL, value).text("x").build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    assert_eq!(root.nilled(), expected);
    assert_eq!(root.children()[0].nilled(), None);
}

#[rstest]
fn descendants_skip_attributes_and_namespaces() {
    let obj = elem("root")
        .attr("id", "1")
        .child(elem("a").text("x"))
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let kinds: Vec<NodeKind> = root.iter_descendants(true).map(|n| n.kind()).collect();
    assert_eq!(kinds, [NodeKind::Element, NodeKind::Element, NodeKind::Text]);
    assert_eq!(root.iter_descendants(false).count(), 2);
}
