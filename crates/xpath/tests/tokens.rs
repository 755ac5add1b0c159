mod common;

use common::{MockElement, MockSchema, builtin, complex, lit, parser, seq, two_a};
use rstest::rstest;
use std::rc::Rc;
use xpath_xdm::atomic::AtomicType;
use xpath_xdm::consts::XML_URI;
use xpath_xdm::context::{ParserContext, ParserContextBuilder, XPathContext, XPathContextBuilder};
use xpath_xdm::etree::elem;
use xpath_xdm::schema::XsdElementRef;
use xpath_xdm::token::{ResultItem, Results, XPathToken};
use xpath_xdm::tokens::{
    BooleanFunction, ContextItem, DataFunction, NameStep, NumberFunction, PathStep, SequenceExpr,
    StringFunction, VariableRef,
};
use xpath_xdm::{
    AtomicValue, ErrorCode, Item, TreeOptions, TypedNode, Value, XPathNode, build_node_tree,
    build_schema_node_tree,
};

const NS: &str = "http://example.com/ns";

fn name(parser: &Rc<ParserContext>, test: &str) -> Box<dyn XPathToken> {
    Box::new(NameStep::new(parser, test).unwrap())
}

fn nodes(value: Value) -> Vec<XPathNode> {
    value
        .into_items()
        .into_iter()
        .map(|item| item.as_node().cloned().unwrap())
        .collect()
}

fn context() -> (XPathNode, XPathContext) {
    let root = build_node_tree(&two_a(), &TreeOptions::default());
    let ctx = XPathContext::new(root.clone());
    (root, ctx)
}

#[rstest]
fn absolute_path_wraps_the_root_element() {
    let p = parser();
    let (root, mut ctx) = context();
    let path = PathStep::new(
        &p,
        Box::new(PathStep::absolute(&p, Some(name(&p, "root")))),
        name(&p, "a"),
    );
    let found = nodes(path.evaluate(Some(&mut ctx)).unwrap());
    assert_eq!(found, root.children());
    assert!(root.tree().root().is_document());
    assert_eq!(root.parent(), Some(root.tree().root()));

    let document = PathStep::absolute(&p, None).evaluate(Some(&mut ctx)).unwrap();
    assert_eq!(nodes(document), [root.tree().root()]);
}

#[rstest]
fn relative_name_steps_select_child_elements() {
    let p = parser();
    let (root, mut ctx) = context();
    let step = NameStep::new(&p, "a").unwrap();
    assert_eq!(nodes(step.evaluate(Some(&mut ctx)).unwrap()), root.children());
    let none = NameStep::new(&p, "b").unwrap();
    assert!(none.evaluate(Some(&mut ctx)).unwrap().is_empty());
    let any = NameStep::new(&p, "*").unwrap();
    assert_eq!(any.evaluate(Some(&mut ctx)).unwrap().len(), 2);
}

#[rstest]
fn select_keeps_the_context_item_on_the_last_item() {
    let p = parser();
    let (root, mut ctx) = context();
    let step = NameStep::new(&p, "a").unwrap();
    let items = step
        .select(Some(&mut ctx))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(ctx.item, Some(Item::Node(root.children()[1].clone())));

    // The default selection of an evaluated token moves the item as well.
    let mut ctx = XPathContextBuilder::new().with_item(5i64).build();
    let literal = seq(&p, vec![lit(&p, 1i64), lit(&p, 2i64)]);
    let items = literal.select(Some(&mut ctx)).collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(items, [Item::from(1i64), Item::from(2i64)]);
    assert_eq!(ctx.item, Some(Item::from(2i64)));
}

#[rstest]
fn name_step_context_errors() {
    let p = parser();
    let step = NameStep::new(&p, "a").unwrap();
    let err = step.evaluate(None).unwrap_err();
    assert_eq!(err.code, ErrorCode::XPDY0002);
    let mut ctx = XPathContextBuilder::new().with_item(1i64).build();
    assert_eq!(step.evaluate(Some(&mut ctx)).unwrap_err().code, ErrorCode::XPTY0020);
}

#[rstest]
fn path_step_result_errors() {
    let p = parser();
    let (_, mut ctx) = context();

    let atomic_left = PathStep::new(&p, lit(&p, 1i64), name(&p, "a"));
    let err = atomic_left.evaluate(Some(&mut ctx)).unwrap_err();
    assert_eq!(err.code, ErrorCode::XPTY0019);

    let mixed = PathStep::new(
        &p,
        name(&p, "a"),
        seq(&p, vec![Box::new(ContextItem::new(&p)) as Box<dyn XPathToken>, lit(&p, 1i64)]),
    );
    assert_eq!(mixed.evaluate(Some(&mut ctx)).unwrap_err().code, ErrorCode::XPTY0018);

    // Atomic results alone are fine and keep their order.
    let atomics = PathStep::new(&p, name(&p, "a"), lit(&p, 3i64));
    assert_eq!(
        atomics.evaluate(Some(&mut ctx)).unwrap(),
        Value::Sequence(vec![Item::from(3i64), Item::from(3i64)])
    );
}

#[rstest]
fn path_results_are_deduplicated_in_document_order() {
    let p = parser();
    let (root, mut ctx) = context();
    let twice = seq(
        &p,
        vec![
            Box::new(ContextItem::new(&p)) as Box<dyn XPathToken>,
            Box::new(ContextItem::new(&p)),
        ],
    );
    assert_eq!(twice.evaluate(Some(&mut ctx)).unwrap().len(), 2);
    let path = PathStep::new(&p, twice, name(&p, "a"));
    assert_eq!(nodes(path.evaluate(Some(&mut ctx)).unwrap()), root.children());
}

#[rstest]
fn prefixed_names_are_resolved_by_the_parser() {
    let p = Rc::new(ParserContextBuilder::new().with_namespace("ex", NS).build());
    let step = NameStep::new(&p, "ex:foo").unwrap();
    assert_eq!(step.name_test(), format!("{{{NS}}}foo"));

    let obj = elem("root")
        .child(elem(&format!("{{{NS}}}foo")))
        .child(elem("foo"))
        .build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let mut ctx = XPathContext::new(root.clone());
    assert_eq!(nodes(step.evaluate(Some(&mut ctx)).unwrap()), [root.children()[0].clone()]);

    let wildcard = NameStep::new(&p, "*:foo").unwrap();
    assert_eq!(wildcard.evaluate(Some(&mut ctx)).unwrap().len(), 2);
}

#[rstest]
#[case::undeclared_prefix("zz:a", ErrorCode::XPST0081)]
#[case::function_namespace("fn:a", ErrorCode::XPST0003)]
fn unbindable_names(#[case] test: &str, #[case] code: ErrorCode) {
    let p = parser();
    assert_eq!(NameStep::new(&p, test).unwrap_err().code, code);
}

#[rstest]
fn default_element_namespace() {
    let p = Rc::new(ParserContextBuilder::new().with_default_namespace(NS).build());
    let obj = elem("root").child(elem(&format!("{{{NS}}}foo"))).build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let mut ctx = XPathContext::new(root);
    let step = NameStep::new(&p, "foo").unwrap();
    assert_eq!(step.evaluate(Some(&mut ctx)).unwrap().len(), 1);
}

fn schema_root() -> XPathNode {
    let decl = MockElement::new("root", Some(complex("rootType")));
    decl.add_child(MockElement::new("a", Some(builtin("integer", AtomicType::Integer))));
    let decl: XsdElementRef = decl;
    build_schema_node_tree(&decl, &TreeOptions::default())
}

#[rstest]
fn name_steps_bind_schema_types() {
    let p = parser();
    let schema_root = schema_root();
    let step = NameStep::new(&p, "a").unwrap();
    let mut ctx = XPathContext::new(schema_root.clone());
    let value = step.evaluate(Some(&mut ctx)).unwrap();
    assert_eq!(
        value,
        Value::Sequence(vec![Item::Typed(TypedNode {
            node: schema_root.children()[0].clone(),
            values: vec![AtomicValue::Integer(1)],
        })])
    );
    assert!(step.core().xsd_types().contains_key("a"));
    assert!(step.core().get_xsd_type_by_name("a").is_some());

    // The bound type now decodes instance nodes of the same name.
    let (root, mut ctx) = context();
    let typed = step.evaluate(Some(&mut ctx)).unwrap().into_items();
    assert_eq!(
        typed[1],
        Item::Typed(TypedNode {
            node: root.children()[1].clone(),
            values: vec![AtomicValue::Integer(2)],
        })
    );

    let bad = build_node_tree(&elem("root").child(elem("a").text("x")).build(), &TreeOptions::default());
    let mut ctx = XPathContext::new(bad);
    assert_eq!(step.evaluate(Some(&mut ctx)).unwrap_err().code, ErrorCode::XPDY0050);
}

#[rstest]
fn schema_nodes_in_schema_context() {
    let p = Rc::new(ParserContextBuilder::new().with_schema(MockSchema::integers()).build());
    let schema_root = schema_root();
    let mut ctx = XPathContextBuilder::new()
        .with_root(schema_root)
        .with_schema_context(true)
        .build();
    let data = DataFunction::new(&p, name(&p, "a")).unwrap();
    assert_eq!(data.evaluate(Some(&mut ctx)).unwrap(), Value::Sequence(vec![Item::from(1i64)]));
}

#[rstest]
fn results_collapse_scalars() {
    let p = parser();
    let one: Box<dyn XPathToken> = lit(&p, 1i64);
    assert_eq!(one.get_results(None).unwrap(), Results::Scalar(AtomicValue::Integer(1)));
    let text: Box<dyn XPathToken> = lit(&p, "s");
    assert_eq!(text.get_results(None).unwrap().as_scalar(), Some(&AtomicValue::string("s")));

    let (_, mut ctx) = context();
    let boolean: Box<dyn XPathToken> = Box::new(BooleanFunction::new(&p, name(&p, "a")).unwrap());
    assert_eq!(boolean.get_results(Some(&mut ctx)).unwrap(), Results::Scalar(AtomicValue::Boolean(true)));

    let mut ctx = XPathContextBuilder::new().with_item("x").build();
    let item: Box<dyn XPathToken> = Box::new(ContextItem::new(&p));
    assert_eq!(
        item.get_results(Some(&mut ctx)).unwrap(),
        Results::Sequence(vec![ResultItem::Atomic(AtomicValue::string("x"))])
    );
    let empty = seq(&p, vec![]);
    assert!(empty.get_results(None).unwrap().is_empty());
}

#[rstest]
fn results_of_attribute_namespace_and_text_nodes() {
    let p = parser();
    let obj = elem("root").attr("id", "r1").text("hello").build();
    let root = build_node_tree(&obj, &TreeOptions::default());
    let item: Box<dyn XPathToken> = Box::new(ContextItem::new(&p));
    let results = |node: XPathNode| {
        let mut ctx = XPathContextBuilder::new().with_item(node).build();
        item.select_results(Some(&mut ctx)).unwrap()
    };

    assert_eq!(
        results(root.attribute("id").unwrap()),
        [ResultItem::Attribute {
            name: "id".to_string(),
            value: "r1".to_string()
        }]
    );
    assert_eq!(
        results(root.namespace_nodes().get(0).unwrap()),
        [ResultItem::Namespace {
            prefix: "xml".to_string(),
            uri: XML_URI.to_string()
        }]
    );
    assert_eq!(
        results(root.children()[0].clone()),
        [ResultItem::Atomic(AtomicValue::string("hello"))]
    );
    assert_eq!(results(root.clone()), [ResultItem::Node(root)]);
}

#[rstest]
fn variable_references() {
    let p = parser();
    let var = VariableRef::new(&p, "x");
    let mut ctx = XPathContextBuilder::new()
        .with_variable("x", AtomicValue::Integer(1))
        .build();
    assert_eq!(var.evaluate(Some(&mut ctx)).unwrap(), Value::Single(Item::from(1i64)));
    assert_eq!(var.core().name().as_deref(), Some("x"));

    let unknown = VariableRef::new(&p, "y");
    assert_eq!(unknown.evaluate(Some(&mut ctx)).unwrap_err().code, ErrorCode::XPST0008);
    assert_eq!(var.evaluate(None).unwrap_err().code, ErrorCode::XPDY0002);
}

#[rstest]
fn leaf_elements_of_a_path() {
    let p = parser();
    let path = PathStep::new(&p, name(&p, "a"), name(&p, "b"));
    assert_eq!(path.core().iter_leaf_elements(), ["b"]);

    let sequence = SequenceExpr::new(
        &p,
        vec![
            name(&p, "a"),
            Box::new(PathStep::new(&p, name(&p, "b"), name(&p, "c"))),
            lit(&p, 1i64),
        ],
    );
    assert_eq!(sequence.core().iter_leaf_elements(), ["a", "c"]);
}

#[rstest]
fn boolean_function() {
    let p = parser();
    let (_, mut ctx) = context();
    let eval = |arg: Box<dyn XPathToken>, ctx: &mut XPathContext| {
        BooleanFunction::new(&p, arg).unwrap().evaluate(Some(ctx))
    };
    assert_eq!(eval(name(&p, "a"), &mut ctx).unwrap(), Value::Single(Item::from(true)));
    assert_eq!(eval(seq(&p, vec![]), &mut ctx).unwrap(), Value::Single(Item::from(false)));
    assert_eq!(eval(lit(&p, ""), &mut ctx).unwrap(), Value::Single(Item::from(false)));
    let err = eval(seq(&p, vec![lit(&p, 1i64), lit(&p, 2i64)]), &mut ctx).unwrap_err();
    assert_eq!(err.code, ErrorCode::FORG0006);
    // The argument is evaluated on a copy of the context.
    assert!(matches!(&ctx.item, Some(Item::Node(node)) if node.name().as_deref() == Some("root")));
}

#[rstest]
fn string_and_number_functions() {
    let p = parser();
    let (root, mut ctx) = context();
    let string = StringFunction::new(&p, None).unwrap();
    assert_eq!(string.evaluate(Some(&mut ctx)).unwrap(), Value::Single(Item::from("12")));
    assert_eq!(string.evaluate(None).unwrap_err().code, ErrorCode::XPDY0002);

    let mut item_ctx = XPathContextBuilder::new()
        .with_root(root.clone())
        .with_item(root.children()[0].clone())
        .build();
    let number = NumberFunction::new(&p, None).unwrap();
    assert_eq!(number.evaluate(Some(&mut item_ctx)).unwrap(), Value::Single(Item::from(1.0)));

    let nan = NumberFunction::new(&p, Some(lit(&p, "abc"))).unwrap();
    assert!(matches!(
        nan.evaluate(None).unwrap(),
        Value::Single(Item::Atomic(AtomicValue::Double(d))) if d.is_nan()
    ));
}

#[rstest]
fn data_function() {
    let p = parser();
    let (root, mut ctx) = context();
    let data = DataFunction::new(&p, name(&p, "a")).unwrap();
    assert_eq!(
        data.evaluate(Some(&mut ctx)).unwrap(),
        Value::Sequence(vec![
            Item::Atomic(AtomicValue::untyped("1")),
            Item::Atomic(AtomicValue::untyped("2")),
        ])
    );

    let schema: xpath_xdm::SchemaRef = MockSchema::integers();
    root.apply_schema(&schema);
    assert_eq!(
        data.evaluate(Some(&mut ctx)).unwrap(),
        Value::Sequence(vec![Item::from(1i64), Item::from(2i64)])
    );
    let whole = DataFunction::new(&p, Box::new(ContextItem::new(&p))).unwrap();
    assert_eq!(whole.evaluate(Some(&mut ctx)).unwrap_err().code, ErrorCode::FOTY0012);
}
