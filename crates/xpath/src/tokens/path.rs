use crate::context::{ParserContext, XPathContext};
use crate::error::Error;
use crate::nodes::XPathNode;
use crate::sequence::{Item, Value};
use crate::token::{Label, Selection, TokenCore, XPathToken, select_on_copy};
use std::collections::HashSet;
use std::iter;
use std::rc::Rc;

/// Name test on the child axis: `name`, `prefix:name`, `{uri}name` or a wildcard.
#[derive(Debug)]
pub struct NameStep {
    core: TokenCore,
    test: String,
}

impl NameStep {
    /// Prefixed names are resolved with the parser namespaces.
    pub fn new(parser: &Rc<ParserContext>, name: &str) -> Result<Self, Error> {
        let symbol = if name.contains('*') { "*" } else { "(name)" };
        let core = TokenCore::new(parser.clone(), symbol, Label::Symbol).with_value(name);
        let test = match name.split_once(':') {
            Some((prefix, local))
                if !name.starts_with('{') && !name.starts_with("Q{") && prefix != "*" =>
            {
                let uri = core.parser().namespaces.get(prefix).cloned().ok_or_else(|| {
                    core.unknown_namespace(Some(&format!("prefix {prefix:?} is not declared")))
                })?;
                core.bind_namespace(&uri)?;
                format!("{{{uri}}}{local}")
            }
            _ => name.to_string(),
        };
        Ok(Self { core, test })
    }

    /// The name test in extended form.
    pub fn name_test(&self) -> &str {
        &self.test
    }

    fn matching_children(&self, node: &XPathNode, schema_context: bool) -> Vec<Item> {
        let default_namespace = self.core.parser().default_namespace.as_deref();
        if node.is_schema_node() || schema_context {
            let canonical = node.schema_reference().unwrap_or_else(|| node.clone());
            return canonical
                .children()
                .iter()
                .filter_map(|child| self.core.match_xsd_type(child, &self.test))
                .collect();
        }
        node.children()
            .into_iter()
            .filter(|child| child.is_element() && child.match_name(&self.test, default_namespace))
            .map(Item::Node)
            .collect()
    }
}

impl XPathToken for NameStep {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn select<'a>(&'a self, context: Option<&'a mut XPathContext>) -> Selection<'a> {
        let Some(ctx) = context else {
            return Box::new(iter::once(Err(self.core.missing_context(None))));
        };
        let Some(item) = ctx.current() else {
            return Box::new(iter::once(Err(self.core.missing_context(None))));
        };
        let Some(node) = item.as_node() else {
            return Box::new(iter::once(Err(self.core.wrong_axis_argument(None))));
        };
        let children = self.matching_children(node, ctx.schema_context);
        Box::new(children.into_iter().map(move |child| {
            let item = self.core.get_typed_node(child)?;
            ctx.item = Some(item.clone());
            Ok(item)
        }))
    }
}

/// Path operator `/`, absolute with zero or one operand.
#[derive(Debug)]
pub struct PathStep {
    core: TokenCore,
}

impl PathStep {
    pub fn new(parser: &Rc<ParserContext>, left: Box<dyn XPathToken>, right: Box<dyn XPathToken>) -> Self {
        Self {
            core: TokenCore::new(parser.clone(), "/", Label::Operator)
                .with_child(left)
                .with_child(right),
        }
    }

    pub fn absolute(parser: &Rc<ParserContext>, right: Option<Box<dyn XPathToken>>) -> Self {
        Self {
            core: TokenCore::new(parser.clone(), "/", Label::Operator).with_children(right),
        }
    }

    /// Document node of the context. A tree rooted at an element gets a dummy
    /// document wrapping it.
    fn document(&self, ctx: &XPathContext) -> Result<XPathNode, Error> {
        let root = match ctx.root.as_ref() {
            Some(root) => root.clone(),
            None => ctx
                .current()
                .and_then(|item| item.as_node().map(XPathNode::root))
                .ok_or_else(|| self.core.missing_context(None))?,
        };
        if root.is_document() {
            return Ok(root);
        }
        Ok(root.get_document_node(false, true))
    }
}

impl XPathToken for PathStep {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let ctx = context.ok_or_else(|| self.core.missing_context(None))?;
        let (left_items, right) = match self.core.children() {
            [] => return Ok(Value::Sequence(vec![Item::Node(self.document(ctx)?)])),
            [right] => (vec![Item::Node(self.document(ctx)?)], right),
            [left, right] => {
                let mut local = ctx.clone();
                let items = left.select(Some(&mut local)).collect::<Result<Vec<_>, _>>()?;
                (items, right)
            }
            _ => return Err(self.core.wrong_nargs(Some("a path step has at most two operands"))),
        };

        let mut results = Vec::new();
        for item in left_items {
            if !item.is_node() {
                return Err(self.core.wrong_intermediate_step_result(None));
            }
            let mut local = ctx.clone();
            local.item = Some(item);
            for result in right.select(Some(&mut local)) {
                results.push(result?);
            }
        }

        let nodes = results.iter().filter(|item| item.is_node()).count();
        if nodes > 0 && nodes < results.len() {
            return Err(self.core.wrong_step_result(None));
        }
        if nodes > 0 {
            sort_in_document_order(&mut results);
        }
        Ok(Value::from(results))
    }
}

/// Sorts nodes of one tree by position and drops duplicates. Nodes of
/// different trees keep their order.
fn sort_in_document_order(items: &mut Vec<Item>) {
    let same_tree = items.windows(2).all(|pair| match (pair[0].as_node(), pair[1].as_node()) {
        (Some(a), Some(b)) => a.tree().ptr_eq(b.tree()),
        _ => false,
    });
    if same_tree {
        items.sort_by_key(|item| item.as_node().map_or(0, XPathNode::position));
    }
    let mut seen = HashSet::with_capacity(items.len());
    items.retain(|item| item.as_node().is_none_or(|node| seen.insert(node.clone())));
}

/// Sequence constructor `,`.
#[derive(Debug)]
pub struct SequenceExpr {
    core: TokenCore,
}

impl SequenceExpr {
    pub fn new(parser: &Rc<ParserContext>, operands: Vec<Box<dyn XPathToken>>) -> Self {
        Self {
            core: TokenCore::new(parser.clone(), ",", Label::Operator).with_children(operands),
        }
    }
}

impl XPathToken for SequenceExpr {
    fn core(&self) -> &TokenCore {
        &self.core
    }

    fn evaluate(&self, context: Option<&mut XPathContext>) -> Result<Value, Error> {
        let ctx = context.as_deref();
        let mut items = Vec::new();
        for operand in self.core.children() {
            items.extend(select_on_copy(operand.as_ref(), ctx)?);
        }
        Ok(Value::from(items))
    }
}
