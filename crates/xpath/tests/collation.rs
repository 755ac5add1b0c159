//! The active collation is process-wide, so everything touching it runs in
//! one test of its own binary.

use rstest::rstest;
use std::rc::Rc;
use xpath_xdm::collation::{active_collation, active_collation_uri, scoped_collation};
use xpath_xdm::consts::{CODEPOINT_URI, SIMPLE_ACCENT_URI, SIMPLE_CASE_ACCENT_URI, SIMPLE_CASE_URI};
use xpath_xdm::context::ParserContext;
use xpath_xdm::token::{Label, TokenCore, XPathToken};
use xpath_xdm::tokens::{GeneralComparison, Literal};
use xpath_xdm::{CollationRegistry, ErrorCode, Item, Value, XPathContextBuilder, use_collation};

fn equal_strings(a: &str, b: &str) -> bool {
    let parser = Rc::new(ParserContext::default());
    let token = GeneralComparison::new(
        &parser,
        "=",
        Box::new(Literal::new(&parser, a)),
        Box::new(Literal::new(&parser, b)),
    )
    .unwrap();
    let mut ctx = XPathContextBuilder::new().build();
    token.evaluate(Some(&mut ctx)).unwrap() == Value::Single(Item::from(true))
}

#[rstest]
fn collation_scopes() {
    let registry = CollationRegistry::default();
    assert_eq!(active_collation_uri(), CODEPOINT_URI);
    assert!(scoped_collation().is_none());
    assert!(!equal_strings("ABC", "abc"));

    {
        let _case = use_collation(&registry, SIMPLE_CASE_URI).unwrap();
        assert_eq!(active_collation_uri(), SIMPLE_CASE_URI);
        assert!(equal_strings("ABC", "abc"));
        assert!(!equal_strings("café", "cafe"));

        {
            let _accent = use_collation(&registry, SIMPLE_ACCENT_URI).unwrap();
            assert!(equal_strings("café", "cafe"));
            assert!(!equal_strings("ABC", "abc"));
        }
        assert_eq!(active_collation_uri(), SIMPLE_CASE_URI);

        let err = use_collation(&registry, "http://example.com/no-such-collation").unwrap_err();
        assert_eq!(err.code, ErrorCode::FOCH0002);
        assert_eq!(active_collation().uri(), SIMPLE_CASE_URI);
    }

    assert_eq!(active_collation_uri(), CODEPOINT_URI);
    assert!(scoped_collation().is_none());
    assert!(!equal_strings("ABC", "abc"));

    let core = TokenCore::new(Rc::new(ParserContext::default()), "(test)", Label::Symbol);
    {
        let _locale = core.use_locale(None, SIMPLE_CASE_ACCENT_URI).unwrap();
        assert!(equal_strings("CAFÉ", "cafe"));
    }
    let ctx = XPathContextBuilder::new().build();
    let err = core.use_locale(Some(&ctx), "en_US.UTF-8").unwrap_err();
    assert_eq!(err.code, ErrorCode::FOCH0002);
    assert!(err.token.is_some());
    assert_eq!(active_collation_uri(), CODEPOINT_URI);
}
