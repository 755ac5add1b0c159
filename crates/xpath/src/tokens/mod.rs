//! A small set of concrete tokens.
//!
//! These cover literals, the context item, variable references, child name
//! steps, paths, sequences, general comparisons and a handful of functions.
//! A parser builds them with the constructors of each type and boxes them
//! into a tree:
//!
//! ```
//! use std::rc::Rc;
//! use xpath_xdm::context::ParserContext;
//! use xpath_xdm::token::XPathToken;
//! use xpath_xdm::tokens::{GeneralComparison, Literal};
//!
//! let parser = Rc::new(ParserContext::default());
//! let eq = GeneralComparison::new(
//!     &parser,
//!     "=",
//!     Box::new(Literal::new(&parser, 1i64)),
//!     Box::new(Literal::new(&parser, 1.0)),
//! );
//! assert!(eq.is_ok());
//! ```

mod comparison;
mod functions;
mod literal;
mod path;

pub use comparison::GeneralComparison;
pub use functions::{AdjustToTimezone, BooleanFunction, DataFunction, NumberFunction, StringFunction};
pub use literal::{ContextItem, Literal, VariableRef};
pub use path::{NameStep, PathStep, SequenceExpr};
