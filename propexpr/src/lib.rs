//! Property expression evaluation.
//!
//! A small dynamically-typed expression language over named properties,
//! covering:
//!
//! - int/float/bool/string literals, `+ - * / **`, parentheses
//! - comma tuples (`1, 'two', 3.0`) reducing to lists
//! - symbols resolved through a pluggable [`PropertySource`]
//! - juxtaposition applications handled by a pluggable [`CallResolver`]
//!
//! Evaluation has a single outcome channel: anything that fails to parse,
//! look up, or combine reduces to [`Value::Absent`] instead of an error.
//!
//! # Quick start
//!
//! ```rust
//! use propexpr::{evaluate, PropertyTable, Value};
//!
//! let mut props = PropertyTable::new();
//! props.set("FOO", Value::Int(2));
//!
//! assert_eq!(evaluate("3 + FOO", Some(&props)), Value::Int(5));
//! assert_eq!(evaluate("2 + 2 + \"3\"", None), Value::Int(7));
//! assert_eq!(evaluate("1 / 0", None), Value::Absent);
//! ```

pub mod expr;
pub mod table;
pub mod value;

// Re-exports for convenience.
pub use expr::{
    eval_expr, evaluate, evaluate_with, parse_expr, CallResolver, Expr, ParseError,
    PropertySource, StubResolver,
};
pub use table::PropertyTable;
pub use value::{BinOp, Value};
