//! Filter-query expressions for quarry.
//!
//! A [`Filter`] is an immutable boolean condition over backend fields. Filters compose
//! with [`Filter::and`], [`Filter::or`], [`Filter::negated`] and
//! [`Filter::allows_null_values`], and render into one self-contained filter-query
//! fragment with an optional `{!...}` local-parameter prefix:
//!
//! - **Direct**: `color_s:red`, `color_s:(red blue)`, `color_s:[* TO *]`
//! - **Negation**: `-color_s:red`, pushed through AND/OR by De Morgan
//! - **Null admission**: `(color_s:red OR (*:* NOT color_s:[* TO *]))`
//! - **Local parameters**: `{!tag=color cache=false}color_s:red`
//!
//! # Example
//!
//! ```
//! use quarry_filter::Filter;
//!
//! let color = Filter::direct("color_s", "color", ["red"]).unwrap();
//! assert_eq!(color.apply(), "{!tag=color}color_s:red");
//!
//! let size = Filter::untagged("size_i", [42]).unwrap();
//! assert_eq!(color.and(size).negated().apply(), "-color_s:red OR -size_i:42");
//! ```

#![warn(missing_docs)]

mod error;
mod expr;
mod params;
mod value;

pub use error::FilterError;
pub use expr::{DirectFilter, EXISTS, Filter, Operator};
pub use params::LocalParams;
pub use value::Value;
