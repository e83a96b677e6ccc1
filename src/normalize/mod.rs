//! Cleaning and header resolution
//!
//! - [`clean_numeric_column`]: strip units/separators, coerce to numbers
//! - [`normalize_headers`]: uniform header cleanup plus canonical renames
//! - [`resolve_alias`]: pick the first present alias for a logical field

mod alias;
mod cleaning;
mod headers;

pub use alias::{resolve_alias, resolve_alias_loose};
pub use cleaning::{clean_numeric_column, coerce_cell};
pub use headers::{canonical_header, normalize_header, normalize_headers};
