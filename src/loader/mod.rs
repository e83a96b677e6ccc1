//! Loader/Normalizer
//!
//! Turns an ordered list of candidate paths plus a column schema into a
//! cleaned table. Only a missing file or an unparseable file stops a load;
//! everything else is reported as a diagnostic and the affected field is
//! marked unresolved.

mod pipeline;
mod source;

pub use pipeline::{full_load, LoadOutcome, ResolvedColumns};
pub use source::{load, resolve_path};
