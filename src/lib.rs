//! sitebw - site bandwidth spreadsheet loader
//!
//! Loads a site bandwidth workbook, cleans unit-suffixed numeric columns,
//! normalizes headers, resolves column aliases and exposes dashboard-ready
//! data views. Problems that don't stop a load are reported as
//! [`Diagnostic`]s instead of errors.
//!
//! # Features
//!
//! - xlsx/xlsm/xlsb/xls/ods via calamine, plus CSV
//! - Unit-tolerant numeric cleaning ("100 mbps", "Rs. 1,250")
//! - Alias resolution for renamed columns
//! - Memoized loads with explicit invalidation
//! - KPIs, chart datasets and previews that degrade when columns are missing
//!
//! # Example
//!
//! ```no_run
//! use royalbit_sitebw::config::LoaderConfig;
//! use royalbit_sitebw::dashboard::{compute_kpis, Kpis};
//!
//! let outcome = LoaderConfig::default().load();
//! if let Some(fatal) = outcome.fatal() {
//!     eprintln!("{}", fatal);
//! } else {
//!     let kpis = compute_kpis(&outcome.table, &outcome.resolved);
//!     println!("Sites: {}", Kpis::format_count(kpis.total_sites));
//! }
//! ```

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod excel;
pub mod loader;
pub mod normalize;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use cache::LoadCache;
pub use config::LoaderConfig;
pub use error::{Diagnostic, DiagnosticKind, SiteBwError, SiteBwResult};
pub use loader::{full_load, LoadOutcome, ResolvedColumns};
pub use schema::{ColumnKind, ColumnSpec, HeaderRename, StripPattern};
pub use types::{CellValue, CleanedTable, Column, RawTable, Table};
