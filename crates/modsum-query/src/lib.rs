//! modsum-query: Query and export facade for module summaries
//!
//! Read-only interface used by an optimizer once liveness has been
//! computed:
//! - [`SummaryQuery::is_live`] and [`SummaryQuery::resolve_devirtualizable`]
//! - dead function and dead dispatch entry listings
//! - [`export_yaml`] / [`import_yaml`] for diffable text dumps

mod error;
mod export;
mod query;

pub use error::{ExportError, UsageError};
pub use export::{export_yaml, import_yaml, YAML_HEADER};
pub use query::{DeadTableEntry, SummaryQuery};
