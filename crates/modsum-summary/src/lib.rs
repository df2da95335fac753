//! modsum-summary: Summary Record Model
//!
//! In-memory representation of one module's summary:
//! - [`FunctionSummary`]: flags, ordered call edges, optional debug name
//! - [`TypeSummary`]: positional vtable slots and protocol witness entries
//! - [`ModuleSummaryStore`]: the aggregate for one module (or a merged set)
//!
//! Front ends populate a store through [`ModuleSummaryStoreBuilder`], which
//! interns names as it goes:
//!
//! ```
//! use modsum_summary::{CallKind, FunctionFlags, ModuleSummaryStore};
//!
//! let mut builder = ModuleSummaryStore::begin_module("vtable");
//! let main = builder.record_function("main", FunctionFlags::PRESERVED).unwrap();
//! builder.record_function("B1.run", FunctionFlags::empty()).unwrap();
//! builder.record_call(main, "B1.run", CallKind::Direct).unwrap();
//! let store = builder.finish();
//!
//! assert_eq!(store.functions().count(), 2);
//! ```

mod builder;
mod error;
mod function;
mod store;
mod types;

pub use builder::ModuleSummaryStoreBuilder;
pub use error::SummaryError;
pub use function::{CallEdge, CallKind, FunctionFlags, FunctionSummary};
pub use store::ModuleSummaryStore;
pub use types::TypeSummary;

pub use modsum_symbols::{SymbolError, SymbolId, SymbolTable};
