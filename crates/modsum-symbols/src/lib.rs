//! modsum-symbols: Symbol interning for module summaries
//!
//! Every function, type and protocol requirement recorded in a summary is
//! identified by a stable string (usually a mangled name). This crate maps
//! those strings to dense integer IDs:
//! - IDs are allocated sequentially starting at 1
//! - ID 0 is reserved as the "absent" marker for optional references
//! - The table is append-only; IDs are never reused
//!
//! Each summary store owns its own table, so several independent stores can
//! live side by side in one process (the merge engine relies on this).
//!
//! # Example
//!
//! ```
//! use modsum_symbols::SymbolTable;
//!
//! let mut table = SymbolTable::new();
//! let run = table.intern("B1.run");
//! assert_eq!(table.intern("B1.run"), run);
//! assert_eq!(table.resolve(run).unwrap(), "B1.run");
//! ```

mod error;
mod symbol;
mod table;

pub use error::SymbolError;
pub use symbol::SymbolId;
pub use table::SymbolTable;
