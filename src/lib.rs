//! modsum - Module summaries for cross-module optimization
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use modsum_codec as codec;
pub use modsum_merge as merge;
pub use modsum_query as query;
pub use modsum_summary as summary;
pub use modsum_symbols as symbols;
