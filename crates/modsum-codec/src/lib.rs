//! modsum-codec: Binary encoding for module summaries
//!
//! A summary file is a signature, a format version, and a sequence of
//! length-prefixed blocks. Blocks contain length-prefixed records tagged
//! with an abbreviation ID. All integers are unsigned LEB128 varints.
//!
//! ```text
//! "MODS" version
//! MODULE_SUMMARY block
//!   MODULE_METADATA record   (flags, module name)
//!   SYMBOL_NAME record*      (one per interned symbol, in ID order)
//!   FUNCTION record*         (id, flags, call edges)
//!   TYPE record*             (id, base, vtable slots, witness entries)
//! DEBUG_NAMES block?         (only when debug names are embedded)
//! ```
//!
//! Unknown records inside a known block and unknown top-level blocks are
//! skipped by their declared length, so newer producers can add optional
//! data without breaking older readers. A newer format version is a hard
//! error since the layout itself may have changed.

mod error;
mod file;
mod layout;
mod reader;
mod varint;
mod writer;

pub use error::CodecError;
pub use file::{
    read_summary_file, summary_file_name, write_summary_file, SummaryFileError, SUMMARY_FILE_SUFFIX,
};
pub use layout::{BlockId, FORMAT_VERSION, SIGNATURE};
pub use reader::decode;
pub use writer::{encode, encode_with, EncodeOptions};
