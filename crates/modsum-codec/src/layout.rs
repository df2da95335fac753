//! Block and record identifiers

/// File signature
pub const SIGNATURE: [u8; 4] = *b"MODS";

/// Newest container version this crate reads and writes
pub const FORMAT_VERSION: u64 = 1;

/// Top-level block identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    ModuleSummary,
    DebugNames,
}

impl BlockId {
    pub fn as_raw(self) -> u64 {
        match self {
            BlockId::ModuleSummary => 8,
            BlockId::DebugNames => 9,
        }
    }

    pub fn from_raw(raw: u64) -> Option<BlockId> {
        match raw {
            8 => Some(BlockId::ModuleSummary),
            9 => Some(BlockId::DebugNames),
            _ => None,
        }
    }
}

/// Records inside `MODULE_SUMMARY`
pub(crate) mod module_summary {
    pub const MODULE_METADATA: u64 = 1;
    pub const SYMBOL_NAME: u64 = 2;
    pub const FUNCTION: u64 = 3;
    pub const TYPE: u64 = 4;

    /// `MODULE_METADATA` flag bits
    pub const FLAG_LIVENESS_COMPUTED: u64 = 1 << 0;
}

/// Records inside `DEBUG_NAMES`
pub(crate) mod debug_names {
    pub const DEBUG_NAME: u64 = 1;
}
