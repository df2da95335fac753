//! Summary serialization

use crate::layout::{debug_names, module_summary, BlockId, FORMAT_VERSION, SIGNATURE};
use crate::varint::{write_bytes, write_frame, write_varint};
use modsum_summary::{FunctionSummary, ModuleSummaryStore, SymbolId, TypeSummary};

/// Encoding settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Write a `DEBUG_NAMES` block with human-readable function names
    pub embed_debug_names: bool,
}

impl EncodeOptions {
    pub fn with_debug_names() -> Self {
        Self {
            embed_debug_names: true,
        }
    }
}

/// Encode a store without debug names
pub fn encode(store: &ModuleSummaryStore) -> Vec<u8> {
    encode_with(store, &EncodeOptions::default())
}

/// Encode a store with the given options
pub fn encode_with(store: &ModuleSummaryStore, options: &EncodeOptions) -> Vec<u8> {
    let mut serializer = Serializer::default();
    serializer.emit_header();
    serializer.emit_module_summary(store);
    if options.embed_debug_names {
        serializer.emit_debug_names(store);
    }
    serializer.out
}

#[derive(Default)]
struct Serializer {
    out: Vec<u8>,
    /// Reusable buffer for record payloads
    scratch: Vec<u8>,
}

impl Serializer {
    fn emit_header(&mut self) {
        self.out.extend_from_slice(&SIGNATURE);
        write_varint(&mut self.out, FORMAT_VERSION);
    }

    fn emit_module_summary(&mut self, store: &ModuleSummaryStore) {
        let mut block = Vec::new();

        self.scratch.clear();
        let flags = if store.is_liveness_computed() {
            module_summary::FLAG_LIVENESS_COMPUTED
        } else {
            0
        };
        write_varint(&mut self.scratch, flags);
        write_bytes(&mut self.scratch, store.module_name().as_bytes());
        write_frame(&mut block, module_summary::MODULE_METADATA, &self.scratch);

        for (_, name) in store.symbols().iter() {
            self.scratch.clear();
            write_bytes(&mut self.scratch, name.as_bytes());
            write_frame(&mut block, module_summary::SYMBOL_NAME, &self.scratch);
        }

        for function in store.functions() {
            self.emit_function(&mut block, function);
        }

        for ty in store.types() {
            self.emit_type(&mut block, ty);
        }

        write_frame(&mut self.out, BlockId::ModuleSummary.as_raw(), &block);
    }

    fn emit_function(&mut self, block: &mut Vec<u8>, function: &FunctionSummary) {
        self.scratch.clear();
        write_symbol(&mut self.scratch, function.id());
        write_varint(&mut self.scratch, u64::from(function.flags().bits()));
        write_varint(&mut self.scratch, function.calls().len() as u64);
        for call in function.calls() {
            write_varint(&mut self.scratch, call.kind.as_raw());
            write_symbol(&mut self.scratch, call.callee);
            write_varint(&mut self.scratch, u64::from(call.preserved));
        }
        write_frame(block, module_summary::FUNCTION, &self.scratch);
    }

    fn emit_type(&mut self, block: &mut Vec<u8>, ty: &TypeSummary) {
        self.scratch.clear();
        write_symbol(&mut self.scratch, ty.id);
        write_varint(&mut self.scratch, u64::from(SymbolId::to_raw(ty.base)));
        write_varint(&mut self.scratch, ty.vtable_slots.len() as u64);
        for slot in &ty.vtable_slots {
            write_symbol(&mut self.scratch, *slot);
        }
        write_varint(&mut self.scratch, ty.witness_entries.len() as u64);
        for (requirement, implementation) in &ty.witness_entries {
            write_symbol(&mut self.scratch, *requirement);
            write_symbol(&mut self.scratch, *implementation);
        }
        write_frame(block, module_summary::TYPE, &self.scratch);
    }

    /// Debug names go in their own block so that readers that don't care
    /// can skip them wholesale; the block is omitted when there are none.
    fn emit_debug_names(&mut self, store: &ModuleSummaryStore) {
        let mut block = Vec::new();
        for function in store.functions() {
            let Some(name) = function.debug_name() else {
                continue;
            };
            self.scratch.clear();
            write_symbol(&mut self.scratch, function.id());
            write_bytes(&mut self.scratch, name.as_bytes());
            write_frame(&mut block, debug_names::DEBUG_NAME, &self.scratch);
        }

        if !block.is_empty() {
            write_frame(&mut self.out, BlockId::DebugNames.as_raw(), &block);
        }
    }
}

fn write_symbol(buf: &mut Vec<u8>, id: SymbolId) {
    write_varint(buf, u64::from(id.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsum_summary::FunctionFlags;

    #[test]
    fn test_empty_module_layout() {
        let store = ModuleSummaryStore::new("empty");
        let bytes = encode(&store);

        let mut expected = b"MODS".to_vec();
        expected.push(1); // version
        expected.extend_from_slice(&[8, 9]); // MODULE_SUMMARY, 9 bytes
        expected.extend_from_slice(&[1, 7, 0, 5]); // MODULE_METADATA, 7 bytes, flags, name len
        expected.extend_from_slice(b"empty");

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_debug_block_only_when_requested() {
        let mut builder = ModuleSummaryStore::begin_module("m");
        let f = builder.record_function("f", FunctionFlags::empty()).unwrap();
        builder.set_debug_name(f, "m.f()").unwrap();
        let store = builder.finish();

        let plain = encode(&store);
        let with_names = encode_with(&store, &EncodeOptions::with_debug_names());

        assert!(!contains(&plain, b"m.f()"));
        assert!(contains(&with_names, b"m.f()"));
        assert!(with_names.starts_with(&plain));
    }

    #[test]
    fn test_no_debug_block_without_names() {
        let mut builder = ModuleSummaryStore::begin_module("m");
        builder.record_function("f", FunctionFlags::empty()).unwrap();
        let store = builder.finish();

        assert_eq!(
            encode(&store),
            encode_with(&store, &EncodeOptions::with_debug_names())
        );
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }
}
