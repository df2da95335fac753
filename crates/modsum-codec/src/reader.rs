//! Summary deserialization

use crate::layout::{debug_names, module_summary, BlockId, FORMAT_VERSION, SIGNATURE};
use crate::varint::Cursor;
use crate::CodecError;
use modsum_summary::{
    CallEdge, CallKind, FunctionFlags, FunctionSummary, ModuleSummaryStore, SummaryError, SymbolId,
    TypeSummary,
};
use tracing::debug;

/// Decode a summary produced by [`encode`](crate::encode)
///
/// Either the whole store is returned or an error; nothing partial.
pub fn decode(bytes: &[u8]) -> Result<ModuleSummaryStore, CodecError> {
    Deserializer::new(bytes).read_module_summary()
}

struct PendingDebugName {
    offset: usize,
    function: SymbolId,
    name: String,
}

struct Deserializer<'a> {
    cursor: Cursor<'a>,
    store: Option<ModuleSummaryStore>,
    debug_names: Vec<PendingDebugName>,
}

impl<'a> Deserializer<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
            store: None,
            debug_names: Vec::new(),
        }
    }

    fn read_module_summary(mut self) -> Result<ModuleSummaryStore, CodecError> {
        self.read_signature()?;
        self.read_version()?;

        while !self.cursor.is_at_end() {
            let frame = self.cursor.read_frame()?;
            match BlockId::from_raw(frame.id) {
                Some(BlockId::ModuleSummary) => {
                    if self.store.is_some() {
                        return Err(CodecError::MalformedHeader {
                            offset: frame.offset,
                            reason: "more than one MODULE_SUMMARY block".to_string(),
                        });
                    }
                    self.store = Some(read_single_module_summary(frame.offset, frame.payload)?);
                }
                Some(BlockId::DebugNames) => {
                    self.read_debug_names(frame.payload)?;
                }
                None => {
                    debug!(block = frame.id, offset = frame.offset, "skipping unknown block");
                }
            }
        }

        let mut store = self.store.ok_or_else(|| CodecError::MalformedHeader {
            offset: self.cursor.offset(),
            reason: "missing MODULE_SUMMARY block".to_string(),
        })?;

        for pending in self.debug_names {
            store
                .set_debug_name(pending.function, Some(pending.name))
                .map_err(|err| record_error(pending.offset, err))?;
        }

        Ok(store)
    }

    fn read_signature(&mut self) -> Result<(), CodecError> {
        let signature = self.cursor.read_bytes(SIGNATURE.len() as u64)?;
        if signature != SIGNATURE {
            return Err(CodecError::MalformedHeader {
                offset: 0,
                reason: "invalid signature".to_string(),
            });
        }
        Ok(())
    }

    fn read_version(&mut self) -> Result<(), CodecError> {
        let offset = self.cursor.offset();
        let version = self.cursor.read_varint()?;
        if version == 0 {
            return Err(CodecError::MalformedHeader {
                offset,
                reason: "invalid format version 0".to_string(),
            });
        }
        if version > FORMAT_VERSION {
            return Err(CodecError::VersionMismatch {
                offset,
                found: version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(())
    }

    fn read_debug_names(&mut self, mut block: Cursor<'a>) -> Result<(), CodecError> {
        while !block.is_at_end() {
            let mut record = block.read_frame()?;
            match record.id {
                debug_names::DEBUG_NAME => {
                    let function = SymbolId(record.payload.read_u32("symbol id")?);
                    let name = record.payload.read_string()?;
                    self.debug_names.push(PendingDebugName {
                        offset: record.offset,
                        function,
                        name,
                    });
                }
                other => {
                    debug!(record = other, offset = record.offset, "skipping unknown debug record");
                }
            }
        }
        Ok(())
    }
}

fn read_single_module_summary(
    block_offset: usize,
    mut block: Cursor<'_>,
) -> Result<ModuleSummaryStore, CodecError> {
    let mut store = read_module_metadata(block_offset, &mut block)?;

    while !block.is_at_end() {
        let mut record = block.read_frame()?;
        match record.id {
            module_summary::MODULE_METADATA => {
                return Err(CodecError::MalformedHeader {
                    offset: record.offset,
                    reason: "more than one MODULE_METADATA record".to_string(),
                });
            }
            module_summary::SYMBOL_NAME => {
                let name = record.payload.read_string()?;
                let next = store.symbols().len();
                store.intern(&name);
                if store.symbols().len() == next {
                    return Err(CodecError::MalformedRecord {
                        offset: record.offset,
                        reason: format!("symbol '{name}' listed twice"),
                    });
                }
            }
            module_summary::FUNCTION => {
                let function = read_function(&mut record.payload)?;
                store
                    .insert_function(function)
                    .map_err(|err| record_error(record.offset, err))?;
            }
            module_summary::TYPE => {
                let ty = read_type(&mut record.payload)?;
                store
                    .insert_type(ty)
                    .map_err(|err| record_error(record.offset, err))?;
            }
            other => {
                debug!(record = other, offset = record.offset, "skipping unknown record");
            }
        }
    }

    store
        .check_vtables()
        .map_err(|err| record_error(block_offset, err))?;
    Ok(store)
}

fn read_module_metadata(
    block_offset: usize,
    block: &mut Cursor<'_>,
) -> Result<ModuleSummaryStore, CodecError> {
    if block.is_at_end() {
        return Err(CodecError::MalformedHeader {
            offset: block_offset,
            reason: "missing MODULE_METADATA record".to_string(),
        });
    }

    let mut record = block.read_frame()?;
    if record.id != module_summary::MODULE_METADATA {
        return Err(CodecError::MalformedHeader {
            offset: record.offset,
            reason: format!("expected MODULE_METADATA, found record {}", record.id),
        });
    }

    let flags = record.payload.read_varint()?;
    let name = record.payload.read_string()?;
    let mut store = ModuleSummaryStore::new(name);
    if flags & module_summary::FLAG_LIVENESS_COMPUTED != 0 {
        store.mark_liveness_computed();
    }
    Ok(store)
}

fn read_function(record: &mut Cursor<'_>) -> Result<FunctionSummary, CodecError> {
    let id = read_symbol(record)?;
    let flags = FunctionFlags::from_bits_truncate(record.read_u32("function flags")?);
    let mut function = FunctionSummary::new(id, flags);

    let count = record.read_varint()?;
    for _ in 0..count {
        let offset = record.offset();
        let raw_kind = record.read_varint()?;
        let kind = CallKind::from_raw(raw_kind).ok_or_else(|| CodecError::MalformedRecord {
            offset,
            reason: format!("unknown call kind {raw_kind}"),
        })?;
        let callee = read_symbol(record)?;
        let preserved = record.read_varint()? != 0;
        function.add_call(CallEdge {
            callee,
            kind,
            preserved,
        });
    }
    Ok(function)
}

fn read_type(record: &mut Cursor<'_>) -> Result<TypeSummary, CodecError> {
    let id = read_symbol(record)?;
    let mut ty = TypeSummary::new(id);
    ty.base = SymbolId::from_raw(record.read_u32("base type")?);

    let slots = record.read_varint()?;
    for _ in 0..slots {
        ty.vtable_slots.push(read_symbol(record)?);
    }

    let witnesses = record.read_varint()?;
    for _ in 0..witnesses {
        let requirement = read_symbol(record)?;
        let implementation = read_symbol(record)?;
        ty.witness_entries.insert(requirement, implementation);
    }
    Ok(ty)
}

/// Read a required symbol reference; 0 is only valid in optional fields
fn read_symbol(record: &mut Cursor<'_>) -> Result<SymbolId, CodecError> {
    let offset = record.offset();
    let id = SymbolId(record.read_u32("symbol id")?);
    if id.is_none() {
        return Err(CodecError::MalformedRecord {
            offset,
            reason: "reserved symbol id 0 in a required field".to_string(),
        });
    }
    Ok(id)
}

fn record_error(offset: usize, err: SummaryError) -> CodecError {
    CodecError::MalformedRecord {
        offset,
        reason: err.to_string(),
    }
}
