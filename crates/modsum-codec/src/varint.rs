//! LEB128 varints and bounded frame reading

use crate::CodecError;

pub(crate) fn write_varint(buf: &mut Vec<u8>, value: u64) {
    let mut val = value;
    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;
        if val != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if val == 0 {
            break;
        }
    }
}

pub(crate) fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Length-prefixed entry: `id length payload[length]`
pub(crate) fn write_frame(buf: &mut Vec<u8>, id: u64, payload: &[u8]) {
    write_varint(buf, id);
    write_bytes(buf, payload);
}

/// A block or record read from the stream
pub(crate) struct Frame<'a> {
    pub id: u64,
    /// Offset of the frame's first byte (its ID)
    pub offset: usize,
    pub payload: Cursor<'a>,
}

/// Read position within a bounded slice of the stream
///
/// `base` is the absolute offset of the slice, so errors report positions
/// in the whole file.
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            base: 0,
        }
    }

    /// Absolute offset of the next byte
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_varint(&mut self) -> Result<u64, CodecError> {
        let start = self.offset();
        let mut result: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = *self
                .bytes
                .get(self.pos)
                .ok_or(CodecError::TruncatedStream {
                    offset: self.offset(),
                    needed: 1,
                    available: 0,
                })?;
            self.pos += 1;
            if shift >= 64 || (shift == 63 && byte & 0x7E != 0) {
                return Err(CodecError::MalformedRecord {
                    offset: start,
                    reason: "varint overflows 64 bits".to_string(),
                });
            }
            result |= u64::from(byte & 0x7F) << shift;
            if (byte & 0x80) == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    pub fn read_u32(&mut self, what: &str) -> Result<u32, CodecError> {
        let offset = self.offset();
        let value = self.read_varint()?;
        u32::try_from(value).map_err(|_| CodecError::MalformedRecord {
            offset,
            reason: format!("{what} {value} does not fit in 32 bits"),
        })
    }

    pub fn read_bytes(&mut self, len: u64) -> Result<&'a [u8], CodecError> {
        let available = self.remaining();
        match usize::try_from(len) {
            Ok(len) if len <= available => {
                let slice = &self.bytes[self.pos..self.pos + len];
                self.pos += len;
                Ok(slice)
            }
            _ => Err(CodecError::TruncatedStream {
                offset: self.offset(),
                needed: len,
                available,
            }),
        }
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_varint()?;
        let offset = self.offset();
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::MalformedRecord {
            offset,
            reason: "name is not valid UTF-8".to_string(),
        })
    }

    /// Read one length-prefixed frame; its payload is a bounded sub-cursor
    pub fn read_frame(&mut self) -> Result<Frame<'a>, CodecError> {
        let offset = self.offset();
        let id = self.read_varint()?;
        let len = self.read_varint()?;
        let payload_base = self.offset();
        let payload = self.read_bytes(len)?;
        Ok(Frame {
            id,
            offset,
            payload: Cursor {
                bytes: payload,
                pos: 0,
                base: payload_base,
            },
        })
    }
}
