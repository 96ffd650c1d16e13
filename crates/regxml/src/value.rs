//! Checked reads over an in-memory property value.
//!
//! Property values arrive as finite byte buffers; every decode rule reads
//! big-endian fields from the front. Underflow is reported as a typed error
//! so callers can decide whether it is fatal or, for set values, a
//! tolerated truncation.

use bytes::Buf;
use meta_id::{Auid, Umid, Uuid, AUID_LEN, UMID_LEN};
use thiserror::Error;

/// The value buffer ended before a field could be read in full.
#[derive(Debug, Clone, Copy, Error)]
#[error("value too short: needed {needed} bytes, {remaining} available")]
pub struct ShortValue {
    pub needed: usize,
    pub remaining: usize,
}

/// Cursor over one item's value bytes.
#[derive(Debug)]
pub struct ValueReader<'a> {
    buf: &'a [u8],
}

impl<'a> ValueReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ValueReader { buf }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn ensure(&self, needed: usize) -> Result<(), ShortValue> {
        if self.buf.remaining() < needed {
            return Err(ShortValue {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, ShortValue> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, ShortValue> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_u32(&mut self) -> Result<u32, ShortValue> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_i32(&mut self) -> Result<i32, ShortValue> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], ShortValue> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Consume and return everything left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }

    pub fn read_auid(&mut self) -> Result<Auid, ShortValue> {
        let mut raw = [0u8; AUID_LEN];
        raw.copy_from_slice(self.read_exact(AUID_LEN)?);
        Ok(Auid::from_bytes(raw))
    }

    pub fn read_uuid(&mut self) -> Result<Uuid, ShortValue> {
        let mut raw = [0u8; AUID_LEN];
        raw.copy_from_slice(self.read_exact(AUID_LEN)?);
        Ok(Uuid::from_bytes(raw))
    }

    pub fn read_umid(&mut self) -> Result<Umid, ShortValue> {
        let mut raw = [0u8; UMID_LEN];
        raw.copy_from_slice(self.read_exact(UMID_LEN)?);
        Ok(Umid::from_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_reads_consume_the_buffer() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = ValueReader::new(&data);
        assert_eq!(reader.read_u16().expect("u16"), 0x0102);
        assert_eq!(reader.read_u32().expect("u32"), 0x0304_0506);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.rest(), &[0x07]);
        assert!(reader.is_empty());
    }

    #[test]
    fn underflow_reports_needed_and_remaining() {
        let data = [0x01, 0x02];
        let mut reader = ValueReader::new(&data);
        let err = reader.read_u32().unwrap_err();
        assert_eq!(err.needed, 4);
        assert_eq!(err.remaining, 2);
        // A failed read consumes nothing.
        assert_eq!(reader.read_u16().expect("u16"), 0x0102);
    }

    #[test]
    fn identifier_reads() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xaa; 16]);
        data.extend_from_slice(&[0xbb; 32]);
        let mut reader = ValueReader::new(&data);
        assert_eq!(reader.read_uuid().expect("uuid").as_bytes(), &[0xaa; 16]);
        assert_eq!(reader.read_umid().expect("umid").as_bytes(), &[0xbb; 32]);
        assert!(reader.read_auid().is_err());
    }
}
