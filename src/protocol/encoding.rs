//! Varints and a read cursor over an immutable message buffer.
//!
//! Varints are base-128, big-endian: most significant group first, bit 7 set
//! on every byte except the last.

use crate::error::{Error, Field, Result, Violation};

/// Maximum encoded length of a 64-bit value (ceil(64/7)).
pub const MAX_VARINT_LEN: usize = 10;

/// If any of these bits are set before a shift, the next `<< 7` overflows.
const U64_OVERFLOW_MASK: u64 = 0xFE00_0000_0000_0000;

pub fn write_varint(out: &mut Vec<u8>, mut n: u64) {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut i = MAX_VARINT_LEN;
    loop {
        i -= 1;
        buf[i] = (n as u8 & 0x7F) | 0x80;
        n >>= 7;
        if n == 0 {
            break;
        }
    }
    buf[MAX_VARINT_LEN - 1] &= 0x7F;
    out.extend_from_slice(&buf[i..]);
}

pub fn encode_varint(n: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    write_varint(&mut out, n);
    out
}

/// Reads from a borrowed buffer, advancing a position. The buffer itself is
/// never modified.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn read_byte(&mut self, field: Field) -> Result<u8> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or(Error::TruncatedBuffer(field))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, n: usize, field: Field) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::TruncatedBuffer(field));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self, field: Field) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N, field)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(bytes);
        Ok(arr)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut val: u64 = 0;
        loop {
            let byte = self.read_byte(Field::Varint)?;
            if val & U64_OVERFLOW_MASK != 0 {
                return Err(Violation::VarintOverflow.into());
            }
            val = (val << 7) | u64::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return Ok(val);
            }
        }
    }
}
