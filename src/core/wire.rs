//! Primitive wire encodings shared by the header and the tag payload.
//!
//! All multi-byte integers are little-endian. Strings are prefixed with their
//! UTF-8 byte length as a 7-bit variable-length integer (low group first, high
//! bit set while more bytes follow).

use crate::error::constants::{
    ERR_INVALID_DECIMAL, ERR_INVALID_UTF8, ERR_NEGATIVE_LENGTH, ERR_UNEXPECTED_EOF,
    ERR_VARINT_TOO_LONG,
};
use crate::error::{Result, TagError};
use bytes::{Buf, BufMut};
use rust_decimal::Decimal;

/// Upper bound on elements pre-allocated from an untrusted length prefix.
pub(crate) const MAX_PREALLOCATION: usize = 4096;

/// Largest decimal scale the 96-bit layout allows
const MAX_DECIMAL_SCALE: u32 = 28;

/// Flag bits that must be zero in a decimal (everything except scale and sign)
const DECIMAL_RESERVED_BITS: u32 = 0x7F00_FFFF;

/// Writes wire primitives into any `BufMut`.
pub struct WireWriter<B: BufMut> {
    buf: B,
}

impl<B: BufMut> WireWriter<B> {
    pub fn new(buf: B) -> Self {
        Self { buf }
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buf.put_f32_le(value);
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.buf.put_f64_le(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a length or count as a 4-byte signed integer
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| {
            TagError::Encode(format!("Length {len} does not fit in a 32-bit count"))
        })?;
        self.write_i32(len);
        Ok(())
    }

    /// Unsigned 7-bit variable-length integer
    pub fn write_7bit(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buf.put_u8((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }

    /// Length-prefixed UTF-8 string
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        let len = u32::try_from(value.len())
            .ok()
            .filter(|len| *len <= i32::MAX as u32)
            .ok_or_else(|| TagError::Encode("String is too long to encode".to_string()))?;
        self.write_7bit(len);
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }

    /// A single code point as 1-4 UTF-8 bytes
    pub fn write_char(&mut self, value: char) {
        let mut scratch = [0u8; 4];
        self.buf.put_slice(value.encode_utf8(&mut scratch).as_bytes());
    }

    /// 16 bytes: lo, mid, hi, flags (each a little-endian 32-bit word)
    pub fn write_decimal(&mut self, value: &Decimal) {
        // `serialize` yields flags, lo, mid, hi
        let raw = value.serialize();
        self.buf.put_slice(&raw[4..16]);
        self.buf.put_slice(&raw[0..4]);
    }
}

/// Reads wire primitives from a byte slice, reporting short reads as format errors.
pub struct WireReader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, consumed: 0 }
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.consumed
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(TagError::Format(format!(
                "{ERR_UNEXPECTED_EOF} at offset {}: needed {needed} bytes, {} remaining",
                self.consumed,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    fn advance_by(&mut self, count: usize) {
        self.consumed += count;
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        self.advance_by(1);
        Ok(self.buf.get_u8())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        self.advance_by(1);
        Ok(self.buf.get_i8())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        self.advance_by(2);
        Ok(self.buf.get_i16_le())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        self.advance_by(2);
        Ok(self.buf.get_u16_le())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        self.advance_by(4);
        Ok(self.buf.get_i32_le())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        self.advance_by(4);
        Ok(self.buf.get_u32_le())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        self.advance_by(8);
        Ok(self.buf.get_i64_le())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        self.advance_by(8);
        Ok(self.buf.get_u64_le())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        self.advance_by(4);
        Ok(self.buf.get_f32_le())
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.ensure(8)?;
        self.advance_by(8);
        Ok(self.buf.get_f64_le())
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        self.advance_by(len);
        Ok(head)
    }

    /// A 4-byte signed length or count; negative values are rejected
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        usize::try_from(len)
            .map_err(|_| TagError::Format(format!("{ERR_NEGATIVE_LENGTH}: {len}")))
    }

    /// Unsigned 7-bit variable-length integer (at most 5 bytes)
    pub fn read_7bit(&mut self) -> Result<u32> {
        let mut result: u32 = 0;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            if shift == 28 && byte > 0x0F {
                return Err(TagError::format(ERR_VARINT_TOO_LONG));
            }
            result |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(TagError::format(ERR_VARINT_TOO_LONG))
    }

    /// Length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_7bit()?;
        if len > i32::MAX as u32 {
            return Err(TagError::Format(format!(
                "{ERR_NEGATIVE_LENGTH}: string length {len}"
            )));
        }
        let bytes = self.read_bytes(len as usize)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| TagError::Format(format!("{ERR_INVALID_UTF8}: {e}")))
    }

    /// A single UTF-8 encoded code point
    pub fn read_char(&mut self) -> Result<char> {
        let lead = self.read_u8()?;
        let width = match lead {
            0x00..=0x7F => return Ok(char::from(lead)),
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(TagError::format(ERR_INVALID_UTF8)),
        };
        let mut scratch = [0u8; 4];
        scratch[0] = lead;
        scratch[1..width].copy_from_slice(self.read_bytes(width - 1)?);
        std::str::from_utf8(&scratch[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or_else(|| TagError::format(ERR_INVALID_UTF8))
    }

    /// 16-byte lo, mid, hi, flags decimal
    pub fn read_decimal(&mut self) -> Result<Decimal> {
        let words = self.read_bytes(16)?;
        let flags = u32::from_le_bytes([words[12], words[13], words[14], words[15]]);
        let scale = (flags >> 16) & 0xFF;
        if flags & DECIMAL_RESERVED_BITS != 0 || scale > MAX_DECIMAL_SCALE {
            return Err(TagError::Format(format!(
                "{ERR_INVALID_DECIMAL}: {flags:#010x}"
            )));
        }
        let mut raw = [0u8; 16];
        raw[0..4].copy_from_slice(&words[12..16]);
        raw[4..16].copy_from_slice(&words[0..12]);
        Ok(Decimal::deserialize(raw))
    }
}
