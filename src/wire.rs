//! Low-level wire primitives: varints, zigzag, and fixed-width layouts.
//!
//! Everything byte-exact lives here so the size pass, the write pass and the
//! parser all agree on the same numbers.

use bytes::BytesMut;

use crate::{Result, WireError};

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_BYTES: usize = 10;

/// Returns the number of bytes `value` occupies as a varint.
///
/// Thresholds at 2^7, 2^14, ... 2^63 map to 1..=10 bytes. The encoder
/// pre-sizes its output buffer from these counts, so they must match
/// [`put_varint`] exactly.
#[inline]
pub fn varint_size(value: u64) -> usize {
    if value < (1 << 35) {
        if value < (1 << 7) {
            1
        } else if value < (1 << 14) {
            2
        } else if value < (1 << 21) {
            3
        } else if value < (1 << 28) {
            4
        } else {
            5
        }
    } else if value < (1 << 42) {
        6
    } else if value < (1 << 49) {
        7
    } else if value < (1 << 56) {
        8
    } else if value < (1 << 63) {
        9
    } else {
        10
    }
}

/// Appends `value` as a little-endian base-128 varint.
///
/// The continuation bit (0x80) is set on every byte but the last.
#[inline]
pub fn put_varint(out: &mut BytesMut, mut value: u64) {
    let mut buf = [0u8; MAX_VARINT_BYTES];
    let mut len = 0;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf[len] = byte;
        len += 1;
        if value == 0 {
            break;
        }
    }
    out.extend_from_slice(&buf[..len]);
}

/// Appends a 4-byte little-endian value.
#[inline]
pub fn put_fixed32(out: &mut BytesMut, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends an 8-byte little-endian value.
#[inline]
pub fn put_fixed64(out: &mut BytesMut, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Reads a varint from the front of `buf`, advancing it past the consumed
/// bytes. `offset` is the absolute position of `buf` in the original input
/// and is only used for error reporting.
pub fn read_varint(buf: &mut &[u8], offset: usize) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    for i in 0..MAX_VARINT_BYTES {
        let Some(&byte) = buf.get(i) else {
            return Err(WireError::Truncated { offset: offset + i });
        };
        result |= ((byte & 0x7F) as u64) << shift;
        if byte & 0x80 == 0 {
            *buf = &buf[i + 1..];
            return Ok(result);
        }
        shift += 7;
    }
    Err(WireError::VarintTooLong { offset })
}

/// Reads a 4-byte little-endian value from the front of `buf`.
pub fn read_fixed32(buf: &mut &[u8], offset: usize) -> Result<u32> {
    let Some(bytes) = buf.get(..4) else {
        return Err(WireError::Truncated { offset });
    };
    let value = u32::from_le_bytes(bytes.try_into().unwrap());
    *buf = &buf[4..];
    Ok(value)
}

/// Reads an 8-byte little-endian value from the front of `buf`.
pub fn read_fixed64(buf: &mut &[u8], offset: usize) -> Result<u64> {
    let Some(bytes) = buf.get(..8) else {
        return Err(WireError::Truncated { offset });
    };
    let value = u64::from_le_bytes(bytes.try_into().unwrap());
    *buf = &buf[8..];
    Ok(value)
}

/// Zigzag-encodes a signed 32-bit integer.
///
/// Maps small-magnitude values to small unsigned values:
/// 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
#[inline]
pub fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Zigzag-encodes a signed 64-bit integer.
#[inline]
pub fn zigzag_encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode32`].
#[inline]
pub fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Inverse of [`zigzag_encode64`].
#[inline]
pub fn zigzag_decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
