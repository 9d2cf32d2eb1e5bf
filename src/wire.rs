//! Bounds-checked big-endian readers over a received message.

use crate::error::{DnsError, Result};

/// Returns `len` bytes at `offset`, or `MalformedMessage` naming `what` if they are not all there.
/// A read that runs off the buffer reports the buffer length as its offset.
pub fn take<'a>(bytes: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| {
            DnsError::malformed(
                bytes.len(),
                format!(
                    "{} at {} needs {} bytes, {} available",
                    what,
                    offset,
                    len,
                    bytes.len().saturating_sub(offset)
                ),
            )
        })
}

pub fn read_u16(bytes: &[u8], offset: usize, what: &str) -> Result<u16> {
    let b = take(bytes, offset, 2, what)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub fn read_u32(bytes: &[u8], offset: usize, what: &str) -> Result<u32> {
    let b = take(bytes, offset, 4, what)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}
