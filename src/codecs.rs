//! Little-endian field access for the fixed page layout.
//!
//! Every header, pointer, offset, and length field on a page goes through
//! these helpers; nothing else touches raw bytes.

#[inline]
pub fn read_u16_at(b: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes(b[pos..pos + 2].try_into().unwrap())
}

#[inline]
pub fn write_u16_at(b: &mut [u8], pos: usize, x: u16) {
    b[pos..pos + 2].copy_from_slice(&x.to_le_bytes());
}

#[inline]
pub fn read_u64_at(b: &[u8], pos: usize) -> u64 {
    u64::from_le_bytes(b[pos..pos + 8].try_into().unwrap())
}

#[inline]
pub fn write_u64_at(b: &mut [u8], pos: usize, x: u64) {
    b[pos..pos + 8].copy_from_slice(&x.to_le_bytes());
}
