use crate::codecs::{read_u16_at, read_u64_at};
use crate::consts::{HEADER, PAGE_SIZE, SLOT_SIZE};
use crate::errors::Error;
use crate::pager::Pager;
use std::ops::Range;

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Internal = 1,
    Leaf = 2,
}

impl NodeKind {
    pub(crate) fn from_u16(x: u16) -> Result<Self, Error> {
        match x {
            1 => Ok(NodeKind::Internal),
            2 => Ok(NodeKind::Leaf),
            _ => Err(Error::Corrupt("unknown node kind")),
        }
    }
}

/// Read access to the shared page layout.
///
/// Both published pages ([`NodeView`]) and in-flight scratch pages implement
/// this; every structural operation reads its sources through it.
///
/// Layout, little-endian throughout:
///
/// ```text
/// | kind u16 | nkeys u16 | ptrs  nkeys * u64 | offsets nkeys * u16 | KV blob |
/// ```
///
/// Entry `i`'s blob is `klen u16, vlen u16, key, val`. `offsets[i-1]` holds
/// the end of entry `i - 1`'s blob relative to the blob start; the offset of
/// entry 0 is implicitly zero and has no stored slot.
///
/// # Panics
///
/// All accessors bounds-check their index and panic on violation; an
/// out-of-range index is a caller bug, not a recoverable condition.
pub trait Node {
    fn raw(&self) -> &[u8];

    #[inline]
    fn kind(&self) -> NodeKind {
        match read_u16_at(self.raw(), 0) {
            1 => NodeKind::Internal,
            2 => NodeKind::Leaf,
            k => panic!("unknown node kind {k}"),
        }
    }

    #[inline]
    fn nkeys(&self) -> usize {
        read_u16_at(self.raw(), 2) as usize
    }

    #[inline]
    fn ptr(&self, idx: usize) -> u64 {
        assert!(idx < self.nkeys(), "ptr index {idx} out of range");
        read_u64_at(self.raw(), HEADER + 8 * idx)
    }

    /// End offset of entry `idx - 1`'s blob, relative to the blob start.
    /// `offset(0)` is 0 by definition and reads no storage.
    #[inline]
    fn offset(&self, idx: usize) -> usize {
        if idx == 0 {
            return 0;
        }
        assert!(idx <= self.nkeys(), "offset index {idx} out of range");
        let pos = HEADER + 8 * self.nkeys() + 2 * (idx - 1);
        read_u16_at(self.raw(), pos) as usize
    }

    /// Byte position of entry `idx`'s length header. `idx == nkeys` points
    /// one past the last entry and is how `nbytes` is derived.
    #[inline]
    fn kv_pos(&self, idx: usize) -> usize {
        assert!(idx <= self.nkeys(), "kv_pos index {idx} out of range");
        HEADER + SLOT_SIZE * self.nkeys() + self.offset(idx)
    }

    #[inline]
    fn key(&self, idx: usize) -> &[u8] {
        assert!(idx < self.nkeys(), "key index {idx} out of range");
        let pos = self.kv_pos(idx);
        let klen = read_u16_at(self.raw(), pos) as usize;
        &self.raw()[pos + 4..pos + 4 + klen]
    }

    #[inline]
    fn val(&self, idx: usize) -> &[u8] {
        let r = self.val_range(idx);
        &self.raw()[r]
    }

    /// Exact byte range of entry `idx`'s value payload.
    #[inline]
    fn val_range(&self, idx: usize) -> Range<usize> {
        assert!(idx < self.nkeys(), "val index {idx} out of range");
        let pos = self.kv_pos(idx);
        let klen = read_u16_at(self.raw(), pos) as usize;
        let vlen = read_u16_at(self.raw(), pos + 2) as usize;
        let start = pos + 4 + klen;
        start..start + vlen
    }

    /// Total meaningful bytes: header, slots, and the packed KV blob.
    #[inline]
    fn nbytes(&self) -> usize {
        self.kv_pos(self.nkeys())
    }
}

/// A read-only node over a published pager page.
#[derive(Clone)]
pub struct NodeView<P: Pager> {
    page: P::Page,
}

impl<P: Pager> NodeView<P> {
    pub fn new(page: P::Page) -> Result<Self, Error> {
        if page.len() != PAGE_SIZE {
            return Err(Error::Corrupt("page is not PAGE_SIZE bytes"));
        }
        NodeKind::from_u16(read_u16_at(&page, 0))?;
        let nkeys = read_u16_at(&page, 2) as usize;
        if HEADER + SLOT_SIZE * nkeys > PAGE_SIZE {
            return Err(Error::Corrupt("slot area exceeds page"));
        }
        Ok(Self { page })
    }

    #[inline]
    pub fn into_page(self) -> P::Page {
        self.page
    }
}

impl<P: Pager> Node for NodeView<P> {
    #[inline]
    fn raw(&self) -> &[u8] {
        &self.page
    }
}

impl<P: Pager> std::fmt::Debug for NodeView<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("NodeView");
        d.field("kind", &self.kind())
            .field("nkeys", &self.nkeys())
            .field("nbytes", &self.nbytes());
        let keys: Vec<String> = (0..self.nkeys())
            .map(|i| {
                let k = self.key(i);
                match std::str::from_utf8(k) {
                    Ok(s) if s.len() <= 16 => s.to_string(),
                    _ => format!("{} bytes", k.len()),
                }
            })
            .collect();
        d.field("keys", &keys).finish()
    }
}
