//! Page-layout constants shared by the codec, the builders, and the tree.

/// Size of every published page, in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Bytes occupied by the page header: `u16 kind` + `u16 nkeys`.
pub const HEADER: usize = 4;

/// Per-entry slot cost outside the KV blob: an 8-byte child pointer plus a
/// 2-byte end offset.
pub const SLOT_SIZE: usize = 10;

/// The maximum allowed key length.
pub const MAX_KEY_SIZE: usize = 1000;
/// The maximum allowed value length.
pub const MAX_VALUE_SIZE: usize = 3000;

const _: () = {
    // A single worst-case entry (pointer + offset + lengths + key + value)
    // must fit on one page together with the header.
    assert!(
        HEADER + SLOT_SIZE + 4 + MAX_KEY_SIZE + MAX_VALUE_SIZE <= PAGE_SIZE,
        "a maximal entry does not fit in one page"
    );
    // Entry end offsets are stored as u16, so even a double-size scratch
    // page must stay addressable.
    assert!(2 * PAGE_SIZE <= (1 << 16), "offsets must fit in u16");
};
