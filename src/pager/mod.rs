use crate::errors::Error;

pub mod mem;
pub use mem::MemPager;

/// Page-lifetime contract the host supplies to the tree.
///
/// - `Page` is a *zero-copy readable handle* (e.g. `Arc<[u8]>`, an mmap'd
///   slice, or a cache entry) that derefs to `&[u8]`. A fetched handle must
///   stay valid at least until the current mutation call returns.
/// - Ids are opaque nonzero `u64`s; 0 is reserved for "no page" and is
///   never fetched or freed.
/// - `alloc` receives exactly `PAGE_SIZE` bytes and persists (or queues)
///   them under a fresh id. Caching, locking, and durability are all the
///   pager's business, not the tree's.
pub trait Pager {
    type Page: Clone + core::ops::Deref<Target = [u8]>;

    /// Read-only view of a published page.
    fn fetch(&self, id: u64) -> Result<Self::Page, Error>;

    /// Publish a new page and return its id.
    fn alloc(&self, page: &[u8]) -> Result<u64, Error>;

    /// Release a page the tree no longer references.
    fn free(&self, id: u64) -> Result<(), Error>;
}
