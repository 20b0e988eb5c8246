//! In-memory pager with u64 page IDs.
//! Intended for tests, examples, and ephemeral stores.

use std::sync::Arc;
use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::consts::PAGE_SIZE;
use crate::errors::Error;
use crate::pager::Pager;

struct MemPagerState {
    pages: FxHashMap<u64, Arc<[u8]>>,
    next_id: u64,
}

/// Simple in-memory pager. Interior mutability keeps the trait methods
/// `&self`; wrap in `Arc` to share a store across owners.
pub struct MemPager {
    state: Mutex<MemPagerState>,
}

impl Default for MemPager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemPager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemPagerState {
                pages: FxHashMap::default(),
                next_id: 1,
            }),
        }
    }

    /// Number of pages currently stored (for tests/tools).
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();

        state.pages.len()
    }

    /// True if no pages (for tests/tools).
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock().unwrap();

        state.pages.is_empty()
    }
}

impl Pager for MemPager {
    type Page = Arc<[u8]>;

    fn fetch(&self, id: u64) -> Result<Self::Page, Error> {
        let state = self.state.lock().unwrap();

        state.pages.get(&id).cloned().ok_or(Error::MissingPage)
    }

    fn alloc(&self, page: &[u8]) -> Result<u64, Error> {
        if page.len() != PAGE_SIZE {
            return Err(Error::Invalid("page is not PAGE_SIZE bytes"));
        }
        let mut state = self.state.lock().unwrap();

        let id = state.next_id;
        // checked add to avoid wrap
        state.next_id = state
            .next_id
            .checked_add(1)
            .ok_or(Error::Invalid("id overflow"))?;
        state.pages.insert(id, Arc::from(page));
        Ok(id)
    }

    fn free(&self, id: u64) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();

        state.pages.remove(&id);
        Ok(())
    }
}
