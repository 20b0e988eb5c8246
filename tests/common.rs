//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use cow_btree::bplus_tree::BPlusTree;
use cow_btree::consts::PAGE_SIZE;
use cow_btree::errors::Error;
use cow_btree::pager::Pager;
use cow_btree::views::{Node, NodeKind, NodeView};

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, Mutex};

// ---------------- In-memory pager with strict free tracking ----------------

struct Inner {
    pages: FxHashMap<u64, Arc<[u8]>>,
    next_id: u64,
}

/// Clonable pager handle so tests can inspect pages behind a tree's back.
/// `free` is strict: releasing an id that is not live is a test failure.
#[derive(Clone)]
pub struct TestPager {
    inner: Arc<Mutex<Inner>>,
}

impl TestPager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                pages: FxHashMap::default(),
                next_id: 1,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().pages.len()
    }

    pub fn page(&self, id: u64) -> Option<Arc<[u8]>> {
        self.inner.lock().unwrap().pages.get(&id).cloned()
    }
}

impl Pager for TestPager {
    type Page = Arc<[u8]>;

    fn fetch(&self, id: u64) -> Result<Self::Page, Error> {
        let g = self.inner.lock().unwrap();
        g.pages.get(&id).cloned().ok_or(Error::MissingPage)
    }

    fn alloc(&self, page: &[u8]) -> Result<u64, Error> {
        if page.len() != PAGE_SIZE {
            return Err(Error::Invalid("page is not PAGE_SIZE bytes"));
        }
        let mut g = self.inner.lock().unwrap();
        let id = g.next_id;
        g.next_id += 1;
        g.pages.insert(id, Arc::from(page));
        Ok(id)
    }

    fn free(&self, id: u64) -> Result<(), Error> {
        let mut g = self.inner.lock().unwrap();
        match g.pages.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::MissingPage),
        }
    }
}

pub fn create_tree() -> (BPlusTree<TestPager>, TestPager) {
    let pager = TestPager::new();
    (BPlusTree::new(pager.clone(), 0), pager)
}

// ---------------- Tree walking and invariant checking ----------------

/// Walk the whole tree, asserting every structural invariant along the way,
/// and return the user entries in key order (sentinel stripped):
///
/// * every reachable page is exactly `PAGE_SIZE` with `nbytes <= PAGE_SIZE`
/// * keys are globally strictly ascending, sentinel first
/// * all leaves sit at the same depth
/// * each internal separator equals its child's first key
/// * the pager stores exactly the reachable set (no leaks, no dangling ids)
pub fn check_tree(pager: &TestPager, root: u64) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut entries = Vec::new();
    if root == 0 {
        assert_eq!(pager.len(), 0, "empty tree must own no pages");
        return entries;
    }

    let mut reachable = FxHashSet::default();
    let mut leaf_depth = None;
    walk(pager, root, 0, &mut leaf_depth, &mut entries, &mut reachable);

    assert_eq!(
        reachable.len(),
        pager.len(),
        "stored pages differ from reachable pages"
    );

    assert!(!entries.is_empty(), "non-empty root with no entries");
    assert!(entries[0].0.is_empty(), "sentinel missing from leftmost leaf");
    for w in entries.windows(2) {
        assert!(w[0].0 < w[1].0, "keys out of order: {:?} !< {:?}", w[0].0, w[1].0);
    }

    entries.remove(0);
    entries
}

fn walk(
    pager: &TestPager,
    id: u64,
    depth: usize,
    leaf_depth: &mut Option<usize>,
    out: &mut Vec<(Vec<u8>, Vec<u8>)>,
    reachable: &mut FxHashSet<u64>,
) {
    assert!(reachable.insert(id), "page {id} reachable through two paths");
    let page = pager.fetch(id).unwrap();
    assert_eq!(page.len(), PAGE_SIZE, "published page has wrong size");
    let node = NodeView::<TestPager>::new(page).unwrap();
    assert!(node.nbytes() <= PAGE_SIZE, "page {id} content overflows");
    if depth > 0 {
        assert!(node.nkeys() >= 1, "empty non-root page {id}");
    }

    match node.kind() {
        NodeKind::Leaf => {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(d) => assert_eq!(d, depth, "leaves at unequal depths"),
            }
            for i in 0..node.nkeys() {
                out.push((node.key(i).to_vec(), node.val(i).to_vec()));
            }
        }
        NodeKind::Internal => {
            for i in 0..node.nkeys() {
                assert!(node.val(i).is_empty(), "internal entry carries a value");
                let mark = out.len();
                walk(pager, node.ptr(i), depth + 1, leaf_depth, out, reachable);
                assert!(out.len() > mark, "internal child {i} of page {id} is empty");
                assert_eq!(
                    out[mark].0,
                    node.key(i).to_vec(),
                    "separator does not match child's first key"
                );
            }
        }
    }
}

/// Number of levels from root to leaf; 0 for the empty tree.
pub fn height(pager: &TestPager, root: u64) -> usize {
    if root == 0 {
        return 0;
    }
    let mut h = 1;
    let mut id = root;
    loop {
        let node = NodeView::<TestPager>::new(pager.fetch(id).unwrap()).unwrap();
        match node.kind() {
            NodeKind::Leaf => return h,
            NodeKind::Internal => {
                id = node.ptr(0);
                h += 1;
            }
        }
    }
}

/// Root page as a view, for tests that assert on the raw layout.
pub fn root_view(pager: &TestPager, root: u64) -> NodeView<TestPager> {
    NodeView::<TestPager>::new(pager.fetch(root).unwrap()).unwrap()
}
