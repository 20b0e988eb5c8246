//! Copy-on-write B+Tree driver.
//!
//! Mutations never touch a published page: each `insert`/`delete` rebuilds
//! the root-to-leaf path it crossed into scratch buffers, publishes the new
//! pages through the pager, frees the replaced ids, and re-roots the tree.
//!
//! Two conventions keep the recursion simple:
//!
//! * Slot 0 of the leftmost leaf holds the empty-key sentinel, planted on
//!   the first insert. Every probe therefore has a `<=` match and
//!   `find_le` never misses.
//! * An internal entry `i` is the pair `(key(i), ptr(i))` where `key(i)` is
//!   the smallest key reachable through child `i`; separators are rebuilt
//!   from each child's first key whenever children are replaced.
//!
//! Both mutation paths hand every rebuilt node to `split3` before splicing
//! it into its parent. On insert that is where overflow is expected; on
//! delete it covers the rarer case where a grown separator (the deleted key
//! was its child's first) pushes an almost-full parent past `PAGE_SIZE`.

mod ops;

use crate::consts::{HEADER, MAX_KEY_SIZE, MAX_VALUE_SIZE, PAGE_SIZE};
use crate::errors::Error;
use crate::pager::Pager;
use crate::scratch::ScratchNode;
use crate::views::node_view::{Node, NodeKind, NodeView};
use crate::views::value_view::ValueRef;
use ops::SplitParts;

enum MergeDir<P: Pager> {
    None,
    Left(NodeView<P>),
    Right(NodeView<P>),
}

pub struct BPlusTree<P: Pager> {
    pager: P,
    root: u64,
}

impl<P: Pager> BPlusTree<P> {
    /// Open a tree over `pager` with the given root id; 0 is the empty tree.
    pub fn new(pager: P, root: u64) -> Self {
        Self { pager, root }
    }

    /// The current root page id, 0 when empty. Hosts persist this between
    /// sessions.
    #[inline]
    pub fn root(&self) -> u64 {
        self.root
    }

    /// Re-root the tree, e.g. after the host reloads a persisted root id.
    #[inline]
    pub fn set_root(&mut self, root: u64) {
        self.root = root;
    }

    // ----------------------------- public ops --------------------------------

    /// Store `key -> val`, replacing any previous value.
    ///
    /// # Panics
    ///
    /// Panics on an empty key, a key longer than [`MAX_KEY_SIZE`], or a
    /// value longer than [`MAX_VALUE_SIZE`]; those are caller bugs at this
    /// layer.
    pub fn insert(&mut self, key: &[u8], val: &[u8]) -> Result<(), Error> {
        assert!(!key.is_empty(), "empty key");
        assert!(key.len() <= MAX_KEY_SIZE, "key too long");
        assert!(val.len() <= MAX_VALUE_SIZE, "value too long");

        if self.root == 0 {
            // First insert: plant the sentinel so every later probe has a
            // `<=` match at slot 0.
            let mut root = ScratchNode::page_sized();
            root.set_header(NodeKind::Leaf, 2);
            root.append_kv(0, 0, &[], &[]);
            root.append_kv(1, 0, key, val);
            self.root = self.pager.alloc(root.as_page())?;
            return Ok(());
        }

        let node = self.fetch(self.root)?;
        self.pager.free(self.root)?;
        let updated = self.tree_insert(&node, key, val)?;
        self.root = self.publish_root(ops::split3(updated))?;
        Ok(())
    }

    /// Remove `key`, returning whether it was present.
    ///
    /// # Panics
    ///
    /// Panics on an empty or oversized key, as [`insert`](Self::insert).
    pub fn delete(&mut self, key: &[u8]) -> Result<bool, Error> {
        assert!(!key.is_empty(), "empty key");
        assert!(key.len() <= MAX_KEY_SIZE, "key too long");
        if self.root == 0 {
            return Ok(false);
        }

        let node = self.fetch(self.root)?;
        let Some(updated) = self.tree_delete(&node, key)? else {
            return Ok(false);
        };

        self.pager.free(self.root)?;
        let parts = ops::split3(updated);
        if parts.len() == 1 && parts[0].kind() == NodeKind::Internal && parts[0].nkeys() == 1 {
            // The root kept a single child; drop one level.
            self.root = parts[0].ptr(0);
        } else {
            self.root = self.publish_root(parts)?;
        }
        Ok(true)
    }

    /// Point lookup. The returned [`ValueRef`] keeps the leaf page alive.
    pub fn get(&self, key: &[u8]) -> Result<Option<ValueRef<P::Page>>, Error> {
        if self.root == 0 || key.is_empty() || key.len() > MAX_KEY_SIZE {
            return Ok(None);
        }
        let mut id = self.root;
        loop {
            let node = self.fetch(id)?;
            let idx = ops::find_le(&node, key);
            match node.kind() {
                NodeKind::Internal => id = node.ptr(idx),
                NodeKind::Leaf => {
                    if node.key(idx) != key {
                        return Ok(None);
                    }
                    let range = node.val_range(idx);
                    return Ok(Some(ValueRef::new(node.into_page(), range)));
                }
            }
        }
    }

    pub fn contains_key(&self, key: &[u8]) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    // --------------------------- insert recursion ----------------------------

    /// Rebuild `node` with `(key, val)` applied. The result may exceed
    /// `PAGE_SIZE` by one entry; the caller splits it.
    fn tree_insert(&self, node: &NodeView<P>, key: &[u8], val: &[u8]) -> Result<ScratchNode, Error> {
        let mut new = ScratchNode::oversized();
        let idx = ops::find_le(node, key);
        match node.kind() {
            NodeKind::Leaf => {
                if node.key(idx) == key {
                    ops::leaf_update(&mut new, node, idx, key, val);
                } else {
                    // The insertion point is just past the last `<=` slot;
                    // with the sentinel at slot 0 this is never slot 0.
                    ops::leaf_insert(&mut new, node, idx + 1, key, val);
                }
            }
            NodeKind::Internal => self.node_insert(&mut new, node, idx, key, val)?,
        }
        Ok(new)
    }

    /// Descend into child `idx`, then splice the split results back into a
    /// rebuilt parent.
    fn node_insert(
        &self,
        new: &mut ScratchNode,
        node: &NodeView<P>,
        idx: usize,
        key: &[u8],
        val: &[u8],
    ) -> Result<(), Error> {
        let kptr = node.ptr(idx);
        let knode = self.fetch(kptr)?;
        self.pager.free(kptr)?;

        let updated = self.tree_insert(&knode, key, val)?;
        self.replace_kids(new, node, idx, ops::split3(updated))
    }

    /// `new` := internal `old` with child slot `idx` replaced by one entry
    /// per kid, each published through the pager and keyed by its first key.
    fn replace_kids(
        &self,
        new: &mut ScratchNode,
        old: &NodeView<P>,
        idx: usize,
        kids: SplitParts,
    ) -> Result<(), Error> {
        let inc = kids.len();
        new.set_header(NodeKind::Internal, old.nkeys() + inc - 1);
        new.append_range(old, 0, 0, idx);
        for (i, kid) in kids.iter().enumerate() {
            let id = self.pager.alloc(kid.as_page())?;
            new.append_kv(idx + i, id, kid.key(0), &[]);
        }
        new.append_range(old, idx + inc, idx + 1, old.nkeys() - idx - 1);
        Ok(())
    }

    // --------------------------- delete recursion ----------------------------

    /// Rebuild `node` with `key` removed. `None` means the key was absent
    /// and nothing was freed or rebuilt.
    fn tree_delete(&self, node: &NodeView<P>, key: &[u8]) -> Result<Option<ScratchNode>, Error> {
        let idx = ops::find_le(node, key);
        match node.kind() {
            NodeKind::Leaf => {
                if node.key(idx) != key {
                    return Ok(None);
                }
                let mut new = ScratchNode::page_sized();
                ops::leaf_delete(&mut new, node, idx);
                Ok(Some(new))
            }
            NodeKind::Internal => self.node_delete(node, idx, key),
        }
    }

    fn node_delete(
        &self,
        node: &NodeView<P>,
        idx: usize,
        key: &[u8],
    ) -> Result<Option<ScratchNode>, Error> {
        let kptr = node.ptr(idx);
        let knode = self.fetch(kptr)?;
        let Some(updated) = self.tree_delete(&knode, key)? else {
            return Ok(None);
        };
        self.pager.free(kptr)?;

        let mut new = ScratchNode::oversized();
        match self.should_merge(node, idx, &updated)? {
            MergeDir::Left(sibling) => {
                let mut merged = ScratchNode::page_sized();
                ops::merge(&mut merged, &sibling, &updated);
                self.pager.free(node.ptr(idx - 1))?;
                let id = self.pager.alloc(merged.as_page())?;
                ops::replace_2kid(&mut new, node, idx - 1, id, merged.key(0));
            }
            MergeDir::Right(sibling) => {
                let mut merged = ScratchNode::page_sized();
                ops::merge(&mut merged, &updated, &sibling);
                self.pager.free(node.ptr(idx + 1))?;
                let id = self.pager.alloc(merged.as_page())?;
                ops::replace_2kid(&mut new, node, idx, id, merged.key(0));
            }
            MergeDir::None => {
                if updated.nkeys() == 0 {
                    // Only an only-child root can empty out completely; the
                    // leftmost leaf always retains its sentinel.
                    assert!(node.nkeys() == 1 && idx == 0, "empty non-root child");
                    new.set_header(NodeKind::Internal, 0);
                } else {
                    self.replace_kids(&mut new, node, idx, ops::split3(updated))?;
                }
            }
        }
        Ok(Some(new))
    }

    /// Merge policy: a child under a quarter page joins a sibling when the
    /// combined node (sharing one header) still fits a page.
    fn should_merge(
        &self,
        parent: &NodeView<P>,
        idx: usize,
        updated: &ScratchNode,
    ) -> Result<MergeDir<P>, Error> {
        if updated.nbytes() > PAGE_SIZE / 4 {
            return Ok(MergeDir::None);
        }
        if idx > 0 {
            let sibling = self.fetch(parent.ptr(idx - 1))?;
            if sibling.nbytes() + updated.nbytes() - HEADER <= PAGE_SIZE {
                return Ok(MergeDir::Left(sibling));
            }
        }
        if idx + 1 < parent.nkeys() {
            let sibling = self.fetch(parent.ptr(idx + 1))?;
            if sibling.nbytes() + updated.nbytes() - HEADER <= PAGE_SIZE {
                return Ok(MergeDir::Right(sibling));
            }
        }
        Ok(MergeDir::None)
    }

    // ------------------------------ pager I/O ---------------------------------

    /// Publish 1–3 root-level parts: a lone part becomes the root, several
    /// grow the tree by one internal level.
    fn publish_root(&self, parts: SplitParts) -> Result<u64, Error> {
        if parts.len() == 1 {
            return self.pager.alloc(parts[0].as_page());
        }
        let mut root = ScratchNode::page_sized();
        root.set_header(NodeKind::Internal, parts.len());
        for (i, part) in parts.iter().enumerate() {
            let id = self.pager.alloc(part.as_page())?;
            root.append_kv(i, id, part.key(0), &[]);
        }
        self.pager.alloc(root.as_page())
    }

    #[inline]
    fn fetch(&self, id: u64) -> Result<NodeView<P>, Error> {
        debug_assert!(id != 0, "page id 0 is never fetched");
        NodeView::new(self.pager.fetch(id)?)
    }
}
