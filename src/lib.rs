//! cow-btree: a copy-on-write B+Tree core over a pluggable pager.
//!
//! The tree maps byte-string keys to byte-string values inside fixed-size
//! 4096-byte pages. Page lifetime (fetch, allocate, free) is delegated to a
//! host-supplied [`pager::Pager`]; the core never mutates a published page.
//! Every `insert`/`delete` rebuilds the page path it touched and re-roots
//! the tree, so the previous root remains a consistent snapshot until the
//! host discards it.

pub mod errors;

pub mod consts;

pub mod codecs;

pub mod bplus_tree;
pub use bplus_tree::*;

pub mod pager;

pub mod views;

mod scratch;

pub mod prelude {
    pub use crate::bplus_tree::BPlusTree;
    pub use crate::pager::Pager;
    pub use crate::views::node_view::Node as _;
}
