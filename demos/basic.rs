//! Minimal end-to-end walkthrough: insert, look up, overwrite, delete.
//!
//! Run with: cargo run --example basic

use cow_btree::bplus_tree::BPlusTree;
use cow_btree::pager::MemPager;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pager = MemPager::new();
    let mut tree = BPlusTree::new(pager, 0);

    tree.insert(b"languages/rust", b"systems")?;
    tree.insert(b"languages/go", b"services")?;
    tree.insert(b"languages/python", b"scripts")?;

    if let Some(v) = tree.get(b"languages/rust")? {
        println!("languages/rust -> {}", String::from_utf8_lossy(&v));
    }

    // Overwrite keeps one entry per key.
    tree.insert(b"languages/rust", b"systems + wasm")?;
    println!(
        "after overwrite: {:?}",
        tree.get(b"languages/rust")?.map(|v| String::from_utf8_lossy(&v).into_owned())
    );

    assert!(tree.delete(b"languages/go")?);
    assert!(!tree.delete(b"languages/go")?);
    println!("languages/go present: {}", tree.contains_key(b"languages/go")?);

    // The root id is all a host needs to persist.
    println!("root page id: {}", tree.root());
    Ok(())
}
