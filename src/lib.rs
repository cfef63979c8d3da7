//! A leveled linked index (a skiplist) stores unique integer keys in such a
//! way that they can be efficiently found, inserted and removed, all in
//! `O(log(n))` on average and without any rebalancing.
//!
//! Conceptually, the index resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has links to nodes further down the list, allowing
//! the search to effectively skip ahead. The bottom level links every key;
//! how many levels above it a key reaches is decided at random by a
//! [`LevelGenerator`](level_generator::LevelGenerator) when the key is
//! inserted.
//!
//! ```
//! use leveled_index::LeveledIndex;
//!
//! let mut index = LeveledIndex::new();
//! for key in [5, 1, 9, 3] {
//!     index.insert(key).unwrap();
//! }
//! assert_eq!(index.keys().collect::<Vec<_>>(), [1, 3, 5, 9]);
//! assert!(index.find(9).is_some());
//! assert!(index.delete(9));
//! assert!(index.find(9).is_none());
//! ```
//!
//! Nodes are kept in a single arena and linked by position, so the crate
//! contains no `unsafe` code. The index is not synchronised; share it behind
//! a lock if needed.
//!
//! With the `tracing` feature enabled, insertions, deletions and level growth
//! are reported as `tracing` events.

pub mod level_generator;
mod leveled_index;
mod skipnode;

pub use leveled_index::{IndexError, LeveledIndex, MAX_LEVEL, Structure};
pub use skipnode::{Iter, SkipNode};
