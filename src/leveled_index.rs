//! An ordered index over unique integer keys.

use std::{fmt, iter};

use thiserror::Error;

use crate::{
    level_generator::{Geometric, LevelGenerator},
    skipnode::{Arena, HEAD, Iter, NodeId, SkipNode},
};

/// Hard ceiling on the height of any node, and therefore on the number of
/// levels of a [`LeveledIndex`].
pub const MAX_LEVEL: usize = 16;

/// Caller-contract violations reported by a [`LeveledIndex`].
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum IndexError {
    /// The key is already stored; keys are unique.
    #[error("key {0} is already present.")]
    DuplicateKey(i64),
    /// A node must participate in at least one level.
    #[error("height must be non-zero.")]
    InvalidHeight,
}

// ////////////////////////////////////////////////////////////////////////////
// LeveledIndex
// ////////////////////////////////////////////////////////////////////////////

/// A sorted set of unique `i64` keys replicated across up to [`MAX_LEVEL`]
/// levels.
///
/// Level 0 links every key in ascending order and each higher level links a
/// random subset of the level below it, so that [`find`], [`insert`] and
/// [`delete`] run in expected `O(log n)` time.
///
/// The height of each new node is drawn from a [`LevelGenerator`]. The index
/// grows its number of populated levels by at most one per [`insert`], and
/// never shrinks it.
///
/// [`find`]: LeveledIndex::find
/// [`insert`]: LeveledIndex::insert
/// [`delete`]: LeveledIndex::delete
pub struct LeveledIndex<G = Geometric> {
    // Slot `HEAD` holds the sentinel, spanning all `MAX_LEVEL` levels.
    arena: Arena,
    // Number of populated levels, in `1..=MAX_LEVEL`.  No node is taller.
    top: usize,
    len: usize,
    level_generator: G,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl LeveledIndex<Geometric> {
    /// Create a new index whose node heights follow a geometric distribution
    /// with `$p = 1/2$` over [`MAX_LEVEL`] levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let index = LeveledIndex::new();
    /// assert!(index.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(Geometric::default())
    }

    /// Same as [`LeveledIndex::new`], but the heights drawn for new nodes are
    /// fully determined by `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut a = LeveledIndex::with_seed(7);
    /// let mut b = LeveledIndex::with_seed(7);
    /// for key in 0..100 {
    ///     a.insert(key).unwrap();
    ///     b.insert(key).unwrap();
    /// }
    /// assert_eq!(a.structure().to_string(), b.structure().to_string());
    /// ```
    #[inline]
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_generator(Geometric::default_with_seed(seed))
    }

    /// Create a new index with room for `capacity` keys before the node
    /// storage needs to grow.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut index = LeveledIndex::with_capacity(100);
    /// for key in 0..100 {
    ///     index.insert(key).unwrap();
    /// }
    /// assert_eq!(index.len(), 100);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        LeveledIndex {
            arena: Arena::with_capacity(MAX_LEVEL, capacity),
            top: 1,
            len: 0,
            level_generator: Geometric::default(),
        }
    }
}

impl<G> LeveledIndex<G>
where
    G: LevelGenerator,
{
    /// Create a new index drawing node heights from `level_generator`.
    ///
    /// Levels drawn at or above [`MAX_LEVEL`] are clamped.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::{LeveledIndex, level_generator::CoinFlip};
    ///
    /// let mut index = LeveledIndex::with_generator(CoinFlip::with_seed(16, 1).unwrap());
    /// index.insert(3).unwrap();
    /// assert!(index.contains(3));
    /// ```
    #[inline]
    pub fn with_generator(level_generator: G) -> Self {
        LeveledIndex {
            arena: Arena::new(MAX_LEVEL),
            top: 1,
            len: 0,
            level_generator,
        }
    }

    /// Insert `key`, giving it a randomly drawn height.
    ///
    /// The first key inserted into an empty index always has height 1. When
    /// the drawn height exceeds the current number of levels, the index grows
    /// by exactly one level and the new node reaches that level.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DuplicateKey`] if `key` is already present, in
    /// which case the index is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::{IndexError, LeveledIndex};
    ///
    /// let mut index = LeveledIndex::new();
    /// index.insert(5).unwrap();
    /// assert_eq!(index.insert(5), Err(IndexError::DuplicateKey(5)));
    /// assert_eq!(index.len(), 1);
    /// ```
    pub fn insert(&mut self, key: i64) -> Result<(), IndexError> {
        let update = self.predecessors(key);
        if self.successor(update[0], key).is_some() {
            return Err(IndexError::DuplicateKey(key));
        }

        let height = if self.is_empty() {
            1
        } else {
            let drawn = self
                .level_generator
                .level()
                .saturating_add(1)
                .min(MAX_LEVEL);
            if drawn > self.top {
                self.top += 1;
                #[cfg(feature = "tracing")]
                tracing::debug!(levels = self.top, "leveled index grew by one level");
                self.top
            } else {
                drawn
            }
        };

        self.splice(key, height, &update);
        Ok(())
    }

    /// Insert `key` with exactly the given `height`, bypassing the level
    /// generator.
    ///
    /// Heights above [`MAX_LEVEL`] are clamped. Unlike [`insert`], this
    /// raises the number of levels straight to `height` if needed, which
    /// makes it possible to build a specific layout.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidHeight`] if `height` is zero and
    /// [`IndexError::DuplicateKey`] if `key` is already present. The index is
    /// left untouched in both cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::{LeveledIndex, MAX_LEVEL};
    ///
    /// let mut index = LeveledIndex::new();
    /// index.insert_at_height(1, 3).unwrap();
    /// index.insert_at_height(2, 100).unwrap();
    /// assert_eq!(index.find(1).map(|node| node.height()), Some(3));
    /// assert_eq!(index.find(2).map(|node| node.height()), Some(MAX_LEVEL));
    /// ```
    ///
    /// [`insert`]: LeveledIndex::insert
    pub fn insert_at_height(&mut self, key: i64, height: usize) -> Result<(), IndexError> {
        if height == 0 {
            return Err(IndexError::InvalidHeight);
        }
        let height = height.min(MAX_LEVEL);

        let update = self.predecessors(key);
        if self.successor(update[0], key).is_some() {
            return Err(IndexError::DuplicateKey(key));
        }

        if height > self.top {
            self.top = height;
            #[cfg(feature = "tracing")]
            tracing::debug!(levels = self.top, "leveled index raised to fixed height");
        }

        self.splice(key, height, &update);
        Ok(())
    }

    /// Remove `key` from every level it participates in.
    ///
    /// Returns whether the key was present. Removing an absent key is a
    /// no-op. The number of levels is never reduced.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut index = LeveledIndex::new();
    /// index.insert(4).unwrap();
    /// assert!(index.delete(4));
    /// assert!(!index.delete(4));
    /// assert!(index.is_empty());
    /// ```
    pub fn delete(&mut self, key: i64) -> bool {
        let update = self.predecessors(key);
        let Some(target) = self.successor(update[0], key) else {
            return false;
        };

        for (level, &prev) in update.iter().enumerate().take(self.top) {
            if self.arena[prev].next(level) == Some(target) {
                let next = self.arena[target].next(level);
                self.arena[prev].set_next(level, next);
            }
        }
        self.arena.release(target);
        self.len -= 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(key, len = self.len, "deleted key");
        true
    }
}

impl<G> LeveledIndex<G> {
    /// Returns the number of keys in the index.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut index = LeveledIndex::new();
    /// index.insert(1).unwrap();
    /// index.insert(2).unwrap();
    /// assert_eq!(index.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the index contains no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of populated levels, between 1 and [`MAX_LEVEL`].
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.top
    }

    /// Removes every key from the index and resets it to a single level.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut index = LeveledIndex::new();
    /// index.insert_at_height(1, 4).unwrap();
    /// index.clear();
    /// assert!(index.is_empty());
    /// assert_eq!(index.height(), 1);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.arena.clear();
        self.top = 1;
        self.len = 0;
    }

    /// Returns the node holding `key`, or `None` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut index = LeveledIndex::new();
    /// index.insert(9).unwrap();
    /// assert_eq!(index.find(9).map(|node| node.key()), Some(9));
    /// assert!(index.find(8).is_none());
    /// ```
    #[must_use]
    pub fn find(&self, key: i64) -> Option<&SkipNode> {
        let prev = (0..self.top).rev().fold(HEAD, |node, level| {
            self.arena
                .advance_while_at_level(node, level, |next| next.key() < key)
        });
        self.successor(prev, key).map(|id| &self.arena[id])
    }

    /// Returns `true` if `key` is in the index.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: i64) -> bool {
        self.find(key).is_some()
    }

    /// Iterates over the nodes in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut index = LeveledIndex::new();
    /// for key in [5, 1, 9, 3] {
    ///     index.insert(key).unwrap();
    /// }
    /// let keys: Vec<_> = index.iter().map(|node| node.key()).collect();
    /// assert_eq!(keys, [1, 3, 5, 9]);
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            next: self.arena[HEAD].next(0),
            size: self.len,
        }
    }

    /// Iterates over the keys in ascending order.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.iter().map(SkipNode::key)
    }

    /// Iterates over the keys linked on `level`, in ascending order.
    ///
    /// Level 0 holds every key; levels at or above [`height`] hold none.
    ///
    /// [`height`]: LeveledIndex::height
    pub fn level_keys(&self, level: usize) -> impl Iterator<Item = i64> + '_ {
        self.chain(level).map(move |id| self.arena[id].key())
    }

    /// A displayable dump of every populated level, from the top down.
    ///
    /// Each row starts at the head and shows the keys linked on that level,
    /// with dashes where a key only exists on lower levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use leveled_index::LeveledIndex;
    ///
    /// let mut index = LeveledIndex::new();
    /// index.insert_at_height(1, 1).unwrap();
    /// index.insert_at_height(2, 2).unwrap();
    /// assert_eq!(
    ///     index.structure().to_string(),
    ///     "<head> ------- --> [2]\n<head> --> [1] --> [2]"
    /// );
    /// ```
    #[inline]
    #[must_use]
    pub fn structure(&self) -> Structure<'_> {
        Structure {
            arena: &self.arena,
            top: self.top,
        }
    }

    /// Node ids linked on `level`, in order.
    fn chain(&self, level: usize) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.arena[HEAD].next(level), move |&id| {
            self.arena[id].next(level)
        })
    }

    /// The node right after `prev` on level 0, provided it holds `key`.
    fn successor(&self, prev: NodeId, key: i64) -> Option<NodeId> {
        self.arena[prev]
            .next(0)
            .filter(|&id| self.arena[id].key() == key)
    }

    /// Walk down from the top level, recording on each level the last node
    /// whose key is below `key`.
    ///
    /// Entries at and above `self.top` are left pointing at the head, which
    /// is correct as no node reaches those levels.
    fn predecessors(&self, key: i64) -> [NodeId; MAX_LEVEL] {
        let mut update = [HEAD; MAX_LEVEL];
        let mut node = HEAD;
        for level in (0..self.top).rev() {
            node = self
                .arena
                .advance_while_at_level(node, level, |next| next.key() < key);
            update[level] = node;
        }
        update
    }

    /// Allocate a node for `key` and link it after `update[level]` on each
    /// of its levels.
    fn splice(&mut self, key: i64, height: usize, update: &[NodeId; MAX_LEVEL]) {
        let id = self.arena.alloc(key, height);
        for (level, &prev) in update.iter().enumerate().take(height) {
            let next = self.arena[prev].next(level);
            self.arena[id].set_next(level, next);
            self.arena[prev].set_next(level, Some(id));
        }
        self.len += 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(key, height, len = self.len, "inserted key");
    }

    /// Checks the integrity of the index, panicking on the first violation.
    #[cfg(test)]
    pub(crate) fn check(&self) {
        assert!((1..=MAX_LEVEL).contains(&self.top), "top = {}", self.top);
        assert_eq!(self.len, self.arena.live(), "leaked or lost nodes");

        let base: Vec<NodeId> = self.chain(0).collect();
        assert_eq!(base.len(), self.len);

        for level in 0..MAX_LEVEL {
            let ids: Vec<NodeId> = self.chain(level).collect();
            if level >= self.top {
                assert!(ids.is_empty(), "level {level} is above the top");
            }
            for pair in ids.windows(2) {
                assert!(
                    self.arena[pair[0]].key() < self.arena[pair[1]].key(),
                    "level {level} is not strictly increasing"
                );
            }
            for &id in &ids {
                let height = self.arena[id].height();
                assert!(height > level, "node linked above its height");
                assert!(height <= self.top, "node taller than the index");
            }
            let expected = base
                .iter()
                .filter(|&&id| self.arena[id].height() > level)
                .count();
            assert_eq!(ids.len(), expected, "level {level} misses nodes");
        }
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl Default for LeveledIndex<Geometric> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<G> fmt::Debug for LeveledIndex<G> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl<G> fmt::Display for LeveledIndex<G> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;

        for (i, key) in self.keys().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "]")
    }
}

impl<'a, G> IntoIterator for &'a LeveledIndex<G> {
    type Item = &'a SkipNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Structure
// ////////////////////////////////////////////////////////////////////////////

/// Per-level dump of a [`LeveledIndex`], created by
/// [`LeveledIndex::structure`].
#[derive(Clone, Copy, Debug)]
pub struct Structure<'a> {
    arena: &'a Arena,
    top: usize,
}

impl fmt::Display for Structure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for level in (0..self.top).rev() {
            write!(f, "<head>")?;
            // Walk level 0 for the columns and `level` for the links.
            let mut linked = self.arena[HEAD].next(level);
            let mut column = self.arena[HEAD].next(0);
            while let Some(id) = column {
                let node = &self.arena[id];
                let cell = format!(" --> [{}]", node.key());
                if linked == Some(id) {
                    f.write_str(&cell)?;
                    linked = node.next(level);
                } else {
                    write!(f, " {}", "-".repeat(cell.len() - 1))?;
                }
                column = node.next(0);
            }
            if level > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
