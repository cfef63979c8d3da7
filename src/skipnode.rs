use std::{iter::FusedIterator, ops};

/// Position of a node inside the [`Arena`].
pub(crate) type NodeId = usize;

/// The head sentinel always occupies the first slot of the arena.
pub(crate) const HEAD: NodeId = 0;

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// A single stored key together with its forward links.
///
/// A node of height `h` participates in levels `0..h` and therefore has `h`
/// links, one per level. `links[i]` is the next node on level `i`, or `None`
/// if this node is the last one on that level.
///
/// Links are indices into the [`Arena`] which owns every node, so the same
/// node can be reached from several levels without being aliased.
#[derive(Clone, Debug)]
pub struct SkipNode {
    // Meaningless for the head node.
    key: i64,
    // Links to the next node at the respective level.  The length of this
    // vector is the height of the node.
    links: Vec<Option<NodeId>>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl SkipNode {
    /// Create a new head node spanning `total_levels`.
    pub(crate) fn head(total_levels: usize) -> Self {
        SkipNode {
            key: 0,
            links: vec![None; total_levels],
        }
    }

    /// Create a new node with the given key.
    /// All links default to `None`.
    pub(crate) fn new(key: i64, height: usize) -> Self {
        SkipNode {
            key,
            links: vec![None; height],
        }
    }

    /// The key stored in this node.
    #[inline]
    #[must_use]
    pub fn key(&self) -> i64 {
        self.key
    }

    /// The number of levels this node participates in.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.links.len()
    }

    /// The next node on `level`, if any.
    ///
    /// Levels above the height of the node have no next node.
    #[inline]
    pub(crate) fn next(&self, level: usize) -> Option<NodeId> {
        self.links.get(level).copied().flatten()
    }

    /// Panics if `level` is not below the height of the node.
    #[inline]
    pub(crate) fn set_next(&mut self, level: usize, next: Option<NodeId>) {
        self.links[level] = next;
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

/// Owner of every node, including the head sentinel at [`HEAD`].
///
/// Slots released by a deletion are recycled by later insertions.
#[derive(Clone, Debug)]
pub(crate) struct Arena {
    nodes: Vec<SkipNode>,
    free: Vec<NodeId>,
}

impl Arena {
    /// Create an arena holding only a head node spanning `total_levels`.
    pub(crate) fn new(total_levels: usize) -> Self {
        Self::with_capacity(total_levels, 0)
    }

    /// Same as [`Arena::new`], with room for `capacity` nodes besides the
    /// head.
    pub(crate) fn with_capacity(total_levels: usize, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(1));
        nodes.push(SkipNode::head(total_levels));
        Arena {
            nodes,
            free: Vec::new(),
        }
    }

    /// Store a new, unlinked node and return its position.
    pub(crate) fn alloc(&mut self, key: i64, height: usize) -> NodeId {
        let node = SkipNode::new(key, height);
        if let Some(id) = self.free.pop() {
            self.nodes[id] = node;
            id
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    /// Give back the slot of a node which has been unlinked from every level.
    pub(crate) fn release(&mut self, id: NodeId) {
        debug_assert_ne!(id, HEAD, "the head node is never released");
        let node = &mut self.nodes[id];
        node.links.clear();
        node.links.shrink_to_fit();
        self.free.push(id);
    }

    /// Drop every node apart from the head, whose links are reset.
    pub(crate) fn clear(&mut self) {
        self.nodes.truncate(1);
        self.free.clear();
        for link in &mut self.nodes[HEAD].links {
            *link = None;
        }
    }

    /// Number of occupied slots, not counting the head.
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - 1 - self.free.len()
    }

    /// Keep moving at the specified level as long as `pred` holds for the
    /// next node, and return where we stopped.
    pub(crate) fn advance_while_at_level(
        &self,
        from: NodeId,
        level: usize,
        mut pred: impl FnMut(&SkipNode) -> bool,
    ) -> NodeId {
        let mut current = from;
        while let Some(next) = self.nodes[current].next(level) {
            if !pred(&self.nodes[next]) {
                break;
            }
            current = next;
        }
        current
    }
}

impl ops::Index<NodeId> for Arena {
    type Output = SkipNode;

    #[inline]
    fn index(&self, id: NodeId) -> &SkipNode {
        &self.nodes[id]
    }
}

impl ops::IndexMut<NodeId> for Arena {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut SkipNode {
        &mut self.nodes[id]
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Iterators
// ////////////////////////////////////////////////////////////////////////////

/// Iterator over the nodes of a leveled index in ascending key order.
///
/// Created by [`LeveledIndex::iter`](crate::LeveledIndex::iter).
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) next: Option<NodeId>,
    pub(crate) size: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SkipNode;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let arena: &'a Arena = self.arena;
        let node = &arena[self.next?];
        self.next = node.next(0);
        self.size = self.size.saturating_sub(1);
        Some(node)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Arena, HEAD, Iter};

    /// Link `keys` on level 0 only, in the given order.
    fn chain(keys: &[i64]) -> Arena {
        let mut arena = Arena::new(4);
        let mut last = HEAD;
        for &key in keys {
            let id = arena.alloc(key, 1);
            arena[last].set_next(0, Some(id));
            last = id;
        }
        arena
    }

    #[test]
    fn head_spans_all_levels() {
        let arena = Arena::new(4);
        assert_eq!(arena[HEAD].height(), 4);
        assert!((0..4).all(|level| arena[HEAD].next(level).is_none()));
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn next_above_height_is_none() {
        let arena = chain(&[1]);
        let first = arena[HEAD].next(0).unwrap_or(HEAD);
        assert_eq!(arena[first].key(), 1);
        assert_eq!(arena[first].height(), 1);
        assert!(arena[first].next(3).is_none());
    }

    #[test]
    fn released_slots_are_reused() {
        let mut arena = chain(&[1, 2, 3]);
        assert_eq!(arena.live(), 3);
        arena[1].set_next(0, Some(3));
        arena.release(2);
        assert_eq!(arena.live(), 2);

        let id = arena.alloc(7, 2);
        assert_eq!(id, 2);
        assert_eq!(arena[id].key(), 7);
        assert_eq!(arena[id].height(), 2);
        assert_eq!(arena.live(), 3);
    }

    #[test]
    fn clear_resets_head() {
        let mut arena = chain(&[1, 2, 3]);
        arena.clear();
        assert_eq!(arena.live(), 0);
        assert!(arena[HEAD].next(0).is_none());
        assert_eq!(arena.alloc(5, 1), 1);
    }

    #[test]
    fn advance_stops_before_predicate_fails() {
        let arena = chain(&[1, 3, 5, 7]);
        let stop = arena.advance_while_at_level(HEAD, 0, |next| next.key() < 5);
        assert_eq!(arena[stop].key(), 3);
        let stop = arena.advance_while_at_level(HEAD, 0, |_| true);
        assert_eq!(arena[stop].key(), 7);
        let stop = arena.advance_while_at_level(HEAD, 0, |_| false);
        assert_eq!(stop, HEAD);
    }

    #[test]
    fn iter() {
        let arena = chain(&[2, 4, 6]);
        let mut iter = Iter {
            arena: &arena,
            next: arena[HEAD].next(0),
            size: 3,
        };
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next().map(|node| node.key()), Some(2));
        assert_eq!(iter.len(), 2);
        let rest: Vec<_> = iter.map(|node| node.key()).collect();
        assert_eq!(rest, vec![4, 6]);
    }
}
