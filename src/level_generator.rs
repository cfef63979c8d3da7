//! Leveled indices use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level $n > 0$ will contain a random subset of the nodes on level `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level $n$ is $p$ times the chance of occupying level $n-1$
//! (with $0 < p < 1$).
//!
//! Two generators are provided:
//!
//! - [`Geometric`] samples the truncated geometric distribution directly by
//!   inverting its CDF. This is the default.
//! - [`CoinFlip`] promotes a node one level at a time for as long as a fair
//!   coin keeps landing heads.
//!
//! Both can be seeded so that the resulting layout is reproducible. Custom
//! level generators can be implemented through [`LevelGenerator`].

pub mod coin_flip;
pub mod geometric;

pub use coin_flip::{CoinFlip, CoinFlipError};
pub use geometric::{Geometric, GeometricError};

/// Upon the insertion of a new node in the index, the node is replicated to
/// higher levels with a certain probability as determined by a
/// [`LevelGenerator`].
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    #[must_use]
    fn total(&self) -> usize;

    /// Generate a random level for a new node in the range `[0, total)`.
    ///
    /// The node then participates in levels `0..=level`, so its height is
    /// `level + 1`. This function should _never_ return a level greater or
    /// equal to [`total`][LevelGenerator::total].
    #[must_use]
    fn level(&mut self) -> usize;
}
