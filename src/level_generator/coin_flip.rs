//! Coin-flip level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use crate::level_generator::LevelGenerator;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`CoinFlip`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum CoinFlipError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
}

/// A level generator which flips a fair coin once per candidate level.
///
/// Every node starts on level 0. For each of the remaining `total - 1` levels
/// a coin is flipped: heads promotes the node one level higher, tails stops
/// the promotion. The probability of reaching level `$n$` is therefore
/// `$2^{-n}$`, truncated at `total - 1`.
///
/// This is equivalent in distribution to a [`Geometric`] generator with
/// `$p = 1/2$` but consumes one random bit per promotion instead of a
/// floating point sample.
///
/// [`Geometric`]: crate::level_generator::Geometric
#[derive(Debug)]
pub struct CoinFlip {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The random number generator.
    rng: SmallRng,
}

impl CoinFlip {
    /// Create a new coin-flip level generator with `total` number of levels,
    /// seeded from the thread-local generator.
    ///
    /// # Errors
    ///
    /// `total` must be at least 1.
    #[inline]
    pub fn new(total: usize) -> Result<Self, CoinFlipError> {
        if total == 0 {
            return Err(CoinFlipError::ZeroMax);
        }
        Ok(CoinFlip {
            total,
            rng: SmallRng::from_rng(&mut rand::rng()),
        })
    }

    /// Create a new coin-flip level generator whose samples are fully
    /// determined by `seed`.
    ///
    /// # Errors
    ///
    /// `total` must be at least 1.
    #[inline]
    pub fn with_seed(total: usize, seed: u64) -> Result<Self, CoinFlipError> {
        if total == 0 {
            return Err(CoinFlipError::ZeroMax);
        }
        Ok(CoinFlip {
            total,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl LevelGenerator for CoinFlip {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    #[inline]
    fn level(&mut self) -> usize {
        let mut level = 0;
        while level + 1 < self.total && self.rng.random::<bool>() {
            level += 1;
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{CoinFlip, CoinFlipError, LevelGenerator};

    #[test]
    fn invalid_max() {
        assert_eq!(CoinFlip::new(0).err(), Some(CoinFlipError::ZeroMax));
        assert_eq!(CoinFlip::with_seed(0, 1).err(), Some(CoinFlipError::ZeroMax));
    }

    #[rstest]
    fn within_bounds(#[values(1, 2, 16, 64)] n: usize) -> Result<()> {
        let mut generator = CoinFlip::with_seed(n, 0x1234_abcd)?;
        assert_eq!(generator.total(), n);
        for _ in 0..100_000 {
            assert!((0..n).contains(&generator.level()));
        }
        Ok(())
    }

    #[test]
    fn single_level_never_promotes() -> Result<()> {
        let mut generator = CoinFlip::new(1)?;
        assert!((0..1_000).all(|_| generator.level() == 0));
        Ok(())
    }

    #[test]
    fn about_half_are_promoted() -> Result<()> {
        let mut generator = CoinFlip::with_seed(16, 3)?;
        let samples = 100_000;
        let promoted = (0..samples).filter(|_| generator.level() >= 1).count();
        assert!(
            (45_000..55_000).contains(&promoted),
            "{promoted} of {samples} promoted"
        );
        Ok(())
    }
}
