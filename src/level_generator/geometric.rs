//! Geometric level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use crate::{MAX_LEVEL, level_generator::LevelGenerator};

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum number of levels must be less than `i32::MAX`.
    #[error("max must be less than i32::MAX.")]
    MaxTooLarge,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator using a geometric distribution.
///
/// This distribution assumes that if a node is present at some level `$n$`,
/// then the probability that it is present at level `$n+1$` is some constant
/// `$p \in (0, 1)$`. This produces a geometric distribution, albeit truncated
/// at the maximum number of levels allowed.
///
/// The [`Default`] generator uses [`MAX_LEVEL`] levels and `$p = 1/2$`.
#[derive(Debug)]
pub struct Geometric {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// `$p^{\text{total}}$`, cached since it is needed for every sample.
    p_total: f64,
    /// The probability that a node is present in the next level.
    p: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level. The generator is seeded from the thread-local generator.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `total` must be at least 1
    /// and fit in an `i32`.
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        Self::validate(total, p)?;
        Ok(Self::from_rng(total, p, SmallRng::from_rng(&mut rand::rng())))
    }

    /// Create a new geometric level generator whose samples are fully
    /// determined by `seed`.
    ///
    /// # Errors
    ///
    /// Same as [`Geometric::new`].
    #[inline]
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::validate(total, p)?;
        Ok(Self::from_rng(total, p, SmallRng::seed_from_u64(seed)))
    }

    /// The default generator, seeded with `seed`.
    pub(crate) fn default_with_seed(seed: u64) -> Self {
        Self::from_rng(MAX_LEVEL, 0.5, SmallRng::seed_from_u64(seed))
    }

    fn validate(total: usize, p: f64) -> Result<(), GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroMax);
        }
        if i32::try_from(total).is_err() {
            return Err(GeometricError::MaxTooLarge);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(())
    }

    /// Assumes the arguments have been validated.
    #[expect(clippy::as_conversions, reason = "total is at most i32::MAX")]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "total is at most i32::MAX"
    )]
    fn from_rng(total: usize, p: f64, rng: SmallRng) -> Self {
        Geometric {
            total,
            p_total: p.powi(total as i32),
            p,
            rng,
        }
    }
}

impl Default for Geometric {
    #[inline]
    fn default() -> Self {
        Self::from_rng(MAX_LEVEL, 0.5, SmallRng::from_rng(&mut rand::rng()))
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    /// Generate a level for a new node using a geometric distribution.
    ///
    /// This function generates a random level in the range
    /// `$[0, \text{total})$` by sampling from a uniform distribution and
    /// inverting the cumulative distribution function (CDF) of the truncated
    /// geometric distribution.
    ///
    /// The CDF of the truncated geometric distribution is
    ///
    /// ```math
    /// \text{CDF}(n) = \frac{1 - p^n}{1 - p^{t}}
    /// ```
    ///
    /// where `$t$` is the total number of levels. Inverting it for `$n$`
    /// gives:
    ///
    /// ```math
    /// n = \left\lfloor \log_p\left(1 - (1 - p^{t}) \cdot u\right) \right\rfloor
    /// ```
    ///
    /// where `$u \in [0, 1)$` is a uniformly distributed random variate.
    #[inline]
    #[expect(clippy::float_arithmetic, reason = "Computing inverse CDF")]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "CDF domain is [0, total] so the cast is safe"
    )]
    #[expect(clippy::as_conversions, reason = "No other way to do this")]
    fn level(&mut self) -> usize {
        let u = self.rng.random::<f64>();
        let level = (1.0 - (1.0 - self.p_total) * u).log(self.p).floor() as usize;
        // Rounding can push u close to 1 onto `total` itself.
        level.min(self.total - 1)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Geometric, LevelGenerator};
    use crate::{MAX_LEVEL, level_generator::geometric::GeometricError};

    #[test]
    fn invalid_max() {
        assert_eq!(Geometric::new(0, 0.5).err(), Some(GeometricError::ZeroMax));
    }

    #[test]
    fn invalid_p() {
        assert_eq!(
            Geometric::new(1, 0.0).err(),
            Some(GeometricError::InvalidProbability)
        );
        assert_eq!(
            Geometric::new(1, 1.0).err(),
            Some(GeometricError::InvalidProbability)
        );
        assert_eq!(
            Geometric::with_seed(1, f64::NAN, 0).err(),
            Some(GeometricError::InvalidProbability)
        );
    }

    #[test]
    fn default_uses_max_level() {
        assert_eq!(Geometric::default().total(), MAX_LEVEL);
    }

    #[rstest]
    fn new(
        #[values(1, 2, 16, 1024)] n: usize,
        #[values(0.01, 0.1, 0.5, 0.99)] p: f64,
    ) -> Result<()> {
        let mut generator = Geometric::new(n, p)?;
        assert_eq!(generator.total(), n);
        for _ in 0..100_000 {
            let level = generator.level();
            assert!((0..n).contains(&level));
        }

        // Make sure that we can produce at least one level-0 node.
        let mut found = false;
        for _ in 0..100_000 {
            if generator.level() == 0 {
                found = true;
                break;
            }
        }
        if !found {
            bail!("Failed to generate a level-0 node.");
        }

        Ok(())
    }

    #[test]
    fn reaches_top_level() -> Result<()> {
        let mut generator = Geometric::with_seed(4, 0.5, 0x1234_abcd)?;
        if !(0..100_000).any(|_| generator.level() == 3) {
            bail!("Failed to generate a level-3 node.");
        }
        Ok(())
    }

    #[test]
    fn halves_per_level() -> Result<()> {
        let mut generator = Geometric::with_seed(MAX_LEVEL, 0.5, 42)?;
        let samples = 100_000;
        let mut at_least = [0_usize; 4];
        for _ in 0..samples {
            let level = generator.level();
            for (k, count) in at_least.iter_mut().enumerate() {
                if level >= k {
                    *count += 1;
                }
            }
        }
        assert_eq!(at_least[0], samples);
        // P(level >= k) is p^k up to the negligible truncation.
        for k in 1..at_least.len() {
            let ratio = at_least[k] as f64 / at_least[k - 1] as f64;
            assert!((0.45..0.55).contains(&ratio), "ratio {ratio} at level {k}");
        }
        Ok(())
    }

    #[test]
    fn seeded_is_reproducible() -> Result<()> {
        let mut a = Geometric::with_seed(MAX_LEVEL, 0.5, 7)?;
        let mut b = Geometric::with_seed(MAX_LEVEL, 0.5, 7)?;
        let a: Vec<_> = (0..1_000).map(|_| a.level()).collect();
        let b: Vec<_> = (0..1_000).map(|_| b.level()).collect();
        assert_eq!(a, b);
        Ok(())
    }
}
