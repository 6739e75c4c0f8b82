//! Rank-growth drivers
//!
//! Each entry point validates its configuration before touching the Factor
//! Store, then alternates "extend to the next scheduled rank" with a full
//! ALS solve.

use crate::als::DfCpAls;
use crate::convergence::ConvergenceTest;
use crate::error::{DfCpError, DfCpResult};
use crate::init::extend_random;
use crate::options::{AlsOptions, PanelOptions};
use crate::scalar::DfScalar;
use tracing::{info, warn};

/// Ranks visited when growing from `current` to `target` by `step`
///
/// An empty store starts at rank one. The last entry is always `target`;
/// a store already at `target` yields `[target]` so ALS runs again.
pub(crate) fn growth_schedule(current: usize, target: usize, step: usize) -> Vec<usize> {
    if target < current {
        return Vec::new();
    }
    if target == current {
        return vec![target];
    }

    let step = step.max(1);
    let mut ranks = Vec::new();
    let mut next = if current == 0 { 1 } else { current + step };
    while next < target {
        ranks.push(next);
        next += step;
    }
    ranks.push(target);
    ranks
}

/// Next rank of a geometric schedule, capped at `desired`
pub(crate) fn geometric_next(current: usize, growth: f64, desired: usize) -> usize {
    let next = if growth <= 1.0 {
        current + 1
    } else {
        let scaled = (current as f64 * growth).floor() as usize;
        scaled.max(current + 1)
    };
    next.min(desired)
}

fn check_svd_rank(svd_rank: Option<usize>, target: usize) -> DfCpResult<()> {
    match svd_rank {
        Some(0) => Err(DfCpError::MissingInitialGuessRank),
        Some(guess) if guess > target => Err(DfCpError::InitialGuessTooLarge { guess, target }),
        _ => Ok(()),
    }
}

#[cfg(feature = "linalg")]
fn require_linalg() -> DfCpResult<()> {
    Ok(())
}

#[cfg(not(feature = "linalg"))]
fn require_linalg() -> DfCpResult<()> {
    Err(DfCpError::MissingCapability("CP-ALS"))
}

impl<T: DfScalar> DfCpAls<T> {
    /// Grow the rank to `rank` in increments of `opts.step`, solving at each
    ///
    /// An empty store starts from the singular-vector guess when
    /// `opts.svd_rank` is set, from a single random column otherwise. A
    /// request below the current rank leaves the model untouched.
    ///
    /// Returns the reconstruction error when `opts.compute_error` is set.
    ///
    /// # Errors
    ///
    /// Configuration errors for `rank == 0`, `step == 0` or an initial
    /// guess rank above `rank`; nothing is modified in that case.
    #[tracing::instrument(skip(self, conv, opts))]
    pub fn compute_rank<C>(
        &mut self,
        rank: usize,
        conv: &mut C,
        opts: &AlsOptions,
    ) -> DfCpResult<Option<T>>
    where
        C: ConvergenceTest<T> + ?Sized,
    {
        if rank == 0 {
            return Err(DfCpError::InvalidRank(rank));
        }
        if opts.step == 0 {
            return Err(DfCpError::InvalidStep("rank step must be positive".to_string()));
        }
        check_svd_rank(opts.svd_rank, rank)?;
        require_linalg()?;

        self.build(rank, opts.step, conv, opts)
    }

    /// Add one rank at a time until the error reaches `target_error`
    ///
    /// Stops at `max_rank` (inclusive) at the latest and returns the last
    /// computed error. `opts.step` and `opts.compute_error` are not used.
    #[tracing::instrument(skip(self, conv, opts))]
    pub fn compute_error<C>(
        &mut self,
        conv: &mut C,
        target_error: T,
        max_rank: usize,
        opts: &AlsOptions,
    ) -> DfCpResult<T>
    where
        C: ConvergenceTest<T> + ?Sized,
    {
        if max_rank == 0 {
            return Err(DfCpError::InvalidRank(max_rank));
        }
        check_svd_rank(opts.svd_rank, max_rank)?;
        require_linalg()?;

        let solve_opts = AlsOptions {
            compute_error: false,
            ..opts.clone()
        };
        let mut rank = if self.store.is_empty() {
            opts.svd_rank.unwrap_or(1)
        } else {
            self.store.rank()
        };

        loop {
            self.build(rank, 1, conv, &solve_opts)?;
            let error = self.reconstruction_error()?;
            info!(rank = self.store.rank(), %error, "error-targeted step");
            if error <= target_error || rank >= max_rank {
                return Ok(error);
            }
            rank += 1;
        }
    }

    /// Grow the rank geometrically by `growth` until `desired`
    ///
    /// With `growth <= 1` the rank grows by one per solve.
    ///
    /// # Errors
    ///
    /// Configuration errors for `desired == 0`, a non-positive growth factor
    /// or an initial guess rank above `desired`.
    #[tracing::instrument(skip(self, conv, opts))]
    pub fn compute_geometric<C>(
        &mut self,
        desired: usize,
        conv: &mut C,
        growth: f64,
        opts: &AlsOptions,
    ) -> DfCpResult<Option<T>>
    where
        C: ConvergenceTest<T> + ?Sized,
    {
        if desired == 0 {
            return Err(DfCpError::InvalidRank(desired));
        }
        if !growth.is_finite() || growth <= 0.0 {
            return Err(DfCpError::InvalidGrowthFactor(growth));
        }
        check_svd_rank(opts.svd_rank, desired)?;
        require_linalg()?;

        let want_error = opts.compute_error;
        let solve_opts = AlsOptions {
            compute_error: false,
            ..opts.clone()
        };

        if self.store.is_empty() {
            let first = opts.svd_rank.unwrap_or(1);
            self.build(first, first, conv, &solve_opts)?;
        } else if self.store.rank() >= desired {
            return self.build(desired, 1, conv, opts);
        }

        while self.store.rank() < desired {
            let current = self.store.rank();
            let next = geometric_next(current, growth, desired);
            self.build(next, next - current, conv, &solve_opts)?;
        }

        if want_error {
            Ok(Some(self.reconstruction_error()?))
        } else {
            Ok(None)
        }
    }

    /// Panel build seeded by a singular-vector guess
    ///
    /// Panel 0 starts at the largest extent of either reference tensor.
    /// Every later panel adds `max(1, floor(rank_step * max_extent))` random
    /// columns. Panel `i` uses `convs[i]` and `opts.max_iters` sweeps.
    ///
    /// # Errors
    ///
    /// Configuration errors for a non-positive `rank_step`, zero panels or
    /// fewer convergence tests than panels.
    #[tracing::instrument(skip(self, convs, opts), fields(panels = opts.panels))]
    pub fn paneled_tucker_build<C>(
        &mut self,
        convs: &mut [C],
        opts: &PanelOptions,
    ) -> DfCpResult<Option<T>>
    where
        C: ConvergenceTest<T>,
    {
        if !opts.rank_step.is_finite() || opts.rank_step <= 0.0 {
            return Err(DfCpError::InvalidStep(format!(
                "panel rank step {} must be positive",
                opts.rank_step
            )));
        }
        if opts.panels == 0 {
            return Err(DfCpError::InvalidStep("panel count must be positive".to_string()));
        }
        if convs.len() < opts.panels {
            return Err(DfCpError::TooFewConvergenceTests {
                required: opts.panels,
                supplied: convs.len(),
            });
        }
        require_linalg()?;

        let max_extent = self.pair.max_extent();
        let increment = ((opts.rank_step * max_extent as f64).floor() as usize).max(1);
        let mut error = None;

        for (panel, conv) in convs.iter_mut().take(opts.panels).enumerate() {
            let want_error = opts.compute_error && panel + 1 == opts.panels;

            if panel == 0 && self.store.is_empty() {
                self.seed_from_svd(max_extent)?;
            } else {
                let target = if panel == 0 {
                    self.store.rank().max(max_extent)
                } else {
                    self.store.rank().checked_add(increment).ok_or_else(|| {
                        DfCpError::InvalidStep(format!(
                            "panel rank step {} overflows the rank",
                            opts.rank_step
                        ))
                    })?
                };
                extend_random(&mut self.store, target, &mut self.rng)?;
            }

            info!(panel, rank = self.store.rank(), "panel solve");
            error = self.als(conv, opts.max_iters, opts.fast_solve, want_error)?;
        }

        Ok(error)
    }

    /// Extend to `target` along `growth_schedule`, solving at every rank
    pub(crate) fn build<C>(
        &mut self,
        target: usize,
        step: usize,
        conv: &mut C,
        opts: &AlsOptions,
    ) -> DfCpResult<Option<T>>
    where
        C: ConvergenceTest<T> + ?Sized,
    {
        let mut error = None;

        if self.store.is_empty() {
            if let Some(svd_rank) = opts.svd_rank {
                self.seed_from_svd(svd_rank)?;
                let want_error = opts.compute_error && svd_rank == target;
                error = self.als(conv, opts.max_iters, opts.fast_solve, want_error)?;
                if svd_rank == target {
                    return Ok(error);
                }
            }
        }

        let current = self.store.rank();
        if target < current {
            warn!(
                requested = target,
                current,
                "requested rank is below the current rank, nothing to do"
            );
            return if opts.compute_error {
                Ok(Some(self.reconstruction_error()?))
            } else {
                Ok(error)
            };
        }

        for next in growth_schedule(current, target, step) {
            extend_random(&mut self.store, next, &mut self.rng)?;
            let want_error = opts.compute_error && next == target;
            error = self.als(conv, opts.max_iters, opts.fast_solve, want_error)?;
        }

        Ok(error)
    }

    #[cfg(feature = "linalg")]
    fn seed_from_svd(&mut self, svd_rank: usize) -> DfCpResult<()> {
        self.materialized_target()?;
        let target = self.target.as_ref().ok_or(DfCpError::NotComputed)?;
        crate::init::svd_guess(target, &mut self.store, svd_rank, &mut self.rng)
    }

    #[cfg(not(feature = "linalg"))]
    fn seed_from_svd(&mut self, _svd_rank: usize) -> DfCpResult<()> {
        Err(DfCpError::MissingCapability("singular-vector initial guess"))
    }
}
