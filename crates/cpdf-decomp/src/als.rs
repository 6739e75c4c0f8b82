//! The decomposition object and its ALS sweep loop

use crate::convergence::ConvergenceTest;
use crate::error::{DfCpError, DfCpResult};
use crate::factors::{CpDecomp, FactorStore};
use crate::reference::ReferencePair;
use crate::scalar::DfScalar;
use crate::solve::{solve_factor, SolveMode};
use crate::update::mtkrp;
use cpdf_core::DenseND;
use cpdf_kernels::normalize_columns;
use scirs2_core::random::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

/// Seed of the generator owned by every decomposition unless overridden
pub const DEFAULT_SEED: u64 = 3;

/// CP-ALS of the target `T = Lᵀ R` implied by a density-fitted pair
///
/// Owns the reference tensors, the Factor Store, the random generator and
/// the sticky [`SolveMode`]. Successive `compute_*` calls continue from the
/// rank the store last reached.
///
/// # Examples
///
/// ```
/// use cpdf_core::DenseND;
/// use cpdf_decomp::{AlsOptions, DfCpAls, NormCheck};
///
/// let left = DenseND::<f64>::from_vec(vec![1.0, 0.5, 0.0, 2.0], &[2, 2]).unwrap();
/// let right = DenseND::<f64>::from_vec(vec![1.0, 1.0, 0.0, 0.0, 1.0, -1.0], &[2, 3]).unwrap();
///
/// let mut als = DfCpAls::new(left, right).unwrap();
/// let mut conv = NormCheck::new(1e-10);
/// let opts = AlsOptions::default().with_max_iters(100).with_error(true);
/// let error = als.compute_rank(2, &mut conv, &opts).unwrap().unwrap();
///
/// assert_eq!(als.current_rank(), 2);
/// assert!(error < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct DfCpAls<T> {
    pub(crate) pair: ReferencePair<T>,
    pub(crate) store: FactorStore<T>,
    pub(crate) target: Option<DenseND<T>>,
    pub(crate) rng: StdRng,
    pub(crate) solve_mode: SolveMode,
    pub(crate) total_sweeps: usize,
}

impl<T: DfScalar> DfCpAls<T> {
    /// Decomposition with every mode optimized independently
    pub fn new(left: DenseND<T>, right: DenseND<T>) -> DfCpResult<Self> {
        let ndim = left.rank() + right.rank();
        let symmetries: Vec<usize> = (0..ndim.saturating_sub(2)).collect();
        Self::with_symmetries(left, right, &symmetries)
    }

    /// Decomposition where mode `i` shares the factor of mode `symmetries[i]`
    ///
    /// # Errors
    ///
    /// Fails if the map's length differs from the model order, if an entry
    /// points to a later mode, or if the reference tensors are malformed.
    pub fn with_symmetries(
        left: DenseND<T>,
        right: DenseND<T>,
        symmetries: &[usize],
    ) -> DfCpResult<Self> {
        let pair = ReferencePair::new(left, right)?;
        let store = FactorStore::new(&pair.extents(), symmetries)?;
        Ok(Self {
            pair,
            store,
            target: None,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            solve_mode: SolveMode::Direct,
            total_sweeps: 0,
        })
    }

    /// Reseed the random generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn references(&self) -> &ReferencePair<T> {
        &self.pair
    }

    /// Order of the CP model
    pub fn ndim(&self) -> usize {
        self.pair.ndim()
    }

    pub fn current_rank(&self) -> usize {
        self.store.rank()
    }

    /// ALS sweeps performed across every call so far
    pub fn total_sweeps(&self) -> usize {
        self.total_sweeps
    }

    pub fn solve_mode(&self) -> SolveMode {
        self.solve_mode
    }

    pub fn factor_store(&self) -> &FactorStore<T> {
        &self.store
    }

    /// `‖T‖` computed from the reference tensors alone
    pub fn target_norm(&self) -> DfCpResult<T> {
        self.pair.target_norm()
    }

    /// Factor matrices and weights of the current model
    ///
    /// # Errors
    ///
    /// [`DfCpError::NotComputed`] before any decomposition has run.
    pub fn get_factor_matrices(&self) -> DfCpResult<CpDecomp<T>> {
        self.store.to_decomp(self.total_sweeps)
    }

    /// Dense approximation of the target
    ///
    /// # Errors
    ///
    /// [`DfCpError::NotComputed`] before any decomposition has run.
    pub fn reconstruct(&self) -> DfCpResult<DenseND<T>> {
        self.get_factor_matrices()?.reconstruct()
    }

    /// `‖T - T̂‖_F`, materializing and caching `T` on first use
    pub fn reconstruction_error(&mut self) -> DfCpResult<T> {
        let approx = self.reconstruct()?;
        let target = self.materialized_target()?;
        Ok(target.distance(&approx)?)
    }

    pub(crate) fn materialized_target(&mut self) -> DfCpResult<&DenseND<T>> {
        if self.target.is_none() {
            debug!(extents = ?self.pair.extents(), "materializing target tensor");
            self.target = Some(self.pair.materialize()?);
        }
        self.target.as_ref().ok_or(DfCpError::NotComputed)
    }

    /// Sweep at the store's current rank until `conv` agrees or `max_iters`
    ///
    /// Hitting `max_iters` is not an error. Returns the reconstruction error
    /// when `want_error` is set.
    pub(crate) fn als<C>(
        &mut self,
        conv: &mut C,
        max_iters: usize,
        fast_solve: bool,
        want_error: bool,
    ) -> DfCpResult<Option<T>>
    where
        C: ConvergenceTest<T> + ?Sized,
    {
        let rank = self.store.rank();
        let mut sweeps = 0;
        let mut converged = false;

        while sweeps < max_iters && !converged {
            for mode in 0..self.store.ndim() {
                if self.store.is_representative(mode) {
                    self.update_mode(mode, conv, fast_solve)?;
                }
            }
            sweeps += 1;
            debug!(sweep = sweeps, rank, "completed ALS sweep");
            converged = conv.is_converged(&self.store);
        }

        self.total_sweeps += sweeps;
        info!(
            rank,
            sweeps,
            converged,
            total_sweeps = self.total_sweeps,
            "ALS solve finished"
        );

        if want_error {
            let error = self.reconstruction_error()?;
            info!(rank, %error, "reconstruction error");
            Ok(Some(error))
        } else {
            Ok(None)
        }
    }

    fn update_mode<C>(&mut self, mode: usize, conv: &mut C, fast_solve: bool) -> DfCpResult<()>
    where
        C: ConvergenceTest<T> + ?Sized,
    {
        let rhs = mtkrp(&self.pair, &self.store, mode)?;
        conv.record_mtkrp(mode, &rhs);

        let v = self.store.gram_hadamard_except(mode)?;
        let mut factor = solve_factor(&rhs, &v, fast_solve, &mut self.solve_mode)?;
        let weights = normalize_columns(&mut factor);
        self.store.set_factor(mode, factor, weights);
        Ok(())
    }
}
