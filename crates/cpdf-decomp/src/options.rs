//! Run options for the rank-growth entry points

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options shared by `compute_rank`, `compute_error` and `compute_geometric`
///
/// # Examples
///
/// ```
/// use cpdf_decomp::AlsOptions;
///
/// let opts = AlsOptions::default()
///     .with_step(2)
///     .with_svd_guess(3)
///     .with_max_iters(50)
///     .with_error(true);
/// assert_eq!(opts.svd_rank, Some(3));
/// assert!(opts.fast_solve);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlsOptions {
    /// Rank increment between successive ALS solves
    pub step: usize,
    /// Rank of the singular-vector initial guess; `None` starts from random columns
    pub svd_rank: Option<usize>,
    /// Sweep cap per ALS solve
    pub max_iters: usize,
    /// Try the direct solve before the pseudo-inverse
    pub fast_solve: bool,
    /// Compute the reconstruction error after the final solve
    pub compute_error: bool,
}

impl Default for AlsOptions {
    fn default() -> Self {
        Self {
            step: 1,
            svd_rank: None,
            max_iters: 10_000,
            fast_solve: true,
            compute_error: false,
        }
    }
}

impl AlsOptions {
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn with_svd_guess(mut self, svd_rank: usize) -> Self {
        self.svd_rank = Some(svd_rank);
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_fast_solve(mut self, fast_solve: bool) -> Self {
        self.fast_solve = fast_solve;
        self
    }

    pub fn with_error(mut self, compute_error: bool) -> Self {
        self.compute_error = compute_error;
        self
    }
}

/// Options for `paneled_tucker_build`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelOptions {
    /// Fraction of the largest extent added as new columns per panel
    pub rank_step: f64,
    /// Number of ALS solves
    pub panels: usize,
    /// Sweep cap per panel
    pub max_iters: usize,
    pub fast_solve: bool,
    pub compute_error: bool,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            rank_step: 0.5,
            panels: 4,
            max_iters: 20,
            fast_solve: true,
            compute_error: false,
        }
    }
}

impl PanelOptions {
    pub fn with_rank_step(mut self, rank_step: f64) -> Self {
        self.rank_step = rank_step;
        self
    }

    pub fn with_panels(mut self, panels: usize) -> Self {
        self.panels = panels;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_fast_solve(mut self, fast_solve: bool) -> Self {
        self.fast_solve = fast_solve;
        self
    }

    pub fn with_error(mut self, compute_error: bool) -> Self {
        self.compute_error = compute_error;
        self
    }
}
