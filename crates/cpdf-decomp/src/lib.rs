//! # cpdf-decomp - CP-ALS for density-fitted tensors
//!
//! Computes a Canonical Polyadic decomposition of a tensor that is only
//! known through a density-fitted pair of reference tensors:
//!
//! ```text
//! T(a₁..aₚ, b₁..b_q) = Σₓ L(x, a₁..aₚ) R(x, b₁..b_q)
//!                    ≈ Σᵣ λᵣ (u₁ᵣ ∘ ... ∘ uₙᵣ)
//! ```
//!
//! `T` is never formed during optimization. Each mode update contracts `L`
//! and `R` directly against the current factors (see [`update`]).
//!
//! ## Components
//!
//! - [`DfCpAls`]: owns the reference pair, the [`FactorStore`], the random
//!   generator and the sticky [`SolveMode`]
//! - **Rank-growth drivers**: [`DfCpAls::compute_rank`],
//!   [`DfCpAls::compute_error`], [`DfCpAls::compute_geometric`],
//!   [`DfCpAls::paneled_tucker_build`]
//! - **Convergence tests**: [`ConvergenceTest`], [`NormCheck`], [`FitCheck`]
//! - **Solve stage**: direct solve with a pseudo-inverse fallback
//!
//! ## Quick Start
//!
//! ```
//! use cpdf_core::DenseND;
//! use cpdf_decomp::{AlsOptions, DfCpAls, NormCheck};
//!
//! // L(x, i, j) and R(x, k) with connecting dimension X = 2
//! let mut left = DenseND::<f64>::zeros(&[2, 3, 2]);
//! left.fill_with(|idx| ((idx[0] + 2 * idx[1] + idx[2]) as f64).sin());
//! let mut right = DenseND::<f64>::zeros(&[2, 4]);
//! right.fill_with(|idx| ((idx[0] * 4 + idx[1]) as f64).cos());
//!
//! let mut als = DfCpAls::new(left, right)?;
//! let mut conv = NormCheck::new(1e-8);
//! let opts = AlsOptions::default().with_max_iters(50);
//! als.compute_rank(3, &mut conv, &opts)?;
//!
//! let cp = als.get_factor_matrices()?;
//! assert_eq!(cp.factors.len(), 3);
//! assert_eq!(cp.weights.len(), 3);
//!
//! let approx = als.reconstruct()?;
//! assert_eq!(approx.shape(), &[3, 2, 4]);
//! # Ok::<(), cpdf_decomp::DfCpError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `linalg` (default): solves, SVD and eigendecompositions through
//!   `scirs2-linalg`. Without it every decomposition call fails with
//!   [`DfCpError::MissingCapability`].
//! - `serde`: `Serialize`/`Deserialize` for the option types and [`SolveMode`].
//!
//! ## Logging
//!
//! Progress is reported through `tracing`: one `debug` event per sweep, one
//! `info` event per ALS solve and a `warn` event when the direct solve gives
//! way to the pseudo-inverse. Installing a subscriber is up to the caller.
//!
//! ## SciRS2 Integration
//!
//! Linear algebra goes through `scirs2_linalg`, arrays and random numbers
//! through `scirs2_core`. Direct use of `ndarray` or `rand` is not permitted.

#![deny(warnings)]

pub mod als;
pub mod convergence;
mod driver;
pub mod error;
pub mod factors;
mod init;
pub mod options;
pub mod reference;
pub mod scalar;
pub mod solve;
pub mod update;


pub use als::{DfCpAls, DEFAULT_SEED};
pub use convergence::{ConvergenceTest, FitCheck, NormCheck};
pub use error::{DfCpError, DfCpResult};
pub use factors::{CpDecomp, FactorSlot, FactorStore};
pub use options::{AlsOptions, PanelOptions};
pub use reference::{ReferencePair, Side};
pub use scalar::DfScalar;
pub use solve::{pseudo_inverse, SolveMode, PINV_THRESHOLD};
pub use update::mtkrp;

#[cfg(feature = "linalg")]
pub use solve::direct_solve;
