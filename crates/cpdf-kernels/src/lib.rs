//! # cpdf-kernels
//!
//! Tensor kernels behind the density-fitted CP-ALS engine.
//!
//! The engine never forms the Khatri-Rao product of all factor matrices while
//! optimizing. Instead every mode update is a short chain of two primitives:
//!
//! 1. a single GEMM that contracts one axis of a reference tensor (done with
//!    `dot` on a zero-copy matrix view), and
//! 2. a **Hadamard contraction** ([`hadamard_contract`]) that sums one more
//!    axis against a factor matrix while keeping the rank axis element-wise.
//!
//! [`reduce_modes`] strings the second primitive over every axis of an
//! intermediate except one, which is the only index bookkeeping the engine needs.
//!
//! **Also provided:**
//! - **Khatri-Rao product** ([`khatri_rao`], [`khatri_rao_all`]) for reconstruction
//! - **Gram matrices** ([`gram_matrix`], [`gram_hadamard`]) for the ALS normal equations
//! - **Column normalisation** ([`normalize_columns`])
//!
//! ## Quick Start
//!
//! ```rust
//! use scirs2_core::ndarray_ext::{array, Array2};
//! use cpdf_kernels::{reduce_modes, khatri_rao};
//!
//! // Seed tensor S(i, j, r) with dims [2, 3] and rank 2, stored as a (6, 2) matrix
//! let seed = Array2::<f64>::ones((6, 2));
//! let a_j = Array2::<f64>::ones((3, 2));
//!
//! // Keep axis 0, contract axis 1 against a_j along the rank
//! let reduced = reduce_modes(seed, &[2, 3], 0, &[a_j.view()]).unwrap();
//! assert_eq!(reduced.shape(), &[2, 2]);
//! assert_eq!(reduced[[0, 0]], 3.0);
//!
//! let a = array![[1.0, 2.0], [3.0, 4.0]];
//! let kr = khatri_rao(&a.view(), &a.view());
//! assert_eq!(kr.shape(), &[4, 2]);
//! ```
//!
//! ## SciRS2 Integration
//!
//! This crate uses `scirs2-core` for all array operations and numerical traits.
//! Direct use of `ndarray` or `num-traits` is not permitted.

#![deny(warnings)]

pub mod contraction;
pub mod error;
pub mod gram;
pub mod khatri_rao;


pub use contraction::*;
pub use error::{KernelError, KernelResult};
pub use gram::*;
pub use khatri_rao::*;
