//! # cpdf-core
//!
//! Dense tensor container for the density-fitted CP-ALS stack.
//!
//! This crate provides the storage layer the decomposition engine consumes:
//!
//! - **Dense tensor representation** ([`DenseND`]) backed by a row-major array
//! - **Element access** by multi-index with bounds checking
//! - **Matrix views** that reinterpret contiguous storage as a 2-D matrix without copying
//! - **Matricization** (unfold) for Gram matrices of mode unfoldings
//!
//! ## SciRS2 Integration
//!
//! All array storage goes through `scirs2_core::ndarray_ext`, numeric traits through
//! `scirs2_core::numeric`. Direct use of `ndarray` or `num-traits` is not permitted.
//!
//! ## Quick Start
//!
//! ```
//! use cpdf_core::DenseND;
//!
//! // A reference tensor B(X, a, b) with connecting dimension X = 4
//! let tensor = DenseND::<f64>::ones(&[4, 2, 3]);
//! assert_eq!(tensor.rank(), 3);
//! assert_eq!(tensor.extent(0), 4);
//!
//! // Expose it as a (X, a*b) matrix for a single GEMM
//! let matrix = tensor.matricize_leading().unwrap();
//! assert_eq!(matrix.shape(), &[4, 6]);
//!
//! // Or as an (X*a, b) matrix to contract out the last mode
//! let matrix = tensor.matricize_trailing().unwrap();
//! assert_eq!(matrix.shape(), &[8, 3]);
//! ```
//!
//! ## Memory Layout
//!
//! Tensors are C-contiguous (row-major). Matrix views are zero-copy and never
//! mutate the tensor they borrow from, so the reference tensors of a
//! decomposition stay untouched while being contracted.
//!
//! ## Error Handling
//!
//! Fallible operations return `anyhow::Result`:
//!
//! ```
//! use cpdf_core::DenseND;
//!
//! let tensor = DenseND::<f64>::zeros(&[2, 3]);
//! assert!(DenseND::from_vec(vec![1.0; 5], &[2, 3]).is_err());
//! assert!(tensor.unfold(10).is_err());
//! assert!(tensor.as_matrix(4, 2).is_err());
//! ```

#![deny(warnings)]

pub mod dense;

#[cfg(test)]
mod property_tests;

pub use dense::DenseND;
